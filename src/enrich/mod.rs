//! Fan-out / join orchestration
//!
//! Runs the per-entity pipeline over the whole candidate set with bounded
//! concurrency, then re-associates results with their originating base tokens
//! by mint equality - completion order under concurrency is non-deterministic,
//! so positional matching would cross-assign records.

mod pipeline;
mod types;

pub use pipeline::{enrich_token, fetch_external_metadata, load_metadata, ok_to_fail, ok_to_fail_sync};
pub use types::{EditionInfo, EnrichedNft};

use crate::constants::MAX_CONCURRENT_ENRICHMENTS;
use crate::fetch::BaseToken;
use crate::logger::{self, LogTag};
use futures::stream::{self, StreamExt};
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;

/// Enrich every candidate token
///
/// Output length always equals input length and `out[i].mint == in[i].mint`;
/// a base token with no matching enrichment result passes through with only
/// its base fields populated.
pub async fn enrich_tokens(tokens: Vec<BaseToken>) -> Vec<EnrichedNft> {
    let total = tokens.len();
    let enriched: Vec<EnrichedNft> = stream::iter(tokens.clone().into_iter().map(enrich_token))
        .buffer_unordered(MAX_CONCURRENT_ENRICHMENTS)
        .collect()
        .await;
    logger::info(LogTag::Enrich, &format!("Prepared a total of {} NFTs", total));
    join_on_mint(&tokens, enriched)
}

/// Left-biased join of enrichment results back onto the base set
///
/// Pure so the join contract is testable without any I/O.
pub fn join_on_mint(base: &[BaseToken], enriched: Vec<EnrichedNft>) -> Vec<EnrichedNft> {
    let mut by_mint: HashMap<Pubkey, Vec<EnrichedNft>> = HashMap::new();
    for record in enriched {
        by_mint.entry(record.mint).or_default().push(record);
    }
    base.iter()
        .map(|token| {
            match by_mint.get_mut(&token.mint).and_then(|bucket| {
                if bucket.is_empty() {
                    None
                } else {
                    Some(bucket.remove(0))
                }
            }) {
                Some(record) => record,
                None => {
                    logger::warning(
                        LogTag::Enrich,
                        &format!("no enrichment result for mint {}, passing through", token.mint),
                    );
                    EnrichedNft::from_base(token)
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(mint: Pubkey) -> BaseToken {
        BaseToken::bare(mint)
    }

    fn record(mint: Pubkey, holder: Option<Pubkey>) -> EnrichedNft {
        let mut r = EnrichedNft::from_base(&BaseToken::bare(mint));
        r.holder_address = holder;
        r
    }

    #[test]
    fn join_reassociates_by_mint_not_position() {
        let mints: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        let bases: Vec<BaseToken> = mints.iter().copied().map(base).collect();
        let holders: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();

        // completion order reversed relative to input order
        let enriched: Vec<EnrichedNft> = mints
            .iter()
            .zip(holders.iter())
            .rev()
            .map(|(m, h)| record(*m, Some(*h)))
            .collect();

        let joined = join_on_mint(&bases, enriched);
        assert_eq!(joined.len(), bases.len());
        for (i, out) in joined.iter().enumerate() {
            assert_eq!(out.mint, mints[i]);
            assert_eq!(out.holder_address, Some(holders[i]));
        }
    }

    #[test]
    fn join_never_drops_or_duplicates() {
        let mints: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        let bases: Vec<BaseToken> = mints.iter().copied().map(base).collect();

        // one result missing entirely
        let enriched = vec![record(mints[0], None), record(mints[2], None)];
        let joined = join_on_mint(&bases, enriched);
        assert_eq!(joined.len(), 3);
        assert_eq!(joined[1].mint, mints[1]);
        assert!(joined[1].holder_address.is_none());
    }

    #[test]
    fn join_handles_repeated_mints() {
        let mint = Pubkey::new_unique();
        let bases = vec![base(mint), base(mint)];
        let holder = Pubkey::new_unique();
        let enriched = vec![record(mint, Some(holder))];
        let joined = join_on_mint(&bases, enriched);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].holder_address, Some(holder));
        assert!(joined[1].holder_address.is_none());
    }

    #[test]
    fn master_edition_flattening_keeps_addresses_equal() {
        use crate::metadata::{MasterEditionAccount, MasterEditionV2Account, MetadataKey};
        let pda = Pubkey::new_unique();
        let mut r = record(Pubkey::new_unique(), None);
        r.set_edition(EditionInfo::Master {
            master_edition_address: pda,
            master_edition: MasterEditionAccount::V2(MasterEditionV2Account {
                key: MetadataKey::MasterEditionV2 as u8,
                supply: 0,
                max_supply: None,
            }),
        });
        assert_eq!(r.edition_kind, "MasterEditionV2");
        assert_eq!(r.edition_address, Some(pda));
        assert_eq!(r.master_edition_address, Some(pda));
    }

    #[test]
    fn edition_with_resolved_parent_has_distinct_master_address() {
        use crate::metadata::{EditionAccount, MasterEditionAccount, MasterEditionV2Account, MetadataKey};
        let edition_pda = Pubkey::new_unique();
        let parent = Pubkey::new_unique();
        let mut r = record(Pubkey::new_unique(), None);
        r.set_edition(EditionInfo::Edition {
            edition_address: edition_pda,
            edition: EditionAccount {
                key: MetadataKey::EditionV1 as u8,
                parent: parent.to_bytes(),
                edition: 3,
            },
            master_edition_address: Some(parent),
            master_edition: Some(MasterEditionAccount::V2(MasterEditionV2Account {
                key: MetadataKey::MasterEditionV2 as u8,
                supply: 10,
                max_supply: Some(100),
            })),
        });
        assert_eq!(r.edition_kind, "EditionV1");
        assert_ne!(r.edition_address, r.master_edition_address);
        assert_eq!(r.master_edition_address, Some(parent));
    }

    #[test]
    fn failed_parent_lookup_leaves_master_fields_absent() {
        use crate::metadata::{EditionAccount, MetadataKey};
        let mut r = record(Pubkey::new_unique(), None);
        r.set_edition(EditionInfo::Edition {
            edition_address: Pubkey::new_unique(),
            edition: EditionAccount {
                key: MetadataKey::EditionV1 as u8,
                parent: Pubkey::new_unique().to_bytes(),
                edition: 1,
            },
            master_edition_address: None,
            master_edition: None,
        });
        assert_eq!(r.edition_kind, "EditionV1");
        assert!(r.edition_record.is_some());
        assert!(r.master_edition_address.is_none());
        assert!(r.master_edition_record.is_none());
    }
}
