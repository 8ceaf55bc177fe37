//! Resolution strategies
//!
//! Four alternative entry queries - by owner, creator, mint or update
//! authority - each producing the candidate set of base tokens the enrichment
//! pipeline consumes. Exactly one selector must be supplied; anything else is
//! an input error raised before any I/O.

use crate::errors::{InputError, NftScoutError, RpcError};
use crate::logger::{self, LogTag};
use crate::metadata::{
    creator_offset, decode_metadata, metadata_program_id, MetadataAccount, MetadataKey,
    UPDATE_AUTHORITY_OFFSET,
};
use crate::rpc::get_rpc_client;
use solana_account_decoder::{UiAccountData, UiAccountEncoding};
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

// =============================================================================
// SELECTOR
// =============================================================================

/// Which entry query to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSelector {
    Owner(Pubkey),
    Creator(Pubkey),
    Mint(Pubkey),
    UpdateAuthority(Pubkey),
}

impl TokenSelector {
    /// Validate that exactly one selector was supplied
    ///
    /// Zero selectors and more than one selector are both input errors; the
    /// silent priority order of older tooling is deliberately not honored.
    pub fn from_options(
        owner: Option<Pubkey>,
        creator: Option<Pubkey>,
        mint: Option<Pubkey>,
        update_authority: Option<Pubkey>,
    ) -> Result<TokenSelector, InputError> {
        let mut provided: Vec<&'static str> = Vec::new();
        if owner.is_some() {
            provided.push("owner");
        }
        if creator.is_some() {
            provided.push("creator");
        }
        if mint.is_some() {
            provided.push("mint");
        }
        if update_authority.is_some() {
            provided.push("update-authority");
        }
        match provided.len() {
            0 => Err(InputError::MissingSelector),
            1 => Ok(if let Some(o) = owner {
                TokenSelector::Owner(o)
            } else if let Some(c) = creator {
                TokenSelector::Creator(c)
            } else if let Some(m) = mint {
                TokenSelector::Mint(m)
            } else {
                TokenSelector::UpdateAuthority(update_authority.unwrap())
            }),
            _ => Err(InputError::AmbiguousSelector {
                provided: provided.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// BASE TOKEN
// =============================================================================

/// A candidate NFT before enrichment
///
/// Creator/authority queries already hold the decoded metadata account, so the
/// pipeline does not fetch it a second time.
#[derive(Debug, Clone)]
pub struct BaseToken {
    pub mint: Pubkey,
    pub holder_address: Option<Pubkey>,
    pub metadata_address: Option<Pubkey>,
    pub metadata: Option<MetadataAccount>,
}

impl BaseToken {
    pub fn bare(mint: Pubkey) -> Self {
        BaseToken {
            mint,
            holder_address: None,
            metadata_address: None,
            metadata: None,
        }
    }
}

// =============================================================================
// STRATEGIES
// =============================================================================

/// Run the entry query for `selector`
pub async fn resolve_tokens(selector: TokenSelector) -> Result<Vec<BaseToken>, NftScoutError> {
    let tokens = match selector {
        TokenSelector::Owner(owner) => tokens_by_owner(&owner).await?,
        TokenSelector::Creator(creator) => {
            tokens_by_metadata_filter(creator_offset(0), &creator, "creator").await?
        }
        TokenSelector::UpdateAuthority(authority) => {
            tokens_by_metadata_filter(UPDATE_AUTHORITY_OFFSET, &authority, "update authority")
                .await?
        }
        TokenSelector::Mint(mint) => vec![BaseToken::bare(mint)],
    };
    logger::info(LogTag::Fetch, &format!("Found {} candidate tokens", tokens.len()));
    Ok(tokens)
}

/// Resolve the current holder of an NFT mint
///
/// Since an NFT has a single unit, the first (largest) token account is the
/// holder. An empty list - just-minted or burned token - is a legal absence,
/// not an error.
pub async fn get_holder_by_mint(mint: &Pubkey) -> Result<Option<Pubkey>, String> {
    let client = get_rpc_client();
    let accounts = client
        .get_token_largest_accounts(mint)
        .await
        .map_err(|e| format!("getTokenLargestAccounts({}) failed: {}", mint, e))?;
    match accounts.first() {
        Some(largest) => Ok(Some(
            Pubkey::from_str(&largest.address)
                .map_err(|e| format!("bad holder address '{}': {}", largest.address, e))?,
        )),
        None => Ok(None),
    }
}

/// All holdings of `owner` that look like NFTs at the query layer
///
/// `decimals == 0 && amount == 1` is only a heuristic filter; the pipeline's
/// metadata load is the final arbiter of NFT-ness.
async fn tokens_by_owner(owner: &Pubkey) -> Result<Vec<BaseToken>, NftScoutError> {
    let client = get_rpc_client();
    let token_program =
        Pubkey::from_str(crate::constants::SPL_TOKEN_PROGRAM_ID).expect("static id must parse");
    let keyed_accounts = client
        .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(token_program))
        .await
        .map_err(|e| RpcError::Request {
            method: "getTokenAccountsByOwner".to_string(),
            reason: e.to_string(),
        })?;

    let mut tokens = Vec::new();
    for keyed in keyed_accounts {
        let parsed = match &keyed.account.data {
            UiAccountData::Json(parsed) => &parsed.parsed,
            _ => continue,
        };
        let info = &parsed["info"];
        let amount = &info["tokenAmount"];
        let is_nft_shaped = amount["decimals"].as_u64() == Some(0)
            && amount["uiAmount"].as_f64() == Some(1.0);
        if !is_nft_shaped {
            continue;
        }
        let mint = match info["mint"].as_str().and_then(|m| Pubkey::from_str(m).ok()) {
            Some(mint) => mint,
            None => {
                logger::warning(
                    LogTag::Fetch,
                    &format!("token account {} has no parsable mint", keyed.pubkey),
                );
                continue;
            }
        };
        let holder = Pubkey::from_str(&keyed.pubkey).ok();
        tokens.push(BaseToken {
            mint,
            holder_address: holder,
            metadata_address: None,
            metadata: None,
        });
    }
    Ok(tokens)
}

/// Metadata accounts matching `address` at byte `offset`
///
/// Shared by the creator and update-authority strategies; both are memcmp
/// filters over the metadata program's accounts, anchored on the MetadataV1
/// key byte.
async fn tokens_by_metadata_filter(
    offset: usize,
    address: &Pubkey,
    what: &str,
) -> Result<Vec<BaseToken>, NftScoutError> {
    let client = get_rpc_client();
    let filters = vec![
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
            0,
            &[MetadataKey::MetadataV1 as u8],
        )),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(offset, address.as_ref())),
    ];
    let config = RpcProgramAccountsConfig {
        filters: Some(filters),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            ..RpcAccountInfoConfig::default()
        },
        ..RpcProgramAccountsConfig::default()
    };
    let raw_accounts = client
        .get_program_accounts_with_config(&metadata_program_id(), config)
        .await
        .map_err(|e| RpcError::Request {
            method: "getProgramAccounts".to_string(),
            reason: e.to_string(),
        })?;

    logger::debug(
        LogTag::Fetch,
        &format!("{} metadata accounts matched by {}", raw_accounts.len(), what),
    );

    Ok(metadatas_to_tokens(raw_accounts))
}

/// Decode fetched metadata accounts into base tokens
///
/// Accounts that fail to decode are dropped with a warning; they are not NFTs
/// as far as this query is concerned.
fn metadatas_to_tokens(raw_accounts: Vec<(Pubkey, Account)>) -> Vec<BaseToken> {
    raw_accounts
        .into_iter()
        .filter_map(|(address, account)| match decode_metadata(&account.data) {
            Ok(decoded) => Some(BaseToken {
                mint: decoded.mint_pubkey(),
                holder_address: None,
                metadata_address: Some(address),
                metadata: Some(decoded),
            }),
            Err(e) => {
                logger::warning(
                    LogTag::Fetch,
                    &format!("failed to decode metadata account {}: {}", address, e),
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_selector_is_an_input_error() {
        let result = TokenSelector::from_options(None, None, None, None);
        assert!(matches!(result, Err(InputError::MissingSelector)));
    }

    #[test]
    fn multiple_selectors_are_rejected() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let result = TokenSelector::from_options(Some(a), None, Some(b), None);
        match result {
            Err(InputError::AmbiguousSelector { provided }) => {
                assert_eq!(provided, vec!["owner".to_string(), "mint".to_string()]);
            }
            other => panic!("expected ambiguous selector error, got {:?}", other),
        }
    }

    #[test]
    fn single_selector_is_accepted() {
        let key = Pubkey::new_unique();
        assert!(matches!(
            TokenSelector::from_options(None, Some(key), None, None),
            Ok(TokenSelector::Creator(k)) if k == key
        ));
        assert!(matches!(
            TokenSelector::from_options(None, None, None, Some(key)),
            Ok(TokenSelector::UpdateAuthority(k)) if k == key
        ));
    }

    #[test]
    fn undecodable_metadata_accounts_are_dropped() {
        let good_creator = Pubkey::new_unique();
        let bytes = {
            use borsh::BorshSerialize;
            #[derive(BorshSerialize)]
            struct RawData {
                name: String,
                symbol: String,
                uri: String,
                seller_fee_basis_points: u16,
                creators: Option<Vec<([u8; 32], bool, u8)>>,
            }
            // tuple creators serialize identically to the named struct
            #[derive(BorshSerialize)]
            struct RawMetadata {
                key: u8,
                update_authority: [u8; 32],
                mint: [u8; 32],
                data: RawData,
                primary_sale_happened: bool,
                is_mutable: bool,
            }
            borsh::to_vec(&RawMetadata {
                key: MetadataKey::MetadataV1 as u8,
                update_authority: Pubkey::new_unique().to_bytes(),
                mint: Pubkey::new_unique().to_bytes(),
                data: RawData {
                    name: "x".to_string(),
                    symbol: "X".to_string(),
                    uri: "https://example.com/x.json".to_string(),
                    seller_fee_basis_points: 0,
                    creators: Some(vec![(good_creator.to_bytes(), true, 100)]),
                },
                primary_sale_happened: false,
                is_mutable: true,
            })
            .unwrap()
        };
        let good = (
            Pubkey::new_unique(),
            Account {
                lamports: 1,
                data: bytes,
                owner: metadata_program_id(),
                executable: false,
                rent_epoch: 0,
            },
        );
        let bad = (
            Pubkey::new_unique(),
            Account {
                lamports: 1,
                data: vec![MetadataKey::MetadataV1 as u8, 1, 2],
                owner: metadata_program_id(),
                executable: false,
                rent_epoch: 0,
            },
        );
        let tokens = metadatas_to_tokens(vec![good, bad]);
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].metadata.is_some());
    }
}
