//! Paperhands analysis
//!
//! Replays an address's marketplace history into a trade ledger, decorates
//! the resulting positions with metadata and current listing prices, and
//! computes the paper/diamond deltas. Everything past the initial signature
//! fetch is best-effort: a position whose decoration fails simply stays bare.

mod classifier;
mod fetcher;
mod ledger;
mod view;

pub use classifier::{classify_transaction, marketplace_for_program, Marketplace, SaleEvent};
pub use fetcher::{fetch_all_signatures, replay_history};
pub use ledger::{populate_papers_and_diamonds, NftPosition, TradeLedger};
pub use view::{extract_view, AccountKeyView, MarketTxView};

use crate::constants::MAX_CONCURRENT_ENRICHMENTS;
use crate::enrich::{fetch_external_metadata, load_metadata, ok_to_fail};
use crate::logger::{self, LogTag};
use crate::metadata::{find_metadata_pda, MetadataAccount};
use crate::prices::{PriceCache, PriceMethod, PriceStats};
use crate::rpc::parse_pubkey_string;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;

/// Pull on-chain and off-chain metadata for one mint
///
/// No metadata account means the mint is not an actual NFT; that is an error
/// here, and callers degrade it. The off-chain fetch is best-effort.
pub async fn fetch_nft_metadata(mint: &str) -> Result<(MetadataAccount, Option<Value>), String> {
    logger::debug(LogTag::Paperhands, &format!("Pulling metadata for {}", mint));
    let mint = parse_pubkey_string(mint)?;
    let pda = find_metadata_pda(&mint);
    let onchain = load_metadata(pda).await?;
    let external = if onchain.data.uri.is_empty() {
        None
    } else {
        ok_to_fail(
            LogTag::Paperhands,
            &format!("external metadata fetch for {}", mint),
            fetch_external_metadata(&onchain.data.uri),
        )
        .await
    };
    Ok((onchain, external))
}

async fn populate_metadata(positions: &mut [NftPosition]) {
    let results: Vec<Option<(MetadataAccount, Option<Value>)>> = stream::iter(
        positions.iter().map(|position| {
            let mint = position.mint.clone();
            async move {
                ok_to_fail(
                    LogTag::Paperhands,
                    &format!("metadata for {}", mint),
                    fetch_nft_metadata(&mint),
                )
                .await
            }
        }),
    )
    .buffered(MAX_CONCURRENT_ENRICHMENTS)
    .collect()
    .await;

    for (position, result) in positions.iter_mut().zip(results) {
        if let Some((onchain, external)) = result {
            position.onchain_metadata = Some(onchain);
            position.external_metadata = external;
        }
    }
    logger::info(LogTag::Paperhands, "Metadata populated");
}

async fn populate_price_stats(positions: &mut [NftPosition]) {
    let cache = PriceCache::new();
    let creators: Vec<Option<Pubkey>> = positions
        .iter()
        .map(|position| {
            position
                .onchain_metadata
                .as_ref()
                .and_then(|meta| meta.first_creator())
        })
        .collect();

    let stats: Vec<Option<PriceStats>> = stream::iter(creators.into_iter().map(|creator| {
        let cache = &cache;
        async move {
            match creator {
                Some(creator) => cache.fetch_and_calc_stats(&creator.to_string()).await,
                None => None,
            }
        }
    }))
    .buffered(MAX_CONCURRENT_ENRICHMENTS)
    .collect()
    .await;

    for (position, stats) in positions.iter_mut().zip(stats) {
        position.current_prices = stats;
    }
    logger::info(LogTag::Paperhands, "Price stats populated");
}

/// Full paperhands run for one address
pub async fn run_paperhands(
    address: &Pubkey,
    method: PriceMethod,
) -> Result<TradeLedger, String> {
    let mut ledger = replay_history(address).await?;
    populate_metadata(&mut ledger.positions).await;
    populate_price_stats(&mut ledger.positions).await;
    populate_papers_and_diamonds(&mut ledger.positions, method);
    Ok(ledger)
}
