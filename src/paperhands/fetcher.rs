//! Transaction history retrieval and chronological replay
//!
//! Signatures are paged newest-first from the RPC node, reversed so the
//! replay starts with the oldest activity, then fetched in fixed-size batches.
//! Fetches within a batch overlap, but classification applies strictly in
//! signature order so the ledger replays history as it happened.

use super::classifier::classify_transaction;
use super::ledger::TradeLedger;
use super::view::{extract_view, MarketTxView};
use crate::constants::{MAX_CONCURRENT_TX_FETCHES, SIGNATURE_PAGE_LIMIT, TX_BATCH_SIZE};
use crate::logger::{self, LogTag};
use crate::rpc::get_rpc_client;
use futures::stream::{self, StreamExt};
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::UiTransactionEncoding;
use std::str::FromStr;

/// Page through the address's full signature history, oldest first
pub async fn fetch_all_signatures(address: &Pubkey) -> Result<Vec<String>, String> {
    let client = get_rpc_client();
    let mut signatures: Vec<String> = Vec::new();
    let mut before: Option<Signature> = None;

    loop {
        let config = GetConfirmedSignaturesForAddress2Config {
            before,
            until: None,
            limit: Some(SIGNATURE_PAGE_LIMIT),
            commitment: Some(CommitmentConfig::confirmed()),
        };
        let page = client
            .get_signatures_for_address_with_config(address, config)
            .await
            .map_err(|e| format!("getSignaturesForAddress({}) failed: {}", address, e))?;
        let page_len = page.len();
        for status in page {
            signatures.push(status.signature);
        }
        if page_len < SIGNATURE_PAGE_LIMIT {
            break;
        }
        let last = signatures.last().expect("page was non-empty");
        before = Some(
            Signature::from_str(last)
                .map_err(|e| format!("node returned malformed signature '{}': {}", last, e))?,
        );
    }

    logger::info(
        LogTag::Paperhands,
        &format!("got {} txs to process", signatures.len()),
    );
    signatures.reverse();
    Ok(signatures)
}

async fn fetch_tx_view(signature_str: String) -> Result<MarketTxView, String> {
    let signature = Signature::from_str(&signature_str)
        .map_err(|e| format!("malformed signature '{}': {}", signature_str, e))?;
    let client = get_rpc_client();
    let config = RpcTransactionConfig {
        encoding: Some(UiTransactionEncoding::JsonParsed),
        commitment: Some(CommitmentConfig::confirmed()),
        max_supported_transaction_version: Some(0),
    };
    let tx = client
        .get_transaction_with_config(&signature, config)
        .await
        .map_err(|e| format!("getTransaction({}) failed: {}", signature_str, e))?;
    extract_view(&tx)
}

/// Replay the address's entire marketplace history into a fresh ledger
pub async fn replay_history(address: &Pubkey) -> Result<TradeLedger, String> {
    let signatures = fetch_all_signatures(address).await?;
    let total = signatures.len();
    let mut ledger = TradeLedger::new();
    let mut processed = 0usize;

    for batch in signatures.chunks(TX_BATCH_SIZE) {
        logger::info(
            LogTag::Paperhands,
            &format!("processing another {} sigs", batch.len()),
        );
        // `buffered` keeps completion in submission order, so events apply
        // chronologically even though fetches overlap
        let views: Vec<Result<MarketTxView, String>> =
            stream::iter(batch.iter().cloned().map(fetch_tx_view))
                .buffered(MAX_CONCURRENT_TX_FETCHES)
                .collect()
                .await;

        for view in views {
            processed += 1;
            logger::debug(
                LogTag::Paperhands,
                &format!("triaging {} of {}", processed, total),
            );
            match view {
                Ok(view) => {
                    if let Some(event) = classify_transaction(&view) {
                        ledger.apply(&event, &address.to_string());
                    }
                }
                Err(e) => {
                    logger::warning(LogTag::Paperhands, &format!("skipping tx: {}", e));
                }
            }
        }
    }

    logger::info(
        LogTag::Paperhands,
        &format!(
            "replay done: spent {} SOL, earned {} SOL, {} still held",
            ledger.spent,
            ledger.earned,
            ledger.inventory.len()
        ),
    );
    Ok(ledger)
}
