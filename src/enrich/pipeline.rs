//! Per-entity enrichment pipeline
//!
//! `enrich_token` is a total function: every failing lookup degrades its field
//! to absent via `ok_to_fail` and the remaining independent steps continue.
//! The only strict dependency chain is edition-kind resolution gating the
//! parent master-edition lookup.

use super::types::{EditionInfo, EnrichedNft};
use crate::fetch::{get_holder_by_mint, BaseToken};
use crate::logger::{self, LogTag};
use crate::metadata::{
    decode_edition_container, decode_master_edition, decode_metadata, find_edition_pda,
    find_metadata_pda, EditionContainer, MetadataAccount,
};
use crate::rpc::get_rpc_client;
use crate::spl::{fetch_mint_account, fetch_token_account};
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use std::future::Future;

/// Map a failed lookup to an absent field, logging the failure
///
/// The single place the degrade-and-continue policy lives; call sites never
/// hand-roll their own recovery.
pub async fn ok_to_fail<T, F>(tag: LogTag, what: &str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, String>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            logger::warning(tag, &format!("{} failed: {}", what, e));
            None
        }
    }
}

/// Synchronous twin of `ok_to_fail`
pub fn ok_to_fail_sync<T>(tag: LogTag, what: &str, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            logger::warning(tag, &format!("{} failed: {}", what, e));
            None
        }
    }
}

/// Enrich one candidate token; never errors
pub async fn enrich_token(base: BaseToken) -> EnrichedNft {
    let mint = base.mint;
    logger::debug(LogTag::Enrich, &format!("Processing mint {}", mint));

    // holder first: the token-account lookup depends on it
    let holder_and_token = async {
        let holder = match base.holder_address {
            Some(address) => Some(address),
            None => ok_to_fail(
                LogTag::Enrich,
                &format!("holder resolution for {}", mint),
                get_holder_by_mint(&mint),
            )
            .await
            .flatten(),
        };
        let token_account = match holder {
            Some(address) => {
                ok_to_fail(
                    LogTag::Enrich,
                    &format!("token account load for {}", mint),
                    fetch_token_account(&address),
                )
                .await
            }
            None => None,
        };
        (holder, token_account)
    };

    let mint_account_label = format!("mint account load for {}", mint);
    let mint_account = ok_to_fail(
        LogTag::Enrich,
        &mint_account_label,
        fetch_mint_account(&mint),
    );

    // metadata chain: on-chain record gates the external fetch
    let metadata_chain = async {
        let (metadata_address, onchain) = match (&base.metadata_address, &base.metadata) {
            (Some(address), Some(decoded)) => (Some(*address), Some(decoded.clone())),
            _ => {
                let address = find_metadata_pda(&mint);
                let decoded = ok_to_fail(
                    LogTag::Metadata,
                    &format!("metadata load for {}", mint),
                    load_metadata(address),
                )
                .await;
                (Some(address), decoded)
            }
        };
        let external = match &onchain {
            Some(meta) if !meta.data.uri.is_empty() => {
                ok_to_fail(
                    LogTag::Metadata,
                    &format!("external metadata fetch for {}", mint),
                    fetch_external_metadata(&meta.data.uri),
                )
                .await
            }
            _ => None,
        };
        (metadata_address, onchain, external)
    };

    let edition = resolve_edition_info(&mint);

    let ((holder, token_account), mint_account, (metadata_address, onchain, external), edition) =
        tokio::join!(holder_and_token, mint_account, metadata_chain, edition);

    let mut record = EnrichedNft {
        mint,
        holder_address: holder,
        token_account,
        mint_account,
        metadata_address,
        onchain_metadata: onchain,
        external_metadata: external,
        edition_kind: EditionInfo::None.kind().to_string(),
        edition_address: None,
        edition_record: None,
        master_edition_address: None,
        master_edition_record: None,
    };
    record.set_edition(edition);
    record
}

/// Load and decode the on-chain metadata account at `address`
///
/// A missing or undecodable account means the candidate is not an NFT; the
/// caller decides whether that drops the record or just degrades it.
pub async fn load_metadata(address: Pubkey) -> Result<MetadataAccount, String> {
    let client = get_rpc_client();
    let account = client
        .get_account(&address)
        .await
        .map_err(|e| format!("getAccount({}) failed: {}", address, e))?;
    decode_metadata(&account.data)
}

/// Fetch the off-chain JSON referenced by the on-chain URI
///
/// No schema is enforced; whatever JSON the URI serves is carried verbatim.
pub async fn fetch_external_metadata(uri: &str) -> Result<Value, String> {
    let response = crate::utils::http_client()
        .get(uri)
        .send()
        .await
        .map_err(|e| format!("GET {} failed: {}", uri, e))?;
    if !response.status().is_success() {
        return Err(format!("GET {} returned HTTP {}", uri, response.status()));
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| format!("GET {} returned malformed JSON: {}", uri, e))
}

/// Resolve the edition lineage for `mint`
///
/// Reads the edition PDA and dispatches on its discriminant byte. A missing
/// account is the legal `None` terminal state (plain non-edition metadata).
/// For a normal edition, the dependent parent lookup may fail independently,
/// leaving only the master fields absent.
async fn resolve_edition_info(mint: &Pubkey) -> EditionInfo {
    let client = get_rpc_client();
    let pda = find_edition_pda(mint);
    let account = match client.get_account_with_commitment(&pda, client.commitment()).await {
        Ok(response) => match response.value {
            Some(account) => account,
            None => return EditionInfo::None,
        },
        Err(e) => {
            logger::warning(
                LogTag::Enrich,
                &format!("edition lookup for {} failed: {}", mint, e),
            );
            return EditionInfo::None;
        }
    };

    let container = match ok_to_fail_sync(
        LogTag::Enrich,
        &format!("edition decode for {}", mint),
        decode_edition_container(&account.data),
    ) {
        Some(container) => container,
        None => return EditionInfo::None,
    };

    match container {
        EditionContainer::Edition(edition) => {
            let parent = edition.parent_pubkey();
            let master = ok_to_fail(
                LogTag::Enrich,
                &format!("parent master edition load for {}", mint),
                load_master_edition(parent),
            )
            .await;
            EditionInfo::Edition {
                edition_address: pda,
                master_edition_address: master.as_ref().map(|_| parent),
                master_edition: master,
                edition,
            }
        }
        EditionContainer::Master(master) => EditionInfo::Master {
            master_edition_address: pda,
            master_edition: master,
        },
        EditionContainer::Unknown(key) => {
            logger::debug(
                LogTag::Enrich,
                &format!("edition PDA for {} has unknown key byte {}", mint, key),
            );
            EditionInfo::None
        }
    }
}

async fn load_master_edition(
    address: Pubkey,
) -> Result<crate::metadata::MasterEditionAccount, String> {
    let client = get_rpc_client();
    let account = client
        .get_account(&address)
        .await
        .map_err(|e| format!("getAccount({}) failed: {}", address, e))?;
    decode_master_edition(&account.data)
}
