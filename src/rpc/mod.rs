//! RPC client access
//!
//! One shared nonblocking client behind a lazily initialized global, the same
//! accessor pattern the rest of the crate uses for shared resources. Every call
//! carries a timeout so a hung endpoint cannot block a batch forever.

mod utils;

pub use utils::{format_pubkey_short, lamports_to_sol, parse_pubkey_string, sol_to_lamports};

use crate::constants::{DEFAULT_RPC_URL, RPC_TIMEOUT_SECS, RPC_URL_ENV};
use crate::logger::{self, LogTag};
use once_cell::sync::Lazy;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::{Arc, RwLock};
use std::time::Duration;

static RPC_CLIENT: Lazy<RwLock<Option<Arc<RpcClient>>>> = Lazy::new(|| RwLock::new(None));

fn build_client(url: &str) -> Arc<RpcClient> {
    Arc::new(RpcClient::new_with_timeout_and_commitment(
        url.to_string(),
        Duration::from_secs(RPC_TIMEOUT_SECS),
        CommitmentConfig::confirmed(),
    ))
}

/// Resolve the endpoint to use when none was configured explicitly
fn default_url() -> String {
    std::env::var(RPC_URL_ENV).unwrap_or_else(|_| DEFAULT_RPC_URL.to_string())
}

/// Point the global client at a specific endpoint
///
/// Call before any RPC work; later calls replace the client.
pub fn init_rpc(url: &str) {
    logger::info(LogTag::Rpc, &format!("Using RPC endpoint: {}", url));
    if let Ok(mut slot) = RPC_CLIENT.write() {
        *slot = Some(build_client(url));
    }
}

/// Get the shared RPC client, creating one from the environment on first use
pub fn get_rpc_client() -> Arc<RpcClient> {
    if let Ok(slot) = RPC_CLIENT.read() {
        if let Some(client) = slot.as_ref() {
            return Arc::clone(client);
        }
    }
    let client = build_client(&default_url());
    if let Ok(mut slot) = RPC_CLIENT.write() {
        if slot.is_none() {
            *slot = Some(Arc::clone(&client));
        }
        if let Some(existing) = slot.as_ref() {
            return Arc::clone(existing);
        }
    }
    client
}
