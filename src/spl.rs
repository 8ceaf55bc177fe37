//! SPL token / mint account decoding
//!
//! Thin views over the unpacked SPL state, with pubkeys as base-58 strings
//! for persistence.

use crate::logger::{self, LogTag};
use crate::rpc::get_rpc_client;
use serde::{Deserialize, Serialize};
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::{Account as SplTokenAccount, AccountState, Mint as SplMint};

/// Decoded SPL token account (one holding of one mint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAccountInfo {
    pub mint: String,
    pub owner: String,
    pub amount: u64,
    pub delegate: Option<String>,
    pub is_frozen: bool,
    pub is_native: bool,
}

/// Decoded SPL mint account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintAccountInfo {
    pub supply: u64,
    pub decimals: u8,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub is_initialized: bool,
}

/// Fetch and unpack the SPL token account at `address`
pub async fn fetch_token_account(address: &Pubkey) -> Result<TokenAccountInfo, String> {
    let client = get_rpc_client();
    let account = client
        .get_account(address)
        .await
        .map_err(|e| format!("getAccount({}) failed: {}", address, e))?;
    let state = SplTokenAccount::unpack(&account.data)
        .map_err(|e| format!("account {} is not an SPL token account: {}", address, e))?;

    logger::verbose(
        LogTag::Enrich,
        &format!("token account {}: amount={}", address, state.amount),
    );

    Ok(TokenAccountInfo {
        mint: state.mint.to_string(),
        owner: state.owner.to_string(),
        amount: state.amount,
        delegate: Option::<Pubkey>::from(state.delegate).map(|d| d.to_string()),
        is_frozen: state.state == AccountState::Frozen,
        is_native: state.is_native.is_some(),
    })
}

/// Fetch and unpack the SPL mint account for `mint`
pub async fn fetch_mint_account(mint: &Pubkey) -> Result<MintAccountInfo, String> {
    let client = get_rpc_client();
    let account = client
        .get_account(mint)
        .await
        .map_err(|e| format!("getAccount({}) failed: {}", mint, e))?;
    let state = SplMint::unpack(&account.data)
        .map_err(|e| format!("account {} is not an SPL mint: {}", mint, e))?;

    Ok(MintAccountInfo {
        supply: state.supply,
        decimals: state.decimals,
        mint_authority: Option::<Pubkey>::from(state.mint_authority).map(|a| a.to_string()),
        freeze_authority: Option::<Pubkey>::from(state.freeze_authority).map(|a| a.to_string()),
        is_initialized: state.is_initialized,
    })
}
