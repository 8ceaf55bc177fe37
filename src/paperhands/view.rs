//! Flat transaction view for marketplace classification
//!
//! Classification needs only a handful of fields from a jsonParsed
//! transaction; extracting them into an owned view keeps the classifier pure
//! and testable without RPC types.

use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInstruction, UiMessage,
    UiParsedInstruction,
};

#[derive(Debug, Clone)]
pub struct AccountKeyView {
    pub pubkey: String,
    pub signer: bool,
}

/// Everything the marketplace classifier reads from one transaction
#[derive(Debug, Clone)]
pub struct MarketTxView {
    pub signature: String,
    /// Target program of the last instruction - the counterparty program
    pub program_id: String,
    /// Opaque payload of the last instruction, hex encoded
    pub ix_data_hex: String,
    pub log_messages: Vec<String>,
    pub account_keys: Vec<AccountKeyView>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    /// Mint of the first pre-transaction token balance entry
    pub pre_token_mint: Option<String>,
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Extract a classifier view from a fetched transaction
///
/// Any missing piece makes the transaction unclassifiable; the caller skips
/// it and the replay continues.
pub fn extract_view(
    tx: &EncodedConfirmedTransactionWithStatusMeta,
) -> Result<MarketTxView, String> {
    let meta = tx
        .transaction
        .meta
        .as_ref()
        .ok_or("transaction has no meta")?;
    let ui_tx = match &tx.transaction.transaction {
        EncodedTransaction::Json(ui_tx) => ui_tx,
        _ => return Err("unexpected transaction encoding".to_string()),
    };
    let message = match &ui_tx.message {
        UiMessage::Parsed(message) => message,
        UiMessage::Raw(_) => return Err("expected a jsonParsed message".to_string()),
    };

    let signature = ui_tx
        .signatures
        .first()
        .cloned()
        .ok_or("transaction has no signatures")?;

    let last_ix = message
        .instructions
        .last()
        .ok_or("transaction has no instructions")?;
    let (program_id, data_b58) = match last_ix {
        UiInstruction::Parsed(UiParsedInstruction::PartiallyDecoded(ix)) => {
            (ix.program_id.clone(), ix.data.clone())
        }
        // instructions of well-known programs arrive pre-parsed without raw
        // data; none of the marketplaces fall in that set
        UiInstruction::Parsed(UiParsedInstruction::Parsed(ix)) => {
            (ix.program_id.clone(), String::new())
        }
        UiInstruction::Compiled(_) => {
            return Err("unexpected compiled instruction in parsed message".to_string())
        }
    };
    let raw_data = bs58::decode(&data_b58)
        .into_vec()
        .map_err(|e| format!("instruction data is not base-58: {}", e))?;

    let log_messages = match &meta.log_messages {
        OptionSerializer::Some(logs) => logs.clone(),
        _ => Vec::new(),
    };
    let pre_token_mint = match &meta.pre_token_balances {
        OptionSerializer::Some(balances) => balances.first().map(|b| b.mint.clone()),
        _ => None,
    };

    Ok(MarketTxView {
        signature,
        program_id,
        ix_data_hex: bytes_to_hex(&raw_data),
        log_messages,
        account_keys: message
            .account_keys
            .iter()
            .map(|key| AccountKeyView {
                pubkey: key.pubkey.clone(),
                signer: key.signer,
            })
            .collect(),
        pre_balances: meta.pre_balances.clone(),
        post_balances: meta.post_balances.clone(),
        pre_token_mint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_encoding_is_lowercase_two_chars_per_byte() {
        assert_eq!(bytes_to_hex(&[0x05, 0x00, 0xff]), "0500ff");
        assert_eq!(bytes_to_hex(&[]), "");
    }
}
