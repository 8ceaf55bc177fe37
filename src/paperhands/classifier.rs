//! Marketplace transaction classification
//!
//! A static program-id table maps the counterparty program to a marketplace;
//! each marketplace then confirms a genuine purchase from its instruction
//! discriminant. Several marketplaces reuse the buy instruction for
//! seller-initiated cancellations, so they need a secondary check before a
//! transaction counts as a sale.

use super::view::{AccountKeyView, MarketTxView};
use crate::constants::{
    ALPHA_ART_PROGRAM_ID, DIGITAL_EYEZ_PROGRAM_ID, EXCHANGE_ART_PROGRAM_ID,
    MAGIC_EDEN_PROGRAM_ID, SMB_MARKETPLACE_PROGRAM_ID, SOLANART_PROGRAM_ID, SOLSEA_PROGRAM_ID,
};
use crate::logger::{self, LogTag};
use crate::rpc::lamports_to_sol;

/// Log line emitted by the DigitalEyez program only on real sales
/// (typo included - it is the program's actual output)
const DIGITAL_EYEZ_SALE_MARKER: &str = "Program log: Transfering sales tax";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marketplace {
    Solanart,
    MagicEden,
    DigitalEyez,
    AlphaArt,
    ExchangeArt,
    SolSea,
    SmbMarketplace,
}

impl Marketplace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marketplace::Solanart => "Solanart",
            Marketplace::MagicEden => "MagicEden",
            Marketplace::DigitalEyez => "DigitalEyez",
            Marketplace::AlphaArt => "AlphaArt",
            Marketplace::ExchangeArt => "ExchangeArt",
            Marketplace::SolSea => "SolSea",
            Marketplace::SmbMarketplace => "SMB marketplace",
        }
    }
}

impl std::fmt::Display for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static counterparty table; unknown programs are ignored, not errors
pub fn marketplace_for_program(program_id: &str) -> Option<Marketplace> {
    match program_id {
        SOLANART_PROGRAM_ID => Some(Marketplace::Solanart),
        MAGIC_EDEN_PROGRAM_ID => Some(Marketplace::MagicEden),
        DIGITAL_EYEZ_PROGRAM_ID => Some(Marketplace::DigitalEyez),
        ALPHA_ART_PROGRAM_ID => Some(Marketplace::AlphaArt),
        EXCHANGE_ART_PROGRAM_ID => Some(Marketplace::ExchangeArt),
        SOLSEA_PROGRAM_ID => Some(Marketplace::SolSea),
        SMB_MARKETPLACE_PROGRAM_ID => Some(Marketplace::SmbMarketplace),
        _ => None,
    }
}

// =============================================================================
// PER-MARKETPLACE PURCHASE RECOGNIZERS
// =============================================================================

fn is_solanart_purchase(view: &MarketTxView) -> bool {
    let data = view.ix_data_hex.as_str();
    if !data.starts_with("05") {
        return false;
    }
    // the buy instruction doubles as a cancellation with an all-zero payload
    &data[2..] != "0000000000000000"
}

fn is_magic_eden_purchase(view: &MarketTxView) -> bool {
    view.ix_data_hex.len() >= 3 && &view.ix_data_hex[..3] == "438"
}

fn is_digital_eyez_purchase(view: &MarketTxView) -> bool {
    // purchase and cancellation share the same instruction data; only real
    // sales emit the sales-tax transfer in the program log
    view.ix_data_hex.starts_with("01")
        && view
            .log_messages
            .iter()
            .any(|line| line == DIGITAL_EYEZ_SALE_MARKER)
}

fn is_alpha_art_purchase(view: &MarketTxView) -> bool {
    view.ix_data_hex.starts_with("02")
}

fn is_exchange_art_purchase(view: &MarketTxView) -> bool {
    view.ix_data_hex.starts_with("01")
}

fn is_solsea_purchase(view: &MarketTxView) -> bool {
    view.ix_data_hex.starts_with("02")
}

/// Confirm the transaction is a genuine purchase on `marketplace`
pub fn is_purchase(marketplace: Marketplace, view: &MarketTxView) -> bool {
    match marketplace {
        Marketplace::Solanart => is_solanart_purchase(view),
        Marketplace::MagicEden => is_magic_eden_purchase(view),
        // the SMB market runs the DigitalEyez codebase
        Marketplace::DigitalEyez | Marketplace::SmbMarketplace => is_digital_eyez_purchase(view),
        Marketplace::AlphaArt => is_alpha_art_purchase(view),
        Marketplace::ExchangeArt => is_exchange_art_purchase(view),
        Marketplace::SolSea => is_solsea_purchase(view),
    }
}

// =============================================================================
// SALE EVENT EXTRACTION
// =============================================================================

/// A confirmed marketplace purchase
#[derive(Debug, Clone)]
pub struct SaleEvent {
    pub signature: String,
    pub marketplace: Marketplace,
    pub mint: String,
    /// The sole transaction signer
    pub buyer: String,
    /// Buyer's lamport delta converted to SOL
    pub price_sol: f64,
}

fn find_signer(account_keys: &[AccountKeyView]) -> Option<(usize, &str)> {
    account_keys
        .iter()
        .enumerate()
        .find(|(_, key)| key.signer)
        .map(|(i, key)| (i, key.pubkey.as_str()))
}

/// Classify one transaction view into a sale event
///
/// Unknown counterparty programs and unconfirmed purchases return `None`;
/// so does any structural defect (no signer, missing balances) - a single
/// transaction's failure never aborts the replay.
pub fn classify_transaction(view: &MarketTxView) -> Option<SaleEvent> {
    let marketplace = marketplace_for_program(&view.program_id)?;
    logger::debug(
        LogTag::Paperhands,
        &format!("tx {} is {}", view.signature, marketplace),
    );
    if !is_purchase(marketplace, view) {
        return None;
    }

    let mint = match &view.pre_token_mint {
        Some(mint) => mint.clone(),
        None => {
            logger::warning(
                LogTag::Paperhands,
                &format!("tx {} has no pre token balances, skipping", view.signature),
            );
            return None;
        }
    };
    let (buyer_index, buyer) = match find_signer(&view.account_keys) {
        Some(found) => found,
        None => {
            logger::warning(
                LogTag::Paperhands,
                &format!("tx {} has no signer, skipping", view.signature),
            );
            return None;
        }
    };
    let pre = *view.pre_balances.get(buyer_index)?;
    let post = *view.post_balances.get(buyer_index)?;
    let price_sol = lamports_to_sol(pre) - lamports_to_sol(post);

    Some(SaleEvent {
        signature: view.signature.clone(),
        marketplace,
        mint,
        buyer: buyer.to_string(),
        price_sol,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(program_id: &str, ix_data_hex: &str) -> MarketTxView {
        MarketTxView {
            signature: "sig111".to_string(),
            program_id: program_id.to_string(),
            ix_data_hex: ix_data_hex.to_string(),
            log_messages: Vec::new(),
            account_keys: vec![
                AccountKeyView {
                    pubkey: "buyer1111111111111111111111111111111111111".to_string(),
                    signer: true,
                },
                AccountKeyView {
                    pubkey: "seller111111111111111111111111111111111111".to_string(),
                    signer: false,
                },
            ],
            pre_balances: vec![5_000_000_000, 100],
            post_balances: vec![2_500_000_000, 100],
            pre_token_mint: Some("mintA".to_string()),
        }
    }

    #[test]
    fn unknown_program_is_ignored() {
        let v = view("11111111111111111111111111111111", "05ff");
        assert!(classify_transaction(&v).is_none());
    }

    #[test]
    fn solanart_purchase_is_recognized() {
        let v = view(SOLANART_PROGRAM_ID, "05a1b2c3");
        let event = classify_transaction(&v).expect("should classify");
        assert_eq!(event.marketplace, Marketplace::Solanart);
        assert_eq!(event.mint, "mintA");
        assert!((event.price_sol - 2.5).abs() < 1e-9);
    }

    #[test]
    fn solanart_cancellation_is_ignored() {
        // same buy discriminant, all-zero payload = cancellation
        let v = view(SOLANART_PROGRAM_ID, "050000000000000000");
        assert!(classify_transaction(&v).is_none());
    }

    #[test]
    fn digital_eyez_needs_the_sales_tax_log_marker() {
        let mut v = view(DIGITAL_EYEZ_PROGRAM_ID, "01aa");
        assert!(classify_transaction(&v).is_none());

        v.log_messages = vec![
            "Program log: Instruction Buy".to_string(),
            DIGITAL_EYEZ_SALE_MARKER.to_string(),
        ];
        let event = classify_transaction(&v).expect("should classify with marker");
        assert_eq!(event.marketplace, Marketplace::DigitalEyez);
    }

    #[test]
    fn smb_marketplace_shares_the_digital_eyez_recognizer() {
        let mut v = view(SMB_MARKETPLACE_PROGRAM_ID, "01aa");
        v.log_messages = vec![DIGITAL_EYEZ_SALE_MARKER.to_string()];
        let event = classify_transaction(&v).expect("should classify");
        assert_eq!(event.marketplace, Marketplace::SmbMarketplace);
    }

    #[test]
    fn magic_eden_uses_the_three_char_discriminant() {
        let v = view(MAGIC_EDEN_PROGRAM_ID, "438aa0");
        assert!(classify_transaction(&v).is_some());
        let v = view(MAGIC_EDEN_PROGRAM_ID, "4f8aa0");
        assert!(classify_transaction(&v).is_none());
    }

    #[test]
    fn structural_defects_skip_the_transaction() {
        let mut v = view(SOLANART_PROGRAM_ID, "05a1");
        v.pre_token_mint = None;
        assert!(classify_transaction(&v).is_none());

        let mut v = view(SOLANART_PROGRAM_ID, "05a1");
        for key in &mut v.account_keys {
            key.signer = false;
        }
        assert!(classify_transaction(&v).is_none());
    }
}
