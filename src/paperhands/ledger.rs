//! Running trade ledger
//!
//! Explicit state threaded through the chronological replay and returned to
//! the caller, so repeated or concurrent runs cannot cross-contaminate.

use super::classifier::SaleEvent;
use crate::logger::{self, LogTag};
use crate::metadata::MetadataAccount;
use crate::prices::{PriceMethod, PriceStats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-mint position, updated in place as the replay progresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftPosition {
    pub mint: String,
    pub bought_at: Option<f64>,
    pub sold_at: Option<f64>,
    pub onchain_metadata: Option<MetadataAccount>,
    pub external_metadata: Option<Value>,
    pub current_prices: Option<PriceStats>,
    pub paperhanded: Option<f64>,
    pub diamondhanded: Option<f64>,
}

impl NftPosition {
    fn new(mint: &str) -> Self {
        NftPosition {
            mint: mint.to_string(),
            bought_at: None,
            sold_at: None,
            onchain_metadata: None,
            external_metadata: None,
            current_prices: None,
            paperhanded: None,
            diamondhanded: None,
        }
    }
}

/// Aggregate state of one address's marketplace history
#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    /// Total SOL paid on buys
    pub spent: f64,
    /// Total SOL received on sells
    pub earned: f64,
    /// Mints currently held (insertion order)
    pub inventory: Vec<String>,
    /// Positions keyed by mint, never deleted
    pub positions: Vec<NftPosition>,
}

impl TradeLedger {
    pub fn new() -> Self {
        TradeLedger::default()
    }

    pub fn profit(&self) -> f64 {
        self.earned - self.spent
    }

    fn position_mut(&mut self, mint: &str) -> &mut NftPosition {
        if let Some(index) = self.positions.iter().position(|p| p.mint == mint) {
            return &mut self.positions[index];
        }
        self.positions.push(NftPosition::new(mint));
        self.positions.last_mut().expect("just pushed")
    }

    fn record_buy(&mut self, mint: &str, amount: f64) {
        self.spent += amount;
        self.inventory.push(mint.to_string());
        self.position_mut(mint).bought_at = Some(amount);
    }

    fn record_sell(&mut self, mint: &str, amount: f64) {
        self.earned += amount;
        if let Some(index) = self.inventory.iter().position(|m| m == mint) {
            self.inventory.remove(index);
        }
        self.position_mut(mint).sold_at = Some(amount);
    }

    /// Apply one confirmed sale relative to the tracked address
    ///
    /// The buyer is the sole signer; if that is the tracked address the event
    /// is a buy, otherwise the tracked address was the seller.
    pub fn apply(&mut self, event: &SaleEvent, tracked_address: &str) {
        if event.buyer == tracked_address {
            logger::info(
                LogTag::Paperhands,
                &format!(
                    "Bought {} for {} SOL on {}",
                    event.mint, event.price_sol, event.marketplace
                ),
            );
            self.record_buy(&event.mint, event.price_sol);
        } else {
            logger::info(
                LogTag::Paperhands,
                &format!(
                    "Sold {} for {} SOL on {}",
                    event.mint, event.price_sol, event.marketplace
                ),
            );
            self.record_sell(&event.mint, event.price_sol);
        }
    }
}

/// Fill in paper/diamond deltas once price stats are populated
///
/// Positions without price stats are left untouched. A sold position gets the
/// paperhands delta (what was left on the table); a held one the diamondhands
/// delta (unrealized gain over cost).
pub fn populate_papers_and_diamonds(positions: &mut [NftPosition], method: PriceMethod) {
    for position in positions.iter_mut() {
        let prices = match &position.current_prices {
            Some(prices) => prices,
            None => continue,
        };
        let reference = prices.by_method(method);
        if let Some(sold_at) = position.sold_at {
            position.paperhanded = Some(sold_at - reference);
        } else if let Some(bought_at) = position.bought_at {
            position.diamondhanded = Some(reference - bought_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paperhands::classifier::Marketplace;

    const TRACKED: &str = "ownerAddr111";

    fn event(mint: &str, buyer: &str, price_sol: f64) -> SaleEvent {
        SaleEvent {
            signature: "sig".to_string(),
            marketplace: Marketplace::Solanart,
            mint: mint.to_string(),
            buyer: buyer.to_string(),
            price_sol,
        }
    }

    #[test]
    fn buy_then_sell_settles_the_position() {
        let mut ledger = TradeLedger::new();
        ledger.apply(&event("M", TRACKED, 2.5), TRACKED);
        assert_eq!(ledger.inventory, vec!["M".to_string()]);

        ledger.apply(&event("M", "someoneElse", 3.0), TRACKED);
        assert!((ledger.spent - 2.5).abs() < 1e-9);
        assert!((ledger.earned - 3.0).abs() < 1e-9);
        assert!(ledger.inventory.is_empty());
        assert!((ledger.profit() - 0.5).abs() < 1e-9);

        assert_eq!(ledger.positions.len(), 1);
        let position = &ledger.positions[0];
        assert_eq!(position.mint, "M");
        assert_eq!(position.bought_at, Some(2.5));
        assert_eq!(position.sold_at, Some(3.0));
    }

    #[test]
    fn positions_are_updated_in_place_not_duplicated() {
        let mut ledger = TradeLedger::new();
        ledger.apply(&event("M", TRACKED, 1.0), TRACKED);
        ledger.apply(&event("N", TRACKED, 2.0), TRACKED);
        ledger.apply(&event("M", "other", 1.5), TRACKED);
        assert_eq!(ledger.positions.len(), 2);
        assert_eq!(ledger.inventory, vec!["N".to_string()]);
    }

    #[test]
    fn paper_and_diamond_deltas() {
        let stats = PriceStats {
            floor: 4.0,
            mean: 5.0,
            median: 4.5,
        };

        let mut sold = NftPosition::new("M");
        sold.bought_at = Some(2.5);
        sold.sold_at = Some(3.0);
        sold.current_prices = Some(stats.clone());

        let mut held = NftPosition::new("N");
        held.bought_at = Some(2.0);
        held.current_prices = Some(stats);

        let mut unpriced = NftPosition::new("O");
        unpriced.bought_at = Some(1.0);

        let mut positions = vec![sold, held, unpriced];
        populate_papers_and_diamonds(&mut positions, PriceMethod::Median);

        // sold at 3.0, worth 4.5 now: left 1.5 on the table
        assert!((positions[0].paperhanded.unwrap() - (3.0 - 4.5)).abs() < 1e-9);
        assert!(positions[0].diamondhanded.is_none());

        // held: up 2.5 over cost
        assert!((positions[1].diamondhanded.unwrap() - 2.5).abs() < 1e-9);
        assert!(positions[1].paperhanded.is_none());

        assert!(positions[2].paperhanded.is_none());
        assert!(positions[2].diamondhanded.is_none());
    }
}
