//! Marketplace listing prices and per-collection stats
//!
//! Listings are pulled from the public Solanart, DigitalEyez and MagicEden
//! APIs, keyed by a collection's first verified creator. Each API is
//! best-effort; whatever subset responds feeds the stats. A per-run cache
//! keeps one fetch per creator no matter how many NFTs share it.

use crate::constants::BROWSER_USER_AGENT;
use crate::enrich::ok_to_fail;
use crate::logger::{self, LogTag};
use crate::rpc::{format_pubkey_short, lamports_to_sol};
use crate::utils::http_client;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Which statistic to use as the reference price
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceMethod {
    Floor,
    Mean,
    Median,
}

/// Listing price statistics for one collection, in SOL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceStats {
    pub floor: f64,
    pub mean: f64,
    pub median: f64,
}

impl PriceStats {
    pub fn by_method(&self, method: PriceMethod) -> f64 {
        match method {
            PriceMethod::Floor => self.floor,
            PriceMethod::Mean => self.mean,
            PriceMethod::Median => self.median,
        }
    }
}

/// Compute floor/mean/median over a set of listing prices
///
/// An empty set has no stats; callers treat that as "no price data".
pub fn calc_stats(prices: &[f64]) -> Result<PriceStats, String> {
    if prices.is_empty() {
        return Err("no prices to aggregate".to_string());
    }
    let mut sorted = prices.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("prices are finite"));

    let floor = sorted[0];
    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
    let half = sorted.len() / 2;
    let median = if sorted.len() % 2 == 1 {
        sorted[half]
    } else {
        (sorted[half - 1] + sorted[half]) / 2.0
    };
    Ok(PriceStats { floor, mean, median })
}

// =============================================================================
// COLLECTION SLUGS
// =============================================================================

/// Per-marketplace collection identifiers, looked up by first verified creator
struct CollectionSlugs {
    solanart: Option<&'static str>,
    digital_eyez: Option<&'static str>,
    magic_eden: Option<&'static str>,
}

fn collection_slugs(creator: &str) -> Option<CollectionSlugs> {
    // known collections; creators without an entry simply get no price stats
    match creator {
        // Degenerate Ape Academy
        "9BKWqDHfHZh9j39xakYVMdr6hXmCLHH5VfCpeq2idU9L" => Some(CollectionSlugs {
            solanart: Some("degenape"),
            digital_eyez: Some("Degenerate%20Ape%20Academy"),
            magic_eden: Some("degenerate_ape_academy"),
        }),
        // Solana Monkey Business
        "9uBX3ASjxWvNBAD1xjbVaKA74mWGZys3RGSF7DdeDD3F" => Some(CollectionSlugs {
            solanart: None,
            digital_eyez: Some("Solana%20Monkey%20Business"),
            magic_eden: Some("solana_monkey_business"),
        }),
        // Boryoku Dragonz
        "DRGNjvBvnXNiQz9dTppGk1tAsVxtJsvhEmojEfBU3ezf" => Some(CollectionSlugs {
            solanart: None,
            digital_eyez: None,
            magic_eden: Some("boryoku_dragonz"),
        }),
        // Saiba Gang
        "BHVPUojZvH2mWo5T6ZCJQnyqMTe4McHsXGSJutezTPGE" => Some(CollectionSlugs {
            solanart: Some("saibagang"),
            digital_eyez: None,
            magic_eden: Some("saiba_gang"),
        }),
        // SolPunks
        "F5FKqzjucNDYymjHLxMR2uBT43QmaqBAMJwjwkvRRw4A" => Some(CollectionSlugs {
            solanart: Some("solpunks"),
            digital_eyez: None,
            magic_eden: Some("solpunks"),
        }),
        // Thugbirdz
        "AvkbtawpmMSy571f71WsWEn41ATHg5iHw27LoYJdk8QA" => Some(CollectionSlugs {
            solanart: Some("thugbirdz"),
            digital_eyez: Some("Thugbirdz"),
            magic_eden: Some("thugbirdz"),
        }),
        // Skeleton Crew SKULLS
        "Bhr9iWx7vAZ4JDD5DVSdHxQLqG9RvCLCSXvu6yC4TF6c" => Some(CollectionSlugs {
            solanart: Some("skeletoncrew"),
            digital_eyez: Some("Skeleton%20Crew%20SKULLS"),
            magic_eden: Some("skeleton_crew_skulls"),
        }),
        _ => None,
    }
}

// =============================================================================
// MARKETPLACE APIS
// =============================================================================

#[derive(Deserialize)]
struct SolanartListing {
    price: f64,
}

#[derive(Deserialize)]
struct DigitalEyezResponse {
    offers: Vec<DigitalEyezOffer>,
}

#[derive(Deserialize)]
struct DigitalEyezOffer {
    price: u64,
}

#[derive(Deserialize)]
struct MagicEdenResponse {
    results: Vec<MagicEdenListing>,
}

#[derive(Deserialize)]
struct MagicEdenListing {
    price: f64,
}

async fn get_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = http_client()
        .get(url)
        .header("user-agent", BROWSER_USER_AGENT)
        .send()
        .await
        .map_err(|e| format!("request to {} failed: {}", url, e))?;
    if !response.status().is_success() {
        return Err(format!("{} returned status {}", url, response.status()));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| format!("bad response body from {}: {}", url, e))
}

async fn fetch_solanart_prices(slug: &str) -> Result<Vec<f64>, String> {
    let url = format!(
        "https://qzlsklfacc.medianetwork.cloud/nft_for_sale?collection={}",
        slug
    );
    let listings: Vec<SolanartListing> = get_json(&url).await?;
    Ok(listings.into_iter().map(|l| l.price).collect())
}

async fn fetch_digital_eyez_prices(slug: &str) -> Result<Vec<f64>, String> {
    let url = format!(
        "https://us-central1-digitaleyes-prod.cloudfunctions.net/offers-retriever?collection={}",
        slug
    );
    let response: DigitalEyezResponse = get_json(&url).await?;
    // DigitalEyez quotes lamports, the others quote SOL
    Ok(response
        .offers
        .into_iter()
        .map(|o| lamports_to_sol(o.price))
        .collect())
}

async fn fetch_magic_eden_prices(slug: &str) -> Result<Vec<f64>, String> {
    let query = format!(
        "%7B%22$match%22:%7B%22collectionSymbol%22:%22{}%22%7D,\
         %22$sort%22:%7B%22takerAmount%22:1,%22createdAt%22:-1%7D,%22$skip%22:0,%22$limit%22:20%7D",
        slug
    );
    let url = format!(
        "https://api-mainnet.magiceden.io/rpc/getListedNFTsByQuery?q={}",
        query
    );
    let response: MagicEdenResponse = get_json(&url).await?;
    Ok(response.results.into_iter().map(|l| l.price).collect())
}

// =============================================================================
// PER-RUN CACHE
// =============================================================================

/// Listing prices per creator, fetched at most once per run
///
/// The lock is held across the fetch so concurrent lookups of the same
/// creator do not race each other into duplicate API calls.
pub struct PriceCache {
    by_creator: Mutex<HashMap<String, Vec<f64>>>,
}

impl PriceCache {
    pub fn new() -> Self {
        PriceCache {
            by_creator: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch listings for a creator's collection and aggregate them
    ///
    /// Returns `None` when the creator is unknown or every API failed.
    pub async fn fetch_and_calc_stats(&self, creator: &str) -> Option<PriceStats> {
        let mut cache = self.by_creator.lock().await;
        if !cache.contains_key(creator) {
            let prices = fetch_all_prices(creator).await;
            logger::debug(
                LogTag::Prices,
                &format!("fetched {} listing prices for creator {}", prices.len(), creator),
            );
            cache.insert(creator.to_string(), prices);
        }
        let prices = cache.get(creator).expect("just inserted");
        if prices.is_empty() {
            return None;
        }
        match calc_stats(prices) {
            Ok(stats) => {
                logger::debug(
                    LogTag::Prices,
                    &format!(
                        "creator {}: floor {} / mean {} / median {}",
                        creator, stats.floor, stats.mean, stats.median
                    ),
                );
                Some(stats)
            }
            Err(e) => {
                logger::warning(LogTag::Prices, &format!("stats for {}: {}", creator, e));
                None
            }
        }
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        PriceCache::new()
    }
}

async fn fetch_all_prices(creator: &str) -> Vec<f64> {
    let slugs = match collection_slugs(creator) {
        Some(slugs) => slugs,
        None => {
            logger::debug(
                LogTag::Prices,
                &format!(
                    "creator {} is not a known collection",
                    format_pubkey_short(creator)
                ),
            );
            return Vec::new();
        }
    };

    let mut prices = Vec::new();
    if let Some(slug) = slugs.solanart {
        if let Some(batch) =
            ok_to_fail(LogTag::Prices, "Solanart prices", fetch_solanart_prices(slug)).await
        {
            prices.extend(batch);
        }
    }
    if let Some(slug) = slugs.digital_eyez {
        if let Some(batch) = ok_to_fail(
            LogTag::Prices,
            "DigitalEyez prices",
            fetch_digital_eyez_prices(slug),
        )
        .await
        {
            prices.extend(batch);
        }
    }
    if let Some(slug) = slugs.magic_eden {
        if let Some(batch) = ok_to_fail(
            LogTag::Prices,
            "MagicEden prices",
            fetch_magic_eden_prices(slug),
        )
        .await
        {
            prices.extend(batch);
        }
    }
    prices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_over_odd_count() {
        let stats = calc_stats(&[3.0, 1.0, 2.0]).unwrap();
        assert!((stats.floor - 1.0).abs() < 1e-9);
        assert!((stats.mean - 2.0).abs() < 1e-9);
        assert!((stats.median - 2.0).abs() < 1e-9);
    }

    #[test]
    fn stats_over_even_count() {
        let stats = calc_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((stats.floor - 1.0).abs() < 1e-9);
        assert!((stats.mean - 2.5).abs() < 1e-9);
        assert!((stats.median - 2.5).abs() < 1e-9);
    }

    #[test]
    fn empty_input_has_no_stats() {
        assert!(calc_stats(&[]).is_err());
    }

    #[test]
    fn method_selects_the_right_statistic() {
        let stats = PriceStats {
            floor: 1.0,
            mean: 2.0,
            median: 3.0,
        };
        assert_eq!(stats.by_method(PriceMethod::Floor), 1.0);
        assert_eq!(stats.by_method(PriceMethod::Mean), 2.0);
        assert_eq!(stats.by_method(PriceMethod::Median), 3.0);
    }

    #[tokio::test]
    async fn unknown_creator_yields_no_stats() {
        let cache = PriceCache::new();
        assert!(cache.fetch_and_calc_stats("unknownCreator111").await.is_none());
    }
}
