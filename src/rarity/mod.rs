//! Statistical rarity ranking over stored enrichment records
//!
//! Rarity is inverse attribute frequency within the analyzed batch itself:
//! an attribute value shared by `count` of `batch_size` records scores
//! `batch_size / count`, and a record's total is the sum over its attributes.
//! The batch is the statistical universe; no external rarity oracle is
//! consulted.

use crate::logger::{self, LogTag};
use serde_json::{json, Value};
use std::collections::HashMap;

/// One (trait_type, value) pair pulled from a record's off-chain metadata
type Attribute = (String, String);

fn value_as_key(value: &Value) -> String {
    // numeric trait values key the same as their string form
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extract the attribute pairs of one record, empty when absent or malformed
pub fn attributes_of(record: &Value) -> Vec<Attribute> {
    let attributes = match record
        .get("external_metadata")
        .and_then(|m| m.get("attributes"))
        .and_then(|a| a.as_array())
    {
        Some(attributes) => attributes,
        None => return Vec::new(),
    };
    attributes
        .iter()
        .filter_map(|entry| {
            let trait_type = entry.get("trait_type")?.as_str()?.to_string();
            let value = value_as_key(entry.get("value")?);
            Some((trait_type, value))
        })
        .collect()
}

/// Count how often each attribute pair occurs across the batch
pub fn count_attributes(records: &[Value]) -> HashMap<Attribute, usize> {
    let mut counts: HashMap<Attribute, usize> = HashMap::new();
    for record in records {
        for attribute in attributes_of(record) {
            *counts.entry(attribute).or_insert(0) += 1;
        }
    }
    counts
}

/// Score and rank a batch of records by rarity, rarest first
///
/// Every record gets a `total_score` and a `rarity_rank` field; records
/// without attributes score zero and rank behind everything scored. Ties
/// keep their input order.
pub fn rank_by_rarity(mut records: Vec<Value>) -> Vec<Value> {
    let batch_size = records.len();
    let counts = count_attributes(&records);
    logger::debug(
        LogTag::Rarity,
        &format!(
            "{} records, {} distinct attribute values",
            batch_size,
            counts.len()
        ),
    );

    for record in records.iter_mut() {
        let total: f64 = attributes_of(record)
            .into_iter()
            .map(|attribute| {
                let count = *counts.get(&attribute).expect("counted above");
                batch_size as f64 / count as f64
            })
            .sum();
        record["total_score"] = json!(total);
    }

    records.sort_by(|a, b| {
        let score_a = a["total_score"].as_f64().unwrap_or(0.0);
        let score_b = b["total_score"].as_f64().unwrap_or(0.0);
        score_b.partial_cmp(&score_a).expect("scores are finite")
    });
    for (rank, record) in records.iter_mut().enumerate() {
        record["rarity_rank"] = json!(rank);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mint: &str, attributes: Value) -> Value {
        json!({
            "mint": mint,
            "external_metadata": { "attributes": attributes }
        })
    }

    #[test]
    fn unique_attribute_scores_batch_size() {
        // one record out of four carries the hat; the other three share none
        let mut records = vec![record("a", json!([{"trait_type": "hat", "value": "crown"}]))];
        for mint in ["b", "c", "d"] {
            records.push(record(mint, json!([{"trait_type": "hat", "value": "cap"}])));
        }
        let ranked = rank_by_rarity(records);
        assert_eq!(ranked[0]["mint"], "a");
        assert!((ranked[0]["total_score"].as_f64().unwrap() - 4.0).abs() < 1e-9);
        // the common value appears 3 of 4 times
        assert!((ranked[1]["total_score"].as_f64().unwrap() - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn universal_attribute_scores_one() {
        let records: Vec<Value> = (0..4)
            .map(|i| {
                record(
                    &format!("m{}", i),
                    json!([{"trait_type": "bg", "value": "blue"}]),
                )
            })
            .collect();
        let ranked = rank_by_rarity(records);
        for r in &ranked {
            assert!((r["total_score"].as_f64().unwrap() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ranks_are_dense_and_descending() {
        let records = vec![
            record("common", json!([{"trait_type": "bg", "value": "blue"}])),
            record(
                "rare",
                json!([
                    {"trait_type": "bg", "value": "gold"},
                    {"trait_type": "hat", "value": "crown"}
                ]),
            ),
            record("plain", json!([{"trait_type": "bg", "value": "blue"}])),
        ];
        let ranked = rank_by_rarity(records);
        assert_eq!(ranked[0]["mint"], "rare");
        assert_eq!(ranked[0]["rarity_rank"], 0);
        assert_eq!(ranked[1]["rarity_rank"], 1);
        assert_eq!(ranked[2]["rarity_rank"], 2);
        // tied records keep input order
        assert_eq!(ranked[1]["mint"], "common");
        assert_eq!(ranked[2]["mint"], "plain");
    }

    #[test]
    fn records_without_attributes_rank_last_with_zero_score() {
        let records = vec![
            json!({"mint": "bare"}),
            record("attributed", json!([{"trait_type": "bg", "value": "blue"}])),
        ];
        let ranked = rank_by_rarity(records);
        assert_eq!(ranked[0]["mint"], "attributed");
        assert_eq!(ranked[1]["mint"], "bare");
        assert_eq!(ranked[1]["total_score"].as_f64().unwrap(), 0.0);
    }

    #[test]
    fn numeric_trait_values_are_counted() {
        let records = vec![
            record("a", json!([{"trait_type": "level", "value": 3}])),
            record("b", json!([{"trait_type": "level", "value": 3}])),
        ];
        let counts = count_attributes(&records);
        assert_eq!(counts.get(&("level".to_string(), "3".to_string())), Some(&2));
    }
}
