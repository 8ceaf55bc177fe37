//! Persistence of result records as one JSON file per mint
//!
//! Records land as pretty-printed `nft-<mint>.json` files so individual
//! results stay inspectable and later runs can re-read a whole directory
//! for rarity analysis.

use crate::enrich::EnrichedNft;
use crate::logger::{self, LogTag};
use crate::paperhands::NftPosition;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Anything persistable as an `nft-<mint>.json` file
pub trait StoredRecord: Serialize {
    fn mint_string(&self) -> String;
}

impl StoredRecord for EnrichedNft {
    fn mint_string(&self) -> String {
        self.mint.to_string()
    }
}

impl StoredRecord for NftPosition {
    fn mint_string(&self) -> String {
        self.mint.clone()
    }
}

/// Write every record into `dir`, creating it as needed
pub async fn write_records<T: StoredRecord>(dir: &Path, records: &[T]) -> Result<usize, String> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| format!("cannot create {}: {}", dir.display(), e))?;

    let mut written = 0usize;
    for record in records {
        let path = dir.join(format!("nft-{}.json", record.mint_string()));
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| format!("cannot serialize record {}: {}", record.mint_string(), e))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
        written += 1;
    }
    logger::info(
        LogTag::Storage,
        &format!("wrote {} records to {}", written, dir.display()),
    );
    Ok(written)
}

/// Load every `nft-*.json` record from `dir`, in file-name order
///
/// Unparsable files are skipped with a warning; only a missing or unreadable
/// directory is an error.
pub async fn load_records(dir: &Path) -> Result<Vec<Value>, String> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| format!("cannot read {}: {}", dir.display(), e))?;

    let mut names: Vec<String> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| format!("cannot list {}: {}", dir.display(), e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("nft-") && name.ends_with(".json") {
            names.push(name);
        }
    }
    names.sort();

    let mut records = Vec::with_capacity(names.len());
    for name in names {
        let path = dir.join(&name);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(record) => records.push(record),
            Err(e) => {
                logger::warning(
                    LogTag::Storage,
                    &format!("skipping unparsable record {}: {}", path.display(), e),
                );
            }
        }
    }
    logger::info(
        LogTag::Storage,
        &format!("loaded {} records from {}", records.len(), dir.display()),
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Fake {
        mint: String,
        field: u32,
    }

    impl StoredRecord for Fake {
        fn mint_string(&self) -> String {
            self.mint.clone()
        }
    }

    #[tokio::test]
    async fn write_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            Fake {
                mint: "mintB".to_string(),
                field: 2,
            },
            Fake {
                mint: "mintA".to_string(),
                field: 1,
            },
        ];
        let written = write_records(dir.path(), &records).await.unwrap();
        assert_eq!(written, 2);

        let loaded = load_records(dir.path()).await.unwrap();
        assert_eq!(loaded.len(), 2);
        // file-name order, not write order
        assert_eq!(loaded[0], json!({"mint": "mintA", "field": 1}));
        assert_eq!(loaded[1], json!({"mint": "mintB", "field": 2}));
    }

    #[tokio::test]
    async fn unparsable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("nft-bad.json"), b"{not json")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("nft-good.json"), br#"{"mint": "good"}"#)
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), b"ignored")
            .await
            .unwrap();

        let loaded = load_records(dir.path()).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0]["mint"], "good");
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(load_records(&missing).await.is_err());
    }
}
