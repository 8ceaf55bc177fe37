/// Shared helpers: the crate-wide HTTP client and serde adapters
///
/// Pubkeys serialize as their canonical base-58 string form so persisted
/// records stay readable and stable across runs.
use crate::constants::HTTP_TIMEOUT_SECS;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serializer};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Shared HTTP client with a global timeout
///
/// Used for off-chain metadata URIs and marketplace price APIs.
pub fn http_client() -> &'static reqwest::Client {
    &HTTP_CLIENT
}

/// Serialize/deserialize a `Pubkey` as a base-58 string
pub mod as_base58 {
    use super::*;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&key.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Serialize/deserialize an `Option<Pubkey>` as an optional base-58 string
pub mod as_base58_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        key: &Option<Pubkey>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match key {
            Some(k) => serializer.serialize_some(&k.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Pubkey>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s {
            Some(s) => Pubkey::from_str(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Serialize/deserialize a raw 32-byte address as a base-58 string
///
/// Used by the borsh account layouts, which keep addresses as `[u8; 32]`.
pub mod bytes_base58 {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&bs58::encode(bytes).into_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let decoded = bs58::decode(&s)
            .into_vec()
            .map_err(serde::de::Error::custom)?;
        decoded
            .try_into()
            .map_err(|_| serde::de::Error::custom(format!("expected 32 bytes in '{}'", s)))
    }
}
