//! RPC utility functions

use crate::constants::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Parse a pubkey from string safely
///
/// Wrapper around `Pubkey::from_str` with better error messages.
pub fn parse_pubkey_string(s: &str) -> Result<Pubkey, String> {
    Pubkey::from_str(s).map_err(|e| format!("Invalid pubkey '{}': {}", s, e))
}

/// Convert a lamport amount to SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Convert a SOL amount to lamports
pub fn sol_to_lamports(sol_amount: f64) -> u64 {
    (sol_amount * LAMPORTS_PER_SOL as f64) as u64
}

/// Shorten an address for log output (first 4 + last 4 chars)
pub fn format_pubkey_short(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }
    format!("{}..{}", &address[..4], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lamport_conversion_roundtrips() {
        assert_eq!(sol_to_lamports(1.5), 1_500_000_000);
        assert!((lamports_to_sol(2_500_000_000) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn short_format_keeps_small_strings() {
        assert_eq!(format_pubkey_short("abcd"), "abcd");
        let long = "AGsJu1jZmFcVDPdm6bbaP54S3sMEinxmdiYWhaBBDNVX";
        let short = format_pubkey_short(long);
        assert!(short.starts_with("AGsJ"));
        assert!(short.ends_with("DNVX"));
    }

    #[test]
    fn rejects_bad_pubkeys() {
        assert!(parse_pubkey_string("not-a-key").is_err());
        assert!(parse_pubkey_string("AGsJu1jZmFcVDPdm6bbaP54S3sMEinxmdiYWhaBBDNVX").is_ok());
    }
}
