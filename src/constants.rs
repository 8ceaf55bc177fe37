/// Global constants for nftscout
///
/// Program ids, batch sizes and tuning knobs used across the crate.
/// Network endpoints can be overridden at runtime (see `rpc::init_rpc`).

/// Smallest native unit of the ledger's value token
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Default RPC endpoint (override with --rpc-url or NFTSCOUT_RPC_URL)
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Environment variable checked for an RPC endpoint override
pub const RPC_URL_ENV: &str = "NFTSCOUT_RPC_URL";

/// Per-call RPC timeout in seconds
pub const RPC_TIMEOUT_SECS: u64 = 30;

/// Timeout for off-chain HTTP fetches (metadata URIs, price APIs)
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Browser-like user agent required by some marketplace price APIs
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.3; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/86.0.4240.193 Safari/537.36";

// =============================================================================
// PROGRAM IDS
// =============================================================================

/// Token metadata program (metadata / edition / master edition accounts)
pub const TOKEN_METADATA_PROGRAM_ID: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";

/// SPL token program
pub const SPL_TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

// =============================================================================
// MARKETPLACE PROGRAM IDS
// =============================================================================

pub const SOLANART_PROGRAM_ID: &str = "CJsLwbP1iu5DuUikHEJnLfANgKy6stB2uFgvBBHoyxwz";
pub const MAGIC_EDEN_PROGRAM_ID: &str = "MEisE1HzehtrDpAAT8PnLHjpSSkRYakotTuJRPjTpo8";
pub const DIGITAL_EYEZ_PROGRAM_ID: &str = "A7p8451ktDCHq5yYaHczeLMYsjRsAkzc3hCXcSrwYHU7";
pub const ALPHA_ART_PROGRAM_ID: &str = "HZaWndaNWHFDd9Dhk5pqUUtsmoBCqzb1MLu3NAh1VX6B";
pub const EXCHANGE_ART_PROGRAM_ID: &str = "AmK5g2XcyptVLCFESBCJqoSfwV3znGoVYQnqEnaAZKWn";
pub const SOLSEA_PROGRAM_ID: &str = "617jbWo616ggkDxvW1Le8pV38XLbVSyWY8ae6QUmGBAU";
/// The SMB market runs the same codebase as DigitalEyez, so it shares its parser
pub const SMB_MARKETPLACE_PROGRAM_ID: &str = "GvQVaDNLV7zAPNx35FqWmgwuxa4B2h5tuuL73heqSf1C";

// =============================================================================
// BATCHING & CONCURRENCY
// =============================================================================

/// Cap on concurrently enriched tokens. The upstream RPC provider rate-limits
/// aggressively, so the fan-out is bounded rather than unbounded.
pub const MAX_CONCURRENT_ENRICHMENTS: usize = 16;

/// Transaction details are fetched in fixed batches (upstream batch limit)
pub const TX_BATCH_SIZE: usize = 220;

/// Concurrent transaction-detail fetches within one batch
pub const MAX_CONCURRENT_TX_FETCHES: usize = 8;

/// Page size for signature history pagination
pub const SIGNATURE_PAGE_LIMIT: usize = 1000;
