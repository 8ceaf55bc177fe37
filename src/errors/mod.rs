/// Structured error types for nftscout
///
/// Only input validation is fatal; every per-field lookup failure is recovered
/// at its call site and downgrades the field to absent (see `enrich::ok_to_fail`).

// =============================================================================
// MAIN ERROR TYPE
// =============================================================================

#[derive(Debug, Clone)]
pub enum NftScoutError {
    /// Invalid caller input - the only fatal error class
    Input(InputError),

    /// Ledger RPC call failures
    Rpc(RpcError),

    /// On-chain account decode failures
    Decode(DecodeError),

    /// Off-chain HTTP failures
    Network(NetworkError),

    /// Malformed or missing data in otherwise valid responses
    Data(DataError),
}

impl std::fmt::Display for NftScoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NftScoutError::Input(e) => write!(f, "Input Error: {}", e),
            NftScoutError::Rpc(e) => write!(f, "RPC Error: {}", e),
            NftScoutError::Decode(e) => write!(f, "Decode Error: {}", e),
            NftScoutError::Network(e) => write!(f, "Network Error: {}", e),
            NftScoutError::Data(e) => write!(f, "Data Error: {}", e),
        }
    }
}

impl std::error::Error for NftScoutError {}

impl NftScoutError {
    /// Whether this error should terminate the process with a non-zero code
    ///
    /// Per the error design, only input validation is fatal; everything else
    /// degrades to absent fields and the process still exits zero.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NftScoutError::Input(_))
    }
}

// =============================================================================
// INPUT ERRORS
// =============================================================================

#[derive(Debug, Clone)]
pub enum InputError {
    /// No selector was provided at all
    MissingSelector,
    /// More than one selector was provided; callers must pick exactly one
    AmbiguousSelector { provided: Vec<String> },
    /// A selector value failed base-58 parsing
    InvalidPubkey { value: String, reason: String },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::MissingSelector => {
                write!(
                    f,
                    "You must pass exactly one of owner / creator / mint / update-authority"
                )
            }
            InputError::AmbiguousSelector { provided } => {
                write!(
                    f,
                    "Pass exactly one selector, got {}: {}",
                    provided.len(),
                    provided.join(", ")
                )
            }
            InputError::InvalidPubkey { value, reason } => {
                write!(f, "Invalid pubkey '{}': {}", value, reason)
            }
        }
    }
}

// =============================================================================
// RPC ERRORS
// =============================================================================

#[derive(Debug, Clone)]
pub enum RpcError {
    Request { method: String, reason: String },
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RpcError::Request { method, reason } => {
                write!(f, "{} failed: {}", method, reason)
            }
        }
    }
}

// =============================================================================
// DECODE ERRORS
// =============================================================================

#[derive(Debug, Clone)]
pub enum DecodeError {
    Account {
        address: String,
        kind: &'static str,
        reason: String,
    },
    UnknownEditionKey {
        key: u8,
    },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Account {
                address,
                kind,
                reason,
            } => {
                write!(f, "failed to decode {} account {}: {}", kind, address, reason)
            }
            DecodeError::UnknownEditionKey { key } => {
                write!(f, "unknown edition discriminant byte {}", key)
            }
        }
    }
}

// =============================================================================
// NETWORK ERRORS
// =============================================================================

#[derive(Debug, Clone)]
pub enum NetworkError {
    Http { url: String, reason: String },
    HttpStatus { url: String, status: u16 },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::Http { url, reason } => write!(f, "GET {} failed: {}", url, reason),
            NetworkError::HttpStatus { url, status } => {
                write!(f, "GET {} returned HTTP {}", url, status)
            }
        }
    }
}

// =============================================================================
// DATA ERRORS
// =============================================================================

#[derive(Debug, Clone)]
pub enum DataError {
    Missing { what: String },
    Malformed { what: String, reason: String },
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Missing { what } => write!(f, "missing {}", what),
            DataError::Malformed { what, reason } => write!(f, "malformed {}: {}", what, reason),
        }
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<InputError> for NftScoutError {
    fn from(e: InputError) -> Self {
        NftScoutError::Input(e)
    }
}

impl From<RpcError> for NftScoutError {
    fn from(e: RpcError) -> Self {
        NftScoutError::Rpc(e)
    }
}

impl From<DecodeError> for NftScoutError {
    fn from(e: DecodeError) -> Self {
        NftScoutError::Decode(e)
    }
}

impl From<NetworkError> for NftScoutError {
    fn from(e: NetworkError) -> Self {
        NftScoutError::Network(e)
    }
}

impl From<DataError> for NftScoutError {
    fn from(e: DataError) -> Self {
        NftScoutError::Data(e)
    }
}
