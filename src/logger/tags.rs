/// Subsystem tags for log output
///
/// One tag per module so batch runs can be scanned quickly.
use colored::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Rpc,
    Fetch,
    Enrich,
    Metadata,
    Paperhands,
    Prices,
    Rarity,
    Storage,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Rpc => "RPC",
            LogTag::Fetch => "FETCH",
            LogTag::Enrich => "ENRICH",
            LogTag::Metadata => "METADATA",
            LogTag::Paperhands => "PAPERHANDS",
            LogTag::Prices => "PRICES",
            LogTag::Rarity => "RARITY",
            LogTag::Storage => "STORAGE",
        }
    }

    /// Console color used for the tag bracket
    pub fn color(&self) -> Color {
        match self {
            LogTag::System => Color::White,
            LogTag::Rpc => Color::Blue,
            LogTag::Fetch => Color::Cyan,
            LogTag::Enrich => Color::Green,
            LogTag::Metadata => Color::Magenta,
            LogTag::Paperhands => Color::Yellow,
            LogTag::Prices => Color::BrightYellow,
            LogTag::Rarity => Color::BrightMagenta,
            LogTag::Storage => Color::BrightBlue,
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
