pub mod constants;
pub mod enrich;
pub mod errors;
pub mod fetch;
pub mod logger;
pub mod metadata;
pub mod paperhands;
pub mod prices;
pub mod rarity;
pub mod rpc;
pub mod spl;
pub mod storage;
pub mod utils;
