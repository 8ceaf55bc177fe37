//! Enriched record types

use crate::fetch::BaseToken;
use crate::metadata::{EditionAccount, MasterEditionAccount, MetadataAccount};
use crate::spl::{MintAccountInfo, TokenAccountInfo};
use crate::utils::{as_base58, as_base58_opt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;

/// Edition lineage of one mint, resolved once from the edition PDA
///
/// `Edition` is a numbered copy; its parent master lookup can independently
/// fail, which leaves the master fields absent while the edition fields stay
/// populated. `Master` is itself the root, so the master address is the
/// edition PDA itself.
#[derive(Debug, Clone)]
pub enum EditionInfo {
    None,
    Edition {
        edition_address: Pubkey,
        edition: EditionAccount,
        master_edition_address: Option<Pubkey>,
        master_edition: Option<MasterEditionAccount>,
    },
    Master {
        master_edition_address: Pubkey,
        master_edition: MasterEditionAccount,
    },
}

impl EditionInfo {
    /// Stable string form of the edition kind for persisted records
    pub fn kind(&self) -> &'static str {
        match self {
            EditionInfo::None => "none",
            EditionInfo::Edition { .. } => "EditionV1",
            EditionInfo::Master {
                master_edition: MasterEditionAccount::V1(_),
                ..
            } => "MasterEditionV1",
            EditionInfo::Master {
                master_edition: MasterEditionAccount::V2(_),
                ..
            } => "MasterEditionV2",
        }
    }
}

impl Default for EditionInfo {
    fn default() -> Self {
        EditionInfo::None
    }
}

/// The terminal consolidated record, one per candidate token
///
/// Every field except `mint` is optional: absence means "lookup failed or
/// inapplicable", never an error. Records are immutable once the pipeline
/// finishes and serialize with pubkeys in base-58 string form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedNft {
    #[serde(with = "as_base58")]
    pub mint: Pubkey,
    #[serde(with = "as_base58_opt")]
    pub holder_address: Option<Pubkey>,
    pub token_account: Option<TokenAccountInfo>,
    pub mint_account: Option<MintAccountInfo>,
    #[serde(with = "as_base58_opt")]
    pub metadata_address: Option<Pubkey>,
    pub onchain_metadata: Option<MetadataAccount>,
    pub external_metadata: Option<Value>,
    pub edition_kind: String,
    #[serde(with = "as_base58_opt")]
    pub edition_address: Option<Pubkey>,
    pub edition_record: Option<EditionAccount>,
    #[serde(with = "as_base58_opt")]
    pub master_edition_address: Option<Pubkey>,
    pub master_edition_record: Option<MasterEditionAccount>,
}

impl EnrichedNft {
    /// Pass-through record carrying only base fields
    pub fn from_base(base: &BaseToken) -> Self {
        EnrichedNft {
            mint: base.mint,
            holder_address: base.holder_address,
            token_account: None,
            mint_account: None,
            metadata_address: base.metadata_address,
            onchain_metadata: base.metadata.clone(),
            external_metadata: None,
            edition_kind: EditionInfo::None.kind().to_string(),
            edition_address: None,
            edition_record: None,
            master_edition_address: None,
            master_edition_record: None,
        }
    }

    /// Flatten the resolved edition lineage into the record
    pub fn set_edition(&mut self, info: EditionInfo) {
        self.edition_kind = info.kind().to_string();
        match info {
            EditionInfo::None => {}
            EditionInfo::Edition {
                edition_address,
                edition,
                master_edition_address,
                master_edition,
            } => {
                self.edition_address = Some(edition_address);
                self.edition_record = Some(edition);
                self.master_edition_address = master_edition_address;
                self.master_edition_record = master_edition;
            }
            EditionInfo::Master {
                master_edition_address,
                master_edition,
            } => {
                // a master is its own edition account
                self.edition_address = Some(master_edition_address);
                self.master_edition_address = Some(master_edition_address);
                self.master_edition_record = Some(master_edition);
            }
        }
    }
}
