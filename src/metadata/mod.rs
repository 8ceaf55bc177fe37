//! On-chain token-metadata account layouts
//!
//! Borsh layouts for the metadata / edition / master-edition accounts, PDA
//! derivation and the memcmp offsets used by the program-account filters.
//! Account data is padded to a fixed size on-chain, so decoding tolerates
//! trailing bytes and strings are trimmed of NUL padding.

use crate::constants::TOKEN_METADATA_PROGRAM_ID;
use crate::utils::bytes_base58;
use borsh::BorshDeserialize;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

static METADATA_PROGRAM: Lazy<Pubkey> = Lazy::new(|| {
    Pubkey::from_str(TOKEN_METADATA_PROGRAM_ID).expect("static program id must parse")
});

/// The token-metadata program id
pub fn metadata_program_id() -> Pubkey {
    *METADATA_PROGRAM
}

// =============================================================================
// ACCOUNT DISCRIMINANTS
// =============================================================================

/// First byte of every metadata-program account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MetadataKey {
    Uninitialized = 0,
    EditionV1 = 1,
    MasterEditionV1 = 2,
    ReservationListV1 = 3,
    MetadataV1 = 4,
    ReservationListV2 = 5,
    MasterEditionV2 = 6,
    EditionMarker = 7,
}

// =============================================================================
// FIXED LAYOUT SIZES
// =============================================================================

const MAX_NAME_LENGTH: usize = 32;
const MAX_SYMBOL_LENGTH: usize = 10;
const MAX_URI_LENGTH: usize = 200;

/// Byte offset of the update authority within a metadata account
pub const UPDATE_AUTHORITY_OFFSET: usize = 1;

/// Byte offset of creator `index` within a metadata account
///
/// key(1) + update_authority(32) + mint(32) + name(4+32) + symbol(4+10)
/// + uri(4+200) + seller_fee(2) + creators option(1) + vec len(4) = 326,
/// then 34 bytes per creator (address + verified + share).
pub fn creator_offset(index: usize) -> usize {
    1 + 32
        + 32
        + (4 + MAX_NAME_LENGTH)
        + (4 + MAX_SYMBOL_LENGTH)
        + (4 + MAX_URI_LENGTH)
        + 2
        + 1
        + 4
        + index * 34
}

// =============================================================================
// PDA DERIVATION
// =============================================================================

/// Metadata PDA for a mint: `["metadata", program, mint]`
pub fn find_metadata_pda(mint: &Pubkey) -> Pubkey {
    let program = metadata_program_id();
    Pubkey::find_program_address(
        &[b"metadata", program.as_ref(), mint.as_ref()],
        &program,
    )
    .0
}

/// Edition PDA for a mint: `["metadata", program, mint, "edition"]`
///
/// The same PDA holds either an edition or a master edition; the discriminant
/// byte decides which (see `decode_edition_container`).
pub fn find_edition_pda(mint: &Pubkey) -> Pubkey {
    let program = metadata_program_id();
    Pubkey::find_program_address(
        &[b"metadata", program.as_ref(), mint.as_ref(), b"edition"],
        &program,
    )
    .0
}

// =============================================================================
// ACCOUNT LAYOUTS
// =============================================================================

#[derive(Debug, Clone, BorshDeserialize, Serialize, Deserialize)]
pub struct Creator {
    #[serde(with = "bytes_base58")]
    pub address: [u8; 32],
    pub verified: bool,
    pub share: u8,
}

impl Creator {
    pub fn address_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.address)
    }
}

#[derive(Debug, Clone, BorshDeserialize, Serialize, Deserialize)]
pub struct MetadataData {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
}

#[derive(Debug, Clone, BorshDeserialize, Serialize, Deserialize)]
pub struct MetadataAccount {
    pub key: u8,
    #[serde(with = "bytes_base58")]
    pub update_authority: [u8; 32],
    #[serde(with = "bytes_base58")]
    pub mint: [u8; 32],
    pub data: MetadataData,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
}

impl MetadataAccount {
    pub fn mint_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.mint)
    }

    pub fn update_authority_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.update_authority)
    }

    /// First listed creator, if any - the collection identity used by the
    /// marketplace price lookups
    pub fn first_creator(&self) -> Option<Pubkey> {
        self.data
            .creators
            .as_ref()
            .and_then(|c| c.first())
            .map(|c| c.address_pubkey())
    }
}

/// A numbered copy referencing its parent master edition
#[derive(Debug, Clone, BorshDeserialize, Serialize, Deserialize)]
pub struct EditionAccount {
    pub key: u8,
    #[serde(with = "bytes_base58")]
    pub parent: [u8; 32],
    pub edition: u64,
}

impl EditionAccount {
    pub fn parent_pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.parent)
    }
}

#[derive(Debug, Clone, BorshDeserialize, Serialize, Deserialize)]
pub struct MasterEditionV2Account {
    pub key: u8,
    pub supply: u64,
    pub max_supply: Option<u64>,
}

#[derive(Debug, Clone, BorshDeserialize, Serialize, Deserialize)]
pub struct MasterEditionV1Account {
    pub key: u8,
    pub supply: u64,
    pub max_supply: Option<u64>,
    #[serde(with = "bytes_base58")]
    pub printing_mint: [u8; 32],
    #[serde(with = "bytes_base58")]
    pub one_time_printing_authorization_mint: [u8; 32],
}

/// Master edition in either on-chain version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "version")]
pub enum MasterEditionAccount {
    V1(MasterEditionV1Account),
    V2(MasterEditionV2Account),
}

/// What lives at an edition PDA, resolved once from the discriminant byte
#[derive(Debug, Clone)]
pub enum EditionContainer {
    /// Normal edition - parent master lookup is possible
    Edition(EditionAccount),
    /// The account is itself the master
    Master(MasterEditionAccount),
    /// Discriminant byte outside the edition family
    Unknown(u8),
}

// =============================================================================
// DECODERS
// =============================================================================

fn trim_nul(s: &str) -> String {
    s.trim_end_matches('\u{0}').to_string()
}

/// Decode a metadata account, tolerating trailing padding
pub fn decode_metadata(data: &[u8]) -> Result<MetadataAccount, String> {
    match data.first() {
        Some(&k) if k == MetadataKey::MetadataV1 as u8 => {}
        Some(&k) => return Err(format!("not a metadata account (key byte {})", k)),
        None => return Err("empty account data".to_string()),
    }
    let mut slice = data;
    let mut metadata = <MetadataAccount as BorshDeserialize>::deserialize(&mut slice)
        .map_err(|e| format!("borsh decode failed: {}", e))?;
    metadata.data.name = trim_nul(&metadata.data.name);
    metadata.data.symbol = trim_nul(&metadata.data.symbol);
    metadata.data.uri = trim_nul(&metadata.data.uri);
    Ok(metadata)
}

/// Decode whatever sits at an edition PDA by its discriminant byte
pub fn decode_edition_container(data: &[u8]) -> Result<EditionContainer, String> {
    let key = *data.first().ok_or("empty account data")?;
    let mut slice = data;
    if key == MetadataKey::EditionV1 as u8 {
        let edition = <EditionAccount as BorshDeserialize>::deserialize(&mut slice)
            .map_err(|e| format!("edition decode failed: {}", e))?;
        Ok(EditionContainer::Edition(edition))
    } else if key == MetadataKey::MasterEditionV1 as u8 {
        let master = <MasterEditionV1Account as BorshDeserialize>::deserialize(&mut slice)
            .map_err(|e| format!("master edition v1 decode failed: {}", e))?;
        Ok(EditionContainer::Master(MasterEditionAccount::V1(master)))
    } else if key == MetadataKey::MasterEditionV2 as u8 {
        let master = <MasterEditionV2Account as BorshDeserialize>::deserialize(&mut slice)
            .map_err(|e| format!("master edition v2 decode failed: {}", e))?;
        Ok(EditionContainer::Master(MasterEditionAccount::V2(master)))
    } else {
        Ok(EditionContainer::Unknown(key))
    }
}

/// Decode a master edition account directly (parent lookups)
pub fn decode_master_edition(data: &[u8]) -> Result<MasterEditionAccount, String> {
    match decode_edition_container(data)? {
        EditionContainer::Master(master) => Ok(master),
        EditionContainer::Edition(_) => Err("expected a master edition, got an edition".to_string()),
        EditionContainer::Unknown(key) => {
            Err(format!("expected a master edition, got key byte {}", key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use borsh::BorshSerialize;

    #[derive(BorshSerialize)]
    struct RawCreator {
        address: [u8; 32],
        verified: bool,
        share: u8,
    }

    #[derive(BorshSerialize)]
    struct RawData {
        name: String,
        symbol: String,
        uri: String,
        seller_fee_basis_points: u16,
        creators: Option<Vec<RawCreator>>,
    }

    #[derive(BorshSerialize)]
    struct RawMetadata {
        key: u8,
        update_authority: [u8; 32],
        mint: [u8; 32],
        data: RawData,
        primary_sale_happened: bool,
        is_mutable: bool,
    }

    fn sample_metadata_bytes(creator: Pubkey) -> Vec<u8> {
        let raw = RawMetadata {
            key: MetadataKey::MetadataV1 as u8,
            update_authority: Pubkey::new_unique().to_bytes(),
            mint: Pubkey::new_unique().to_bytes(),
            data: RawData {
                name: format!("Degen Ape #42{}", "\u{0}".repeat(5)),
                symbol: "DAPE\u{0}".to_string(),
                uri: "https://arweave.net/abc".to_string(),
                seller_fee_basis_points: 420,
                creators: Some(vec![RawCreator {
                    address: creator.to_bytes(),
                    verified: true,
                    share: 100,
                }]),
            },
            primary_sale_happened: true,
            is_mutable: true,
        };
        let mut bytes = borsh::to_vec(&raw).unwrap();
        // on-chain accounts carry zero padding after the struct
        bytes.extend_from_slice(&[0u8; 64]);
        bytes
    }

    #[test]
    fn decodes_metadata_with_padding_and_trims_nuls() {
        let creator = Pubkey::new_unique();
        let decoded = decode_metadata(&sample_metadata_bytes(creator)).unwrap();
        assert_eq!(decoded.data.name, "Degen Ape #42");
        assert_eq!(decoded.data.symbol, "DAPE");
        assert_eq!(decoded.data.seller_fee_basis_points, 420);
        assert_eq!(decoded.first_creator(), Some(creator));
    }

    #[test]
    fn rejects_non_metadata_key_byte() {
        let mut bytes = sample_metadata_bytes(Pubkey::new_unique());
        bytes[0] = MetadataKey::EditionV1 as u8;
        assert!(decode_metadata(&bytes).is_err());
    }

    #[test]
    fn edition_container_dispatches_on_discriminant() {
        let parent = Pubkey::new_unique();

        #[derive(BorshSerialize)]
        struct RawEdition {
            key: u8,
            parent: [u8; 32],
            edition: u64,
        }
        let edition_bytes = borsh::to_vec(&RawEdition {
            key: MetadataKey::EditionV1 as u8,
            parent: parent.to_bytes(),
            edition: 7,
        })
        .unwrap();
        match decode_edition_container(&edition_bytes).unwrap() {
            EditionContainer::Edition(e) => {
                assert_eq!(e.parent_pubkey(), parent);
                assert_eq!(e.edition, 7);
            }
            other => panic!("expected edition, got {:?}", other),
        }

        #[derive(BorshSerialize)]
        struct RawMasterV2 {
            key: u8,
            supply: u64,
            max_supply: Option<u64>,
        }
        let master_bytes = borsh::to_vec(&RawMasterV2 {
            key: MetadataKey::MasterEditionV2 as u8,
            supply: 100,
            max_supply: Some(1000),
        })
        .unwrap();
        match decode_edition_container(&master_bytes).unwrap() {
            EditionContainer::Master(MasterEditionAccount::V2(m)) => {
                assert_eq!(m.supply, 100);
                assert_eq!(m.max_supply, Some(1000));
            }
            other => panic!("expected master edition, got {:?}", other),
        }

        match decode_edition_container(&[42u8, 0, 0]).unwrap() {
            EditionContainer::Unknown(42) => {}
            other => panic!("expected unknown, got {:?}", other),
        }
    }

    #[test]
    fn creator_offset_matches_fixed_layout() {
        assert_eq!(creator_offset(0), 326);
        assert_eq!(creator_offset(1), 360);
    }

    #[test]
    fn metadata_and_edition_pdas_differ() {
        let mint = Pubkey::new_unique();
        assert_ne!(find_metadata_pda(&mint), find_edition_pda(&mint));
    }
}
