//! Game tokens: the restorable slice of state as a compact, URL-safe string.
//!
//! Fragment -> canonical JSON -> gzip -> base64url (padding stripped).
//! Decoding reverses each step and treats anything malformed as a typed
//! error the caller drops on the floor; a foreign payload dies in JSON
//! parsing rather than producing a half-restored game.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;

use crate::game::{
    GameStatus, Pile, SolitaireState, Stats, DECK_SIZE, STACK_COUNT, TABLE_COUNT,
};

/// The persisted projection of a game: piles and stats, no status. Restoring
/// a fragment always yields a running game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub stock: Pile,
    pub waste: Pile,
    pub stacks: [Pile; STACK_COUNT],
    pub tables: [Pile; TABLE_COUNT],
    pub stats: Stats,
}

impl Fragment {
    pub fn from_state(state: &SolitaireState) -> Self {
        Self {
            stock: state.stock.clone(),
            waste: state.waste.clone(),
            stacks: state.stacks.clone(),
            tables: state.tables.clone(),
            stats: state.stats,
        }
    }

    pub fn into_state(self) -> SolitaireState {
        SolitaireState {
            status: GameStatus::Running,
            stock: self.stock,
            waste: self.waste,
            stacks: self.stacks,
            tables: self.tables,
            stats: self.stats,
        }
    }

    pub fn card_count(&self) -> usize {
        let stacks: usize = self.stacks.iter().map(Pile::len).sum();
        let tables: usize = self.tables.iter().map(Pile::len).sum();
        self.stock.len() + self.waste.len() + stacks + tables
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("token is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not valid gzip data: {0}")]
    Compression(#[from] std::io::Error),
    #[error("token payload is not a game fragment: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fragment does not account for a full deck")]
    IncompleteDeck,
}

pub fn encode_fragment(fragment: &Fragment) -> Result<String, CodecError> {
    let json = serde_json::to_vec(fragment)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

pub fn decode_fragment(token: &str) -> Result<Fragment, CodecError> {
    // Tokens are written unpadded, but anything that re-padded them on the
    // way here still has to decode.
    let compressed = URL_SAFE_NO_PAD.decode(token.trim_end_matches('='))?;
    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut json)?;
    let fragment: Fragment = serde_json::from_slice(&json)?;
    if fragment.card_count() != DECK_SIZE {
        return Err(CodecError::IncompleteDeck);
    }
    Ok(fragment)
}
