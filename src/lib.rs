//! Klondike solitaire core: rules engine, drop resolution, and URL tokens.
//!
//! The crate is presentation-agnostic. A UI dispatches [`engine::actions::GameAction`]
//! move intents into an [`engine::store::GameStore`] and renders the immutable
//! [`game::SolitaireState`] snapshots it gets back. Pointer geometry comes in
//! through the [`engine::drag::DropZones`] provider, and games travel as
//! compressed base64url tokens via [`engine::codec`] and [`engine::bridge`].

pub mod engine;
pub mod game;

pub use engine::actions::GameAction;
pub use engine::store::GameStore;
pub use game::{GameStatus, PlayingCard, SolitaireState};
