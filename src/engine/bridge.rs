//! Keeps the live game and an external navigation store in sync.
//!
//! While a game runs, every state change is encoded and written under one
//! query parameter, so the current position can be bookmarked, shared, or
//! walked through with back/forward navigation. Token reads flow the other
//! way and become restore intents. Two guards stop the loop from feeding
//! itself: writes are skipped while a restore settles, and a token identical
//! to the last one written is never written again.

use tracing::{debug, warn};

use crate::engine::actions::GameAction;
use crate::engine::codec::{decode_fragment, encode_fragment, Fragment};
use crate::game::{GameStatus, SolitaireState};

/// External navigation state holding at most one game token. Implemented
/// over browser history, a test double, or whatever hosts the game.
pub trait NavigationStore {
    fn token(&self) -> Option<String>;
    fn set_token(&mut self, token: Option<&str>);
}

#[derive(Debug, Default)]
pub struct PersistenceBridge {
    last_written: Option<String>,
    restoring: bool,
}

impl PersistenceBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write path. Call on every state change notification.
    pub fn sync_to_store(&mut self, state: &SolitaireState, store: &mut dyn NavigationStore) {
        if self.restoring {
            return;
        }

        if state.status == GameStatus::Running {
            let token = match encode_fragment(&Fragment::from_state(state)) {
                Ok(token) => token,
                Err(error) => {
                    warn!(%error, "skipping navigation write, state failed to encode");
                    return;
                }
            };
            if self.last_written.as_deref() != Some(token.as_str()) {
                debug!(len = token.len(), "writing game token to navigation store");
                store.set_token(Some(&token));
            }
            self.last_written = Some(token);
        } else {
            store.set_token(None);
            self.last_written = None;
        }
    }

    /// Read path. Call when the store's token changed from outside; yields
    /// the restore intent to dispatch, or `None` when the token is stale,
    /// already live, or unreadable.
    pub fn absorb_external_token(
        &mut self,
        state: &SolitaireState,
        store: &dyn NavigationStore,
    ) -> Option<GameAction> {
        let token = store.token()?;
        let live = encode_fragment(&Fragment::from_state(state)).ok();
        if live.as_deref() == Some(token.as_str()) {
            return None;
        }

        match decode_fragment(&token) {
            Ok(fragment) => {
                debug!("restoring game from navigation token");
                self.restoring = true;
                Some(GameAction::Restore(fragment))
            }
            Err(error) => {
                warn!(%error, "ignoring unreadable navigation token");
                None
            }
        }
    }

    /// Ends the restore window opened by [`Self::absorb_external_token`]; call once
    /// the restore-triggered render has settled.
    pub fn restore_settled(&mut self) {
        self.restoring = false;
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }
}
