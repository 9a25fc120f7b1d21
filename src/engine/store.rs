use tracing::debug;

use crate::engine::actions::GameAction;
use crate::engine::rules::reduce;
use crate::game::SolitaireState;

type Listener = Box<dyn FnMut(&SolitaireState)>;

/// Owns the one current game state. Every mutation is a whole-state
/// replacement through the reducer, and every subscriber sees each new
/// snapshot; nothing reads game state from anywhere else.
pub struct GameStore {
    state: SolitaireState,
    listeners: Vec<Listener>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::with_state(SolitaireState::new_shuffled())
    }

    pub fn with_state(state: SolitaireState) -> Self {
        Self {
            state,
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &SolitaireState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SolitaireState) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn dispatch(&mut self, action: GameAction) -> &SolitaireState {
        debug!(action = action.label(), "dispatching game action");
        self.state = reduce(&self.state, &action);
        for listener in &mut self.listeners {
            listener(&self.state);
        }
        &self.state
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}
