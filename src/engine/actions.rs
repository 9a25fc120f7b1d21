use crate::engine::codec::Fragment;
use crate::game::{CardId, PileId, Side};

/// Move intents dispatched by the presentation layer. Payloads carry plain
/// card and pile identifiers only, never transient UI objects.
#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    NewGame,
    GameLaunched,
    StopGame,
    Restore(Fragment),
    DrawStock { card: CardId },
    EmptyStock,
    DrawWaste { card: CardId },
    DrawTable { card: CardId, side: Side },
    DropTable { cards: Vec<CardId>, table: PileId },
}

impl GameAction {
    pub fn label(&self) -> &'static str {
        match self {
            GameAction::NewGame => "new-game",
            GameAction::GameLaunched => "game-launched",
            GameAction::StopGame => "stop-game",
            GameAction::Restore(_) => "restore",
            GameAction::DrawStock { .. } => "draw-stock",
            GameAction::EmptyStock => "empty-stock",
            GameAction::DrawWaste { .. } => "draw-waste",
            GameAction::DrawTable { .. } => "draw-table",
            GameAction::DropTable { .. } => "drop-table",
        }
    }
}
