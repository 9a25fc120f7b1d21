//! Geometric drop resolution and the ephemeral drag session.
//!
//! The engine never reads a rendering surface. Whatever is on screen hands
//! its boxes over through [`DropZones`], keyed by the same card and pile ids
//! the presentation stamps on its containers, and resolution stays a pure
//! function of state plus geometry.

use crate::engine::actions::GameAction;
use crate::game::{CardId, PileId, PileKind, Side, SolitaireState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Axis-aligned overlap; boxes merely touching still count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(other.left > self.right()
            || other.right() < self.left
            || other.top > self.bottom()
            || other.bottom() < self.top)
    }

    pub fn center_distance(&self, other: &Rect) -> f64 {
        let dx = (self.left + self.width / 2.0) - (other.left + other.width / 2.0);
        let dy = (self.top + self.height / 2.0) - (other.top + other.height / 2.0);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Bounding boxes of everything currently rendered, keyed by domain id.
/// Card zones cover individual cards; pile zones cover the pile backgrounds
/// (which is all an empty column has).
pub trait DropZones {
    fn card_zones(&self) -> Vec<(CardId, Rect)>;
    fn pile_zones(&self) -> Vec<(PileId, Rect)>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub pile: PileId,
    pub card: Option<CardId>,
}

/// Picks the best drop destination for a dragged box: nearest intersecting
/// card first, nearest intersecting pile background as the fallback. `None`
/// means there is no valid target and the drag should revert.
pub fn resolve_drop(
    state: &SolitaireState,
    zones: &dyn DropZones,
    drag_rect: Rect,
    dragged: Option<CardId>,
) -> Option<DropTarget> {
    closest_card_target(state, zones, drag_rect, dragged)
        .or_else(|| closest_pile_target(state, zones, drag_rect))
}

fn closest_card_target(
    state: &SolitaireState,
    zones: &dyn DropZones,
    drag_rect: Rect,
    dragged: Option<CardId>,
) -> Option<DropTarget> {
    let dragged = dragged?;
    let origin = state.pile_for_card(dragged);

    let mut candidate = None;
    let mut best_distance = f64::MAX;
    for (card, rect) in zones.card_zones() {
        if card == dragged {
            continue;
        }
        let Some(pile) = state.pile_for_card(card) else {
            continue;
        };
        // Cards riding along in the lifted run are not drop targets.
        if let Some(origin) = origin {
            if origin.id() == pile.id() {
                let card_position = pile.position_of(card);
                let dragged_position = pile.position_of(dragged);
                if card_position > dragged_position {
                    continue;
                }
            }
        }
        if !drag_rect.intersects(&rect) {
            continue;
        }
        let distance = drag_rect.center_distance(&rect);
        if distance < best_distance {
            best_distance = distance;
            candidate = Some(DropTarget {
                pile: pile.id(),
                card: Some(card),
            });
        }
    }
    candidate
}

fn closest_pile_target(
    state: &SolitaireState,
    zones: &dyn DropZones,
    drag_rect: Rect,
) -> Option<DropTarget> {
    let mut candidate = None;
    let mut best_distance = f64::MAX;
    for (pile_id, rect) in zones.pile_zones() {
        if state.pile(pile_id).is_none() {
            continue;
        }
        if !drag_rect.intersects(&rect) {
            continue;
        }
        let distance = drag_rect.center_distance(&rect);
        if distance < best_distance {
            best_distance = distance;
            candidate = Some(DropTarget {
                pile: pile_id,
                card: None,
            });
        }
    }
    candidate
}

/// The cards a drag carries: for a tableau origin the contiguous tail from
/// the picked card to the end of the column, otherwise just the card itself.
pub fn carried_cards(state: &SolitaireState, card: CardId) -> Vec<CardId> {
    let Some(pile) = state.pile_for_card(card) else {
        return Vec::new();
    };
    if pile.kind == PileKind::Table {
        match pile.position_of(card) {
            Some(position) => pile.cards[position..].iter().map(|c| c.id()).collect(),
            None => Vec::new(),
        }
    } else {
        vec![card]
    }
}

/// UI-local drag state. Lives from pointer-down to pointer-up and is not
/// part of the persisted game; every outcome, commit or revert, ends it.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    origin: CardId,
    cards: Vec<CardId>,
    grab_offset: (f64, f64),
    position: (f64, f64),
    destination: Option<PileId>,
}

impl DragSession {
    /// Pointer-down gate: no drags out of stock, no lifting buried cards
    /// outside the tableau, no lifting face-down tableau cards.
    pub fn begin(state: &SolitaireState, card: CardId, grab_offset: (f64, f64)) -> Option<Self> {
        let picked = state.find_card(card)?;
        let pile = state.pile_for_card(card)?;
        let last_in_pile = pile.top().map(|c| c.id()) == Some(card);
        if pile.kind != PileKind::Table && !last_in_pile {
            return None;
        }
        if pile.kind == PileKind::Stock {
            return None;
        }
        if pile.kind == PileKind::Table && picked.side == Side::Back {
            return None;
        }
        Some(Self {
            origin: card,
            cards: carried_cards(state, card),
            grab_offset,
            position: (0.0, 0.0),
            destination: None,
        })
    }

    pub fn origin(&self) -> CardId {
        self.origin
    }

    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    pub fn grab_offset(&self) -> (f64, f64) {
        self.grab_offset
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    pub fn destination(&self) -> Option<PileId> {
        self.destination
    }

    /// Pointer-move: track the dragged box and re-resolve the destination.
    pub fn update(
        &mut self,
        state: &SolitaireState,
        zones: &dyn DropZones,
        drag_rect: Rect,
    ) -> Option<PileId> {
        self.position = (drag_rect.left, drag_rect.top);
        self.destination =
            resolve_drop(state, zones, drag_rect, Some(self.origin)).map(|target| target.pile);
        self.destination
    }

    /// Pointer-up: a tableau destination commits as a drop intent, anything
    /// else reverts silently. The session is consumed either way.
    pub fn finish(self) -> Option<GameAction> {
        let destination = self.destination?;
        if destination.kind != PileKind::Table {
            return None;
        }
        Some(GameAction::DropTable {
            cards: self.cards,
            table: destination,
        })
    }
}

/// Routes a plain click on a pile (or a card in it) to its move intent.
pub fn click_intent(
    state: &SolitaireState,
    pile: PileId,
    card: Option<CardId>,
) -> Option<GameAction> {
    match (pile.kind, card) {
        (PileKind::Stock, Some(card)) => Some(GameAction::DrawStock { card }),
        (PileKind::Stock, None) => Some(GameAction::EmptyStock),
        (PileKind::Table, Some(card)) => {
            let side = state.find_card(card)?.side;
            Some(GameAction::DrawTable { card, side })
        }
        (PileKind::Waste, Some(card)) => Some(GameAction::DrawWaste { card }),
        _ => None,
    }
}
