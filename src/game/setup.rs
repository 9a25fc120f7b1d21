use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::*;

impl SolitaireState {
    pub fn new_shuffled() -> Self {
        let mut rng = rand::thread_rng();
        Self::new_with_seed(rng.gen())
    }

    /// Deterministic deal: column c of the tableau receives c+1 cards with
    /// only the last one turned up, the remaining 24 go face down to stock.
    pub fn new_with_seed(seed: u64) -> Self {
        let mut deck = full_deck();
        let mut rng = StdRng::seed_from_u64(seed);
        deck.shuffle(&mut rng);

        let mut state = Self {
            status: GameStatus::Stopped,
            stock: Pile::new(PileKind::Stock, None),
            waste: Pile::new(PileKind::Waste, None),
            stacks: std::array::from_fn(|i| Pile::new(PileKind::Stack, Some(i as u8))),
            tables: std::array::from_fn(|i| Pile::new(PileKind::Table, Some(i as u8))),
            stats: Stats::started_now(),
        };

        let mut draw = deck.into_iter();
        for col in 0..TABLE_COUNT {
            for row in 0..=col {
                let mut card = draw.next().expect("full deck has enough cards");
                card.side = if row == col { Side::Front } else { Side::Back };
                state.tables[col].cards.push(card);
            }
        }

        for mut card in draw {
            card.side = Side::Back;
            state.stock.cards.push(card);
        }

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_deal_has_full_deck_accounted_for() {
        let state = SolitaireState::new_shuffled();

        let table_count: usize = state.tables.iter().map(Pile::len).sum();
        let stack_count: usize = state.stacks.iter().map(Pile::len).sum();

        assert_eq!(state.deck_size(), DECK_SIZE);
        assert_eq!(table_count, 28);
        assert_eq!(stack_count, 0);
        assert_eq!(state.stock.len(), 24);
        assert_eq!(state.waste.len(), 0);
    }

    #[test]
    fn new_deal_grows_tableau_triangularly_with_one_card_up() {
        let state = SolitaireState::new_with_seed(42);

        for (col, pile) in state.tables.iter().enumerate() {
            assert_eq!(pile.len(), col + 1);
            for (row, card) in pile.cards.iter().enumerate() {
                let expected = if row == col { Side::Front } else { Side::Back };
                assert_eq!(card.side, expected);
            }
        }
        assert!(state.stock.cards.iter().all(|card| card.side == Side::Back));
    }

    #[test]
    fn seeded_deals_are_deterministic() {
        let state_a = SolitaireState::new_with_seed(42);
        let state_b = SolitaireState::new_with_seed(42);
        let state_c = SolitaireState::new_with_seed(43);

        assert_eq!(state_a.stock, state_b.stock);
        assert_eq!(state_a.tables, state_b.tables);
        assert_ne!(state_a.tables, state_c.tables);
    }
}
