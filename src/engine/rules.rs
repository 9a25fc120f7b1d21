use crate::engine::actions::GameAction;
use crate::game::{
    can_stack_foundation, can_stack_table, CardId, GameStatus, Pile, PileId, PileKind, PlayingCard,
    Side, SolitaireState, STACK_COUNT,
};

/// Pure reducer: every state transition of a game funnels through here.
/// Illegal intents are absorbed, not errored: the returned state is a new
/// object with unchanged substance, and neither moves nor points budge.
pub fn reduce(state: &SolitaireState, action: &GameAction) -> SolitaireState {
    match action {
        GameAction::NewGame => {
            let mut next = SolitaireState::new_shuffled();
            next.status = GameStatus::Launching;
            next
        }
        GameAction::GameLaunched => {
            let mut next = state.clone();
            if next.status == GameStatus::Launching {
                next.status = GameStatus::Running;
            }
            next
        }
        GameAction::StopGame => {
            let mut next = SolitaireState::new_shuffled();
            next.status = GameStatus::Stopped;
            next
        }
        GameAction::Restore(fragment) => fragment.clone().into_state(),
        GameAction::DrawStock { card } => draw_stock(state, *card),
        GameAction::EmptyStock => empty_stock(state),
        GameAction::DrawWaste { card } => draw_waste(state, *card),
        GameAction::DrawTable { card, side } => draw_table(state, *card, *side),
        GameAction::DropTable { cards, table } => drop_table(state, cards, *table),
    }
}

fn draw_stock(state: &SolitaireState, card: CardId) -> SolitaireState {
    let mut next = state.clone();
    let mut moved = false;

    let top = next.stock.top().map(PlayingCard::id);
    if top == Some(card) {
        let mut drawn = next.stock.cards.pop().expect("stock top exists");
        drawn.side = Side::Front;
        next.waste.cards.push(drawn);
        moved = true;
    }

    check_for_win(&mut next, moved);
    next
}

fn empty_stock(state: &SolitaireState) -> SolitaireState {
    let mut next = state.clone();

    if next.stock.is_empty() {
        let mut cards = std::mem::take(&mut next.waste.cards);
        cards.reverse();
        for card in &mut cards {
            card.side = Side::Back;
        }
        next.stock.cards = cards;
        next.stats.points -= 15;
    }

    // Recycling always logs a move, even when it found a non-empty stock.
    check_for_win(&mut next, true);
    next
}

fn draw_waste(state: &SolitaireState, card: CardId) -> SolitaireState {
    let mut next = state.clone();
    let mut moved = false;

    let top = next.waste.top().copied();
    if top.map(|c| c.id()) == Some(card) {
        let top = top.expect("waste top exists");
        let stack = &next.stacks[top.suit.stack_index()];
        if can_stack_foundation(stack.top(), &top) {
            next.waste.cards.pop();
            next.stacks[top.suit.stack_index()].cards.push(top);
            next.stats.points += 10;
            moved = true;
        }
    }

    check_for_win(&mut next, moved);
    next
}

fn draw_table(state: &SolitaireState, card: CardId, side: Side) -> SolitaireState {
    let mut next = state.clone();
    let mut moved = false;

    let origin = state
        .pile_for_card(card)
        .filter(|pile| pile.kind == PileKind::Table)
        .map(Pile::id);
    if let Some(origin) = origin {
        let top = next.pile(origin).and_then(Pile::top).copied();
        if top.map(|c| c.id()) == Some(card) {
            let top = top.expect("table top exists");
            if side == Side::Back && top.side == Side::Back {
                // Reveal only: the card stays put, turned face up.
                if let Some(revealed) = next
                    .pile_mut(origin)
                    .and_then(|pile| pile.cards.last_mut())
                {
                    revealed.side = Side::Front;
                }
                next.stats.points += 10;
                moved = true;
            } else if side == Side::Front {
                let stack = &next.stacks[top.suit.stack_index()];
                if can_stack_foundation(stack.top(), &top) {
                    next.pile_mut(origin)
                        .expect("origin pile exists")
                        .cards
                        .pop();
                    next.stacks[top.suit.stack_index()].cards.push(top);
                    moved = true;
                }
            }
        }
    }

    check_for_win(&mut next, moved);
    next
}

fn drop_table(state: &SolitaireState, cards: &[CardId], table: PileId) -> SolitaireState {
    debug_assert!(
        table.kind == PileKind::Table,
        "drop-table: target pile {table} is not a table"
    );

    let mut next = state.clone();
    let mut moved = false;

    let lead = cards.first().and_then(|id| state.find_card(*id)).copied();
    let origin = cards
        .first()
        .and_then(|id| state.pile_for_card(*id))
        .map(Pile::id);

    if let (Some(lead), Some(origin)) = (lead, origin) {
        let target_legal = table.kind == PileKind::Table
            && origin != table
            && next
                .pile(table)
                .is_some_and(|target| can_stack_table(target.top(), &lead));
        if target_legal {
            for id in cards {
                let Some(card) = next
                    .pile_mut(origin)
                    .and_then(|pile| remove_card(pile, *id))
                else {
                    continue;
                };
                next.pile_mut(table)
                    .expect("target table exists")
                    .cards
                    .push(card);
                if origin.kind == PileKind::Stack {
                    next.stats.points -= 5;
                }
            }
            moved = true;
        }
    }

    check_for_win(&mut next, moved);
    next
}

fn remove_card(pile: &mut Pile, id: CardId) -> Option<PlayingCard> {
    let position = pile.position_of(id)?;
    Some(pile.cards.remove(position))
}

/// Runs after every move intent, including rejected ones. The deck size is
/// recomputed rather than assumed so restored fragments of any size behave.
fn check_for_win(state: &mut SolitaireState, count_move: bool) {
    let deck_size = state.deck_size();
    let complete = state
        .stacks
        .iter()
        .filter(|stack| stack.len() == deck_size / 4)
        .count();
    if complete == STACK_COUNT {
        state.status = GameStatus::Won;
    }
    if count_move {
        state.stats.moves += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::codec::Fragment;
    use crate::game::{Rank, Stats, Suit, DECK_SIZE};

    fn card(suit: Suit, rank: Rank, side: Side) -> PlayingCard {
        PlayingCard { suit, rank, side }
    }

    fn empty_state() -> SolitaireState {
        SolitaireState {
            status: GameStatus::Running,
            stock: Pile::new(PileKind::Stock, None),
            waste: Pile::new(PileKind::Waste, None),
            stacks: std::array::from_fn(|i| Pile::new(PileKind::Stack, Some(i as u8))),
            tables: std::array::from_fn(|i| Pile::new(PileKind::Table, Some(i as u8))),
            stats: Stats::started_at(0),
        }
    }

    /// A full 52-card layout: every foundation complete except one short run,
    /// with the remainder parked where the test wants it.
    fn near_won_state(missing: Suit) -> SolitaireState {
        let mut state = empty_state();
        for suit in Suit::ALL {
            let take = if suit == missing { 12 } else { 13 };
            for rank in Rank::ALL.into_iter().take(take) {
                state.stacks[suit.stack_index()]
                    .cards
                    .push(card(suit, rank, Side::Front));
            }
        }
        state
            .waste
            .cards
            .push(card(missing, Rank::King, Side::Front));
        state
    }

    fn piles_equal(a: &SolitaireState, b: &SolitaireState) -> bool {
        a.stock == b.stock && a.waste == b.waste && a.stacks == b.stacks && a.tables == b.tables
    }

    #[test]
    fn new_game_deals_fresh_launching_state() {
        let state = empty_state();
        let next = reduce(&state, &GameAction::NewGame);

        assert_eq!(next.status, GameStatus::Launching);
        assert_eq!(next.deck_size(), DECK_SIZE);
        assert_eq!(next.stats.moves, 0);
        assert_eq!(next.stats.points, 0);
    }

    #[test]
    fn game_launched_runs_only_from_launching() {
        let mut state = empty_state();
        state.status = GameStatus::Launching;
        assert_eq!(
            reduce(&state, &GameAction::GameLaunched).status,
            GameStatus::Running
        );

        state.status = GameStatus::Stopped;
        assert_eq!(
            reduce(&state, &GameAction::GameLaunched).status,
            GameStatus::Stopped
        );
    }

    #[test]
    fn stop_game_resets_to_stopped_full_deck() {
        let next = reduce(&empty_state(), &GameAction::StopGame);
        assert_eq!(next.status, GameStatus::Stopped);
        assert_eq!(next.deck_size(), DECK_SIZE);
    }

    #[test]
    fn restore_replaces_piles_and_runs() {
        let dealt = SolitaireState::new_with_seed(7);
        let mut fragment = Fragment::from_state(&dealt);
        fragment.stats.moves = 40;
        fragment.stats.points = 55;

        let next = reduce(&empty_state(), &GameAction::Restore(fragment));

        assert_eq!(next.status, GameStatus::Running);
        assert_eq!(next.stock, dealt.stock);
        assert_eq!(next.tables, dealt.tables);
        assert_eq!(next.stats.moves, 40);
        assert_eq!(next.stats.points, 55);
    }

    #[test]
    fn draw_stock_moves_top_to_waste_face_up() {
        let mut state = empty_state();
        state.stock.cards.push(card(Suit::Hearts, Rank::Two, Side::Back));
        state.stock.cards.push(card(Suit::Spades, Rank::Seven, Side::Back));
        let top = state.stock.top().map(PlayingCard::id).expect("stock top");

        let next = reduce(&state, &GameAction::DrawStock { card: top });

        assert_eq!(next.stock.len(), 1);
        assert_eq!(next.waste.len(), 1);
        assert_eq!(next.waste.top().map(|c| c.side), Some(Side::Front));
        assert_eq!(next.waste.top().map(|c| c.rank), Some(Rank::Seven));
        assert_eq!(next.stats.moves, 1);
        assert_eq!(next.stats.points, 0);
    }

    #[test]
    fn draw_stock_rejects_cards_below_the_top() {
        let mut state = empty_state();
        let buried = card(Suit::Hearts, Rank::Two, Side::Back);
        state.stock.cards.push(buried);
        state.stock.cards.push(card(Suit::Spades, Rank::Seven, Side::Back));

        let next = reduce(&state, &GameAction::DrawStock { card: buried.id() });

        assert!(piles_equal(&state, &next));
        assert_eq!(next.stats, state.stats);
    }

    #[test]
    fn empty_stock_recycles_waste_reversed_and_face_down() {
        let mut state = empty_state();
        let ranks = [Rank::Ace, Rank::Five, Rank::Nine, Rank::Jack, Rank::King];
        for rank in ranks {
            state.waste.cards.push(card(Suit::Clubs, rank, Side::Front));
        }

        let next = reduce(&state, &GameAction::EmptyStock);

        assert!(next.waste.is_empty());
        assert_eq!(next.stock.len(), 5);
        let recycled: Vec<Rank> = next.stock.cards.iter().map(|c| c.rank).collect();
        let mut reversed = ranks.to_vec();
        reversed.reverse();
        assert_eq!(recycled, reversed);
        assert!(next.stock.cards.iter().all(|c| c.side == Side::Back));
        assert_eq!(next.stats.points, -15);
        assert_eq!(next.stats.moves, 1);
    }

    #[test]
    fn empty_stock_with_stock_left_counts_the_move_anyway() {
        let mut state = empty_state();
        state.stock.cards.push(card(Suit::Hearts, Rank::Three, Side::Back));
        state.waste.cards.push(card(Suit::Clubs, Rank::Four, Side::Front));

        let next = reduce(&state, &GameAction::EmptyStock);

        assert!(piles_equal(&state, &next));
        assert_eq!(next.stats.points, 0);
        assert_eq!(next.stats.moves, 1);
    }

    #[test]
    fn draw_waste_moves_top_to_matching_stack_for_ten_points() {
        let mut state = empty_state();
        state.waste.cards.push(card(Suit::Diamonds, Rank::Ace, Side::Front));
        let top = state.waste.top().map(PlayingCard::id).expect("waste top");

        let next = reduce(&state, &GameAction::DrawWaste { card: top });

        assert!(next.waste.is_empty());
        assert_eq!(next.stacks[Suit::Diamonds.stack_index()].len(), 1);
        assert_eq!(next.stats.points, 10);
        assert_eq!(next.stats.moves, 1);
    }

    #[test]
    fn draw_waste_rejects_unplayable_top_without_touching_state() {
        let mut state = empty_state();
        state.waste.cards.push(card(Suit::Diamonds, Rank::Five, Side::Front));
        let top = state.waste.top().map(PlayingCard::id).expect("waste top");

        let next = reduce(&state, &GameAction::DrawWaste { card: top });

        assert!(piles_equal(&state, &next));
        assert_eq!(next.stats, state.stats);
    }

    #[test]
    fn draw_waste_rejects_when_waste_is_empty() {
        let state = empty_state();
        let ghost = CardId {
            suit: Suit::Hearts,
            rank: Rank::Queen,
        };

        let next = reduce(&state, &GameAction::DrawWaste { card: ghost });

        assert!(piles_equal(&state, &next));
        assert_eq!(next.stats, state.stats);
    }

    #[test]
    fn draw_table_reveals_back_facing_top_for_ten_points() {
        let mut state = empty_state();
        state.tables[2].cards.push(card(Suit::Spades, Rank::Nine, Side::Back));
        let top = card(Suit::Spades, Rank::Nine, Side::Back);

        let next = reduce(
            &state,
            &GameAction::DrawTable {
                card: top.id(),
                side: Side::Back,
            },
        );

        assert_eq!(next.tables[2].len(), 1);
        assert_eq!(next.tables[2].top().map(|c| c.side), Some(Side::Front));
        assert_eq!(next.stats.points, 10);
        assert_eq!(next.stats.moves, 1);
    }

    #[test]
    fn draw_table_moves_front_top_to_stack_without_points() {
        let mut state = empty_state();
        state.stacks[Suit::Hearts.stack_index()]
            .cards
            .push(card(Suit::Hearts, Rank::Ace, Side::Front));
        state.tables[0].cards.push(card(Suit::Hearts, Rank::Two, Side::Front));
        let top = CardId {
            suit: Suit::Hearts,
            rank: Rank::Two,
        };

        let next = reduce(
            &state,
            &GameAction::DrawTable {
                card: top,
                side: Side::Front,
            },
        );

        assert!(next.tables[0].is_empty());
        assert_eq!(next.stacks[Suit::Hearts.stack_index()].len(), 2);
        assert_eq!(next.stats.points, 0);
        assert_eq!(next.stats.moves, 1);
    }

    #[test]
    fn draw_table_rejects_buried_cards() {
        let mut state = empty_state();
        state.tables[0].cards.push(card(Suit::Hearts, Rank::Ace, Side::Front));
        state.tables[0].cards.push(card(Suit::Spades, Rank::Four, Side::Front));
        let buried = CardId {
            suit: Suit::Hearts,
            rank: Rank::Ace,
        };

        let next = reduce(
            &state,
            &GameAction::DrawTable {
                card: buried,
                side: Side::Front,
            },
        );

        assert!(piles_equal(&state, &next));
        assert_eq!(next.stats, state.stats);
    }

    #[test]
    fn draw_table_back_intent_on_front_card_is_a_no_op() {
        let mut state = empty_state();
        state.tables[1].cards.push(card(Suit::Clubs, Rank::Ace, Side::Front));
        let top = CardId {
            suit: Suit::Clubs,
            rank: Rank::Ace,
        };

        let next = reduce(
            &state,
            &GameAction::DrawTable {
                card: top,
                side: Side::Back,
            },
        );

        assert!(piles_equal(&state, &next));
        assert_eq!(next.stats, state.stats);
    }

    #[test]
    fn drop_table_moves_a_carried_run_onto_a_matching_top() {
        let mut state = empty_state();
        state.tables[0].cards.push(card(Suit::Spades, Rank::Nine, Side::Front));
        state.tables[0].cards.push(card(Suit::Hearts, Rank::Eight, Side::Front));
        state.tables[0].cards.push(card(Suit::Clubs, Rank::Seven, Side::Front));
        state.tables[1].cards.push(card(Suit::Diamonds, Rank::Nine, Side::Front));

        let run = vec![
            CardId {
                suit: Suit::Hearts,
                rank: Rank::Eight,
            },
            CardId {
                suit: Suit::Clubs,
                rank: Rank::Seven,
            },
        ];
        let next = reduce(
            &state,
            &GameAction::DropTable {
                cards: run,
                table: PileId::table(1),
            },
        );

        assert_eq!(next.tables[0].len(), 1);
        assert_eq!(next.tables[1].len(), 3);
        let ranks: Vec<Rank> = next.tables[1].cards.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![Rank::Nine, Rank::Eight, Rank::Seven]);
        assert_eq!(next.stats.points, 0);
        assert_eq!(next.stats.moves, 1);
    }

    #[test]
    fn drop_table_from_a_stack_costs_five_per_card() {
        let mut state = empty_state();
        state.stacks[Suit::Hearts.stack_index()]
            .cards
            .push(card(Suit::Hearts, Rank::Ace, Side::Front));
        state.stacks[Suit::Hearts.stack_index()]
            .cards
            .push(card(Suit::Hearts, Rank::Two, Side::Front));
        state.tables[3].cards.push(card(Suit::Spades, Rank::Three, Side::Front));

        let next = reduce(
            &state,
            &GameAction::DropTable {
                cards: vec![CardId {
                    suit: Suit::Hearts,
                    rank: Rank::Two,
                }],
                table: PileId::table(3),
            },
        );

        assert_eq!(next.stacks[Suit::Hearts.stack_index()].len(), 1);
        assert_eq!(next.tables[3].len(), 2);
        assert_eq!(next.stats.points, -5);
        assert_eq!(next.stats.moves, 1);
    }

    #[test]
    fn drop_table_rejects_color_or_rank_mismatch() {
        let mut state = empty_state();
        state.tables[0].cards.push(card(Suit::Hearts, Rank::Eight, Side::Front));
        state.tables[1].cards.push(card(Suit::Diamonds, Rank::Nine, Side::Front));

        let next = reduce(
            &state,
            &GameAction::DropTable {
                cards: vec![CardId {
                    suit: Suit::Hearts,
                    rank: Rank::Eight,
                }],
                table: PileId::table(1),
            },
        );

        assert!(piles_equal(&state, &next));
        assert_eq!(next.stats, state.stats);
    }

    #[test]
    fn drop_table_rejects_dropping_back_onto_the_origin() {
        let mut state = empty_state();
        state.tables[0].cards.push(card(Suit::Spades, Rank::Nine, Side::Front));
        state.tables[0].cards.push(card(Suit::Hearts, Rank::Eight, Side::Front));

        let next = reduce(
            &state,
            &GameAction::DropTable {
                cards: vec![CardId {
                    suit: Suit::Hearts,
                    rank: Rank::Eight,
                }],
                table: PileId::table(0),
            },
        );

        assert!(piles_equal(&state, &next));
        assert_eq!(next.stats, state.stats);
    }

    #[test]
    fn drop_table_accepts_any_card_on_an_empty_column() {
        let mut state = empty_state();
        state.waste.cards.push(card(Suit::Clubs, Rank::Five, Side::Front));

        let next = reduce(
            &state,
            &GameAction::DropTable {
                cards: vec![CardId {
                    suit: Suit::Clubs,
                    rank: Rank::Five,
                }],
                table: PileId::table(6),
            },
        );

        assert!(next.waste.is_empty());
        assert_eq!(next.tables[6].len(), 1);
        assert_eq!(next.stats.moves, 1);
    }

    #[test]
    fn win_triggers_exactly_on_the_completing_foundation_move() {
        let state = near_won_state(Suit::Spades);
        assert_eq!(state.deck_size(), DECK_SIZE);
        assert_eq!(state.status, GameStatus::Running);

        let king = CardId {
            suit: Suit::Spades,
            rank: Rank::King,
        };
        let next = reduce(&state, &GameAction::DrawWaste { card: king });

        assert_eq!(next.status, GameStatus::Won);
        assert!(next.stacks.iter().all(|stack| stack.len() == 13));
    }

    #[test]
    fn incomplete_foundations_never_read_as_won() {
        let state = near_won_state(Suit::Hearts);
        // A rejected intent still runs the win check; status must hold.
        let ghost = CardId {
            suit: Suit::Hearts,
            rank: Rank::Queen,
        };
        let next = reduce(&state, &GameAction::DrawTable {
            card: ghost,
            side: Side::Front,
        });

        assert_eq!(next.status, GameStatus::Running);
    }

    #[test]
    fn deck_is_conserved_across_a_scripted_session() {
        use std::collections::HashSet;

        let mut state = SolitaireState::new_with_seed(99);
        state.status = GameStatus::Running;

        let assert_full_deck = |state: &SolitaireState| {
            let ids: HashSet<CardId> = state
                .piles()
                .flat_map(|pile| pile.cards.iter().map(PlayingCard::id))
                .collect();
            assert_eq!(ids.len(), DECK_SIZE);
            assert_eq!(state.deck_size(), DECK_SIZE);
        };

        for _ in 0..60 {
            let action = match state.stock.top() {
                Some(top) => GameAction::DrawStock { card: top.id() },
                None => GameAction::EmptyStock,
            };
            state = reduce(&state, &action);
            assert_full_deck(&state);

            if let Some(top) = state.waste.top() {
                let id = top.id();
                state = reduce(&state, &GameAction::DrawWaste { card: id });
                assert_full_deck(&state);
                state = reduce(
                    &state,
                    &GameAction::DropTable {
                        cards: vec![id],
                        table: PileId::table(0),
                    },
                );
                assert_full_deck(&state);
            }
        }
    }
}
