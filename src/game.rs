use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod setup;

pub const DECK_SIZE: usize = 52;
pub const STACK_COUNT: usize = 4;
pub const TABLE_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Spades,
    Hearts,
    Diamonds,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Spades, Suit::Hearts, Suit::Diamonds];

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Clubs => "clubs",
            Suit::Spades => "spades",
            Suit::Hearts => "hearts",
            Suit::Diamonds => "diamonds",
        }
    }

    pub fn initial(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
        }
    }

    pub fn stack_index(self) -> usize {
        match self {
            Suit::Clubs => 0,
            Suit::Spades => 1,
            Suit::Hearts => 2,
            Suit::Diamonds => 3,
        }
    }

    pub fn from_initial(initial: char) -> Option<Self> {
        match initial {
            'c' => Some(Suit::Clubs),
            's' => Some(Suit::Spades),
            'h' => Some(Suit::Hearts),
            'd' => Some(Suit::Diamonds),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Position in the ace-low total order, 0..=12.
    pub fn index(self) -> usize {
        match self {
            Rank::Ace => 0,
            Rank::Two => 1,
            Rank::Three => 2,
            Rank::Four => 3,
            Rank::Five => 4,
            Rank::Six => 5,
            Rank::Seven => 6,
            Rank::Eight => 7,
            Rank::Nine => 8,
            Rank::Ten => 9,
            Rank::Jack => 10,
            Rank::Queen => 11,
            Rank::King => 12,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rank| rank.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

/// Stable identity of a card for the lifetime of a game. One deck never
/// holds two cards of the same suit and rank, so the pair is the identity;
/// pile membership and index queries key off this, never off which
/// allocation a card happens to live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardId {
    pub suit: Suit,
    pub rank: Rank,
}

impl CardId {
    pub fn parse(id: &str) -> Option<Self> {
        let (initial, label) = id.split_once('_')?;
        let mut chars = initial.chars();
        let suit = Suit::from_initial(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        let rank = Rank::from_label(label)?;
        Some(Self { suit, rank })
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.suit.initial(), self.rank.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayingCard {
    pub suit: Suit,
    pub rank: Rank,
    pub side: Side,
}

impl PlayingCard {
    pub fn id(&self) -> CardId {
        CardId {
            suit: self.suit,
            rank: self.rank,
        }
    }

    pub fn color_red(&self) -> bool {
        self.suit.is_red()
    }

    pub fn label(&self) -> String {
        format!(
            "{}{}",
            self.rank.label(),
            self.suit.initial().to_ascii_uppercase()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PileKind {
    Stock,
    Waste,
    Stack,
    Table,
}

impl PileKind {
    pub fn id(self) -> &'static str {
        match self {
            PileKind::Stock => "stock",
            PileKind::Waste => "waste",
            PileKind::Stack => "stack",
            PileKind::Table => "table",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "stock" => Some(PileKind::Stock),
            "waste" => Some(PileKind::Waste),
            "stack" => Some(PileKind::Stack),
            "table" => Some(PileKind::Table),
            _ => None,
        }
    }
}

/// Stable identity of a pile slot. Stock and waste carry no slot number and
/// render as index -1, matching the attribute ids the presentation layer
/// stamps on its containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PileId {
    pub kind: PileKind,
    pub index: Option<u8>,
}

impl PileId {
    pub fn stock() -> Self {
        Self {
            kind: PileKind::Stock,
            index: None,
        }
    }

    pub fn waste() -> Self {
        Self {
            kind: PileKind::Waste,
            index: None,
        }
    }

    pub fn stack(index: u8) -> Self {
        Self {
            kind: PileKind::Stack,
            index: Some(index),
        }
    }

    pub fn table(index: u8) -> Self {
        Self {
            kind: PileKind::Table,
            index: Some(index),
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        let (kind, index) = id.rsplit_once('_')?;
        let kind = PileKind::from_id(kind)?;
        let index = match index {
            "-1" => None,
            other => Some(other.parse::<u8>().ok()?),
        };
        Some(Self { kind, index })
    }
}

impl fmt::Display for PileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}_{}", self.kind.id(), index),
            None => write!(f, "{}_-1", self.kind.id()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pile {
    #[serde(rename = "type")]
    pub kind: PileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u8>,
    pub cards: Vec<PlayingCard>,
}

impl Pile {
    pub fn new(kind: PileKind, index: Option<u8>) -> Self {
        Self {
            kind,
            index,
            cards: Vec::new(),
        }
    }

    pub fn id(&self) -> PileId {
        PileId {
            kind: self.kind,
            index: self.index,
        }
    }

    /// Top of the pile is the last card in sequence.
    pub fn top(&self) -> Option<&PlayingCard> {
        self.cards.last()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.cards.iter().any(|c| c.id() == card)
    }

    pub fn position_of(&self, card: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id() == card)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub moves: u32,
    pub points: i32,
    pub start_time: u64,
}

impl Stats {
    pub fn started_at(start_time: u64) -> Self {
        Self {
            moves: 0,
            points: 0,
            start_time,
        }
    }

    pub fn started_now() -> Self {
        Self::started_at(epoch_millis())
    }

    /// Elapsed play time against `now` (epoch millis) as zero-padded H:M:S.
    pub fn format_elapsed(&self, now: u64) -> String {
        let millis = now.saturating_sub(self.start_time);
        let hours = millis / 3_600_000;
        let minutes = (millis % 3_600_000) / 60_000;
        let seconds = (millis % 60_000) / 1_000;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Stopped,
    Launching,
    Running,
    Won,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolitaireState {
    pub status: GameStatus,
    pub stock: Pile,
    pub waste: Pile,
    pub stacks: [Pile; STACK_COUNT],
    pub tables: [Pile; TABLE_COUNT],
    pub stats: Stats,
}

impl SolitaireState {
    pub fn piles(&self) -> impl Iterator<Item = &Pile> {
        [&self.stock, &self.waste]
            .into_iter()
            .chain(self.stacks.iter())
            .chain(self.tables.iter())
    }

    pub fn pile(&self, id: PileId) -> Option<&Pile> {
        self.piles().find(|pile| pile.id() == id)
    }

    pub(crate) fn pile_mut(&mut self, id: PileId) -> Option<&mut Pile> {
        if self.stock.id() == id {
            return Some(&mut self.stock);
        }
        if self.waste.id() == id {
            return Some(&mut self.waste);
        }
        self.stacks
            .iter_mut()
            .chain(self.tables.iter_mut())
            .find(|pile| pile.id() == id)
    }

    pub fn find_card(&self, id: CardId) -> Option<&PlayingCard> {
        self.piles()
            .flat_map(|pile| pile.cards.iter())
            .find(|card| card.id() == id)
    }

    pub fn pile_for_card(&self, id: CardId) -> Option<&Pile> {
        self.piles().find(|pile| pile.contains(id))
    }

    pub fn deck_size(&self) -> usize {
        self.piles().map(Pile::len).sum()
    }
}

/// Empty foundation takes only an ace; otherwise same suit, one rank up.
pub fn can_stack_foundation(top: Option<&PlayingCard>, card: &PlayingCard) -> bool {
    match top {
        None => card.rank == Rank::Ace,
        Some(top_card) => {
            top_card.suit == card.suit && card.rank.index() == top_card.rank.index() + 1
        }
    }
}

/// Empty tableau column takes any card; otherwise opposite color, one rank down.
pub fn can_stack_table(top: Option<&PlayingCard>, card: &PlayingCard) -> bool {
    match top {
        None => true,
        Some(top_card) => {
            top_card.color_red() != card.color_red()
                && card.rank.index() + 1 == top_card.rank.index()
        }
    }
}

pub fn full_deck() -> Vec<PlayingCard> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(PlayingCard {
                suit,
                rank,
                side: Side::Back,
            });
        }
    }
    deck
}
