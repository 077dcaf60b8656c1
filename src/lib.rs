use std::fmt;

use serde::{Deserialize, Serialize};

pub mod api;
pub mod clock;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod packing;
pub mod solver;
#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

pub use config::SolveConfig;
pub use error::{OkeyError, SolverError, ValidationError};
pub use solver::{Solution, SolveContext, SolvedMeld, solve_hand};

pub const MIN_RANK: u8 = 1;
pub const MAX_RANK: u8 = 13;

/// Color marker that selects a real joker in raw input
pub const JOKER_MARKER: &str = "okey";
/// Color marker that selects a fake joker in raw input
pub const FAKE_JOKER_MARKER: &str = "fake_okey";
/// Display token used for every real joker, whatever it stands for
pub const JOKER_TOKEN: &str = "JOKER";

/// One of the four tile suits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Black,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Black, Color::Yellow];

    /// Parse a lowercase color name ("red", "blue", "black", "yellow")
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Color::Red),
            "blue" => Ok(Color::Blue),
            "black" => Ok(Color::Black),
            "yellow" => Ok(Color::Yellow),
            _ => Err(ValidationError::UnknownColor(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Black => "black",
            Color::Yellow => "yellow",
        }
    }

    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "r" => Some(Color::Red),
            "b" => Some(Color::Blue),
            "k" => Some(Color::Black),
            "y" => Some(Color::Yellow),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a tile is allowed to do in a meld
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileRole {
    /// An ordinary numbered tile
    Normal,
    /// The okey: a wildcard that may fill any slot
    Joker,
    /// Stands in for the tile one above the indicator; melds as an ordinary tile
    FakeJoker,
}

/// The face-up tile that decides what the jokers represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Indicator {
    pub color: Color,
    pub rank: u8,
}

impl Indicator {
    pub fn new(color: Color, rank: u8) -> Result<Self, ValidationError> {
        check_rank(rank)?;
        Ok(Indicator { color, rank })
    }

    /// Build an indicator from a raw color name and rank
    pub fn from_raw(color: &str, rank: u8) -> Result<Self, ValidationError> {
        Indicator::new(Color::from_name(color)?, rank)
    }

    /// Parse the compact token form ("r9", "k13")
    pub fn from_token(token: &str) -> Result<Self, ValidationError> {
        match RawTile::from_token(token)? {
            RawTile {
                color,
                number: Some(rank),
            } if color != JOKER_MARKER && color != FAKE_JOKER_MARKER => {
                Indicator::from_raw(&color, rank)
            }
            _ => Err(ValidationError::InvalidToken(token.to_string())),
        }
    }

    /// Rank a fake joker stands for: one above the indicator, 13 wraps to 1
    pub fn next_rank(&self) -> u8 {
        (self.rank % MAX_RANK) + 1
    }
}

fn check_rank(rank: u8) -> Result<u8, ValidationError> {
    if (MIN_RANK..=MAX_RANK).contains(&rank) {
        Ok(rank)
    } else {
        Err(ValidationError::RankOutOfRange(rank))
    }
}

/// An unresolved tile descriptor as it arrives from the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTile {
    pub color: String,
    pub number: Option<u8>,
}

impl RawTile {
    pub fn new(color: impl Into<String>, number: Option<u8>) -> Self {
        RawTile {
            color: color.into(),
            number,
        }
    }

    pub fn normal(color: Color, number: u8) -> Self {
        RawTile::new(color.name(), Some(number))
    }

    pub fn joker() -> Self {
        RawTile::new(JOKER_MARKER, None)
    }

    pub fn fake_joker() -> Self {
        RawTile::new(FAKE_JOKER_MARKER, None)
    }

    /// Parse a tile from its compact token.
    /// Format: "r13" (red 13), "b1" (blue 1), "k9" (black 9), "y7" (yellow 7),
    /// "j" (joker), "f" (fake joker)
    pub fn from_token(token: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidToken(token.to_string());
        match token {
            "j" => return Ok(RawTile::joker()),
            "f" => return Ok(RawTile::fake_joker()),
            _ => {}
        }
        if token.len() < 2 || !token.is_char_boundary(1) {
            return Err(invalid());
        }

        let color = Color::from_letter(&token[0..1]).ok_or_else(invalid)?;
        let number: u8 = token[1..].parse().map_err(|_| invalid())?;
        check_rank(number)?;

        Ok(RawTile::normal(color, number))
    }
}

/// One resolved tile, identified by its position in the hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    index: usize,
    color: Color,
    rank: u8,
    role: TileRole,
}

impl Tile {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn role(&self) -> TileRole {
        self.role
    }

    /// True only for real jokers; fake jokers meld as ordinary tiles
    pub fn is_joker(&self) -> bool {
        self.role == TileRole::Joker
    }

    /// Token shown to players: "JOKER" for real jokers, "color rank" otherwise
    pub fn display_token(&self) -> String {
        self.to_string()
    }

    fn resolve(
        index: usize,
        raw: &RawTile,
        indicator: Option<Indicator>,
    ) -> Result<Self, ValidationError> {
        let (color, rank, role) = match raw.color.as_str() {
            JOKER_MARKER => {
                let ind = indicator.ok_or(ValidationError::MissingIndicator)?;
                (ind.color, ind.rank, TileRole::Joker)
            }
            FAKE_JOKER_MARKER => {
                let ind = indicator.ok_or(ValidationError::MissingIndicator)?;
                (ind.color, ind.next_rank(), TileRole::FakeJoker)
            }
            name => {
                let color = Color::from_name(name)?;
                let rank = raw.number.ok_or(ValidationError::MissingRank(index))?;
                (color, check_rank(rank)?, TileRole::Normal)
            }
        };
        Ok(Tile {
            index,
            color,
            rank,
            role,
        })
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_joker() {
            f.write_str(JOKER_TOKEN)
        } else {
            write!(f, "{} {}", self.color, self.rank)
        }
    }
}

/// Shape of a meld
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeldKind {
    /// Same rank, distinct colors
    Set { rank: u8 },
    /// Same color, consecutive ranks `start..start + len`
    Run { color: Color, start: u8, len: u8 },
}

/// A candidate grouping of hand positions and the score it is worth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meld {
    pub kind: MeldKind,
    /// Hand positions, ascending
    pub indices: Vec<usize>,
    pub weight: u32,
}

impl Meld {
    /// A set of `indices.len()` tiles at `rank`; worth rank times size
    pub fn set(rank: u8, indices: Vec<usize>) -> Self {
        let weight = rank as u32 * indices.len() as u32;
        Meld::with_weight(MeldKind::Set { rank }, indices, weight)
    }

    /// A run over the window `start..start + len`; worth the sum of the window
    pub fn run(color: Color, start: u8, len: u8, indices: Vec<usize>) -> Self {
        let weight = (start..start + len).map(u32::from).sum();
        Meld::with_weight(MeldKind::Run { color, start, len }, indices, weight)
    }

    fn with_weight(kind: MeldKind, mut indices: Vec<usize>, weight: u32) -> Self {
        indices.sort_unstable();
        Meld {
            kind,
            indices,
            weight,
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }
}

/// A player's hand: resolved tiles in input order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hand(Vec<Tile>);

impl Hand {
    /// Resolve raw descriptors against the indicator, keeping input order
    pub fn resolve(raw: &[RawTile], indicator: Option<Indicator>) -> Result<Self, ValidationError> {
        raw.iter()
            .enumerate()
            .map(|(index, tile)| Tile::resolve(index, tile, indicator))
            .collect::<Result<Vec<_>, _>>()
            .map(Hand)
    }

    /// Resolve a whitespace-separated list of compact tokens ("r7 r8 j")
    pub fn from_tokens(
        tokens: &str,
        indicator: Option<Indicator>,
    ) -> Result<Self, ValidationError> {
        let raw = tokens
            .split_whitespace()
            .map(RawTile::from_token)
            .collect::<Result<Vec<_>, _>>()?;
        Hand::resolve(&raw, indicator)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.0.iter()
    }

    /// Positions of the real jokers
    pub fn joker_indices(&self) -> Vec<usize> {
        self.0.iter().filter(|t| t.is_joker()).map(|t| t.index).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red9() -> Option<Indicator> {
        Some(Indicator::new(Color::Red, 9).unwrap())
    }

    #[test]
    fn test_resolve_keeps_order_and_roles() {
        let raw = vec![
            RawTile::normal(Color::Blue, 4),
            RawTile::joker(),
            RawTile::fake_joker(),
            RawTile::normal(Color::Blue, 4),
        ];
        let hand = Hand::resolve(&raw, red9()).unwrap();

        assert_eq!(hand.len(), 4);
        for (i, tile) in hand.iter().enumerate() {
            assert_eq!(tile.index(), i);
        }
        assert_eq!(hand.tiles()[0].role(), TileRole::Normal);

        let joker = hand.tiles()[1];
        assert_eq!(joker.role(), TileRole::Joker);
        assert_eq!((joker.color(), joker.rank()), (Color::Red, 9));

        let fake = hand.tiles()[2];
        assert_eq!(fake.role(), TileRole::FakeJoker);
        assert_eq!((fake.color(), fake.rank()), (Color::Red, 10));

        // Identical tiles stay distinct by position
        assert_ne!(hand.tiles()[0], hand.tiles()[3]);
        assert_eq!(hand.joker_indices(), vec![1]);
    }

    #[test]
    fn test_fake_joker_wraps_after_thirteen() {
        let indicator = Some(Indicator::new(Color::Yellow, 13).unwrap());
        let hand = Hand::resolve(&[RawTile::fake_joker()], indicator).unwrap();
        assert_eq!(hand.tiles()[0].rank(), 1);
        assert_eq!(hand.tiles()[0].color(), Color::Yellow);
    }

    #[test]
    fn test_validation_failures() {
        assert_eq!(
            Hand::resolve(&[RawTile::new("green", Some(3))], None),
            Err(ValidationError::UnknownColor("green".to_string()))
        );
        assert_eq!(
            Hand::resolve(&[RawTile::new("red", Some(14))], None),
            Err(ValidationError::RankOutOfRange(14))
        );
        assert_eq!(
            Hand::resolve(&[RawTile::new("red", Some(0))], None),
            Err(ValidationError::RankOutOfRange(0))
        );
        assert_eq!(
            Hand::resolve(&[RawTile::normal(Color::Red, 3), RawTile::new("red", None)], None),
            Err(ValidationError::MissingRank(1))
        );
        assert_eq!(
            Hand::resolve(&[RawTile::joker()], None),
            Err(ValidationError::MissingIndicator)
        );
        assert_eq!(
            Hand::resolve(&[RawTile::fake_joker()], None),
            Err(ValidationError::MissingIndicator)
        );
        assert_eq!(
            Indicator::from_raw("red", 15),
            Err(ValidationError::RankOutOfRange(15))
        );
    }

    #[test]
    fn test_tokens() {
        assert_eq!(RawTile::from_token("r13").unwrap(), RawTile::normal(Color::Red, 13));
        assert_eq!(RawTile::from_token("b1").unwrap(), RawTile::normal(Color::Blue, 1));
        assert_eq!(RawTile::from_token("k9").unwrap(), RawTile::normal(Color::Black, 9));
        assert_eq!(RawTile::from_token("y7").unwrap(), RawTile::normal(Color::Yellow, 7));
        assert_eq!(RawTile::from_token("j").unwrap(), RawTile::joker());
        assert_eq!(RawTile::from_token("f").unwrap(), RawTile::fake_joker());

        assert!(RawTile::from_token("x5").is_err());
        assert!(RawTile::from_token("r14").is_err());
        assert!(RawTile::from_token("r0").is_err());
        assert!(RawTile::from_token("").is_err());
        assert!(RawTile::from_token("r").is_err());

        assert_eq!(
            Indicator::from_token("k13").unwrap(),
            Indicator::new(Color::Black, 13).unwrap()
        );
        assert!(Indicator::from_token("j").is_err());
    }

    #[test]
    fn test_display_tokens() {
        let hand = Hand::from_tokens("r7 j f", red9()).unwrap();
        let tokens: Vec<String> = hand.iter().map(Tile::display_token).collect();
        assert_eq!(tokens, vec!["red 7", "JOKER", "red 10"]);
    }

    #[test]
    fn test_meld_weights() {
        let set = Meld::set(5, vec![2, 0, 1]);
        assert_eq!(set.weight, 15);
        assert_eq!(set.indices, vec![0, 1, 2]);
        assert!(set.contains(1));
        assert!(!set.contains(3));

        let run = Meld::run(Color::Red, 7, 3, vec![0, 1, 2]);
        assert_eq!(run.weight, 24);

        let full = Meld::run(Color::Blue, 1, 13, (0..13).collect());
        assert_eq!(full.weight, 91);
    }
}
