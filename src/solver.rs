use tracing::{info, warn};

use crate::enumerate::enumerate_melds;
use crate::error::Result;
use crate::packing::{Assignment, BranchAndBound, Optimizer, SetPackingProgram};
use crate::{Hand, Indicator, Meld, MeldKind, RawTile, SolveConfig, SolverError, Tile};

/// A meld chosen by the optimizer, with its tiles in hand order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedMeld {
    pub kind: MeldKind,
    pub tiles: Vec<Tile>,
    pub weight: u32,
}

impl SolvedMeld {
    /// Display tokens for each tile ("red 7", "JOKER", ...)
    pub fn tokens(&self) -> Vec<String> {
        self.tiles.iter().map(Tile::display_token).collect()
    }

    pub fn joker_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_joker()).count()
    }
}

/// Best partition of a hand into melds
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solution {
    pub melds: Vec<SolvedMeld>,
    pub total_score: u32,
}

impl Solution {
    /// Each meld as its display tokens plus its weight
    pub fn render(&self) -> Vec<(Vec<String>, u32)> {
        self.melds.iter().map(|m| (m.tokens(), m.weight)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.melds.is_empty()
    }
}

/// Everything one solve request owns: the hand, its candidate melds and
/// the packing program built from them. Nothing here outlives the request.
#[derive(Debug, Clone)]
pub struct SolveContext {
    hand: Hand,
    candidates: Vec<Meld>,
    program: SetPackingProgram,
}

impl SolveContext {
    pub fn new(hand: Hand) -> Self {
        let candidates = enumerate_melds(&hand);
        let program = SetPackingProgram::formulate(hand.len(), &candidates);
        SolveContext {
            hand,
            candidates,
            program,
        }
    }

    /// Resolve raw tiles and build the context in one step
    pub fn from_raw(raw: &[RawTile], indicator: Option<Indicator>) -> Result<Self> {
        Ok(Self::new(Hand::resolve(raw, indicator)?))
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn candidates(&self) -> &[Meld] {
        &self.candidates
    }

    pub fn program(&self) -> &SetPackingProgram {
        &self.program
    }

    /// Solve with the built-in exact optimizer
    pub fn solve(&self, config: &SolveConfig) -> Result<Solution> {
        self.solve_with(&BranchAndBound::with_time_limit_ms(config.time_limit_ms))
    }

    pub fn solve_with(&self, optimizer: &dyn Optimizer) -> Result<Solution> {
        let assignment = optimizer
            .maximize(&self.program)
            .inspect_err(|e| {
                warn!(error = %e, candidates = self.candidates.len(), "optimizer failed")
            })?;

        if !self.program.is_feasible(&assignment) {
            return Err(SolverError::Infeasible(format!(
                "{} values for {} candidates, or a tile used twice",
                assignment.len(),
                self.candidates.len()
            ))
            .into());
        }

        let solution = extract(&self.hand, &self.candidates, &assignment);
        info!(
            tiles = self.hand.len(),
            candidates = self.candidates.len(),
            melds = solution.melds.len(),
            total_score = solution.total_score,
            "solved hand"
        );
        Ok(solution)
    }
}

/// Map the chosen decision variables back to tiles and weights
pub fn extract(hand: &Hand, candidates: &[Meld], assignment: &Assignment) -> Solution {
    let melds: Vec<SolvedMeld> = assignment
        .chosen()
        .map(|var| {
            let meld = &candidates[var];
            SolvedMeld {
                kind: meld.kind,
                tiles: meld.indices.iter().map(|&i| hand.tiles()[i]).collect(),
                weight: meld.weight,
            }
        })
        .collect();
    let total_score = melds.iter().map(|m| m.weight).sum();

    Solution { melds, total_score }
}

/// Resolve, enumerate and solve a hand in one call
pub fn solve_hand(
    raw: &[RawTile],
    indicator: Option<Indicator>,
    config: &SolveConfig,
) -> Result<Solution> {
    SolveContext::from_raw(raw, indicator)?.solve(config)
}
