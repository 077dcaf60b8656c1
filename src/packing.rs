//! Maximum-weight set packing.
//!
//! Candidate melds become 0/1 decision variables. Each tile position is a
//! row that at most one chosen variable may cover. The objective is the
//! total weight of the chosen variables.

use tracing::debug;

use crate::clock::TimeTracker;
use crate::{Meld, SolverError};

/// A 0/1 program: maximize `sum(weight[v] * x[v])` subject to
/// `sum(x[v] for v covering t) <= 1` for every row `t`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetPackingProgram {
    weights: Vec<u32>,
    /// Rows covered by each variable
    columns: Vec<Vec<usize>>,
    /// Variables covering each row
    rows: Vec<Vec<usize>>,
}

impl SetPackingProgram {
    /// One variable per meld, one row per hand position in `0..universe`
    pub fn formulate(universe: usize, melds: &[Meld]) -> Self {
        let mut rows = vec![Vec::new(); universe];
        for (var, meld) in melds.iter().enumerate() {
            for &tile in &meld.indices {
                rows[tile].push(var);
            }
        }

        let program = SetPackingProgram {
            weights: melds.iter().map(|m| m.weight).collect(),
            columns: melds.iter().map(|m| m.indices.clone()).collect(),
            rows,
        };
        debug!(
            variables = program.num_variables(),
            rows = program.num_rows(),
            "formulated set packing program"
        );
        program
    }

    pub fn num_variables(&self) -> usize {
        self.weights.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn weight(&self, var: usize) -> u32 {
        self.weights[var]
    }

    /// Rows a variable covers
    pub fn column(&self, var: usize) -> &[usize] {
        &self.columns[var]
    }

    /// Variables that compete for each row
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    pub fn objective(&self, assignment: &Assignment) -> u64 {
        assignment.chosen().map(|v| u64::from(self.weights[v])).sum()
    }

    /// True when the assignment has one value per variable and no row is covered twice
    pub fn is_feasible(&self, assignment: &Assignment) -> bool {
        assignment.len() == self.num_variables()
            && self
                .rows
                .iter()
                .all(|vars| vars.iter().filter(|&&v| assignment.is_set(v)).count() <= 1)
    }
}

/// Values of the decision variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment(Vec<bool>);

impl Assignment {
    pub fn new(values: Vec<bool>) -> Self {
        Assignment(values)
    }

    /// All variables at zero
    pub fn zeros(len: usize) -> Self {
        Assignment(vec![false; len])
    }

    fn from_chosen(len: usize, chosen: &[usize]) -> Self {
        let mut values = vec![false; len];
        for &v in chosen {
            values[v] = true;
        }
        Assignment(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_set(&self, var: usize) -> bool {
        self.0.get(var).copied().unwrap_or(false)
    }

    /// Indices of variables set to one, ascending
    pub fn chosen(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().filter_map(|(v, &x)| x.then_some(v))
    }
}

/// An exact solver for set-packing programs.
///
/// Implementations must return an optimal assignment or fail; a
/// best-effort answer is never acceptable. Any search state lives inside
/// a single call so one optimizer can serve concurrent requests.
pub trait Optimizer {
    fn maximize(&self, program: &SetPackingProgram) -> Result<Assignment, SolverError>;
}

/// Depth-first branch and bound over rows.
///
/// At each node the lowest row that still has an open variable is either
/// covered by one of its open variables or left empty. Branches whose
/// optimistic bound cannot beat the incumbent are cut. The bound gives
/// every open row the best weight-per-row of any variable still open on
/// it, which never underestimates what the row can contribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBound {
    time_limit_ms: Option<u64>,
}

impl BranchAndBound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_limit_ms(limit_ms: Option<u64>) -> Self {
        BranchAndBound {
            time_limit_ms: limit_ms,
        }
    }
}

impl Optimizer for BranchAndBound {
    fn maximize(&self, program: &SetPackingProgram) -> Result<Assignment, SolverError> {
        let mut search = Search::new(program, TimeTracker::new(self.time_limit_ms));
        search.explore()?;

        debug!(
            nodes = search.nodes,
            objective = search.best_value,
            chosen = search.best.len(),
            "branch and bound finished"
        );
        Ok(Assignment::from_chosen(program.num_variables(), &search.best))
    }
}

struct Search<'a> {
    program: &'a SetPackingProgram,
    timer: TimeTracker,
    /// Weight per covered row, scaled so every value is an exact integer
    density: Vec<u64>,
    scale: u64,
    /// Per row, its variables ordered by density, best first
    by_density: Vec<Vec<usize>>,
    /// Rows already covered or given up on
    closed: Vec<bool>,
    chosen: Vec<usize>,
    value: u64,
    best: Vec<usize>,
    best_value: u64,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(program: &'a SetPackingProgram, timer: TimeTracker) -> Self {
        let scale = program
            .columns
            .iter()
            .map(|c| c.len() as u64)
            .filter(|&len| len > 0)
            .fold(1, lcm);
        let density: Vec<u64> = (0..program.num_variables())
            .map(|v| match program.columns[v].len() as u64 {
                0 => 0,
                len => u64::from(program.weights[v]) * scale / len,
            })
            .collect();

        let by_density: Vec<Vec<usize>> = program
            .rows
            .iter()
            .map(|vars| {
                let mut vars = vars.clone();
                vars.sort_by(|&a, &b| density[b].cmp(&density[a]).then(a.cmp(&b)));
                vars
            })
            .collect();

        // Variables that cover nothing never conflict
        let chosen: Vec<usize> = (0..program.num_variables())
            .filter(|&v| program.columns[v].is_empty() && program.weights[v] > 0)
            .collect();
        let value: u64 = chosen.iter().map(|&v| u64::from(program.weights[v])).sum();

        Search {
            program,
            timer,
            density,
            scale,
            by_density,
            closed: vec![false; program.num_rows()],
            best: chosen.clone(),
            best_value: value,
            chosen,
            value,
            nodes: 0,
        }
    }

    fn explore(&mut self) -> Result<(), SolverError> {
        self.nodes += 1;
        if self.timer.is_expired() {
            return Err(SolverError::TimedOut {
                limit_ms: self.timer.limit_ms().unwrap_or_default(),
            });
        }

        if self.value > self.best_value {
            self.best_value = self.value;
            self.best = self.chosen.clone();
        }

        let Some(row) = self.next_open_row() else {
            return Ok(());
        };
        if self.value * self.scale + self.optimistic_bound() <= self.best_value * self.scale {
            return Ok(());
        }

        // Option 1: cover the row with each open variable, densest first
        for k in 0..self.by_density[row].len() {
            let var = self.by_density[row][k];
            if !self.is_open(var) {
                continue;
            }
            self.take(var);
            let result = self.explore();
            self.release(var);
            result?;
        }

        // Option 2: leave the row empty
        self.closed[row] = true;
        let result = self.explore();
        self.closed[row] = false;
        result
    }

    fn is_open(&self, var: usize) -> bool {
        self.program.columns[var].iter().all(|&row| !self.closed[row])
    }

    fn next_open_row(&self) -> Option<usize> {
        (0..self.closed.len())
            .find(|&row| !self.closed[row] && self.by_density[row].iter().any(|&v| self.is_open(v)))
    }

    fn optimistic_bound(&self) -> u64 {
        (0..self.closed.len())
            .filter(|&row| !self.closed[row])
            .map(|row| {
                self.by_density[row]
                    .iter()
                    .find(|&&v| self.is_open(v))
                    .map_or(0, |&v| self.density[v])
            })
            .sum()
    }

    fn take(&mut self, var: usize) {
        for &row in &self.program.columns[var] {
            self.closed[row] = true;
        }
        self.value += u64::from(self.program.weights[var]);
        self.chosen.push(var);
    }

    fn release(&mut self, var: usize) {
        for &row in &self.program.columns[var] {
            self.closed[row] = false;
        }
        self.value -= u64::from(self.program.weights[var]);
        self.chosen.pop();
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}
