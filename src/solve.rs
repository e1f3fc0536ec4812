//! End-to-end evaluation: parse, decompose, run the dynamic program, report.

use crate::decomposition::{Decomposer, DecompositionError, MinDegree};
use crate::driver::evaluate;
use crate::engine::Engine;
use crate::metrics::MetricsReport;
use crate::parser::{parse_problem, ParseError};
use crate::problem::Problem;
use crate::structure::Vertex;
use crate::trace::{debug_span, info};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveError {
    Parse(ParseError),
    Decomposition(DecompositionError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Parse(err) => write!(f, "{}", err),
            SolveError::Decomposition(err) => write!(f, "tree decomposition failed: {}", err),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::Parse(err) => Some(err),
            SolveError::Decomposition(err) => Some(err),
        }
    }
}

impl From<ParseError> for SolveError {
    fn from(err: ParseError) -> Self {
        SolveError::Parse(err)
    }
}

impl From<DecompositionError> for SolveError {
    fn from(err: DecompositionError) -> Self {
        SolveError::Decomposition(err)
    }
}

/// Knobs for [`solve_with`].
#[derive(Clone, Copy)]
pub struct SolveOptions<'d> {
    pub decomposer: &'d dyn Decomposer,
}

impl Default for SolveOptions<'static> {
    fn default() -> Self {
        Self {
            decomposer: &MinDegree,
        }
    }
}

impl fmt::Debug for SolveOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolveOptions").finish_non_exhaustive()
    }
}

/// An optimal satisfying assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub value: i64,
    /// Every declared variable with its elements, sorted by name.
    pub sets: Vec<(String, Vec<Vertex>)>,
}

impl Solution {
    pub fn set(&self, name: &str) -> Option<&[Vertex]> {
        self.sets
            .iter()
            .find(|(var, _)| var == name)
            .map(|(_, members)| members.as_slice())
    }
}

/// Result of one run, printed by the binary through `Display`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub vertices: usize,
    pub edges: usize,
    pub components: usize,
    pub width: usize,
    /// `None` if the structure is not a model.
    pub solution: Option<Solution>,
    pub metrics: MetricsReport,
}

impl Outcome {
    pub fn is_model(&self) -> bool {
        self.solution.is_some()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "|V| = {}, |E| = {}, cc(G) = {}",
            self.vertices, self.edges, self.components
        )?;
        writeln!(f, "tw(G) = {}", self.width)?;
        let Some(solution) = &self.solution else {
            return writeln!(f, "Not a model!");
        };
        writeln!(f, "Found a solution of value: {}.", solution.value)?;
        for (name, members) in &solution.sets {
            write!(f, "{} = {{", name)?;
            for (i, v) in members.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", v)?;
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

/// Parse and solve `input` with the default options.
pub fn solve(input: &str) -> Result<Outcome, SolveError> {
    solve_with(input, SolveOptions::default())
}

pub fn solve_with(input: &str, options: SolveOptions<'_>) -> Result<Outcome, SolveError> {
    let problem = parse_problem(input)?;
    solve_problem(&problem, options)
}

/// Solve an already built instance.
pub fn solve_problem(problem: &Problem, options: SolveOptions<'_>) -> Result<Outcome, SolveError> {
    let graph = problem.structure().graph();
    let decomposition = options.decomposer.decompose(graph)?;
    let width = decomposition.width();

    let _span = debug_span!("solve", width, objects = problem.objects().len()).entered();
    let engine = Engine::new(problem, width);
    let mut root = evaluate(&engine, &decomposition);
    let solution = root.satisfying_state().map(|state| {
        let mut sets: Vec<(String, Vec<Vertex>)> = problem
            .variables()
            .map(|var| (var.name.clone(), state.assignment.members(var.symbol)))
            .collect();
        sets.sort_by(|a, b| a.0.cmp(&b.0));
        Solution {
            value: state.value,
            sets,
        }
    });
    info!(model = solution.is_some(), width, "solved");

    Ok(Outcome {
        vertices: graph.vertex_count(),
        edges: graph.edge_count(),
        components: graph.connected_components(),
        width,
        solution,
        metrics: engine.metrics().report(),
    })
}

#[cfg(test)]
#[path = "tests/solve.rs"]
mod tests;
