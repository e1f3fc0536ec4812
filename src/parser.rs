//! Line-oriented reader for model-checking instances.
//!
//! ```text
//! c 3-colourability of a triangle
//! universe 3
//! vocabulary E 2 3
//! E 0 1
//! E 1 2
//! E 2 0
//! exists R G B
//! axay 3
//! -R x -R y
//! -G x -G y
//! -B x -B y
//! ```
//!
//! Directives:
//! - `universe n` comes first.
//! - `vocabulary R1 a1 k1 R2 a2 k2 ..` declares relations and is followed by
//!   `k1 + k2 + ..` tuple lines `R e0 e1 ..`.
//! - `min X w0 .. w(n-1)`, `exists R1 .. Rk`, `connected X`, `forest X`
//!   declare quantifiers.
//! - `axay|axey|exey|exay|ax|ex m` is followed by `m` clause lines.
//!
//! Blank lines and lines whose first token is `c` are skipped everywhere,
//! including inside tuple and clause blocks.

use crate::formula::{Clause, Formula, Shape};
use crate::problem::{Problem, ProblemBuilder};
use crate::quantifier::{Connected, Forest, Optimization, Partition, Quantifier, SetVar};
use crate::structure::{Structure, Vertex};
use crate::trace::debug;
use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Parse error, located by 1-based input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl fmt::Display) -> Self {
        Self {
            line,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse a complete instance.
pub fn parse_problem(input: &str) -> Result<Problem, ParseError> {
    Parser::new(input).run()
}

/// Content lines with their line numbers.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    last: usize,
}

impl<'a> Lines<'a> {
    fn next_content(&mut self) -> Option<(usize, &'a str)> {
        for (i, text) in self.inner.by_ref() {
            self.last = i + 1;
            match text.split_whitespace().next() {
                None | Some("c") => continue,
                Some(_) => return Some((i + 1, text)),
            }
        }
        None
    }

    /// The next content line, or an error naming what was expected.
    fn expect(&mut self, what: &str) -> Result<(usize, &'a str), ParseError> {
        self.next_content()
            .ok_or_else(|| ParseError::new(self.last, format!("input ended before {}", what)))
    }
}

struct Parser<'a> {
    lines: Lines<'a>,
    builder: Option<ProblemBuilder>,
    vocabulary: bool,
    bound: HashSet<String>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: Lines {
                inner: input.lines().enumerate(),
                last: 0,
            },
            builder: None,
            vocabulary: false,
            bound: HashSet::new(),
        }
    }

    fn run(mut self) -> Result<Problem, ParseError> {
        while let Some((line, text)) = self.lines.next_content() {
            let mut tokens = text.split_whitespace();
            let Some(directive) = tokens.next() else {
                continue;
            };
            let args: SmallVec<[&str; 8]> = tokens.collect();
            debug!(line, directive, args = args.len(), "directive");
            match directive {
                "universe" => self.universe(line, &args)?,
                "vocabulary" => self.vocabulary(line, &args)?,
                "min" => self.min(line, &args)?,
                "exists" => self.exists(line, &args)?,
                "connected" | "forest" => self.single(line, directive, &args)?,
                keyword => match Shape::from_keyword(keyword) {
                    Some(shape) => self.formula(line, shape, &args)?,
                    None => {
                        return Err(ParseError::new(
                            line,
                            format!("unknown directive '{}'", keyword),
                        ))
                    }
                },
            }
        }
        match self.builder {
            Some(builder) => Ok(builder.build()),
            None => Err(ParseError::new(self.lines.last, "missing universe declaration")),
        }
    }

    fn universe(&mut self, line: usize, args: &[&str]) -> Result<(), ParseError> {
        if self.builder.is_some() {
            return Err(ParseError::new(line, "universe declared twice"));
        }
        let [size] = args else {
            return Err(ParseError::new(line, "expected 'universe <n>'"));
        };
        let n: usize = number(line, size)?;
        self.builder = Some(ProblemBuilder::new(Structure::new(n)));
        Ok(())
    }

    fn vocabulary(&mut self, line: usize, args: &[&str]) -> Result<(), ParseError> {
        if self.vocabulary {
            return Err(ParseError::new(line, "vocabulary declared twice"));
        }
        let builder = self
            .builder
            .as_mut()
            .ok_or_else(|| ParseError::new(line, "vocabulary before universe"))?;
        if args.len() % 3 != 0 {
            return Err(ParseError::new(
                line,
                "expected triples '<name> <arity> <count>'",
            ));
        }

        let mut tuples = 0usize;
        for triple in args.chunks(3) {
            let (name, arity, count) = (triple[0], triple[1], triple[2]);
            let arity: usize = number(line, arity)?;
            let count: usize = number(line, count)?;
            if name == crate::structure::EDGE_RELATION && arity != 2 {
                return Err(ParseError::new(line, "relation 'E' must have arity 2"));
            }
            builder
                .structure_mut()
                .add_relation(name, arity)
                .map_err(|err| ParseError::new(line, err))?;
            tuples += count;
        }

        for _ in 0..tuples {
            let (line, text) = self.lines.expect("all tuple lines were read")?;
            let mut tokens = text.split_whitespace();
            let name = tokens.next().unwrap_or_default();
            let elements = tokens
                .map(|token| number::<Vertex>(line, token))
                .collect::<Result<SmallVec<[Vertex; 4]>, _>>()?;
            builder
                .structure_mut()
                .set_in_relation(name, &elements)
                .map_err(|err| ParseError::new(line, err))?;
        }
        self.vocabulary = true;
        Ok(())
    }

    fn min(&mut self, line: usize, args: &[&str]) -> Result<(), ParseError> {
        let Some((name, weights)) = args.split_first() else {
            return Err(ParseError::new(line, "expected 'min <X> <weights..>'"));
        };
        let n = self.declared(line)?.structure().universe_size();
        if weights.len() != n {
            return Err(ParseError::new(
                line,
                format!("expected {} weights, found {}", n, weights.len()),
            ));
        }
        let weights = weights
            .iter()
            .map(|token| number::<i64>(line, token))
            .collect::<Result<Vec<_>, _>>()?;
        let var = self.bind(line, name)?;
        self.declared(line)?
            .quantifier(Quantifier::Optimization(Optimization::new(var, weights)));
        Ok(())
    }

    fn exists(&mut self, line: usize, args: &[&str]) -> Result<(), ParseError> {
        if args.is_empty() {
            return Err(ParseError::new(line, "expected 'exists <R1> .. <Rk>'"));
        }
        self.declared(line)?;
        let classes = args
            .iter()
            .map(|name| self.bind(line, name))
            .collect::<Result<Vec<_>, _>>()?;
        self.declared(line)?
            .quantifier(Quantifier::Partition(Partition::new(classes)));
        Ok(())
    }

    /// `connected X` or `forest X`.
    fn single(&mut self, line: usize, directive: &str, args: &[&str]) -> Result<(), ParseError> {
        let [name] = args else {
            return Err(ParseError::new(
                line,
                format!("expected '{} <X>'", directive),
            ));
        };
        self.declared(line)?;
        let var = self.bind(line, name)?;
        let quantifier = if directive == "connected" {
            Quantifier::Connected(Connected::new(var))
        } else {
            Quantifier::Forest(Forest::new(var))
        };
        self.declared(line)?.quantifier(quantifier);
        Ok(())
    }

    fn formula(&mut self, line: usize, shape: Shape, args: &[&str]) -> Result<(), ParseError> {
        let [count] = args else {
            return Err(ParseError::new(
                line,
                format!("expected '{} <m>'", shape.keyword()),
            ));
        };
        let count: usize = number(line, count)?;
        self.declared(line)?;

        let mut clauses = Vec::with_capacity(count);
        for _ in 0..count {
            let (line, text) = self.lines.expect("all clause lines were read")?;
            let builder = self.declared(line)?;
            let (structure, symbols) = builder.names();
            let clause =
                Clause::parse(text, structure, symbols).map_err(|err| ParseError::new(line, err))?;
            clauses.push(clause);
        }
        self.declared(line)?.formula(Formula::new(shape, clauses));
        Ok(())
    }

    fn declared(&mut self, line: usize) -> Result<&mut ProblemBuilder, ParseError> {
        match self.builder.as_mut() {
            Some(builder) if self.vocabulary => Ok(builder),
            _ => Err(ParseError::new(line, "quantifiers and formulas must follow the vocabulary")),
        }
    }

    /// Intern a fresh second-order variable name.
    fn bind(&mut self, line: usize, name: &str) -> Result<SetVar, ParseError> {
        let builder = self.declared(line)?;
        if builder.structure().resolve(name).is_some() {
            return Err(ParseError::new(
                line,
                format!("variable '{}' shadows a relation", name),
            ));
        }
        if name == "=" || name.starts_with('-') {
            return Err(ParseError::new(line, format!("invalid variable name '{}'", name)));
        }
        let var = builder.set_var(name);
        if !self.bound.insert(name.to_string()) {
            return Err(ParseError::new(line, format!("variable '{}' bound twice", name)));
        }
        Ok(var)
    }
}

fn number<T: FromStr>(line: usize, token: &str) -> Result<T, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::new(line, format!("malformed number '{}'", token)))
}

#[cfg(test)]
#[path = "tests/parser.rs"]
mod tests;
