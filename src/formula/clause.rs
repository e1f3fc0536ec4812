//! CNF clauses over the free variables `x` and `y`.
//!
//! A clause line is a sequence of literals, each `[-]NAME OPERAND..`:
//!
//! ```text
//! -E x y R x       ~E(x, y) or R(x)
//! = x 3 -Red y     x = 3 or ~Red(y)
//! ```
//!
//! `=` takes two operands, a declared relation takes its arity, and any other
//! name is a second-order variable taking one operand. Operands are universe
//! constants or the tokens `x` and `y`.

use crate::quantifier::SetVar;
use crate::state::Assignment;
use crate::structure::{RelRef, Structure, Vertex};
use crate::symbol::SymbolStore;
use smallvec::SmallVec;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Const(Vertex),
    X,
    Y,
}

impl Operand {
    fn bind(self, x: Vertex, y: Vertex) -> Vertex {
        match self {
            Operand::Const(c) => c,
            Operand::X => x,
            Operand::Y => y,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Const(c) => write!(f, "{}", c),
            Operand::X => write!(f, "x"),
            Operand::Y => write!(f, "y"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Atom {
    Equal(Operand, Operand),
    /// A relation of the structure.
    Relation {
        rel: RelRef,
        name: String,
        args: SmallVec<[Operand; 2]>,
    },
    /// Membership in a quantified set.
    Member { var: SetVar, arg: Operand },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Literal {
    pub negated: bool,
    pub atom: Atom,
}

impl Literal {
    pub fn holds(&self, structure: &Structure, x: Vertex, y: Vertex, assignment: &Assignment) -> bool {
        let truth = match &self.atom {
            Atom::Equal(lhs, rhs) => lhs.bind(x, y) == rhs.bind(x, y),
            Atom::Relation { rel, args, .. } => {
                let elements: SmallVec<[Vertex; 4]> =
                    args.iter().map(|arg| arg.bind(x, y)).collect();
                structure.contains(*rel, &elements)
            }
            Atom::Member { var, arg } => assignment.contains(var.symbol, arg.bind(x, y)),
        };
        truth != self.negated
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "-")?;
        }
        match &self.atom {
            Atom::Equal(lhs, rhs) => write!(f, "= {} {}", lhs, rhs),
            Atom::Relation { name, args, .. } => {
                write!(f, "{}", name)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
            Atom::Member { var, arg } => write!(f, "{} {}", var.name, arg),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClauseError {
    EmptyName,
    MissingOperand { literal: String, expected: usize },
    BadOperand(String),
    ElementOutOfRange { element: Vertex, universe: usize },
}

impl fmt::Display for ClauseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseError::EmptyName => write!(f, "literal without a relation name"),
            ClauseError::MissingOperand { literal, expected } => write!(
                f,
                "literal '{}' needs {} operand(s)",
                literal, expected
            ),
            ClauseError::BadOperand(token) => write!(
                f,
                "operand '{}' is neither x, y nor a universe element",
                token
            ),
            ClauseError::ElementOutOfRange { element, universe } => write!(
                f,
                "element {} is outside the universe 0..{}",
                element, universe
            ),
        }
    }
}

impl std::error::Error for ClauseError {}

/// A disjunction of literals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clause {
    literals: SmallVec<[Literal; 4]>,
}

impl Clause {
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: literals.into_iter().collect(),
        }
    }

    /// Parse one clause line, resolving names against `structure`.
    ///
    /// Names the structure does not declare are interned as set variables.
    pub fn parse(
        line: &str,
        structure: &Structure,
        symbols: &mut SymbolStore,
    ) -> Result<Self, ClauseError> {
        let mut tokens = line.split_whitespace();
        let mut literals = SmallVec::new();
        while let Some(token) = tokens.next() {
            let (negated, name) = match token.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, token),
            };
            if name.is_empty() {
                return Err(ClauseError::EmptyName);
            }

            let arity = if name == "=" {
                2
            } else {
                structure.arity(name).unwrap_or(1)
            };
            let mut args: SmallVec<[Operand; 2]> = SmallVec::with_capacity(arity);
            for _ in 0..arity {
                let raw = tokens.next().ok_or_else(|| ClauseError::MissingOperand {
                    literal: token.to_string(),
                    expected: arity,
                })?;
                args.push(parse_operand(raw, structure.universe_size())?);
            }

            let atom = if name == "=" {
                Atom::Equal(args[0], args[1])
            } else if let Some(rel) = structure.resolve(name) {
                Atom::Relation {
                    rel,
                    name: name.to_string(),
                    args,
                }
            } else {
                Atom::Member {
                    var: SetVar {
                        symbol: symbols.intern(name),
                        name: name.to_string(),
                    },
                    arg: args[0],
                }
            };
            literals.push(Literal { negated, atom });
        }
        Ok(Self { literals })
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// At least one literal holds. The empty clause never holds.
    pub fn holds(&self, structure: &Structure, x: Vertex, y: Vertex, assignment: &Assignment) -> bool {
        self.literals
            .iter()
            .any(|literal| literal.holds(structure, x, y, assignment))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, literal) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", literal)?;
        }
        Ok(())
    }
}

fn parse_operand(raw: &str, universe: usize) -> Result<Operand, ClauseError> {
    match raw {
        "x" => Ok(Operand::X),
        "y" => Ok(Operand::Y),
        _ => {
            let element: Vertex = raw
                .parse()
                .map_err(|_| ClauseError::BadOperand(raw.to_string()))?;
            if element >= universe {
                return Err(ClauseError::ElementOutOfRange { element, universe });
            }
            Ok(Operand::Const(element))
        }
    }
}
