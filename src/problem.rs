//! A model-checking instance: the structure plus the ordered logical objects.

use crate::formula::Formula;
use crate::logic::LogicalObject;
use crate::quantifier::{Quantifier, SetVar};
use crate::structure::Structure;
use crate::symbol::SymbolStore;

/// Structure, interned names and logical objects, quantifiers first.
///
/// Formulas look up quantified sets in the assignment while the same
/// structural event is being processed, so every quantifier must run before
/// any formula. [`ProblemBuilder::build`] establishes that order no matter
/// how declarations were interleaved.
#[derive(Debug)]
pub struct Problem {
    structure: Structure,
    symbols: SymbolStore,
    objects: Vec<LogicalObject>,
    quantifier_count: usize,
}

impl Problem {
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn symbols(&self) -> &SymbolStore {
        &self.symbols
    }

    pub fn objects(&self) -> &[LogicalObject] {
        &self.objects
    }

    pub fn quantifiers(&self) -> impl Iterator<Item = &Quantifier> + '_ {
        self.objects[..self.quantifier_count]
            .iter()
            .filter_map(|object| match object {
                LogicalObject::Quantifier(q) => Some(q),
                LogicalObject::Formula(_) => None,
            })
    }

    pub fn formulas(&self) -> impl Iterator<Item = &Formula> + '_ {
        self.objects[self.quantifier_count..]
            .iter()
            .filter_map(|object| match object {
                LogicalObject::Formula(f) => Some(f),
                LogicalObject::Quantifier(_) => None,
            })
    }

    /// Every quantified variable, in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &SetVar> + '_ {
        self.quantifiers().flat_map(|q| q.variables().iter())
    }
}

/// Collects declarations in input order.
#[derive(Debug)]
pub struct ProblemBuilder {
    structure: Structure,
    symbols: SymbolStore,
    quantifiers: Vec<Quantifier>,
    formulas: Vec<Formula>,
}

impl ProblemBuilder {
    pub fn new(structure: Structure) -> Self {
        Self {
            structure,
            symbols: SymbolStore::new(),
            quantifiers: Vec::new(),
            formulas: Vec::new(),
        }
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn structure_mut(&mut self) -> &mut Structure {
        &mut self.structure
    }

    /// The structure for resolving names together with the interner.
    pub fn names(&mut self) -> (&Structure, &mut SymbolStore) {
        (&self.structure, &mut self.symbols)
    }

    /// Intern `name` as a set variable.
    pub fn set_var(&mut self, name: &str) -> SetVar {
        SetVar {
            symbol: self.symbols.intern(name),
            name: name.to_string(),
        }
    }

    pub fn quantifier(&mut self, quantifier: Quantifier) -> &mut Self {
        self.quantifiers.push(quantifier);
        self
    }

    pub fn formula(&mut self, formula: Formula) -> &mut Self {
        self.formulas.push(formula);
        self
    }

    pub fn build(self) -> Problem {
        let quantifier_count = self.quantifiers.len();
        let objects = self
            .quantifiers
            .into_iter()
            .map(LogicalObject::Quantifier)
            .chain(self.formulas.into_iter().map(LogicalObject::Formula))
            .collect();
        Problem {
            structure: self.structure,
            symbols: self.symbols,
            objects,
            quantifier_count,
        }
    }
}

#[cfg(test)]
#[path = "tests/problem.rs"]
mod tests;
