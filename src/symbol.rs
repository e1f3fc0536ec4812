use lasso::{Rodeo, Spur};

/// Interned name of a second-order variable.
pub type Symbol = Spur;

/// Interner for second-order variable names.
///
/// The same name always yields the same [`Symbol`], so assignments and
/// formula literals compare variables by id rather than by string.
#[derive(Debug, Default)]
pub struct SymbolStore {
    rodeo: Rodeo,
}

impl SymbolStore {
    pub fn new() -> Self {
        Self {
            rodeo: Rodeo::new(),
        }
    }

    /// Intern `name`, returning the existing symbol if already known.
    pub fn intern(&mut self, name: &str) -> Symbol {
        self.rodeo.get_or_intern(name)
    }

    /// Look up a symbol without interning.
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.rodeo.get(name)
    }

    pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
        self.rodeo.try_resolve(&symbol)
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/symbol.rs"]
mod tests;
