//! Labels and `.data` variables.
//!
//! Labels may be redefined freely; the last definition wins. Variables may
//! not shadow a mnemonic, a register or another variable.
use std::collections::HashMap;

use super::ast::{Mnemonic, Register};
use super::error::Error;

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    labels: HashMap<String, u16>,
    variables: HashMap<String, u16>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to an instruction address, returning the address it
    /// was previously bound to.
    pub fn define_label(&mut self, name: &str, address: u16) -> Option<u16> {
        self.labels.insert(name.to_owned(), address)
    }

    /// Fails if `name` may not become a new variable.
    pub fn check_variable(&self, name: &str, line: usize) -> Result<(), Error> {
        if is_reserved(name) {
            return Err(Error::ReservedName { name: name.to_owned(), line });
        }
        if self.variables.contains_key(name) {
            return Err(Error::DuplicateVariable { name: name.to_owned(), line });
        }
        Ok(())
    }

    /// Binds `name` to a data address.
    pub fn define_variable(&mut self, name: &str, address: u16, line: usize) -> Result<(), Error> {
        self.check_variable(name, line)?;
        self.variables.insert(name.to_owned(), address);
        Ok(())
    }

    /// Looks `name` up as a label, then as a variable.
    pub fn resolve(&self, name: &str) -> Option<u16> {
        self.labels.get(name)
            .or_else(|| self.variables.get(name))
            .copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, u16)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, u16)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Whether `name` is a mnemonic or register name.
fn is_reserved(name: &str) -> bool {
    name.parse::<Mnemonic>().is_ok() || name.parse::<Register>().is_ok()
}
