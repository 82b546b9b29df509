//! The Assembler module is in charge of taking a
//! K86 file and producing its binary image.
//!
//! Assembly is two passes: a single forward scan
//! assembles instructions and records symbols, then
//! the resolver patches forward references.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod literal;
pub mod memory;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod symbols;
