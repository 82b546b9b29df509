//! Every failure the assembler can report.
//!
//! There is no recovery: the first error aborts assembly before any output
//! is written. Syntax errors carry the 1-based source line they occurred on.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("`{path}` is not a .k86 source file")]
    Usage { path: PathBuf },

    #[error("unable to read `{path}`: {source}")]
    Read { path: PathBuf, #[source] source: io::Error },

    #[error("unable to write `{path}`: {source}")]
    Write { path: PathBuf, #[source] source: io::Error },

    #[error("error at line {line}: invalid instruction syntax")]
    InvalidSyntax { line: usize },

    #[error("error at line {line}: invalid operand format")]
    InvalidFormat { line: usize },

    #[error("error at line {line}: unexpected token `{token}`")]
    UnexpectedToken { token: String, line: usize },

    #[error("error at line {line}: label declaration has no name")]
    MalformedLabel { line: usize },

    #[error("error at line {line}: variable declarations in the .data section must be 2 arguments: a token and a value")]
    DeclarationArity { line: usize },

    #[error("error at line {line}: `{name}` is a K86 token")]
    ReservedName { name: String, line: usize },

    #[error("error at line {line}: duplicate token `{name}`")]
    DuplicateVariable { name: String, line: usize },

    #[error("invalid value format: `{text}`")]
    InvalidLiteral { text: String },

    #[error("out of {region} memory")]
    OutOfMemory { region: &'static str },

    #[error("undefined token `{name}` (scan ended at line {line})")]
    UndefinedToken { name: String, line: usize },
}
