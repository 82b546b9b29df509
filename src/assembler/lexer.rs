//! This lexer splits K86 source into whitespace-separated tokens.
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::error::Error;

/// The non-empty tokens of one source line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Line {
    /// 1-based line number.
    pub number: usize,
    pub tokens: Vec<String>,
}

/// A tokenized source file.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Source {
    pub lines: Vec<Line>,
    /// Number of lines read, blank and comment lines included.
    pub line_count: usize,
}

/// K86 supports a single statement per line. Anything after a `#` is a
/// comment; lines that are blank once comments are removed are dropped.
pub fn tokenize<T: Read + ?Sized>(reader: Box<T>, path: &Path) -> Result<Source, Error> {
    let mut lines = Vec::with_capacity(256);
    let mut line_count = 0;

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.map_err(|source| Error::Read { path: path.to_owned(), source })?;
        line_count = index + 1;

        let tokens = tokenize_line(&line);
        if !tokens.is_empty() {
            lines.push(Line { number: line_count, tokens });
        }
    }

    debug!("Read {} lines ({} statements) from `{}`", line_count, lines.len(), path.display());
    Ok(Source { lines, line_count })
}

fn tokenize_line(line: &str) -> Vec<String> {
    let code = match line.find('#') {
        Some(start) => &line[..start],
        None => line,
    };
    code.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_line() {
        assert_eq!(tokenize_line("LOADI R0, 5"), tokens(&["LOADI", "R0,", "5"]));
        assert_eq!(tokenize_line(" \t ADD   R1,R2 "), tokens(&["ADD", "R1,R2"]));
        assert_eq!(tokenize_line("HALT # stop here # twice"), tokens(&["HALT"]));
        assert_eq!(tokenize_line("# only a comment"), Vec::<String>::new());
        assert_eq!(tokenize_line(""), Vec::<String>::new());
        assert_eq!(tokenize_line("Loop:#label"), tokens(&["Loop:"]));
    }

    #[test]
    fn test_tokenize() {
        let asm_input = "
        .code   # section
        Loop:

        JMP Loop
        ";
        let source = tokenize(Box::new(asm_input.as_bytes()), Path::new("test.k86")).unwrap();

        assert_eq!(source.lines, vec![
            Line { number: 2, tokens: tokens(&[".code"]) },
            Line { number: 3, tokens: tokens(&["Loop:"]) },
            Line { number: 5, tokens: tokens(&["JMP", "Loop"]) },
        ]);
        assert_eq!(source.line_count, 6);
    }

    #[test]
    fn test_tokenize_invalid_utf8() {
        let bytes: &[u8] = &[b'N', b'O', b'P', b'\n', 0xFF, 0xFE, b'\n'];
        assert!(matches!(tokenize(Box::new(bytes), Path::new("bad.k86")), Err(Error::Read { .. })));
    }
}
