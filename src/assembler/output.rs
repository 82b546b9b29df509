//! Writes the binary image: one 16-character bit string per memory word.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use term_grid::{Cell, Direction, Filling, Grid, GridOptions};

use super::ast::{Instruction, Word, HALT_WORD};
use super::error::Error;

pub const SOURCE_EXTENSION: &str = "k86";
pub const IMAGE_EXTENSION: &str = "bin";

/// Derives `prog.bin` from `prog.k86`, rejecting any other extension.
pub fn image_path(source: &Path) -> Result<PathBuf, Error> {
    match source.extension().and_then(|ext| ext.to_str()) {
        Some(SOURCE_EXTENSION) => Ok(source.with_extension(IMAGE_EXTENSION)),
        _ => Err(Error::Usage { path: source.to_owned() }),
    }
}

/// Appends a HALT unless the image already contains one. A program that
/// runs off its end would otherwise execute the all-zero word forever.
pub fn terminate(words: &mut Vec<Word>) {
    if !words.contains(&Word::Resolved(HALT_WORD)) {
        debug!("No HALT found, appending one");
        words.push(Word::Resolved(HALT_WORD));
    }
}

/// Renders the image, one word per line.
pub fn render(words: &[Word]) -> String {
    let mut out = String::with_capacity(words.len() * 17);
    for word in words {
        out.push_str(&word.to_string());
        out.push('\n');
    }
    out
}

/// Creates `path` and writes the whole image to it.
pub fn write_image(path: &Path, words: &[Word]) -> Result<(), Error> {
    let err = |source| Error::Write { path: path.to_owned(), source };

    let mut file = BufWriter::new(File::create(path).map_err(err)?);
    file.write_all(render(words).as_bytes()).map_err(err)?;
    file.flush().map_err(err)?;

    info!("Wrote {} words to `{}`", words.len(), path.display());
    Ok(())
}

/// Disassembles the image into an address / bits / instruction grid.
pub fn listing(words: &[Word]) -> Grid {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(2),
        direction:   Direction::LeftToRight,
    });

    let bits: Vec<u16> = words.iter()
        .map(|w| match w {
            Word::Resolved(bits) => *bits,
            Word::Pending { .. } => 0,
        })
        .collect();

    let mut address = 0;
    while address < words.len() {
        let (text, size) = match Instruction::decode(&bits[address..]) {
            Some(ins) => (ins.to_string(), ins.size()),
            None => (format!(".word {}", words[address]), 1),
        };

        let shown: Vec<String> = words[address..address + size].iter().map(|w| w.to_string()).collect();
        grid.add(Cell::from(format!("{:04}:", address)));
        grid.add(Cell::from(shown.join(" ")));
        grid.add(Cell::from(text));
        address += size;
    }

    grid
}
