//! Second pass: patches every pending symbol reference with its address.
use super::ast::Word;
use super::error::Error;
use super::parser::Program;

/// Resolves all pending words in place, in buffer order. Fails on the first
/// name that is neither a label nor a variable.
pub fn resolve(program: &mut Program) -> Result<(), Error> {
    let mut patched = 0;

    for word in program.words.iter_mut() {
        if let Word::Pending { prefix, symbol } = word {
            let address = match program.symbols.resolve(symbol) {
                Some(address) => address,
                None => return Err(Error::UndefinedToken {
                    name: symbol.clone(),
                    line: program.last_line,
                }),
            };
            let bits = *prefix << 12 | (address & 0x0FFF);
            *word = Word::Resolved(bits);
            patched += 1;
        }
    }

    debug!("Resolved {} symbol references", patched);
    Ok(())
}
