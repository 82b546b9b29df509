//! The Parser walks the tokenized source once, in order, and builds the
//! image: instructions are assembled as they are seen, labels and `.data`
//! variables are recorded, and references to symbols are left pending for
//! the resolver.
use super::ast::*;
use super::error::Error;
use super::lexer::{Line, Source};
use super::literal;
use super::memory::Memory;
use super::symbols::SymbolTable;

/// Which section of the source the scan is in.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Section {
    /// Before any section marker.
    Unset,
    Data,
    Code,
}

/// Everything produced by a completed scan.
#[derive(Debug)]
pub struct Program {
    pub words: Vec<Word>,
    pub symbols: SymbolTable,
    /// Line number the scan ended on.
    pub last_line: usize,
}

/// One assembly session. All state lives here for the length of one run.
pub struct Parser {
    section: Section,
    memory: Memory,
    symbols: SymbolTable,
    words: Vec<Word>,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            section: Section::Unset,
            memory: Memory::new(),
            symbols: SymbolTable::new(),
            words: Vec::with_capacity(256),
        }
    }

    /// Run the parser, consuming itself and returning the unresolved image.
    pub fn run(mut self, source: Source) -> Result<Program, Error> {
        for line in &source.lines {
            self.statement(line)?;
        }

        info!("Scanned {} lines into {} words", source.line_count, self.words.len());
        Ok(Program {
            words: self.words,
            symbols: self.symbols,
            last_line: source.line_count,
        })
    }

    fn statement(&mut self, line: &Line) -> Result<(), Error> {
        match line.tokens[0].as_str() {
            ".data" => self.section = Section::Data,
            ".code" => self.section = Section::Code,
            _ => match self.section {
                Section::Data => self.declaration(line)?,
                Section::Code => self.code(line)?,
                Section::Unset => info!("line {}: skipped, no section selected", line.number),
            },
        }
        Ok(())
    }

    /// Handles a `.data` line: `<name> <value>`.
    ///
    /// The variable gets the next free data slot, and a `LOADI`/`STORE`
    /// pair through the scratch register is emitted so the program
    /// initializes it at runtime.
    fn declaration(&mut self, line: &Line) -> Result<(), Error> {
        let (name, value) = match line.tokens.as_slice() {
            [name, value] => (name, value),
            _ => return Err(Error::DeclarationArity { line: line.number }),
        };

        self.symbols.check_variable(name, line.number)?;
        let slot = self.memory.data.next_free()?;
        let address = self.memory.data.address(slot);
        self.symbols.define_variable(name, address, line.number)?;

        let value = match value.as_str() {
            "?" => 0,
            text => literal::parse_integer(text)?,
        };
        self.memory.data.reserve(slot, 1)?;
        debug!("line {}: variable `{}` at {} = {}", line.number, name,
            literal::to_fixed_width(address.into(), 12), literal::to_signed_word16(value));

        self.emit(Instruction::Immediate(Mnemonic::LOADI, SCRATCH_REGISTER, Operand::Literal(value)))?;
        self.emit(Instruction::Memory(Mnemonic::STORE, SCRATCH_REGISTER, Operand::Literal(address.into())))
    }

    /// Handles a `.code` line: an instruction or a label.
    fn code(&mut self, line: &Line) -> Result<(), Error> {
        let first = &line.tokens[0];
        match first.parse::<Mnemonic>() {
            Ok(mnemonic) => {
                let ins = instruction(mnemonic, &line.tokens[1..], line.number)?;
                self.emit(ins)
            }
            Err(_) => self.label(line),
        }
    }

    fn label(&mut self, line: &Line) -> Result<(), Error> {
        let token = &line.tokens[0];
        let name = match token.strip_suffix(':') {
            Some(name) if line.tokens.len() == 1 => name,
            _ => return Err(Error::UnexpectedToken { token: token.clone(), line: line.number }),
        };
        if name.is_empty() {
            return Err(Error::MalformedLabel { line: line.number });
        }

        // The label points at the next instruction but does not claim it.
        let slot = self.memory.instructions.next_free()?;
        let address = self.memory.instructions.address(slot);
        if let Some(previous) = self.symbols.define_label(name, address) {
            debug!("line {}: label `{}` moved from {} to {}", line.number, name, previous, address);
        }
        Ok(())
    }

    /// Reserves instruction memory for `ins` and appends its words.
    fn emit(&mut self, ins: Instruction) -> Result<(), Error> {
        let slot = self.memory.instructions.next_free()?;
        self.memory.instructions.reserve(slot, ins.size())?;
        debug!("{:04}: {}", slot, ins);
        self.words.extend(ins.assemble());
        Ok(())
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds an instruction from the operand tokens that follow `mnemonic`.
fn instruction(mnemonic: Mnemonic, operands: &[String], line: usize) -> Result<Instruction, Error> {
    let format = mnemonic.format();
    if operands.len() + 1 != format.token_count() {
        return Err(Error::InvalidSyntax { line });
    }

    let register = |token: &str| token.parse::<Register>().map_err(|_| Error::InvalidFormat { line });

    Ok(match format {
        Format::Jump => Instruction::Jump(mnemonic, Operand::parse(&operands[0])),
        Format::OneOperand => Instruction::OneOperand(mnemonic, register(&operands[0])?),
        Format::NoOperand => Instruction::NoOperand(mnemonic),
        _ => {
            let first = register(strip_comma(&operands[0]))?;
            let second = &operands[1];
            match format {
                Format::TwoRegister => Instruction::TwoRegister(mnemonic, first, register(second)?),
                Format::Shift => {
                    let count = literal::parse_integer(second).map_err(|_| Error::InvalidFormat { line })?;
                    Instruction::Shift(mnemonic, first, count)
                }
                Format::Immediate => Instruction::Immediate(mnemonic, first, Operand::parse(second)),
                _ => Instruction::Memory(mnemonic, first, Operand::parse(second)),
            }
        }
    })
}

/// `R1,` and `R1,junk` both name `R1`.
fn strip_comma(token: &str) -> &str {
    match token.find(',') {
        Some(end) => &token[..end],
        None => token,
    }
}
