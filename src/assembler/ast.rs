//! This AST describes the K86 instruction set.
//!
//! Every memory word is 16 bits. An opcode occupies the top 4, 8, 12 or 16
//! bits of the first word depending on its format class; the remaining bits
//! hold register codes, a shift count or a 12-bit address. Immediate and
//! memory instructions take a second word.
//!
//! ```text
//! Jump         oooo aaaaaaaaaaaa
//! TwoRegister  oooooooo rrrr ssss
//! Shift        oooooooo rrrr cccc
//! Immediate    oooooooooooo rrrr  vvvvvvvvvvvvvvvv
//! Memory       oooooooooooo rrrr  0000 aaaaaaaaaaaa
//! OneOperand   oooooooooooo rrrr
//! NoOperand    oooooooooooooooo
//! ```
use std::fmt;
use std::str::FromStr;

use super::literal;

/// The HALT word. The all-zero word is not a halt, so images always get one.
pub const HALT_WORD: u16 = 0xFFFF;

/// Register used by the `.data` section's synthesized load/store pairs.
pub const SCRATCH_REGISTER: Register = Register::R0;

/// The operand layout shared by a group of mnemonics.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Format {
    Jump,
    TwoRegister,
    Shift,
    Immediate,
    Memory,
    OneOperand,
    NoOperand,
}

impl Format {
    /// Number of source tokens an instruction of this format takes,
    /// mnemonic included.
    pub fn token_count(&self) -> usize {
        use Format::*;
        match self {
            NoOperand                           => 1,
            Jump | OneOperand                   => 2,
            TwoRegister | Shift | Immediate |
            Memory                              => 3,
        }
    }

    /// Number of memory words an instruction of this format occupies.
    pub fn size(&self) -> usize {
        match self {
            Format::Immediate | Format::Memory => 2,
            _ => 1,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Mnemonic {
    JMP, JZ, JNZ, JC, JNC, JGT, JLT, JO, JNO, JP, JNP,

    ADD, SUB, MULT, DIV, AND, OR, XOR, LOADR, SWAP, CMP, TEST,
    SHL, SHR, ROL, ROR,

    ADDI, SUBI, MULTI, DIVI, LOADI,
    LOADM, LOADA, STORE,
    CLEAR, NOT, NEG, PUSH, POP, PRINT,

    SKIPZ, SKIPNZ, SKIPC, SKIPNC, SKIPGT, SKIPLT, SKIPO, SKIPNO, SKIPP, SKIPNP,
    PUSHPC, RET, INPUT, NOP, SYS, HALT,
}

impl Mnemonic {
    pub const ALL: [Mnemonic; 56] = {
        use Mnemonic::*;
        [
            JMP, JZ, JNZ, JC, JNC, JGT, JLT, JO, JNO, JP, JNP,
            ADD, SUB, MULT, DIV, AND, OR, XOR, LOADR, SWAP, CMP, TEST,
            SHL, SHR, ROL, ROR,
            ADDI, SUBI, MULTI, DIVI, LOADI,
            LOADM, LOADA, STORE,
            CLEAR, NOT, NEG, PUSH, POP, PRINT,
            SKIPZ, SKIPNZ, SKIPC, SKIPNC, SKIPGT, SKIPLT, SKIPO, SKIPNO, SKIPP, SKIPNP,
            PUSHPC, RET, INPUT, NOP, SYS, HALT,
        ]
    };

    pub fn format(&self) -> Format {
        use Mnemonic::*;
        match self {
            JMP | JZ | JNZ | JC | JNC | JGT |
            JLT | JO | JNO | JP | JNP            => Format::Jump,

            ADD | SUB | MULT | DIV | AND | OR |
            XOR | LOADR | SWAP | CMP | TEST      => Format::TwoRegister,

            SHL | SHR | ROL | ROR                => Format::Shift,

            ADDI | SUBI | MULTI | DIVI | LOADI   => Format::Immediate,

            LOADM | LOADA | STORE                => Format::Memory,

            CLEAR | NOT | NEG | PUSH | POP |
            PRINT                                => Format::OneOperand,

            SKIPZ | SKIPNZ | SKIPC | SKIPNC |
            SKIPGT | SKIPLT | SKIPO | SKIPNO |
            SKIPP | SKIPNP | PUSHPC | RET |
            INPUT | NOP | SYS | HALT             => Format::NoOperand,
        }
    }

    /// Width of the opcode field in bits.
    pub fn opcode_width(&self) -> u32 {
        match self.format() {
            Format::Jump => 4,
            Format::TwoRegister | Format::Shift => 8,
            Format::Immediate | Format::Memory | Format::OneOperand => 12,
            Format::NoOperand => 16,
        }
    }

    /// Returns the opcode, right-aligned in `opcode_width()` bits.
    pub fn opcode(&self) -> u16 {
        use Mnemonic::*;
        match self {
            JMP    => 0b0001,
            JZ     => 0b0010,
            JNZ    => 0b0011,
            JC     => 0b0100,
            JNC    => 0b0101,
            JGT    => 0b0110,
            JLT    => 0b0111,
            JO     => 0b1000,
            JNO    => 0b1001,
            JP     => 0b1010,
            JNP    => 0b1011,

            ADD    => 0b1111_0000,
            SUB    => 0b1111_0001,
            MULT   => 0b1111_0010,
            DIV    => 0b1111_0011,
            AND    => 0b1111_0100,
            OR     => 0b1111_0101,
            XOR    => 0b1111_0110,
            SHL    => 0b1111_0111,
            SHR    => 0b1111_1000,
            ROL    => 0b1111_1001,
            ROR    => 0b1111_1010,
            LOADR  => 0b1111_1011,
            SWAP   => 0b1111_1100,
            CMP    => 0b1111_1101,
            TEST   => 0b1111_1110,

            ADDI   => 0b1111_1111_0000,
            SUBI   => 0b1111_1111_0001,
            MULTI  => 0b1111_1111_0010,
            DIVI   => 0b1111_1111_0011,
            LOADI  => 0b1111_1111_0100,
            LOADM  => 0b1111_1111_0101,
            LOADA  => 0b1111_1111_0110,
            STORE  => 0b1111_1111_0111,
            CLEAR  => 0b1111_1111_1000,
            NOT    => 0b1111_1111_1001,
            NEG    => 0b1111_1111_1010,
            PUSH   => 0b1111_1111_1011,
            POP    => 0b1111_1111_1100,
            PRINT  => 0b1111_1111_1110,

            SKIPZ  => 0b1111_1111_1111_0000,
            SKIPNZ => 0b1111_1111_1111_0001,
            SKIPC  => 0b1111_1111_1111_0010,
            SKIPNC => 0b1111_1111_1111_0011,
            SKIPGT => 0b1111_1111_1111_0100,
            SKIPLT => 0b1111_1111_1111_0101,
            SKIPO  => 0b1111_1111_1111_0110,
            SKIPNO => 0b1111_1111_1111_0111,
            SKIPP  => 0b1111_1111_1111_1000,
            SKIPNP => 0b1111_1111_1111_1001,
            PUSHPC => 0b1111_1111_1111_1010,
            RET    => 0b1111_1111_1111_1011,
            INPUT  => 0b1111_1111_1111_1100,
            NOP    => 0b1111_1111_1111_1101,
            SYS    => 0b1111_1111_1111_1110,
            HALT   => 0b1111_1111_1111_1111,
        }
    }

    /// The opcode shifted into the top bits of a word.
    fn prefix(&self) -> u16 {
        self.opcode() << (16 - self.opcode_width())
    }

    /// Finds the mnemonic whose opcode prefixes `word`.
    /// Opcodes are prefix-free, so at most one matches.
    pub fn decode(word: u16) -> Option<Mnemonic> {
        Mnemonic::ALL.iter()
            .copied()
            .find(|m| word >> (16 - m.opcode_width()) == m.opcode())
    }
}

impl FromStr for Mnemonic {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mnemonic::ALL.iter()
            .copied()
            .find(|m| m.to_string() == s)
            .ok_or(())
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::convert::TryFrom<u16> for Register {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        use Register::*;
        match value {
            0  => Ok(R0),
            1  => Ok(R1),
            2  => Ok(R2),
            3  => Ok(R3),
            4  => Ok(R4),
            5  => Ok(R5),
            6  => Ok(R6),
            7  => Ok(R7),
            8  => Ok(R8),
            9  => Ok(R9),
            10 => Ok(R10),
            11 => Ok(R11),
            12 => Ok(R12),
            13 => Ok(R13),
            14 => Ok(R14),
            15 => Ok(R15),
            _  => Err("registers may only have values from 0-15 inclusive".to_owned())
        }
    }
}

impl FromStr for Register {
    type Err = String;

    /// Register names are case-sensitive: `R0` through `R15`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use std::convert::TryFrom;
        let invalid = || format!("`{}` is not a register", s);

        let digits = s.strip_prefix('R').ok_or_else(invalid)?;
        // Reject "R01" and "R+1", which u16 parsing would accept.
        if digits.is_empty() || digits.starts_with('+') || (digits.len() > 1 && digits.starts_with('0')) {
            return Err(invalid());
        }
        let id = digits.parse::<u16>().map_err(|_| invalid())?;
        Register::try_from(id)
    }
}

impl Register {
    /// Convert the register to its 4-bit code.
    pub fn to_u16(&self) -> u16 {
        *self as u16
    }
}

/// An operand that is either known now or names a label/variable.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Operand {
    Literal(i64),
    Symbol(String),
}

impl Operand {
    /// Classifies a source token. Any literal `parse_integer` accepts,
    /// `0x` hex and `+`-signed decimal included, is taken as a number.
    pub fn parse(token: &str) -> Operand {
        match literal::parse_integer(token) {
            Ok(value) => Operand::Literal(value),
            Err(_) => Operand::Symbol(token.to_owned()),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Symbol(name) => write!(f, "{}", name),
        }
    }
}

/// One slot of the output image.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Word {
    Resolved(u16),
    /// Top 4 bits are `prefix`, low 12 bits are the address of `symbol`.
    Pending { prefix: u16, symbol: String },
}

impl Word {
    fn address(prefix: u16, operand: &Operand) -> Word {
        match operand {
            Operand::Literal(value) => Word::Resolved(prefix << 12 | literal::mask(*value, 12)),
            Operand::Symbol(name) => Word::Pending { prefix, symbol: name.clone() },
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Word::Resolved(bits) => write!(f, "{:016b}", bits),
            Word::Pending { prefix, symbol } => write!(f, "{:04b}{}", prefix, symbol),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Instruction {
    Jump(Mnemonic, Operand),
    TwoRegister(Mnemonic, Register, Register),
    Shift(Mnemonic, Register, i64),
    Immediate(Mnemonic, Register, Operand),
    Memory(Mnemonic, Register, Operand),
    OneOperand(Mnemonic, Register),
    NoOperand(Mnemonic),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Instruction::*;
        match self {
            Jump(m, target)           => write!(f, "{} {}", m, target),
            TwoRegister(m, a, b)      => write!(f, "{} {}, {}", m, a, b),
            Shift(m, a, count)        => write!(f, "{} {}, {}", m, a, count),
            Immediate(m, a, value) |
            Memory(m, a, value)       => write!(f, "{} {}, {}", m, a, value),
            OneOperand(m, a)          => write!(f, "{} {}", m, a),
            NoOperand(m)              => write!(f, "{}", m),
        }
    }
}

impl Instruction {
    pub fn mnemonic(&self) -> Mnemonic {
        use Instruction::*;
        match self {
            Jump(m, _) | TwoRegister(m, _, _) | Shift(m, _, _) |
            Immediate(m, _, _) | Memory(m, _, _) | OneOperand(m, _) |
            NoOperand(m) => *m,
        }
    }

    /// Number of memory words this instruction occupies.
    pub fn size(&self) -> usize {
        self.mnemonic().format().size()
    }

    /// Assembles the instruction into one or two words. Symbolic operands
    /// are left pending for the resolver.
    pub fn assemble(&self) -> Vec<Word> {
        use Instruction::*;
        let prefix = self.mnemonic().prefix();
        match self {
            Jump(m, target) => vec![Word::address(m.opcode(), target)],
            TwoRegister(_, a, b) => vec![Word::Resolved(prefix | a.to_u16() << 4 | b.to_u16())],
            Shift(_, a, count) => vec![Word::Resolved(prefix | a.to_u16() << 4 | literal::mask(*count, 4))],
            Immediate(_, a, value) => vec![
                Word::Resolved(prefix | a.to_u16()),
                match value {
                    Operand::Literal(n) => Word::Resolved(literal::mask(*n, 16)),
                    Operand::Symbol(_) => Word::address(0, value),
                },
            ],
            Memory(_, a, target) => vec![
                Word::Resolved(prefix | a.to_u16()),
                Word::address(0, target),
            ],
            OneOperand(_, a) => vec![Word::Resolved(prefix | a.to_u16())],
            NoOperand(_) => vec![Word::Resolved(prefix)],
        }
    }

    /// Recovers an instruction from the resolved words at the start of
    /// `words`. Operands come back as literals: addresses unsigned, immediate
    /// values sign-extended from 16 bits.
    pub fn decode(words: &[u16]) -> Option<Instruction> {
        use std::convert::TryFrom;
        let first = *words.first()?;
        let mnemonic = Mnemonic::decode(first)?;
        let high = Register::try_from(first >> 4 & 0xF).ok()?;
        let low = Register::try_from(first & 0xF).ok()?;

        Some(match mnemonic.format() {
            Format::Jump => Instruction::Jump(mnemonic, Operand::Literal(i64::from(first & 0x0FFF))),
            Format::TwoRegister => Instruction::TwoRegister(mnemonic, high, low),
            Format::Shift => Instruction::Shift(mnemonic, high, i64::from(first & 0xF)),
            Format::Immediate => {
                let value = *words.get(1)? as i16;
                Instruction::Immediate(mnemonic, low, Operand::Literal(i64::from(value)))
            }
            Format::Memory => {
                let address = *words.get(1)? & 0x0FFF;
                Instruction::Memory(mnemonic, low, Operand::Literal(i64::from(address)))
            }
            Format::OneOperand => Instruction::OneOperand(mnemonic, low),
            Format::NoOperand => Instruction::NoOperand(mnemonic),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    fn resolved(words: Vec<Word>) -> Vec<u16> {
        words.into_iter().map(|w| match w {
            Word::Resolved(bits) => bits,
            Word::Pending { .. } => panic!("unexpected pending word {}", w),
        }).collect()
    }

    #[test]
    fn test_mnemonic_from_str() {
        for m in Mnemonic::ALL.iter() {
            assert_eq!(m.to_string().parse::<Mnemonic>(), Ok(*m));
        }
        assert!("jmp".parse::<Mnemonic>().is_err());
        assert!("Finish:".parse::<Mnemonic>().is_err());
    }

    #[test]
    fn test_opcodes_are_prefix_free() {
        for m in Mnemonic::ALL.iter() {
            assert_eq!(Mnemonic::decode(m.prefix()), Some(*m), "{}", m);
        }
        assert_eq!(Mnemonic::decode(0x0000), None);
        // 111111111101 is unassigned.
        assert_eq!(Mnemonic::decode(0b1111_1111_1101_0000), None);
    }

    #[test]
    fn test_register_from_str() {
        for i in 0..=15u16 {
            assert_eq!(format!("R{}", i).parse::<Register>(), Register::try_from(i));
        }
        assert!("R16".parse::<Register>().is_err());
        assert!("r1".parse::<Register>().is_err());
        assert!("R".parse::<Register>().is_err());
        assert!("R01".parse::<Register>().is_err());
        assert!("R1,".parse::<Register>().is_err());
    }

    #[test]
    fn test_assemble() {
        use Mnemonic::*;
        use Register::*;

        let ins = Instruction::Jump(JMP, Operand::Literal(5));
        assert_eq!(resolved(ins.assemble()), vec![0b0001_0000_0000_0101]);

        let ins = Instruction::TwoRegister(ADD, R1, R2);
        assert_eq!(resolved(ins.assemble()), vec![0b1111_0000_0001_0010]);

        let ins = Instruction::Shift(SHL, R3, 17);
        assert_eq!(resolved(ins.assemble()), vec![0b1111_0111_0011_0001]);

        let ins = Instruction::Immediate(LOADI, R0, Operand::Literal(-1));
        assert_eq!(resolved(ins.assemble()), vec![0b1111_1111_0100_0000, 0xFFFF]);

        let ins = Instruction::Memory(STORE, R0, Operand::Literal(2048));
        assert_eq!(resolved(ins.assemble()), vec![0b1111_1111_0111_0000, 0b0000_1000_0000_0000]);

        let ins = Instruction::OneOperand(PRINT, R15);
        assert_eq!(resolved(ins.assemble()), vec![0b1111_1111_1110_1111]);

        let ins = Instruction::NoOperand(HALT);
        assert_eq!(resolved(ins.assemble()), vec![HALT_WORD]);
    }

    #[test]
    fn test_assemble_pending() {
        let ins = Instruction::Jump(Mnemonic::JNZ, Operand::Symbol("Loop".to_owned()));
        let words = ins.assemble();
        assert_eq!(words, vec![Word::Pending { prefix: 0b0011, symbol: "Loop".to_owned() }]);
        assert_eq!(words[0].to_string(), "0011Loop");

        let ins = Instruction::Memory(Mnemonic::LOADM, Register::R4, Operand::Symbol("X".to_owned()));
        let words = ins.assemble();
        assert_eq!(words[0], Word::Resolved(0b1111_1111_0101_0100));
        assert_eq!(words[1], Word::Pending { prefix: 0, symbol: "X".to_owned() });

        let ins = Instruction::Immediate(Mnemonic::LOADI, Register::R1, Operand::Symbol("X".to_owned()));
        assert_eq!(ins.assemble(), vec![
            Word::Resolved(0xFF41),
            Word::Pending { prefix: 0, symbol: "X".to_owned() },
        ]);
    }

    #[test]
    fn test_decode_round_trip() {
        use Mnemonic::*;
        use Register::*;

        let cases = vec![
            Instruction::Jump(JGT, Operand::Literal(1234)),
            Instruction::TwoRegister(SWAP, R9, R10),
            Instruction::Shift(ROR, R7, 15),
            Instruction::Immediate(SUBI, R2, Operand::Literal(-300)),
            Instruction::Immediate(ADDI, R2, Operand::Literal(32767)),
            Instruction::Memory(LOADA, R11, Operand::Literal(3071)),
            Instruction::OneOperand(NEG, R14),
            Instruction::NoOperand(PUSHPC),
            Instruction::NoOperand(HALT),
        ];

        for ins in cases {
            let words = resolved(ins.assemble());
            assert_eq!(words.len(), ins.size());
            assert_eq!(Instruction::decode(&words), Some(ins.clone()), "{}", ins);
        }
    }

    #[test]
    fn test_decode_truncated() {
        let words = resolved(Instruction::Immediate(Mnemonic::LOADI, Register::R0, Operand::Literal(5)).assemble());
        assert_eq!(Instruction::decode(&words[..1]), None);
        assert_eq!(Instruction::decode(&[]), None);
    }

    #[test]
    fn test_display() {
        let ins = Instruction::Memory(Mnemonic::STORE, Register::R0, Operand::Symbol("X".to_owned()));
        assert_eq!(ins.to_string(), "STORE R0, X");
        assert_eq!(Instruction::NoOperand(Mnemonic::NOP).to_string(), "NOP");
    }
}
