//! Instruction word layouts and encoding constants.
//!
//! Instructions are fixed 32-bit words in one of three layouts:
//!
//! * **R-type**: `op[31:26] rs[25:21] rt[20:16] rd[15:11] shift[10:6] func[5:0]`
//! * **I-type**: `op[31:26] rs[25:21] rt[20:16] imm[15:0]`
//! * **J-type**: `op[31:26] target[25:0]`

/// Primary opcode values (bits 31:26).
pub mod opcodes {
    pub const SPECIAL: u32 = 0x00;
    pub const REGIMM: u32 = 0x01;
    pub const J: u32 = 0x02;
    pub const BEQ: u32 = 0x04;
    pub const BNE: u32 = 0x05;
    pub const ADDI: u32 = 0x08;
    pub const ADDIU: u32 = 0x09;
    pub const SLTI: u32 = 0x0a;
    pub const SLTIU: u32 = 0x0b;
    pub const ANDI: u32 = 0x0c;
    pub const ORI: u32 = 0x0d;
    pub const XORI: u32 = 0x0e;
    pub const LUI: u32 = 0x0f;
    pub const LB: u32 = 0x20;
    pub const LH: u32 = 0x21;
    pub const LW: u32 = 0x23;
    pub const LBU: u32 = 0x24;
    pub const LHU: u32 = 0x25;
    pub const LWU: u32 = 0x27;
    pub const SB: u32 = 0x28;
    pub const SH: u32 = 0x29;
    pub const SW: u32 = 0x2b;
    pub const LD: u32 = 0x37;
    pub const SD: u32 = 0x3f;
}

/// Function field values for SPECIAL (op 0) instructions (bits 5:0).
pub mod funct {
    pub const SLL: u32 = 0x00;
    pub const SRL: u32 = 0x02;
    pub const SRA: u32 = 0x03;
    pub const SLLV: u32 = 0x04;
    pub const SRLV: u32 = 0x06;
    pub const SRAV: u32 = 0x07;
    pub const JR: u32 = 0x08;
    pub const DSLLV: u32 = 0x14;
    pub const DSRLV: u32 = 0x16;
    pub const DSRAV: u32 = 0x17;
    pub const ADD: u32 = 0x20;
    pub const ADDU: u32 = 0x21;
    pub const SUB: u32 = 0x22;
    pub const SUBU: u32 = 0x23;
    pub const AND: u32 = 0x24;
    pub const OR: u32 = 0x25;
    pub const XOR: u32 = 0x26;
    pub const NOR: u32 = 0x27;
    pub const SLT: u32 = 0x2a;
    pub const SLTU: u32 = 0x2b;
    pub const DSLL: u32 = 0x38;
    pub const DSRL: u32 = 0x3a;
    pub const DSRA: u32 = 0x3b;
}

/// `rt` field values for REGIMM (op 1) branch instructions.
pub mod regimm {
    pub const BLTZ: u32 = 0x00;
    pub const BGEZ: u32 = 0x01;
}

/// A fetched 32-bit instruction word.
///
/// Field accessors interpret the raw word under the R/I/J layouts; the
/// word itself is immutable once constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction(u32);

impl Instruction {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    /// Primary opcode, bits 31:26.
    pub fn op(self) -> u32 {
        self.0 >> 26
    }

    pub fn rs(self) -> u8 {
        ((self.0 >> 21) & 0x1f) as u8
    }

    pub fn rt(self) -> u8 {
        ((self.0 >> 16) & 0x1f) as u8
    }

    pub fn rd(self) -> u8 {
        ((self.0 >> 11) & 0x1f) as u8
    }

    /// Shift amount field, bits 10:6 (R-type).
    pub fn shamt(self) -> u32 {
        (self.0 >> 6) & 0x1f
    }

    /// Function field, bits 5:0 (R-type).
    pub fn funct(self) -> u32 {
        self.0 & 0x3f
    }

    /// 16-bit immediate, zero-extended.
    pub fn imm16(self) -> u64 {
        u64::from(self.0 & 0xffff)
    }

    /// 16-bit immediate, sign-extended to 64 bits.
    pub fn simm16(self) -> u64 {
        (self.0 & 0xffff) as u16 as i16 as i64 as u64
    }

    /// 26-bit jump target field (J-type).
    pub fn target26(self) -> u64 {
        u64::from(self.0 & 0x03ff_ffff)
    }
}
