//! Decode: control signals and the opcode table.
//!
//! [`decode`] turns a raw instruction word into the control signals the
//! later stages consume. Unrecognized encodings decode to `None` and flow
//! through the pipeline as a bubble with no architectural effect.

use crate::common::RegId;
use crate::core::units::ExMode;
use crate::isa::{funct, opcodes, regimm, Instruction};

/// Source of the first execute operand (the shift amount for shifts).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpASrc {
    #[default]
    Rs,
    /// R-type shift amount field.
    Shamt,
    Zero,
}

/// Source of the second execute operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpBSrc {
    #[default]
    Rt,
    /// The immediate resolved at decode (sign/zero extension and the
    /// `lui` shift already applied).
    Imm,
}

/// Control-flow class, resolved in the decode stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BranchKind {
    #[default]
    None,
    /// `beq`: taken when rs == rt.
    Eq,
    /// `bne`: taken when rs != rt.
    Ne,
    /// `bgez`: taken when rs >= 0 (signed).
    Gez,
    /// `bltz`: taken when rs < 0 (signed).
    Ltz,
    /// `j`: absolute within the 256 MiB region of the delay slot.
    Jump,
    /// `jr`: target is the rs operand.
    JumpReg,
}

/// Memory access width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemWidth {
    #[default]
    Nop,
    Byte,
    Half,
    Word,
    Double,
}

impl MemWidth {
    /// Width in bytes; zero for non-memory slots.
    pub fn bytes(self) -> u8 {
        match self {
            Self::Nop => 0,
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
            Self::Double => 8,
        }
    }
}

/// Control signals carried with an instruction from decode onward.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlSignals {
    pub alu: ExMode,
    pub a_src: OpASrc,
    pub b_src: OpBSrc,
    pub branch: BranchKind,
    pub mem_read: bool,
    pub mem_write: bool,
    pub width: MemWidth,
    pub signed_load: bool,
}

/// A decoded instruction: control signals plus the operand bookkeeping
/// the decode stage needs (destination, resolved immediate, which source
/// registers are actually read).
#[derive(Clone, Copy, Debug)]
pub struct DecodedInst {
    pub ctrl: ControlSignals,
    pub dest: Option<RegId>,
    pub imm: u64,
    pub reads_rs: bool,
    pub reads_rt: bool,
}

fn rt_dest(inst: Instruction) -> Option<RegId> {
    Some(RegId::Integer(inst.rt()))
}

fn rd_dest(inst: Instruction) -> Option<RegId> {
    Some(RegId::Integer(inst.rd()))
}

fn special(inst: Instruction) -> Option<DecodedInst> {
    let mut d = DecodedInst {
        ctrl: ControlSignals::default(),
        dest: rd_dest(inst),
        imm: 0,
        reads_rs: true,
        reads_rt: true,
    };
    match inst.funct() {
        // Immediate-amount shifts read only rt; the amount comes from the
        // shift field.
        funct::SLL | funct::SRL | funct::SRA | funct::DSLL | funct::DSRL | funct::DSRA => {
            d.ctrl.a_src = OpASrc::Shamt;
            d.reads_rs = false;
            d.ctrl.alu = match inst.funct() {
                funct::SLL => ExMode::ShiftLeft,
                funct::SRL => ExMode::ShiftRight,
                funct::SRA => ExMode::ShiftRightArith,
                funct::DSLL => ExMode::ShiftLeft64,
                funct::DSRL => ExMode::ShiftRight64,
                _ => ExMode::ShiftRightArith64,
            };
        }
        funct::SLLV => d.ctrl.alu = ExMode::ShiftLeft,
        funct::SRLV => d.ctrl.alu = ExMode::ShiftRight,
        funct::SRAV => d.ctrl.alu = ExMode::ShiftRightArith,
        funct::DSLLV => d.ctrl.alu = ExMode::ShiftLeft64,
        funct::DSRLV => d.ctrl.alu = ExMode::ShiftRight64,
        funct::DSRAV => d.ctrl.alu = ExMode::ShiftRightArith64,
        funct::JR => {
            d.ctrl.branch = BranchKind::JumpReg;
            d.dest = None;
            d.reads_rt = false;
        }
        // add/sub do not trap on overflow; the trapping and non-trapping
        // encodings share the wrapping datapath.
        funct::ADD | funct::ADDU => d.ctrl.alu = ExMode::Add64,
        funct::SUB | funct::SUBU => d.ctrl.alu = ExMode::Sub64,
        funct::AND => d.ctrl.alu = ExMode::And64,
        funct::OR => d.ctrl.alu = ExMode::Or64,
        funct::XOR => d.ctrl.alu = ExMode::Xor64,
        funct::NOR => d.ctrl.alu = ExMode::Nor64,
        funct::SLT => d.ctrl.alu = ExMode::SetLess,
        funct::SLTU => d.ctrl.alu = ExMode::SetLessUnsigned,
        _ => return None,
    }
    Some(d)
}

fn load(inst: Instruction, width: MemWidth, signed: bool) -> DecodedInst {
    DecodedInst {
        ctrl: ControlSignals {
            alu: ExMode::Add64,
            b_src: OpBSrc::Imm,
            mem_read: true,
            width,
            signed_load: signed,
            ..Default::default()
        },
        dest: rt_dest(inst),
        imm: inst.simm16(),
        reads_rs: true,
        reads_rt: false,
    }
}

fn store(inst: Instruction, width: MemWidth) -> DecodedInst {
    DecodedInst {
        ctrl: ControlSignals {
            alu: ExMode::Add64,
            b_src: OpBSrc::Imm,
            mem_write: true,
            width,
            ..Default::default()
        },
        dest: None,
        imm: inst.simm16(),
        reads_rs: true,
        reads_rt: true,
    }
}

fn imm_alu(inst: Instruction, alu: ExMode, imm: u64) -> DecodedInst {
    DecodedInst {
        ctrl: ControlSignals {
            alu,
            b_src: OpBSrc::Imm,
            ..Default::default()
        },
        dest: rt_dest(inst),
        imm,
        reads_rs: true,
        reads_rt: false,
    }
}

fn branch(kind: BranchKind, imm: u64, reads_rt: bool) -> DecodedInst {
    DecodedInst {
        ctrl: ControlSignals {
            branch: kind,
            ..Default::default()
        },
        dest: None,
        imm,
        reads_rs: kind != BranchKind::Jump,
        reads_rt,
    }
}

/// Decodes one instruction word. `None` means the encoding is not part of
/// the implemented set and the slot becomes a bubble.
pub fn decode(inst: Instruction) -> Option<DecodedInst> {
    match inst.op() {
        opcodes::SPECIAL => special(inst),
        opcodes::REGIMM => match inst.rt() as u32 {
            regimm::BLTZ => Some(branch(BranchKind::Ltz, inst.simm16(), false)),
            regimm::BGEZ => Some(branch(BranchKind::Gez, inst.simm16(), false)),
            _ => None,
        },
        opcodes::J => Some(branch(BranchKind::Jump, inst.target26(), false)),
        opcodes::BEQ => Some(branch(BranchKind::Eq, inst.simm16(), true)),
        opcodes::BNE => Some(branch(BranchKind::Ne, inst.simm16(), true)),
        opcodes::ADDI | opcodes::ADDIU => Some(imm_alu(inst, ExMode::Add64, inst.simm16())),
        opcodes::SLTI => Some(imm_alu(inst, ExMode::SetLess, inst.simm16())),
        opcodes::SLTIU => Some(imm_alu(inst, ExMode::SetLessUnsigned, inst.simm16())),
        opcodes::ANDI => Some(imm_alu(inst, ExMode::And64, inst.imm16())),
        opcodes::ORI => Some(imm_alu(inst, ExMode::Or64, inst.imm16())),
        opcodes::XORI => Some(imm_alu(inst, ExMode::Xor64, inst.imm16())),
        opcodes::LUI => {
            // The 32-bit value imm << 16, sign-extended to 64 bits.
            let imm = ((inst.imm16() as u32) << 16) as i32 as i64 as u64;
            let mut d = imm_alu(inst, ExMode::Add64, imm);
            d.ctrl.a_src = OpASrc::Zero;
            d.reads_rs = false;
            Some(d)
        }
        opcodes::LB => Some(load(inst, MemWidth::Byte, true)),
        opcodes::LH => Some(load(inst, MemWidth::Half, true)),
        opcodes::LW => Some(load(inst, MemWidth::Word, true)),
        opcodes::LBU => Some(load(inst, MemWidth::Byte, false)),
        opcodes::LHU => Some(load(inst, MemWidth::Half, false)),
        opcodes::LWU => Some(load(inst, MemWidth::Word, false)),
        opcodes::LD => Some(load(inst, MemWidth::Double, true)),
        opcodes::SB => Some(store(inst, MemWidth::Byte)),
        opcodes::SH => Some(store(inst, MemWidth::Half)),
        opcodes::SW => Some(store(inst, MemWidth::Word)),
        opcodes::SD => Some(store(inst, MemWidth::Double)),
        _ => None,
    }
}
