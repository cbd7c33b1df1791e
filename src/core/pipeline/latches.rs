//! Pipeline latch structures for inter-stage communication.
//!
//! Each latch carries one instruction's state between two stages; a stage
//! slot holds `Option<latch>` and `None` is a bubble. Latches are
//! recreated every cycle from the previous cycle's values, so no stage
//! ever observes a same-cycle update.

use crate::common::RegId;
use crate::core::pipeline::signals::ControlSignals;
use crate::isa::Instruction;

/// IF/ID latch (Fetch to Decode).
#[derive(Clone, Copy, Debug)]
pub struct IfId {
    /// Address the instruction was fetched from.
    pub pc: u64,
    /// The raw fetched word.
    pub inst: Instruction,
}

/// ID/EX latch (Decode to Execute).
///
/// Operands are fully resolved at decode: `a` and `b` already reflect the
/// bypass network, immediates, and shift-amount selection.
#[derive(Clone, Copy, Debug)]
pub struct IdEx {
    pub pc: u64,
    /// Register written at writeback, if any.
    pub dest: Option<RegId>,
    pub ctrl: ControlSignals,
    /// First execute operand (shift amount for shifts).
    pub a: u64,
    /// Second execute operand.
    pub b: u64,
    /// The rt value carried for stores.
    pub store_val: u64,
}

/// EX/MEM latch (Execute to Memory).
#[derive(Clone, Copy, Debug)]
pub struct ExMem {
    pub pc: u64,
    pub dest: Option<RegId>,
    pub ctrl: ControlSignals,
    /// ALU result; the effective address for memory operations.
    pub alu: u64,
    pub store_val: u64,
}

/// MEM/WB latch (Memory to Writeback).
#[derive(Clone, Copy, Debug)]
pub struct MemWb {
    pub pc: u64,
    /// `None` for instructions that retire without a register result
    /// (stores, branches).
    pub dest: Option<RegId>,
    pub value: u64,
}
