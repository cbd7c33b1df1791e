//! The pipeline controller.
//!
//! Five logical stages (Fetch, Decode, Execute, Memory, Writeback)
//! advance together once per [`step`]. The controller is driven with the
//! instruction cache's response for the current fetch address and the
//! data cache's response for the row it opened in the previous cycle, and
//! produces the per-cycle [`PipelineStatus`] plus its memory-side
//! requests. Both caches therefore stay external to this component; the
//! [`Core`](crate::core::Core) wires the real ones in, and test harnesses
//! can stand in for either.
//!
//! Stage functions run writeback-side first within a `step`, so every
//! stage reads the previous cycle's latches and no same-cycle update is
//! ever observed.
//!
//! [`step`]: Pipeline::step

/// Data hazard detection and operand forwarding.
pub mod hazards;

/// Inter-stage latch structures.
pub mod latches;

/// Control signals and the decode table.
pub mod signals;

use crate::common::{MemMask, RegId, RegisterFile};
use crate::core::status::{ExternalRequest, PipelineStatus, StallReason};
use crate::core::units::{Alu, DataResponse, FetchResponse, ICache};
use crate::isa::Instruction;
use latches::{ExMem, IdEx, IfId, MemWb};
use signals::{BranchKind, DecodedInst, OpASrc, OpBSrc};

/// Returns true for addresses outside data cache coverage (the
/// `0xa000_0000` segment, identified by bits 31:29 of the sign-extended
/// address). Stores there leave the core as external bus requests.
pub fn is_uncached(addr: u64) -> bool {
    (addr as u32) >> 29 == 0b101
}

/// A data-phase write: the full merged doubleword for the open row, with
/// the mask describing which bytes the instruction actually owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowWrite {
    pub mask: MemMask,
    pub data: u64,
}

/// Everything the controller drives outward in one cycle.
#[derive(Clone, Copy, Debug)]
pub struct PipelineOutput {
    /// Fetch address used this cycle.
    pub pc: u64,
    pub status: PipelineStatus,
    /// True when an instruction left writeback this cycle.
    pub retired: bool,
    /// Address phase: doubleword index to open for the next cycle.
    pub d_index: Option<u64>,
    /// Data phase: write for the currently open row.
    pub write: Option<RowWrite>,
    /// External bus request for uncached accesses.
    pub external: Option<ExternalRequest>,
}

enum MemOutcome {
    Advance {
        wb: Option<MemWb>,
        write: Option<RowWrite>,
        external: Option<ExternalRequest>,
    },
    Stall {
        reason: StallReason,
        index: u64,
    },
}

/// The five-stage pipeline state machine.
pub struct Pipeline {
    pc: u64,
    reset_vector: u64,
    if_id: Option<IfId>,
    id_ex: Option<IdEx>,
    ex_mem: Option<ExMem>,
    mem_wb: Option<MemWb>,
    regs: RegisterFile,
    trace: bool,
}

impl Pipeline {
    pub fn new(reset_vector: u64) -> Self {
        Self {
            pc: reset_vector,
            reset_vector,
            if_id: None,
            id_ex: None,
            ex_mem: None,
            mem_wb: None,
            regs: RegisterFile::new(),
            trace: false,
        }
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Current fetch address.
    pub fn pc(&self) -> u64 {
        self.pc
    }

    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// Drops all in-flight instructions and returns fetch to the reset
    /// vector. Register and cache contents are not touched; commits are
    /// suppressed simply because the stages empty out.
    pub fn reset(&mut self) {
        self.pc = self.reset_vector;
        self.if_id = None;
        self.id_ex = None;
        self.ex_mem = None;
        self.mem_wb = None;
    }

    /// Advances the machine by one clock edge.
    ///
    /// `fetch` is the instruction cache response for [`pc`], `dmem` the
    /// data cache response for the row opened by the previous cycle's
    /// `d_index`. On any stall every latch holds and the output carries
    /// only the retry address phase; the blocked operation is re-executed
    /// verbatim on subsequent cycles until it succeeds.
    ///
    /// [`pc`]: Pipeline::pc
    pub fn step(&mut self, fetch: &FetchResponse, dmem: &DataResponse) -> PipelineOutput {
        let pc = self.pc;

        // Memory stage data phase. A blocked access freezes the whole
        // machine and keeps its own address phase asserted.
        let (mem_wb_new, write, external) = match self.mem_stage(dmem) {
            MemOutcome::Stall { reason, index } => {
                if self.trace {
                    eprintln!("MEM stall {reason:?} index={index:#x}");
                }
                return self.frozen(pc, PipelineStatus::Stall(reason), Some(index));
            }
            MemOutcome::Advance {
                wb,
                write,
                external,
            } => (wb, write, external),
        };

        // Fetch hit check: a stale line freezes everything, including the
        // just-computed data phase, which is discarded and retried.
        if !fetch.valid || fetch.tag != ICache::addr_tag(pc) {
            return self.frozen(
                pc,
                PipelineStatus::Stall(StallReason::InstructionCacheBusy),
                self.mem_retry_index(),
            );
        }

        // Execute stage, and the forwarding sources for decode. A load in
        // execute has no value to forward; that case is the interlock.
        let ex_result = self.id_ex.as_ref().map(|id| ExMem {
            pc: id.pc,
            dest: id.dest,
            ctrl: id.ctrl,
            alu: Alu::execute(id.ctrl.alu, id.a, id.b),
            store_val: id.store_val,
        });
        let ex_fwd = ex_result.as_ref().and_then(|e| {
            if e.ctrl.mem_read {
                None
            } else {
                e.dest.map(|d| (d, e.alu))
            }
        });
        let ex_d_index = ex_result.as_ref().and_then(Self::address_phase);
        let mem_fwd = mem_wb_new.as_ref().and_then(|m| m.dest.map(|d| (d, m.value)));
        let wb_fwd = self.mem_wb.as_ref().and_then(|m| m.dest.map(|d| (d, m.value)));
        let retired = self.mem_wb.is_some();

        // Load-use interlock: decode holds one cycle while the load
        // proceeds to its data phase.
        if hazards::load_use(&self.id_ex, &self.if_id) {
            let _ = self
                .regs
                .cycle(wb_fwd, RegId::Integer(0), RegId::Integer(0));
            self.mem_wb = mem_wb_new;
            self.ex_mem = ex_result;
            self.id_ex = None;
            return PipelineOutput {
                pc,
                status: PipelineStatus::Stall(StallReason::LoadInterlock),
                retired,
                d_index: ex_d_index,
                write,
                external,
            };
        }

        // Decode: register reads through the bypass network, branch
        // resolution, operand selection. The register file write port
        // commits the writeback occupant in the same call; its reads
        // observe the pre-write values, which the wb forwarding source
        // papers over.
        let (rs, rt) = match &self.if_id {
            Some(f) => (RegId::Integer(f.inst.rs()), RegId::Integer(f.inst.rt())),
            None => (RegId::Integer(0), RegId::Integer(0)),
        };
        let (rs_base, rt_base) = self.regs.cycle(wb_fwd, rs, rt);

        let mut redirect = None;
        let new_id_ex = self.if_id.as_ref().and_then(|f| {
            let Some(d) = signals::decode(f.inst) else {
                if self.trace {
                    eprintln!("ID  pc={:#x} unrecognized word {:#010x}", f.pc, f.inst.raw());
                }
                return None;
            };
            let rs_val = hazards::forward(rs, rs_base, ex_fwd, mem_fwd, wb_fwd);
            let rt_val = hazards::forward(rt, rt_base, ex_fwd, mem_fwd, wb_fwd);
            redirect = Self::branch_target(f, &d, rs_val, rt_val);
            let a = match d.ctrl.a_src {
                OpASrc::Rs => rs_val,
                OpASrc::Shamt => u64::from(f.inst.shamt()),
                OpASrc::Zero => 0,
            };
            let b = match d.ctrl.b_src {
                OpBSrc::Rt => rt_val,
                OpBSrc::Imm => d.imm,
            };
            Some(IdEx {
                pc: f.pc,
                dest: d.dest,
                ctrl: d.ctrl,
                a,
                b,
                store_val: rt_val,
            })
        });

        // Fetch latches the response; the redirect from a branch in
        // decode lands on the fetch after the delay slot.
        self.mem_wb = mem_wb_new;
        self.ex_mem = ex_result;
        self.id_ex = new_id_ex;
        self.if_id = Some(IfId {
            pc,
            inst: Instruction::new(fetch.word),
        });
        self.pc = redirect.unwrap_or_else(|| pc.wrapping_add(4));

        if self.trace {
            if let Some(target) = redirect {
                eprintln!("ID  pc={pc:#x} redirect -> {target:#x}");
            }
        }

        PipelineOutput {
            pc,
            status: PipelineStatus::Ok,
            retired,
            d_index: ex_d_index,
            write,
            external,
        }
    }

    /// Data phase for the memory-stage occupant.
    fn mem_stage(&self, dmem: &DataResponse) -> MemOutcome {
        let Some(ex) = &self.ex_mem else {
            return MemOutcome::Advance {
                wb: None,
                write: None,
                external: None,
            };
        };

        if !ex.ctrl.mem_read && !ex.ctrl.mem_write {
            return MemOutcome::Advance {
                wb: Some(MemWb {
                    pc: ex.pc,
                    dest: ex.dest,
                    value: ex.alu,
                }),
                write: None,
                external: None,
            };
        }

        let addr = ex.alu;
        let bytes = ex.ctrl.width.bytes();
        debug_assert!(bytes > 0, "memory op without a width");

        if is_uncached(addr) {
            // Fire-and-forget: no completion signal exists, so an
            // uncached load retires with a zero value.
            let payload = if bytes == 8 {
                u64::MAX
            } else {
                (1u64 << (u32::from(bytes) * 8)) - 1
            };
            let external = Some(ExternalRequest {
                addr,
                data: if ex.ctrl.mem_write {
                    ex.store_val & payload
                } else {
                    0
                },
                size: bytes,
                write: ex.ctrl.mem_write,
            });
            return MemOutcome::Advance {
                wb: Some(MemWb {
                    pc: ex.pc,
                    dest: if ex.ctrl.mem_read { ex.dest } else { None },
                    value: 0,
                }),
                write: None,
                external,
            };
        }

        let index = addr >> 3;
        if dmem.busy {
            return MemOutcome::Stall {
                reason: StallReason::DataCacheBusy,
                index,
            };
        }
        if !dmem.valid || dmem.tag != crate::core::units::DCache::addr_tag(addr) {
            return MemOutcome::Stall {
                reason: StallReason::DataCacheMiss,
                index,
            };
        }

        let mask = MemMask::new(bytes - 1, (addr & 7) as u8);
        if ex.ctrl.mem_write {
            MemOutcome::Advance {
                wb: Some(MemWb {
                    pc: ex.pc,
                    dest: None,
                    value: 0,
                }),
                write: Some(RowWrite {
                    mask,
                    data: mask.insert(dmem.data, ex.store_val),
                }),
                external: None,
            }
        } else {
            let value = if ex.ctrl.signed_load {
                mask.extract_signed(dmem.data)
            } else {
                mask.extract(dmem.data)
            };
            MemOutcome::Advance {
                wb: Some(MemWb {
                    pc: ex.pc,
                    dest: ex.dest,
                    value,
                }),
                write: None,
                external: None,
            }
        }
    }

    /// Address phase an execute-stage occupant presents for next cycle.
    fn address_phase(e: &ExMem) -> Option<u64> {
        if (e.ctrl.mem_read || e.ctrl.mem_write) && !is_uncached(e.alu) {
            Some(e.alu >> 3)
        } else {
            None
        }
    }

    /// Address phase to keep asserted while the machine is frozen, so the
    /// memory-stage occupant's data phase retries.
    fn mem_retry_index(&self) -> Option<u64> {
        self.ex_mem.as_ref().and_then(Self::address_phase)
    }

    fn frozen(&self, pc: u64, status: PipelineStatus, d_index: Option<u64>) -> PipelineOutput {
        PipelineOutput {
            pc,
            status,
            retired: false,
            d_index,
            write: None,
            external: None,
        }
    }

    /// Resolves control flow for the decode-stage instruction. Branch
    /// targets are relative to the delay slot; `j` splices its 26-bit
    /// field into the delay slot's 256 MiB region.
    fn branch_target(f: &IfId, d: &DecodedInst, rs_val: u64, rt_val: u64) -> Option<u64> {
        let relative = || {
            f.pc.wrapping_add(4)
                .wrapping_add(d.imm.wrapping_shl(2))
        };
        match d.ctrl.branch {
            BranchKind::None => None,
            BranchKind::Eq => (rs_val == rt_val).then(relative),
            BranchKind::Ne => (rs_val != rt_val).then(relative),
            BranchKind::Gez => ((rs_val as i64) >= 0).then(relative),
            BranchKind::Ltz => ((rs_val as i64) < 0).then(relative),
            BranchKind::Jump => {
                Some((f.pc.wrapping_add(4) & !0x0fff_ffff) | (d.imm << 2))
            }
            BranchKind::JumpReg => Some(rs_val),
        }
    }
}
