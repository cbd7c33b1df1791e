//! Shared test helpers: instruction encoders and a pipeline harness that
//! stands in for both caches.
#![allow(dead_code)]

use std::collections::HashMap;

use mips64_pipeline::config::Config;
use mips64_pipeline::core::pipeline::{Pipeline, PipelineOutput};
use mips64_pipeline::core::units::dcache::DCACHE_LINES;
use mips64_pipeline::core::units::{DCache, DataResponse, FetchResponse, ICache};
use mips64_pipeline::core::{Core, CoreInput};

pub const RESET_VECTOR: u64 = 0xffff_ffff_bfc0_0000;

/// Instruction cache fill triples for a program based at the reset
/// vector, lower-addressed word in the low half.
pub fn icache_fills(prog: &[u32]) -> Vec<(u64, u32, u64)> {
    let mut words = prog.to_vec();
    if words.len() % 2 != 0 {
        words.push(nop(0));
    }
    words
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let addr = RESET_VECTOR.wrapping_add(i as u64 * 8);
            let data = (u64::from(pair[1]) << 32) | u64::from(pair[0]);
            (ICache::line_index(addr), ICache::addr_tag(addr), data)
        })
        .collect()
}

/// Builds a core, delivers the program (and optionally a zeroed data
/// cache for the low 4 KiB) while reset is held, and leaves it one step
/// from running.
pub fn boot_core(prog: &[u32], warm_dcache: bool) -> Core {
    let mut core = Core::new(&Config::default());
    for fill in icache_fills(prog) {
        let _ = core.step(&CoreInput {
            reset: true,
            icache_fill: Some(fill),
            dcache_fill: None,
        });
    }
    if warm_dcache {
        for line in 0..DCACHE_LINES as u64 {
            let _ = core.step(&CoreInput {
                reset: true,
                dcache_fill: Some((line, 0, 0)),
                ..Default::default()
            });
        }
    }
    let _ = core.step(&CoreInput {
        reset: true,
        ..Default::default()
    });
    core
}

pub fn rtype(op: u32, rs: u32, rt: u32, rd: u32, sh: u32, func: u32) -> u32 {
    assert!(func <= 0x3f);
    (op << 26) | (rs << 21) | (rt << 16) | (rd << 11) | (sh << 6) | func
}

pub fn itype(op: u32, rs: u32, rt: u32, imm: u32) -> u32 {
    assert!(imm <= 0xffff);
    (op << 26) | (rs << 21) | (rt << 16) | imm
}

pub fn jtype(op: u32, target: u32) -> u32 {
    (op << 26) | (target & 0x03ff_ffff)
}

/// `addiu $zero, $zero, num`: the conventional filler word.
pub fn nop(num: u32) -> u32 {
    itype(0x09, 0, 0, num)
}

/// `bgez $zero, offset`, branch always. `offset` is in bytes, relative
/// to the delay slot.
pub fn balways(offset: i32) -> u32 {
    itype(0x01, 0, 1, ((offset >> 2) & 0xffff) as u32)
}

pub fn lui(rt: u32, imm: u32) -> u32 {
    itype(0x0f, 0, rt, imm)
}

pub fn ori(rt: u32, rs: u32, imm: u32) -> u32 {
    itype(0x0d, rs, rt, imm)
}

pub fn addiu(rt: u32, rs: u32, imm: u32) -> u32 {
    itype(0x09, rs, rt, imm)
}

pub fn jr(rs: u32) -> u32 {
    rtype(0, rs, 0, 0, 0, 0x08)
}

pub fn lw(rt: u32, base: u32, off: u32) -> u32 {
    itype(0x23, base, rt, off)
}

pub fn ld(rt: u32, base: u32, off: u32) -> u32 {
    itype(0x37, base, rt, off)
}

pub fn lbu(rt: u32, base: u32, off: u32) -> u32 {
    itype(0x24, base, rt, off)
}

pub fn sw(rt: u32, base: u32, off: u32) -> u32 {
    itype(0x2b, base, rt, off)
}

pub fn sb(rt: u32, base: u32, off: u32) -> u32 {
    itype(0x28, base, rt, off)
}

pub fn sd(rt: u32, base: u32, off: u32) -> u32 {
    itype(0x3f, base, rt, off)
}

/// A recorded data cache write: the doubleword row it landed in, the
/// byte mask, and the full merged doubleword.
#[derive(Clone, Copy, Debug)]
pub struct RecordedWrite {
    pub row: u64,
    pub bit_mask: u64,
    pub data: u64,
}

/// Drives a bare [`Pipeline`] the way the cache-less test fixture drives
/// the hardware: instructions are served from a program image by fetch
/// address, and the data side is an always-ready backing store that
/// honors the address-phase/data-phase protocol with one cycle between
/// them.
pub struct PipeHarness {
    pub pipe: Pipeline,
    prog: Vec<u32>,
    /// Backing rows by doubleword index. Rows never touched before read
    /// back as a recognizable filler pattern.
    pub mem: HashMap<u64, u64>,
    pending: Option<u64>,
    pub writes: Vec<RecordedWrite>,
    /// Serve the program modulo its length instead of padding with nops
    /// (for loop-shaped programs).
    pub wrap: bool,
}

pub const ROW_FILLER: u64 = 0x55aa_55aa_55aa_55aa;

impl PipeHarness {
    pub fn new(prog: Vec<u32>) -> Self {
        Self {
            pipe: Pipeline::new(RESET_VECTOR),
            prog,
            mem: HashMap::new(),
            pending: None,
            writes: Vec::new(),
            wrap: false,
        }
    }

    /// Preloads one backing row (doubleword index, value).
    pub fn set_row(&mut self, row: u64, value: u64) {
        self.mem.insert(row, value);
    }

    fn fetch_word(&self, pc: u64) -> u32 {
        let index = (pc.wrapping_sub(RESET_VECTOR) / 4) as usize;
        if self.wrap {
            self.prog[index % self.prog.len()]
        } else {
            self.prog.get(index).copied().unwrap_or_else(|| nop(0))
        }
    }

    /// One clock: serve the fetch, answer the pending data-phase row,
    /// record any write.
    pub fn step(&mut self) -> PipelineOutput {
        let pc = self.pipe.pc();
        let fetch = FetchResponse {
            word: self.fetch_word(pc),
            tag: ICache::addr_tag(pc),
            valid: true,
        };
        let dmem = match self.pending {
            Some(row) => DataResponse {
                data: self.mem.get(&row).copied().unwrap_or(ROW_FILLER),
                tag: DCache::addr_tag(row << 3),
                valid: true,
                dirty: false,
                busy: false,
            },
            None => DataResponse::default(),
        };

        let out = self.pipe.step(&fetch, &dmem);

        if let Some(write) = out.write {
            let row = self.pending.expect("write with no open row");
            self.writes.push(RecordedWrite {
                row,
                bit_mask: write.mask.bit_mask(),
                data: write.data,
            });
            self.mem.insert(row, write.data);
        }
        self.pending = out.d_index;
        out
    }

    /// Runs `n` cycles and returns their outputs.
    pub fn run(&mut self, n: usize) -> Vec<PipelineOutput> {
        (0..n).map(|_| self.step()).collect()
    }
}
