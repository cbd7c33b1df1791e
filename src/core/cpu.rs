//! The assembled core: pipeline controller plus both caches.
//!
//! [`Core::step`] is one atomic clock edge. Fills from the external
//! collaborator are consumed from the input strictly before anything else
//! runs, the instruction cache answers the current fetch combinationally,
//! and the data cache runs its data phase/address phase around the
//! pipeline's step in read-old/commit-new order.

use crate::config::Config;
use crate::core::pipeline::Pipeline;
use crate::core::status::{ExceptionReason, ExternalRequest, PipelineStatus, StallReason};
use crate::core::units::{DCache, ICache};
use crate::stats::SimStats;

/// Per-cycle inputs from the outside world.
///
/// A fill of `None` is the explicit "no fill this cycle" value. Fills are
/// the only writes that bypass the controller and always land between
/// cycles, never mid-cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoreInput {
    pub reset: bool,
    /// `(line index, tag, doubleword)` for the instruction cache.
    pub icache_fill: Option<(u64, u32, u64)>,
    /// `(line index, tag, 128-bit line)` for the data cache.
    pub dcache_fill: Option<(u64, u32, u128)>,
}

/// Per-cycle observables.
#[derive(Clone, Copy, Debug)]
pub struct CoreOutput {
    pub status: PipelineStatus,
    /// Fetch address used this cycle.
    pub pc: u64,
    /// True when an instruction retired this cycle.
    pub retired: bool,
    /// At most one external bus request per cycle; `None` when no
    /// uncached access happened.
    pub external: Option<ExternalRequest>,
}

/// The processor core.
pub struct Core {
    pipe: Pipeline,
    icache: ICache,
    dcache: DCache,
    stats: SimStats,
    trace: bool,
}

impl Core {
    pub fn new(config: &Config) -> Self {
        let mut pipe = Pipeline::new(config.general.reset_vector_val());
        pipe.set_trace(config.general.trace);
        Self {
            pipe,
            icache: ICache::new(),
            dcache: DCache::new(),
            stats: SimStats::default(),
            trace: config.general.trace,
        }
    }

    /// One clock edge.
    pub fn step(&mut self, input: &CoreInput) -> CoreOutput {
        self.stats.cycles += 1;

        if let Some((index, tag, data)) = input.icache_fill {
            self.icache.fill(index, tag, data);
            self.stats.icache_fills += 1;
        }
        if let Some((line, tag, data)) = input.dcache_fill {
            self.dcache.fill(line, tag, data);
            self.stats.dcache_fills += 1;
        }

        if input.reset {
            self.pipe.reset();
            // The busy window still decays while held in reset.
            self.dcache.write_phase(None);
            self.stats.reset_cycles += 1;
            return CoreOutput {
                status: PipelineStatus::ExceptionWb(ExceptionReason::Reset),
                pc: self.pipe.pc(),
                retired: false,
                external: None,
            };
        }

        let fetch = self.icache.read(self.pipe.pc());
        let dmem = self.dcache.response();
        let out = self.pipe.step(&fetch, &dmem);

        self.dcache.write_phase(out.write.map(|w| w.data));
        if let Some(index) = out.d_index {
            self.dcache.open(index);
        }

        match out.status {
            PipelineStatus::Ok => {
                if out.retired {
                    self.stats.instructions_retired += 1;
                }
            }
            PipelineStatus::Stall(StallReason::InstructionCacheBusy) => {
                self.stats.stalls_icache += 1;
            }
            PipelineStatus::Stall(StallReason::DataCacheBusy) => self.stats.stalls_dcache_busy += 1,
            PipelineStatus::Stall(StallReason::DataCacheMiss) => self.stats.stalls_dcache_miss += 1,
            PipelineStatus::Stall(StallReason::LoadInterlock) => {
                // The rest of the machine advances under an interlock, so
                // a retire can coincide with the stall.
                if out.retired {
                    self.stats.instructions_retired += 1;
                }
                self.stats.stalls_interlock += 1;
            }
            PipelineStatus::ExceptionWb(_) => {}
        }
        if let Some(req) = &out.external {
            if req.write {
                self.stats.external_writes += 1;
            } else {
                self.stats.external_reads += 1;
            }
            if self.trace {
                eprintln!(
                    "BUS {} addr={:#x} data={:#x} size={}",
                    if req.write { "write" } else { "read" },
                    req.addr,
                    req.data,
                    req.size
                );
            }
        }

        CoreOutput {
            status: out.status,
            pc: out.pc,
            retired: out.retired,
            external: out.external,
        }
    }

    pub fn pipe(&self) -> &Pipeline {
        &self.pipe
    }

    pub fn dcache(&self) -> &DCache {
        &self.dcache
    }

    pub fn icache(&self) -> &ICache {
        &self.icache
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }
}
