//! Simulation statistics collection and reporting.

use serde::Serialize;
use std::time::Instant;

/// Counters accumulated over a run.
#[derive(Serialize)]
pub struct SimStats {
    #[serde(skip_serializing)]
    start_time: Instant,

    pub cycles: u64,
    pub instructions_retired: u64,
    pub reset_cycles: u64,

    pub stalls_icache: u64,
    pub stalls_dcache_busy: u64,
    pub stalls_dcache_miss: u64,
    pub stalls_interlock: u64,

    pub icache_fills: u64,
    pub dcache_fills: u64,

    pub external_reads: u64,
    pub external_writes: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            reset_cycles: 0,
            stalls_icache: 0,
            stalls_dcache_busy: 0,
            stalls_dcache_miss: 0,
            stalls_interlock: 0,
            icache_fills: 0,
            dcache_fills: 0,
            external_reads: 0,
            external_writes: 0,
        }
    }
}

impl SimStats {
    pub fn print(&self) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let busy = self.cycles.saturating_sub(self.reset_cycles);
        println!("Simulation Statistics");
        println!("---------------------");
        println!("Cycles:                 {}", self.cycles);
        println!("  In reset:             {}", self.reset_cycles);
        println!("Instructions retired:   {}", self.instructions_retired);
        if busy > 0 {
            println!(
                "IPC:                    {:.3}",
                self.instructions_retired as f64 / busy as f64
            );
        }
        println!("Stalls:");
        println!("  ICache busy:          {}", self.stalls_icache);
        println!("  DCache busy:          {}", self.stalls_dcache_busy);
        println!("  DCache miss:          {}", self.stalls_dcache_miss);
        println!("  Load interlock:       {}", self.stalls_interlock);
        println!("Cache fills:            {} I / {} D", self.icache_fills, self.dcache_fills);
        println!(
            "External requests:      {} reads / {} writes",
            self.external_reads, self.external_writes
        );
        println!("Wall time:              {elapsed:.3}s");
    }

    /// Counters as a JSON object, for machine consumers.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
