use serde::Deserialize;

const DEFAULT_RESET_VECTOR: u64 = 0xffff_ffff_bfc0_0000;
const DEFAULT_MAX_CYCLES: u64 = 100_000;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    /// Per-cycle trace output on stderr.
    #[serde(default)]
    pub trace: bool,

    /// Fetch address the core starts from, as a hex string.
    #[serde(default = "default_reset_vector")]
    pub reset_vector: String,
}

impl GeneralConfig {
    pub fn reset_vector_val(&self) -> u64 {
        parse_hex(&self.reset_vector, DEFAULT_RESET_VECTOR)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            reset_vector: default_reset_vector(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SimConfig {
    /// Cycle budget for a run.
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u64,

    /// Pre-fill every data cache line for the low 4 KiB window so stores
    /// and loads there hit without an external fill driver.
    #[serde(default = "default_warm_dcache")]
    pub warm_dcache: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            warm_dcache: true,
        }
    }
}

fn default_reset_vector() -> String {
    format!("{DEFAULT_RESET_VECTOR:#x}")
}

fn default_max_cycles() -> u64 {
    DEFAULT_MAX_CYCLES
}

fn default_warm_dcache() -> bool {
    true
}

fn parse_hex(s: &str, fallback: u64) -> u64 {
    let s = s.trim_start_matches("0x");
    u64::from_str_radix(s, 16).unwrap_or(fallback)
}
