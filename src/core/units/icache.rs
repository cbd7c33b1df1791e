//! Direct-mapped instruction cache.
//!
//! 2048 lines of one 64-bit doubleword each (16 KiB). The line index is
//! taken from address bits 13:3 and the tag from bits 31:12. Reads are
//! combinational: a fetch returns the selected 32-bit word together with
//! the line's stored tag and valid bit, and the controller decides whether
//! the line actually matches the fetch address. Fills are the only write
//! path and install a line unconditionally.

/// Number of lines.
pub const ICACHE_LINES: usize = 2048;

const INDEX_MASK: u64 = (ICACHE_LINES as u64) - 1;
const TAG_MASK: u64 = 0xfffff;

#[derive(Clone, Copy, Default)]
struct ILine {
    tag: u32,
    valid: bool,
    data: u64,
}

/// Instruction fetch result: the addressed word plus the tag state the
/// controller needs for its hit check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub word: u32,
    pub tag: u32,
    pub valid: bool,
}

/// Direct-mapped, externally fillable instruction cache.
pub struct ICache {
    lines: Vec<ILine>,
}

impl ICache {
    pub fn new() -> Self {
        Self {
            lines: vec![ILine::default(); ICACHE_LINES],
        }
    }

    /// Line index for a fetch address.
    pub fn line_index(addr: u64) -> u64 {
        (addr >> 3) & INDEX_MASK
    }

    /// Tag bits of a fetch address.
    pub fn addr_tag(addr: u64) -> u32 {
        ((addr >> 12) & TAG_MASK) as u32
    }

    /// Installs a doubleword, marking the line valid. The low 32 bits hold
    /// the word at the lower address.
    pub fn fill(&mut self, index: u64, tag: u32, data: u64) {
        self.lines[(index & INDEX_MASK) as usize] = ILine {
            tag: tag & TAG_MASK as u32,
            valid: true,
            data,
        };
    }

    /// Combinational read. Address bit 2 selects the word within the line.
    /// Stale lines are reported as-is; the caller must compare `tag`
    /// against [`addr_tag`] and treat a mismatch as a miss, never as data.
    ///
    /// [`addr_tag`]: ICache::addr_tag
    pub fn read(&self, addr: u64) -> FetchResponse {
        let line = &self.lines[Self::line_index(addr) as usize];
        let word = if addr & 0x4 == 0 {
            line.data as u32
        } else {
            (line.data >> 32) as u32
        };
        FetchResponse {
            word,
            tag: line.tag,
            valid: line.valid,
        }
    }
}

impl Default for ICache {
    fn default() -> Self {
        Self::new()
    }
}
