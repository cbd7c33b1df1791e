//! Direct-mapped data cache.
//!
//! 256 lines of two 64-bit doublewords each (4 KiB). The doubleword index
//! is taken from address bits 11:3 (the line is its upper 8 bits) and the
//! tag from bits 31:12. Within a line the doublewords are big-endian
//! ordered: the lower-addressed (even-index) doubleword occupies the high
//! half of a 128-bit fill value.
//!
//! The cache runs a two-phase cycle. The data phase comes first: a write
//! applies a full merged doubleword to the row opened in the previous
//! cycle, sets its dirty bit, and makes the cache busy for exactly the
//! following cycle. The address phase then registers the row for the next
//! cycle's response. A fill always wins over reads and writes in the same
//! cycle. Per cycle the owner calls, in order: [`fill`] (if pending),
//! [`response`], [`write_phase`], [`open`]. The standalone [`cycle`]
//! wrapper applies the same ordering for harness-driven use.
//!
//! [`fill`]: DCache::fill
//! [`response`]: DCache::response
//! [`write_phase`]: DCache::write_phase
//! [`open`]: DCache::open
//! [`cycle`]: DCache::cycle

/// Number of lines.
pub const DCACHE_LINES: usize = 256;

const DWORD_INDEX_MASK: u64 = (DCACHE_LINES as u64) * 2 - 1;
const TAG_MASK: u64 = 0xfffff;

/// One cache line: tag state plus two doublewords, `data[0]` being the
/// lower-addressed one.
#[derive(Clone, Copy, Default)]
pub struct DLine {
    pub tag: u32,
    pub valid: bool,
    pub dirty: bool,
    pub data: [u64; 2],
}

/// Data-phase response for the currently open row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataResponse {
    pub data: u64,
    pub tag: u32,
    pub valid: bool,
    pub dirty: bool,
    /// True on the cycle after a write acceptance; accesses must not be
    /// serviced while set.
    pub busy: bool,
}

/// Harness-side input bundle for [`DCache::cycle`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DCacheInput {
    pub index: u64,
    pub read_en: bool,
    pub write: Option<u64>,
    pub fill: Option<(u64, u32, u128)>,
}

/// Direct-mapped, externally fillable data cache with dirty tracking.
pub struct DCache {
    lines: Vec<DLine>,
    open: usize,
    busy: bool,
}

impl DCache {
    pub fn new() -> Self {
        Self {
            lines: vec![DLine::default(); DCACHE_LINES],
            open: 0,
            busy: false,
        }
    }

    /// Doubleword index for a data address.
    pub fn dword_index(addr: u64) -> u64 {
        (addr >> 3) & DWORD_INDEX_MASK
    }

    /// Tag bits of a data address.
    pub fn addr_tag(addr: u64) -> u32 {
        ((addr >> 12) & TAG_MASK) as u32
    }

    /// Installs a full 128-bit line with dirty cleared. The high 64 bits
    /// land in the lower-addressed doubleword.
    pub fn fill(&mut self, line: u64, tag: u32, data: u128) {
        self.lines[(line as usize) % DCACHE_LINES] = DLine {
            tag: tag & TAG_MASK as u32,
            valid: true,
            dirty: false,
            data: [(data >> 64) as u64, data as u64],
        };
    }

    /// Read of the currently open row, including the busy window left by
    /// the previous cycle's write.
    pub fn response(&self) -> DataResponse {
        let line = &self.lines[self.open >> 1];
        DataResponse {
            data: line.data[self.open & 1],
            tag: line.tag,
            valid: line.valid,
            dirty: line.dirty,
            busy: self.busy,
        }
    }

    /// Data phase: applies `write` (a full merged doubleword) to the open
    /// row and opens the one-cycle busy window. A write is accepted only
    /// when the line is valid and the cache is not already busy; an
    /// unaccepted write is not serviced and the caller retries after
    /// seeing [`DataResponse::busy`]. Must be called once per cycle even
    /// with no write pending, so the busy window closes.
    pub fn write_phase(&mut self, write: Option<u64>) {
        let was_busy = self.busy;
        self.busy = false;
        if let Some(data) = write {
            let line = &mut self.lines[self.open >> 1];
            if !was_busy && line.valid {
                line.data[self.open & 1] = data;
                line.dirty = true;
                self.busy = true;
            }
        }
    }

    /// Address phase: registers the doubleword row serviced next cycle.
    pub fn open(&mut self, index: u64) {
        self.open = (index & DWORD_INDEX_MASK) as usize;
    }

    /// One full harness-driven cycle: fill, data phase, address phase,
    /// then the response as sampled after the clock edge. A fill displaces
    /// any write presented in the same cycle.
    pub fn cycle(&mut self, input: DCacheInput) -> DataResponse {
        if let Some((line, tag, data)) = input.fill {
            self.fill(line, tag, data);
            self.busy = false;
        } else {
            self.write_phase(input.write);
        }
        if input.read_en {
            self.open(input.index);
        }
        self.response()
    }

    /// Line inspection for harnesses and state dumps.
    pub fn line(&self, line: usize) -> &DLine {
        &self.lines[line % DCACHE_LINES]
    }
}

impl Default for DCache {
    fn default() -> Self {
        Self::new()
    }
}
