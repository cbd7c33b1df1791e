//! Functional units: arithmetic/shift unit and the two caches.

/// Arithmetic and shift unit.
pub mod alu;

/// Direct-mapped data cache.
pub mod dcache;

/// Direct-mapped instruction cache.
pub mod icache;

pub use alu::{Alu, ExMode};
pub use dcache::{DCache, DCacheInput, DataResponse};
pub use icache::{FetchResponse, ICache};
