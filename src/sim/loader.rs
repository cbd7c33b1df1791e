//! Program image loading.
//!
//! A program is a flat big-endian image of 32-bit instruction words. It
//! is delivered to the core as instruction cache fills: one doubleword
//! per line, with the lower-addressed word in the low half (the cache's
//! fill convention).

use crate::core::units::ICache;

/// Reads a flat binary image from disk.
pub fn load_image(path: &str) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("failed to read {path}: {e}"))
}

/// Packs an image based at `base` into `(index, tag, doubleword)` fill
/// triples. The image length is padded to a doubleword boundary with
/// zero words.
pub fn image_fills(image: &[u8], base: u64) -> Vec<(u64, u32, u64)> {
    let mut words: Vec<u32> = image
        .chunks(4)
        .map(|c| {
            let mut w = [0u8; 4];
            w[..c.len()].copy_from_slice(c);
            u32::from_be_bytes(w)
        })
        .collect();
    if words.len() % 2 != 0 {
        words.push(0);
    }

    words
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let addr = base.wrapping_add(i as u64 * 8);
            let data = (u64::from(pair[1]) << 32) | u64::from(pair[0]);
            (ICache::line_index(addr), ICache::addr_tag(addr), data)
        })
        .collect()
}
