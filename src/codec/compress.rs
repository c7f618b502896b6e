//! Compression boundary
//!
//! LZ4 block format with the uncompressed size prepended as a little-endian
//! `u32`, so decompression needs no out-of-band length.

use crate::error::{CacheError, Result};

/// Compress a payload
pub fn compress(data: &[u8]) -> Vec<u8> {
    lz4_flex::compress_prepend_size(data)
}

/// Decompress a payload produced by [`compress`]
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    lz4_flex::decompress_size_prepended(data)
        .map_err(|e| CacheError::Compression(e.to_string()))
}
