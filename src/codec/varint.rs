//! LEB128 variable-length integers.
//!
//! Unsigned values are written 7 bits at a time, least significant group
//! first, with the high bit of each byte set while more bytes follow. Signed
//! values are zig-zag mapped first so that small magnitudes stay short.
//!
//! See also: <https://en.wikipedia.org/wiki/LEB128>

use crate::error::{Error, Result};

/// Maximum encoded length of a `u64`.
pub const MAX_LEN: usize = 10;

pub fn write(buf: &mut Vec<u8>, mut x: u64) {
    while x >= 0x80 {
        buf.push((x as u8) | 0x80);
        x >>= 7;
    }
    buf.push(x as u8);
}

/// Number of bytes `write` would produce for `x`.
pub fn encoded_len(x: u64) -> usize {
    let bits = 64 - (x | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Reads a varint from the front of `input`, advancing it.
pub fn read(input: &mut &[u8]) -> Result<u64> {
    let bytes = *input;
    let mut x = 0u64;
    let mut s = 0u32;
    for (i, &b) in bytes.iter().take(MAX_LEN).enumerate() {
        let low = u64::from(b & 0x7F);
        // the tenth byte may only carry the single remaining bit
        if s == 63 && low > 1 {
            return Err(Error::malformed("varint overflows 64 bits"));
        }

        x |= low << s;
        s += 7;

        if b < 0x80 {
            *input = &bytes[i + 1..];
            return Ok(x);
        }
    }

    if bytes.len() >= MAX_LEN {
        Err(Error::malformed("varint longer than 10 bytes"))
    } else {
        Err(Error::malformed("varint truncated"))
    }
}

pub fn zigzag(x: i64) -> u64 {
    ((x << 1) ^ (x >> 63)) as u64
}

pub fn unzigzag(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}
