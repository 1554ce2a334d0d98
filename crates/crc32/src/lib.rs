//! CRC-32 (IEEE 802.3) implementation.
//!
//! This is the checksum used by PNG chunks, gzip trailers and ZIP entries:
//! reflected polynomial `0xEDB88320`, register seeded with `0xFFFFFFFF` and
//! the result XORed with `0xFFFFFFFF`.

/// Reflected form of the IEEE 802.3 polynomial `0x04C11DB7`.
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

const INITIAL: u32 = 0xFFFF_FFFF;
const FINAL_XOR: u32 = 0xFFFF_FFFF;

/// Byte-indexed lookup table, built at compile time.
static TABLE: [u32; 256] = make_table();

const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Feed `data` into a raw (non-inverted) CRC register.
#[inline]
fn update_raw(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        crc = TABLE[((crc ^ byte as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc
}

/// Compute the CRC-32 of a byte slice in one call.
#[inline]
pub fn checksum(data: &[u8]) -> u32 {
    update_raw(INITIAL, data) ^ FINAL_XOR
}

/// Incremental CRC-32.
///
/// Lets callers checksum logically concatenated data (a PNG chunk type followed
/// by its payload) without copying it into one buffer.
#[derive(Clone, Copy, Debug)]
pub struct Hasher {
    state: u32,
}

impl Hasher {
    /// Create a hasher with the standard initial register.
    #[inline]
    pub fn new() -> Self {
        Self { state: INITIAL }
    }

    /// Feed more bytes.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.state = update_raw(self.state, data);
    }

    /// Checksum of everything fed so far. The hasher can keep accepting data.
    #[inline]
    pub fn finalize(&self) -> u32 {
        self.state ^ FINAL_XOR
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}
