use std::convert::TryInto;

/// Compute the log-base-two of the next power of two: 8 -> 3, 9 -> 4.
///
pub fn ceil_log2(x: usize) -> usize {
    let mut n = 0;
    while 1 << n < x {
        n += 1
    }
    n
}

/// Encode a float as its little-endian bytes.
///
pub fn f64_to_bytes(x: f64) -> Vec<u8> {
    x.to_le_bytes().to_vec()
}

/// Decode a float from the first eight little-endian bytes of a message. A
/// short message decodes to NaN, which every extremum reduction ignores.
///
pub fn f64_from_bytes(bytes: &[u8]) -> f64 {
    bytes
        .get(..8)
        .and_then(|b| b.try_into().ok())
        .map(f64::from_le_bytes)
        .unwrap_or(f64::NAN)
}
