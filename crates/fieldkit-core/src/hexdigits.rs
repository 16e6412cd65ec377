//! Hex digit pair decoding for the UUID parser.

/// Marker for bytes that are not ASCII hex digits.
const INVALID: u8 = 0xff;

/// Value of every byte as a hexadecimal digit, or [`INVALID`].
const HEX_VALUES: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
  let mut table = [INVALID; 256];
  let mut i = 0;
  while i < 10 {
    table[b'0' as usize + i] = i as u8;
    i += 1;
  }
  let mut i = 0;
  while i < 6 {
    table[b'a' as usize + i] = 10 + i as u8;
    table[b'A' as usize + i] = 10 + i as u8;
    i += 1;
  }
  table
}

/// Decode the first two bytes of `pair` as one hex-encoded byte.
///
/// Returns `None` if `pair` is shorter than two bytes or either byte is not a
/// hex digit.
pub(crate) fn decode_pair(pair: &[u8]) -> Option<u8> {
  let (&hi, &lo) = (pair.first()?, pair.get(1)?);
  let (hi, lo) = (HEX_VALUES[hi as usize], HEX_VALUES[lo as usize]);
  if hi == INVALID || lo == INVALID {
    return None;
  }
  Some((hi << 4) | lo)
}
