// base32.rs
// RFC 4648 Base32 codec (uppercase alphabet, `=` padding).
//
// Hand-rolled on purpose: secrets round-trip through this codec, so the crate
// owns the bit-level behavior instead of delegating it.

use crate::error::{ErrorKind, TotpError};
use crate::messages;

/// Base32 character set (RFC 4648).
const ENCODE_MAP: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Pre-computed decode lookup table; -1 marks characters outside the alphabet.
const DECODE_MAP: [i8; 256] = build_decode_map();

const BITS_PER_BYTE: u32 = 8;
const BITS_PER_BASE32: u32 = 5;

/// Standard Base32 block size for padding calculations.
const BASE32_BLOCK_SIZE: usize = 8;

const fn build_decode_map() -> [i8; 256] {
    let mut map = [-1i8; 256];
    let mut i = 0;
    while i < ENCODE_MAP.len() {
        map[ENCODE_MAP[i] as usize] = i as i8;
        i += 1;
    }
    map
}

/// Encodes binary data to uppercase Base32, padded with `=` to a multiple of
/// 8 characters. Empty input yields an empty string with no padding.
pub fn encode_upper(data: &[u8]) -> String {
    if data.is_empty() {
        return String::new();
    }

    let mut output = String::with_capacity(data.len().div_ceil(5) * 8);
    let mut buffer: u32 = 0;
    let mut buffer_length: u32 = 0;

    for &byte in data {
        buffer = (buffer << BITS_PER_BYTE) | u32::from(byte);
        buffer_length += BITS_PER_BYTE;

        // Drain complete 5-bit groups from the top of the buffer
        while buffer_length >= BITS_PER_BASE32 {
            buffer_length -= BITS_PER_BASE32;
            output.push(ENCODE_MAP[((buffer >> buffer_length) & 0x1f) as usize] as char);
        }
    }

    // Final partial group, padded on the right with zero bits
    if buffer_length > 0 {
        output.push(ENCODE_MAP[((buffer << (BITS_PER_BASE32 - buffer_length)) & 0x1f) as usize] as char);
    }

    let pad_length = (BASE32_BLOCK_SIZE - output.len() % BASE32_BLOCK_SIZE) % BASE32_BLOCK_SIZE;
    for _ in 0..pad_length {
        output.push('=');
    }

    output
}

/// Decodes an uppercase Base32 string back to bytes. Trailing `=` padding is
/// stripped before decoding; a trailing incomplete byte is discarded.
///
/// Fails when any character outside `A-Z2-7` is found, naming the character.
pub fn decode_upper(data: &str) -> Result<Vec<u8>, TotpError> {
    let data = data.trim_end_matches('=');
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut output = Vec::with_capacity(data.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut buffer_length: u32 = 0;

    for ch in data.chars() {
        let value = if ch.is_ascii() { DECODE_MAP[ch as usize] } else { -1 };
        if value < 0 {
            return Err(TotpError::with_args(
                ErrorKind::InvalidBase32Character,
                messages::get("encoding.invalid_base32_char", &[&ch]),
            ));
        }

        buffer = (buffer << BITS_PER_BASE32) | value as u32;
        buffer_length += BITS_PER_BASE32;

        if buffer_length >= BITS_PER_BYTE {
            buffer_length -= BITS_PER_BYTE;
            output.push(((buffer >> buffer_length) & 0xff) as u8);
        }
    }

    Ok(output)
}
