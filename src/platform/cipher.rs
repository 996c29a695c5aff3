//! Juicycodes payload deobfuscation
//!
//! The embed player ships its configuration as `_juicycodes("...")`. The
//! payload is URL-safe base64 whose decoded bytes come from a ten symbol
//! alphabet, each symbol standing for one decimal digit. Groups of four
//! digits, offset by a salt encoded in the last three payload characters,
//! give the code points of the player script.

use crate::error::HkError;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use tracing::debug;

/// Digit alphabet, indexed by digit value
pub const SYMBOL_ALPHABET: [u8; 10] = [b'`', b'%', b'-', b'+', b'*', b'$', b'!', b'_', b'^', b'='];

const SALT_LEN: usize = 3;
const CHUNK_LEN: usize = 4;

/// Recover the player script hidden in a juicycodes payload
pub fn deobfuscate(payload: &str) -> Result<String, HkError> {
    let split = payload
        .char_indices()
        .rev()
        .nth(SALT_LEN - 1)
        .map(|(idx, _)| idx)
        .ok_or_else(|| {
            HkError::SaltDecode(format!(
                "payload has {} characters, need at least {}",
                payload.chars().count(),
                SALT_LEN
            ))
        })?;
    let (body, salt_chars) = payload.split_at(split);

    let salt = decode_salt(salt_chars)?;
    let symbols = decode_body(body)?;
    let digits = symbols_to_digits(&symbols)?;
    debug!(
        "Payload decoded to {} digits with salt {}",
        digits.len(),
        salt
    );

    digits
        .chunks(CHUNK_LEN)
        .map(|chunk| chunk_to_char(chunk, salt))
        .collect()
}

/// Derive the salt from the trailing payload characters
///
/// Each character contributes `code point - 100` as decimal digits; the
/// concatenation is read as one integer, so `def` gives `012` = 12.
pub fn decode_salt(salt_chars: &str) -> Result<u64, HkError> {
    let mut digits = String::new();

    for c in salt_chars.chars() {
        let part = (c as u32).checked_sub(100).ok_or_else(|| {
            HkError::SaltDecode(format!(
                "salt character {:?} (U+{:04X}) is below U+0064",
                c, c as u32
            ))
        })?;
        digits.push_str(&part.to_string());
    }

    if digits.is_empty() {
        return Err(HkError::SaltDecode("empty salt".to_string()));
    }

    digits
        .parse::<u64>()
        .map_err(|e| HkError::SaltDecode(format!("salt '{}' is not a number: {}", digits, e)))
}

/// Restore the standard base64 alphabet and padding, then decode
fn decode_body(body: &str) -> Result<Vec<u8>, HkError> {
    let mut normalized: String = body
        .chars()
        .map(|c| match c {
            '_' => '+',
            '-' => '/',
            c => c,
        })
        .collect();

    let remainder = normalized.len() % 4;
    if remainder != 0 {
        normalized.extend(std::iter::repeat('=').take(4 - remainder));
    }

    BASE64_STANDARD
        .decode(normalized.as_bytes())
        .map_err(|e| HkError::Decode(format!("payload is not valid base64: {}", e)))
}

/// Map every decoded byte to its digit value
fn symbols_to_digits(symbols: &[u8]) -> Result<Vec<u8>, HkError> {
    symbols
        .iter()
        .enumerate()
        .map(|(position, &byte)| {
            SYMBOL_ALPHABET
                .iter()
                .position(|&s| s == byte)
                .map(|digit| digit as u8)
                .ok_or(HkError::Alphabet { byte, position })
        })
        .collect()
}

/// Turn up to four digits into one output character
fn chunk_to_char(chunk: &[u8], salt: u64) -> Result<char, HkError> {
    let value = chunk
        .iter()
        .fold(0u64, |acc, &digit| acc * 10 + u64::from(digit));

    (value % 1000)
        .checked_sub(salt)
        .and_then(|code| u32::try_from(code).ok())
        .and_then(char::from_u32)
        .ok_or(HkError::Range { value, salt })
}
