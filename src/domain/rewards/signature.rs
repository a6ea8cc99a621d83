//! Encoding helpers shared by the signature verifiers.
//!
//! Ad networks deliver signatures in several encodings: AdMob sends an
//! ASN.1 DER ECDSA signature in URL-safe base64, AppLovin and IronSource send
//! hex digests. These helpers turn them into bytes the crypto crates accept.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use subtle::ConstantTimeEq;

use super::errors::RewardError;

/// Width of one P-256 scalar in bytes.
const SCALAR_LEN: usize = 32;

/// Fixed-width IEEE P1363 signature: `r || s`.
pub type P1363Signature = [u8; 2 * SCALAR_LEN];

/// Decodes URL-safe base64, tolerating missing padding.
///
/// `-` and `_` are translated to `+` and `/` and the input is padded with
/// `=` to a multiple of four before standard decoding.
pub fn decode_url_safe_base64(input: &str) -> Result<Vec<u8>, RewardError> {
    let mut normalized: String = input
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }

    STANDARD
        .decode(normalized.as_bytes())
        .map_err(|e| RewardError::invalid_input(format!("Signature is not valid base64: {}", e)))
}

/// Converts a DER `SEQUENCE { INTEGER r, INTEGER s }` into P1363 `r || s`.
///
/// Each integer is right-aligned and zero-padded to 32 bytes. A 33-byte
/// integer carries a leading 0x00 sign byte, which is stripped.
pub fn der_to_p1363(der: &[u8]) -> Result<P1363Signature, RewardError> {
    let mut reader = DerReader::new(der);

    reader.expect_tag(0x30)?;
    let seq_len = reader.read_length()?;
    if seq_len != reader.remaining() {
        return Err(malformed("sequence length does not match input"));
    }

    let r = reader.read_integer()?;
    let s = reader.read_integer()?;
    if reader.remaining() != 0 {
        return Err(malformed("trailing bytes after signature"));
    }

    let mut out = [0u8; 2 * SCALAR_LEN];
    write_scalar(&mut out[..SCALAR_LEN], r)?;
    write_scalar(&mut out[SCALAR_LEN..], s)?;
    Ok(out)
}

/// Compares a computed digest with a hex signature in constant time.
///
/// Hex case is ignored. Invalid hex never matches.
pub fn hex_digest_matches(expected: &[u8], supplied_hex: &str) -> bool {
    match hex::decode(supplied_hex.trim()) {
        Ok(supplied) => constant_time_compare(expected, &supplied),
        Err(_) => false,
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

fn malformed(reason: &str) -> RewardError {
    RewardError::invalid_input(format!("Malformed DER signature: {}", reason))
}

fn write_scalar(dest: &mut [u8], value: &[u8]) -> Result<(), RewardError> {
    let value = match value.len() {
        0 => return Err(malformed("empty integer")),
        n if n == SCALAR_LEN + 1 => {
            if value[0] != 0x00 {
                return Err(malformed("integer exceeds 32 bytes"));
            }
            &value[1..]
        }
        n if n > SCALAR_LEN + 1 => return Err(malformed("integer exceeds 32 bytes")),
        _ => value,
    };

    let offset = dest.len() - value.len();
    dest[..offset].fill(0);
    dest[offset..].copy_from_slice(value);
    Ok(())
}

/// Minimal cursor over DER bytes; only what an ECDSA signature needs.
struct DerReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn read_byte(&mut self) -> Result<u8, RewardError> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| malformed("unexpected end of input"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect_tag(&mut self, tag: u8) -> Result<(), RewardError> {
        let actual = self.read_byte()?;
        if actual != tag {
            return Err(malformed(&format!(
                "expected tag 0x{:02x}, found 0x{:02x}",
                tag, actual
            )));
        }
        Ok(())
    }

    // Signatures are at most ~72 bytes, so only short form and the
    // single-byte long form (0x81) are accepted.
    fn read_length(&mut self) -> Result<usize, RewardError> {
        match self.read_byte()? {
            len if len < 0x80 => Ok(len as usize),
            0x81 => {
                let len = self.read_byte()?;
                if len < 0x80 {
                    return Err(malformed("non-minimal length encoding"));
                }
                Ok(len as usize)
            }
            _ => Err(malformed("unsupported length encoding")),
        }
    }

    fn read_integer(&mut self) -> Result<&'a [u8], RewardError> {
        self.expect_tag(0x02)?;
        let len = self.read_length()?;
        if len > self.remaining() {
            return Err(malformed("integer length exceeds input"));
        }
        let value = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(value)
    }
}
