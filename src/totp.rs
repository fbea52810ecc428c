// totp.rs
// TOTP engine (RFC 6238): configuration, secret generation, HMAC-based code
// derivation with dynamic truncation, discrepancy-window verification,
// replay-safe single-use verification, and secret auditing.

use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

use crate::base32;
use crate::error::{ErrorKind, TotpError};
use crate::messages;

pub const SECRET_BYTES: usize = 20;         // 160 bits (RFC 4226 recommended minimum)
pub const STRONG_SECRET_BYTES: usize = 20;  // below this a secret is flagged weak

/// Hash algorithm used for the HMAC step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl Algorithm {
    /// Lowercase name as accepted by [`TotpOptions`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

impl FromStr for Algorithm {
    type Err = TotpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(TotpError::new(ErrorKind::UnsupportedAlgorithm)),
        }
    }
}

/// Partial configuration; unset fields leave the engine unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TotpOptions {
    pub algorithm: Option<String>,
    pub digits: Option<u32>,
    pub period: Option<u64>,
    pub max_discrepancy: Option<i64>,
}

/// Diagnostic report from [`Totp::audit_secret`].
#[derive(Debug, Clone, Serialize)]
pub struct SecretAudit {
    pub length_bytes: usize,
    pub is_strong: bool,
    pub warnings: Vec<String>,
}

/// TOTP engine. A pure function library over caller-supplied secrets and
/// time; the only mutable state is its configuration, changed through
/// [`Totp::configure`] (which requires `&mut self`, so a shared instance
/// cannot be reconfigured mid-verification).
#[derive(Debug, Clone)]
pub struct Totp {
    algorithm: Algorithm,
    digits: u32,
    period: u64,
    max_discrepancy: i64,
}

impl Default for Totp {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Sha1,
            digits: 6,
            period: 30,
            max_discrepancy: 10,
        }
    }
}

impl Totp {
    /// Engine with the defaults every authenticator app understands:
    /// HMAC-SHA1, 6 digits, 30-second period.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configured engine in one step.
    pub fn with_options(options: &TotpOptions) -> Result<Self, TotpError> {
        let mut totp = Self::new();
        if let Some(max_discrepancy) = options.max_discrepancy {
            totp.max_discrepancy = max_discrepancy;
        }
        totp.configure(options)?;
        Ok(totp)
    }

    /// Merges the recognized options (`algorithm`, `digits`, `period`) into
    /// the engine. Unset options are left unchanged, so partial
    /// reconfiguration is legal.
    pub fn configure(&mut self, options: &TotpOptions) -> Result<(), TotpError> {
        if let Some(algorithm) = options.algorithm.as_deref() {
            self.algorithm = algorithm.parse()?;
        }

        if let Some(digits) = options.digits {
            if digits != 6 && digits != 8 {
                return Err(TotpError::new(ErrorKind::InvalidDigits));
            }
            self.digits = digits;
        }

        if let Some(period) = options.period {
            if period == 0 {
                return Err(TotpError::new(ErrorKind::InvalidPeriod));
            }
            self.period = period;
        }

        Ok(())
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn max_discrepancy(&self) -> i64 {
        self.max_discrepancy
    }

    /// Generates a fresh shared secret: 20 bytes from the OS CSPRNG,
    /// Base32-encoded (32 characters, no padding needed).
    pub fn generate_secret(&self) -> Result<String, TotpError> {
        let mut bytes = [0u8; SECRET_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| TotpError::new(ErrorKind::SecretGenerationFailed))?;
        Ok(base32::encode_upper(&bytes))
    }

    /// Derives the code for `secret` at `time_slice` (current slice when
    /// `None`): HMAC over the packed slice, then RFC 4226 dynamic truncation.
    pub fn get_code(&self, secret: &str, time_slice: Option<i64>) -> Result<String, TotpError> {
        self.validate_secret(secret)?;

        let slice = time_slice.unwrap_or_else(|| self.current_time_slice());
        let key = base32::decode_upper(secret)?;
        let hash = self.hmac_digest(&key, &pack_time_slice(slice));

        // Dynamic offset comes from the LAST byte of the full hmac output;
        // sha256/sha512 correctness depends on not hardcoding index 19.
        let offset = (hash[hash.len() - 1] & 0x0f) as usize;
        let code = extract_code_from_hash(&hash, offset) % 10u32.pow(self.digits);

        Ok(format!("{code:0width$}", width = self.digits as usize))
    }

    /// Verifies `code` against the slices within `discrepancy` steps of the
    /// current (or supplied) slice. Comparison is constant-time; any matching
    /// offset succeeds.
    ///
    /// An `Err` means the operation was rejected (bad input); `Ok(false)` is
    /// the legitimate "wrong code" outcome.
    pub fn verify_code(
        &self,
        secret: &str,
        code: &str,
        discrepancy: i64,
        time_slice: Option<i64>,
    ) -> Result<bool, TotpError> {
        self.check_discrepancy(discrepancy)?;
        self.validate_secret(secret)?;
        self.validate_code(code)?;

        let current_slice = time_slice.unwrap_or_else(|| self.current_time_slice());

        for offset in -discrepancy..=discrepancy {
            if codes_match(&self.get_code(secret, Some(current_slice + offset))?, code) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Replay-safe variant of [`Totp::verify_code`]: slices at or below
    /// `last_accepted_slice` are skipped, so an already-used code cannot be
    /// accepted twice. Returns the matched slice for the caller to persist as
    /// the new watermark, or `None` when nothing in the window is both unused
    /// and valid.
    pub fn verify_code_once(
        &self,
        secret: &str,
        code: &str,
        last_accepted_slice: i64,
        discrepancy: i64,
    ) -> Result<Option<i64>, TotpError> {
        self.check_discrepancy(discrepancy)?;
        self.validate_secret(secret)?;
        self.validate_code(code)?;

        let current_slice = self.current_time_slice();

        for offset in -discrepancy..=discrepancy {
            let candidate_slice = current_slice + offset;

            if candidate_slice <= last_accepted_slice {
                continue;
            }

            if codes_match(&self.get_code(secret, Some(candidate_slice))?, code) {
                return Ok(Some(candidate_slice));
            }
        }

        Ok(None)
    }

    /// Audits a secret and reports its strength. Never fails: structural
    /// problems become warnings on a default report instead of errors.
    pub fn audit_secret(&self, secret: &str) -> SecretAudit {
        if secret.is_empty() {
            return SecretAudit {
                length_bytes: 0,
                is_strong: false,
                warnings: vec![messages::get("security.audit_secret_empty", &[])],
            };
        }

        if secret.len() % 8 != 0 || !is_base32_with_padding(secret) {
            return SecretAudit {
                length_bytes: 0,
                is_strong: false,
                warnings: vec![messages::get("security.audit_invalid_base32", &[])],
            };
        }

        let length_bytes = match base32::decode_upper(secret) {
            Ok(decoded) => decoded.len(),
            Err(_) => {
                return SecretAudit {
                    length_bytes: 0,
                    is_strong: false,
                    warnings: vec![messages::get("security.audit_invalid_base32", &[])],
                };
            }
        };

        let mut warnings = Vec::new();
        if length_bytes == 0 {
            warnings.push(messages::get("security.audit_zero_bytes", &[]));
        } else if length_bytes < STRONG_SECRET_BYTES {
            warnings.push(messages::get("security.audit_weak_secret", &[&length_bytes]));
        }

        SecretAudit {
            length_bytes,
            is_strong: length_bytes >= STRONG_SECRET_BYTES,
            warnings,
        }
    }

    /// Renders the `otpauth://` provisioning URI authenticator apps scan.
    /// Field names, uppercase algorithm, and RFC 3986 percent-encoding of
    /// `label`/`issuer` are load-bearing for interoperability.
    pub fn generate_uri(
        &self,
        secret: &str,
        label: &str,
        issuer: &str,
    ) -> Result<String, TotpError> {
        self.validate_secret(secret)?;

        let encoded_label = urlencoding::encode(label);
        let encoded_issuer = urlencoding::encode(issuer);

        Ok(format!(
            "otpauth://totp/{}:{}?secret={}&issuer={}&algorithm={}&digits={}&period={}",
            encoded_issuer,
            encoded_label,
            secret,
            encoded_issuer,
            self.algorithm.as_str().to_ascii_uppercase(),
            self.digits,
            self.period
        ))
    }

    /// Gate invoked by every operation that consumes a secret. A structurally
    /// valid but short secret passes with a logged warning; only the byte
    /// length ever reaches the log, never the secret itself.
    fn validate_secret(&self, secret: &str) -> Result<(), TotpError> {
        if secret.is_empty() {
            return Err(TotpError::new(ErrorKind::EmptySecret));
        }

        if secret.len() % 8 != 0 {
            return Err(TotpError::new(ErrorKind::InvalidSecretLength));
        }

        if !is_base32_with_padding(secret) {
            return Err(TotpError::new(ErrorKind::InvalidSecretCharacters));
        }

        let decoded = base32::decode_upper(secret)?;
        if decoded.len() < STRONG_SECRET_BYTES {
            log::warn!(
                "{}",
                messages::get("security.weak_secret_log", &[&decoded.len()])
            );
        }

        Ok(())
    }

    fn validate_code(&self, code: &str) -> Result<(), TotpError> {
        let well_formed =
            code.len() == self.digits as usize && code.bytes().all(|b| b.is_ascii_digit());
        if !well_formed {
            return Err(TotpError::with_args(
                ErrorKind::InvalidCodeFormat,
                messages::get("validation.code_format", &[&self.digits]),
            ));
        }
        Ok(())
    }

    fn check_discrepancy(&self, discrepancy: i64) -> Result<(), TotpError> {
        if discrepancy < 0 || discrepancy > self.max_discrepancy {
            return Err(TotpError::with_args(
                ErrorKind::DiscrepancyOutOfRange,
                messages::get("configuration.invalid_discrepancy", &[&self.max_discrepancy]),
            ));
        }
        Ok(())
    }

    fn current_time_slice(&self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        (now / self.period) as i64
    }

    fn hmac_digest(&self, key: &[u8], message: &[u8]) -> Vec<u8> {
        match self.algorithm {
            Algorithm::Sha1 => {
                let mut mac =
                    Hmac::<Sha1>::new_from_slice(key).expect("HMAC accepts keys of any size");
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
            Algorithm::Sha256 => {
                let mut mac =
                    Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any size");
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
            Algorithm::Sha512 => {
                let mut mac =
                    Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts keys of any size");
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
        }
    }
}

/// Packs a time slice as an 8-byte big-endian unsigned integer, the RFC 4226
/// 64-bit counter representation. Negative test slices wrap as two's
/// complement.
fn pack_time_slice(time_slice: i64) -> [u8; 8] {
    (time_slice as u64).to_be_bytes()
}

/// RFC 4226 dynamic truncation: 4 bytes at `offset`, top bit masked off,
/// composed big-endian into a 31-bit integer.
fn extract_code_from_hash(hash: &[u8], offset: usize) -> u32 {
    (u32::from(hash[offset] & 0x7f) << 24)
        | (u32::from(hash[offset + 1]) << 16)
        | (u32::from(hash[offset + 2]) << 8)
        | u32::from(hash[offset + 3])
}

/// `^[A-Z2-7]+=*$` without the regex: at least one alphabet character, then
/// only trailing padding.
fn is_base32_with_padding(secret: &str) -> bool {
    let unpadded = secret.trim_end_matches('=');
    !unpadded.is_empty()
        && unpadded
            .bytes()
            .all(|b| matches!(b, b'A'..=b'Z' | b'2'..=b'7'))
}

/// Constant-time code comparison; ordinary `==` here would leak matching
/// prefixes through timing.
fn codes_match(expected: &str, supplied: &str) -> bool {
    let expected = expected.as_bytes();
    let supplied = supplied.as_bytes();
    expected.len() == supplied.len() && bool::from(expected.ct_eq(supplied))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_time_slice_big_endian() {
        assert_eq!(
            pack_time_slice(1_234_567_890),
            [0x00, 0x00, 0x00, 0x00, 0x49, 0x96, 0x02, 0xd2]
        );
        assert_eq!(pack_time_slice(0), [0; 8]);
    }

    #[test]
    fn negative_slice_wraps_as_unsigned() {
        assert_eq!(pack_time_slice(-1), [0xff; 8]);
    }

    #[test]
    fn truncation_masks_the_sign_bit() {
        let hash = [0xffu8; 20];
        assert_eq!(extract_code_from_hash(&hash, 0), 0x7fff_ffff);
    }

    #[test]
    fn base32_shape_check() {
        assert!(is_base32_with_padding("JBSWY3DPEHPK3PXP"));
        assert!(is_base32_with_padding("JBSWY3DPEE======"));
        assert!(!is_base32_with_padding("jbswy3dp"));
        assert!(!is_base32_with_padding("JBSW=3DP"));
        assert!(!is_base32_with_padding("========"));
    }
}
