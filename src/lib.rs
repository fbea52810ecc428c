// lib.rs
// totpkit: RFC 6238 TOTP engine over a built-in RFC 4648 Base32 codec.
//
// - generate shared secrets (20 random bytes, Base32-encoded)
// - derive time-windowed numeric codes (HMAC sha1/sha256/sha512 + dynamic truncation)
// - verify codes with clock-drift tolerance, optionally replay-safe
// - audit secret strength without failing
// - render otpauth:// provisioning URIs
//
// No persistence and no transport: callers own secret storage and the replay
// watermark returned by `verify_code_once`.

pub mod base32;
pub mod error;
pub mod messages;
pub mod totp;

pub use error::{ErrorKind, TotpError};
pub use totp::{Algorithm, SecretAudit, Totp, TotpOptions};
