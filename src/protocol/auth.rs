//! Command authentication: shared-secret keyed digest over the command text.
//!
//! Wire format of one inbound payload:
//!
//! ```text
//! unlock:1718000000$q1w2e3r4t5y6u7i8o9p0aQ==
//! └──────┬────────┘│└──────────┬───────────┘
//!   command text  SEP   base64(digest[..16])
//! ```
//!
//! The digest is `HMAC-SHA256(secret, command text)` truncated to 16 bytes
//! and encoded as standard padded base64, so the digest field is always
//! exactly [`ENCODED_DIGEST_LEN`] characters.
//!
//! Crypto is handled by the `hmac-sha256` crate: pure Rust, no_std,
//! identical on ESP-IDF and host targets.  Encoding uses `data-encoding`.

use core::fmt;

use data_encoding::BASE64;
use log::warn;

use crate::app::commands::{AuthenticatedCommand, Command};
use crate::error::{AuthError, Malformation};

// ── Constants ────────────────────────────────────────────────

/// Byte separating the command text from the digest field.
pub const SEPARATOR: u8 = b'$';

/// Separator between command name and sender timestamp.
pub const TIMESTAMP_SEPARATOR: char = ':';

/// Truncated digest length in bytes.
pub const DIGEST_LEN: usize = 16;

/// Length of the base64 digest field (padded).
pub const ENCODED_DIGEST_LEN: usize = DIGEST_LEN.div_ceil(3) * 4;

/// Longest payload accepted before any parsing.
pub const MAX_PAYLOAD_LEN: usize = 128;

// ── Shared secret ────────────────────────────────────────────

/// The pre-shared key.  Read-only after construction; `Debug` never
/// prints the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret(<{} bytes redacted>)", self.0.len())
    }
}

// ── Keyed digest primitive ───────────────────────────────────

/// A keyed message digest: `digest(key, message) -> DIGEST_LEN bytes`.
pub trait KeyedDigest {
    fn digest(&self, key: &[u8], message: &[u8]) -> [u8; DIGEST_LEN];
}

/// HMAC-SHA256, truncated to [`DIGEST_LEN`] bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Digest;

impl KeyedDigest for HmacSha256Digest {
    fn digest(&self, key: &[u8], message: &[u8]) -> [u8; DIGEST_LEN] {
        let full = hmac_sha256::HMAC::mac(message, key);
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&full[..DIGEST_LEN]);
        out
    }
}

/// Text-encode a digest into the fixed-width wire field.
fn encode_digest(digest: &[u8; DIGEST_LEN]) -> [u8; ENCODED_DIGEST_LEN] {
    let mut out = [0u8; ENCODED_DIGEST_LEN];
    BASE64.encode_mut(digest, &mut out);
    out
}

/// Compare every byte; never short-circuits.
fn digests_match(expected: &[u8], supplied: &[u8]) -> bool {
    if expected.len() != supplied.len() {
        return false;
    }
    expected
        .iter()
        .zip(supplied)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

// ── Authenticator (receiving side) ───────────────────────────

/// Gatekeeper between untrusted transport bytes and the door FSM.
///
/// Stateless apart from the secret: replay and rate policy live in
/// [`super::guard`].
pub struct CommandAuthenticator<D: KeyedDigest = HmacSha256Digest> {
    secret: SharedSecret,
    digest: D,
}

impl CommandAuthenticator<HmacSha256Digest> {
    pub fn new(secret: SharedSecret) -> Self {
        Self::with_digest(secret, HmacSha256Digest)
    }
}

impl<D: KeyedDigest> CommandAuthenticator<D> {
    pub fn with_digest(secret: SharedSecret, digest: D) -> Self {
        if secret.is_empty() {
            warn!("auth: shared secret is empty");
        }
        Self { secret, digest }
    }

    /// Validate `payload` and resolve the command it carries.
    ///
    /// Structural checks run before the digest is computed; the command
    /// text is only parsed once the digest has matched.
    pub fn authenticate(&self, payload: &[u8]) -> Result<AuthenticatedCommand, AuthError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(Malformation::TooLong.into());
        }

        let sep = payload
            .iter()
            .position(|&b| b == SEPARATOR)
            .ok_or(Malformation::MissingSeparator)?;
        let (command_bytes, rest) = payload.split_at(sep);
        let digest_field = &rest[1..];

        if digest_field.len() != ENCODED_DIGEST_LEN {
            return Err(Malformation::DigestLength.into());
        }

        let expected = encode_digest(&self.digest.digest(self.secret.as_bytes(), command_bytes));
        if !digests_match(&expected, digest_field) {
            return Err(AuthError::InvalidSignature);
        }

        parse_command_text(command_bytes)
    }
}

/// Parse `"<name>:<timestamp>"` into an [`AuthenticatedCommand`].
fn parse_command_text(bytes: &[u8]) -> Result<AuthenticatedCommand, AuthError> {
    let text = core::str::from_utf8(bytes).map_err(|_| Malformation::NotUtf8)?;
    let (name, ts) = text
        .split_once(TIMESTAMP_SEPARATOR)
        .ok_or(Malformation::MissingTimestamp)?;

    let command = Command::from_name(name).ok_or(Malformation::UnknownCommand)?;

    // `u64::from_str` accepts a leading '+'; the wire format does not.
    if ts.is_empty() || !ts.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Malformation::BadTimestamp.into());
    }
    let sender_timestamp: u64 = ts.parse().map_err(|_| Malformation::BadTimestamp)?;
    if sender_timestamp == 0 {
        return Err(Malformation::BadTimestamp.into());
    }

    Ok(AuthenticatedCommand {
        command,
        sender_timestamp,
    })
}

// ── Signer (sending side) ────────────────────────────────────

/// Builds correctly signed payloads.  Used by operator tooling and tests.
pub struct CommandSigner<D: KeyedDigest = HmacSha256Digest> {
    secret: SharedSecret,
    digest: D,
}

impl CommandSigner<HmacSha256Digest> {
    pub fn new(secret: SharedSecret) -> Self {
        Self {
            secret,
            digest: HmacSha256Digest,
        }
    }
}

impl<D: KeyedDigest> CommandSigner<D> {
    /// `"<name>:<ts>$<digest>"` for `command` at `sender_timestamp`.
    pub fn sign(&self, command: Command, sender_timestamp: u64) -> Vec<u8> {
        let text = format!("{}{}{}", command.name(), TIMESTAMP_SEPARATOR, sender_timestamp);
        self.sign_raw(text.as_bytes())
    }

    /// Sign arbitrary command text without checking its shape.
    pub fn sign_raw(&self, command_bytes: &[u8]) -> Vec<u8> {
        let field = encode_digest(&self.digest.digest(self.secret.as_bytes(), command_bytes));
        let mut out = Vec::with_capacity(command_bytes.len() + 1 + ENCODED_DIGEST_LEN);
        out.extend_from_slice(command_bytes);
        out.push(SEPARATOR);
        out.extend_from_slice(&field);
        out
    }
}

// ── Tests ────────────────────────────────────────────────────
