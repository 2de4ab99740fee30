//! Inbound command protocol: signed payload parsing and admission policy.

pub mod auth;
pub mod guard;

pub use auth::{CommandAuthenticator, CommandSigner, HmacSha256Digest, KeyedDigest, SharedSecret};
pub use guard::{InboundThrottle, ReplayGuard};
