//! Integration tests for command authentication through the public API.

use doorlock::app::commands::Command;
use doorlock::error::{AuthError, Malformation};
use doorlock::protocol::auth::{ENCODED_DIGEST_LEN, MAX_PAYLOAD_LEN};
use doorlock::protocol::{CommandAuthenticator, CommandSigner, ReplayGuard, SharedSecret};

use super::mock_hw::SECRET;

fn authenticator() -> CommandAuthenticator {
    CommandAuthenticator::new(SharedSecret::new(SECRET))
}

fn signer() -> CommandSigner {
    CommandSigner::new(SharedSecret::new(SECRET))
}

#[test]
fn signed_payload_has_fixed_wire_shape() {
    let payload = signer().sign(Command::Unlock, 1_718_000_000);
    let text = String::from_utf8(payload).unwrap();
    let (command, digest) = text.split_once('$').unwrap();
    assert_eq!(command, "unlock:1718000000");
    assert_eq!(digest.len(), ENCODED_DIGEST_LEN);
    assert!(digest.ends_with("=="));
}

#[test]
fn signed_unlock_round_trips_timestamp() {
    let payload = signer().sign(Command::Unlock, 77);
    let cmd = authenticator().authenticate(&payload).unwrap();
    assert_eq!(cmd.command, Command::Unlock);
    assert_eq!(cmd.sender_timestamp, 77);
}

#[test]
fn plain_text_without_digest_is_malformed() {
    assert_eq!(
        authenticator().authenticate(b"unlock:1718000000"),
        Err(AuthError::Malformed(Malformation::MissingSeparator))
    );
}

#[test]
fn empty_payload_is_malformed() {
    assert_eq!(
        authenticator().authenticate(b""),
        Err(AuthError::Malformed(Malformation::MissingSeparator))
    );
}

#[test]
fn payload_at_length_limit_is_still_parsed() {
    let mut text = b"unlock:".to_vec();
    text.resize(MAX_PAYLOAD_LEN - 1 - ENCODED_DIGEST_LEN, b'1');
    let payload = signer().sign_raw(&text);
    assert_eq!(payload.len(), MAX_PAYLOAD_LEN);
    // Too many digits for u64, but it gets past the size gate.
    assert_eq!(
        authenticator().authenticate(&payload),
        Err(AuthError::Malformed(Malformation::BadTimestamp))
    );

    let mut longer = payload.clone();
    longer.insert(0, b'x');
    assert_eq!(
        authenticator().authenticate(&longer),
        Err(AuthError::Malformed(Malformation::TooLong))
    );
}

#[test]
fn wrong_secret_is_rejected() {
    let forger = CommandSigner::new(SharedSecret::new(b"guessed".to_vec()));
    let payload = forger.sign(Command::Unlock, 1);
    assert_eq!(authenticator().authenticate(&payload), Err(AuthError::InvalidSignature));
}

#[test]
fn replaying_with_a_new_timestamp_needs_a_new_digest() {
    let good = signer().sign(Command::Unlock, 100);
    let mut bumped = b"unlock:101".to_vec();
    bumped.extend_from_slice(&good[good.len() - ENCODED_DIGEST_LEN - 1..]);
    assert_eq!(authenticator().authenticate(&bumped), Err(AuthError::InvalidSignature));
}

#[test]
fn replay_guard_orders_authenticated_timestamps() {
    let auth = authenticator();
    let signer = signer();
    let mut guard = ReplayGuard::new(true);

    for (ts, expected) in [(10, Ok(())), (10, Err(AuthError::Replayed)), (9, Err(AuthError::Replayed)), (11, Ok(()))] {
        let cmd = auth.authenticate(&signer.sign(Command::Unlock, ts)).unwrap();
        assert_eq!(guard.check(cmd.sender_timestamp), expected, "ts={ts}");
    }
    assert_eq!(guard.last_accepted(), Some(11));
}
