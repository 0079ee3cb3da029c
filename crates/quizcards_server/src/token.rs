//! Signed, client-held session tokens.
//!
//! A token is `base64url(json(envelope)) "." base64url(hmac_sha256(payload))`.
//! The envelope carries the session and the time it was issued. Nothing is
//! stored server-side, so any instance holding the secret can serve any
//! player.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use quizcards::GameSession;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, instrument, warn};

type HmacSha256 = Hmac<Sha256>;

/// Tolerated clock difference between instances, in seconds.
const CLOCK_SKEW_SECS: i64 = 60;

/// Reason a token could not be produced or accepted.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum TokenError {
    /// The signing key was rejected.
    #[display("Invalid signing key: {}", _0)]
    InvalidKey(String),

    /// The token does not have the `payload.signature` shape.
    #[display("Malformed session token")]
    Malformed,

    /// The signature does not match the payload.
    #[display("Session token signature mismatch")]
    BadSignature,

    /// The token is older than the configured lifetime.
    #[display("Session token expired")]
    Expired,

    /// The signed payload is not a valid session.
    #[display("Invalid session payload: {}", _0)]
    InvalidPayload(String),

    /// The session could not be serialized.
    #[display("Failed to encode session: {}", _0)]
    Encode(String),
}

impl std::error::Error for TokenError {}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    session: &'a GameSession,
    issued_at: i64,
}

#[derive(Deserialize)]
struct Envelope {
    session: GameSession,
    issued_at: i64,
}

/// Encodes sessions into tamper-evident tokens and back.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
    max_age: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec signing with `secret`; tokens older than `max_age`
    /// are rejected.
    #[instrument(skip(secret))]
    pub fn new(secret: &[u8], max_age: Duration) -> Result<Self, TokenError> {
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        Ok(Self { mac, max_age })
    }

    /// Encodes `session`, stamped with the current time.
    pub fn encode(&self, session: &GameSession) -> Result<String, TokenError> {
        self.encode_at(session, chrono::Utc::now().timestamp())
    }

    /// Encodes `session`, stamped with `issued_at` (unix seconds).
    #[instrument(skip(self, session), fields(index = session.current_index()))]
    pub fn encode_at(&self, session: &GameSession, issued_at: i64) -> Result<String, TokenError> {
        let json = serde_json::to_vec(&EnvelopeRef { session, issued_at })
            .map_err(|e| TokenError::Encode(e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        debug!(len = payload.len(), "Encoded session token");
        Ok(format!("{payload}.{signature}"))
    }

    /// Decodes and verifies a token against the current time.
    pub fn decode(&self, token: &str) -> Result<GameSession, TokenError> {
        self.decode_at(token, chrono::Utc::now().timestamp())
    }

    /// Decodes and verifies a token as of `now` (unix seconds).
    ///
    /// The signature is checked before the payload is parsed; nothing in an
    /// unverified token is trusted.
    #[instrument(skip(self, token))]
    pub fn decode_at(&self, token: &str, now: i64) -> Result<GameSession, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| {
            warn!("Session token signature mismatch");
            TokenError::BadSignature
        })?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let envelope: Envelope = serde_json::from_slice(&json).map_err(|e| {
            warn!(error = %e, "Signed session payload rejected");
            TokenError::InvalidPayload(e.to_string())
        })?;

        let age = now.saturating_sub(envelope.issued_at);
        if age < -CLOCK_SKEW_SECS || age.unsigned_abs() > self.max_age.as_secs() {
            debug!(age, max_age = self.max_age.as_secs(), "Session token expired");
            return Err(TokenError::Expired);
        }

        Ok(envelope.session)
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}
