//! Token verification for the authentication pre-processor.
//!
//! [`Ed25519TokenVerifier`] checks compact RFC 7519 tokens signed with
//! Ed25519 (EdDSA):
//! - Header: `{"alg":"EdDSA","typ":"JWT"}`
//! - Payload: [`TokenClaims`] (sub, name, exp, iat, scopes, admin)
//! - Signature: Ed25519 over `base64url(header).base64url(payload)`

use super::{Identity, Scope};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT header (static for EdDSA)
const JWT_HEADER: &str = r#"{"alg":"EdDSA","typ":"JWT"}"#;

/// Default tolerance for clock skew, in seconds.
pub const DEFAULT_LEEWAY_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid token format")]
    InvalidFormat,

    #[error("Invalid base64 encoding")]
    InvalidBase64,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid verifying key: {0}")]
    InvalidKey(String),

    #[error("Token expired")]
    Expired,

    #[error("Token not yet valid")]
    NotYetValid,
}

/// Verifies a caller token and yields the identity it asserts.
///
/// Implementations may call out to a remote token service; they must be
/// safe to share between concurrent calls.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, TokenError>;
}

/// Payload of a signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub admin: bool,
}

impl TokenClaims {
    pub fn new(sub: impl Into<String>, iat: i64, exp: i64) -> Self {
        Self {
            sub: sub.into(),
            name: None,
            exp,
            iat,
            scopes: Vec::new(),
            admin: false,
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn into_identity(self) -> Identity {
        Identity {
            subject: self.sub,
            name: self.name,
            scopes: self.scopes,
            admin: self.admin,
        }
    }
}

/// Encode and sign a token.
pub fn sign_token(claims: &TokenClaims, signing_key: &SigningKey) -> Result<String, TokenError> {
    let header_b64 = URL_SAFE_NO_PAD.encode(JWT_HEADER);
    let payload_json =
        serde_json::to_string(claims).map_err(|e| TokenError::InvalidJson(e.to_string()))?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json);

    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = signing_key.sign(signing_input.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());

    Ok(format!("{signing_input}.{signature_b64}"))
}

/// Local verifier for Ed25519-signed tokens.
#[derive(Debug, Clone)]
pub struct Ed25519TokenVerifier {
    verifying_key: VerifyingKey,
    leeway_secs: i64,
}

impl Ed25519TokenVerifier {
    pub fn new(verifying_key: VerifyingKey) -> Self {
        Self {
            verifying_key,
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }

    /// Build from a hex-encoded 32-byte public key.
    pub fn from_hex(key_hex: &str) -> Result<Self, TokenError> {
        let bytes = hex::decode(key_hex.trim()).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| TokenError::InvalidKey(format!("expected 32 bytes, got {}", b.len())))?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        Ok(Self::new(key))
    }

    pub fn with_leeway(mut self, leeway_secs: i64) -> Self {
        self.leeway_secs = leeway_secs.max(0);
        self
    }

    /// Decode and verify a token, returning its claims.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [header_b64, payload_b64, signature_b64] = parts.as_slice() else {
            return Err(TokenError::InvalidFormat);
        };

        // Verify signature first
        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::InvalidBase64)?;
        let signature_bytes: [u8; 64] = signature_bytes
            .try_into()
            .map_err(|_| TokenError::InvalidSignature)?;
        let signature = Signature::from_bytes(&signature_bytes);

        self.verifying_key
            .verify(signing_input.as_bytes(), &signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::InvalidBase64)?;
        let claims: TokenClaims = serde_json::from_slice(&payload_bytes)
            .map_err(|e| TokenError::InvalidJson(e.to_string()))?;

        let now = Utc::now().timestamp();
        if now > claims.exp.saturating_add(self.leeway_secs) {
            return Err(TokenError::Expired);
        }
        if claims.iat > now.saturating_add(self.leeway_secs) {
            return Err(TokenError::NotYetValid);
        }

        Ok(claims)
    }
}

#[async_trait]
impl TokenVerifier for Ed25519TokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.decode(token).map(TokenClaims::into_identity)
    }
}
