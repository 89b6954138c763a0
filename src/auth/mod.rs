//! Authentication gates
//!
//! The dispatcher consults an [`AuthGate`] before executing any action.
//! The policy is deny-by-default: failures to extract or validate
//! credentials are never surfaced to the caller, they simply gate to false.

use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::core::context::RequestContext;
use crate::core::error::{GateError, GateResult};
use crate::core::traits::{AuthGate, AuthLevel};

const DEFAULT_HEADER: &str = "authorization";
const DEFAULT_COOKIE: &str = "token";

/// Gate that grants a fixed authentication level to every caller.
///
/// Useful for wiring defaults and tests; the gateway's default gate grants
/// `Anonymous`, which denies all action execution.
pub struct StaticAuthGate {
    level: AuthLevel,
}

impl StaticAuthGate {
    pub fn new(level: AuthLevel) -> Self {
        Self { level }
    }

    pub fn denied() -> Self {
        Self::new(AuthLevel::Anonymous)
    }
}

impl AuthGate for StaticAuthGate {
    fn is_authenticated(&self, _ctx: &RequestContext, min_level: AuthLevel) -> bool {
        self.level >= min_level
    }
}

/// Configuration for the bearer-token gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenAuthConfig {
    /// HTTP header field name containing the token (default: `authorization`).
    /// If the header starts with "Bearer ", the prefix is stripped.
    #[serde(default = "TokenAuthConfig::default_header")]
    pub header: String,

    /// Cookie field name containing the token (default: `token`).
    #[serde(default = "TokenAuthConfig::default_cookie")]
    pub cookie: String,

    /// Symmetric secret (or base64-encoded secret) for HMAC algorithms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Signature algorithm (default: HS256).
    #[serde(default = "TokenAuthConfig::default_algorithm")]
    pub algorithm: Algorithm,

    /// Whether the secret is base64-encoded (default: false).
    #[serde(default)]
    pub base64_secret: bool,

    /// Token lifetime grace period in seconds (default: 0).
    #[serde(default)]
    pub lifetime_grace_period: u64,

    /// Public key (PEM format) for RSA algorithms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl TokenAuthConfig {
    fn default_header() -> String {
        DEFAULT_HEADER.to_string()
    }

    fn default_cookie() -> String {
        DEFAULT_COOKIE.to_string()
    }

    fn default_algorithm() -> Algorithm {
        Algorithm::HS256
    }

    fn get_decoding_key(&self) -> Result<DecodingKey, &'static str> {
        match self.algorithm {
            Algorithm::HS256 | Algorithm::HS512 => {
                let secret = self.secret.as_ref().ok_or("missing secret")?;
                let key: Vec<u8> = if self.base64_secret {
                    general_purpose::STANDARD
                        .decode(secret)
                        .map_err(|_| "invalid base64")?
                } else {
                    secret.as_bytes().to_vec()
                };
                Ok(DecodingKey::from_secret(&key))
            }
            Algorithm::RS256 => {
                let public_key = self.public_key.as_ref().ok_or("missing public_key")?;
                DecodingKey::from_rsa_pem(public_key.as_bytes()).map_err(|_| "bad pem")
            }
            _ => Err("unsupported algorithm"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    exp: Option<i64>,
    /// Authentication strength claim: "full" or "remembered"
    level: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// Bearer-token implementation of [`AuthGate`].
///
/// Extracts a token from the configured header or cookie, validates the
/// signature and expiry, and maps the `level` claim to an [`AuthLevel`].
/// A valid token without a `level` claim counts as `Remembered`.
pub struct TokenAuthGate {
    config: TokenAuthConfig,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenAuthGate {
    pub fn new(config: TokenAuthConfig) -> GateResult<Self> {
        let decoding_key = config
            .get_decoding_key()
            .map_err(|e| GateError::Configuration(format!("Invalid token auth config: {e}")))?;

        // Pre-create validation object instead of rebuilding it per request
        let mut validation = Validation::new(config.algorithm);
        validation.leeway = config.lifetime_grace_period;

        Ok(Self {
            config,
            decoding_key,
            validation,
        })
    }

    fn extract_token(&self, ctx: &RequestContext) -> Option<String> {
        self.extract_from_header(ctx)
            .or_else(|| ctx.cookie(&self.config.cookie).map(str::to_string))
    }

    fn extract_from_header(&self, ctx: &RequestContext) -> Option<String> {
        let header_val = ctx.header(&self.config.header)?;
        if header_val.to_lowercase().starts_with("bearer ") {
            Some(header_val[7..].to_string())
        } else {
            Some(header_val.to_string())
        }
    }

    fn caller_level(&self, ctx: &RequestContext) -> AuthLevel {
        let Some(token) = self.extract_token(ctx) else {
            return AuthLevel::Anonymous;
        };

        match decode::<Claims>(&token, &self.decoding_key, &self.validation) {
            Ok(data) => match data.claims.level.as_deref() {
                Some("full") => AuthLevel::Full,
                _ => AuthLevel::Remembered,
            },
            Err(e) => {
                log::debug!("Token validation failed: {e}");
                AuthLevel::Anonymous
            }
        }
    }
}

impl AuthGate for TokenAuthGate {
    fn is_authenticated(&self, ctx: &RequestContext, min_level: AuthLevel) -> bool {
        self.caller_level(ctx) >= min_level
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;
    use crate::session::{MemorySessionStore, SessionHandle, SessionStore};

    const SECRET: &str = "unit-test-secret";

    fn gate() -> TokenAuthGate {
        TokenAuthGate::new(TokenAuthConfig {
            header: TokenAuthConfig::default_header(),
            cookie: TokenAuthConfig::default_cookie(),
            secret: Some(SECRET.to_string()),
            algorithm: Algorithm::HS256,
            base64_secret: false,
            lifetime_grace_period: 0,
            public_key: None,
        })
        .unwrap()
    }

    fn token(level: Option<&str>) -> String {
        let claims = Claims {
            exp: Some(i64::MAX),
            level: level.map(str::to_string),
            extra: serde_json::Map::new(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn ctx_with_auth(value: Option<&str>) -> RequestContext {
        let mut builder = Request::builder().uri("/console");
        if let Some(v) = value {
            builder = builder.header("authorization", v);
        }
        let req = builder.body(Bytes::new()).unwrap();
        let store = Arc::new(MemorySessionStore::new());
        let sid = store.create();
        RequestContext::new(&req, SessionHandle::new(store, sid))
    }

    #[test]
    fn test_bearer_token_grants_level() {
        let gate = gate();

        let full = ctx_with_auth(Some(&format!("Bearer {}", token(Some("full")))));
        assert!(gate.is_authenticated(&full, AuthLevel::Full));

        let remembered = ctx_with_auth(Some(&token(None)));
        assert!(gate.is_authenticated(&remembered, AuthLevel::Remembered));
        assert!(!gate.is_authenticated(&remembered, AuthLevel::Full));
    }

    #[test]
    fn test_missing_or_garbage_token_denies() {
        let gate = gate();

        let missing = ctx_with_auth(None);
        assert!(!gate.is_authenticated(&missing, AuthLevel::Remembered));

        let garbage = ctx_with_auth(Some("Bearer not-a-token"));
        assert!(!gate.is_authenticated(&garbage, AuthLevel::Remembered));
    }

    #[test]
    fn test_static_gate_ordering() {
        let req = ctx_with_auth(None);
        assert!(StaticAuthGate::new(AuthLevel::Full).is_authenticated(&req, AuthLevel::Remembered));
        assert!(!StaticAuthGate::denied().is_authenticated(&req, AuthLevel::Remembered));
    }
}
