// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google sign-in: turn a Google ID token into a backend login request.
//!
//! The signature is verified by the backend, which holds Google's keys. Here
//! we only read the profile claims and reject tokens that are expired or
//! were issued for a different client.

use crate::config::{Config, ConfigError};
use crate::error::AppError;
use crate::models::{GoogleLoginRequest, RegistrationRole};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Profile claims carried by a Google ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleClaims {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
}

/// Reads Google ID tokens issued for this client.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    client_id: String,
}

impl GoogleIdentity {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }

    /// Build from config; fails when Google sign-in is not configured.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config
            .google_client_id
            .as_deref()
            .map(Self::new)
            .ok_or(ConfigError::GoogleDisabled)
    }

    /// Extract the profile claims from an ID token.
    pub fn read_claims(&self, id_token: &str) -> Result<GoogleClaims, AppError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        decode::<GoogleClaims>(id_token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected Google credential");
                AppError::Validation("Google login was cancelled or failed".to_string())
            })
    }

    /// Build the backend request for this ID token.
    pub fn login_request(
        &self,
        id_token: &str,
        role: RegistrationRole,
    ) -> Result<GoogleLoginRequest, AppError> {
        let claims = self.read_claims(id_token)?;
        let (first_name, last_name) = split_name(&claims);

        Ok(GoogleLoginRequest {
            id_token: id_token.to_string(),
            email: claims.email,
            name: claims.name,
            first_name,
            last_name,
            profile_image: claims.picture,
            role,
        })
    }
}

/// Prefer the explicit given/family names; otherwise split the display name
/// at the first space.
fn split_name(claims: &GoogleClaims) -> (String, String) {
    let mut parts = claims.name.splitn(2, ' ');
    let head = parts.next().unwrap_or_default();
    let tail = parts.next().unwrap_or_default();

    let first = claims
        .given_name
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| head.to_string());
    let last = claims
        .family_name
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| tail.to_string());

    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    const CLIENT_ID: &str = "client-123.apps.googleusercontent.com";

    fn id_token(aud: &str, extra: serde_json::Value) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let mut claims = serde_json::json!({
            "iss": "https://accounts.google.com",
            "aud": aud,
            "sub": "1098",
            "iat": now,
            "exp": now + 3600,
            "email": "mary.ann@example.com",
            "name": "Mary Ann Evans",
        });
        if let (Some(obj), Some(more)) = (claims.as_object_mut(), extra.as_object()) {
            for (k, v) in more {
                obj.insert(k.clone(), v.clone());
            }
        }
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"not-googles-key"),
        )
        .unwrap()
    }

    #[test]
    fn test_name_split_falls_back_to_display_name() {
        let identity = GoogleIdentity::new(CLIENT_ID);
        let token = id_token(CLIENT_ID, serde_json::json!({}));

        let req = identity
            .login_request(&token, RegistrationRole::Instructor)
            .unwrap();
        assert_eq!(req.first_name, "Mary");
        assert_eq!(req.last_name, "Ann Evans");
        assert_eq!(req.email, "mary.ann@example.com");
        assert_eq!(req.role, RegistrationRole::Instructor);
        assert_eq!(req.id_token, token);
    }

    #[test]
    fn test_given_and_family_names_win() {
        let identity = GoogleIdentity::new(CLIENT_ID);
        let token = id_token(
            CLIENT_ID,
            serde_json::json!({
                "given_name": "George",
                "family_name": "Eliot",
                "picture": "https://example.com/p.png"
            }),
        );

        let req = identity
            .login_request(&token, RegistrationRole::Student)
            .unwrap();
        assert_eq!(req.first_name, "George");
        assert_eq!(req.last_name, "Eliot");
        assert_eq!(req.profile_image.as_deref(), Some("https://example.com/p.png"));
    }

    #[test]
    fn test_token_for_other_client_is_rejected() {
        let identity = GoogleIdentity::new(CLIENT_ID);
        let token = id_token("someone-else", serde_json::json!({}));

        let err = identity.read_claims(&token).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let identity = GoogleIdentity::new(CLIENT_ID);
        assert!(identity.read_claims("not.a.jwt").is_err());
    }

    #[test]
    fn test_from_config_requires_client_id() {
        let mut config = Config::test_default();
        config.google_client_id = None;
        assert!(matches!(
            GoogleIdentity::from_config(&config),
            Err(ConfigError::GoogleDisabled)
        ));
    }
}
