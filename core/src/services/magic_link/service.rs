//! Magic link token issuance and verification
//!
//! Links carry a signed, self-describing token (HS256 JWT). Signature and
//! claim checks are stateless; single-use enforcement goes through the
//! durable redeemed-token set, keyed by the token's `jti`.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::entities::{AuthIntent, Identifier};
use crate::errors::{DomainError, TokenError};
use crate::repositories::RedeemedTokenRepository;

use super::config::MagicLinkConfig;

/// Claims carried by a magic link token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagicLinkClaims {
    /// Identifier hash, never the raw contact value
    pub sub: String,
    /// Identifier kind ("email" or "phone")
    pub kind: String,
    /// Authentication intent the link was issued for
    pub intent: String,
    /// Backing challenge consumed when the link is redeemed
    pub challenge_id: Uuid,
    /// Single-use token id
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Service for generating and verifying magic link tokens
pub struct MagicLinkService<T: RedeemedTokenRepository> {
    redeemed: Arc<T>,
    config: MagicLinkConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Decoding key for the previous secret during rotation
    previous_decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl<T: RedeemedTokenRepository> MagicLinkService<T> {
    pub fn new(redeemed: Arc<T>, config: MagicLinkConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let previous_decoding_key = config
            .previous_secret
            .as_ref()
            .map(|secret| DecodingKey::from_secret(secret.as_bytes()));

        let mut validation = Validation::default();
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;

        Self {
            redeemed,
            config,
            encoding_key,
            decoding_key,
            previous_decoding_key,
            validation,
        }
    }

    /// Generate a token with a fresh `jti`
    ///
    /// Returns the encoded token and the `jti` so the caller can tie the
    /// backing challenge to it.
    pub fn generate(
        &self,
        identifier: &Identifier,
        intent: AuthIntent,
        challenge_id: Uuid,
    ) -> Result<(String, Uuid), DomainError> {
        let jti = Uuid::new_v4();
        let token = self.generate_with_token_id(identifier, intent, challenge_id, jti)?;
        Ok((token, jti))
    }

    /// Generate a token with a caller-chosen `jti`
    pub fn generate_with_token_id(
        &self,
        identifier: &Identifier,
        intent: AuthIntent,
        challenge_id: Uuid,
        jti: Uuid,
    ) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = MagicLinkClaims {
            sub: identifier.hash().to_string(),
            kind: identifier.kind().as_str().to_string(),
            intent: intent.as_str().to_string(),
            challenge_id,
            jti,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.config.validity_minutes)).timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))?;

        debug!(
            token_id = %jti,
            identifier = %identifier.masked(),
            intent = intent.as_str(),
            event = "magic_link_generated",
            "Magic link token generated"
        );

        Ok(token)
    }

    /// Verify signature and claims without consuming the token
    ///
    /// The previous secret is tried only when the current secret rejects
    /// the signature, so rotation never widens what an expired or
    /// malformed token can do.
    pub fn verify(&self, token: &str) -> Result<MagicLinkClaims, DomainError> {
        match decode::<MagicLinkClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if e.kind() == &jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                let Some(previous) = &self.previous_decoding_key else {
                    return Err(DomainError::Token(TokenError::InvalidSignature));
                };
                decode::<MagicLinkClaims>(token, previous, &self.validation)
                    .map(|data| data.claims)
                    .map_err(|e| DomainError::Token(Self::map_decode_error(&e)))
            }
            Err(e) => Err(DomainError::Token(Self::map_decode_error(&e))),
        }
    }

    /// Verify the token and consume its `jti` exactly once
    ///
    /// Redemption is an atomic insert-if-absent on the durable set; the
    /// second caller for the same `jti` gets `TokenReplayed` regardless of
    /// interleaving.
    pub async fn verify_and_redeem(&self, token: &str) -> Result<MagicLinkClaims, DomainError> {
        let claims = self.verify(token)?;

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(DomainError::Token(TokenError::InvalidClaims))?;

        let newly_redeemed = self.redeemed.redeem(claims.jti, expires_at).await?;
        if !newly_redeemed {
            warn!(
                token_id = %claims.jti,
                event = "magic_link_replayed",
                "Magic link token presented more than once"
            );
            return Err(DomainError::Token(TokenError::TokenReplayed));
        }

        Ok(claims)
    }

    /// Token validity in minutes, for callers sizing the backing challenge
    pub fn validity_minutes(&self) -> i64 {
        self.config.validity_minutes
    }

    /// Build the clickable link for a token
    pub fn build_link(&self, token: &str) -> String {
        format!("{}?token={}", self.config.base_url, token)
    }

    /// Pull the token out of a submitted link or bare token string
    ///
    /// Only a full `token` query parameter counts; a parameter that merely
    /// ends in "token" must not shadow it.
    pub fn extract_token(input: &str) -> &str {
        ["?token=", "&token="]
            .iter()
            .find_map(|marker| input.split_once(marker))
            .map(|(_, rest)| rest.split('&').next().unwrap_or(rest))
            .unwrap_or(input)
    }

    fn map_decode_error(error: &jsonwebtoken::errors::Error) -> TokenError {
        use jsonwebtoken::errors::ErrorKind;
        match error.kind() {
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => TokenError::InvalidClaims,
            _ => TokenError::InvalidTokenFormat,
        }
    }
}
