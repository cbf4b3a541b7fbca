//! Bearer token format
//!
//! A token is three base64url (unpadded) segments joined by `.`:
//! a JSON header, a JSON body and the wallet's signature over
//! `header.body`.

use super::signer::TokenSigner;
use crate::error::{Result, SdkError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

/// Token claims; times are unix seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBody {
    /// Base58 public key of the signing wallet
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub raw: String,
    pub header: TokenHeader,
    pub body: TokenBody,
    pub signature: Vec<u8>,
}

impl Token {
    /// Issue a new token valid for `ttl` from now
    pub async fn generate(signer: &dyn TokenSigner, ttl: Duration) -> Result<Self> {
        if ttl <= Duration::zero() {
            return Err(SdkError::Token("token lifetime must be positive".to_string()));
        }
        let now = Utc::now().timestamp();
        let header = TokenHeader {
            alg: signer.alg().to_string(),
            typ: "JWT".to_string(),
        };
        let body = TokenBody {
            sub: signer.subject().to_string(),
            iat: now,
            exp: now + ttl.num_seconds(),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&body)?)
        );
        let signature = signer.sign(signing_input.as_bytes()).await?;
        let raw = format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(&signature));

        Ok(Self {
            raw,
            header,
            body,
            signature,
        })
    }

    /// Parse a raw token. The signature is decoded but not verified.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split('.');
        let (Some(header), Some(body), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SdkError::Token("expected three token segments".to_string()));
        };

        let header: TokenHeader = serde_json::from_slice(&decode_segment(header)?)?;
        let body: TokenBody = serde_json::from_slice(&decode_segment(body)?)?;
        let signature = decode_segment(signature)?;

        Ok(Self {
            raw: raw.to_string(),
            header,
            body,
            signature,
        })
    }

    /// The `header.body` part the signature covers
    pub fn signing_input(&self) -> &str {
        self.raw
            .rfind('.')
            .map(|idx| &self.raw[..idx])
            .unwrap_or(&self.raw)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// Whether the token expires within `margin` from now
    pub fn expires_within(&self, margin: Duration) -> bool {
        Utc::now().timestamp() + margin.num_seconds() >= self.body.exp
    }

    pub fn lifetime(&self) -> Duration {
        Duration::seconds(self.body.exp - self.body.iat)
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| SdkError::Token(format!("invalid token segment: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::PublicKey;
    use async_trait::async_trait;

    struct FixedSigner;

    #[async_trait]
    impl TokenSigner for FixedSigner {
        fn alg(&self) -> &'static str {
            "ed25519"
        }

        fn subject(&self) -> PublicKey {
            PublicKey::new([5u8; 32])
        }

        async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
            Ok(payload.iter().rev().copied().collect())
        }
    }

    #[tokio::test]
    async fn test_generate_then_parse() {
        let token = Token::generate(&FixedSigner, Duration::minutes(60)).await.unwrap();
        assert_eq!(token.raw.split('.').count(), 3);
        assert!(!token.raw.contains('='));

        let parsed = Token::parse(&token.raw).unwrap();
        assert_eq!(parsed, token);
        assert_eq!(parsed.header.alg, "ed25519");
        assert_eq!(parsed.header.typ, "JWT");
        assert_eq!(parsed.body.sub, PublicKey::new([5u8; 32]).to_string());
        assert_eq!(parsed.lifetime(), Duration::minutes(60));
        assert!(!parsed.is_expired());
    }

    #[tokio::test]
    async fn test_signature_covers_header_and_body() {
        let token = Token::generate(&FixedSigner, Duration::minutes(1)).await.unwrap();
        let expected: Vec<u8> = token.signing_input().bytes().rev().collect();
        assert_eq!(token.signature, expected);
    }

    #[tokio::test]
    async fn test_expires_within_margin() {
        let token = Token::generate(&FixedSigner, Duration::minutes(2)).await.unwrap();
        assert!(!token.expires_within(Duration::seconds(30)));
        assert!(token.expires_within(Duration::minutes(5)));
    }

    #[tokio::test]
    async fn test_zero_lifetime_rejected() {
        let err = Token::generate(&FixedSigner, Duration::zero()).await.unwrap_err();
        assert!(matches!(err, SdkError::Token(_)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Token::parse("only.two").is_err());
        assert!(Token::parse("a.b.c.d").is_err());
        assert!(Token::parse("!!.??.##").is_err());
    }
}
