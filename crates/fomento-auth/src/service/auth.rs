//! JWT token service

use std::sync::LazyLock;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use moka::sync::Cache;

use crate::model::FomentoJwtPayload;

/// Cached token data containing the full payload
#[derive(Clone)]
struct CachedTokenData {
    claims: FomentoJwtPayload,
}

/// JWT token cache to avoid repeated validation of the same token
static TOKEN_CACHE: LazyLock<Cache<String, CachedTokenData>> = LazyLock::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300))
        .build()
});

/// Decode and validate a JWT token with caching
pub fn decode_jwt_token_cached(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<FomentoJwtPayload>> {
    if let Some(cached) = TOKEN_CACHE.get(token) {
        let now = chrono::Utc::now().timestamp();
        if cached.claims.exp > now {
            return Ok(jsonwebtoken::TokenData {
                header: jsonwebtoken::Header::default(),
                claims: cached.claims,
            });
        }
        // Token expired in cache, invalidate it
        TOKEN_CACHE.invalidate(token);
    }

    let result = decode_jwt_token(token, secret_key)?;

    TOKEN_CACHE.insert(
        token.to_string(),
        CachedTokenData {
            claims: result.claims.clone(),
        },
    );

    Ok(result)
}

/// Decode and validate a JWT token without caching
pub fn decode_jwt_token(
    token: &str,
    secret_key: &str,
) -> jsonwebtoken::errors::Result<jsonwebtoken::TokenData<FomentoJwtPayload>> {
    let decoding_key = DecodingKey::from_base64_secret(secret_key)?;
    decode::<FomentoJwtPayload>(token, &decoding_key, &Validation::default())
}

/// Encode a JWT token for the given account email
pub fn encode_jwt_token(
    sub: &str,
    secret_key: &str,
    expire_seconds: i64,
) -> jsonwebtoken::errors::Result<String> {
    let exp = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::seconds(expire_seconds))
        .unwrap_or_else(chrono::Utc::now)
        .timestamp();

    let payload = FomentoJwtPayload {
        sub: sub.to_string(),
        exp,
    };

    let header = Header::new(Algorithm::HS256);
    let encoding_key = EncodingKey::from_base64_secret(secret_key)?;
    encode(&header, &payload, &encoding_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn test_secret() -> String {
        base64::engine::general_purpose::STANDARD.encode(b"fomento-test-secret-key-0123456789")
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let secret = test_secret();
        let token = encode_jwt_token("founder@startup.com.br", &secret, 3600).unwrap();

        let decoded = decode_jwt_token(&token, &secret).unwrap();
        assert_eq!(decoded.claims.sub, "founder@startup.com.br");
        assert!(decoded.claims.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn test_decode_cached_returns_same_claims() {
        let secret = test_secret();
        let token = encode_jwt_token("maria@healthtech.br", &secret, 3600).unwrap();

        let first = decode_jwt_token_cached(&token, &secret).unwrap();
        let second = decode_jwt_token_cached(&token, &secret).unwrap();
        assert_eq!(first.claims.sub, second.claims.sub);
        assert_eq!(first.claims.exp, second.claims.exp);
    }

    #[test]
    fn test_decode_rejects_wrong_secret() {
        let secret = test_secret();
        let other = base64::engine::general_purpose::STANDARD.encode(b"another-secret-entirely!!");
        let token = encode_jwt_token("founder@startup.com.br", &secret, 3600).unwrap();

        assert!(decode_jwt_token(&token, &other).is_err());
    }
}
