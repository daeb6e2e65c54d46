use std::time::{Duration, SystemTime};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use libris_types::claim::TimeLimited;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::Result;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and verifies the bearer tokens handed out on login and registration.
///
/// Tokens are HS256 signed with the server secret and must carry `sub` and `exp`.
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity: Duration,
    validation: Validation,
}

impl TokenManager {
    pub fn new(secret: impl AsRef<[u8]>, validity: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
            validity,
            validation,
        }
    }

    fn sign(&self, mut claims: impl Serialize + TimeLimited, expires: SystemTime) -> Result<String> {
        claims.set_validity(expires);
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Token valid for the configured period from now.
    pub fn issue(&self, claims: impl Serialize + TimeLimited) -> Result<String> {
        self.sign(claims, SystemTime::now() + self.validity)
    }

    #[cfg(test)]
    fn issue_expired(&self, claims: impl Serialize + TimeLimited) -> Result<String> {
        self.sign(claims, SystemTime::now() - self.validity)
    }

    pub fn validate<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        decode::<T>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {e}");
                e.into()
            })
    }
}
