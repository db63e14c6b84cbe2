use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    /// Admin name
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to sign token")]
    SignFailed(#[source] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Issues and validates HS256 access tokens for administrators.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_expiry: chrono::Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], access_token_expiry: chrono::Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_token_expiry,
        }
    }

    pub fn issue(&self, admin_name: &str) -> Result<String, TokenError> {
        self.issue_at(admin_name, chrono::Utc::now())
    }

    fn issue_at(
        &self,
        admin_name: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: admin_name.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_token_expiry).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::SignFailed)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(TokenError::Invalid)
    }
}
