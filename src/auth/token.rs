use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
	/// [RFC7519, Section 4.1.2](https://www.rfc-editor.org/rfc/rfc7519.html#section-4.1.2)
	sub: String,
	exp: i64,
}

/// Issues and verifies the stateless bearer tokens. There is no server side
/// session store, the signed user uuid is the whole session.
#[derive(Clone)]
pub struct TokenSigner {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	lifetime: Duration,
}

#[derive(Error, Debug)]
pub enum TokenError {
	#[error("Failed to encode token: {0}")]
	Encode(jsonwebtoken::errors::Error),
	#[error("Token was rejected: {0}")]
	Invalid(jsonwebtoken::errors::Error),
	#[error("Token subject is not a valid uuid: {0}")]
	InvalidSubject(#[from] uuid::Error),
}

impl TokenSigner {
	pub fn new(secret: &[u8], lifetime: Duration) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			lifetime,
		}
	}

	pub fn create_token(&self, user_uuid: Uuid) -> Result<String, TokenError> {
		let claims = Claims {
			sub: user_uuid.to_string(),
			exp: Utc::now().timestamp() + self.lifetime.as_secs() as i64,
		};

		jsonwebtoken::encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key).map_err(TokenError::Encode)
	}

	pub fn verify_token(&self, token: &str) -> Result<Uuid, TokenError> {
		let validation = Validation::new(Algorithm::HS512);
		let token_data =
			jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation).map_err(TokenError::Invalid)?;

		Ok(Uuid::parse_str(&token_data.claims.sub)?)
	}
}
