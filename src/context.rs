use crate::auth::token::TokenSigner;
use crate::configuration::Configuration;
use crate::store::Store;
use crate::store::sqlite::SqliteStore;
use anyhow::bail;
use axum::extract::FromRef;
use std::sync::Arc;
use tracing::warn;

/// Signing key used when none is configured. Only ever used outside
/// production mode, production refuses to start without an explicit secret.
const DEVELOPMENT_TOKEN_SECRET: &str = "palaver-development-secret";

#[derive(Clone, FromRef)]
pub struct ApplicationContext {
	pub configuration: Configuration,
	pub store: Arc<dyn Store>,
	pub token_signer: TokenSigner,
}

impl ApplicationContext {
	pub async fn new(configuration: Configuration) -> anyhow::Result<ApplicationContext> {
		let token_signer = token_signer(&configuration)?;
		let store: Arc<dyn Store> = Arc::new(SqliteStore::new(&configuration.database_url).await?);

		Ok(Self {
			configuration,
			store,
			token_signer,
		})
	}
}

fn token_signer(configuration: &Configuration) -> anyhow::Result<TokenSigner> {
	let secret = match &configuration.token_secret {
		Some(secret) => secret.clone(),
		None if configuration.production => {
			bail!("No token_secret is configured. Refusing to start in production mode with the development secret.")
		}
		None => {
			warn!("No token_secret is configured, falling back to the built-in development secret.");
			DEVELOPMENT_TOKEN_SECRET.to_string()
		}
	};

	Ok(TokenSigner::new(secret.as_bytes(), configuration.token_lifetime))
}
