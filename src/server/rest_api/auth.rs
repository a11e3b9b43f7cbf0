use crate::auth::password::{hash_password, verify_password};
use crate::context::ApplicationContext;
use crate::server::rest_api::error::ApiError;
use crate::server::rest_api::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::store::error::StoreError;
use crate::store::models::User;
use axum::Json;
use axum::extract::{FromRequestParts, Query, Request, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

/// Alternative for specifying tokens when headers aren't possible, i.e. `WebSockets`.
#[derive(Deserialize)]
pub struct QueryToken {
	token: String,
}

#[derive(Clone)]
pub struct AuthenticatedUser(pub User);

/// Optional query extractor replicating the old `Option<Query<T>>` behaviour:
/// yields `Some` when the query parameters deserialize, `None` otherwise.
/// Needed because axum's `Query` only implements `FromRequestParts`, not
/// `OptionalFromRequestParts`, so `Option<Query<T>>` no longer type-checks.
pub struct OptionalQuery<T>(Option<T>);

impl<T, S> FromRequestParts<S> for OptionalQuery<T>
where
	T: DeserializeOwned,
	S: Send + Sync,
{
	type Rejection = Infallible;

	async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
		Ok(Self(Query::<T>::from_request_parts(parts, state).await.ok().map(|query| query.0)))
	}
}

pub async fn middleware(
	State(context): State<ApplicationContext>,
	maybe_auth_header: Option<TypedHeader<Authorization<Bearer>>>,
	OptionalQuery(maybe_auth_query): OptionalQuery<QueryToken>,
	mut request: Request,
	next: Next,
) -> Result<Response, ApiError> {
	// Either accept a token via Bearer header or as query parameter.
	let token = match (maybe_auth_header, maybe_auth_query) {
		(Some(auth_header), None) => auth_header.token().to_string(),
		(None, Some(auth_query)) => auth_query.token,
		_ => return Err(ApiError::AuthenticationFailed),
	};

	let user_uuid = context.token_signer.verify_token(&token).map_err(|error| {
		debug!("Could not verify token, error was: {error}");
		ApiError::AuthenticationFailed
	})?;

	let Some(user) = context.store.get_user(user_uuid).await.map_err(ApiError::internal)? else {
		debug!("User for uuid '{user_uuid}' not found!");
		return Err(ApiError::AuthenticationFailed);
	};
	request.extensions_mut().insert(AuthenticatedUser(user));

	Ok(next.run(request).await)
}

pub async fn register(
	State(context): State<ApplicationContext>,
	Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
	let RegisterRequest {
		name,
		email,
		password,
		avatar,
	} = request;
	if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
		return Err(ApiError::validation("Please enter all fields"));
	}

	let password_hash = hash_password(&password).map_err(ApiError::internal)?;
	// the unique constraint is the actual duplicate check, a pre-check
	// would leave a check-then-act gap
	let user = context
		.store
		.create_user(name.trim(), email.trim(), &password_hash, avatar.as_deref(), Utc::now())
		.await
		.map_err(|error| match error {
			StoreError::UniqueViolation => ApiError::DuplicateEmail,
			other => ApiError::internal(other),
		})?;

	let token = context.token_signer.create_token(user.uuid).map_err(ApiError::internal)?;

	Ok((StatusCode::CREATED, Json(AuthResponse { user: user.into(), token })))
}

pub async fn login(
	State(context): State<ApplicationContext>,
	Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
	let LoginRequest { email, password } = request;
	if email.trim().is_empty() || password.is_empty() {
		return Err(ApiError::validation("Please enter all fields"));
	}

	// Identical error for an unknown email and a wrong password, a caller
	// must not be able to probe which emails are registered.
	let Some(user) = context
		.store
		.get_user_by_email(email.trim())
		.await
		.map_err(ApiError::internal)?
	else {
		return Err(ApiError::InvalidCredentials);
	};
	if !verify_password(&password, &user.password_hash) {
		return Err(ApiError::InvalidCredentials);
	}

	let token = context.token_signer.create_token(user.uuid).map_err(ApiError::internal)?;

	Ok(Json(AuthResponse { user: user.into(), token }))
}
