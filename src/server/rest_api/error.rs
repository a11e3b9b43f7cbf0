use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Type-erased error response
///
/// NOTE: This type is inspired by RFC7807 (Problem Details for HTTP APIs) but spares on a lot of
/// the details to avoid complexity.
///
/// See: <https://www.rfc-editor.org/rfc/rfc7807.html>
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
	r#type: &'static str,
	status: u16,
	message: String,
}

impl IntoResponse for ApiErrorResponse {
	fn into_response(self) -> Response {
		let status_code = StatusCode::from_u16(self.status).expect("StatusCode could not be mapped.");
		(status_code, Json(self)).into_response()
	}
}

#[derive(Error, Debug)]
pub enum ApiError {
	#[error("{0}")]
	Validation(String),
	#[error("User already exists with this email")]
	DuplicateEmail,
	#[error("Invalid credentials")]
	InvalidCredentials,
	#[error("{0} not found")]
	NotFound(&'static str),
	#[error("Authentication failed.")]
	AuthenticationFailed,
	#[error("Server error")]
	Internal(#[from] anyhow::Error),
}

impl ApiError {
	pub fn validation(message: impl Into<String>) -> Self {
		Self::Validation(message.into())
	}

	pub fn internal(error: impl Into<anyhow::Error>) -> Self {
		Self::Internal(error.into())
	}
}

impl From<ApiError> for ApiErrorResponse {
	fn from(error: ApiError) -> Self {
		use ApiError::*;
		match error {
			Validation(message) => ApiErrorResponse {
				r#type: "validation-failed",
				status: StatusCode::BAD_REQUEST.as_u16(),
				message,
			},
			DuplicateEmail => ApiErrorResponse {
				r#type: "duplicate-email",
				status: StatusCode::BAD_REQUEST.as_u16(),
				message: error.to_string(),
			},
			InvalidCredentials => ApiErrorResponse {
				r#type: "invalid-credentials",
				status: StatusCode::BAD_REQUEST.as_u16(),
				message: error.to_string(),
			},
			NotFound(_) => ApiErrorResponse {
				r#type: "not-found",
				status: StatusCode::NOT_FOUND.as_u16(),
				message: error.to_string(),
			},
			AuthenticationFailed => ApiErrorResponse {
				r#type: "authentication-failed",
				status: StatusCode::UNAUTHORIZED.as_u16(),
				message: error.to_string(),
			},
			Internal(internal_error) => {
				error!("Internal server error: {internal_error:#}");
				// detail only leaves the process in non-production builds
				let message = if cfg!(debug_assertions) {
					format!("{internal_error:#}")
				} else {
					"Server error".to_string()
				};
				ApiErrorResponse {
					r#type: "internal-error",
					status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
					message,
				}
			}
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		ApiErrorResponse::from(self).into_response()
	}
}
