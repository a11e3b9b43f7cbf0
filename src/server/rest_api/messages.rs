use crate::context::ApplicationContext;
use crate::media::MediaStore;
use crate::server::rest_api::auth::AuthenticatedUser;
use crate::server::rest_api::error::ApiError;
use crate::server::rest_api::models::MessageResponse;
use crate::store::error::StoreError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

struct MediaUpload {
	file_name: String,
	content_type: Option<String>,
	bytes: axum::body::Bytes,
}

/// Persists a message from a `chatId`/`content`/`media` multipart form.
/// Announcing the saved message on the realtime channel is the client's job,
/// persistence has no realtime dependency.
pub async fn send_message(
	State(context): State<ApplicationContext>,
	State(media_store): State<MediaStore>,
	Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
	mut multipart: Multipart,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
	let mut chat_id = None;
	let mut content = None;
	let mut media = None;
	while let Some(field) = multipart
		.next_field()
		.await
		.map_err(|error| ApiError::validation(error.to_string()))?
	{
		let name = field.name().map(str::to_string);
		match name.as_deref() {
			Some("chatId") => {
				chat_id = Some(field.text().await.map_err(|error| ApiError::validation(error.to_string()))?);
			}
			Some("content") => {
				content = Some(field.text().await.map_err(|error| ApiError::validation(error.to_string()))?);
			}
			Some("media") => {
				let file_name = field.file_name().unwrap_or_default().to_string();
				let content_type = field.content_type().map(str::to_string);
				let bytes = field
					.bytes()
					.await
					.map_err(|error| ApiError::validation(error.to_string()))?;
				media = Some(MediaUpload {
					file_name,
					content_type,
					bytes,
				});
			}
			_ => {}
		}
	}

	let chat_id = chat_id.ok_or_else(|| ApiError::validation("chatId is required"))?;
	let chat_uuid = Uuid::parse_str(chat_id.trim()).map_err(|_| ApiError::validation("chatId is not a valid id"))?;

	// files outside the allow-list are dropped without an error, the request
	// then stands or falls with its text content
	let media = media.filter(|media| MediaStore::is_allowed(media.content_type.as_deref()));
	let content = content.filter(|content| !content.is_empty());
	if content.is_none() && media.is_none() {
		return Err(ApiError::validation("Content or media required"));
	}

	let Some(chat) = context.store.get_chat(chat_uuid).await.map_err(ApiError::internal)? else {
		return Err(ApiError::NotFound("Chat"));
	};

	let created_at = Utc::now();
	let media_path = match media {
		Some(media) => {
			media_store
				.save(&media.file_name, media.content_type.as_deref(), &media.bytes, created_at)
				.await
				.map_err(ApiError::internal)?
		}
		None => None,
	};

	let message = context
		.store
		.create_message(chat.uuid, user.uuid, content.as_deref(), media_path.as_deref(), created_at)
		.await
		.map_err(|error| match error {
			StoreError::ForeignKeyViolation => ApiError::NotFound("Chat"),
			other => ApiError::internal(other),
		})?;

	Ok((StatusCode::CREATED, Json(MessageResponse::new(message, user.into()))))
}

pub async fn list_messages(
	State(context): State<ApplicationContext>,
	Extension(AuthenticatedUser(_)): Extension<AuthenticatedUser>,
	Path(chat_id): Path<Uuid>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
	let messages = context.store.list_messages(chat_id).await.map_err(ApiError::internal)?;

	Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}
