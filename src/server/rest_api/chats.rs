use crate::context::ApplicationContext;
use crate::server::rest_api::auth::AuthenticatedUser;
use crate::server::rest_api::error::ApiError;
use crate::server::rest_api::models::{ChatResponse, DirectChatRequest, GroupChatRequest, UserResponse};
use crate::store::error::StoreError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;

pub async fn create_direct_chat(
	State(context): State<ApplicationContext>,
	Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
	Json(request): Json<DirectChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
	if request.user_id == user.uuid {
		return Err(ApiError::validation("Cannot open a direct chat with yourself"));
	}
	let Some(other) = context.store.get_user(request.user_id).await.map_err(ApiError::internal)? else {
		return Err(ApiError::NotFound("User"));
	};

	let chat = context
		.store
		.get_or_create_direct_chat(user.uuid, other.uuid, Utc::now())
		.await
		.map_err(ApiError::internal)?;
	let members = context.store.get_chat_members(chat.uuid).await.map_err(ApiError::internal)?;

	Ok(Json(ChatResponse::new(chat, members)))
}

pub async fn create_group_chat(
	State(context): State<ApplicationContext>,
	Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
	Json(request): Json<GroupChatRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), ApiError> {
	if request.name.trim().is_empty() || request.user_ids.is_empty() {
		return Err(ApiError::validation("Name and userIds array required"));
	}

	// the requester is always a member, listed or not
	let mut member_uuids = vec![user.uuid];
	for user_uuid in request.user_ids {
		if !member_uuids.contains(&user_uuid) {
			member_uuids.push(user_uuid);
		}
	}

	let chat = context
		.store
		.create_group_chat(request.name.trim(), &member_uuids, Utc::now())
		.await
		.map_err(|error| match error {
			StoreError::ForeignKeyViolation => ApiError::validation("Unknown member id"),
			other => ApiError::internal(other),
		})?;
	let members = context.store.get_chat_members(chat.uuid).await.map_err(ApiError::internal)?;

	Ok((StatusCode::CREATED, Json(ChatResponse::new(chat, members))))
}

pub async fn list_chats(
	State(context): State<ApplicationContext>,
	Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<ChatResponse>>, ApiError> {
	let chats = context
		.store
		.list_chats_for_user(user.uuid)
		.await
		.map_err(ApiError::internal)?;

	let mut responses = Vec::with_capacity(chats.len());
	for chat in chats {
		let members = context.store.get_chat_members(chat.uuid).await.map_err(ApiError::internal)?;
		responses.push(ChatResponse::new(chat, members));
	}

	Ok(Json(responses))
}

pub async fn list_other_users(
	State(context): State<ApplicationContext>,
	Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
	let users = context
		.store
		.list_users_except(user.uuid)
		.await
		.map_err(ApiError::internal)?;

	Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
