use crate::store::models::{Chat, Message, MessageWithSender, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The public view of a user. The password hash is excluded by construction,
/// this type has no field for it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserResponse {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	pub avatar: Option<String>,
}

impl From<User> for UserResponse {
	fn from(user: User) -> Self {
		Self {
			id: user.uuid,
			name: user.name,
			email: user.email,
			avatar: user.avatar_url,
		}
	}
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AuthResponse {
	#[serde(flatten)]
	pub user: UserResponse,
	pub token: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatResponse {
	pub id: Uuid,
	pub name: String,
	pub is_group: bool,
	pub members: Vec<UserResponse>,
	pub updated_at: DateTime<Utc>,
}

impl ChatResponse {
	pub fn new(chat: Chat, members: Vec<User>) -> Self {
		Self {
			id: chat.uuid,
			name: chat.name,
			is_group: chat.is_group,
			members: members.into_iter().map(UserResponse::from).collect(),
			updated_at: chat.updated_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct MessageResponse {
	pub id: Uuid,
	pub chat_id: Uuid,
	pub sender: UserResponse,
	pub content: Option<String>,
	pub media: Option<String>,
	pub created_at: DateTime<Utc>,
}

impl MessageResponse {
	pub fn new(message: Message, sender: UserResponse) -> Self {
		Self {
			id: message.uuid,
			chat_id: message.chat_uuid,
			sender,
			content: message.text,
			media: message.media_path,
			created_at: message.created_at,
		}
	}
}

impl From<MessageWithSender> for MessageResponse {
	fn from(message: MessageWithSender) -> Self {
		Self {
			id: message.uuid,
			chat_id: message.chat_uuid,
			sender: UserResponse {
				id: message.sender_uuid,
				name: message.sender_name,
				email: message.sender_email,
				avatar: message.sender_avatar_url,
			},
			content: message.text,
			media: message.media_path,
			created_at: message.created_at,
		}
	}
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
	pub name: String,
	pub email: String,
	pub password: String,
	#[serde(default)]
	pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DirectChatRequest {
	#[serde(rename = "userId")]
	pub user_id: Uuid,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GroupChatRequest {
	pub name: String,
	#[serde(rename = "userIds")]
	pub user_ids: Vec<Uuid>,
}
