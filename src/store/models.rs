use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(FromRow, Clone, Debug, PartialEq, Eq)]
pub struct User {
	pub uuid: Uuid,
	pub name: String,
	pub email: String,
	pub password_hash: String,
	pub avatar_url: Option<String>,
	pub created_at: DateTime<Utc>,
}

#[derive(FromRow, Clone, Debug, PartialEq, Eq)]
pub struct Chat {
	pub uuid: Uuid,
	pub name: String,
	pub is_group: bool,
	pub updated_at: DateTime<Utc>,
}

#[derive(FromRow, Clone, Debug, PartialEq, Eq)]
pub struct Message {
	pub uuid: Uuid,
	pub chat_uuid: Uuid,
	pub sender_uuid: Uuid,
	pub text: Option<String>,
	pub media_path: Option<String>,
	pub created_at: DateTime<Utc>,
}

/// Flat join row so the message history needs a single query.
#[derive(FromRow, Clone, Debug, PartialEq, Eq)]
pub struct MessageWithSender {
	pub uuid: Uuid,
	pub chat_uuid: Uuid,
	pub sender_uuid: Uuid,
	pub text: Option<String>,
	pub media_path: Option<String>,
	pub created_at: DateTime<Utc>,
	pub sender_name: String,
	pub sender_email: String,
	pub sender_avatar_url: Option<String>,
}
