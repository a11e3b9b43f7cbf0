use crate::store::error::StoreError;
use crate::store::models::{Chat, Message, MessageWithSender, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod error;
pub mod models;
pub mod sqlite;

#[async_trait]
pub trait Store: Send + Sync {
	async fn create_user(
		&self,
		name: &str,
		email: &str,
		password_hash: &str,
		avatar_url: Option<&str>,
		created_at: DateTime<Utc>,
	) -> Result<User, StoreError>;
	async fn get_user(&self, user_uuid: Uuid) -> Result<Option<User>, StoreError>;
	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
	async fn list_users_except(&self, user_uuid: Uuid) -> Result<Vec<User>, StoreError>;
	async fn get_chat(&self, chat_uuid: Uuid) -> Result<Option<Chat>, StoreError>;
	/// Finds the direct chat for the unordered pair or creates it. Concurrent
	/// calls for the same pair converge on a single chat.
	async fn get_or_create_direct_chat(
		&self,
		requester_uuid: Uuid,
		other_uuid: Uuid,
		updated_at: DateTime<Utc>,
	) -> Result<Chat, StoreError>;
	async fn create_group_chat(
		&self,
		name: &str,
		member_uuids: &[Uuid],
		updated_at: DateTime<Utc>,
	) -> Result<Chat, StoreError>;
	async fn list_chats_for_user(&self, user_uuid: Uuid) -> Result<Vec<Chat>, StoreError>;
	async fn get_chat_members(&self, chat_uuid: Uuid) -> Result<Vec<User>, StoreError>;
	/// Persists a message and bumps the parent chat's `updated_at` in the same
	/// transaction.
	async fn create_message(
		&self,
		chat_uuid: Uuid,
		sender_uuid: Uuid,
		text: Option<&str>,
		media_path: Option<&str>,
		created_at: DateTime<Utc>,
	) -> Result<Message, StoreError>;
	async fn list_messages(&self, chat_uuid: Uuid) -> Result<Vec<MessageWithSender>, StoreError>;
}
