use crate::store::Store;
use crate::store::error::{IntoStoreResult, StoreError};
use crate::store::models::{Chat, Message, MessageWithSender, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqlitePool, migrate, query, query_as};
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteStore {
	pool: SqlitePool,
}

impl SqliteStore {
	pub async fn new(database_url: &str) -> Result<Self, StoreError> {
		let pool = SqlitePool::connect(database_url)
			.await
			.connection_error("Failed to connect to database")?;
		let store = Self { pool };
		store.migrate().await?;

		Ok(store)
	}

	async fn migrate(&self) -> Result<(), StoreError> {
		migrate!().run(&self.pool).await.map_err(Into::into)
	}

	async fn find_direct_chat(&self, key: &str) -> Result<Option<Chat>, StoreError> {
		query_as(r"SELECT uuid, name, is_group, updated_at FROM chat WHERE direct_key = ?1")
			.bind(key)
			.fetch_optional(&self.pool)
			.await
			.map_err(Into::into)
	}
}

/// Lookup key shared by both directions of a direct chat pair.
fn direct_key(a: Uuid, b: Uuid) -> String {
	let (first, second) = if a <= b { (a, b) } else { (b, a) };
	format!("{first}:{second}")
}

#[async_trait]
impl Store for SqliteStore {
	async fn create_user(
		&self,
		name: &str,
		email: &str,
		password_hash: &str,
		avatar_url: Option<&str>,
		created_at: DateTime<Utc>,
	) -> Result<User, StoreError> {
		let uuid = Uuid::new_v4();
		query_as(
			r"INSERT INTO user (uuid, name, email, password_hash, avatar_url, created_at)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6)
			RETURNING
				uuid,
				name,
				email,
				password_hash,
				avatar_url,
				created_at",
		)
		.bind(uuid)
		.bind(name)
		.bind(email)
		.bind(password_hash)
		.bind(avatar_url)
		.bind(created_at)
		.fetch_one(&self.pool)
		.await
		.map_err(Into::into)
	}

	async fn get_user(&self, user_uuid: Uuid) -> Result<Option<User>, StoreError> {
		query_as(r"SELECT uuid, name, email, password_hash, avatar_url, created_at FROM user WHERE uuid = ?1")
			.bind(user_uuid)
			.fetch_optional(&self.pool)
			.await
			.map_err(Into::into)
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
		query_as(r"SELECT uuid, name, email, password_hash, avatar_url, created_at FROM user WHERE email = ?1")
			.bind(email)
			.fetch_optional(&self.pool)
			.await
			.map_err(Into::into)
	}

	async fn list_users_except(&self, user_uuid: Uuid) -> Result<Vec<User>, StoreError> {
		query_as(
			r"SELECT uuid, name, email, password_hash, avatar_url, created_at
			FROM user
			WHERE uuid <> ?1
			ORDER BY name",
		)
		.bind(user_uuid)
		.fetch_all(&self.pool)
		.await
		.map_err(Into::into)
	}

	async fn get_chat(&self, chat_uuid: Uuid) -> Result<Option<Chat>, StoreError> {
		query_as(r"SELECT uuid, name, is_group, updated_at FROM chat WHERE uuid = ?1")
			.bind(chat_uuid)
			.fetch_optional(&self.pool)
			.await
			.map_err(Into::into)
	}

	async fn get_or_create_direct_chat(
		&self,
		requester_uuid: Uuid,
		other_uuid: Uuid,
		updated_at: DateTime<Utc>,
	) -> Result<Chat, StoreError> {
		let key = direct_key(requester_uuid, other_uuid);
		if let Some(chat) = self.find_direct_chat(&key).await? {
			return Ok(chat);
		}

		let uuid = Uuid::new_v4();
		let mut transaction = self.pool.begin().await?;
		let inserted = query(
			r"INSERT INTO chat (uuid, name, is_group, direct_key, updated_at)
			VALUES (?1, 'Direct Chat', FALSE, ?2, ?3)
			ON CONFLICT (direct_key) DO NOTHING",
		)
		.bind(uuid)
		.bind(&key)
		.bind(updated_at)
		.execute(&mut *transaction)
		.await?;

		if inserted.rows_affected() == 0 {
			// lost the race, another request created the chat in the meantime
			transaction.rollback().await?;
			return self.find_direct_chat(&key).await?.ok_or(StoreError::NotFound);
		}

		for (position, member_uuid) in [requester_uuid, other_uuid].into_iter().enumerate() {
			query(r"INSERT INTO chat_member (chat_uuid, user_uuid, position) VALUES (?1, ?2, ?3)")
				.bind(uuid)
				.bind(member_uuid)
				.bind(position as i64)
				.execute(&mut *transaction)
				.await?;
		}
		transaction.commit().await?;

		self.get_chat(uuid).await?.ok_or(StoreError::NotFound)
	}

	async fn create_group_chat(
		&self,
		name: &str,
		member_uuids: &[Uuid],
		updated_at: DateTime<Utc>,
	) -> Result<Chat, StoreError> {
		let uuid = Uuid::new_v4();
		let mut transaction = self.pool.begin().await?;
		let chat: Chat = query_as(
			r"INSERT INTO chat (uuid, name, is_group, updated_at)
			VALUES (?1, ?2, TRUE, ?3)
			RETURNING uuid, name, is_group, updated_at",
		)
		.bind(uuid)
		.bind(name)
		.bind(updated_at)
		.fetch_one(&mut *transaction)
		.await?;

		for (position, member_uuid) in member_uuids.iter().enumerate() {
			query(r"INSERT INTO chat_member (chat_uuid, user_uuid, position) VALUES (?1, ?2, ?3)")
				.bind(uuid)
				.bind(*member_uuid)
				.bind(position as i64)
				.execute(&mut *transaction)
				.await?;
		}
		transaction.commit().await?;

		Ok(chat)
	}

	async fn list_chats_for_user(&self, user_uuid: Uuid) -> Result<Vec<Chat>, StoreError> {
		query_as(
			r"SELECT chat.uuid, chat.name, chat.is_group, chat.updated_at
			FROM chat
			JOIN chat_member ON chat_member.chat_uuid = chat.uuid
			WHERE chat_member.user_uuid = ?1
			ORDER BY chat.updated_at DESC",
		)
		.bind(user_uuid)
		.fetch_all(&self.pool)
		.await
		.map_err(Into::into)
	}

	async fn get_chat_members(&self, chat_uuid: Uuid) -> Result<Vec<User>, StoreError> {
		query_as(
			r"SELECT user.uuid, user.name, user.email, user.password_hash, user.avatar_url, user.created_at
			FROM user
			JOIN chat_member ON chat_member.user_uuid = user.uuid
			WHERE chat_member.chat_uuid = ?1
			ORDER BY chat_member.position",
		)
		.bind(chat_uuid)
		.fetch_all(&self.pool)
		.await
		.map_err(Into::into)
	}

	async fn create_message(
		&self,
		chat_uuid: Uuid,
		sender_uuid: Uuid,
		text: Option<&str>,
		media_path: Option<&str>,
		created_at: DateTime<Utc>,
	) -> Result<Message, StoreError> {
		let uuid = Uuid::new_v4();
		let mut transaction = self.pool.begin().await?;
		let message: Message = query_as(
			r"INSERT INTO message (uuid, chat_uuid, sender_uuid, text, media_path, created_at)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6)
			RETURNING uuid, chat_uuid, sender_uuid, text, media_path, created_at",
		)
		.bind(uuid)
		.bind(chat_uuid)
		.bind(sender_uuid)
		.bind(text)
		.bind(media_path)
		.bind(created_at)
		.fetch_one(&mut *transaction)
		.await?;

		query(r"UPDATE chat SET updated_at = ?1 WHERE uuid = ?2")
			.bind(created_at)
			.bind(chat_uuid)
			.execute(&mut *transaction)
			.await?;
		transaction.commit().await?;

		Ok(message)
	}

	async fn list_messages(&self, chat_uuid: Uuid) -> Result<Vec<MessageWithSender>, StoreError> {
		query_as(
			r"SELECT
				message.uuid,
				message.chat_uuid,
				message.sender_uuid,
				message.text,
				message.media_path,
				message.created_at,
				user.name AS sender_name,
				user.email AS sender_email,
				user.avatar_url AS sender_avatar_url
			FROM message
			JOIN user ON user.uuid = message.sender_uuid
			WHERE message.chat_uuid = ?1
			ORDER BY message.created_at, message.rowid",
		)
		.bind(chat_uuid)
		.fetch_all(&self.pool)
		.await
		.map_err(Into::into)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[tokio::test]
	async fn creates_and_fetches_user() {
		let store = store().await;

		let created = store
			.create_user("Alice", "alice@x.com", "hash", Some("/uploads/alice.png"), at(0))
			.await
			.expect("Failed to create user");

		assert_eq!(4, created.uuid.get_version_num());
		assert_eq!("Alice", created.name);
		assert_eq!("alice@x.com", created.email);
		assert_eq!(Some("/uploads/alice.png".to_string()), created.avatar_url);

		let by_uuid = store
			.get_user(created.uuid)
			.await
			.expect("Failed to get user")
			.expect("User not found");
		assert_eq!(created, by_uuid);

		let by_email = store
			.get_user_by_email("alice@x.com")
			.await
			.expect("Failed to get user by email")
			.expect("User not found by email");
		assert_eq!(created, by_email);
	}

	#[tokio::test]
	async fn rejects_a_second_user_with_the_same_email() {
		let store = store().await;
		user(&store, "Alice", "alice@x.com").await;

		let result = store.create_user("Impostor", "alice@x.com", "hash", None, at(1)).await;

		assert!(matches!(result, Err(StoreError::UniqueViolation)));

		let users = store.list_users_except(Uuid::new_v4()).await.expect("Failed to list users");
		assert_eq!(1, users.len());
	}

	#[tokio::test]
	async fn lists_users_except_the_requester() {
		let store = store().await;
		let alice = user(&store, "Alice", "alice@x.com").await;
		let bob = user(&store, "Bob", "bob@x.com").await;

		let users = store.list_users_except(alice.uuid).await.expect("Failed to list users");

		assert_eq!(vec![bob], users);
	}

	#[tokio::test]
	async fn get_or_create_direct_chat_is_idempotent() {
		let store = store().await;
		let alice = user(&store, "Alice", "alice@x.com").await;
		let bob = user(&store, "Bob", "bob@x.com").await;

		let first = store
			.get_or_create_direct_chat(alice.uuid, bob.uuid, at(0))
			.await
			.expect("Failed to create direct chat");
		let second = store
			.get_or_create_direct_chat(alice.uuid, bob.uuid, at(1))
			.await
			.expect("Failed to get direct chat");

		assert_eq!(first.uuid, second.uuid);
		assert!(!first.is_group);
	}

	#[tokio::test]
	async fn direct_chat_is_shared_by_both_directions_of_the_pair() {
		let store = store().await;
		let alice = user(&store, "Alice", "alice@x.com").await;
		let bob = user(&store, "Bob", "bob@x.com").await;

		let from_alice = store
			.get_or_create_direct_chat(alice.uuid, bob.uuid, at(0))
			.await
			.expect("Failed to create direct chat");
		let from_bob = store
			.get_or_create_direct_chat(bob.uuid, alice.uuid, at(1))
			.await
			.expect("Failed to get direct chat");

		assert_eq!(from_alice.uuid, from_bob.uuid);

		let members = store
			.get_chat_members(from_alice.uuid)
			.await
			.expect("Failed to get members");
		assert_eq!(vec![alice, bob], members);
	}

	#[tokio::test]
	async fn creates_group_chat_with_members_in_order() {
		let store = store().await;
		let alice = user(&store, "Alice", "alice@x.com").await;
		let bob = user(&store, "Bob", "bob@x.com").await;
		let carol = user(&store, "Carol", "carol@x.com").await;

		let chat = store
			.create_group_chat("the gang", &[alice.uuid, carol.uuid, bob.uuid], at(0))
			.await
			.expect("Failed to create group chat");

		assert!(chat.is_group);
		assert_eq!("the gang", chat.name);

		let members = store.get_chat_members(chat.uuid).await.expect("Failed to get members");
		assert_eq!(vec![alice, carol, bob], members);
	}

	#[tokio::test]
	async fn rejects_group_chat_with_unknown_member() {
		let store = store().await;
		let alice = user(&store, "Alice", "alice@x.com").await;

		let result = store.create_group_chat("ghosts", &[alice.uuid, Uuid::new_v4()], at(0)).await;

		assert!(matches!(result, Err(StoreError::ForeignKeyViolation)));
	}

	#[tokio::test]
	async fn lists_chats_most_recently_updated_first() {
		let store = store().await;
		let alice = user(&store, "Alice", "alice@x.com").await;
		let bob = user(&store, "Bob", "bob@x.com").await;
		let carol = user(&store, "Carol", "carol@x.com").await;

		let with_bob = store
			.get_or_create_direct_chat(alice.uuid, bob.uuid, at(0))
			.await
			.expect("Failed to create direct chat");
		let with_carol = store
			.get_or_create_direct_chat(alice.uuid, carol.uuid, at(1))
			.await
			.expect("Failed to create direct chat");

		// a new message in the older chat moves it back to the front
		store
			.create_message(with_bob.uuid, bob.uuid, Some("hi"), None, at(2))
			.await
			.expect("Failed to create message");

		let chats = store.list_chats_for_user(alice.uuid).await.expect("Failed to list chats");
		let chat_uuids: Vec<_> = chats.iter().map(|chat| chat.uuid).collect();
		assert_eq!(vec![with_bob.uuid, with_carol.uuid], chat_uuids);
		assert_eq!(at(2), chats[0].updated_at);
	}

	#[tokio::test]
	async fn rejects_message_for_unknown_chat() {
		let store = store().await;
		let alice = user(&store, "Alice", "alice@x.com").await;

		let result = store
			.create_message(Uuid::new_v4(), alice.uuid, Some("hello?"), None, at(0))
			.await;

		assert!(matches!(result, Err(StoreError::ForeignKeyViolation)));
	}

	#[tokio::test]
	async fn lists_messages_chronologically_with_senders() {
		let store = store().await;
		let alice = user(&store, "Alice", "alice@x.com").await;
		let bob = user(&store, "Bob", "bob@x.com").await;
		let chat = store
			.get_or_create_direct_chat(alice.uuid, bob.uuid, at(0))
			.await
			.expect("Failed to create direct chat");

		// inserted out of order on purpose
		store
			.create_message(chat.uuid, bob.uuid, Some("second"), None, at(2))
			.await
			.expect("Failed to create message");
		store
			.create_message(chat.uuid, alice.uuid, Some("first"), None, at(1))
			.await
			.expect("Failed to create message");
		store
			.create_message(chat.uuid, alice.uuid, None, Some("/uploads/cat-3.png"), at(3))
			.await
			.expect("Failed to create message");

		let messages = store.list_messages(chat.uuid).await.expect("Failed to list messages");

		let texts: Vec<_> = messages.iter().map(|message| message.text.clone()).collect();
		assert_eq!(vec![Some("first".to_string()), Some("second".to_string()), None], texts);
		assert_eq!("Alice", messages[0].sender_name);
		assert_eq!("Bob", messages[1].sender_name);
		assert_eq!(Some("/uploads/cat-3.png".to_string()), messages[2].media_path);
	}

	#[tokio::test]
	async fn messages_in_other_chats_are_not_listed() {
		let store = store().await;
		let alice = user(&store, "Alice", "alice@x.com").await;
		let bob = user(&store, "Bob", "bob@x.com").await;
		let carol = user(&store, "Carol", "carol@x.com").await;
		let with_bob = store
			.get_or_create_direct_chat(alice.uuid, bob.uuid, at(0))
			.await
			.expect("Failed to create direct chat");
		let with_carol = store
			.get_or_create_direct_chat(alice.uuid, carol.uuid, at(0))
			.await
			.expect("Failed to create direct chat");

		store
			.create_message(with_bob.uuid, alice.uuid, Some("for bob"), None, at(1))
			.await
			.expect("Failed to create message");

		let messages = store.list_messages(with_carol.uuid).await.expect("Failed to list messages");
		assert!(messages.is_empty());
	}

	async fn store() -> SqliteStore {
		SqliteStore::new("sqlite::memory:")
			.await
			.expect("Failed to create in-memory SQLite database")
	}

	async fn user(store: &SqliteStore, name: &str, email: &str) -> User {
		store
			.create_user(name, email, "hash", None, at(0))
			.await
			.expect("Failed to create user")
	}

	fn at(second: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, second).unwrap()
	}
}
