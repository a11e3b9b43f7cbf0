use chrono::{DateTime, Utc};
use mime::Mime;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Media types accepted for upload. Anything else is dropped without an
/// error, the message is then persisted without an attachment.
const ALLOWED_MEDIA_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/jpg", "image/gif"];

#[derive(Clone)]
pub struct MediaStore {
	directory: PathBuf,
}

#[derive(Error, Debug)]
#[error("Failed to store media file: {0}")]
pub struct MediaError(#[from] std::io::Error);

impl MediaStore {
	pub fn new(directory: impl Into<PathBuf>) -> Self {
		Self {
			directory: directory.into(),
		}
	}

	pub async fn ensure_directory(&self) -> std::io::Result<()> {
		tokio::fs::create_dir_all(&self.directory).await
	}

	pub fn is_allowed(content_type: Option<&str>) -> bool {
		content_type
			.and_then(|content_type| content_type.parse::<Mime>().ok())
			.is_some_and(|mime| ALLOWED_MEDIA_TYPES.contains(&mime.essence_str()))
	}

	/// Stores the file and returns its server-relative path, or None when the
	/// content type is not in the allow-list.
	pub async fn save(
		&self,
		original_name: &str,
		content_type: Option<&str>,
		bytes: &[u8],
		at: DateTime<Utc>,
	) -> Result<Option<String>, MediaError> {
		if !Self::is_allowed(content_type) {
			return Ok(None);
		}

		let file_name = generated_file_name(original_name, at);
		tokio::fs::write(self.directory.join(&file_name), bytes).await?;

		Ok(Some(format!("/uploads/{file_name}")))
	}
}

/// `<sanitized stem>-<unix millis><extension>` from the client-supplied name.
/// Only the last path component of the original name is used.
fn generated_file_name(original_name: &str, at: DateTime<Utc>) -> String {
	let path = Path::new(original_name);
	let stem: String = path
		.file_stem()
		.and_then(|stem| stem.to_str())
		.unwrap_or_default()
		.split_whitespace()
		.collect::<Vec<_>>()
		.join("_");
	let stem = if stem.is_empty() { "upload".to_string() } else { stem };
	let extension = path
		.extension()
		.and_then(|extension| extension.to_str())
		.map(|extension| format!(".{extension}"))
		.unwrap_or_default();

	format!("{stem}-{timestamp}{extension}", timestamp = at.timestamp_millis())
}

#[cfg(test)]
mod test {
	use super::*;
	use chrono::TimeZone;
	use uuid::Uuid;

	#[tokio::test]
	async fn should_store_an_allowed_file_and_return_its_path() {
		let media_store = media_store().await;

		let path = media_store
			.save("cat.png", Some("image/png"), b"pretend png", at())
			.await
			.expect("Failed to save media")
			.expect("Allowed media was dropped");

		assert_eq!("/uploads/cat-1767225600000.png", path);

		let file_name = path.strip_prefix("/uploads/").unwrap();
		let stored = tokio::fs::read(media_store.directory.join(file_name))
			.await
			.expect("Stored file not found");
		assert_eq!(b"pretend png".to_vec(), stored);
	}

	#[tokio::test]
	async fn should_silently_drop_disallowed_content_types() {
		let media_store = media_store().await;

		let path = media_store
			.save("script.html", Some("text/html"), b"<script/>", at())
			.await
			.expect("Failed to run save");

		assert_eq!(None, path);

		let mut entries = tokio::fs::read_dir(&media_store.directory)
			.await
			.expect("Failed to read uploads directory");
		assert!(entries.next_entry().await.expect("Failed to read entry").is_none());
	}

	#[tokio::test]
	async fn should_drop_files_without_a_content_type() {
		let media_store = media_store().await;

		let path = media_store
			.save("mystery", None, b"???", at())
			.await
			.expect("Failed to run save");

		assert_eq!(None, path);
	}

	#[test]
	fn should_sanitize_whitespace_in_file_names() {
		assert_eq!("My_Cat-1767225600000.png", generated_file_name("My Cat.png", at()));
	}

	#[test]
	fn should_use_only_the_last_path_component() {
		assert_eq!(
			"passwd-1767225600000",
			generated_file_name("../../etc/passwd", at())
		);
	}

	#[test]
	fn should_fall_back_to_a_generic_stem() {
		assert_eq!("upload-1767225600000", generated_file_name("", at()));
	}

	async fn media_store() -> MediaStore {
		let directory = std::env::temp_dir().join(format!("palaver-media-test-{}", Uuid::new_v4()));
		let media_store = MediaStore::new(&directory);
		media_store
			.ensure_directory()
			.await
			.expect("Failed to create temporary uploads directory");
		media_store
	}

	fn at() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
	}
}
