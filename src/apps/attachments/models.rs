use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use taskflow_core::exception::{Error, Result};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
	pub id: String,
	pub file_name: String,
	pub file_url: String,
	pub file_size: i64,
	pub mime_type: String,
	pub task_id: String,
	pub uploaded_by_id: Option<String>,
	pub created_at: DateTime<Utc>,
}

impl Attachment {
	pub async fn get(pool: &SqlitePool, id: &str) -> Result<Attachment> {
		sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?
			.ok_or_else(|| Error::NotFound("Attachment not found".to_string()))
	}
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttachmentRequest {
	#[validate(length(min = 1, max = 255, message = "fileName must be between 1 and 255 characters"))]
	pub file_name: String,
	#[validate(url(message = "fileUrl must be a URL"))]
	pub file_url: String,
	#[validate(range(min = 0, message = "fileSize must not be negative"))]
	pub file_size: i64,
	#[validate(length(min = 1, message = "mimeType should not be empty"))]
	pub mime_type: String,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn request(file_url: &str, file_size: i64) -> CreateAttachmentRequest {
		CreateAttachmentRequest {
			file_name: "mockup.pdf".into(),
			file_url: file_url.into(),
			file_size,
			mime_type: "application/pdf".into(),
		}
	}

	#[rstest]
	#[case("https://files.example.com/mockup.pdf", 1024, true)]
	#[case("not a url", 1024, false)]
	#[case("https://files.example.com/mockup.pdf", -1, false)]
	fn test_create_request_validation(#[case] url: &str, #[case] size: i64, #[case] valid: bool) {
		assert_eq!(request(url, size).validate().is_ok(), valid);
	}
}
