use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An uploaded photo.
///
/// Deletion is a reversible flag (`deleted_at`). The comment column only ever
/// holds the user comment, so reading it never needs any marker stripping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub batch_id: String,
    pub original_url: String,
    pub thumbnail_url: String,
    pub uploader_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Upload instant in milliseconds since the Unix epoch
    pub uploaded_at: i64,
    /// Sort key within the batch (the upload instant)
    #[cfg_attr(feature = "sqlx", sqlx(rename = "order_index"))]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    /// Key of the stored original, used to read the bytes back for archives
    #[serde(skip)]
    pub storage_key: Option<String>,
    /// Soft-deletion instant; `None` while the photo is visible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

impl Photo {
    /// True iff the photo is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The user comment, independent of deletion state.
    pub fn effective_comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Flip the deletion flag.
    ///
    /// Deleting keeps `explicit_comment`, falling back to the current comment.
    /// Restoring stores `explicit_comment` as-is, so a caller that wants the
    /// comment to survive a restore must pass it back in.
    pub fn set_deleted(&mut self, deleted: bool, explicit_comment: Option<String>, now: i64) {
        if deleted {
            if explicit_comment.is_some() {
                self.comment = explicit_comment;
            }
            self.deleted_at = Some(self.deleted_at.unwrap_or(now));
        } else {
            self.comment = explicit_comment;
            self.deleted_at = None;
        }
    }

    /// Name used for the file in exports and archives.
    pub fn export_filename(&self) -> String {
        self.original_filename
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("photo-{}.jpg", self.id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoResponse {
    pub success: bool,
    pub photo: Photo,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPhotosResponse {
    pub photos: Vec<Photo>,
    pub total_count: i64,
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TogglePhotoDeletedRequest {
    #[serde(default)]
    pub photo_id: Option<String>,
    #[serde(default)]
    pub deleted: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TogglePhotoDeletedResponse {
    pub success: bool,
    pub photo_id: String,
    pub deleted: bool,
}

/// Payload of one `data:` frame on the live stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamEvent {
    /// A newly uploaded photo; the photo fields are inlined next to `type`
    Photo(Photo),
    /// Current number of visible photos
    TotalCount { count: i64 },
    /// The server could not produce part of the stream
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(comment: Option<&str>) -> Photo {
        Photo {
            id: "P1".to_string(),
            batch_id: "B1".to_string(),
            original_url: "https://cdn.example.com/photos/B1/P1.jpg".to_string(),
            thumbnail_url: "https://cdn.example.com/thumbnails/B1/P1.jpg".to_string(),
            uploader_name: "Alice".to_string(),
            comment: comment.map(String::from),
            uploaded_at: 1_000,
            order: 1_000,
            original_filename: None,
            storage_key: Some("photos/B1/P1.jpg".to_string()),
            deleted_at: None,
        }
    }

    #[test]
    fn test_delete_then_restore_round_trip() {
        let mut p = photo(Some("hello"));
        p.set_deleted(true, None, 5_000);
        assert!(p.is_deleted());
        assert_eq!(p.effective_comment(), Some("hello"));

        let current = p.effective_comment().map(String::from);
        p.set_deleted(false, current, 6_000);
        assert!(!p.is_deleted());
        assert_eq!(p.effective_comment(), Some("hello"));
    }

    #[test]
    fn test_delete_always_marks_deleted() {
        for comment in [None, Some(""), Some("__DELETED__"), Some("__DELETED__party")] {
            let mut p = photo(comment);
            p.set_deleted(true, None, 5_000);
            assert!(p.is_deleted(), "comment {:?}", comment);
        }
    }

    #[test]
    fn test_user_comment_with_marker_prefix_is_not_deleted() {
        let p = photo(Some("__DELETED__ is my favourite band"));
        assert!(!p.is_deleted());
        assert_eq!(p.effective_comment(), Some("__DELETED__ is my favourite band"));
    }

    #[test]
    fn test_restore_without_explicit_comment_clears_it() {
        let mut p = photo(Some("hello"));
        p.set_deleted(true, None, 5_000);
        p.set_deleted(false, None, 6_000);
        assert!(!p.is_deleted());
        assert_eq!(p.effective_comment(), None);
    }

    #[test]
    fn test_delete_keeps_first_deletion_instant() {
        let mut p = photo(None);
        p.set_deleted(true, None, 5_000);
        p.set_deleted(true, Some("again".to_string()), 9_000);
        assert_eq!(p.deleted_at, Some(5_000));
        assert_eq!(p.effective_comment(), Some("again"));
    }

    #[test]
    fn test_export_filename_default() {
        let mut p = photo(None);
        assert_eq!(p.export_filename(), "photo-P1.jpg");
        p.original_filename = Some("IMG_0001.HEIC".to_string());
        assert_eq!(p.export_filename(), "IMG_0001.HEIC");
    }

    #[test]
    fn test_stream_event_wire_format() {
        let event = StreamEvent::Photo(photo(None));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "photo");
        assert_eq!(json["id"], "P1");
        assert_eq!(json["batchId"], "B1");
        assert!(json.get("storageKey").is_none());

        let json = serde_json::to_value(StreamEvent::TotalCount { count: 7 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "totalCount", "count": 7}));
    }
}
