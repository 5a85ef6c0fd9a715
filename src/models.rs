//! Internal schema for everything the two collaborators return.
//!
//! The backing store and the API are loose about field spelling
//! (`workId`/`id`, `avatarUrl`/`avatar_url`, `updatedAt`/`updated_at`), so
//! each type normalizes the known alternates through serde aliases here, at
//! the decode boundary. Anything that still fails to match is surfaced as
//! [`crate::Error::Decode`] rather than patched up at call sites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Identified;

/// Lifecycle of a work. Removal is a status transition driven by moderation,
/// never a physical delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    #[default]
    Draft,
    Published,
    Removed,
}

/// A tag reference on a work. Many-to-many with works; names are unique
/// within one work's tag list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "tagId", alias = "id")]
    pub tag_id: String,
    pub name: String,
}

/// One media item attached to a work. By convention the first item of a
/// work's media list is its thumbnail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "fileurl")]
    pub file_url: String,
    #[serde(rename = "filetype", default)]
    pub file_type: Option<String>,
    #[serde(rename = "alttext", default)]
    pub alt_text: Option<String>,
}

/// A work as returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    #[serde(rename = "workId", alias = "id")]
    pub work_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: WorkStatus,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(rename = "created_at", alias = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "updated_at", default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(alias = "published_at", default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Present only on rows from the viewer's saved list.
    #[serde(alias = "saved_at", default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Work {
    /// Tag names in display order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.name.as_str())
    }
}

impl Identified for Work {
    fn id(&self) -> &str {
        &self.work_id
    }
}

/// A work as returned by the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDetail {
    #[serde(flatten)]
    pub work: Work,
    #[serde(default)]
    pub save_count: u64,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub author_profile: Option<PublicProfile>,
}

impl WorkDetail {
    /// URL of the image to lead with: the first media item, else the
    /// stored thumbnail.
    pub fn hero_url(&self) -> Option<&str> {
        self.media
            .first()
            .map(|m| m.file_url.as_str())
            .or(self.work.thumbnail.as_deref())
    }
}

/// The public-facing identity attached to an account. Distinct from the
/// private session record ([`SessionUser`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    #[serde(rename = "userID", alias = "userId", alias = "user_id", default)]
    pub user_id: Option<String>,
    #[serde(alias = "display_name", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(alias = "avatarurl", alias = "avatar_url", default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "created_at", alias = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The private session record for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(alias = "display_name", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub admin: bool,
}

/// Saved flag plus aggregate save count for one (work, viewer) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SaveSummary {
    pub saved: bool,
    pub count: u64,
}

/// Moderation status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Finished,
    Rejected,
}

/// A report row in the backing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub reporter_id: String,
    pub work_id: String,
    /// Comma-joined human-readable reason labels.
    pub reason: String,
    #[serde(default)]
    pub detail: Option<String>,
    pub status: ReportStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Report {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Insert payload for a new report. The store assigns id and timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct NewReport {
    pub reporter_id: String,
    pub work_id: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub status: ReportStatus,
}

/// The recorded outcome of a moderator's decision on a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAction {
    pub id: String,
    pub report_id: String,
    /// Human-readable decision label, e.g. "ลบโพสต์".
    pub decision: String,
    #[serde(default)]
    pub note: Option<String>,
    pub actor_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for a review action.
#[derive(Debug, Clone, Serialize)]
pub struct NewReviewAction {
    pub report_id: String,
    pub decision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub actor_id: String,
}

/// An account row, joined into the moderation queue for reporter contact
/// details and used for the "joined" date on creator pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Account {
    fn id(&self) -> &str {
        &self.id
    }
}
