//! Typed operations against the application API.
//!
//! Thin wrappers over [`ApiClient`]: one function per endpoint, payload
//! structs next to the operation that sends them.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    api::ApiClient,
    models::{PublicProfile, SaveSummary, SessionUser, Tag, Work, WorkDetail},
};

/// List all published works for the home gallery.
pub async fn list_works(api: &ApiClient) -> Result<Vec<Work>> {
    api.get("/works").await
}

/// Fetch one work with media, tags, save count, and author profile.
pub async fn get_work(api: &ApiClient, work_id: &str) -> Result<WorkDetail> {
    api.get(&format!("/works/{work_id}")).await
}

/// A creator page: public profile plus their published works.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorPage {
    #[serde(default)]
    pub profile: Option<PublicProfile>,
    #[serde(default)]
    pub works: Vec<Work>,
}

/// Fetch a creator's public profile and works.
pub async fn author_page(api: &ApiClient, user_id: &str) -> Result<AuthorPage> {
    api.get(&format!("/works/author/{user_id}")).await
}

/// List the signed-in user's own works, drafts included.
pub async fn my_works(api: &ApiClient) -> Result<Vec<Work>> {
    api.get("/works/my").await
}

/// List the works the signed-in user has saved.
pub async fn saved_works(api: &ApiClient) -> Result<Vec<Work>> {
    api.get("/works/saved").await
}

/// A media entry in a create/update payload: either an already-uploaded item
/// kept by id, or a new upload as a data URL.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MediaUpdate {
    Existing {
        id: String,
        #[serde(rename = "alttext", skip_serializing_if = "Option::is_none")]
        alt_text: Option<String>,
    },
    Upload {
        #[serde(rename = "dataUrl")]
        data_url: String,
        #[serde(rename = "alttext", skip_serializing_if = "Option::is_none")]
        alt_text: Option<String>,
    },
}

/// Create/update payload for a work. Existing tags travel as ids, new tags
/// as names; the media list is ordered, first item becoming the thumbnail.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: crate::models::WorkStatus,
    pub tag_ids: Vec<String>,
    pub new_tags: Vec<String>,
    pub media: Vec<MediaUpdate>,
}

impl WorkDraft {
    /// Attach a tag by name, keeping the visible tag list unique
    /// (case-insensitive). Known tags go into `tag_ids`; unknown names are
    /// created server-side via `new_tags`.
    pub fn add_tag(&mut self, name: &str, known: &[Tag]) -> bool {
        let name = name.trim();
        if name.is_empty() || self.has_tag(name, known) {
            return false;
        }
        match known
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
        {
            Some(tag) => self.tag_ids.push(tag.tag_id.clone()),
            None => self.new_tags.push(name.to_owned()),
        }
        true
    }

    fn has_tag(&self, name: &str, known: &[Tag]) -> bool {
        self.new_tags.iter().any(|n| n.eq_ignore_ascii_case(name))
            || self.tag_ids.iter().any(|id| {
                known
                    .iter()
                    .any(|t| t.tag_id == *id && t.name.eq_ignore_ascii_case(name))
            })
    }
}

/// Create a new work, returning the stored detail.
pub async fn create_work(api: &ApiClient, draft: &WorkDraft) -> Result<WorkDetail> {
    api.post("/works", draft).await
}

/// Update a work, then re-fetch the fresh detail so callers reconcile from
/// what the server actually stored.
pub async fn update_work(api: &ApiClient, work_id: &str, draft: &WorkDraft) -> Result<WorkDetail> {
    let _: serde_json::Value = api.put(&format!("/works/{work_id}"), draft).await?;
    get_work(api, work_id).await
}

/// Delete a work owned by the signed-in user.
pub async fn delete_work(api: &ApiClient, work_id: &str) -> Result<()> {
    api.delete(&format!("/works/{work_id}")).await
}

/// Search tags by name substring, for the tag picker.
pub async fn search_tags(api: &ApiClient, query: &str) -> Result<Vec<Tag>> {
    let mut path = String::from("/works/meta/tags?q=");
    path.extend(url::form_urlencoded::byte_serialize(query.as_bytes()));
    api.get(&path).await
}

/// Saved flag and aggregate count for the viewer.
pub async fn save_summary(api: &ApiClient, work_id: &str) -> Result<SaveSummary> {
    api.get(&format!("/works/{work_id}/save")).await
}

/// Toggle the viewer's save on a work. The response carries the
/// authoritative flag and count.
pub async fn toggle_save(api: &ApiClient, work_id: &str) -> Result<SaveSummary> {
    api.post(&format!("/works/{work_id}/save"), &serde_json::json!({}))
        .await
}

/// Fetch the private session record.
pub async fn current_user(api: &ApiClient) -> Result<SessionUser> {
    api.get("/auth/me").await
}

/// Fetch the signed-in user's public profile.
pub async fn public_profile(api: &ApiClient) -> Result<PublicProfile> {
    api.get("/auth/profile").await
}

/// Editable public profile fields. `avatar` is a data URL; the server stores
/// the file and serves back a signed URL on the next profile fetch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Update the public profile, then re-fetch it for the reconciled view.
pub async fn update_profile(api: &ApiClient, update: &ProfileUpdate) -> Result<PublicProfile> {
    let _: serde_json::Value = api.patch("/auth/me", update).await?;
    public_profile(api).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: &str, name: &str) -> Tag {
        Tag {
            tag_id: id.to_owned(),
            name: name.to_owned(),
        }
    }

    #[test]
    fn add_tag_keeps_names_unique_case_insensitively() {
        let known = vec![tag("t1", "Branding")];
        let mut draft = WorkDraft::default();

        assert!(draft.add_tag("branding", &known));
        assert_eq!(draft.tag_ids, vec!["t1".to_owned()]);

        // Same name again, any casing, is a no-op.
        assert!(!draft.add_tag("BRANDING", &known));
        assert_eq!(draft.tag_ids.len(), 1);

        // Unknown names become new tags, once.
        assert!(draft.add_tag("Posters", &known));
        assert!(!draft.add_tag("posters", &known));
        assert_eq!(draft.new_tags, vec!["Posters".to_owned()]);
    }

    #[test]
    fn blank_tag_names_are_rejected() {
        let mut draft = WorkDraft::default();
        assert!(!draft.add_tag("   ", &[]));
        assert!(draft.tag_ids.is_empty() && draft.new_tags.is_empty());
    }
}
