//! Feedback and contact messages sent in from the public site.

use serde_json::{json, Value};

use crate::errors::Result;
use crate::http::Body;
use crate::models::{Contact, Feedback};
use crate::store::{FilterKey, MutationPolicy, Resource, ResourceStore};

/// Feedback is moderated: publishing flips `is_published` in place.
pub struct Feedbacks;

impl Resource for Feedbacks {
    const NAME: &'static str = "feedback";
    const PATH: &'static str = "/feedback";
    const FILTERS: &'static [FilterKey] = &[FilterKey::same("is_published")];
    const POLICY: MutationPolicy = MutationPolicy::PatchById;

    type Item = Feedback;
    type Detail = Feedback;
}

pub struct Contacts;

impl Resource for Contacts {
    const NAME: &'static str = "contacts";
    const PATH: &'static str = "/contact";

    type Item = Contact;
    type Detail = Contact;
}

impl ResourceStore<Feedbacks> {
    /// PUT `/feedback/:id` with `{ is_published }`.
    pub async fn set_published(&self, id: i64, is_published: bool) -> Result<()> {
        self.track(
            self.client()
                .put::<Value>(&Feedbacks::item_path(id), Body::Json(json!({ "is_published": is_published }))),
        )
        .await
        .inspect_err(|e| tracing::error!(resource = Feedbacks::NAME, id, "Failed to update publish status: {}", e))?;

        self.patch_item(id, |feedback| feedback.is_published = is_published);
        self.patch_current(id, |feedback| feedback.is_published = is_published);
        Ok(())
    }
}
