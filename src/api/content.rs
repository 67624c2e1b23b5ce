//! News, news categories, banners, popups and laws.

use serde_json::{json, Value};

use crate::errors::{ApiError, Result};
use crate::http::{Body, FilePart, FormPayload};
use crate::models::{
    Banner, BannerRequest, Law, LawRequest, NameText, News, NewsCategory, NewsRequest, Popup,
    PopupRequest, Translated,
};
use crate::store::{FilterKey, MutationPolicy, Resource, ResourceStore};

/// Store-facing visibility/status filters shared by banners and popups.
const VISIBILITY_FILTERS: &[FilterKey] = &[
    FilterKey::new("visibility", "is_private"),
    FilterKey::new("status", "is_inactive"),
];

pub struct NewsList;

impl Resource for NewsList {
    const NAME: &'static str = "news";
    const PATH: &'static str = "/news";
    const FILTERS: &'static [FilterKey] = &[
        FilterKey::same("category_id").with_wildcard("all"),
        FilterKey::same("status").with_wildcard("all"),
    ];

    type Item = News;
    type Detail = News;
}

pub struct NewsCategories;

impl Resource for NewsCategories {
    const NAME: &'static str = "news-categories";
    const PATH: &'static str = "/news-categories";

    type Item = NewsCategory;
    type Detail = NewsCategory;
}

/// Hero banners. Updates and visibility changes patch the loaded record.
pub struct Banners;

impl Resource for Banners {
    const NAME: &'static str = "banners";
    const PATH: &'static str = "/banner-hero";
    const FILTERS: &'static [FilterKey] = VISIBILITY_FILTERS;
    const POLICY: MutationPolicy = MutationPolicy::PatchById;

    type Item = Banner;
    type Detail = Banner;
}

/// Popups. Updates and status changes patch the loaded record.
pub struct Popups;

impl Resource for Popups {
    const NAME: &'static str = "popups";
    const PATH: &'static str = "/popup";
    const FILTERS: &'static [FilterKey] = VISIBILITY_FILTERS;
    const POLICY: MutationPolicy = MutationPolicy::PatchById;

    type Item = Popup;
    type Detail = Popup;
}

pub struct Laws;

impl Resource for Laws {
    const NAME: &'static str = "laws";
    const PATH: &'static str = "/law";

    type Item = Law;
    type Detail = Law;
}

/// JSON when there is no thumbnail, multipart otherwise.
fn news_body(request: &NewsRequest, thumbnail: Option<FilePart>) -> Result<Body> {
    if request.translates.is_empty() {
        return Err(ApiError::Validation("At least one translation is required".to_string()));
    }
    match thumbnail {
        Some(file) => Ok(Body::Form(FormPayload::from_serialize(request)?.file("thumbnail", file))),
        None => Body::json(request),
    }
}

impl ResourceStore<NewsList> {
    pub async fn create_news(&self, request: &NewsRequest, thumbnail: Option<FilePart>) -> Result<Value> {
        self.create(news_body(request, thumbnail)?).await
    }

    pub async fn update_news(
        &self,
        id: i64,
        request: &NewsRequest,
        thumbnail: Option<FilePart>,
    ) -> Result<Value> {
        self.update(id, news_body(request, thumbnail)?).await
    }
}

impl ResourceStore<NewsCategories> {
    pub async fn create_category(&self, names: &Translated<NameText>) -> Result<Value> {
        self.create(Body::json(names)?).await
    }

    pub async fn update_category(&self, id: i64, names: &Translated<NameText>) -> Result<Value> {
        self.update(id, Body::json(names)?).await
    }
}

impl ResourceStore<Banners> {
    /// A new banner must carry an image.
    pub async fn create_banner(&self, request: &BannerRequest, image: Option<FilePart>) -> Result<Value> {
        let image = image.ok_or_else(|| ApiError::Validation("Banner image is required".to_string()))?;
        let form = FormPayload::from_serialize(request)?.file("image", image);
        self.create(Body::Form(form)).await
    }

    pub async fn update_banner(
        &self,
        id: i64,
        request: &BannerRequest,
        image: Option<FilePart>,
    ) -> Result<Value> {
        let form = FormPayload::from_serialize(request)?.maybe_file("image", image);
        self.update(id, Body::Form(form)).await
    }

    /// PUT `/banner-hero/:id/public`.
    pub async fn make_public(&self, id: i64) -> Result<()> {
        self.set_visibility(id, false).await
    }

    /// PUT `/banner-hero/:id/private`.
    pub async fn make_private(&self, id: i64) -> Result<()> {
        self.set_visibility(id, true).await
    }

    async fn set_visibility(&self, id: i64, private: bool) -> Result<()> {
        let action = if private { "private" } else { "public" };
        let path = format!("{}/{}", Banners::item_path(id), action);
        let response = self
            .track(self.client().put::<Value>(&path, Body::Empty))
            .await
            .inspect_err(|e| tracing::error!(resource = Banners::NAME, id, "Failed to update visibility: {}", e))?;

        let is_private = response
            .get("is_private")
            .and_then(Value::as_bool)
            .unwrap_or(private);
        self.patch_item(id, |banner| banner.is_private = is_private);
        self.patch_current(id, |banner| banner.is_private = is_private);
        Ok(())
    }
}

impl ResourceStore<Popups> {
    pub async fn create_popup(&self, request: &PopupRequest, image: Option<FilePart>) -> Result<Value> {
        let form = FormPayload::from_serialize(request)?.maybe_file("image", image);
        self.create(Body::Form(form)).await
    }

    pub async fn update_popup(&self, id: i64, request: &PopupRequest, image: Option<FilePart>) -> Result<Value> {
        let form = FormPayload::from_serialize(request)?.maybe_file("image", image);
        self.update(id, Body::Form(form)).await
    }

    /// PUT `/popup/:id/change-status` with `{ is_private }`. The returned
    /// record becomes the current one.
    pub async fn change_status(&self, id: i64, is_private: bool) -> Result<Value> {
        let path = format!("{}/change-status", Popups::item_path(id));
        let response = self
            .track(
                self.client()
                    .put::<Value>(&path, Body::Json(json!({ "is_private": is_private }))),
            )
            .await
            .inspect_err(|e| tracing::error!(resource = Popups::NAME, id, "Failed to update status: {}", e))?;

        let confirmed = response
            .get("is_private")
            .and_then(Value::as_bool)
            .unwrap_or(is_private);
        self.patch_item(id, |popup| popup.is_private = confirmed);
        match serde_json::from_value::<Popup>(response.clone()) {
            Ok(popup) => self.set_current(Some(popup)),
            Err(_) => {
                self.patch_current(id, |popup| popup.is_private = confirmed);
            }
        }
        Ok(response)
    }
}

impl ResourceStore<Laws> {
    /// Multipart `name` + `file`; a new law must carry its document.
    pub async fn create_law(&self, request: &LawRequest, file: Option<FilePart>) -> Result<Value> {
        let file = file.ok_or_else(|| ApiError::Validation("Law document is required".to_string()))?;
        let form = FormPayload::new().text("name", request.name.clone()).file("file", file);
        self.create(Body::Form(form)).await
    }

    pub async fn update_law(&self, id: i64, request: &LawRequest, file: Option<FilePart>) -> Result<Value> {
        let form = FormPayload::new()
            .text("name", request.name.clone())
            .maybe_file("file", file);
        self.update(id, Body::Form(form)).await
    }
}
