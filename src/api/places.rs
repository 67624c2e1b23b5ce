//! Countries and hotels.

use serde_json::Value;

use crate::errors::Result;
use crate::http::{Body, FilePart, FormPayload};
use crate::models::{Country, CountryRequest, Hotel, HotelRequest};
use crate::store::{FilterKey, Resource, ResourceStore};

pub struct Countries;

impl Resource for Countries {
    const NAME: &'static str = "countries";
    const PATH: &'static str = "/country";
    const FILTERS: &'static [FilterKey] = &[FilterKey::same("is_except_visa")];

    type Item = Country;
    type Detail = Country;
}

/// Hotels. Publishing toggles `is_published` in place; edits refetch.
pub struct Hotels;

impl Resource for Hotels {
    const NAME: &'static str = "hotels";
    const PATH: &'static str = "/hotel";
    const FILTERS: &'static [FilterKey] = &[FilterKey::same("is_published")];

    type Item = Hotel;
    type Detail = Hotel;
}

impl ResourceStore<Countries> {
    pub async fn create_country(&self, request: &CountryRequest, image: Option<FilePart>) -> Result<Value> {
        let form = FormPayload::from_serialize(request)?.maybe_file("image", image);
        self.create(Body::Form(form)).await
    }

    pub async fn update_country(
        &self,
        id: i64,
        request: &CountryRequest,
        image: Option<FilePart>,
    ) -> Result<Value> {
        let form = FormPayload::from_serialize(request)?.maybe_file("image", image);
        self.update(id, Body::Form(form)).await
    }
}

impl ResourceStore<Hotels> {
    pub async fn create_hotel(&self, request: &HotelRequest, image: Option<FilePart>) -> Result<Value> {
        let form = FormPayload::from_serialize(request)?.maybe_file("image", image);
        self.create(Body::Form(form)).await
    }

    pub async fn update_hotel(&self, id: i64, request: &HotelRequest, image: Option<FilePart>) -> Result<Value> {
        let form = FormPayload::from_serialize(request)?.maybe_file("image", image);
        self.update(id, Body::Form(form)).await
    }

    /// PUT `/hotel/:id/public`.
    pub async fn publish(&self, id: i64) -> Result<()> {
        self.set_published(id, true).await
    }

    /// PUT `/hotel/:id/private`.
    pub async fn unpublish(&self, id: i64) -> Result<()> {
        self.set_published(id, false).await
    }

    async fn set_published(&self, id: i64, published: bool) -> Result<()> {
        let action = if published { "public" } else { "private" };
        let path = format!("{}/{}", Hotels::item_path(id), action);
        self.track(self.client().put::<Value>(&path, Body::Empty))
            .await
            .inspect_err(|e| tracing::error!(resource = Hotels::NAME, id, "Failed to update status: {}", e))?;

        self.patch_item(id, |hotel| hotel.is_published = published);
        self.patch_current(id, |hotel| hotel.is_published = published);
        tracing::info!(resource = Hotels::NAME, id, published, "Hotel visibility changed");
        Ok(())
    }
}
