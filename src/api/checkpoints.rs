//! Border checkpoints, checkpoint categories and provinces.

use serde_json::Value;

use crate::errors::{ApiError, Result};
use crate::http::{Body, FilePart, FormPayload};
use crate::models::{
    Checkpoint, CheckpointCategory, CheckpointRequest, NameText, Province, ProvinceRequest,
    Translated,
};
use crate::store::{FilterKey, Resource, ResourceStore};

pub struct Checkpoints;

impl Resource for Checkpoints {
    const NAME: &'static str = "checkpoints";
    const PATH: &'static str = "/checkpoint";
    const FILTERS: &'static [FilterKey] = &[
        FilterKey::same("category_id"),
        FilterKey::same("province_id"),
    ];

    type Item = Checkpoint;
    type Detail = Checkpoint;
}

pub struct CheckpointCategories;

impl Resource for CheckpointCategories {
    const NAME: &'static str = "checkpoint-categories";
    const PATH: &'static str = "/checkpoint-categories";

    type Item = CheckpointCategory;
    type Detail = CheckpointCategory;
}

pub struct Provinces;

impl Resource for Provinces {
    const NAME: &'static str = "provinces";
    const PATH: &'static str = "/provinces";

    type Item = Province;
    type Detail = Province;
}

fn checkpoint_form(request: &CheckpointRequest, image: Option<FilePart>) -> Result<FormPayload> {
    if request.translates.lo.name.trim().is_empty() {
        return Err(ApiError::Validation("Checkpoint name (lo) is required".to_string()));
    }
    Ok(FormPayload::from_serialize(request)?.maybe_file("image", image))
}

impl ResourceStore<Checkpoints> {
    pub async fn create_checkpoint(&self, request: &CheckpointRequest, image: Option<FilePart>) -> Result<Value> {
        let form = checkpoint_form(request, image)?;
        self.create(Body::Form(form)).await
    }

    pub async fn update_checkpoint(
        &self,
        id: i64,
        request: &CheckpointRequest,
        image: Option<FilePart>,
    ) -> Result<Value> {
        let form = checkpoint_form(request, image)?;
        self.update(id, Body::Form(form)).await
    }
}

impl ResourceStore<CheckpointCategories> {
    pub async fn create_category(&self, names: &Translated<NameText>) -> Result<Value> {
        self.create(Body::json(names)?).await
    }

    pub async fn update_category(&self, id: i64, names: &Translated<NameText>) -> Result<Value> {
        self.update(id, Body::json(names)?).await
    }
}

impl ResourceStore<Provinces> {
    pub async fn create_province(&self, request: &ProvinceRequest) -> Result<Value> {
        self.create(Body::json(request)?).await
    }

    pub async fn update_province(&self, id: i64, request: &ProvinceRequest) -> Result<Value> {
        self.update(id, Body::json(request)?).await
    }
}
