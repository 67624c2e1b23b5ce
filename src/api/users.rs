//! Admin accounts, roles and permissions.

use serde_json::Value;

use crate::errors::{ApiError, Result};
use crate::http::{Body, FilePart, FormPayload};
use crate::models::{CreateRoleRequest, CreateUserRequest, Permission, Role, UpdateUserRequest, User};
use crate::store::{Envelope, Resource, ResourceStore};

/// `/users`, multipart create/update with an optional profile image.
pub struct Users;

impl Resource for Users {
    const NAME: &'static str = "users";
    const PATH: &'static str = "/users";

    type Item = User;
    type Detail = User;
}

/// `/roles`, listed unpaginated as `{ data }`.
pub struct Roles;

impl Resource for Roles {
    const NAME: &'static str = "roles";
    const PATH: &'static str = "/roles";
    const ENVELOPE: Envelope = Envelope::Data;

    type Item = Role;
    type Detail = Role;
}

/// `/permissions`, listed as a bare array.
pub struct Permissions;

impl Resource for Permissions {
    const NAME: &'static str = "permissions";
    const PATH: &'static str = "/permissions";
    const ENVELOPE: Envelope = Envelope::Array;

    type Item = Permission;
    type Detail = Permission;
}

impl ResourceStore<Users> {
    pub async fn create_user(&self, request: &CreateUserRequest, image: Option<FilePart>) -> Result<Value> {
        if request.email.trim().is_empty() {
            return Err(ApiError::Validation("Email is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(ApiError::Validation("Password is required".to_string()));
        }
        let form = FormPayload::from_serialize(request)?.maybe_file("image", image);
        self.create(Body::Form(form)).await
    }

    pub async fn update_user(
        &self,
        id: i64,
        request: &UpdateUserRequest,
        image: Option<FilePart>,
    ) -> Result<Value> {
        let form = FormPayload::from_serialize(request)?.maybe_file("image", image);
        self.update(id, Body::Form(form)).await
    }
}

impl ResourceStore<Roles> {
    pub async fn create_role(&self, request: &CreateRoleRequest) -> Result<Value> {
        if request.name.trim().is_empty() {
            return Err(ApiError::Validation("Role name is required".to_string()));
        }
        self.create(Body::json(request)?).await
    }
}

impl ResourceStore<Permissions> {
    /// Permission names grouped by their `group_name`, from the loaded list.
    pub fn grouped(&self) -> Vec<(String, Vec<Permission>)> {
        let mut groups: Vec<(String, Vec<Permission>)> = Vec::new();
        for permission in self.snapshot().items {
            match groups.iter_mut().find(|(name, _)| *name == permission.group_name) {
                Some((_, members)) => members.push(permission),
                None => groups.push((permission.group_name.clone(), vec![permission])),
            }
        }
        groups
    }
}
