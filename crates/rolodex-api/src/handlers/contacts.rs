//! Contact management handlers
//!
//! Every route here sits behind the bearer middleware.
//!
//! Author: hephaex@gmail.com

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rolodex_core::{Contact, ContactPatch, NewContact};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Contact information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContactInfo {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "+1-555-0100")]
    pub phone: String,
}

impl From<Contact> for ContactInfo {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            phone: contact.phone,
        }
    }
}

/// Contact creation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContactRequest {
    #[schema(example = "+1-555-0100")]
    pub phone: String,
}

/// Contact update request, absent fields are left unchanged
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    pub phone: Option<String>,
}

/// Create a contact
#[utoipa::path(
    post,
    path = "/contact",
    tag = "contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 200, description = "Contact created", body = ContactInfo),
        (status = 400, description = "Invalid phone number", body = crate::error::ApiError),
        (status = 401, description = "Could not validate credentials", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateContactRequest>,
) -> Result<Json<ContactInfo>, AppError> {
    let new_contact = NewContact {
        phone: request.phone.trim().to_string(),
    };
    new_contact.validate()?;

    let contact = state.contacts.create_contact(new_contact).await?;
    tracing::debug!(contact_id = contact.id, username = %user.username, "contact created");

    Ok(Json(ContactInfo::from(contact)))
}

/// List all contacts
#[utoipa::path(
    get,
    path = "/contact",
    tag = "contacts",
    responses(
        (status = 200, description = "All contacts", body = Vec<ContactInfo>),
        (status = 401, description = "Could not validate credentials", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ContactInfo>>, AppError> {
    let contacts = state.contacts.list_contacts().await?;
    Ok(Json(contacts.into_iter().map(ContactInfo::from).collect()))
}

/// Get a contact by ID
#[utoipa::path(
    get,
    path = "/contact/{id}",
    tag = "contacts",
    params(
        ("id" = i64, Path, description = "Contact ID")
    ),
    responses(
        (status = 200, description = "Contact found", body = ContactInfo),
        (status = 404, description = "Contact not found", body = crate::error::ApiError),
        (status = 401, description = "Could not validate credentials", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ContactInfo>, AppError> {
    state
        .contacts
        .get_contact(id)
        .await?
        .map(|contact| Json(ContactInfo::from(contact)))
        .ok_or_else(|| AppError::NotFound(format!("Contact {id}")))
}

/// Update a contact's phone number
#[utoipa::path(
    patch,
    path = "/contact/{id}",
    tag = "contacts",
    params(
        ("id" = i64, Path, description = "Contact ID")
    ),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Contact updated", body = ContactInfo),
        (status = 400, description = "Invalid phone number", body = crate::error::ApiError),
        (status = 404, description = "Contact not found", body = crate::error::ApiError),
        (status = 401, description = "Could not validate credentials", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateContactRequest>,
) -> Result<Json<ContactInfo>, AppError> {
    let patch = ContactPatch {
        phone: request.phone.map(|phone| phone.trim().to_string()),
    };
    patch.validate()?;

    state
        .contacts
        .update_contact(id, patch)
        .await?
        .map(|contact| Json(ContactInfo::from(contact)))
        .ok_or_else(|| AppError::NotFound(format!("Contact {id}")))
}

/// Delete a contact
#[utoipa::path(
    delete,
    path = "/contact/{id}",
    tag = "contacts",
    params(
        ("id" = i64, Path, description = "Contact ID")
    ),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 404, description = "Contact not found", body = crate::error::ApiError),
        (status = 401, description = "Could not validate credentials", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state.contacts.delete_contact(id).await? {
        return Err(AppError::NotFound(format!("Contact {id}")));
    }

    tracing::debug!(contact_id = id, username = %user.username, "contact deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_phone_optional() {
        let request: UpdateContactRequest = serde_json::from_str("{}").unwrap();
        assert!(request.phone.is_none());
    }

    #[test]
    fn test_contact_info_from_contact() {
        let info = ContactInfo::from(Contact {
            id: 7,
            phone: "555-0100".to_string(),
        });
        assert_eq!(info.id, 7);
        assert_eq!(info.phone, "555-0100");
    }
}
