use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};

use kidloop_core::{ContactId, DomainError};
use kidloop_support::NewContact;

use crate::app::services::{
    AppServices,
    support::{self, BulkAction, ContactStatusChange},
};
use crate::app::{dto, errors};
use crate::context::Principal;

pub fn admin_router() -> Router {
    Router::new()
        .route("/", get(list))
        .route("/stats", get(stats))
        .route("/bulk", post(bulk))
        .route("/:id", get(get_one).delete(soft_delete))
        .route("/:id/status", patch(set_status))
        .route("/:id/respond", post(respond))
        .route("/:id/read", post(mark_read))
}

/// Public intake endpoint.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewContact>,
) -> Response {
    match support::create_contact(&services, body) {
        Ok(contact) => (StatusCode::CREATED, Json(contact)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<dto::ContactListQuery>,
) -> Response {
    let (filter, page) = query.into_parts();
    match support::list_contacts(&services, &principal, filter, page) {
        Ok((items, page)) => {
            Json(serde_json::json!({ "items": items, "page": page })).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
) -> Response {
    match support::stats(&services, &principal) {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Response {
    let id: ContactId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match support::get_contact(&services, &principal, id) {
        Ok(contact) => Json(contact).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn set_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::ContactStatusRequest>,
) -> Response {
    let id: ContactId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let change = ContactStatusChange {
        status: body.status,
        priority: body.priority,
        assigned_to: body.assigned_to,
        response: body.response,
    };
    match support::set_contact_status(&services, &principal, id, change) {
        Ok(contact) => Json(contact).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn respond(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<dto::RespondRequest>,
) -> Response {
    let id: ContactId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match support::respond(&services, &principal, id, body.response, body.status) {
        Ok(contact) => Json(contact).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Response {
    let id: ContactId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match support::mark_read(&services, &principal, id) {
        Ok(contact) => Json(contact).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn soft_delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Response {
    let id: ContactId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match support::soft_delete(&services, &principal, id) {
        Ok(contact) => Json(contact).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn bulk(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<dto::BulkContactRequest>,
) -> Response {
    let action = match body.action {
        dto::BulkActionKind::MarkRead => BulkAction::MarkRead,
        dto::BulkActionKind::ChangeStatus => match body.status {
            Some(status) => BulkAction::ChangeStatus(status),
            None => {
                return errors::domain_error_to_response(DomainError::validation(
                    "status is required for change_status",
                ));
            }
        },
        dto::BulkActionKind::Assign => match body.assigned_to {
            Some(assignee) => BulkAction::Assign(assignee),
            None => {
                return errors::domain_error_to_response(DomainError::validation(
                    "assigned_to is required for assign",
                ));
            }
        },
        dto::BulkActionKind::Delete => BulkAction::Delete,
    };

    match support::bulk(&services, &principal, action, &body.ids) {
        Ok(results) => Json(serde_json::json!({ "results": results })).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
