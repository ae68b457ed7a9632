use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::container::{ContainerAction, ContainerId};

/// `{ "error": ... }` body the control-plane API uses for every failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `{ "message": ... }` body returned by a successful action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBody {
    pub message: String,
    pub id: ContainerId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContainerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Outbound action body. Only the closed set of actions can be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionRequest {
    pub action: ContainerAction,
}

/// Inbound action body as the server sees it, before the action is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawActionRequest {
    #[serde(default)]
    pub action: Option<String>,
}

/// Status code paired with a JSON body.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub body: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn created(body: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}
