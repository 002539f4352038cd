use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, Extension, Json};
use serde::{Deserialize, Serialize};

use super::ErrorDetails;
use crate::directory::{Directory, DirectoryIdentity};
use crate::error::{auth as AuthError, Error};
use crate::response::{negotiated, ApiHeader, ApiResponse, Negotiated, SingleLine};

#[derive(Deserialize)]
pub(super) struct ValidateRequest {
    username: Option<String>,
    password: Option<String>,
}

impl ValidateRequest {
    fn credentials(self) -> Option<(String, String)> {
        Some((
            self.username.filter(|u| !u.is_empty())?,
            self.password.filter(|p| !p.is_empty())?,
        ))
    }
}

#[derive(Serialize)]
pub(super) struct Validated {
    status: &'static str,
    user: String,
    result: DirectoryIdentity,
}

impl ApiHeader for Validated {}

impl SingleLine for Validated {
    fn single_lined(&self) -> String {
        self.result.dn.clone()
    }
}

pub(super) async fn handler(
    Extension(directory): Extension<Arc<dyn Directory>>,
    Extension(details): Extension<ErrorDetails>,
    negotiation: Option<Negotiated>,
    req: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<ApiResponse<Validated>, ApiResponse<Error>> {
    let response_type = negotiated(negotiation);
    let (username, password) = req
        .ok()
        .and_then(|Json(req)| req.credentials())
        .ok_or(ApiResponse(response_type, AuthError::ValidationRequired))?;

    let identity = directory
        .verify_credentials(&username, &password)
        .await
        .map_err(|err| ApiResponse(response_type, err.public(details.exposed)))?;

    Ok(response_type.to_api_response(Validated {
        status: "valid",
        user: username,
        result: identity,
    }))
}
