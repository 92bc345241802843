use actix_web::HttpRequest;
use entities::users::UserId;
use use_cases::actor::{Actor, Permissions};

use crate::errors::ApiError;

/// Identity is resolved upstream (authentication itself is out of scope);
/// the gateway forwards the caller and their permissions as headers.
pub struct AuthenticatedUserInfo {
    user_id: UserId,
    permissions: Vec<String>,
}

impl Actor for AuthenticatedUserInfo {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn permissions(&self) -> Permissions {
        Permissions::from(self.permissions.as_slice())
    }
}

impl TryFrom<&HttpRequest> for AuthenticatedUserInfo {
    type Error = ApiError;

    fn try_from(req: &HttpRequest) -> Result<Self, Self::Error> {
        let user_id = req
            .headers()
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<UserId>().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing or invalid x-user-id".to_string()))?;

        let permissions = req
            .headers()
            .get("x-user-permissions")
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(',')
                    .map(|permission| permission.trim().to_string())
                    .filter(|permission| !permission.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            user_id,
            permissions,
        })
    }
}
