use entities::users::UserId;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug, Deserialize)]
pub enum Permission {
    #[serde(rename = "manage:inventory")]
    ManageInventory,
}

pub struct Permissions {
    permissions: HashSet<Permission>,
}

impl Permissions {
    fn contains(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn all() -> Self {
        Self {
            permissions: HashSet::from([Permission::ManageInventory]),
        }
    }

    pub fn none() -> Self {
        Self {
            permissions: HashSet::new(),
        }
    }
}

impl From<&[String]> for Permissions {
    fn from(value: &[String]) -> Self {
        #[derive(Deserialize, Debug)]
        #[serde(untagged)]
        enum MaybePermission {
            Yes(Permission),
            No(serde_json::Value),
        }
        let json_string_array = serde_json::to_string(&value).unwrap_or_default();
        let permissions = serde_json::from_str::<Vec<MaybePermission>>(&json_string_array)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|maybe| match maybe {
                MaybePermission::Yes(p) => Some(p),
                MaybePermission::No(_) => None,
            })
            .collect();
        Self { permissions }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("actor is missing the {0:?} permission")]
pub struct PermissionDenied(pub Permission);

#[cfg_attr(test, automock)]
pub trait Actor: Send + Sync {
    fn user_id(&self) -> UserId;

    fn permissions(&self) -> Permissions;

    fn check_for_permission(&self, permission: Permission) -> Result<(), PermissionDenied> {
        match self.permissions().contains(permission) {
            true => Ok(()),
            false => Err(PermissionDenied(permission)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_permission_strings_are_ignored() {
        let raw = vec![
            "manage:inventory".to_string(),
            "definitely:not_a_permission".to_string(),
        ];
        let permissions = Permissions::from(raw.as_slice());
        assert!(permissions.contains(Permission::ManageInventory));
    }

    #[test]
    fn test_missing_permission_is_denied() {
        let permissions = Permissions::none();
        assert!(!permissions.contains(Permission::ManageInventory));
    }
}
