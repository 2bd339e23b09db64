//! Role reference permissions: a component name plus the role name it refers to.
//! Implication is plain equality.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Permission, PermissionError, PermissionRepr, PermissionResult};

fn role_ref_parts(value: PermissionRepr) -> PermissionResult<(String, String)> {
    match value.actions {
        Some(role) if !role.is_empty() => Ok((value.name, role)),
        _ => Err(PermissionError::InvalidRoleRef(format!(
            "'{}' has no role name",
            value.name
        ))),
    }
}

/// Use of a role reference from a web resource. The name is the servlet name (empty
/// for unmapped resources), the action the role reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PermissionRepr", into = "PermissionRepr")]
pub struct WebRoleRefPermission {
    name: String,
    role: String,
}

impl WebRoleRefPermission {
    pub fn new(name: &str, role: &str) -> PermissionResult<Self> {
        if role.is_empty() {
            return Err(PermissionError::InvalidRoleRef(format!("'{name}' has no role name")));
        }
        Ok(WebRoleRefPermission {
            name: name.to_string(),
            role: role.to_string(),
        })
    }

    pub fn role(&self) -> &str {
        &self.role
    }
}

impl Permission for WebRoleRefPermission {
    fn kind() -> &'static str {
        "WebRoleRefPermission"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn actions(&self) -> Option<&str> {
        Some(&self.role)
    }

    fn implies(&self, that: &Self) -> bool {
        self == that
    }
}

impl fmt::Display for WebRoleRefPermission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_permission_string())
    }
}

impl TryFrom<PermissionRepr> for WebRoleRefPermission {
    type Error = PermissionError;

    fn try_from(value: PermissionRepr) -> Result<Self, Self::Error> {
        let (name, role) = role_ref_parts(value)?;
        Ok(WebRoleRefPermission { name, role })
    }
}

impl From<WebRoleRefPermission> for PermissionRepr {
    fn from(value: WebRoleRefPermission) -> Self {
        PermissionRepr {
            name: value.name,
            actions: Some(value.role),
        }
    }
}

/// Use of a role reference from an EJB. The name is the EJB name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PermissionRepr", into = "PermissionRepr")]
pub struct EjbRoleRefPermission {
    name: String,
    role: String,
}

impl EjbRoleRefPermission {
    pub fn new(name: &str, role: &str) -> PermissionResult<Self> {
        if role.is_empty() {
            return Err(PermissionError::InvalidRoleRef(format!("'{name}' has no role name")));
        }
        Ok(EjbRoleRefPermission {
            name: name.to_string(),
            role: role.to_string(),
        })
    }

    pub fn role(&self) -> &str {
        &self.role
    }
}

impl Permission for EjbRoleRefPermission {
    fn kind() -> &'static str {
        "EJBRoleRefPermission"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn actions(&self) -> Option<&str> {
        Some(&self.role)
    }

    fn implies(&self, that: &Self) -> bool {
        self == that
    }
}

impl fmt::Display for EjbRoleRefPermission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_permission_string())
    }
}

impl TryFrom<PermissionRepr> for EjbRoleRefPermission {
    type Error = PermissionError;

    fn try_from(value: PermissionRepr) -> Result<Self, Self::Error> {
        let (name, role) = role_ref_parts(value)?;
        Ok(EjbRoleRefPermission { name, role })
    }
}

impl From<EjbRoleRefPermission> for PermissionRepr {
    fn from(value: EjbRoleRefPermission) -> Self {
        PermissionRepr {
            name: value.name,
            actions: Some(value.role),
        }
    }
}
