use serde::{Deserialize, Serialize};

use crate::{
    EjbMethodPermission, EjbRoleRefPermission, Permission, WebResourcePermission, WebRoleRefPermission,
    WebUserDataPermission,
};

/// Any permission kind. Permissions of different kinds never imply each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnyPermission {
    WebResource(WebResourcePermission),
    WebUserData(WebUserDataPermission),
    WebRoleRef(WebRoleRefPermission),
    EjbMethod(EjbMethodPermission),
    EjbRoleRef(EjbRoleRefPermission),
}

impl AnyPermission {
    pub fn name(&self) -> &str {
        match self {
            AnyPermission::WebResource(p) => p.name(),
            AnyPermission::WebUserData(p) => p.name(),
            AnyPermission::WebRoleRef(p) => p.name(),
            AnyPermission::EjbMethod(p) => p.name(),
            AnyPermission::EjbRoleRef(p) => p.name(),
        }
    }

    pub fn actions(&self) -> Option<&str> {
        match self {
            AnyPermission::WebResource(p) => p.actions(),
            AnyPermission::WebUserData(p) => p.actions(),
            AnyPermission::WebRoleRef(p) => p.actions(),
            AnyPermission::EjbMethod(p) => p.actions(),
            AnyPermission::EjbRoleRef(p) => p.actions(),
        }
    }

    pub fn implies(&self, permission: &AnyPermission) -> bool {
        match (self, permission) {
            (AnyPermission::WebResource(a), AnyPermission::WebResource(b)) => a.implies(b),
            (AnyPermission::WebUserData(a), AnyPermission::WebUserData(b)) => a.implies(b),
            (AnyPermission::WebRoleRef(a), AnyPermission::WebRoleRef(b)) => a.implies(b),
            (AnyPermission::EjbMethod(a), AnyPermission::EjbMethod(b)) => a.implies(b),
            (AnyPermission::EjbRoleRef(a), AnyPermission::EjbRoleRef(b)) => a.implies(b),
            _ => false,
        }
    }
}

impl std::fmt::Display for AnyPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AnyPermission::WebResource(p) => std::fmt::Display::fmt(p, f),
            AnyPermission::WebUserData(p) => std::fmt::Display::fmt(p, f),
            AnyPermission::WebRoleRef(p) => std::fmt::Display::fmt(p, f),
            AnyPermission::EjbMethod(p) => std::fmt::Display::fmt(p, f),
            AnyPermission::EjbRoleRef(p) => std::fmt::Display::fmt(p, f),
        }
    }
}

impl From<WebResourcePermission> for AnyPermission {
    fn from(value: WebResourcePermission) -> Self {
        AnyPermission::WebResource(value)
    }
}

impl From<WebUserDataPermission> for AnyPermission {
    fn from(value: WebUserDataPermission) -> Self {
        AnyPermission::WebUserData(value)
    }
}

impl From<WebRoleRefPermission> for AnyPermission {
    fn from(value: WebRoleRefPermission) -> Self {
        AnyPermission::WebRoleRef(value)
    }
}

impl From<EjbMethodPermission> for AnyPermission {
    fn from(value: EjbMethodPermission) -> Self {
        AnyPermission::EjbMethod(value)
    }
}

impl From<EjbRoleRefPermission> for AnyPermission {
    fn from(value: EjbRoleRefPermission) -> Self {
        AnyPermission::EjbRoleRef(value)
    }
}

/// A set of granted permissions, kept in insertion order.
///
/// Serialized as a plain list, so grants can be loaded from configuration files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions {
    granted: Vec<AnyPermission>,
}

impl Permissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a grant. Exact duplicates are kept once.
    pub fn add(&mut self, permission: impl Into<AnyPermission>) -> &mut Self {
        let permission = permission.into();
        if !self.granted.contains(&permission) {
            self.granted.push(permission);
        }
        self
    }

    /// True when some granted permission implies `permission`.
    pub fn implies(&self, permission: &AnyPermission) -> bool {
        match self.granted.iter().find(|granted| granted.implies(permission)) {
            Some(granted) => {
                tracing::trace!(requested = %permission, granted = %granted, "Permission implied");
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnyPermission> {
        self.granted.iter()
    }

    pub fn len(&self) -> usize {
        self.granted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

impl<P: Into<AnyPermission>> FromIterator<P> for Permissions {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        let mut permissions = Permissions::new();
        for permission in iter {
            permissions.add(permission);
        }
        permissions
    }
}
