//! Rust 🦀JACC🦀 permissions: the Jakarta Authorization permission algebra, crab-shaped.
//!
//! Containers describe each access request as a permission, deployment descriptors
//! describe what is granted, and a policy provider answers "does a granted permission
//! imply the requested one?". This crate is the part all of them must agree on: how
//! permission names and actions are parsed, canonicalized and compared.
//!
//! - [`WebResourcePermission`] / [`WebUserDataPermission`]: a [`UrlPatternSpec`] name
//!   (servlet URL pattern plus exclusions) and an [`HttpMethodSpec`] action.
//! - [`EjbMethodPermission`]: an EJB name and a `method,interface,params` selector.
//! - [`WebRoleRefPermission`] / [`EjbRoleRefPermission`]: role references.
//!
//! Every permission serializes to its canonical `name`/`actions` pair and is rebuilt
//! from it by the same parser the constructors use.
//!
//! Example usage:
//!```
//! use jaccrab::*;
//!
//! fn check() -> Result<(), PermissionError> {
//!     // Everything under /admin except the login page, for any method but TRACE.
//!     let granted = WebResourcePermission::new("/admin/*:/admin/login.jsp", "!TRACE")?;
//!
//!     assert!(granted.implies(&WebResourcePermission::new("/admin/users", "GET")?));
//!     assert!(!granted.implies(&WebResourcePermission::new("/admin/login.jsp", "GET")?));
//!     assert!(!granted.implies(&WebResourcePermission::new("/admin/users", "TRACE")?));
//!
//!     // Any parameter list of `foo` on the Remote interface.
//!     let ejb = EjbMethodPermission::new("Bean", "foo,Remote")?;
//!     assert!(ejb.implies(&EjbMethodPermission::new("Bean", "foo,Remote,int")?));
//!
//!     // Grant sets mix permission kinds and can come from configuration.
//!     let mut grants = Permissions::new();
//!     grants.add(granted);
//!     grants.add(ejb);
//!     assert!(grants.implies(&WebResourcePermission::new("/admin/users", "POST")?.into()));
//!     assert!(!grants.implies(&EjbMethodPermission::new("Other", "foo")?.into()));
//!
//!     let json = serde_json::to_string(&grants).unwrap();
//!     let restored: Permissions = serde_json::from_str(&json).unwrap();
//!     assert_eq!(restored, grants);
//!     Ok(())
//! }
//!
//! check().unwrap();
//!```
use std::fmt;

mod ejb;
mod error;
mod http_method_spec;
mod permissions;
mod registry;
mod role_ref;
#[cfg(test)]
mod tests;
mod url_pattern;
mod url_pattern_spec;
mod web;

use serde::{Deserialize, Serialize};

pub use ejb::{EjbMethodPermission, MethodInterface, MethodSignature, ParamType};
pub use error::{PermissionError, PermissionResult};
pub use http_method_spec::{ExtensionSet, HttpMethodSpec, MethodSpecFactory, STANDARD_METHODS};
pub use permissions::{AnyPermission, Permissions};
pub use registry::ExtensionMethodRegistry;
pub use role_ref::{EjbRoleRefPermission, WebRoleRefPermission};
pub use url_pattern::{DEFAULT_PATTERN, PatternType, UrlPattern};
pub use url_pattern_spec::UrlPatternSpec;
pub use web::{HttpRequestTarget, RequestTarget, TransportType, WebResourcePermission, WebUserDataPermission};

/// Trait that all permission types implement
pub trait Permission:
    Sized + fmt::Display + fmt::Debug + Clone + PartialEq + Eq + std::hash::Hash
{
    /// Returns the permission kind (e.g., "WebResourcePermission")
    fn kind() -> &'static str;

    /// Returns the permission name as given at construction
    fn name(&self) -> &str;

    /// Returns canonical actions; `None` means no action restriction
    fn actions(&self) -> Option<&str>;

    /// Does granting `self` also grant `permission`?
    fn implies(&self, permission: &Self) -> bool;

    /// Returns `(Kind "name" "actions")`
    fn to_permission_string(&self) -> String {
        match self.actions() {
            Some(actions) => format!("({} \"{}\" \"{}\")", Self::kind(), self.name(), actions),
            None => format!("({} \"{}\")", Self::kind(), self.name()),
        }
    }
}

/// Serialized form of every permission: canonical name and actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRepr {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<String>,
}
