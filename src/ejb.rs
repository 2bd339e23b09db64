use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::{Permission, PermissionError, PermissionRepr, PermissionResult};

/// EJB invocation interface of a method. Anything outside the five well-known names is
/// kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodInterface {
    Local,
    LocalHome,
    Remote,
    Home,
    ServiceEndpoint,
    Other(String),
}

impl MethodInterface {
    /// `""` means unspecified.
    pub fn parse(method_interface: &str) -> Option<MethodInterface> {
        let parsed = match method_interface {
            "" => return None,
            "Local" => MethodInterface::Local,
            "LocalHome" => MethodInterface::LocalHome,
            "Remote" => MethodInterface::Remote,
            "Home" => MethodInterface::Home,
            "ServiceEndpoint" => MethodInterface::ServiceEndpoint,
            other => MethodInterface::Other(other.to_string()),
        };
        Some(parsed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            MethodInterface::Local => "Local",
            MethodInterface::LocalHome => "LocalHome",
            MethodInterface::Remote => "Remote",
            MethodInterface::Home => "Home",
            MethodInterface::ServiceEndpoint => "ServiceEndpoint",
            MethodInterface::Other(other) => other,
        }
    }
}

impl fmt::Display for MethodInterface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter type: a component type name and its array dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamType {
    pub component: String,
    pub dimensions: usize,
}

impl ParamType {
    pub fn scalar(component: &str) -> Self {
        ParamType {
            component: component.to_string(),
            dimensions: 0,
        }
    }

    pub fn array(component: &str, dimensions: usize) -> Self {
        ParamType {
            component: component.to_string(),
            dimensions,
        }
    }

    /// `component` followed by one `[]` per dimension.
    pub fn canonical(&self) -> String {
        let mut name = self.component.clone();
        for _ in 0..self.dimensions {
            name.push_str("[]");
        }
        name
    }
}

/// A method as seen by the container: its name and parameter types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<ParamType>,
}

impl MethodSignature {
    pub fn new(name: &str, params: Vec<ParamType>) -> Self {
        MethodSignature {
            name: name.to_string(),
            params,
        }
    }
}

/// Access to methods of an EJB. The name is the EJB name; actions select methods:
///
/// ```text
/// methodNameSpec       ::= methodName | emptyString
/// methodInterfaceName  ::= String
/// methodInterfaceSpec  ::= methodInterfaceName | emptyString
/// typeName             ::= typeName | typeName []
/// methodParams         ::= typeName | methodParams comma typeName
/// methodParamsSpec     ::= emptyString | methodParams
/// methodSpec ::= null |
///     methodNameSpec |
///     methodNameSpec comma methodInterfaceName |
///     methodNameSpec comma methodInterfaceSpec comma methodParamsSpec
/// ```
///
/// Every absent part matches all values of that part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PermissionRepr", into = "PermissionRepr")]
pub struct EjbMethodPermission {
    name: String,
    method_name: Option<String>,
    method_interface: Option<MethodInterface>,
    // Leading comma; "," alone is the empty parameter list.
    method_params: Option<String>,
    actions: Option<String>,
}

impl EjbMethodPermission {
    pub fn new(name: &str, actions: &str) -> PermissionResult<Self> {
        let mut method_name = None;
        let mut method_interface = None;
        let mut method_params = None;

        if let Some((head, rest)) = actions.split_once(',') {
            if !head.is_empty() {
                method_name = Some(head.to_string());
            }
            if rest.is_empty() {
                return Err(PermissionError::InvalidEjbActions(actions.to_string()));
            }
            match rest.find(',') {
                None => method_interface = MethodInterface::parse(rest),
                Some(j) => {
                    method_interface = MethodInterface::parse(&rest[..j]);
                    let params = &rest[j..];
                    if params.len() > 1 && params.ends_with(',') {
                        return Err(PermissionError::InvalidMethodParam(params.to_string()));
                    }
                    method_params = Some(params.to_string());
                }
            }
        } else if !actions.is_empty() {
            method_name = Some(actions.to_string());
        }

        Ok(Self::assemble(name, method_name, method_interface, method_params))
    }

    /// Builds from separate parts. `None` leaves a part unspecified; `Some(&[])` is the
    /// empty parameter list.
    pub fn with_parts<S: AsRef<str>>(
        name: &str,
        method_name: Option<&str>,
        method_interface: Option<&str>,
        method_params: Option<&[S]>,
    ) -> PermissionResult<Self> {
        let method_name = method_name.filter(|m| !m.is_empty());
        if let Some(m) = method_name {
            if m.contains(',') {
                return Err(PermissionError::InvalidMethodName(m.to_string()));
            }
        }

        let method_params = match method_params {
            Some(params) => {
                let mut joined = String::from(",");
                for (i, param) in params.iter().enumerate() {
                    let param = param.as_ref();
                    if param.contains(',') {
                        return Err(PermissionError::InvalidMethodParam(param.to_string()));
                    }
                    if i > 0 {
                        joined.push(',');
                    }
                    joined.push_str(param);
                }
                Some(joined)
            }
            None => None,
        };

        Ok(Self::assemble(
            name,
            method_name.map(str::to_string),
            method_interface.and_then(MethodInterface::parse),
            method_params,
        ))
    }

    /// Builds from a method signature. Array parameters are written
    /// `componentType[]`, one `[]` per dimension.
    pub fn from_signature(
        name: &str,
        method_interface: Option<&str>,
        method: &MethodSignature,
    ) -> PermissionResult<Self> {
        let params: Vec<String> = method.params.iter().map(ParamType::canonical).collect();
        Self::with_parts(name, Some(method.name.as_str()), method_interface, Some(&params[..]))
    }

    fn assemble(
        name: &str,
        method_name: Option<String>,
        method_interface: Option<MethodInterface>,
        method_params: Option<String>,
    ) -> Self {
        let actions = canonical_actions(
            method_name.as_deref(),
            method_interface.as_ref(),
            method_params.as_deref(),
        );
        EjbMethodPermission {
            name: name.to_string(),
            method_name,
            method_interface,
            method_params,
            actions,
        }
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    pub fn method_interface(&self) -> Option<&MethodInterface> {
        self.method_interface.as_ref()
    }

    /// Parameter types, or `None` when any parameter list matches.
    pub fn method_params(&self) -> Option<Vec<&str>> {
        self.method_params
            .as_deref()
            .map(|params| params.split(',').skip(1).filter(|p| !p.is_empty()).collect())
    }
}

fn canonical_actions(
    method_name: Option<&str>,
    method_interface: Option<&MethodInterface>,
    method_params: Option<&str>,
) -> Option<String> {
    let interface = method_interface.map(MethodInterface::as_str);
    match (method_name, interface, method_params) {
        (None, None, None) => None,
        (None, None, Some(params)) => Some(format!(",{params}")),
        (None, Some(interface), None) => Some(format!(",{interface}")),
        (None, Some(interface), Some(params)) => Some(format!(",{interface}{params}")),
        (Some(name), None, None) => Some(name.to_string()),
        (Some(name), None, Some(params)) => Some(format!("{name},{params}")),
        (Some(name), Some(interface), None) => Some(format!("{name},{interface}")),
        (Some(name), Some(interface), Some(params)) => Some(format!("{name},{interface}{params}")),
    }
}

impl Permission for EjbMethodPermission {
    fn kind() -> &'static str {
        "EJBMethodPermission"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn actions(&self) -> Option<&str> {
        self.actions.as_deref()
    }

    fn implies(&self, that: &Self) -> bool {
        fn covers<T: PartialEq>(ours: &Option<T>, theirs: &Option<T>) -> bool {
            match ours {
                None => true,
                Some(ours) => theirs.as_ref() == Some(ours),
            }
        }

        self.name == that.name
            && covers(&self.method_name, &that.method_name)
            && covers(&self.method_interface, &that.method_interface)
            && covers(&self.method_params, &that.method_params)
    }
}

impl PartialEq for EjbMethodPermission {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.method_name == other.method_name
            && self.method_interface == other.method_interface
            && self.method_params == other.method_params
    }
}

impl Eq for EjbMethodPermission {}

impl Hash for EjbMethodPermission {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.actions.hash(state);
    }
}

impl fmt::Display for EjbMethodPermission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_permission_string())
    }
}

impl TryFrom<PermissionRepr> for EjbMethodPermission {
    type Error = PermissionError;

    fn try_from(value: PermissionRepr) -> Result<Self, Self::Error> {
        Self::new(&value.name, value.actions.as_deref().unwrap_or(""))
    }
}

impl From<EjbMethodPermission> for PermissionRepr {
    fn from(value: EjbMethodPermission) -> Self {
        PermissionRepr {
            name: value.name,
            actions: value.actions,
        }
    }
}
