use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::{
    Permission, PermissionError, PermissionRepr, PermissionResult,
    http_method_spec::{HttpMethodSpec, MethodSpecFactory},
    url_pattern_spec::UrlPatternSpec,
};

const ESCAPED_COLON: &str = "%3A";

/// What a container knows about an incoming request.
pub trait RequestTarget {
    fn request_uri(&self) -> Option<&str>;
    fn context_path(&self) -> Option<&str>;
    fn method(&self) -> &str;
    fn is_secure(&self) -> bool;
}

/// [`RequestTarget`] over an [`http::Request`] deployed under `context_path`.
pub struct HttpRequestTarget<'a, B> {
    request: &'a http::Request<B>,
    context_path: &'a str,
}

impl<'a, B> HttpRequestTarget<'a, B> {
    pub fn new(request: &'a http::Request<B>, context_path: &'a str) -> Self {
        HttpRequestTarget {
            request,
            context_path,
        }
    }
}

impl<B> RequestTarget for HttpRequestTarget<'_, B> {
    fn request_uri(&self) -> Option<&str> {
        Some(self.request.uri().path())
    }

    fn context_path(&self) -> Option<&str> {
        Some(self.context_path)
    }

    fn method(&self) -> &str {
        self.request.method().as_str()
    }

    fn is_secure(&self) -> bool {
        self.request.uri().scheme() == Some(&http::uri::Scheme::HTTPS)
    }
}

/// Permission name for a request: the URI relative to the context path, with `:`
/// escaped. The context root `/` becomes the empty string.
fn uri_minus_context_path(request: &impl RequestTarget) -> String {
    let Some(uri) = request.request_uri() else {
        return String::new();
    };
    let uri = match request.context_path() {
        Some(context) if !context.is_empty() => uri.strip_prefix(context).unwrap_or(uri),
        _ => uri,
    };
    if uri == "/" {
        return String::new();
    }
    uri.replace(':', ESCAPED_COLON)
}

/// Access to web resources: a [`UrlPatternSpec`] name and an [`HttpMethodSpec`]
/// action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PermissionRepr", into = "PermissionRepr")]
pub struct WebResourcePermission {
    name: String,
    url_pattern_spec: UrlPatternSpec,
    method_spec: Arc<HttpMethodSpec>,
}

impl WebResourcePermission {
    /// `actions` is an HTTP method spec; `""` grants all methods.
    pub fn new(name: &str, actions: &str) -> PermissionResult<Self> {
        Self::new_in(MethodSpecFactory::global(), name, actions)
    }

    pub fn new_in(factory: &MethodSpecFactory, name: &str, actions: &str) -> PermissionResult<Self> {
        Ok(WebResourcePermission {
            name: name.to_string(),
            url_pattern_spec: UrlPatternSpec::new(name)?,
            method_spec: factory.spec(actions)?,
        })
    }

    pub fn with_methods<S: AsRef<str>>(name: &str, methods: &[S]) -> PermissionResult<Self> {
        Self::with_methods_in(MethodSpecFactory::global(), name, methods)
    }

    pub fn with_methods_in<S: AsRef<str>>(
        factory: &MethodSpecFactory,
        name: &str,
        methods: &[S],
    ) -> PermissionResult<Self> {
        Ok(WebResourcePermission {
            name: name.to_string(),
            url_pattern_spec: UrlPatternSpec::new(name)?,
            method_spec: factory.spec_from_methods(methods)?,
        })
    }

    /// The permission a request needs: its context-relative URI and its method.
    pub fn from_request(request: &impl RequestTarget) -> PermissionResult<Self> {
        Self::from_request_in(MethodSpecFactory::global(), request)
    }

    pub fn from_request_in(factory: &MethodSpecFactory, request: &impl RequestTarget) -> PermissionResult<Self> {
        let name = uri_minus_context_path(request);
        Ok(WebResourcePermission {
            url_pattern_spec: UrlPatternSpec::new(&name)?,
            method_spec: factory.spec(request.method())?,
            name,
        })
    }

    pub fn url_pattern_spec(&self) -> &UrlPatternSpec {
        &self.url_pattern_spec
    }

    pub fn method_spec(&self) -> &HttpMethodSpec {
        &self.method_spec
    }
}

impl Permission for WebResourcePermission {
    fn kind() -> &'static str {
        "WebResourcePermission"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn actions(&self) -> Option<&str> {
        self.method_spec.actions()
    }

    fn implies(&self, that: &Self) -> bool {
        self.method_spec.implies(&that.method_spec) && self.url_pattern_spec.implies(&that.url_pattern_spec)
    }
}

impl PartialEq for WebResourcePermission {
    fn eq(&self, other: &Self) -> bool {
        self.method_spec == other.method_spec && self.url_pattern_spec == other.url_pattern_spec
    }
}

impl Eq for WebResourcePermission {}

impl Hash for WebResourcePermission {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url_pattern_spec.hash(state);
        self.method_spec.hash(state);
    }
}

impl fmt::Display for WebResourcePermission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_permission_string())
    }
}

impl TryFrom<PermissionRepr> for WebResourcePermission {
    type Error = PermissionError;

    fn try_from(value: PermissionRepr) -> Result<Self, Self::Error> {
        Self::new(&value.name, value.actions.as_deref().unwrap_or(""))
    }
}

impl From<WebResourcePermission> for PermissionRepr {
    fn from(value: WebResourcePermission) -> Self {
        PermissionRepr {
            actions: value.actions().map(str::to_string),
            name: value.name,
        }
    }
}

/// Transport guarantee required by a [`WebUserDataPermission`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TransportType {
    #[default]
    None,
    Integral,
    Confidential,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::None => "NONE",
            TransportType::Integral => "INTEGRAL",
            TransportType::Confidential => "CONFIDENTIAL",
        }
    }
}

impl FromStr for TransportType {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(TransportType::None),
            "INTEGRAL" => Ok(TransportType::Integral),
            "CONFIDENTIAL" => Ok(TransportType::Confidential),
            other => Err(PermissionError::InvalidTransportType(other.to_string())),
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport protection for web resources. Same name as [`WebResourcePermission`];
/// actions are `HTTPMethodSpec[":" transportType]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PermissionRepr", into = "PermissionRepr")]
pub struct WebUserDataPermission {
    name: String,
    url_pattern_spec: UrlPatternSpec,
    method_spec: Arc<HttpMethodSpec>,
    transport: TransportType,
    actions: Option<String>,
}

impl WebUserDataPermission {
    pub fn new(name: &str, actions: &str) -> PermissionResult<Self> {
        Self::new_in(MethodSpecFactory::global(), name, actions)
    }

    pub fn new_in(factory: &MethodSpecFactory, name: &str, actions: &str) -> PermissionResult<Self> {
        let (method_spec, transport) = match actions.split_once(':') {
            Some((methods, transport)) => (factory.spec(methods)?, transport.parse::<TransportType>()?),
            None => (factory.spec(actions)?, TransportType::None),
        };
        Self::assemble(name.to_string(), method_spec, transport)
    }

    pub fn with_methods<S: AsRef<str>>(
        name: &str,
        methods: &[S],
        transport: Option<TransportType>,
    ) -> PermissionResult<Self> {
        Self::with_methods_in(MethodSpecFactory::global(), name, methods, transport)
    }

    pub fn with_methods_in<S: AsRef<str>>(
        factory: &MethodSpecFactory,
        name: &str,
        methods: &[S],
        transport: Option<TransportType>,
    ) -> PermissionResult<Self> {
        Self::assemble(
            name.to_string(),
            factory.spec_from_methods(methods)?,
            transport.unwrap_or_default(),
        )
    }

    /// A secure request yields `CONFIDENTIAL`, anything else `NONE`.
    pub fn from_request(request: &impl RequestTarget) -> PermissionResult<Self> {
        Self::from_request_in(MethodSpecFactory::global(), request)
    }

    pub fn from_request_in(factory: &MethodSpecFactory, request: &impl RequestTarget) -> PermissionResult<Self> {
        let transport = if request.is_secure() {
            TransportType::Confidential
        } else {
            TransportType::None
        };
        Self::assemble(uri_minus_context_path(request), factory.spec(request.method())?, transport)
    }

    fn assemble(name: String, method_spec: Arc<HttpMethodSpec>, transport: TransportType) -> PermissionResult<Self> {
        let actions = match (method_spec.actions(), transport) {
            (None, TransportType::None) => None,
            (Some(methods), TransportType::None) => Some(methods.to_string()),
            (None, transport) => Some(format!(":{transport}")),
            (Some(methods), transport) => Some(format!("{methods}:{transport}")),
        };
        Ok(WebUserDataPermission {
            url_pattern_spec: UrlPatternSpec::new(&name)?,
            name,
            method_spec,
            transport,
            actions,
        })
    }

    pub fn url_pattern_spec(&self) -> &UrlPatternSpec {
        &self.url_pattern_spec
    }

    pub fn method_spec(&self) -> &HttpMethodSpec {
        &self.method_spec
    }

    pub fn transport(&self) -> TransportType {
        self.transport
    }
}

impl Permission for WebUserDataPermission {
    fn kind() -> &'static str {
        "WebUserDataPermission"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn actions(&self) -> Option<&str> {
        self.actions.as_deref()
    }

    fn implies(&self, that: &Self) -> bool {
        if self.transport != TransportType::None && self.transport != that.transport {
            return false;
        }
        self.method_spec.implies(&that.method_spec) && self.url_pattern_spec.implies(&that.url_pattern_spec)
    }
}

impl PartialEq for WebUserDataPermission {
    fn eq(&self, other: &Self) -> bool {
        self.transport == other.transport
            && self.method_spec == other.method_spec
            && self.url_pattern_spec == other.url_pattern_spec
    }
}

impl Eq for WebUserDataPermission {}

impl Hash for WebUserDataPermission {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url_pattern_spec.hash(state);
        self.actions.hash(state);
    }
}

impl fmt::Display for WebUserDataPermission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_permission_string())
    }
}

impl TryFrom<PermissionRepr> for WebUserDataPermission {
    type Error = PermissionError;

    fn try_from(value: PermissionRepr) -> Result<Self, Self::Error> {
        Self::new(&value.name, value.actions.as_deref().unwrap_or(""))
    }
}

impl From<WebUserDataPermission> for PermissionRepr {
    fn from(value: WebUserDataPermission) -> Self {
        PermissionRepr {
            name: value.name,
            actions: value.actions,
        }
    }
}
