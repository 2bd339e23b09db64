use std::{
    borrow::Cow,
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, LazyLock, OnceLock},
};

use crate::{PermissionError, PermissionResult, registry::ExtensionMethodRegistry};

/// Standard HTTP methods in canonical output order. Bit `i` of a standard map stands
/// for `STANDARD_METHODS[i]`.
pub const STANDARD_METHODS: [&str; 7] = ["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT", "TRACE"];

const ALL_STANDARD: u8 = (1 << STANDARD_METHODS.len()) - 1;
const INTERNED_SLOTS: usize = (ALL_STANDARD as usize + 1) * 2;

fn standard_bit(method: &str) -> Option<u8> {
    STANDARD_METHODS
        .iter()
        .position(|m| *m == method)
        .map(|i| 1u8 << i)
}

/// Set of registry indices of extension methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExtensionSet {
    words: Vec<u64>,
}

impl ExtensionSet {
    pub fn insert(&mut self, index: usize) {
        let word = index / 64;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (index % 64);
    }

    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|w| w & (1u64 << (index % 64)) != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn is_subset(&self, other: &ExtensionSet) -> bool {
        self.words.iter().enumerate().all(|(i, w)| {
            let theirs = other.words.get(i).copied().unwrap_or(0);
            w & theirs == *w
        })
    }

    pub fn intersects(&self, other: &ExtensionSet) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, w)| {
            (0..64usize).filter(move |bit| w & (1u64 << bit) != 0).map(move |bit| i * 64 + bit)
        })
    }
}

/// A set of HTTP methods: all methods, an explicit list, or everything except a list
/// (an exception list, written with a leading `!`).
///
/// Actions grammar:
///
/// ```text
/// HTTPMethod          ::= "GET" | "POST" | "PUT" | "DELETE" | "HEAD" | "OPTIONS" | "TRACE" | ExtensionMethod
/// HTTPMethodList      ::= HTTPMethod | HTTPMethodList comma HTTPMethod
/// HTTPMethodExceptionList ::= exclaimationPoint HTTPMethodList
/// HTTPMethodSpec      ::= null | emptyString | HTTPMethodExceptionList | HTTPMethodList
/// ```
///
/// Extension methods are stored as indices into the [`ExtensionMethodRegistry`] of the
/// [`MethodSpecFactory`] that built the spec. Specs from different factories are
/// compared by method name.
#[derive(Debug, Clone)]
pub struct HttpMethodSpec {
    exception_list: bool,
    standard_map: u8,
    extensions: Option<ExtensionSet>,
    registry: Option<Arc<ExtensionMethodRegistry>>,
    actions: Option<String>,
}

impl HttpMethodSpec {
    /// Parses with the process-default factory.
    pub fn parse(actions: &str) -> PermissionResult<Arc<HttpMethodSpec>> {
        MethodSpecFactory::global().spec(actions)
    }

    /// Builds from a method list with the process-default factory.
    pub fn from_methods<S: AsRef<str>>(methods: &[S]) -> PermissionResult<Arc<HttpMethodSpec>> {
        MethodSpecFactory::global().spec_from_methods(methods)
    }

    /// Canonical actions, or `None` for "all methods".
    pub fn actions(&self) -> Option<&str> {
        self.actions.as_deref()
    }

    pub fn is_all(&self) -> bool {
        self.standard_map == 0 && self.extensions.is_none()
    }

    pub fn is_exception_list(&self) -> bool {
        self.exception_list
    }

    pub fn standard_map(&self) -> u8 {
        self.standard_map
    }

    pub fn extensions(&self) -> Option<&ExtensionSet> {
        self.extensions.as_ref()
    }

    /// The extensions of this spec as indices of `registry`, and whether some of them
    /// are not registered there.
    fn extensions_in(
        &self,
        registry: Option<&Arc<ExtensionMethodRegistry>>,
    ) -> (Option<Cow<'_, ExtensionSet>>, bool) {
        let Some(extensions) = &self.extensions else {
            return (None, false);
        };
        match (&self.registry, registry) {
            (Some(own), Some(target)) if !Arc::ptr_eq(own, target) => {
                let mut aligned = ExtensionSet::default();
                let mut unknown = false;
                for method in own.methods(extensions.iter()) {
                    match target.index_of(&method) {
                        Some(index) => aligned.insert(index),
                        None => unknown = true,
                    }
                }
                (Some(Cow::Owned(aligned)), unknown)
            }
            _ => (Some(Cow::Borrowed(extensions)), false),
        }
    }

    /// True when every method in `that` is also in `self`.
    pub fn implies(&self, that: &HttpMethodSpec) -> bool {
        if self.is_all() {
            return true;
        }
        if that.is_all() {
            return false;
        }

        // Extensions of `that` unknown to our registry are in none of our sets.
        let (theirs, unknown) = that.extensions_in(self.registry.as_ref());

        match (self.exception_list, that.exception_list) {
            (true, true) => {
                if self.standard_map & that.standard_map != self.standard_map {
                    return false;
                }
                match (&self.extensions, &theirs) {
                    (None, _) => true,
                    (Some(_), None) => false,
                    (Some(ours), Some(theirs)) => ours.is_subset(theirs),
                }
            }
            (false, false) => {
                if self.standard_map & that.standard_map != that.standard_map {
                    return false;
                }
                match (&self.extensions, &theirs) {
                    (_, None) => true,
                    (None, Some(_)) => false,
                    (Some(ours), Some(theirs)) => !unknown && theirs.is_subset(ours),
                }
            }
            (true, false) => {
                if self.standard_map & that.standard_map != 0 {
                    return false;
                }
                match (&self.extensions, &theirs) {
                    (Some(ours), Some(theirs)) => !ours.intersects(theirs),
                    _ => true,
                }
            }
            // A finite list never covers an open complement.
            (false, true) => false,
        }
    }
}

impl PartialEq for HttpMethodSpec {
    fn eq(&self, other: &Self) -> bool {
        self.actions == other.actions
    }
}

impl Eq for HttpMethodSpec {}

impl Hash for HttpMethodSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.actions.hash(state);
    }
}

impl fmt::Display for HttpMethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.actions.as_deref().unwrap_or(""))
    }
}

/// Builds [`HttpMethodSpec`]s.
///
/// Owns the extension method registry, and shares one instance per standard-method
/// bitmask and exception flag.
#[derive(Debug)]
pub struct MethodSpecFactory {
    registry: Arc<ExtensionMethodRegistry>,
    interned: Vec<OnceLock<Arc<HttpMethodSpec>>>,
}

static GLOBAL_FACTORY: LazyLock<MethodSpecFactory> = LazyLock::new(MethodSpecFactory::new);

impl Default for MethodSpecFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodSpecFactory {
    pub fn new() -> Self {
        MethodSpecFactory {
            registry: Arc::new(ExtensionMethodRegistry::new()),
            interned: (0..INTERNED_SLOTS).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Process-default factory used by the plain permission constructors.
    pub fn global() -> &'static MethodSpecFactory {
        &GLOBAL_FACTORY
    }

    pub fn registry(&self) -> &ExtensionMethodRegistry {
        &self.registry
    }

    /// The "all methods" spec.
    pub fn all(&self) -> Arc<HttpMethodSpec> {
        self.standard(false, 0)
    }

    /// Parses an actions string. `""` means all methods.
    pub fn spec(&self, actions: &str) -> PermissionResult<Arc<HttpMethodSpec>> {
        if actions.is_empty() {
            return Ok(self.all());
        }

        let (exception_list, list) = match actions.strip_prefix('!') {
            Some("") => return Err(PermissionError::InvalidHttpMethodSpec(actions.to_string())),
            Some(rest) => (true, rest),
            None => (false, actions),
        };

        let mut map = 0;
        let mut extensions = ExtensionSet::default();
        for method in list.split(',') {
            if method.is_empty() {
                return Err(PermissionError::InvalidHttpMethodSpec(actions.to_string()));
            }
            self.add_method(method, actions, &mut map, &mut extensions)?;
        }

        Ok(self.build(exception_list, map, extensions))
    }

    /// Builds a plain (non-exception) list from method names. An empty slice means all
    /// methods.
    pub fn spec_from_methods<S: AsRef<str>>(&self, methods: &[S]) -> PermissionResult<Arc<HttpMethodSpec>> {
        let mut map = 0;
        let mut extensions = ExtensionSet::default();
        for method in methods {
            let method = method.as_ref();
            self.add_method(method, method, &mut map, &mut extensions)?;
        }
        Ok(self.build(false, map, extensions))
    }

    fn add_method(
        &self,
        method: &str,
        source: &str,
        map: &mut u8,
        extensions: &mut ExtensionSet,
    ) -> PermissionResult<()> {
        if let Some(bit) = standard_bit(method) {
            *map |= bit;
            return Ok(());
        }
        if http::Method::from_bytes(method.as_bytes()).is_err() {
            return Err(PermissionError::InvalidHttpMethodSpec(source.to_string()));
        }
        extensions.insert(self.registry.intern(method));
        Ok(())
    }

    fn build(&self, exception_list: bool, map: u8, extensions: ExtensionSet) -> Arc<HttpMethodSpec> {
        if extensions.is_empty() {
            return self.standard(exception_list, map);
        }

        let base = self.standard(exception_list, map);
        let mut names = self.registry.methods(extensions.iter());
        names.sort();

        let mut actions = match base.actions() {
            Some(standard) => standard.to_string(),
            None if exception_list => "!".to_string(),
            None => String::new(),
        };
        for (i, name) in names.iter().enumerate() {
            if i > 0 || map > 0 {
                actions.push(',');
            }
            actions.push_str(name);
        }

        Arc::new(HttpMethodSpec {
            exception_list,
            standard_map: map,
            extensions: Some(extensions),
            registry: Some(Arc::clone(&self.registry)),
            actions: Some(actions),
        })
    }

    fn standard(&self, exception_list: bool, map: u8) -> Arc<HttpMethodSpec> {
        let slot = usize::from(map & ALL_STANDARD) * 2 + usize::from(exception_list);
        Arc::clone(self.interned[slot].get_or_init(|| {
            Arc::new(HttpMethodSpec {
                exception_list,
                standard_map: map,
                extensions: None,
                registry: None,
                actions: standard_actions(exception_list, map),
            })
        }))
    }
}

fn standard_actions(exception_list: bool, map: u8) -> Option<String> {
    if map == 0 {
        return None;
    }
    let methods: Vec<&str> = STANDARD_METHODS
        .iter()
        .enumerate()
        .filter(|(i, _)| map & (1u8 << i) != 0)
        .map(|(_, m)| *m)
        .collect();
    let list = methods.join(",");
    Some(if exception_list { format!("!{list}") } else { list })
}
