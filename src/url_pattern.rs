use std::{cmp::Ordering, fmt};

use crate::{PermissionError, PermissionResult};

/// The servlet default pattern.
pub const DEFAULT_PATTERN: &str = "/";

/// Servlet URL pattern categories. Declaration order is the sort order used when
/// canonicalizing exclusion lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternType {
    Default,
    Extension,
    Prefix,
    Exact,
}

impl PatternType {
    /// Classifies a pattern string: extension check, then prefix, then default,
    /// else exact.
    pub fn classify(pattern: &str) -> Self {
        if pattern.starts_with("*.") {
            PatternType::Extension
        } else if pattern.starts_with('/') && pattern.ends_with("/*") {
            PatternType::Prefix
        } else if pattern == DEFAULT_PATTERN {
            PatternType::Default
        } else {
            PatternType::Exact
        }
    }
}

/// A single servlet-style URL pattern. The empty string is a legal exact pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlPattern {
    pattern: String,
    pattern_type: PatternType,
}

impl Default for UrlPattern {
    fn default() -> Self {
        UrlPattern {
            pattern: DEFAULT_PATTERN.to_string(),
            pattern_type: PatternType::Default,
        }
    }
}

impl UrlPattern {
    pub fn new(pattern: &str) -> Self {
        UrlPattern {
            pattern: pattern.to_string(),
            pattern_type: PatternType::classify(pattern),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    /// Number of `/` in the pattern plus one.
    ///
    /// A `//` anywhere but at the very start is malformed. A leading `//` is tolerated.
    pub fn depth(&self) -> PermissionResult<usize> {
        if self.pattern.match_indices("//").any(|(i, _)| i > 0) {
            return Err(PermissionError::MalformedPattern(self.pattern.clone()));
        }
        Ok(1 + self.pattern.matches('/').count())
    }

    /// Does this pattern match the argument pattern? Follows the servlet request
    /// mapping rules, in the same order:
    ///
    /// - the two patterns are string equivalent, or
    /// - this is a path-prefix pattern `/p/*` and the argument equals `/p` or
    ///   continues `/p/...` (`/*` matches everything), or
    /// - this is an extension pattern `*.ext` and the argument's last segment has the
    ///   extension `.ext`, or
    /// - this is the default pattern `/`.
    ///
    /// All comparisons are case sensitive.
    pub fn implies(&self, that: &UrlPattern) -> bool {
        let this = self.pattern.as_str();
        let that = that.pattern.as_str();

        if this == that {
            return true;
        }

        if this.starts_with('/') && this.ends_with("/*") {
            let prefix = &this[..this.len() - 2];
            if prefix.is_empty() {
                return true;
            }
            return match that.strip_prefix(prefix) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            };
        }

        if let Some(suffix) = this.strip_prefix('*') {
            if suffix.starts_with('.') {
                return match (that.rfind('/'), that.rfind('.')) {
                    (Some(slash), Some(period)) => period > slash && that.ends_with(suffix),
                    _ => false,
                };
            }
        }

        this == DEFAULT_PATTERN
    }

    /// Depth as used for ordering: only prefix and exact patterns have one.
    pub(crate) fn sort_depth(&self) -> PermissionResult<usize> {
        match self.pattern_type {
            PatternType::Prefix | PatternType::Exact => self.depth(),
            PatternType::Default | PatternType::Extension => Ok(0),
        }
    }

    /// Ordering used to sort exclusion lists: by type, then (prefix and exact only) by
    /// depth, then lexically.
    pub fn compare(&self, that: &UrlPattern) -> PermissionResult<Ordering> {
        if self.pattern_type != that.pattern_type {
            return Ok(self.pattern_type.cmp(&that.pattern_type));
        }
        Ok(self.compare_at(self.sort_depth()?, that, that.sort_depth()?))
    }

    pub(crate) fn compare_at(&self, depth: usize, that: &UrlPattern, that_depth: usize) -> Ordering {
        self.pattern_type
            .cmp(&that.pattern_type)
            .then(depth.cmp(&that_depth))
            .then_with(|| self.pattern.cmp(&that.pattern))
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
