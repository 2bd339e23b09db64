use std::{
    fmt,
    hash::{Hash, Hasher},
};

use crate::{
    PermissionError, PermissionResult,
    url_pattern::{PatternType, UrlPattern},
};

/// A first pattern plus the list of patterns it does NOT apply to.
///
/// Grammar of the source string:
///
/// ```text
/// URLPatternList ::= URLPattern | URLPatternList colon URLPattern
/// URLPatternSpec ::= URLPattern | URLPattern colon URLPatternList
/// ```
///
/// Literal colons inside a pattern must already be escaped by the caller. The
/// exclusion list is validated against the first pattern's type, sorted, and pruned of
/// prefix patterns covered by an earlier prefix pattern, so that [`UrlPatternSpec::canonical`]
/// is unique for every set of equivalent inputs.
#[derive(Debug, Clone)]
pub struct UrlPatternSpec {
    first: UrlPattern,
    exclusions: Vec<UrlPattern>,
    canonical: String,
}

impl UrlPatternSpec {
    pub fn new(spec: &str) -> PermissionResult<Self> {
        let (first, list) = match spec.split_once(':') {
            Some((first, list)) => (UrlPattern::new(first), Some(list)),
            None => (UrlPattern::new(spec), None),
        };

        let exclusions = match list {
            Some(list) => build_exclusions(spec, &first, list).inspect_err(|err| {
                tracing::debug!(spec = %spec, error = %err, "Rejected URL pattern spec");
            })?,
            None => Vec::new(),
        };

        let mut canonical = first.as_str().to_string();
        for pattern in &exclusions {
            canonical.push(':');
            canonical.push_str(pattern.as_str());
        }

        Ok(UrlPatternSpec {
            first,
            exclusions,
            canonical,
        })
    }

    /// The first pattern.
    pub fn url_pattern(&self) -> &UrlPattern {
        &self.first
    }

    /// Surviving exclusion patterns, in canonical order.
    pub fn exclusions(&self) -> &[UrlPattern] {
        &self.exclusions
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// True when all of the following hold:
    ///
    /// - the first pattern of `that` is matched by the first pattern of `self`;
    /// - it is not matched by any exclusion of `self`;
    /// - if it also matches the first pattern of `self`, every exclusion of `self` is
    ///   matched by some exclusion of `that`.
    pub fn implies(&self, that: &UrlPatternSpec) -> bool {
        if !self.first.implies(&that.first) {
            return false;
        }

        if self.exclusions.iter().any(|excluded| excluded.implies(&that.first)) {
            return false;
        }

        if !self.exclusions.is_empty() && that.first.implies(&self.first) {
            if that.exclusions.is_empty() {
                return false;
            }

            // First-fit marking; one exclusion of `that` may cover several of ours.
            let mut covered = vec![false; self.exclusions.len()];
            let mut count = 0;
            for theirs in &that.exclusions {
                for (i, ours) in self.exclusions.iter().enumerate() {
                    if !covered[i] && theirs.implies(ours) {
                        covered[i] = true;
                        count += 1;
                        if count == covered.len() {
                            return true;
                        }
                    }
                }
            }
            return count == covered.len();
        }

        true
    }
}

fn build_exclusions(spec: &str, first: &UrlPattern, list: &str) -> PermissionResult<Vec<UrlPattern>> {
    let mut ranked = Vec::new();

    for token in list.split(':') {
        let pattern = UrlPattern::new(token);

        if pattern.implies(first) {
            return Err(PermissionError::url_pattern_spec(
                spec,
                "pattern in URLPatternList implies first pattern",
            ));
        }

        match first.pattern_type() {
            PatternType::Prefix | PatternType::Extension => match pattern.pattern_type() {
                PatternType::Prefix => {
                    if first.pattern_type() == PatternType::Prefix
                        && (pattern == *first || !first.implies(&pattern))
                    {
                        return Err(PermissionError::url_pattern_spec(
                            spec,
                            "invalid prefix pattern in URLPatternList",
                        ));
                    }
                }
                PatternType::Exact => {
                    if !first.implies(&pattern) {
                        return Err(PermissionError::url_pattern_spec(
                            spec,
                            "invalid exact pattern in URLPatternList",
                        ));
                    }
                }
                PatternType::Default | PatternType::Extension => {
                    return Err(PermissionError::url_pattern_spec(
                        spec,
                        "invalid pattern type in URLPatternList",
                    ));
                }
            },
            PatternType::Default => {}
            PatternType::Exact => {
                return Err(PermissionError::url_pattern_spec(
                    spec,
                    "exact pattern may not have a URLPatternList",
                ));
            }
        }

        if pattern == *first {
            return Err(PermissionError::url_pattern_spec(
                spec,
                "first pattern repeated in URLPatternList",
            ));
        }

        let depth = pattern.sort_depth()?;
        ranked.push((pattern, depth));
    }

    ranked.sort_by(|(a, a_depth), (b, b_depth)| a.compare_at(*a_depth, b, *b_depth));

    let mut slots: Vec<Option<UrlPattern>> = ranked.into_iter().map(|(p, _)| Some(p)).collect();
    for i in 0..slots.len() {
        let Some(prefix) = slots[i].clone() else {
            continue;
        };
        if prefix.pattern_type() != PatternType::Prefix {
            continue;
        }
        for slot in slots.iter_mut().skip(i + 1) {
            if slot.as_ref().is_some_and(|later| prefix.implies(later)) {
                tracing::trace!(
                    spec = %spec,
                    covered_by = %prefix,
                    pruned = ?slot.as_ref().map(UrlPattern::as_str),
                    "Pruned redundant exclusion pattern"
                );
                *slot = None;
            }
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

impl PartialEq for UrlPatternSpec {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for UrlPatternSpec {}

impl Hash for UrlPatternSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for UrlPatternSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
