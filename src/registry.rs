use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;

/// Append-only table of non-standard HTTP method names.
///
/// Every name gets a stable index the first time it is seen; indices are never reused
/// or removed for the lifetime of the registry. Reads work on a lock-free snapshot,
/// appends swap in a new snapshot with read-copy-update.
#[derive(Debug, Default)]
pub struct ExtensionMethodRegistry {
    state: ArcSwap<RegistryState>,
}

#[derive(Debug, Default, Clone)]
struct RegistryState {
    methods: Vec<String>,
    index: HashMap<String, usize>,
}

impl ExtensionMethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `method`, registering it first if needed.
    pub fn intern(&self, method: &str) -> usize {
        if let Some(index) = self.index_of(method) {
            return index;
        }

        let mut index = 0;
        let mut appended = false;
        self.state.rcu(|state| {
            if let Some(existing) = state.index.get(method) {
                index = *existing;
                appended = false;
                return Arc::clone(state);
            }
            let mut next = RegistryState::clone(state);
            index = next.methods.len();
            appended = true;
            next.methods.push(method.to_string());
            next.index.insert(method.to_string(), index);
            Arc::new(next)
        });

        if appended {
            tracing::debug!(method = %method, index, "Registered extension HTTP method");
        }
        index
    }

    pub fn index_of(&self, method: &str) -> Option<usize> {
        self.state.load().index.get(method).copied()
    }

    pub fn method(&self, index: usize) -> Option<String> {
        self.state.load().methods.get(index).cloned()
    }

    /// Resolves several indices against a single snapshot.
    pub fn methods(&self, indices: impl IntoIterator<Item = usize>) -> Vec<String> {
        let state = self.state.load();
        indices
            .into_iter()
            .filter_map(|i| state.methods.get(i).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.load().methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
