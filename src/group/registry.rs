//! Group Registry
//!
//! Process-wide map from group name to [`Group`]. Groups register themselves on
//! construction and live until the process exits; the peer handler resolves incoming
//! requests through [`get_group`].
//!
//! Lookups take the read side of the lock, so requests for different groups never
//! contend with each other. Only registration takes the write side.

use super::group::Group;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

static REGISTRY: LazyLock<GroupRegistry> = LazyLock::new(GroupRegistry::new);

/// Registry holding every group created in this process.
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Stores `group` under its name, replacing any group registered under the same name.
    pub fn register(&self, group: Arc<Group>) {
        let name = group.name().to_string();
        if self.groups.write().insert(name.clone(), group).is_some() {
            tracing::warn!("Group {} registered twice, replacing the previous one", name);
        } else {
            tracing::debug!("Registered group: {}", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Returns the names of all registered groups.
    #[cfg(test)]
    pub(crate) fn names(&self) -> Vec<String> {
        self.groups.read().keys().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.groups.read().contains_key(name)
    }
}

/// The registry shared by the whole process.
pub fn registry() -> &'static GroupRegistry {
    &REGISTRY
}

/// Looks up a group by name.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    REGISTRY.get(name)
}
