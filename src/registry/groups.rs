//! Group directory
//!
//! Maps group names to member handle sets. `BTreeSet` keeps members in
//! ascending handle order, which fixes the fan-out order.

use std::collections::{BTreeSet, HashMap};

use super::ClientId;

#[derive(Debug, Default)]
pub struct GroupDirectory {
    groups: HashMap<String, BTreeSet<ClientId>>,
}

impl GroupDirectory {
    pub fn insert(&mut self, name: &str, members: BTreeSet<ClientId>) {
        self.groups.insert(name.to_string(), members);
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn members(&self, name: &str) -> Option<&BTreeSet<ClientId>> {
        self.groups.get(name)
    }

    pub fn is_member(&self, name: &str, id: ClientId) -> bool {
        self.groups
            .get(name)
            .is_some_and(|members| members.contains(&id))
    }

    /// Drop `id` from every group. Groups themselves are never removed.
    pub fn purge_member(&mut self, id: ClientId) {
        for members in self.groups.values_mut() {
            members.remove(&id);
        }
    }
}
