//! Client directory
//!
//! Bidirectional name <-> handle mapping. Both maps live in this one type
//! so they cannot drift apart.

use std::collections::HashMap;

use super::ClientId;

#[derive(Debug, Default)]
pub struct ClientDirectory {
    by_name: HashMap<String, ClientId>,
    by_id: HashMap<ClientId, String>,
}

impl ClientDirectory {
    pub fn insert(&mut self, id: ClientId, name: &str) {
        self.by_name.insert(name.to_string(), id);
        self.by_id.insert(id, name.to_string());
    }

    pub fn remove(&mut self, id: ClientId) -> Option<String> {
        let name = self.by_id.remove(&id)?;
        self.by_name.remove(&name);
        Some(name)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn id_of(&self, name: &str) -> Option<ClientId> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: ClientId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// All names, lexicographically sorted (case-sensitive ASCII order).
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }
}
