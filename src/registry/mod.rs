//! Client and group registries
//!
//! Tracks which connection owns which client name and which clients belong
//! to which group. Client names and group names share one name space and
//! must stay pairwise disjoint, so both directories live behind the
//! [`Registry`] facade and every mutation goes through it.

pub mod clients;
pub mod groups;

use std::collections::BTreeSet;

use crate::error::{GroupError, RegistryError};

pub use clients::ClientDirectory;
pub use groups::GroupDirectory;

/// Opaque identifier for one live connection, stable for its lifetime.
/// Assigned monotonically at accept, so ascending id order is accept order.
pub type ClientId = u64;

/// A legal client or group name: non-empty, `[A-Za-z0-9]` only.
pub fn is_legal_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// The server's entire name space: clients and groups.
#[derive(Debug, Default)]
pub struct Registry {
    clients: ClientDirectory,
    groups: GroupDirectory,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` for the connection `id`.
    ///
    /// This is the only path by which a connection becomes an addressable
    /// client. The name must be legal and collide with no client or group.
    pub fn register_client(&mut self, id: ClientId, name: &str) -> Result<(), RegistryError> {
        if !is_legal_name(name) {
            return Err(RegistryError::IllegalName(name.to_string()));
        }
        if self.clients.contains_name(name) || self.groups.contains_name(name) {
            return Err(RegistryError::NameTaken(name.to_string()));
        }
        self.clients.insert(id, name);
        Ok(())
    }

    /// Remove the client registered for `id`, if any, and purge the handle
    /// from every group it belonged to. Groups are never deleted, even when
    /// membership falls below two.
    ///
    /// Returns the name that was registered.
    pub fn unregister(&mut self, id: ClientId) -> Option<String> {
        let name = self.clients.remove(id)?;
        self.groups.purge_member(id);
        Some(name)
    }

    pub fn client_name(&self, id: ClientId) -> Option<&str> {
        self.clients.name_of(id)
    }

    pub fn client_id(&self, name: &str) -> Option<ClientId> {
        self.clients.id_of(name)
    }

    /// All registered client names, lexicographically sorted.
    pub fn client_names(&self) -> Vec<String> {
        self.clients.sorted_names()
    }

    /// Create a group containing the creator plus every resolved member.
    ///
    /// Member names resolve left to right; the first unresolvable name
    /// aborts the whole operation with nothing created. The final member
    /// set must hold at least two distinct handles.
    pub fn create_group(
        &mut self,
        creator: ClientId,
        name: &str,
        member_names: &[String],
    ) -> Result<(), GroupError> {
        if !is_legal_name(name)
            || self.clients.contains_name(name)
            || self.groups.contains_name(name)
        {
            return Err(GroupError::IllegalName(name.to_string()));
        }

        let mut members = BTreeSet::new();
        members.insert(creator);
        for member in member_names {
            match self.clients.id_of(member) {
                Some(id) => {
                    members.insert(id);
                }
                None => return Err(GroupError::UnknownMember(member.clone())),
            }
        }

        if members.len() < 2 {
            return Err(GroupError::TooFewMembers(name.to_string()));
        }

        self.groups.insert(name, members);
        Ok(())
    }

    /// Member handles of a group, in ascending handle order.
    pub fn group_members(&self, name: &str) -> Option<&BTreeSet<ClientId>> {
        self.groups.members(name)
    }

    pub fn is_group_member(&self, name: &str, id: ClientId) -> bool {
        self.groups.is_member(name, id)
    }
}
