//! Group membership traversal.
//!
//! Direct members come from a group's `member` attribute; parents come from
//! an entity's `memberOf` attribute. Recursive traversal walks nested
//! groups breadth-first, carrying a visited set so cyclic group graphs
//! terminate, and stops descending at the configured maximum depth.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::class::EntityClass;
use crate::codec::ReferenceResolver;
use crate::directory::Directory;
use crate::entity::Entity;
use crate::error::DirectoryResult;

/// Entities keyed by lowercased DN, in discovery order.
#[derive(Default)]
struct DnSet {
    seen: HashSet<String>,
    entities: Vec<Entity>,
}

impl DnSet {
    fn insert(&mut self, entity: Entity) -> bool {
        if self.seen.insert(entity.dn().to_ascii_lowercase()) {
            self.entities.push(entity);
            true
        } else {
            false
        }
    }
}

impl Directory {
    /// Returns the users that are members of `group`.
    ///
    /// With `recursive`, users of nested groups are included. Each user
    /// appears once.
    pub fn member_users(&self, group: &Entity, recursive: bool) -> DirectoryResult<Vec<Entity>> {
        self.members(group, EntityClass::User, recursive)
    }

    /// Returns the groups that are members of `group`.
    ///
    /// With `recursive`, groups nested at any depth are included. The group
    /// itself is never part of the result, even inside a cycle.
    pub fn member_groups(&self, group: &Entity, recursive: bool) -> DirectoryResult<Vec<Entity>> {
        let members = self.members(group, EntityClass::Group, recursive)?;
        Ok(members
            .into_iter()
            .filter(|member| !member.dn_matches(group.dn()))
            .collect())
    }

    /// Returns the groups `entity` is a direct member of.
    pub fn groups(&self, entity: &Entity) -> DirectoryResult<Vec<Entity>> {
        self.resolve_dns(EntityClass::Group, &entity.member_of_dns())
    }

    /// Checks whether `candidate` is a direct member of `group`.
    ///
    /// Decided by the candidate's own `memberOf` list, so it agrees with
    /// [`Directory::groups`].
    #[must_use]
    pub fn is_member(&self, group: &Entity, candidate: &Entity) -> bool {
        candidate
            .member_of_dns()
            .iter()
            .any(|dn| group.dn_matches(dn))
    }

    fn members(
        &self,
        group: &Entity,
        class: EntityClass,
        recursive: bool,
    ) -> DirectoryResult<Vec<Entity>> {
        let max_depth = self.settings().max_membership_depth;

        let mut found = DnSet::default();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(group.dn().to_ascii_lowercase());

        let mut queue = VecDeque::from([(group.clone(), 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            let dns = current.member_dns();
            if dns.is_empty() {
                continue;
            }

            let members = self.resolve_dns(class, &dns)?;
            debug!(group = %current.dn(), class = %class, count = members.len(), depth, "resolved members");

            if !recursive {
                for member in members {
                    found.insert(member);
                }
                break;
            }

            let subgroups = if class == EntityClass::Group {
                members.clone()
            } else {
                self.resolve_dns(EntityClass::Group, &dns)?
            };
            for member in members {
                found.insert(member);
            }

            if max_depth.is_some_and(|max| depth >= max) {
                if !subgroups.is_empty() {
                    warn!(group = %current.dn(), depth, "membership depth limit reached");
                }
                continue;
            }

            for subgroup in subgroups {
                if visited.insert(subgroup.dn().to_ascii_lowercase()) {
                    queue.push_back((subgroup, depth + 1));
                } else {
                    debug!(group = %subgroup.dn(), "group already visited");
                }
            }
        }

        Ok(found.entities)
    }
}
