//! Conversation-group resolution by phone-number suffix.
//!
//! The `group_member.address` column is inconsistently formatted: the same
//! number can be stored as "(555) 555-1212", "+15555551212", or
//! "5555551212". Matching therefore compares digits-only forms by their
//! last-10-digit suffix instead of exact equality.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::collections::BTreeSet;
use tracing::warn;

use crate::db::queries;
use crate::phone;

/// Identifier grouping the address strings that denote one counterpart.
pub type GroupId = i64;

/// Group-membership index, normalized once at load time.
///
/// Each stored address is reduced to its digits and kept alongside its
/// group id; lookups run against this index in memory, so no SQL scalar
/// function is registered on the connection.
pub struct GroupResolver {
    members: Vec<(String, GroupId)>,
}

impl GroupResolver {
    /// Load and normalize the whole `group_member` table.
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut stmt = conn
            .prepare(queries::GROUP_MEMBERS)
            .context("Failed to prepare group_member query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, GroupId>(1)?,
                ))
            })
            .context("Failed to query group_member")?;

        let mut members = Vec::new();
        for row in rows {
            let (address, group_id) = row.context("Failed to read group_member row")?;
            if let Some(address) = address {
                members.push((phone::strip(&address), group_id));
            }
        }

        Ok(Self { members })
    }

    /// Build a resolver from pre-stripped (digits, group id) pairs.
    #[cfg(test)]
    pub fn from_members(members: Vec<(String, GroupId)>) -> Self {
        Self { members }
    }

    /// Find every conversation group whose stored address ends with the
    /// last-10-digit suffix of `number` (all digits, for shorter numbers).
    ///
    /// An empty result is a soft miss, reported as a warning: callers fall
    /// back to "no filtering by this number", never to an error.
    pub fn resolve(&self, number: &str) -> BTreeSet<GroupId> {
        let digits = phone::strip(number);
        let suffix = &digits[digits.len().saturating_sub(10)..];

        let groups: BTreeSet<GroupId> = self
            .members
            .iter()
            .filter(|(address, _)| address.ends_with(suffix))
            .map(|&(_, group_id)| group_id)
            .collect();

        if groups.is_empty() {
            warn!("Phone number not found: {}", number);
        }
        groups
    }
}
