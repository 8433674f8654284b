//! Alias resolution: mapping conversation groups to display names.
//!
//! Aliases arrive as "PHONE=NAME" pairs. Syntax is validated before any
//! storage access and a bad pair aborts the run; a well-formed pair whose
//! number matches no conversation group is merely dropped with a warning.

use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

use crate::error::UsageError;
use crate::phone;
use crate::resolve::groups::{GroupId, GroupResolver};

/// Display names keyed by conversation group. Every key originates from a
/// successful group lookup.
pub type AliasMap = HashMap<GroupId, String>;

/// A validated "PHONE=NAME" pair, not yet resolved against the store.
#[derive(Debug, Clone)]
pub struct AliasPair {
    pub number: String,
    pub name: String,
}

/// Validate and split raw "PHONE=NAME" arguments.
///
/// Exactly one '=' with non-empty sides, and the left side must pass the
/// phone-number acceptance threshold. The name is kept exactly as written.
pub fn parse_alias_pairs(raw: &[String]) -> Result<Vec<AliasPair>, UsageError> {
    let pair_re = Regex::new(r"^([^=]+)=([^=]+)$").expect("alias pattern is valid");

    let mut pairs = Vec::with_capacity(raw.len());
    for arg in raw {
        let caps = pair_re
            .captures(arg)
            .ok_or_else(|| UsageError::AliasSyntax(arg.clone()))?;
        let number = caps[1].to_string();
        if !phone::is_valid(&number) {
            return Err(UsageError::AliasNumber(number));
        }
        pairs.push(AliasPair {
            number,
            name: caps[2].to_string(),
        });
    }
    Ok(pairs)
}

/// Resolve each alias number to its conversation groups and register the
/// name for every group found. Pairs that resolve to nothing contribute
/// nothing: an alias for an unknown number must not fail the run.
pub fn build_alias_map(resolver: &GroupResolver, pairs: &[AliasPair]) -> AliasMap {
    let mut map = AliasMap::new();
    for pair in pairs {
        let groups = resolver.resolve(&pair.number);
        if groups.is_empty() {
            warn!("Dropping alias for unmatched number: {}", pair.number);
            continue;
        }
        for group_id in groups {
            map.insert(group_id, pair.name.clone());
        }
    }
    map
}
