//! Message filter planning from requested phone numbers.

use std::collections::BTreeSet;
use tracing::info;

use crate::error::UsageError;
use crate::phone;
use crate::resolve::groups::{GroupId, GroupResolver};

/// Which messages a run retrieves.
///
/// `All` is the safe fallback: a set of requested numbers that resolves to
/// zero groups must mean "all messages", never an empty result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    All,
    Groups(Vec<GroupId>),
}

/// Validate `--phone` arguments before any storage access.
pub fn validate_numbers(numbers: &[String]) -> Result<(), UsageError> {
    for number in numbers {
        if !phone::is_valid(number) {
            return Err(UsageError::FilterNumber(number.clone()));
        }
    }
    Ok(())
}

/// Union the conversation groups of every requested number.
///
/// Numbers that resolve to nothing have already been warned about by the
/// resolver; if the union ends up empty the whole filter degrades to `All`.
pub fn build_filter(resolver: &GroupResolver, numbers: &[String]) -> FilterSpec {
    let mut union: BTreeSet<GroupId> = BTreeSet::new();
    for number in numbers {
        union.extend(resolver.resolve(number));
    }

    if union.is_empty() {
        if !numbers.is_empty() {
            info!("No requested number matched a conversation group; returning all messages");
        }
        FilterSpec::All
    } else {
        FilterSpec::Groups(union.into_iter().collect())
    }
}
