//! SQL text for the SMS store.
//!
//! Two tables matter: `message` (rowid, date, address, text, flags,
//! group_id) and `group_member` (address, group_id). Output order is
//! ascending rowid everywhere, which tracks message arrival order.

/// All group-membership rows. Address normalization happens in Rust, not
/// in SQL, so this is the whole table.
pub const GROUP_MEMBERS: &str = "\
SELECT address, group_id \
FROM group_member";

/// All messages, in arrival order.
pub const MESSAGES_ALL: &str = "\
SELECT rowid, date, address, text, flags, group_id \
FROM message \
ORDER BY rowid";

/// Messages restricted to a set of conversation groups, in arrival order.
/// `n` is the number of group ids bound as positional parameters.
pub fn messages_by_groups(n: usize) -> String {
    format!(
        "SELECT rowid, date, address, text, flags, group_id \
         FROM message \
         WHERE group_id IN ({}) \
         ORDER BY rowid",
        placeholders(n)
    )
}

/// Comma-separated positional placeholders for a `WHERE IN (...)` clause.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
