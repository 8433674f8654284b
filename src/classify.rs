//! Row classification: eligibility, direction, and date formatting.
//!
//! Every stored row has a single address; output wants a from/to pair.
//! The direction flag decides which side the counterpart lands on.

use chrono::format::{Item, StrftimeItems};
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::info;

use crate::error::UsageError;
use crate::phone;
use crate::resolve::alias::AliasMap;
use crate::resolve::groups::GroupId;

/// Direction flag for a received message.
pub const FLAG_INCOMING: i64 = 2;
/// Direction flag for a sent message.
pub const FLAG_OUTGOING: i64 = 3;

/// One row from the `message` table, as stored. Never mutated; consumed
/// once by [`classify`].
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub rowid: i64,
    /// Local-time seconds since the unix epoch.
    pub date: i64,
    pub address: Option<String>,
    pub text: Option<String>,
    pub flags: i64,
    pub group_id: Option<GroupId>,
}

/// Output-ready message record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMessage {
    pub date: String,
    #[serde(rename = "from")]
    pub from_addr: String,
    #[serde(rename = "to")]
    pub to_addr: String,
    pub text: String,
}

/// Check a strftime-style date format string before the run starts.
/// chrono only reports unknown specifiers at render time; a bad
/// `--date-format` has to fail as a usage error instead.
pub fn validate_date_format(format: &str) -> Result<(), UsageError> {
    let has_error = StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
    if has_error {
        Err(UsageError::DateFormat(format.to_string()))
    } else {
        Ok(())
    }
}

/// Classify one stored row into an output record, or skip it.
///
/// Skip conditions, in order: direction flag is neither incoming nor
/// outgoing; empty address; empty text. Skips are logged and excluded from
/// output, never errors.
pub fn classify(
    row: &MessageRow,
    identity: &str,
    aliases: &AliasMap,
    date_format: &str,
) -> Option<ResolvedMessage> {
    if row.flags != FLAG_INCOMING && row.flags != FLAG_OUTGOING {
        info!(
            "Skipping msg ({}) not sent. Address: {:?}. Text: {:?}.",
            row.rowid, row.address, row.text
        );
        return None;
    }

    let address = match row.address.as_deref() {
        Some(a) if !a.is_empty() => a,
        _ => {
            info!("Skipping msg ({}) without address. Text: {:?}", row.rowid, row.text);
            return None;
        }
    };

    let text = match row.text.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => {
            info!("Skipping msg ({}) without text. Address: {}", row.rowid, address);
            return None;
        }
    };

    let date = match format_date(row.date, date_format) {
        Some(d) => d,
        None => {
            info!("Skipping msg ({}) with unrepresentable date {}", row.rowid, row.date);
            return None;
        }
    };

    let counterpart = row
        .group_id
        .and_then(|group_id| aliases.get(&group_id).cloned())
        .unwrap_or_else(|| phone::format_for_display(address));

    let (from_addr, to_addr) = if row.flags == FLAG_INCOMING {
        (counterpart, identity.to_string())
    } else {
        (identity.to_string(), counterpart)
    };

    Some(ResolvedMessage {
        date,
        from_addr,
        to_addr,
        text: text.to_string(),
    })
}

/// Render a local-time unix timestamp through a strftime format string.
/// Returns None for timestamps outside chrono's representable range or
/// for a format string that fails at render time.
fn format_date(timestamp: i64, format: &str) -> Option<String> {
    let dt = Local.timestamp_opt(timestamp, 0).single()?;
    let mut out = String::new();
    write!(out, "{}", dt.format(format)).ok()?;
    Some(out)
}
