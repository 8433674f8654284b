//! SQLite connection management for the SMS store working copy.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open a read-only connection to the working copy of the SMS store.
/// The engine never writes to the store.
pub fn open_readonly(db_path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        db_path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open SMS database at {:?}", db_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_readonly_missing_file() {
        assert!(open_readonly(Path::new("/nonexistent/sms.db")).is_err());
    }

    #[test]
    fn test_open_readonly_rejects_writes() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        {
            let conn = Connection::open(tmp.path()).unwrap();
            conn.execute_batch("CREATE TABLE message (id INTEGER)").unwrap();
        }
        let ro = open_readonly(tmp.path()).unwrap();
        assert!(ro.execute("INSERT INTO message VALUES (1)", []).is_err());
    }
}
