//! Database schema definitions and migrations
//!
//! Migrations are forward-only. The number applied so far is kept in
//! `PRAGMA user_version`; opening a database applies the rest, each in its
//! own transaction. Nothing here drops existing data.

use rusqlite::Connection;

/// Ordered migration scripts; index + 1 is the resulting schema version
pub const MIGRATIONS: &[&str] = &[
    // 1: audits table with the results blob
    r#"
    CREATE TABLE IF NOT EXISTS audits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        title TEXT,
        score_seo INTEGER NOT NULL DEFAULT 0,
        score_performance INTEGER NOT NULL DEFAULT 0,
        score_security INTEGER NOT NULL DEFAULT 0,
        broken_links INTEGER NOT NULL DEFAULT 0,
        results_data TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_audits_timestamp ON audits(timestamp);
    "#,
    // 2: lifecycle status; rows that already hold results are complete
    r#"
    ALTER TABLE audits ADD COLUMN status TEXT NOT NULL DEFAULT 'pending';
    UPDATE audits SET status = 'completed' WHERE results_data IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_audits_status ON audits(status);
    "#,
];

/// Latest schema version this build knows about
pub fn schema_version() -> u32 {
    MIGRATIONS.len() as u32
}

/// Applies every migration newer than the database's `user_version`
///
/// Returns the number of migrations applied.
pub fn apply_migrations(conn: &mut Connection) -> Result<usize, rusqlite::Error> {
    let current: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    let mut applied = 0;

    for (index, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let version = index + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {}", version))?;
        tx.commit()?;

        tracing::debug!("Applied schema migration {}", version);
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_version(conn: &Connection) -> u32 {
        conn.query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_migrations_apply() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(apply_migrations(&mut conn).unwrap(), MIGRATIONS.len());
        assert_eq!(user_version(&conn), schema_version());
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
        assert_eq!(user_version(&conn), schema_version());
    }

    #[test]
    fn test_status_backfill_from_version_one() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(MIGRATIONS[0]).unwrap();
        conn.execute_batch("PRAGMA user_version = 1").unwrap();
        conn.execute_batch(
            "INSERT INTO audits (url, timestamp, results_data) VALUES ('https://a.com/', 't', '{}');
             INSERT INTO audits (url, timestamp) VALUES ('https://b.com/', 't');",
        )
        .unwrap();

        assert_eq!(apply_migrations(&mut conn).unwrap(), 1);

        let statuses: Vec<String> = conn
            .prepare("SELECT status FROM audits ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(statuses, vec!["completed", "pending"]);
    }
}
