//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: calorie log, profiles, pending profiles
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- CALORIE LOGS
        -- One row per logged food or exercise entry
        -- ============================================
        CREATE TABLE calorie_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            date TEXT NOT NULL,                  -- ISO date: "2025-01-09"
            type TEXT NOT NULL CHECK(type IN ('food', 'exercise')),
            description TEXT NOT NULL,
            calories REAL NOT NULL DEFAULT 0,    -- per serving (food) or burned (exercise)

            -- Food only
            protein REAL,                        -- grams
            fat REAL,                            -- grams
            carbs REAL,                          -- grams
            quantity REAL,                       -- servings

            -- Exercise only
            duration REAL,                       -- minutes
            met REAL,

            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX idx_calorie_logs_user ON calorie_logs(user_id, created_at);

        -- ============================================
        -- PROFILES
        -- Physical attributes used for exercise estimates
        -- ============================================
        CREATE TABLE profiles (
            user_id TEXT PRIMARY KEY,
            gender TEXT NOT NULL CHECK(gender IN ('male', 'female')),
            weight_kg REAL NOT NULL,
            height_cm REAL NOT NULL,
            age INTEGER NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- PENDING PROFILES
        -- Captured at registration, applied on first sign-in
        -- ============================================
        CREATE TABLE pending_profiles (
            email TEXT PRIMARY KEY,
            gender TEXT NOT NULL CHECK(gender IN ('male', 'female')),
            weight_kg REAL NOT NULL,
            height_cm REAL NOT NULL,
            age INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_log_type_is_constrained() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO calorie_logs (user_id, date, type, description, calories)
             VALUES ('u1', '2024-01-10', 'snack', 'chips', 150)",
            [],
        );
        assert!(result.is_err());
    }
}
