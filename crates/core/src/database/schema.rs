//! 数据库建表
//!
//! 核心表在启动时创建；folders / reminders 属于可选功能，
//! 只由显式的可选迁移创建，未迁移时相关接口返回 503。

use rusqlite::Connection;

/// 创建核心表
///
/// 所有语句均为 IF NOT EXISTS，可重复执行。
/// (project_id, step_key) 的唯一约束是步骤幂等创建的并发保障，
/// 冲突时由调用方重新读取。
pub fn create_tables(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            salt TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token_hash TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            priority INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS steps (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            step_key TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'not_started',
            started_at INTEGER,
            completed_at INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(project_id, step_key)
        );

        CREATE TABLE IF NOT EXISTS step_inputs (
            id TEXT PRIMARY KEY,
            step_id TEXT NOT NULL UNIQUE REFERENCES steps(id) ON DELETE CASCADE,
            data TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS step_outputs (
            id TEXT PRIMARY KEY,
            step_id TEXT NOT NULL UNIQUE REFERENCES steps(id) ON DELETE CASCADE,
            ai_output TEXT NOT NULL,
            user_edited_output TEXT,
            version INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tool_outputs (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            tool_key TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(project_id, tool_key)
        );

        CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            label TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(project_id, label)
        );

        CREATE TABLE IF NOT EXISTS activity_log (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            action TEXT NOT NULL,
            detail TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS share_links (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            token_hash TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id, updated_at DESC);
        CREATE INDEX IF NOT EXISTS idx_steps_project ON steps(project_id);
        CREATE INDEX IF NOT EXISTS idx_notes_project ON notes(project_id);
        CREATE INDEX IF NOT EXISTS idx_activity_project ON activity_log(project_id, created_at DESC);
        ",
    )
}

/// 可选功能迁移：folders / reminders
///
/// 未执行本迁移时，相关接口返回 503 与引导信息。
pub fn migrate_optional_tables(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS folders (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS reminders (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            message TEXT NOT NULL,
            remind_at INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        );
        ",
    )
}

/// 表是否存在
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
        assert!(table_exists(&conn, "projects").unwrap());
        assert!(table_exists(&conn, "steps").unwrap());
        assert!(table_exists(&conn, "step_outputs").unwrap());
    }

    #[test]
    fn test_optional_tables_absent_until_migrated() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        assert!(!table_exists(&conn, "folders").unwrap());
        assert!(!table_exists(&conn, "reminders").unwrap());

        migrate_optional_tables(&conn).unwrap();
        assert!(table_exists(&conn, "folders").unwrap());
        assert!(table_exists(&conn, "reminders").unwrap());
    }

    #[test]
    fn test_step_uniqueness_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (id, email, password_hash, salt, created_at)
             VALUES ('u1', 'a@b.c', 'h', 's', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO projects (id, user_id, name, created_at, updated_at)
             VALUES ('p1', 'u1', 'P', 0, 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO steps (id, project_id, step_key, created_at, updated_at)
             VALUES ('s1', 'p1', 'idea_refinement', 0, 0)",
            [],
        )
        .unwrap();
        // 同一 (project_id, step_key) 再插入必须失败
        let result = conn.execute(
            "INSERT INTO steps (id, project_id, step_key, created_at, updated_at)
             VALUES ('s2', 'p1', 'idea_refinement', 0, 0)",
            [],
        );
        assert!(result.is_err());
    }
}
