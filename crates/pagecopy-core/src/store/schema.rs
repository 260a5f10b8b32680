//! SQLite schema for the pagecopy record store

/// Schema version for migrations
pub const SCHEMA_VERSION: u32 = 1;

/// SQLite schema definition
pub struct Schema;

impl Schema {
    /// Get the complete schema SQL
    pub fn create_tables() -> &'static str {
        r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Pages table (permission records)
CREATE TABLE IF NOT EXISTS pages (
    uid INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL DEFAULT '',
    deleted INTEGER NOT NULL DEFAULT 0,
    perms_user_id INTEGER NOT NULL DEFAULT 0,
    perms_group_id INTEGER NOT NULL DEFAULT 0,
    perms_user INTEGER NOT NULL DEFAULT 31,
    perms_group INTEGER NOT NULL DEFAULT 27,
    perms_everybody INTEGER NOT NULL DEFAULT 0
);

-- Content elements table
CREATE TABLE IF NOT EXISTS content_elements (
    uid INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL,
    language INTEGER NOT NULL DEFAULT 0,
    col_pos INTEGER NOT NULL DEFAULT 0,
    header TEXT NOT NULL DEFAULT '',
    ctype TEXT NOT NULL DEFAULT 'text',
    sorting INTEGER NOT NULL DEFAULT 0,
    hidden INTEGER NOT NULL DEFAULT 0,
    deleted INTEGER NOT NULL DEFAULT 0,
    workspace INTEGER NOT NULL DEFAULT 0,
    container_parent INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (page_id) REFERENCES pages(uid)
);

CREATE INDEX IF NOT EXISTS idx_elements_page_language ON content_elements(page_id, language);
CREATE INDEX IF NOT EXISTS idx_elements_sorting ON content_elements(page_id, col_pos, sorting);
CREATE INDEX IF NOT EXISTS idx_elements_container ON content_elements(container_parent);
"#
    }

    /// Get migration SQL for a specific version
    pub fn migration(from_version: u32, to_version: u32) -> Option<&'static str> {
        match (from_version, to_version) {
            // Add migrations here as the schema evolves
            _ => None,
        }
    }
}
