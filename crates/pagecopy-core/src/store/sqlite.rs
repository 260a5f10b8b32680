//! rusqlite-backed record store

use std::path::Path;

use rusqlite::{params, Connection};

use super::schema::{Schema, SCHEMA_VERSION};
use super::{ElementFilter, FieldValue, RecordStore, SortOrder};
use crate::access::PageRecord;
use crate::copy::CopyContext;
use crate::element::ContentElement;
use crate::error::StoreError;

/// Distance between neighboring sort keys when inserting at the top
const SORTING_STEP: i64 = 256;

const ELEMENT_COLUMNS: &str =
    "uid, page_id, language, col_pos, header, ctype, sorting, hidden, workspace, container_parent";

/// SQLite implementation of the record store boundary
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize(&self) -> Result<(), StoreError> {
        let current_version = self.get_schema_version().unwrap_or(0);

        if current_version == 0 {
            self.conn.execute_batch(Schema::create_tables())?;
            self.set_schema_version(SCHEMA_VERSION)?;
        } else if current_version < SCHEMA_VERSION {
            for version in current_version..SCHEMA_VERSION {
                if let Some(migration) = Schema::migration(version, version + 1) {
                    self.conn.execute_batch(migration)?;
                }
            }
            self.set_schema_version(SCHEMA_VERSION)?;
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Option<u32> {
        self.conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY applied_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok()
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
        Ok(())
    }

    // ==================== Seeding / fixtures ====================
    //
    // Not part of the record-store boundary: the core only ever creates
    // elements through the copy operation. These exist for tests and for
    // seeding a development database.

    /// Insert a page record, returning its uid
    pub fn insert_page(&self, page: &PageRecord) -> Result<i64, StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO pages
            (uid, title, perms_user_id, perms_group_id, perms_user, perms_group, perms_everybody)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                (page.uid != 0).then_some(page.uid),
                page.title,
                page.perms_user_id,
                page.perms_group_id,
                page.perms_user,
                page.perms_group,
                page.perms_everybody,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a content element, returning its uid (0 lets the store assign one)
    pub fn insert_element(&self, element: &ContentElement) -> Result<i64, StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO content_elements
            (uid, page_id, language, col_pos, header, ctype, sorting, hidden, workspace, container_parent)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                (element.uid != 0).then_some(element.uid),
                element.page_id,
                element.language,
                element.col_pos,
                element.header,
                element.ctype,
                element.sorting,
                element.hidden,
                element.workspace,
                element.container_parent,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Soft-delete an element
    pub fn delete_element(&self, uid: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE content_elements SET deleted = 1 WHERE uid = ?1",
            [uid],
        )?;
        Ok(())
    }

    /// Number of non-deleted content elements
    pub fn count_elements(&self) -> Result<i64, StoreError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM content_elements WHERE deleted = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of non-deleted pages
    pub fn count_pages(&self) -> Result<i64, StoreError> {
        let count =
            self.conn
                .query_row("SELECT COUNT(*) FROM pages WHERE deleted = 0", [], |row| {
                    row.get(0)
                })?;
        Ok(count)
    }

    fn row_to_element(row: &rusqlite::Row) -> rusqlite::Result<ContentElement> {
        Ok(ContentElement {
            uid: row.get(0)?,
            page_id: row.get(1)?,
            language: row.get(2)?,
            col_pos: row.get(3)?,
            header: row.get(4)?,
            ctype: row.get(5)?,
            sorting: row.get(6)?,
            hidden: row.get(7)?,
            workspace: row.get(8)?,
            container_parent: row.get(9)?,
        })
    }

    fn row_to_page(row: &rusqlite::Row) -> rusqlite::Result<PageRecord> {
        Ok(PageRecord {
            uid: row.get(0)?,
            title: row.get(1)?,
            perms_user_id: row.get(2)?,
            perms_group_id: row.get(3)?,
            perms_user: row.get(4)?,
            perms_group: row.get(5)?,
            perms_everybody: row.get(6)?,
        })
    }
}

impl RecordStore for SqliteStore {
    fn query_elements(&self, filter: &ElementFilter) -> Result<Vec<ContentElement>, StoreError> {
        let mut sql = format!(
            "SELECT {ELEMENT_COLUMNS} FROM content_elements \
             WHERE deleted = 0 AND page_id = ?1 AND language = ?2 AND workspace IN (0, ?3)"
        );
        let mut values: Vec<i64> = vec![filter.page_id, filter.language, filter.workspace];

        if !filter.include_container_children {
            sql.push_str(" AND container_parent = 0");
        }

        if !filter.uids.is_empty() {
            let placeholders: Vec<String> = (0..filter.uids.len())
                .map(|i| format!("?{}", values.len() + i + 1))
                .collect();
            sql.push_str(&format!(" AND uid IN ({})", placeholders.join(", ")));
            values.extend(filter.uids.iter().copied());
        }

        sql.push_str(match filter.order {
            SortOrder::ColumnThenSorting => " ORDER BY col_pos, sorting",
            SortOrder::SortingDescending => " ORDER BY sorting DESC",
        });

        let mut stmt = self.conn.prepare(&sql)?;
        let elements = stmt
            .query_map(rusqlite::params_from_iter(values), Self::row_to_element)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(elements)
    }

    fn get_page(&self, uid: i64) -> Result<Option<PageRecord>, StoreError> {
        let result = self.conn.query_row(
            "SELECT uid, title, perms_user_id, perms_group_id, perms_user, perms_group, perms_everybody \
             FROM pages WHERE uid = ?1 AND deleted = 0",
            [uid],
            Self::row_to_page,
        );

        match result {
            Ok(page) => Ok(Some(page)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn copy_element(&self, context: &CopyContext, source_uid: i64) -> Result<i64, StoreError> {
        let source = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ELEMENT_COLUMNS} FROM content_elements WHERE uid = ?1 AND deleted = 0"
                ),
                [source_uid],
                Self::row_to_element,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::RecordNotFound {
                    table: "content_elements",
                    uid: source_uid,
                },
                other => other.into(),
            })?;

        // Copies land at the top of the target column.
        let top: Option<i64> = self.conn.query_row(
            "SELECT MIN(sorting) FROM content_elements \
             WHERE deleted = 0 AND page_id = ?1 AND col_pos = ?2",
            params![context.target_page, source.col_pos],
            |row| row.get(0),
        )?;
        let sorting = top.map_or(SORTING_STEP, |min| min - SORTING_STEP);

        let hidden = if context.never_hide_at_copy {
            false
        } else {
            source.hidden
        };

        self.conn.execute(
            r#"
            INSERT INTO content_elements
            (page_id, language, col_pos, header, ctype, sorting, hidden, workspace, container_parent)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                context.target_page,
                source.language,
                source.col_pos,
                source.header,
                source.ctype,
                sorting,
                hidden,
                source.workspace,
                source.container_parent,
            ],
        )?;
        let new_uid = self.conn.last_insert_rowid();

        // Containers bring their children along. Children are never copy
        // candidates themselves; they only exist through their container.
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ELEMENT_COLUMNS} FROM content_elements \
             WHERE deleted = 0 AND container_parent = ?1"
        ))?;
        let children = stmt
            .query_map([source_uid], Self::row_to_element)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for child in children {
            self.conn.execute(
                r#"
                INSERT INTO content_elements
                (page_id, language, col_pos, header, ctype, sorting, hidden, workspace, container_parent)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    context.target_page,
                    child.language,
                    child.col_pos,
                    child.header,
                    child.ctype,
                    child.sorting,
                    if context.never_hide_at_copy {
                        false
                    } else {
                        child.hidden
                    },
                    child.workspace,
                    new_uid,
                ],
            )?;
        }

        Ok(new_uid)
    }

    fn update_field(&self, uid: i64, field: &str, value: FieldValue) -> Result<(), StoreError> {
        // Column names cannot be bound; restrict to the writable set.
        let column = match field {
            "language" => "language",
            "hidden" => "hidden",
            "sorting" => "sorting",
            "header" => "header",
            other => return Err(StoreError::UnknownField(other.to_string())),
        };

        let sql = format!("UPDATE content_elements SET {column} = ?1 WHERE uid = ?2 AND deleted = 0");
        let affected = match &value {
            FieldValue::Int(v) => self.conn.execute(&sql, params![v, uid])?,
            FieldValue::Text(v) => self.conn.execute(&sql, params![v, uid])?,
        };

        if affected == 0 {
            return Err(StoreError::RecordNotFound {
                table: "content_elements",
                uid,
            });
        }

        // Container children stay in their container's language.
        if let ("language", FieldValue::Int(v)) = (column, &value) {
            self.conn.execute(
                "UPDATE content_elements SET language = ?1 \
                 WHERE container_parent = ?2 AND deleted = 0",
                params![v, uid],
            )?;
        }

        Ok(())
    }
}
