//! School repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete/list over the `schools` table.
//! - Build parameterized list queries with full-text, mode-containment,
//!   allow-listed ordering and page bounds.
//! - Translate "no rows" outcomes into `NotFound` / `EditConflict`.
//!
//! # Invariants
//! - Callers validate records before `insert`/`update`; this layer does not.
//! - `update` only succeeds when the stored version equals `school.version`,
//!   and bumps it by exactly one.
//! - Each operation issues one statement bounded by `query_timeout`,
//!   including time spent waiting on locks held by other connections.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::school::{School, SchoolId};
use crate::query::filters::Filters;
use crate::query::fts::{column_match, TextMatch};
use crate::query::metadata::{calculate_metadata, Metadata};
use crate::repo::deadline::Deadline;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::time::Duration;
use thiserror::Error;

/// Time budget for a single store interaction.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

const SCHOOL_COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "name",
    "level",
    "contact",
    "phone",
    "email",
    "website",
    "address",
    "mode",
    "version",
];

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("school not found: {0}")]
    NotFound(SchoolId),
    /// The version precondition failed; re-read and retry.
    #[error("edit conflict on school {0}")]
    EditConflict(SchoolId),
    #[error("store operation exceeded its {0:?} deadline")]
    Timeout(Duration),
    #[error("invalid sort key `{0}`")]
    InvalidSort(String),
    #[error("invalid persisted school data: {0}")]
    InvalidData(String),
    #[error("connection schema version {actual_version} is older than required {expected_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
    #[error("required column `{table}.{column}` is missing")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter and paging options for [`SchoolRepository::get_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchoolListQuery {
    /// Full-text filter on `name`; blank matches everything.
    pub name: String,
    /// Full-text filter on `level`; blank matches everything.
    pub level: String,
    /// Tags every returned school must offer; empty matches everything.
    pub mode: Vec<String>,
    pub filters: Filters,
}

/// Repository interface for school records.
pub trait SchoolRepository {
    /// Inserts `school` and writes the store-assigned id, timestamp and
    /// version back into it.
    fn insert(&self, school: &mut School) -> RepoResult<()>;
    fn get(&self, id: SchoolId) -> RepoResult<School>;
    /// Compare-and-swap on `(id, version)`; writes the new version back.
    fn update(&self, school: &mut School) -> RepoResult<()>;
    fn delete(&self, id: SchoolId) -> RepoResult<()>;
    fn get_all(&self, query: &SchoolListQuery) -> RepoResult<(Vec<School>, Metadata)>;
}

/// SQLite-backed school repository.
pub struct SqliteSchoolRepository<'conn> {
    conn: &'conn Connection,
    query_timeout: Duration,
}

impl<'conn> SqliteSchoolRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Rejects connections whose schema is older than this binary expects or
    /// that lack the `schools` table shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        })
    }

    /// Overrides the per-operation deadline.
    #[must_use]
    pub fn with_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    fn bounded<T>(&self, op: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let deadline = Deadline::start(self.conn, self.query_timeout)?;
        op(self.conn).map_err(|err| match err {
            RepoError::Db(DbError::Sqlite(ref inner)) if deadline.expired_by(inner) => {
                RepoError::Timeout(self.query_timeout)
            }
            other => other,
        })
    }
}

impl SchoolRepository for SqliteSchoolRepository<'_> {
    fn insert(&self, school: &mut School) -> RepoResult<()> {
        let mode = encode_mode(&school.mode)?;

        let (id, created_at, version) = self.bounded(|conn| {
            let assigned = conn.query_row(
                "INSERT INTO schools (name, level, contact, phone, email, website, address, mode)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 RETURNING id, created_at, version;",
                params![
                    school.name.as_str(),
                    school.level.as_str(),
                    school.contact.as_str(),
                    school.phone.as_str(),
                    school.email.as_str(),
                    school.website.as_str(),
                    school.address.as_str(),
                    mode,
                ],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i32>(2)?,
                    ))
                },
            )?;
            Ok(assigned)
        })?;

        school.id = id;
        school.created_at = created_at;
        school.version = version;
        Ok(())
    }

    fn get(&self, id: SchoolId) -> RepoResult<School> {
        if id < 1 {
            return Err(RepoError::NotFound(id));
        }

        self.bounded(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM schools WHERE id = ?1;",
                SCHOOL_COLUMNS.join(", ")
            ))?;
            let mut rows = stmt.query([id])?;
            let row = rows.next()?.ok_or(RepoError::NotFound(id))?;
            let school = parse_school_row(row)?;
            Ok(school)
        })
    }

    fn update(&self, school: &mut School) -> RepoResult<()> {
        let mode = encode_mode(&school.mode)?;

        let version = self.bounded(|conn| {
            let result = conn.query_row(
                "UPDATE schools
                 SET
                    name = ?1,
                    level = ?2,
                    contact = ?3,
                    phone = ?4,
                    email = ?5,
                    website = ?6,
                    address = ?7,
                    mode = ?8,
                    version = version + 1
                 WHERE id = ?9
                   AND version = ?10
                 RETURNING version;",
                params![
                    school.name.as_str(),
                    school.level.as_str(),
                    school.contact.as_str(),
                    school.phone.as_str(),
                    school.email.as_str(),
                    school.website.as_str(),
                    school.address.as_str(),
                    mode,
                    school.id,
                    school.version,
                ],
                |row| row.get::<_, i32>(0),
            );
            match result {
                Ok(version) => Ok(version),
                Err(rusqlite::Error::QueryReturnedNoRows) => Err(RepoError::EditConflict(school.id)),
                Err(err) => Err(err.into()),
            }
        })?;

        school.version = version;
        Ok(())
    }

    fn delete(&self, id: SchoolId) -> RepoResult<()> {
        if id < 1 {
            return Err(RepoError::NotFound(id));
        }

        let changed =
            self.bounded(|conn| Ok(conn.execute("DELETE FROM schools WHERE id = ?1;", [id])?))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_all(&self, query: &SchoolListQuery) -> RepoResult<(Vec<School>, Metadata)> {
        let (column, direction) = query
            .filters
            .sort_order()
            .ok_or_else(|| RepoError::InvalidSort(query.filters.sort.clone()))?;

        let mut sql = format!(
            "SELECT COUNT(*) OVER () AS total_records, {}
             FROM schools
             WHERE 1 = 1",
            SCHOOL_COLUMNS.join(", ")
        );
        let mut bind_values: Vec<Value> = Vec::new();

        for text_match in [
            column_match("name", &query.name),
            column_match("level", &query.level),
        ] {
            match text_match {
                TextMatch::All => {}
                TextMatch::Expr(expr) => {
                    sql.push_str(
                        " AND id IN (SELECT rowid FROM schools_fts WHERE schools_fts MATCH ?)",
                    );
                    bind_values.push(Value::Text(expr));
                }
                TextMatch::Nothing => return Ok((Vec::new(), Metadata::default())),
            }
        }

        if !query.mode.is_empty() {
            sql.push_str(
                " AND NOT EXISTS (
                    SELECT 1
                    FROM json_each(?) AS wanted
                    WHERE wanted.value NOT IN (
                        SELECT have.value FROM json_each(schools.mode) AS have
                    )
                )",
            );
            bind_values.push(Value::Text(encode_mode(&query.mode)?));
        }

        sql.push_str(&format!(
            " ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            column.as_sql(),
            direction.as_sql()
        ));
        bind_values.push(Value::Integer(query.filters.limit()));
        bind_values.push(Value::Integer(query.filters.offset()));

        let (schools, total_records) = self.bounded(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            let mut total_records = 0_i64;
            let mut schools = Vec::new();

            while let Some(row) = rows.next()? {
                if schools.is_empty() {
                    total_records = row.get("total_records")?;
                }
                schools.push(parse_school_row(row)?);
            }

            Ok((schools, total_records))
        })?;

        let metadata = calculate_metadata(
            total_records,
            query.filters.page,
            query.filters.page_size,
        );
        Ok((schools, metadata))
    }
}

fn parse_school_row(row: &Row<'_>) -> RepoResult<School> {
    let mode_text: String = row.get("mode")?;
    let mode = serde_json::from_str::<Vec<String>>(&mode_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid mode value `{mode_text}` in schools.mode: {err}"
        ))
    })?;

    Ok(School {
        id: row.get("id")?,
        created_at: row.get("created_at")?,
        name: row.get("name")?,
        level: row.get("level")?,
        contact: row.get("contact")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        website: row.get("website")?,
        address: row.get("address")?,
        mode,
        version: row.get("version")?,
    })
}

fn encode_mode(mode: &[String]) -> RepoResult<String> {
    serde_json::to_string(mode)
        .map_err(|err| RepoError::InvalidData(format!("unable to encode mode: {err}")))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["schools", "schools_fts"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    let present = table_columns(conn, "schools")?;
    for &column in SCHOOL_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "schools",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([table])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(0)?);
    }
    Ok(columns)
}
