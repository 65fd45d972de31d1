use std::io;
use std::path::Path;

use enroll_core::domain::{non_blank, Record};
use enroll_core::ports::{DatasetRepository, Result, OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
use enroll_core::ReportError;
use rusqlite::{Connection, OpenFlags, Row};
use tracing::debug;

/// SQLite implementation of the DatasetRepository trait
pub struct SqliteDatasetRepository {
    db_path: String,
    table: String,
}

impl SqliteDatasetRepository {
    pub const DEFAULT_TABLE: &'static str = "enrollments";

    /// Creates a new SqliteDatasetRepository reading the `enrollments` table
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            table: Self::DEFAULT_TABLE.to_string(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Table names are spliced into SQL, so only plain identifiers are accepted
    fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn column_names(&self, conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({})", self.table))
            .map_err(dataset_err)?;
        let names = stmt
            .query_map([], |row: &Row| row.get::<_, String>(1))
            .map_err(dataset_err)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
            .map_err(dataset_err)?;
        if names.is_empty() {
            return Err(ReportError::Dataset(format!("table '{}' does not exist", self.table)));
        }
        Ok(names)
    }

    /// Builds the SELECT, substituting NULL for optional columns the table lacks
    fn select_sql(&self, columns: &[String]) -> Result<String> {
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|required| !columns.iter().any(|c| c == *required))
        {
            return Err(ReportError::MissingColumn(missing.to_string()));
        }
        let optional = OPTIONAL_COLUMNS.map(|name| {
            if columns.iter().any(|c| c == name) {
                format!("CAST({name} AS TEXT) AS {name}")
            } else {
                format!("NULL AS {name}")
            }
        });
        Ok(format!(
            "SELECT CAST(user_id AS TEXT), CAST(course_id AS TEXT), CAST(category AS TEXT), {}, {} FROM {} ORDER BY rowid ASC",
            optional[0], optional[1], self.table
        ))
    }
}

fn dataset_err(err: rusqlite::Error) -> ReportError {
    ReportError::Dataset(err.to_string())
}

impl DatasetRepository for SqliteDatasetRepository {
    fn fetch_all_records(&self) -> Result<Vec<Record>> {
        if !Self::is_identifier(&self.table) {
            return Err(ReportError::Dataset(format!("invalid table name '{}'", self.table)));
        }

        // Read-only: a mistyped path must not leave an empty database behind
        if !Path::new(&self.db_path).is_file() {
            return Err(ReportError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("database '{}' not found", self.db_path),
            )));
        }
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )
        .map_err(dataset_err)?;
        let columns = self.column_names(&conn)?;
        let sql = self.select_sql(&columns)?;
        debug!(%sql, "reading enrollments");

        let mut stmt = conn.prepare(&sql).map_err(dataset_err)?;

        // Map rows to Record; NULL ids read as empty and are skipped by the aggregations
        let records = stmt
            .query_map([], |row: &Row| {
                Ok(Record {
                    user_id: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    course_id: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    category: non_blank(row.get(2)?),
                    tags: non_blank(row.get(3)?),
                    description: non_blank(row.get(4)?),
                })
            })
            .map_err(dataset_err)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
            .map_err(dataset_err)?;

        debug!(rows = records.len(), path = %self.db_path, "dataset loaded");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn database(schema: &str, inserts: &[&str]) -> (TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(schema).unwrap();
        for sql in inserts {
            conn.execute_batch(sql).unwrap();
        }
        (dir, path.to_string_lossy().into_owned())
    }

    #[test]
    fn test_fetch_all_records_reads_rows_in_order() {
        let (_dir, path) = database(
            "CREATE TABLE enrollments (user_id TEXT, course_id TEXT, category TEXT, tags TEXT, description TEXT);",
            &[
                "INSERT INTO enrollments VALUES ('u1', 'c1', 'Data', 'python, sql', 'Intro course');",
                "INSERT INTO enrollments VALUES ('u2', 'c2', '', NULL, NULL);",
            ],
        );
        let records = SqliteDatasetRepository::new(path).fetch_all_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            Record::new("u1", "c1")
                .with_category("Data")
                .with_tags("python, sql")
                .with_description("Intro course")
        );
        assert_eq!(records[1], Record::new("u2", "c2"));
    }

    #[test]
    fn test_missing_optional_columns_read_as_none() {
        let (_dir, path) = database(
            "CREATE TABLE enrollments (user_id TEXT, course_id TEXT, category TEXT);",
            &["INSERT INTO enrollments VALUES ('u1', 'c1', 'Web');"],
        );
        let records = SqliteDatasetRepository::new(path).fetch_all_records().unwrap();
        assert_eq!(records, vec![Record::new("u1", "c1").with_category("Web")]);
    }

    #[test]
    fn test_numeric_ids_are_read_as_text() {
        let (_dir, path) = database(
            "CREATE TABLE enrollments (user_id INTEGER, course_id INTEGER, category TEXT);",
            &["INSERT INTO enrollments VALUES (7, 42, 'Math');"],
        );
        let records = SqliteDatasetRepository::new(path).fetch_all_records().unwrap();
        assert_eq!(records[0].user_id, "7");
        assert_eq!(records[0].course_id, "42");
    }

    #[test]
    fn test_missing_required_column_is_reported() {
        let (_dir, path) = database(
            "CREATE TABLE enrollments (user_id TEXT, course_id TEXT, tags TEXT);",
            &[],
        );
        let err = SqliteDatasetRepository::new(path).fetch_all_records().unwrap_err();
        assert!(matches!(err, ReportError::MissingColumn(ref c) if c == "category"));
    }

    #[test]
    fn test_custom_table_name() {
        let (_dir, path) = database(
            "CREATE TABLE history (user_id TEXT, course_id TEXT, category TEXT);",
            &["INSERT INTO history VALUES ('u9', 'c9', 'Art');"],
        );
        let records = SqliteDatasetRepository::new(path)
            .with_table("history")
            .fetch_all_records()
            .unwrap();
        assert_eq!(records[0].user_id, "u9");
    }

    #[test]
    fn test_unknown_table_is_a_dataset_error() {
        let (_dir, path) = database("CREATE TABLE other (x TEXT);", &[]);
        let err = SqliteDatasetRepository::new(path).fetch_all_records().unwrap_err();
        assert!(matches!(err, ReportError::Dataset(_)));
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let (_dir, path) = database("CREATE TABLE other (x TEXT);", &[]);
        let err = SqliteDatasetRepository::new(path)
            .with_table("x; DROP TABLE other")
            .fetch_all_records()
            .unwrap_err();
        assert!(matches!(err, ReportError::Dataset(_)));
    }

    #[test]
    fn test_missing_database_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.db");
        let err = SqliteDatasetRepository::new(path.to_string_lossy().into_owned())
            .fetch_all_records()
            .unwrap_err();
        assert!(matches!(err, ReportError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_table_yields_no_records() {
        let (_dir, path) = database(
            "CREATE TABLE enrollments (user_id TEXT, course_id TEXT, category TEXT);",
            &[],
        );
        assert!(SqliteDatasetRepository::new(path).fetch_all_records().unwrap().is_empty());
    }
}
