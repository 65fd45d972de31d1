use std::path::PathBuf;

use csv::{ReaderBuilder, StringRecord};
use enroll_core::domain::{non_blank, Record};
use enroll_core::ports::{DatasetRepository, Result, OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
use enroll_core::ReportError;
use tracing::debug;

/// CSV implementation of the DatasetRepository trait.
///
/// The file needs a header row naming at least `user_id`, `course_id` and
/// `category`; `tags` and `description` are read when present.
pub struct CsvDatasetRepository {
    path: PathBuf,
}

/// Header positions resolved once per read.
struct ColumnIndex {
    user_id: usize,
    course_id: usize,
    category: usize,
    tags: Option<usize>,
    description: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| ReportError::MissingColumn(name.to_string()))
        };

        let [user_id, course_id, category] = REQUIRED_COLUMNS;
        let [tags, description] = OPTIONAL_COLUMNS;
        Ok(Self {
            user_id: required(user_id)?,
            course_id: required(course_id)?,
            category: required(category)?,
            tags: position(tags),
            description: position(description),
        })
    }

    fn record(&self, row: &StringRecord) -> Record {
        let field = |idx: usize| row.get(idx).map(str::to_string);
        Record {
            user_id: field(self.user_id).unwrap_or_default().trim().to_string(),
            course_id: field(self.course_id).unwrap_or_default().trim().to_string(),
            category: non_blank(field(self.category)),
            tags: non_blank(self.tags.and_then(field)),
            description: non_blank(self.description.and_then(field)),
        }
    }
}

impl CsvDatasetRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn dataset_err(err: csv::Error) -> ReportError {
    if err.is_io_error() {
        if let csv::ErrorKind::Io(io) = err.into_kind() {
            return ReportError::Io(io);
        }
        return ReportError::Dataset("csv i/o failure".to_string());
    }
    ReportError::Dataset(err.to_string())
}

impl DatasetRepository for CsvDatasetRepository {
    fn fetch_all_records(&self) -> Result<Vec<Record>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(dataset_err)?;

        let columns = ColumnIndex::resolve(reader.headers().map_err(dataset_err)?)?;

        let mut records = Vec::new();
        for row in reader.records() {
            records.push(columns.record(&row.map_err(dataset_err)?));
        }

        debug!(rows = records.len(), path = %self.path.display(), "dataset loaded");
        Ok(records)
    }
}
