use std::path::Path;

use crate::domain::{BarChart, FrequencyTable, GeneratedArtifact, Heatmap, Record, WordCloud};
use crate::error::ReportError;

pub type Result<T> = std::result::Result<T, ReportError>;

/// Names of the columns a dataset has to provide.
pub const REQUIRED_COLUMNS: [&str; 3] = ["user_id", "course_id", "category"];
/// Columns read when present; absent ones read as empty.
pub const OPTIONAL_COLUMNS: [&str; 2] = ["tags", "description"];

pub trait DatasetRepository {
    // Every call re-reads the dataset; nothing is cached between reports
    fn fetch_all_records(&self) -> Result<Vec<Record>>;
}

/// Draws image artifacts. Each call owns its drawing surface from creation
/// until the file at `target` is written.
pub trait ChartRenderer: Send + Sync {
    fn bar_chart(&self, chart: &BarChart, target: &Path) -> Result<()>;
    fn word_cloud(&self, cloud: &WordCloud, target: &Path) -> Result<()>;
    fn heatmap(&self, heatmap: &Heatmap, target: &Path) -> Result<()>;
}

/// Renders a frequency table as an embeddable HTML fragment.
pub trait TableRenderer: Send + Sync {
    fn frequency_table(
        &self,
        table: &FrequencyTable,
        label_header: &str,
        count_header: &str,
    ) -> String;
}

/// Composes generated artifacts into a single page.
pub trait PageWriter {
    fn write(&self, artifacts: &[GeneratedArtifact], target: &Path) -> Result<()>;
}
