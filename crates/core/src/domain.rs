use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ReportError;

/// One enrollment row of the dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub user_id: String,
    pub course_id: String,
    pub category: Option<String>,
    pub tags: Option<String>, // comma-separated
    pub description: Option<String>,
}

impl Record {
    pub fn new(user_id: impl Into<String>, course_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            course_id: course_id.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_blank(Some(category.into()));
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = non_blank(Some(tags.into()));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_blank(Some(description.into()));
        self
    }
}

/// Collapses blank optional values to `None`, so absent and empty look the same downstream.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Label/count pairs sorted by descending count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
}

impl FrequencyTable {
    /// Builds a table from entries in first-encountered order.
    /// The sort is stable, so equal counts keep that order.
    pub fn from_counts(mut entries: Vec<(String, u64)>) -> Self {
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.entries.first().map(|(_, count)| *count).unwrap_or(0)
    }

    pub fn truncated(mut self, top_n: usize) -> Self {
        self.entries.truncate(top_n);
        self
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }
}

/// Counts per (user_id, category); pairs never seen are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossTabulation {
    counts: BTreeMap<(String, String), u64>,
}

impl CrossTabulation {
    pub fn increment(&mut self, user_id: &str, category: &str) {
        *self
            .counts
            .entry((user_id.to_string(), category.to_string()))
            .or_insert(0) += 1;
    }

    pub fn get(&self, user_id: &str, category: &str) -> u64 {
        self.counts
            .get(&(user_id.to_string(), category.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Distinct users, sorted.
    pub fn users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.counts.keys().map(|(user, _)| user.clone()).collect();
        users.dedup();
        users
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.counts.keys().map(|(_, category)| category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Materializes the table with users as rows and categories as columns.
    pub fn to_dense(&self) -> DenseMatrix {
        let rows = self.users();
        let columns = self.categories();
        let values = rows
            .iter()
            .map(|user| columns.iter().map(|cat| self.get(user, cat)).collect())
            .collect();
        DenseMatrix {
            rows,
            columns,
            values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenseMatrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<u64>>,
}

impl DenseMatrix {
    pub fn max_value(&self) -> u64 {
        self.values.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Colour ramps used by the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    SkyBlue,
    BluesReversed,
    CoolWarm,
    Viridis,
    YlGnBu,
}

impl Palette {
    /// Gradient stops as RGB triples, low end first.
    pub fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            Palette::SkyBlue => &[(135, 206, 235)],
            Palette::BluesReversed => &[
                (8, 48, 107),
                (33, 113, 181),
                (107, 174, 214),
                (198, 219, 239),
            ],
            Palette::CoolWarm => &[
                (59, 76, 192),
                (141, 176, 254),
                (221, 221, 221),
                (244, 154, 123),
                (180, 4, 38),
            ],
            Palette::Viridis => &[
                (68, 1, 84),
                (59, 82, 139),
                (33, 145, 140),
                (94, 201, 98),
                (253, 231, 37),
            ],
            Palette::YlGnBu => &[
                (255, 255, 217),
                (199, 233, 180),
                (65, 182, 196),
                (34, 94, 168),
                (8, 29, 88),
            ],
        }
    }

    /// Linear interpolation along the stops, `t` clamped to `[0, 1]`.
    pub fn sample(self, t: f64) -> (u8, u8, u8) {
        let stops = self.stops();
        if stops.len() == 1 {
            return stops[0];
        }
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - lower as f64;
        let (a, b) = (stops[lower], stops[lower + 1]);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }

    /// Colour for bar `index` out of `count` bars, spread over the whole ramp.
    pub fn for_index(self, index: usize, count: usize) -> (u8, u8, u8) {
        if count <= 1 {
            return self.sample(0.0);
        }
        self.sample(index as f64 / (count - 1) as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub orientation: Orientation,
    pub palette: Palette,
    pub size: (u32, u32),
    pub table: FrequencyTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordCloud {
    pub size: (u32, u32),
    pub table: FrequencyTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub title: String,
    pub palette: Palette,
    pub size: (u32, u32),
    pub matrix: DenseMatrix,
}

/// Every report the service can produce, one definition each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportKind {
    CategoryCounts,
    TopTags,
    UserActivity,
    CoursePopularity,
    TagWordCloud,
    DescriptionWordCloud,
    UserCategoryHeatmap,
    DescriptionWordTable,
    TagTable,
}

impl ReportKind {
    pub const ALL: [ReportKind; 9] = [
        ReportKind::CategoryCounts,
        ReportKind::TopTags,
        ReportKind::UserActivity,
        ReportKind::CoursePopularity,
        ReportKind::TagWordCloud,
        ReportKind::DescriptionWordCloud,
        ReportKind::UserCategoryHeatmap,
        ReportKind::DescriptionWordTable,
        ReportKind::TagTable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReportKind::CategoryCounts => "category-counts",
            ReportKind::TopTags => "top-tags",
            ReportKind::UserActivity => "user-activity",
            ReportKind::CoursePopularity => "course-popularity",
            ReportKind::TagWordCloud => "tag-wordcloud",
            ReportKind::DescriptionWordCloud => "description-wordcloud",
            ReportKind::UserCategoryHeatmap => "user-category-heatmap",
            ReportKind::DescriptionWordTable => "description-word-table",
            ReportKind::TagTable => "tag-table",
        }
    }

    /// File stem under the store's visuals directory; `None` for HTML reports.
    pub fn image_stem(self) -> Option<&'static str> {
        match self {
            ReportKind::CategoryCounts => Some("category_counts"),
            ReportKind::TopTags => Some("top_tags"),
            ReportKind::UserActivity => Some("user_activity"),
            ReportKind::CoursePopularity => Some("course_popularity"),
            ReportKind::TagWordCloud => Some("tag_wordcloud"),
            ReportKind::DescriptionWordCloud => Some("description_wordcloud"),
            ReportKind::UserCategoryHeatmap => Some("user_category_heatmap"),
            ReportKind::DescriptionWordTable | ReportKind::TagTable => None,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| ReportError::UnknownReport(s.to_string()))
    }
}

/// A generated output. Identity is its path (images) or nothing at all (HTML).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Image { path: String },
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub kind: ReportKind,
    pub artifact: Artifact,
}

/// Directory that receives image artifacts under `visuals/`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub const VISUALS_DIR: &'static str = "visuals";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn visuals_dir(&self) -> PathBuf {
        self.root.join(Self::VISUALS_DIR)
    }

    /// Path handed back to callers, relative to the store root.
    pub fn relative_path(stem: &str) -> String {
        format!("{}/{}.png", Self::VISUALS_DIR, stem)
    }

    /// Ensures the visuals directory exists and returns the absolute target for `stem`.
    pub fn prepare(&self, stem: &str) -> std::io::Result<PathBuf> {
        let dir = self.visuals_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join(format!("{stem}.png")))
    }
}
