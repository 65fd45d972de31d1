use std::path::PathBuf;

/// Tunables for report generation
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    /// Entries kept in the top-N bar charts
    pub chart_top_n: usize,
    /// Rows kept in the HTML frequency tables
    pub table_top_n: usize,
    /// Upper bound on words placed in a word cloud
    pub cloud_max_words: usize,
    pub bar_size: (u32, u32),
    pub cloud_size: (u32, u32),
    pub heatmap_size: (u32, u32),
    /// TrueType font used for chart text; system locations are searched when unset
    pub font_path: Option<PathBuf>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            chart_top_n: 15,
            table_top_n: 20,
            cloud_max_words: 200,
            bar_size: (800, 400),
            cloud_size: (800, 400),
            heatmap_size: (1000, 600),
            font_path: None,
        }
    }
}
