use std::fs::OpenOptions;
use std::path::Path;

use enroll_core::domain::{BarChart, Heatmap, WordCloud};
use enroll_core::ports::{ChartRenderer, Result};
use enroll_core::ReportError;
use plotters::style::RGBColor;

mod bars;
mod cloud;
mod fonts;
mod heatmap;

/// PNG chart renderer backed by plotters' bitmap backend.
///
/// Every call builds its own backend and drawing area and drops them once the
/// file is written, so renders never share canvas state.
pub struct PlottersChartRenderer {
    with_text: bool,
}

impl PlottersChartRenderer {
    /// Creates a renderer, registering `font_path` (or a system font) for chart text
    pub fn new(font_path: Option<&Path>) -> Self {
        Self {
            with_text: fonts::ensure_font(font_path),
        }
    }

    /// Surfaces an unwritable store as an I/O error before any drawing happens.
    /// An existing artifact is left intact until the bitmap is presented.
    fn check_writable(target: &Path) -> Result<()> {
        OpenOptions::new().write(true).create(true).truncate(false).open(target)?;
        Ok(())
    }
}

impl ChartRenderer for PlottersChartRenderer {
    fn bar_chart(&self, chart: &BarChart, target: &Path) -> Result<()> {
        Self::check_writable(target)?;
        bars::draw(chart, target, self.with_text)
    }

    fn word_cloud(&self, cloud: &WordCloud, target: &Path) -> Result<()> {
        Self::check_writable(target)?;
        cloud::draw(cloud, target, self.with_text)
    }

    fn heatmap(&self, heatmap: &Heatmap, target: &Path) -> Result<()> {
        Self::check_writable(target)?;
        heatmap::draw(heatmap, target, self.with_text)
    }
}

pub(crate) fn colour((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

pub(crate) fn render_err<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enroll_core::domain::{CrossTabulation, FrequencyTable, Orientation, Palette};
    use std::fs;
    use std::path::PathBuf;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn assert_png(path: &Path) {
        let bytes = fs::read(path).unwrap();
        assert!(bytes.len() > PNG_MAGIC.len(), "{} is empty", path.display());
        assert_eq!(bytes[..8], PNG_MAGIC);
    }

    fn table(entries: &[(&str, u64)]) -> FrequencyTable {
        FrequencyTable::from_counts(entries.iter().map(|(l, c)| (l.to_string(), *c)).collect())
    }

    fn bar(orientation: Orientation, table: FrequencyTable) -> BarChart {
        BarChart {
            title: "Top 15 Tags".to_string(),
            x_desc: "Frequency".to_string(),
            y_desc: "Tag".to_string(),
            orientation,
            palette: Palette::BluesReversed,
            size: (800, 400),
            table,
        }
    }

    fn target(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        dir.path().join(name)
    }

    #[test]
    fn test_vertical_bar_chart_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = target(&dir, "category_counts.png");
        let renderer = PlottersChartRenderer::new(None);
        renderer
            .bar_chart(&bar(Orientation::Vertical, table(&[("Data", 4), ("Web", 2)])), &path)
            .unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_horizontal_bar_chart_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = target(&dir, "top_tags.png");
        let renderer = PlottersChartRenderer::new(None);
        let chart = bar(
            Orientation::Horizontal,
            table(&[("python", 9), ("sql", 5), ("rust", 5), ("go", 1)]),
        );
        renderer.bar_chart(&chart, &path).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_empty_bar_chart_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = target(&dir, "empty.png");
        let renderer = PlottersChartRenderer::new(None);
        renderer
            .bar_chart(&bar(Orientation::Vertical, FrequencyTable::default()), &path)
            .unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_render_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = target(&dir, "top_tags.png");
        fs::write(&path, b"stale artifact").unwrap();
        let renderer = PlottersChartRenderer::new(None);
        let chart = bar(Orientation::Horizontal, table(&[("a", 1)]));
        renderer.bar_chart(&chart, &path).unwrap();
        assert_png(&path);
        renderer.bar_chart(&chart, &path).unwrap();
        assert_png(&path);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_word_cloud_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = target(&dir, "tag_wordcloud.png");
        let renderer = PlottersChartRenderer::new(None);
        let cloud = WordCloud {
            size: (800, 400),
            table: table(&[("python", 12), ("data", 8), ("rust", 5), ("sql", 2), ("web", 1)]),
        };
        renderer.word_cloud(&cloud, &path).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_empty_word_cloud_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = target(&dir, "description_wordcloud.png");
        let renderer = PlottersChartRenderer::new(None);
        let cloud = WordCloud {
            size: (800, 400),
            table: FrequencyTable::default(),
        };
        renderer.word_cloud(&cloud, &path).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_heatmap_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = target(&dir, "user_category_heatmap.png");
        let mut tab = CrossTabulation::default();
        tab.increment("u1", "Data");
        tab.increment("u1", "Data");
        tab.increment("u2", "Web");
        let heatmap = Heatmap {
            title: "User Preference by Category".to_string(),
            palette: Palette::YlGnBu,
            size: (1000, 600),
            matrix: tab.to_dense(),
        };
        PlottersChartRenderer::new(None).heatmap(&heatmap, &path).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_empty_heatmap_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = target(&dir, "user_category_heatmap.png");
        let heatmap = Heatmap {
            title: "User Preference by Category".to_string(),
            palette: Palette::YlGnBu,
            size: (1000, 600),
            matrix: CrossTabulation::default().to_dense(),
        };
        PlottersChartRenderer::new(None).heatmap(&heatmap, &path).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_writability_check_keeps_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = target(&dir, "category_counts.png");
        fs::write(&path, b"previous render").unwrap();
        PlottersChartRenderer::check_writable(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"previous render");
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("chart.png");
        let err = PlottersChartRenderer::new(None)
            .bar_chart(&bar(Orientation::Vertical, table(&[("a", 1)])), &path)
            .unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }
}
