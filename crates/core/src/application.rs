use tracing::{debug, info};

use crate::aggregation;
use crate::config::ReportSettings;
use crate::domain::{
    Artifact, ArtifactStore, BarChart, FrequencyTable, GeneratedArtifact, Heatmap, Orientation,
    Palette, Record, ReportKind, WordCloud,
};
use crate::ports::{ChartRenderer, DatasetRepository, PageWriter, Result, TableRenderer};

/// Application service turning the dataset into report artifacts
pub struct ReportServiceImpl {
    data_repository: Box<dyn DatasetRepository>,
    chart_renderer: Box<dyn ChartRenderer>,
    table_renderer: Box<dyn TableRenderer>,
    store: ArtifactStore,
    settings: ReportSettings,
}

impl ReportServiceImpl {
    /// Creates a new ReportServiceImpl with the given dependencies
    pub fn new(
        data_repository: Box<dyn DatasetRepository>,
        chart_renderer: Box<dyn ChartRenderer>,
        table_renderer: Box<dyn TableRenderer>,
        store: ArtifactStore,
        settings: ReportSettings,
    ) -> Self {
        Self {
            data_repository,
            chart_renderer,
            table_renderer,
            store,
            settings,
        }
    }

    /// Where artifacts and the report page are written
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Reads the dataset once and produces each requested report in order
    pub fn execute(&self, kinds: &[ReportKind]) -> Result<Vec<GeneratedArtifact>> {
        let records = self.data_repository.fetch_all_records()?;
        info!(records = records.len(), reports = kinds.len(), "generating reports");
        kinds
            .iter()
            .map(|&kind| {
                self.generate(kind, &records)
                    .map(|artifact| GeneratedArtifact { kind, artifact })
            })
            .collect()
    }

    /// Runs `execute` and hands the results to `page_writer` at `<store>/index.html`
    pub fn execute_with_page(
        &self,
        kinds: &[ReportKind],
        page_writer: &dyn PageWriter,
    ) -> Result<Vec<GeneratedArtifact>> {
        let artifacts = self.execute(kinds)?;
        std::fs::create_dir_all(self.store.root())?;
        let target = self.store.root().join("index.html");
        page_writer.write(&artifacts, &target)?;
        info!(path = %target.display(), "report page written");
        Ok(artifacts)
    }

    pub fn generate(&self, kind: ReportKind, records: &[Record]) -> Result<Artifact> {
        match kind {
            ReportKind::CategoryCounts => self.plot_category_counts(records),
            ReportKind::TopTags => self.plot_tag_frequencies(records),
            ReportKind::UserActivity => self.plot_user_activity(records),
            ReportKind::CoursePopularity => self.plot_course_popularity(records),
            ReportKind::TagWordCloud => self.plot_tag_wordcloud(records),
            ReportKind::DescriptionWordCloud => self.plot_description_wordcloud(records),
            ReportKind::UserCategoryHeatmap => self.plot_user_category_heatmap(records),
            ReportKind::DescriptionWordTable => Ok(self.description_word_counts_table(records)),
            ReportKind::TagTable => Ok(self.tag_counts_table(records)),
        }
    }

    pub fn plot_category_counts(&self, records: &[Record]) -> Result<Artifact> {
        let table = aggregation::category_counts(records);
        let chart = self.bar_chart(
            "Courses per Category".to_string(),
            "Category",
            "Count",
            Orientation::Vertical,
            Palette::SkyBlue,
            table,
        );
        self.draw(ReportKind::CategoryCounts, |renderer, target| {
            renderer.bar_chart(&chart, target)
        })
    }

    pub fn plot_tag_frequencies(&self, records: &[Record]) -> Result<Artifact> {
        let top_n = self.settings.chart_top_n;
        let table = aggregation::tag_frequencies(records, top_n);
        let chart = self.bar_chart(
            format!("Top {top_n} Tags"),
            "Frequency",
            "Tag",
            Orientation::Horizontal,
            Palette::BluesReversed,
            table,
        );
        self.draw(ReportKind::TopTags, |renderer, target| renderer.bar_chart(&chart, target))
    }

    pub fn plot_user_activity(&self, records: &[Record]) -> Result<Artifact> {
        let top_n = self.settings.chart_top_n;
        let table = aggregation::user_activity_counts(records, top_n);
        let chart = self.bar_chart(
            format!("Top {top_n} Active Users"),
            "Courses Taken",
            "User ID",
            Orientation::Horizontal,
            Palette::CoolWarm,
            table,
        );
        self.draw(ReportKind::UserActivity, |renderer, target| {
            renderer.bar_chart(&chart, target)
        })
    }

    pub fn plot_course_popularity(&self, records: &[Record]) -> Result<Artifact> {
        let top_n = self.settings.chart_top_n;
        let table = aggregation::course_popularity_counts(records, top_n);
        let chart = self.bar_chart(
            format!("Top {top_n} Most Offered Courses"),
            "Occurrences",
            "Course ID",
            Orientation::Horizontal,
            Palette::Viridis,
            table,
        );
        self.draw(ReportKind::CoursePopularity, |renderer, target| {
            renderer.bar_chart(&chart, target)
        })
    }

    pub fn plot_tag_wordcloud(&self, records: &[Record]) -> Result<Artifact> {
        let table =
            aggregation::all_tag_frequencies(records).truncated(self.settings.cloud_max_words);
        let cloud = WordCloud {
            size: self.settings.cloud_size,
            table,
        };
        self.draw(ReportKind::TagWordCloud, |renderer, target| {
            renderer.word_cloud(&cloud, target)
        })
    }

    pub fn plot_description_wordcloud(&self, records: &[Record]) -> Result<Artifact> {
        let max_words = self.settings.cloud_max_words;
        let table = aggregation::description_cloud_frequencies(records, max_words);
        let cloud = WordCloud {
            size: self.settings.cloud_size,
            table,
        };
        self.draw(ReportKind::DescriptionWordCloud, |renderer, target| {
            renderer.word_cloud(&cloud, target)
        })
    }

    pub fn plot_user_category_heatmap(&self, records: &[Record]) -> Result<Artifact> {
        let matrix = aggregation::user_category_cross_tab(records).to_dense();
        debug!(users = matrix.rows.len(), categories = matrix.columns.len(), "cross tabulation");
        let heatmap = Heatmap {
            title: "User Preference by Category".to_string(),
            palette: Palette::YlGnBu,
            size: self.settings.heatmap_size,
            matrix,
        };
        self.draw(ReportKind::UserCategoryHeatmap, |renderer, target| {
            renderer.heatmap(&heatmap, target)
        })
    }

    /// Top description words as an HTML table
    pub fn description_word_counts_table(&self, records: &[Record]) -> Artifact {
        let table = aggregation::description_word_frequencies(records, self.settings.table_top_n);
        Artifact::Html(self.table_renderer.frequency_table(&table, "Word", "Frequency"))
    }

    /// Top tags as an HTML table
    pub fn tag_counts_table(&self, records: &[Record]) -> Artifact {
        let table = aggregation::tag_frequencies(records, self.settings.table_top_n);
        Artifact::Html(self.table_renderer.frequency_table(&table, "Tag", "Frequency"))
    }

    fn bar_chart(
        &self,
        title: String,
        x_desc: &str,
        y_desc: &str,
        orientation: Orientation,
        palette: Palette,
        table: FrequencyTable,
    ) -> BarChart {
        debug!(%title, entries = table.len(), "bar chart");
        BarChart {
            title,
            x_desc: x_desc.to_string(),
            y_desc: y_desc.to_string(),
            orientation,
            palette,
            size: self.settings.bar_size,
            table,
        }
    }

    fn draw<F>(&self, kind: ReportKind, render: F) -> Result<Artifact>
    where
        F: FnOnce(&dyn ChartRenderer, &std::path::Path) -> Result<()>,
    {
        let stem = kind
            .image_stem()
            .ok_or_else(|| crate::ReportError::UnknownReport(kind.to_string()))?;
        let target = self.store.prepare(stem)?;
        render(self.chart_renderer.as_ref(), &target)?;
        info!(report = %kind, path = %target.display(), "artifact written");
        Ok(Artifact::Image {
            path: ArtifactStore::relative_path(stem),
        })
    }
}
