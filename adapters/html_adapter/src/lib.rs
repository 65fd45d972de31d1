use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::Local;
use enroll_core::domain::{Artifact, FrequencyTable, GeneratedArtifact};
use enroll_core::ports::{PageWriter, Result, TableRenderer};
use enroll_core::utils::escape_html;
use tracing::debug;

/// Renders frequency tables the way a dataframe's `to_html` would,
/// with the page's `table table-striped` classes attached.
pub struct HtmlTableAdapter {
    classes: String,
}

impl HtmlTableAdapter {
    pub fn new() -> Self {
        Self {
            classes: "dataframe table table-striped".to_string(),
        }
    }

    pub fn with_classes(classes: impl Into<String>) -> Self {
        Self {
            classes: classes.into(),
        }
    }
}

impl Default for HtmlTableAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer for HtmlTableAdapter {
    fn frequency_table(
        &self,
        table: &FrequencyTable,
        label_header: &str,
        count_header: &str,
    ) -> String {
        let mut html = String::new();
        let _ = writeln!(html, "<table border=\"1\" class=\"{}\">", escape_html(&self.classes));
        html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
        let _ = writeln!(html, "      <th>{}</th>", escape_html(label_header));
        let _ = writeln!(html, "      <th>{}</th>", escape_html(count_header));
        html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

        for (label, count) in table.entries() {
            html.push_str("    <tr>\n");
            let _ = writeln!(html, "      <td>{}</td>", escape_html(label));
            let _ = writeln!(html, "      <td>{count}</td>");
            html.push_str("    </tr>\n");
        }

        html.push_str("  </tbody>\n</table>");
        html
    }
}

/// Writes every generated artifact into one self-contained HTML page
pub struct ReportPageAdapter {
    title: String,
}

impl ReportPageAdapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Formats the page body; `generated_at` is stamped into the header
    fn format_page(&self, artifacts: &[GeneratedArtifact], generated_at: &str) -> String {
        let title = escape_html(&self.title);
        let mut html = String::with_capacity(4096);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"UTF-8\">\n");
        let _ = writeln!(html, "<title>{title}</title>");
        html.push_str("<style>\nbody { font-family: sans-serif; margin: 2rem; }\n");
        html.push_str("section { margin-bottom: 2rem; }\nimg { max-width: 100%; }\n");
        html.push_str("table { border-collapse: collapse; }\nth, td { padding: 0.25rem 0.75rem; }\n</style>\n");
        html.push_str("</head>\n<body>\n<header>\n");
        let _ = writeln!(html, "<h1>{title}</h1>");
        let _ = writeln!(html, "<p class=\"meta\">Generated at {}</p>", escape_html(generated_at));
        html.push_str("</header>\n");

        if artifacts.is_empty() {
            html.push_str("<p><em>No reports generated.</em></p>\n");
        }

        for generated in artifacts {
            let name = escape_html(generated.kind.name());
            let _ = writeln!(html, "<section id=\"{name}\">\n<h2>{name}</h2>");
            match &generated.artifact {
                Artifact::Image { path } => {
                    let _ = writeln!(html, "<img src=\"{}\" alt=\"{name}\">", escape_html(path));
                }
                Artifact::Html(fragment) => {
                    html.push_str(fragment);
                    html.push('\n');
                }
            }
            html.push_str("</section>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

impl PageWriter for ReportPageAdapter {
    fn write(&self, artifacts: &[GeneratedArtifact], target: &Path) -> Result<()> {
        let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S %Z").to_string();
        let page = self.format_page(artifacts, &generated_at);
        fs::write(target, page)?;
        debug!(artifacts = artifacts.len(), path = %target.display(), "page written");
        Ok(())
    }
}
