//! Page output model and its terminal rendering

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::chart::ChartData;
use crate::models::Headline;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Default sparkline width in terminal cells
pub const SPARK_WIDTH: usize = 60;

/// One block of page output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Section {
    Heading(String),
    Text(String),
    Success(String),
    Warning(String),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Chart(ChartData),
    /// Numbered headline list
    Links(Vec<Headline>),
}

/// Result of one page action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub title: String,
    pub sections: Vec<Section>,
}

impl PageView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, section: Section) -> &mut Self {
        self.sections.push(section);
        self
    }

    pub fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Section::Heading(text.into()))
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Section::Text(text.into()))
    }

    pub fn success(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Section::Success(text.into()))
    }

    pub fn warning(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Section::Warning(text.into()))
    }

    pub fn table(&mut self, headers: Vec<String>, rows: Vec<Vec<String>>) -> &mut Self {
        self.push(Section::Table { headers, rows })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().filter_map(|s| match s {
            Section::Warning(w) => Some(w.as_str()),
            _ => None,
        })
    }

    pub fn has_warning(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartData> {
        self.sections.iter().filter_map(|s| match s {
            Section::Chart(c) => Some(c),
            _ => None,
        })
    }
}

/// Bucket-average `values` down to at most `width` cells and draw them as block characters
pub fn sparkline(values: &[f64], width: usize) -> String {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || width == 0 {
        return String::new();
    }

    let buckets = finite.len().min(width);
    let averaged: Vec<f64> = (0..buckets)
        .map(|i| {
            let lo = i * finite.len() / buckets;
            let hi = ((i + 1) * finite.len() / buckets).max(lo + 1);
            let chunk = &finite[lo..hi];
            chunk.iter().sum::<f64>() / chunk.len() as f64
        })
        .collect();

    let min = averaged.iter().copied().fold(f64::INFINITY, f64::min);
    let max = averaged.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let top = (SPARK_LEVELS.len() - 1) as f64;

    averaged
        .iter()
        .map(|v| {
            let level = if range > 0.0 {
                ((v - min) / range * top).round() as usize
            } else {
                SPARK_LEVELS.len() / 2
            };
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

fn render_chart(out: &mut String, chart: &ChartData) {
    let _ = writeln!(out, "{}", chart.title);
    if let (Some(start), Some(end)) = (chart.metadata.start_date, chart.metadata.end_date) {
        let _ = write!(out, "  {start} .. {end}, {} points", chart.metadata.data_points);
        if let (Some(min), Some(max)) = (chart.metadata.min_value, chart.metadata.max_value) {
            let _ = write!(out, ", {} range {min:.2} .. {max:.2}", chart.y_label);
        }
        out.push('\n');
    }

    let name_width = chart.series.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for line in &chart.series {
        let values = line.values();
        let last = values.last().map(|v| format!("{v:.2}")).unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<name_width$} {} {last}",
            line.name,
            sparkline(&values, SPARK_WIDTH)
        );
    }
}

/// Plain-text rendering of a page for the terminal
pub fn render(page: &PageView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", page.title);

    for section in &page.sections {
        out.push('\n');
        match section {
            Section::Heading(h) => {
                let _ = writeln!(out, "{h}\n{}", "-".repeat(h.chars().count()));
            }
            Section::Text(t) => {
                let _ = writeln!(out, "{t}");
            }
            Section::Success(t) => {
                let _ = writeln!(out, "✅ {t}");
            }
            Section::Warning(t) => {
                let _ = writeln!(out, "⚠️  {t}");
            }
            Section::Table { headers, rows } => {
                let _ = writeln!(out, "{}", render_table(headers, rows));
            }
            Section::Chart(chart) => render_chart(&mut out, chart),
            Section::Links(headlines) => {
                for (i, h) in headlines.iter().enumerate() {
                    let _ = writeln!(out, "{}. {}\n   {}", i + 1, h.title, h.link);
                }
            }
        }
    }
    out
}
