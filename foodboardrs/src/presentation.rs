//! The seam to whatever draws the dashboard.

use std::io::{self, Write};

use crate::chart::BarChart;
use crate::dashboard::{DashboardView, Kpi};
use crate::executor::{value_as_label, QueryResult};

/// Receives a rendered dashboard piece by piece, top to bottom.
pub trait PresentationSurface {
    fn title(&mut self, title: &str) -> io::Result<()>;
    fn metrics(&mut self, kpis: &[Kpi]) -> io::Result<()>;
    fn section(&mut self, title: &str) -> io::Result<()>;
    fn table(&mut self, table: &QueryResult) -> io::Result<()>;
    fn bar_chart(&mut self, chart: &BarChart) -> io::Result<()>;
    fn warning(&mut self, message: &str) -> io::Result<()>;
    fn caption(&mut self, caption: &str) -> io::Result<()>;
}

/// Walk `view` in order. Failed or empty reports get an empty table and no chart.
pub fn present<S: PresentationSurface + ?Sized>(
    view: &DashboardView,
    surface: &mut S,
) -> io::Result<()> {
    for warning in &view.warnings {
        surface.warning(&warning.to_string())?;
    }
    surface.title(&view.title)?;
    surface.metrics(&view.kpis)?;
    for section in &view.sections {
        surface.section(section.title)?;
        surface.table(&section.result.table())?;
        if section.result.is_empty() {
            continue;
        }
        if let Some(chart) = &section.chart {
            surface.bar_chart(chart)?;
        }
    }
    surface.caption(&view.caption)
}

/// Plain-text rendering, for terminals and logs.
pub struct TextSurface<W: Write> {
    out: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PresentationSurface for TextSurface<W> {
    fn title(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "{}", "=".repeat(title.chars().count()))
    }

    fn metrics(&mut self, kpis: &[Kpi]) -> io::Result<()> {
        let tiles: Vec<String> = kpis.iter().map(|k| format!("{}: {}", k.label, k.value)).collect();
        writeln!(self.out, "{}", tiles.join(" | "))?;
        writeln!(self.out, "---")
    }

    fn section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "## {title}")
    }

    fn table(&mut self, table: &QueryResult) -> io::Result<()> {
        if table.columns.is_empty() {
            return writeln!(self.out, "(no data)");
        }
        let headers: Vec<&str> = table.column_names().collect();
        let cells: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|h| {
                        row.get(*h)
                            .and_then(value_as_label)
                            .unwrap_or_else(|| "None".to_string())
                    })
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                cells
                    .iter()
                    .map(|r| r[idx].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |values: Vec<&str>| -> String {
            values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{v:<width$}", width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };
        writeln!(self.out, "{}", line(headers.clone()))?;
        for row in &cells {
            writeln!(self.out, "{}", line(row.iter().map(String::as_str).collect()))?;
        }
        Ok(())
    }

    fn bar_chart(&mut self, chart: &BarChart) -> io::Result<()> {
        const WIDTH: f64 = 40.0;
        writeln!(self.out, "[{}] {} by {}", chart.title, chart.y_label, chart.x_label)?;
        let max = chart.values.iter().cloned().fold(0.0_f64, f64::max);
        let label_width = chart
            .categories
            .iter()
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);
        for (category, value) in chart.categories.iter().zip(&chart.values) {
            let len = if max > 0.0 {
                ((value / max) * WIDTH).round() as usize
            } else {
                0
            };
            writeln!(
                self.out,
                "{category:>label_width$} | {} {value}",
                "#".repeat(len)
            )?;
        }
        Ok(())
    }

    fn warning(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "warning: {message}")
    }

    fn caption(&mut self, caption: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{caption}")
    }
}
