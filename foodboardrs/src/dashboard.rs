use crate::chart::BarChart;
use crate::config::DashboardConfig;
use crate::filters::{FilterOptions, FilterSelection};
use crate::gateway::{Gateway, QueryWarning, TableResult};
use crate::reports::{catalog, ReportDefinition, KPIS};

/// One KPI tile. A failed count shows as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kpi {
    pub label: &'static str,
    pub value: i64,
}

/// A rendered report: its table and, when it has rows and a hint, its chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub id: &'static str,
    pub title: &'static str,
    pub result: TableResult,
    pub chart: Option<BarChart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub title: String,
    pub kpis: Vec<Kpi>,
    pub sections: Vec<ReportSection>,
    pub caption: String,
    /// Query failures from this render, oldest first.
    pub warnings: Vec<QueryWarning>,
}

/// Owns the gateway (and through it the single store connection) and the
/// report catalog. One `render` call runs every query in catalog order.
pub struct Dashboard {
    gateway: Gateway,
    reports: Vec<ReportDefinition>,
    config: DashboardConfig,
}

impl Dashboard {
    pub fn new(gateway: Gateway, config: DashboardConfig) -> Self {
        Self {
            gateway,
            reports: catalog(),
            config,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Resolve every filter dimension. Failures while resolving come back with
    /// the options instead of being left for the next `render`.
    pub async fn filter_options(&self) -> (FilterOptions, Vec<QueryWarning>) {
        let options = FilterOptions::load(&self.gateway).await;
        (options, self.gateway.drain_warnings())
    }

    pub async fn kpis(&self) -> Vec<Kpi> {
        let mut kpis = Vec::with_capacity(KPIS.len());
        for kpi in &KPIS {
            let value = match self.gateway.execute(&kpi.sql(), &[]).await {
                TableResult::Rows(result) => result.first_i64().unwrap_or(0),
                TableResult::Failed { .. } => 0,
            };
            kpis.push(Kpi {
                label: kpi.label,
                value,
            });
        }
        kpis
    }

    pub async fn run_report(
        &self,
        report: &ReportDefinition,
        selection: &FilterSelection,
    ) -> ReportSection {
        let total = match report.total_query(selection) {
            Some(query) => match self.gateway.execute(&query.sql, &query.params).await {
                TableResult::Rows(result) => result.first_i64(),
                TableResult::Failed { .. } => None,
            },
            None => None,
        };

        let query = report.build(selection, total);
        tracing::debug!(report = report.id, sql = %query.sql, params = query.params.len(), "running report");
        let result = self.gateway.execute(&query.sql, &query.params).await;
        let chart = match (&report.chart, &result) {
            (Some(hint), TableResult::Rows(rows)) => BarChart::from_table(hint, rows),
            _ => None,
        };
        ReportSection {
            id: report.id,
            title: report.title,
            result,
            chart,
        }
    }

    pub async fn render(&self, selection: &FilterSelection) -> DashboardView {
        let kpis = self.kpis().await;
        let mut sections = Vec::with_capacity(self.reports.len());
        for report in &self.reports {
            sections.push(self.run_report(report, selection).await);
        }
        let warnings = self.gateway.drain_warnings();
        tracing::info!(
            sections = sections.len(),
            failed = sections.iter().filter(|s| s.result.is_failed()).count(),
            warnings = warnings.len(),
            "dashboard rendered"
        );
        DashboardView {
            title: self.config.title.clone(),
            kpis,
            sections,
            caption: self.config.caption.clone(),
            warnings,
        }
    }
}
