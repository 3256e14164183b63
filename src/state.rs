use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use dt_index_dashboard::config::DashboardConfig;
use dt_index_dashboard::data::dashboard::{Dashboard, build_dashboard};
use dt_index_dashboard::data::filter::{FilterCriteria, IndustrySelection, ScoreRange};
use dt_index_dashboard::data::loader::TableCache;
use dt_index_dashboard::data::model::Table;
use dt_index_dashboard::data::present::export_ranking_csv;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Tables loaded so far, one per source file.
    cache: TableCache,

    /// Shared, read-only table behind the current view (None until loaded).
    pub table: Option<Arc<Table>>,

    /// File the current table came from.
    pub source: Option<PathBuf>,

    /// Current sidebar selection.
    pub criteria: Option<FilterCriteria>,

    /// Control domains derived from the table once per load.
    pub years: Vec<i32>,
    pub industries: Vec<String>,
    pub score_bounds: (f64, f64),

    /// Output of the last recompute.
    pub dashboard: Dashboard,

    /// Fatal load failure; when set nothing but the message is rendered.
    pub load_error: Option<String>,

    /// Non-fatal status line (exports, etc.).
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: TableCache::new(),
            table: None,
            source: None,
            criteria: None,
            years: Vec::new(),
            industries: Vec::new(),
            score_bounds: (0.0, 100.0),
            dashboard: Dashboard::default(),
            load_error: None,
            status_message: None,
        }
    }

    /// Load (or fetch from the cache) the table at `path` and make it current.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path, &self.config) {
            Ok(table) => {
                self.source = Some(path.to_path_buf());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.table = None;
                self.criteria = None;
                self.dashboard = Dashboard::default();
                self.load_error = Some(format!("Failed to load data: {e}"));
            }
        }
    }

    /// Ingest a table, initialise controls and compute the first view.
    pub fn set_table(&mut self, table: Arc<Table>) {
        self.years = table.years();
        self.industries = table.industries();
        self.score_bounds = table.score_bounds().unwrap_or((0.0, 100.0));
        self.criteria = FilterCriteria::initial(&table);
        if self.criteria.is_none() {
            log::warn!("Loaded table has no usable rows");
        }
        self.table = Some(table);
        self.load_error = None;
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the dashboard from the current table and selection.
    pub fn refresh(&mut self) {
        self.dashboard = match (&self.table, &self.criteria) {
            (Some(table), Some(criteria)) => {
                build_dashboard(table, criteria, &self.config.view, &self.config.sentinels)
            }
            _ => Dashboard::default(),
        };
    }

    /// Apply `change` to the selection and recompute if it changed anything.
    fn update_criteria(&mut self, change: impl FnOnce(&mut FilterCriteria)) {
        let Some(criteria) = self.criteria.as_mut() else {
            return;
        };
        let before = criteria.clone();
        change(criteria);
        if *criteria != before {
            self.refresh();
        }
    }

    pub fn set_year(&mut self, year: i32) {
        self.update_criteria(|c| c.year = year);
    }

    /// Select an industry by its selector label (the "all" label clears it).
    pub fn set_industry(&mut self, label: &str) {
        let selection = IndustrySelection::from_label(label, &self.config.sentinels.all_industries);
        self.update_criteria(|c| c.industry = selection);
    }

    /// Set the score range; the bounds are swapped if given in reverse.
    pub fn set_range(&mut self, low: f64, high: f64) {
        let range = if low <= high {
            ScoreRange::new(low, high)
        } else {
            ScoreRange::new(high, low)
        };
        self.update_criteria(|c| c.index_range = range);
    }

    pub fn set_search(&mut self, text: &str) {
        self.update_criteria(|c| {
            if c.search != text {
                c.search = text.to_string();
            }
        });
    }

    /// A file loaded fine but normalization left no records in it.
    pub fn loaded_without_rows(&self) -> bool {
        self.table.as_ref().is_some_and(|t| t.is_empty())
    }

    /// Label of the industry currently selected.
    pub fn industry_label(&self) -> &str {
        match self.criteria.as_ref().map(|c| &c.industry) {
            Some(IndustrySelection::Only(name)) => name,
            _ => &self.config.sentinels.all_industries,
        }
    }

    /// Write the visible ranking table to `path`.
    pub fn export_ranking(&mut self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        export_ranking_csv(&self.dashboard.ranking, file)?;
        log::info!(
            "Exported {} ranked rows to {}",
            self.dashboard.ranking.len(),
            path.display()
        );
        self.status_message = Some(format!("Ranking exported to {}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
股票代码,企业名称,年份,行业名称,数字化转型指数(0-100分),总词频数
1,Alpha,2020,Banking,40,10
1,Alpha,2021,Banking,50,12
600519,Moutai,2021,Beverages,20,3
2,Beta,2021,,70,30
";

    fn state_with_csv() -> (AppState, tempfile::NamedTempFile) {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.open(file.path());
        (state, file)
    }

    #[test]
    fn open_initialises_controls() {
        let (state, _file) = state_with_csv();
        assert!(state.load_error.is_none());
        assert_eq!(state.years, vec![2020, 2021]);
        assert_eq!(state.score_bounds, (20.0, 70.0));
        assert!(state.industries.contains(&"未知行业".to_string()));
        assert_eq!(state.criteria.as_ref().unwrap().year, 2021);
        assert_eq!(state.dashboard.summary.count, 3);
        assert_eq!(state.industry_label(), "全部");
    }

    #[test]
    fn selection_changes_recompute() {
        let (mut state, _file) = state_with_csv();
        state.set_industry("Banking");
        assert_eq!(state.dashboard.summary.count, 1);
        assert_eq!(state.industry_label(), "Banking");

        state.set_industry("全部");
        state.set_range(60.0, 30.0);
        assert_eq!(state.dashboard.summary.count, 1);
        assert_eq!(state.criteria.as_ref().unwrap().index_range, ScoreRange::new(30.0, 60.0));

        state.set_search("alpha");
        assert_eq!(state.dashboard.trend.as_ref().unwrap().points.len(), 2);

        state.set_year(2020);
        state.set_search("");
        state.set_range(20.0, 70.0);
        assert_eq!(state.dashboard.summary.count, 1);
    }

    #[test]
    fn file_without_usable_rows_is_not_a_missing_dataset() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all("股票代码,企业名称,年份,数字化转型指数(0-100分)\n,NoCode,2020,10\n".as_bytes())
            .unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        assert!(!state.loaded_without_rows());

        state.open(file.path());
        assert!(state.load_error.is_none());
        assert!(state.criteria.is_none());
        assert!(state.loaded_without_rows());
    }

    #[test]
    fn load_failure_halts_the_dashboard() {
        let mut state = AppState::new(DashboardConfig::default());
        state.open(Path::new("/no/such/file.xlsx"));
        assert!(state.load_error.is_some());
        assert!(state.table.is_none());
        state.set_year(2021);
        assert!(state.dashboard.is_empty());
    }

    #[test]
    fn export_writes_visible_ranking() {
        let (mut state, _file) = state_with_csv();
        let out = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        state.export_ranking(out.path()).unwrap();
        let text = std::fs::read_to_string(out.path()).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(1).unwrap().starts_with("1,000002,Beta"));
    }
}
