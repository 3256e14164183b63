use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::model::TechDimension;
use crate::error::ConfigError;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DT_DASHBOARD_CONFIG";
/// Environment variable overriding [`DashboardConfig::data_path`].
pub const DATA_PATH_ENV: &str = "DT_INDEX_DATA";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Top-level configuration. Every field has a default, so an empty TOML
/// file (or no file at all) yields a working setup for the stock dataset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Spreadsheet (or CSV / JSON / Parquet export) holding the index table.
    pub data_path: PathBuf,
    /// TTF/OTF font with CJK glyphs, appended to the UI fonts so company and
    /// industry names render. egui's built-in fonts only cover Latin.
    pub cjk_font: Option<PathBuf>,
    pub columns: ColumnNames,
    pub sentinels: Sentinels,
    pub view: ViewConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/1999-2023年数字化转型指数与行业合并表.xlsx"),
            cjk_font: None,
            columns: ColumnNames::default(),
            sentinels: Sentinels::default(),
            view: ViewConfig::default(),
        }
    }
}

/// Header names of the source table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub stock_code: String,
    pub company_name: String,
    pub year: String,
    pub industry_name: String,
    pub index_score: String,
    pub total_word_frequency: String,
    /// One header per [`TechDimension`], in [`TechDimension::ALL`] order.
    pub dimensions: [String; 7],
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            stock_code: "股票代码".into(),
            company_name: "企业名称".into(),
            year: "年份".into(),
            industry_name: "行业名称".into(),
            index_score: "数字化转型指数(0-100分)".into(),
            total_word_frequency: "总词频数".into(),
            dimensions: TechDimension::ALL.map(|d| d.default_header().to_string()),
        }
    }
}

impl ColumnNames {
    pub fn dimension(&self, dim: TechDimension) -> &str {
        &self.dimensions[dim.index()]
    }
}

/// Placeholder labels used by the source data and the selectors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Sentinels {
    /// Stock code value that is never zero-padded.
    pub unknown_stock_code: String,
    /// Substituted for a missing industry name.
    pub unknown_industry: String,
    /// Label of the "every industry" selector entry.
    pub all_industries: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            unknown_stock_code: "未知".into(),
            unknown_industry: "未知行业".into(),
            all_industries: "全部".into(),
        }
    }
}

/// Sizes of the rendered projections.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub ranking_limit: usize,
    pub industry_chart_limit: usize,
    pub fallback_industries: usize,
    pub histogram_bins: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            ranking_limit: 20,
            industry_chart_limit: 10,
            fallback_industries: 3,
            histogram_bins: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl DashboardConfig {
    /// Resolve the effective configuration:
    /// defaults → TOML file → `DT_INDEX_DATA` override.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var_os(CONFIG_ENV) {
            Some(p) => Some(PathBuf::from(p)),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            }
        };

        let mut config = match file {
            Some(path) => {
                log::info!("Reading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_data_path_override(std::env::var(DATA_PATH_ENV).ok());
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_data_path_override(&mut self, value: Option<String>) {
        if let Some(path) = value.filter(|p| !p.trim().is_empty()) {
            self.data_path = PathBuf::from(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_gives_defaults() {
        let config: DashboardConfig = toml::from_str("").unwrap();
        assert_eq!(config.columns.stock_code, "股票代码");
        assert_eq!(config.columns.dimension(TechDimension::Blockchain), "区块链");
        assert_eq!(config.view.ranking_limit, 20);
        assert_eq!(config.sentinels.unknown_industry, "未知行业");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let text = r#"
            data_path = "/tmp/index.csv"

            [columns]
            year = "Year"

            [view]
            histogram_bins = 10
        "#;
        let config: DashboardConfig = toml::from_str(text).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/tmp/index.csv"));
        assert_eq!(config.columns.year, "Year");
        assert_eq!(config.columns.company_name, "企业名称");
        assert_eq!(config.view.histogram_bins, 10);
        assert_eq!(config.view.industry_chart_limit, 10);
        assert!(config.cjk_font.is_none());
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "view = 3").unwrap();
        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = DashboardConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn blank_override_is_ignored() {
        let mut config = DashboardConfig::default();
        let before = config.data_path.clone();
        config.apply_data_path_override(Some("  ".into()));
        assert_eq!(config.data_path, before);
        config.apply_data_path_override(Some("other.xlsx".into()));
        assert_eq!(config.data_path, PathBuf::from("other.xlsx"));
    }
}
