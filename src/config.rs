use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::entities::metric::Metric;
use crate::domain::entities::source::Source;
use crate::domain::parse::ValueParser;

pub const DEFAULT_KEY_COLUMN: &str = "Product P";
pub const SNAPSHOT_FILE_NAME: &str = "selection.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// A missing sheet or column omits that metric; it merges as zero.
    #[default]
    Lenient,
    /// The first missing sheet or column aborts the load.
    Strict,
}

/// Where one canonical metric lives inside an extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricMapping {
    pub metric: Metric,
    pub sheet: String,
    #[serde(default = "default_key_column")]
    pub key_column: String,
    pub value_column: String,
    #[serde(default)]
    pub row_skip: usize,
    pub parser: ValueParser,
}

fn default_key_column() -> String {
    DEFAULT_KEY_COLUMN.to_string()
}

impl MetricMapping {
    pub fn new(metric: Metric, sheet: &str, value_column: &str, parser: ValueParser) -> Self {
        Self {
            metric,
            sheet: sheet.to_string(),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            value_column: value_column.to_string(),
            row_skip: 0,
            parser,
        }
    }
}

/// Built-in layout shared by the Format and Kategori exports.
pub fn default_mappings() -> Vec<MetricMapping> {
    use Metric::*;
    use ValueParser::{Number, Percentage};

    vec![
        MetricMapping::new(Contribution, "Sheet 1", "Contribution", Percentage),
        MetricMapping::new(ValueMtd, "Sheet 3", "Current DO", Number),
        MetricMapping::new(ValueYtd, "Sheet 4", "Current DO", Number),
        MetricMapping::new(GrowthMtd, "Sheet 5", "vs LY", Percentage),
        MetricMapping::new(GrowthL3m, "Sheet 5", "vs L3M", Percentage),
        MetricMapping::new(GrowthYtd, "Sheet 13", "vs LY", Percentage),
        MetricMapping::new(AchievementMtd, "Sheet 14", "Current Achievement", Percentage),
        MetricMapping::new(AchievementYtd, "Sheet 18", "Current Achievement", Percentage),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub load_policy: LoadPolicy,
    #[serde(default = "default_mappings")]
    pub format_mappings: Vec<MetricMapping>,
    #[serde(default = "default_mappings")]
    pub kategori_mappings: Vec<MetricMapping>,
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            load_policy: LoadPolicy::default(),
            format_mappings: default_mappings(),
            kategori_mappings: default_mappings(),
            snapshot_path: None,
        }
    }
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: ReportConfig = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn mappings(&self, source: Source) -> &[MetricMapping] {
        match source {
            Source::Format => &self.format_mappings,
            Source::Kategori => &self.kategori_mappings,
        }
    }

    /// A metric mapped twice for one source would make the merge ambiguous.
    pub fn validate(&self) -> Result<()> {
        for source in Source::ALL {
            let mut seen = Vec::new();
            for mapping in self.mappings(source) {
                if seen.contains(&mapping.metric) {
                    return Err(anyhow!(
                        "{source} maps metric {} more than once",
                        mapping.metric
                    ));
                }
                seen.push(mapping.metric);
            }
        }
        Ok(())
    }

    pub fn snapshot_path(&self) -> Result<PathBuf> {
        match &self.snapshot_path {
            Some(path) => Ok(path.clone()),
            None => Ok(default_data_dir()?.join(SNAPSHOT_FILE_NAME)),
        }
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "quartile", "quartile-report")
        .ok_or_else(|| anyhow!("failed to resolve project directory"))?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mappings_cover_every_metric_once() {
        let config = ReportConfig::default();
        config.validate().expect("default config should be valid");
        let metrics: Vec<Metric> = config
            .mappings(Source::Format)
            .iter()
            .map(|m| m.metric)
            .collect();
        assert_eq!(metrics, Metric::ALL.to_vec());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"load_policy":"strict"}"#).expect("config should parse");
        assert_eq!(config.load_policy, LoadPolicy::Strict);
        assert_eq!(config.kategori_mappings, default_mappings());
    }

    #[test]
    fn mapping_defaults_key_column_and_row_skip() {
        let mapping: MetricMapping = serde_json::from_str(
            r#"{"metric":"value_mtd","sheet":"Sheet 3","value_column":"Current DO","parser":"number"}"#,
        )
        .expect("mapping should parse");
        assert_eq!(mapping.key_column, DEFAULT_KEY_COLUMN);
        assert_eq!(mapping.row_skip, 0);
    }

    #[test]
    fn duplicate_metric_is_rejected() {
        let mut config = ReportConfig::default();
        let dup = config.format_mappings[0].clone();
        config.format_mappings.push(dup);
        assert!(config.validate().is_err());
    }
}
