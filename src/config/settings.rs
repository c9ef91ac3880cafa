use crate::core::matcher::SignalSettings;
use crate::utils::error::{LinkerError, Result};
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 外掛在主程式設定中的 id
pub const PLUGIN_ID: &str = "orphanScenesToGalleries";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// 依目錄階層（同目錄、子目錄、直接上層）
    #[default]
    Hierarchy,
    /// 依畫廊目錄、共同演員與日期
    Signals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub exclude_organized: bool,
    pub dry_run: bool,
    pub match_strategy: MatchStrategy,
    pub match_by_path: bool,
    pub match_by_date: bool,
    pub date_tolerance: i64,
    pub match_by_performers: bool,
    pub min_performer_match: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exclude_organized: false,
            dry_run: false,
            match_strategy: MatchStrategy::Hierarchy,
            match_by_path: true,
            match_by_date: false,
            date_tolerance: 1,
            match_by_performers: false,
            min_performer_match: 1,
        }
    }
}

impl Settings {
    /// 合併設定：預設值 < 主程式中的外掛設定 < 本次任務參數，合併後驗證
    pub fn resolve(plugin_config: &Map<String, Value>, overrides: &Map<String, Value>) -> Result<Self> {
        let mut merged = match serde_json::to_value(Settings::default())? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in plugin_config.iter().chain(overrides.iter()) {
            // 主程式對未設定的選項可能回傳 null
            if !value.is_null() {
                merged.insert(key.clone(), value.clone());
            }
        }

        let settings: Settings =
            serde_json::from_value(Value::Object(merged)).map_err(|e| LinkerError::ConfigError {
                message: format!("Invalid plugin settings: {}", e),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn signal_settings(&self) -> SignalSettings {
        SignalSettings {
            match_by_path: self.match_by_path,
            match_by_performers: self.match_by_performers,
            min_performer_match: self.min_performer_match,
            match_by_date: self.match_by_date,
            date_tolerance_days: self.date_tolerance,
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_range("dateTolerance", self.date_tolerance, 0, 3650)?;
        validate_positive_number("minPerformerMatch", self.min_performer_match, 1)?;
        Ok(())
    }
}
