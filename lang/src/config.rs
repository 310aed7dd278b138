// lang/src/config.rs
// 변환 설정
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::dialect::MappingTable;
use crate::error::ConfigError;

pub const DEFAULT_NATIVE_DEPTH_LIMIT: usize = 4;
pub const DEFAULT_MAX_EXERCISES: usize = 100;
pub const NATIVE_DEPTH_ENV: &str = "TA2SW_NATIVE_DEPTH";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// 중첩 플랫폼 호출을 따라 들어가는 최대 깊이
    pub native_depth_limit: usize,
    /// 내장 1:1 표 위에 덧씌울 항목
    pub extra_mappings: BTreeMap<String, String>,
    /// 곱셈 정규화가 쪼개지 않을 맨 이름
    pub protected_names: Vec<String>,
    pub max_exercises: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            native_depth_limit: DEFAULT_NATIVE_DEPTH_LIMIT,
            extra_mappings: BTreeMap::new(),
            protected_names: Vec::new(),
            max_exercises: DEFAULT_MAX_EXERCISES,
        }
    }
}

impl ConvertConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: ConvertConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// 환경 변수 값으로 깊이 제한을 덮어쓴다. 값이 없으면 그대로.
    pub fn with_depth_override(mut self, value: Option<&str>) -> Result<Self, ConfigError> {
        let Some(raw) = value else {
            return Ok(self);
        };
        let depth = raw.trim().parse::<usize>().map_err(|_| ConfigError::Value {
            field: "native_depth_limit",
            message: format!("{}={} is not a number", NATIVE_DEPTH_ENV, raw),
        })?;
        self.native_depth_limit = depth;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.native_depth_limit == 0 {
            return Err(ConfigError::Value {
                field: "native_depth_limit",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_exercises == 0 {
            return Err(ConfigError::Value {
                field: "max_exercises",
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(source) = self.extra_mappings.keys().find(|key| key.trim().is_empty()) {
            return Err(ConfigError::Value {
                field: "extra_mappings",
                message: format!("empty source name {:?}", source),
            });
        }
        Ok(())
    }

    pub fn mapping_table(&self) -> MappingTable {
        MappingTable::with_extra(&self.extra_mappings)
    }
}
