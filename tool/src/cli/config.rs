use std::env;
use std::path::Path;

use ta2sw_lang::{ConvertConfig, NATIVE_DEPTH_ENV};

/// 명령행에서 직접 준 값. 파일과 환경 변수보다 우선한다.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigOverrides {
    pub native_depth: Option<usize>,
    pub max_exercises: Option<usize>,
}

pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<ConvertConfig, String> {
    let base = match path {
        Some(path) => ConvertConfig::load(path).map_err(|e| e.to_string())?,
        None => ConvertConfig::default(),
    };
    let env_depth = env::var(NATIVE_DEPTH_ENV).ok();
    resolve(base, env_depth.as_deref(), overrides)
}

/// 파일 → 환경 변수 → 명령행 순으로 덮어쓴다.
pub fn resolve(
    base: ConvertConfig,
    env_depth: Option<&str>,
    overrides: ConfigOverrides,
) -> Result<ConvertConfig, String> {
    let mut config = base.with_depth_override(env_depth).map_err(|e| e.to_string())?;
    if let Some(depth) = overrides.native_depth {
        config.native_depth_limit = depth;
    }
    if let Some(max) = overrides.max_exercises {
        config.max_exercises = max;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_then_flags() {
        let config = resolve(ConvertConfig::default(), Some("2"), ConfigOverrides::default()).expect("env");
        assert_eq!(config.native_depth_limit, 2);

        let overrides = ConfigOverrides {
            native_depth: Some(6),
            max_exercises: Some(10),
        };
        let config = resolve(ConvertConfig::default(), Some("2"), overrides).expect("flags");
        assert_eq!(config.native_depth_limit, 6);
        assert_eq!(config.max_exercises, 10);
    }

    #[test]
    fn invalid_values_carry_codes() {
        let err = resolve(ConvertConfig::default(), Some("x"), ConfigOverrides::default()).expect_err("env");
        assert!(err.starts_with("E_CONFIG_VALUE"));
        let overrides = ConfigOverrides {
            native_depth: None,
            max_exercises: Some(0),
        };
        let err = resolve(ConvertConfig::default(), None, overrides).expect_err("zero");
        assert!(err.starts_with("E_CONFIG_VALUE max_exercises"));
    }
}
