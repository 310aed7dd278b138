// lang/src/error.rs
use std::fmt;

use serde::Serialize;

/// 변환 중 발견된 문제. 한 문장/조각에 국한되며 배치를 멈추지 않는다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConvertIssue {
    UnsupportedFunction { name: String },
    StructuralAmbiguity { name: String, detail: String },
    OpaqueFallback { fragment: String },
    MalformedInput { message: String },
    NestingLimit { depth: usize },
    SchemeExhausted { name: String },
}

impl ConvertIssue {
    pub fn code(&self) -> &'static str {
        match self {
            ConvertIssue::UnsupportedFunction { .. } => "W_UNSUPPORTED_FUNCTION",
            ConvertIssue::StructuralAmbiguity { .. } => "W_STRUCTURAL_AMBIGUITY",
            ConvertIssue::OpaqueFallback { .. } => "W_OPAQUE_FALLBACK",
            ConvertIssue::MalformedInput { .. } => "E_MALFORMED_INPUT",
            ConvertIssue::NestingLimit { .. } => "E_NATIVE_NESTING_LIMIT",
            ConvertIssue::SchemeExhausted { .. } => "E_SCHEME_EXHAUSTED",
        }
    }

    pub fn unsupported(name: impl Into<String>) -> Self {
        ConvertIssue::UnsupportedFunction { name: name.into() }
    }

    pub fn ambiguity(name: impl Into<String>, detail: impl Into<String>) -> Self {
        ConvertIssue::StructuralAmbiguity {
            name: name.into(),
            detail: detail.into(),
        }
    }

    pub fn opaque(fragment: impl Into<String>) -> Self {
        ConvertIssue::OpaqueFallback {
            fragment: fragment.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ConvertIssue::MalformedInput {
            message: message.into(),
        }
    }

    /// 변환 자체를 포기해야 하는 문제인지
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ConvertIssue::MalformedInput { .. }
                | ConvertIssue::NestingLimit { .. }
                | ConvertIssue::SchemeExhausted { .. }
        )
    }
}

impl fmt::Display for ConvertIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertIssue::UnsupportedFunction { name } => {
                write!(f, "{} no mapping for function `{}`", self.code(), name)
            }
            ConvertIssue::StructuralAmbiguity { name, detail } => {
                write!(f, "{} `{}`: {}", self.code(), name, detail)
            }
            ConvertIssue::OpaqueFallback { fragment } => {
                write!(f, "{} kept as native expression: {}", self.code(), fragment)
            }
            ConvertIssue::MalformedInput { message } => write!(f, "{} {}", self.code(), message),
            ConvertIssue::NestingLimit { depth } => {
                write!(f, "{} native calls nested deeper than {}", self.code(), depth)
            }
            ConvertIssue::SchemeExhausted { name } => {
                write!(f, "{} no canonical name left for {}", self.code(), name)
            }
        }
    }
}

impl std::error::Error for ConvertIssue {}

#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Value { field: &'static str, message: String },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io(_) => "E_CONFIG_IO",
            ConfigError::Parse(_) => "E_CONFIG_PARSE",
            ConfigError::Value { .. } => "E_CONFIG_VALUE",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(message) | ConfigError::Parse(message) => {
                write!(f, "{} {}", self.code(), message)
            }
            ConfigError::Value { field, message } => {
                write!(f, "{} {}: {}", self.code(), field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ConvertIssue::unsupported("foo").code(), "W_UNSUPPORTED_FUNCTION");
        assert_eq!(ConvertIssue::malformed("x").code(), "E_MALFORMED_INPUT");
        assert_eq!(ConfigError::Io("x".to_string()).code(), "E_CONFIG_IO");
    }

    #[test]
    fn fatal_issues_are_the_error_class() {
        assert!(ConvertIssue::malformed("x").is_fatal());
        assert!(ConvertIssue::NestingLimit { depth: 4 }.is_fatal());
        assert!(!ConvertIssue::opaque("pi").is_fatal());
        assert!(!ConvertIssue::ambiguity("sort", "three arguments").is_fatal());
    }

    #[test]
    fn display_starts_with_code() {
        let text = ConvertIssue::unsupported("Foo").to_string();
        assert_eq!(text, "W_UNSUPPORTED_FUNCTION no mapping for function `Foo`");
    }
}
