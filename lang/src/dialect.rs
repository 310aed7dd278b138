// lang/src/dialect.rs
// Maple → Maxima 1:1 함수 이름표
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

const MAPPING_TABLE_TSV: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/maple_maxima.tsv"
));

const SOURCE_COLUMN: &str = "maple";
const TARGET_COLUMN: &str = "maxima";

/// 원천 함수 이름 → 대상 함수 이름. 정확히 같은 이름(대소문자 구분)만 찾는다.
#[derive(Clone, Debug)]
pub struct MappingTable {
    map: HashMap<String, String>,
}

impl MappingTable {
    /// 내장 표
    pub fn standard() -> Self {
        Self {
            map: MappingLexicon::get().map.clone(),
        }
    }

    /// 내장 표 위에 추가 항목을 덮어쓴다.
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut table = Self::standard();
        for (source, target) in extra {
            let source = source.trim();
            let target = target.trim();
            if source.is_empty() || target.is_empty() {
                continue;
            }
            table.map.insert(source.to_string(), target.to_string());
        }
        table
    }

    pub fn target<'a>(&'a self, name: &str) -> Option<&'a str> {
        self.map.get(name).map(|value| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for MappingTable {
    fn default() -> Self {
        Self::standard()
    }
}

struct MappingLexicon {
    map: HashMap<String, String>,
}

impl MappingLexicon {
    fn get() -> &'static Self {
        static INSTANCE: OnceLock<MappingLexicon> = OnceLock::new();
        INSTANCE.get_or_init(Self::load)
    }

    fn load() -> Self {
        let mut lines = MAPPING_TABLE_TSV.lines();
        let header_line = lines.next().unwrap_or_default().trim_start_matches('\u{feff}');
        let headers: Vec<&str> = header_line.split('\t').collect();
        let source_idx = headers.iter().position(|h| *h == SOURCE_COLUMN).unwrap_or(0);
        let target_idx = headers.iter().position(|h| *h == TARGET_COLUMN).unwrap_or(1);
        let mut map = HashMap::new();

        for line in lines {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let values: Vec<&str> = line.split('\t').collect();
            let source = values.get(source_idx).copied().unwrap_or_default().trim();
            let target = values.get(target_idx).copied().unwrap_or_default().trim();
            if source.is_empty() || target.is_empty() {
                continue;
            }
            map.insert(source.to_string(), target.to_string());
        }

        Self { map }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_has_inverse_trig() {
        let table = MappingTable::standard();
        assert_eq!(table.target("arccos"), Some("acos"));
        assert_eq!(table.target("arcsin"), Some("asin"));
        assert_eq!(table.target("sin"), Some("sin"));
        assert!(table.target("Arccos").is_none());
    }

    #[test]
    fn special_forms_are_not_plain_renames() {
        let table = MappingTable::standard();
        for name in ["int", "Int", "seq", "op", "convert", "evalb", "evalf", "sort"] {
            assert!(!table.contains(name), "{name} must go through its own rule");
        }
    }

    #[test]
    fn extra_entries_override() {
        let mut extra = BTreeMap::new();
        extra.insert("nops".to_string(), "llength".to_string());
        extra.insert("mul".to_string(), "product".to_string());
        extra.insert(" ".to_string(), "ignored".to_string());
        let table = MappingTable::with_extra(&extra);
        assert_eq!(table.target("nops"), Some("llength"));
        assert_eq!(table.target("mul"), Some("product"));
        assert_eq!(table.len(), MappingTable::standard().len() + 1);
    }
}
