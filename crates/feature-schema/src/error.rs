//! Schema Error Types

use thiserror::Error;

/// Caller-supplied feature mapping does not match the schema's name set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("feature set mismatch: missing [{}], unexpected [{}]", .missing.join(", "), .unexpected.join(", "))]
pub struct SchemaMismatchError {
    /// Schema names absent from the mapping, in schema order
    pub missing: Vec<String>,
    /// Names in the mapping that the schema does not define, sorted
    pub unexpected: Vec<String>,
}

impl SchemaMismatchError {
    /// Whether `name` is reported as missing
    pub fn is_missing(&self, name: &str) -> bool {
        self.missing.iter().any(|m| m == name)
    }

    /// Whether `name` is reported as unexpected
    pub fn is_unexpected(&self, name: &str) -> bool {
        self.unexpected.iter().any(|u| u == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_names() {
        let err = SchemaMismatchError {
            missing: vec!["PTH".to_string(), "nPCR".to_string()],
            unexpected: vec!["Height".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "feature set mismatch: missing [PTH, nPCR], unexpected [Height]"
        );
        assert!(err.is_missing("PTH"));
        assert!(err.is_unexpected("Height"));
        assert!(!err.is_missing("Height"));
    }
}
