//! Load Specification
//!
//! Declarative description of the synthetic load: which entities exist, how
//! their value pools are sourced, and what shape of feature requests to
//! generate. Loaded once at startup from a YAML document and validated
//! before any pool is built.

use crate::error::SpecError;
use crate::types::ValueType;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Root of the load specification document.
#[derive(Debug, Clone, Deserialize)]
pub struct LoadSpec {
    #[serde(default)]
    pub entities: Vec<EntitySpec>,

    #[serde(default)]
    pub requests: Vec<RequestTemplate>,
}

/// One named entity and the sourcing strategy for its value pool. Exactly
/// one of `file_source` and `rand_int` must be populated.
#[derive(Debug, Clone, Deserialize)]
pub struct EntitySpec {
    pub name: String,

    #[serde(rename = "type")]
    pub value_type: ValueType,

    #[serde(default, rename = "fileSource")]
    pub file_source: Option<FileSource>,

    #[serde(default, rename = "randInt")]
    pub rand_int: Option<RandIntRange>,
}

/// Newline-delimited text file; each non-blank line parses to one value of
/// the entity's declared type.
#[derive(Debug, Clone, Deserialize)]
pub struct FileSource {
    pub path: PathBuf,
}

/// Inclusive integer range, expanded in full into the value pool. Only
/// valid for `int32`/`int64` entities.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RandIntRange {
    pub min: i64,
    pub max: i64,
}

/// Shape of one generated feature request: which entities to draw rows
/// from, which features to ask for, and how many rows per request.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestTemplate {
    pub entities: Vec<String>,

    pub features: Vec<String>,

    #[serde(rename = "rowCount", alias = "entityCount")]
    pub row_count: u32,
}

impl LoadSpec {
    /// Load and validate a specification from a YAML file.
    pub fn load(path: &Path) -> Result<LoadSpec, SpecError> {
        let raw = std::fs::read_to_string(path)?;
        let spec = Self::from_yaml(&raw)?;
        Ok(spec)
    }

    /// Parse and validate a specification from YAML text.
    pub fn from_yaml(raw: &str) -> Result<LoadSpec, SpecError> {
        let spec: LoadSpec = serde_yaml::from_str(raw)
            .map_err(|e| SpecError::Config(format!("Invalid load specification: {}", e)))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Validate the declarative invariants that hold independently of the
    /// filesystem: unique entity names, exactly one sourcing strategy per
    /// entity, and request templates that only name declared entities.
    pub fn validate(&self) -> Result<(), SpecError> {
        let mut names: HashSet<&str> = HashSet::new();
        for entity in &self.entities {
            if entity.name.is_empty() {
                return Err(SpecError::Config(
                    "Entity with empty name in specification".to_string(),
                ));
            }
            if !names.insert(entity.name.as_str()) {
                return Err(SpecError::Config(format!(
                    "Duplicate entity name '{}' in specification",
                    entity.name
                )));
            }
            match (&entity.file_source, &entity.rand_int) {
                (Some(_), Some(_)) => {
                    return Err(SpecError::Config(format!(
                        "Entity '{}' declares both a file source and a random range",
                        entity.name
                    )));
                }
                (None, None) => {
                    return Err(SpecError::Config(format!(
                        "Entity '{}' declares no value source",
                        entity.name
                    )));
                }
                _ => {}
            }
        }

        for (index, template) in self.requests.iter().enumerate() {
            if template.entities.is_empty() {
                return Err(SpecError::Config(format!(
                    "Request template #{} names no entities",
                    index
                )));
            }
            for entity in &template.entities {
                if !names.contains(entity.as_str()) {
                    return Err(SpecError::Config(format!(
                        "Request template #{} references undeclared entity '{}'",
                        index, entity
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_SPEC: &str = r#"
entities:
  - name: restaurant_id
    type: string
    fileSource:
      path: restaurants.txt
  - name: user_id
    type: int64
    randInt:
      min: 1000
      max: 1004
requests:
  - entities: [restaurant_id, user_id]
    features: [f1, f2]
    rowCount: 3
"#;

    #[test]
    fn test_parse_valid_spec() {
        let spec = LoadSpec::from_yaml(VALID_SPEC).unwrap();
        assert_eq!(spec.entities.len(), 2);
        assert_eq!(spec.entities[0].name, "restaurant_id");
        assert_eq!(spec.entities[0].value_type, ValueType::String);
        assert!(spec.entities[0].file_source.is_some());
        assert_eq!(spec.entities[1].rand_int.unwrap().min, 1000);
        assert_eq!(spec.requests.len(), 1);
        assert_eq!(spec.requests[0].row_count, 3);
    }

    #[test]
    fn test_entity_count_alias_is_accepted() {
        let spec = LoadSpec::from_yaml(
            r#"
entities:
  - name: user_id
    type: int64
    randInt: {min: 1, max: 10}
requests:
  - entities: [user_id]
    features: [f1]
    entityCount: 5
"#,
        )
        .unwrap();
        assert_eq!(spec.requests[0].row_count, 5);
    }

    #[test]
    fn test_duplicate_entity_name_rejected() {
        let err = LoadSpec::from_yaml(
            r#"
entities:
  - name: user_id
    type: int64
    randInt: {min: 1, max: 10}
  - name: user_id
    type: int32
    randInt: {min: 1, max: 10}
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate entity name"));
    }

    #[test]
    fn test_both_sources_rejected() {
        let err = LoadSpec::from_yaml(
            r#"
entities:
  - name: user_id
    type: int64
    fileSource: {path: users.txt}
    randInt: {min: 1, max: 10}
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("both a file source and a random range"));
    }

    #[test]
    fn test_missing_source_rejected() {
        let err = LoadSpec::from_yaml(
            r#"
entities:
  - name: user_id
    type: int64
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no value source"));
    }

    #[test]
    fn test_template_referencing_unknown_entity_rejected() {
        let err = LoadSpec::from_yaml(
            r#"
entities:
  - name: user_id
    type: int64
    randInt: {min: 1, max: 10}
requests:
  - entities: [driver_id]
    features: [f1]
    rowCount: 2
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("undeclared entity 'driver_id'"));
    }

    #[test]
    fn test_unrecognized_value_type_rejected() {
        let err = LoadSpec::from_yaml(
            r#"
entities:
  - name: user_id
    type: uint128
    randInt: {min: 1, max: 10}
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SpecError::Config(_)));
    }

    #[test]
    fn test_negative_row_count_rejected_at_parse() {
        let err = LoadSpec::from_yaml(
            r#"
entities:
  - name: user_id
    type: int64
    randInt: {min: 1, max: 10}
requests:
  - entities: [user_id]
    features: [f1]
    rowCount: -1
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SpecError::Config(_)));
    }
}
