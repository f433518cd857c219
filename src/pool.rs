//! Value Pools
//!
//! Materializes the finite universe of candidate values for each declared
//! entity, either from a newline-delimited file or by expanding an inclusive
//! integer range. The registry owns one pool per entity for the process
//! lifetime; samplers borrow pools and clone them before shuffling.

use crate::error::SpecError;
use crate::spec::{EntitySpec, LoadSpec, RandIntRange};
use crate::types::{TypedValue, ValuePool, ValueType};
use std::collections::HashMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use tracing::debug;

/// Build the value pool for one entity spec.
///
/// The sourcing strategy is selected by which source field is populated;
/// specification validation guarantees exactly one is. Any error aborts pool
/// construction entirely rather than skipping bad input.
pub fn generate_pool(entity: &EntitySpec) -> Result<ValuePool, SpecError> {
    if let Some(source) = &entity.file_source {
        return file_sourced_pool(entity, &source.path);
    }
    if let Some(range) = &entity.rand_int {
        return range_sourced_pool(entity, *range);
    }
    Err(SpecError::Config(format!(
        "Entity '{}' declares no value source",
        entity.name
    )))
}

/// Read the file line by line, parsing each non-blank line as one value of
/// the entity's declared type. Values keep file order.
fn file_sourced_pool(entity: &EntitySpec, path: &std::path::Path) -> Result<ValuePool, SpecError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut pool = ValuePool::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        pool.push(parse_value(entity, &line)?);
    }
    debug!(
        entity = %entity.name,
        path = %path.display(),
        size = pool.len(),
        "Built file-sourced value pool"
    );
    Ok(pool)
}

fn parse_value(entity: &EntitySpec, line: &str) -> Result<TypedValue, SpecError> {
    let parse_error = |expected: &'static str, reason: String| SpecError::Parse {
        entity: entity.name.clone(),
        value: line.to_string(),
        expected,
        reason,
    };

    match entity.value_type {
        ValueType::String => Ok(TypedValue::String(line.to_string())),
        ValueType::Int32 => line
            .trim()
            .parse::<i32>()
            .map(TypedValue::Int32)
            .map_err(|e| parse_error("int32", e.to_string())),
        ValueType::Int64 => line
            .trim()
            .parse::<i64>()
            .map(TypedValue::Int64)
            .map_err(|e| parse_error("int64", e.to_string())),
        ValueType::Float => line
            .trim()
            .parse::<f32>()
            .map(TypedValue::Float)
            .map_err(|e| parse_error("float", e.to_string())),
        ValueType::Double => line
            .trim()
            .parse::<f64>()
            .map(TypedValue::Double)
            .map_err(|e| parse_error("double", e.to_string())),
        ValueType::Bool => parse_bool(line.trim())
            .map(TypedValue::Bool)
            .ok_or_else(|| parse_error("bool", "not a boolean literal".to_string())),
    }
}

/// Case-insensitive `true`/`false` plus the single-character and numeric
/// literals accepted by the serving ecosystem's config parsers.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

/// Expand the inclusive `[min, max]` range into an ascending pool. The whole
/// range is enumerated up front, so pool size is exactly `max - min + 1`;
/// callers are responsible for keeping ranges pool-sized.
fn range_sourced_pool(entity: &EntitySpec, range: RandIntRange) -> Result<ValuePool, SpecError> {
    if range.min > range.max {
        return Err(SpecError::Config(format!(
            "Entity '{}' has an empty random range: min {} > max {}",
            entity.name, range.min, range.max
        )));
    }

    let pool = match entity.value_type {
        ValueType::Int64 => (range.min..=range.max).map(TypedValue::Int64).collect(),
        ValueType::Int32 => {
            let min = i32::try_from(range.min).map_err(|_| range_width_error(entity, range.min))?;
            let max = i32::try_from(range.max).map_err(|_| range_width_error(entity, range.max))?;
            (min..=max).map(TypedValue::Int32).collect()
        }
        other => {
            return Err(SpecError::Config(format!(
                "Entity '{}' declares a random range but type '{}'; only int32 and int64 are supported",
                entity.name, other
            )));
        }
    };
    debug!(
        entity = %entity.name,
        min = range.min,
        max = range.max,
        "Built range-sourced value pool"
    );
    Ok(pool)
}

fn range_width_error(entity: &EntitySpec, bound: i64) -> SpecError {
    SpecError::Config(format!(
        "Entity '{}' random range bound {} does not fit in int32",
        entity.name, bound
    ))
}

/// Owns one value pool per declared entity, keyed by entity name.
///
/// Built once at startup and shared read-only across every trigger for the
/// process lifetime. Construction fails fast on the first pool-generation
/// error; a partially built registry is never exposed.
#[derive(Debug)]
pub struct PoolRegistry {
    pools: HashMap<String, ValuePool>,
}

impl PoolRegistry {
    pub fn from_spec(spec: &LoadSpec) -> Result<PoolRegistry, SpecError> {
        let mut pools = HashMap::with_capacity(spec.entities.len());
        for entity in &spec.entities {
            let pool = generate_pool(entity)?;
            pools.insert(entity.name.clone(), pool);
        }
        Ok(PoolRegistry { pools })
    }

    /// Shared reference to an entity's pool, if the entity is registered.
    pub fn pool_for(&self, entity: &str) -> Option<&ValuePool> {
        self.pools.get(entity)
    }

    /// Names of all registered entities.
    pub fn names(&self) -> HashSet<&str> {
        self.pools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
