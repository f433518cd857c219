//! Row Sampler
//!
//! Draws randomized entity rows from the registry's value pools: each named
//! pool is cloned, fully shuffled, and sliced to the requested row count, so
//! every column is a sample without replacement. Cloning before shuffling
//! keeps concurrent triggers from racing on a shared pool buffer.

use crate::error::{LoadError, SpecError};
use crate::pool::PoolRegistry;
use crate::types::{EntityRow, TypedValue};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

#[derive(Debug)]
pub struct RowSampler {
    registry: Arc<PoolRegistry>,
}

impl RowSampler {
    pub fn new(registry: Arc<PoolRegistry>) -> Self {
        RowSampler { registry }
    }

    /// Sample `row_count` rows across the named entities using a fresh
    /// OS-seeded random source. Row combinations vary per call; there is no
    /// reproducibility guarantee.
    pub fn sample(&self, entities: &[String], row_count: u32) -> Result<Vec<EntityRow>, LoadError> {
        self.sample_with(&mut StdRng::from_os_rng(), entities, row_count)
    }

    /// Sample with a caller-provided random source. Tests inject a
    /// fixed-seed generator here for deterministic rows.
    ///
    /// Every named pool is checked and shuffled before the first row is
    /// assembled; a shortfall in any pool produces no partial output.
    pub fn sample_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        entities: &[String],
        row_count: u32,
    ) -> Result<Vec<EntityRow>, LoadError> {
        let count = row_count as usize;

        let mut columns: Vec<(&String, Vec<TypedValue>)> = Vec::with_capacity(entities.len());
        for entity in entities {
            let pool = self.registry.pool_for(entity).ok_or_else(|| {
                SpecError::Config(format!("Unknown entity '{}' in sample request", entity))
            })?;
            if pool.len() < count {
                return Err(LoadError::InsufficientPool {
                    entity: entity.clone(),
                    available: pool.len(),
                    requested: count,
                });
            }
            let mut shuffled = pool.clone();
            shuffled.shuffle(rng);
            shuffled.truncate(count);
            columns.push((entity, shuffled));
        }

        let mut rows = Vec::with_capacity(count);
        for index in 0..count {
            let mut row = EntityRow::with_capacity(columns.len());
            for (entity, values) in &columns {
                row.insert((*entity).clone(), values[index].clone());
            }
            rows.push(row);
        }
        Ok(rows)
    }
}
