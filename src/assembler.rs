//! Request Assembler
//!
//! Expands the declared request templates into concrete feature requests,
//! drawing fresh randomized rows from the cached pools on every call. One
//! template produces one request; output preserves declaration order, and a
//! sampling failure in any template discards the whole batch.

use crate::error::{LoadError, SpecError};
use crate::pool::PoolRegistry;
use crate::sampler::RowSampler;
use crate::spec::RequestTemplate;
use crate::types::FeatureRequest;
use rand::Rng;
use std::sync::Arc;

#[derive(Debug)]
pub struct RequestAssembler {
    sampler: RowSampler,
    templates: Vec<RequestTemplate>,
    project: String,
}

impl RequestAssembler {
    /// Build an assembler over the given registry and templates.
    ///
    /// Every entity a template names must already be registered; a dangling
    /// reference is a configuration error here, not a per-trigger failure.
    pub fn new(
        registry: Arc<PoolRegistry>,
        templates: Vec<RequestTemplate>,
        project: impl Into<String>,
    ) -> Result<RequestAssembler, SpecError> {
        let known = registry.names();
        for (index, template) in templates.iter().enumerate() {
            for entity in &template.entities {
                if !known.contains(entity.as_str()) {
                    return Err(SpecError::Config(format!(
                        "Request template #{} references unregistered entity '{}'",
                        index, entity
                    )));
                }
            }
        }
        Ok(RequestAssembler {
            sampler: RowSampler::new(registry),
            templates,
            project: project.into(),
        })
    }

    /// Assemble one feature request per template with fresh random rows.
    pub fn assemble(&self) -> Result<Vec<FeatureRequest>, LoadError> {
        let mut requests = Vec::with_capacity(self.templates.len());
        for template in &self.templates {
            let rows = self.sampler.sample(&template.entities, template.row_count)?;
            requests.push(FeatureRequest {
                project: self.project.clone(),
                features: template.features.clone(),
                entities: rows,
            });
        }
        Ok(requests)
    }

    /// Assemble with a caller-provided random source, for deterministic
    /// tests.
    pub fn assemble_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<FeatureRequest>, LoadError> {
        let mut requests = Vec::with_capacity(self.templates.len());
        for template in &self.templates {
            let rows = self
                .sampler
                .sample_with(rng, &template.entities, template.row_count)?;
            requests.push(FeatureRequest {
                project: self.project.clone(),
                features: template.features.clone(),
                entities: rows,
            });
        }
        Ok(requests)
    }
}
