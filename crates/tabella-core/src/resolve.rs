use crate::error::TabellaError;
use crate::extraction::{PageScope, RegionExtractor};
use crate::registry::schema::CandidateProbe;
use crate::registry::Registry;
use serde::Serialize;
use std::path::Path;

/// What a single probe region produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The first cell is a known supplier id.
    Matched(String),
    /// The first cell has text, but no supplier uses it.
    Mismatch(String),
    /// The region holds no table, row or text.
    Empty,
    /// The extractor failed on this region.
    Miss(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeAttempt {
    pub label: String,
    pub outcome: ProbeOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub supplier_id: String,
    pub probe_label: String,
}

/// Every probe tried, in order, plus the match if one was found.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveReport {
    pub attempts: Vec<ProbeAttempt>,
    pub resolution: Option<Resolution>,
}

impl ResolveReport {
    pub fn into_result(self) -> Result<Resolution, TabellaError> {
        let probes_tried = self.attempts.len();
        self.resolution
            .ok_or(TabellaError::SupplierUnresolved { probes_tried })
    }
}

/// Finds which supplier issued a document by reading the first cell of each
/// probe region until one matches a registry key.
pub struct SupplierResolver<'a> {
    extractor: &'a dyn RegionExtractor,
    registry: &'a Registry,
}

impl<'a> SupplierResolver<'a> {
    pub fn new(extractor: &'a dyn RegionExtractor, registry: &'a Registry) -> Self {
        SupplierResolver {
            extractor,
            registry,
        }
    }

    /// Try probes in registry order and stop at the first match.
    ///
    /// Failing or empty probes are recorded and skipped. The only error is
    /// an extraction engine that cannot run at all.
    pub fn run(&self, pdf: &Path) -> Result<ResolveReport, TabellaError> {
        let mut attempts = Vec::new();

        for probe in self.registry.probes() {
            tracing::info!(
                probe = %probe.label,
                region = %probe.region,
                backend = self.extractor.backend_name(),
                "checking probe position"
            );
            let outcome = self.probe(pdf, probe)?;
            let matched = match &outcome {
                ProbeOutcome::Matched(id) => Some(id.clone()),
                _ => None,
            };
            attempts.push(ProbeAttempt {
                label: probe.label.clone(),
                outcome,
            });

            if let Some(supplier_id) = matched {
                tracing::info!(probe = %probe.label, supplier = %supplier_id, "probe position matched");
                return Ok(ResolveReport {
                    attempts,
                    resolution: Some(Resolution {
                        supplier_id,
                        probe_label: probe.label.clone(),
                    }),
                });
            }
        }

        Ok(ResolveReport {
            attempts,
            resolution: None,
        })
    }

    /// Like [`run`](Self::run), but an unmatched document is an error.
    pub fn resolve(&self, pdf: &Path) -> Result<Resolution, TabellaError> {
        self.run(pdf)?.into_result()
    }

    fn probe(&self, pdf: &Path, probe: &CandidateProbe) -> Result<ProbeOutcome, TabellaError> {
        let grids = match self
            .extractor
            .extract_region(pdf, &probe.region, PageScope::All)
        {
            Ok(grids) => grids,
            Err(e) if e.is_engine_unavailable() => return Err(e),
            Err(e) => {
                tracing::info!(probe = %probe.label, error = %e, "no table in probe region");
                return Ok(ProbeOutcome::Miss(e.to_string()));
            }
        };

        let value = match grids.first().and_then(|g| g.first_cell()) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                tracing::info!(probe = %probe.label, "probe region is empty");
                return Ok(ProbeOutcome::Empty);
            }
        };

        if self.registry.contains(&value) {
            Ok(ProbeOutcome::Matched(value))
        } else {
            tracing::warn!(probe = %probe.label, value = %value, "value is not a known supplier");
            Ok(ProbeOutcome::Mismatch(value))
        }
    }
}
