//! Hazard enrichment.
//!
//! A [`HazardEnricher`] turns one validated row into a [`HazardValueSet`].
//! Two implementations ship with the crate:
//!
//! - [`MockEnricher`] - uniformly random values, never fails
//! - [`RemoteEnricher`] - one GET per row against the hazard service
//!
//! [`Enricher`] wraps both so the variant can be picked at runtime.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hazardtool::enrich::{HazardEnricher, MockEnricher};
//! use hazardtool::models::CandidateRow;
//!
//! let enricher = MockEnricher::new();
//! let row = CandidateRow::new("34.0522", "-118.2437", "7-22", "2", "D");
//! let hazards = enricher.enrich(&row).await?;
//! assert_eq!(hazards.response_code, "200");
//! ```

pub mod mock;
pub mod remote;

use std::future::Future;

use crate::error::EnrichError;
use crate::models::{CandidateRow, HazardValueSet};

pub use mock::MockEnricher;
pub use remote::{parse_hazard_response, RemoteEnricher};

/// Produces hazard values for one validated row.
///
/// Implementations must return a set with every hazard key populated.
pub trait HazardEnricher {
    /// Short name for logs and API metadata.
    fn name(&self) -> &'static str;

    fn enrich(
        &self,
        row: &CandidateRow,
    ) -> impl Future<Output = Result<HazardValueSet, EnrichError>> + Send;
}

/// Runtime choice between the mock and remote variants.
#[derive(Debug)]
pub enum Enricher {
    Mock(MockEnricher),
    Remote(RemoteEnricher),
}

impl HazardEnricher for Enricher {
    fn name(&self) -> &'static str {
        match self {
            Enricher::Mock(e) => e.name(),
            Enricher::Remote(e) => e.name(),
        }
    }

    async fn enrich(&self, row: &CandidateRow) -> Result<HazardValueSet, EnrichError> {
        match self {
            Enricher::Mock(e) => e.enrich(row).await,
            Enricher::Remote(e) => e.enrich(row).await,
        }
    }
}

impl From<MockEnricher> for Enricher {
    fn from(e: MockEnricher) -> Self {
        Enricher::Mock(e)
    }
}

impl From<RemoteEnricher> for Enricher {
    fn from(e: RemoteEnricher) -> Self {
        Enricher::Remote(e)
    }
}
