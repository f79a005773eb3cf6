//! Randomized stand-in for the hazard service.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::HazardEnricher;
use crate::error::EnrichError;
use crate::models::{CandidateRow, HazardValueSet};

/// Response code reported by every mock lookup.
pub const MOCK_RESPONSE_CODE: u16 = 200;

/// Draws each hazard uniformly from `0..=HazardKey::mock_max()`, rounded to
/// two decimals.
#[derive(Debug)]
pub struct MockEnricher {
    rng: Mutex<StdRng>,
}

impl MockEnricher {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence, for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draw one value set.
    pub fn generate(&self) -> HazardValueSet {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        HazardValueSet::from_fn(
            |key| format!("{:.2}", rng.gen_range(0.0..=key.mock_max())),
            MOCK_RESPONSE_CODE.to_string(),
        )
    }
}

impl Default for MockEnricher {
    fn default() -> Self {
        Self::new()
    }
}

impl HazardEnricher for MockEnricher {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn enrich(&self, _row: &CandidateRow) -> Result<HazardValueSet, EnrichError> {
        Ok(self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HazardKey;

    #[test]
    fn test_values_within_range_and_two_decimals() {
        let enricher = MockEnricher::seeded(7);
        for _ in 0..200 {
            let set = enricher.generate();
            assert_eq!(set.response_code, "200");
            for key in HazardKey::ALL {
                let raw = set.get(key);
                let value: f64 = raw.parse().unwrap();
                assert!(value >= 0.0 && value <= key.mock_max(), "{} = {}", key, raw);
                let decimals = raw.split('.').nth(1).map(|d| d.len());
                assert_eq!(decimals, Some(2), "{} = {}", key, raw);
            }
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = MockEnricher::seeded(42).generate();
        let b = MockEnricher::seeded(42).generate();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_enrich_never_fails() {
        let enricher = MockEnricher::new();
        let row = CandidateRow::new("34.0522", "-118.2437", "7-22", "2", "D");
        let set = enricher.enrich(&row).await.unwrap();
        assert_eq!(set.response_code, "200");
        assert_eq!(enricher.name(), "mock");
    }
}
