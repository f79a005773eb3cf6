//! Reference data for row validation.
//!
//! Standards versions, risk levels, and which site classes each standards
//! version accepts. The catalog is built once on first use and never
//! mutated afterwards.
//!
//! | Standard | Allowed site classes |
//! |----------|----------------------|
//! | 7-10     | A, B, C, D, E, F |
//! | 7-16     | A, B, C, D, E, F, B-estimated, D-default, BC, DE |
//! | 7-22     | A, B, C, D, E, B-estimated, D-default, BC, CD, DE, Default |
//! | 41-17    | A, B, C, D, E, F |

use once_cell::sync::Lazy;
use serde::Serialize;

/// Process-wide rule catalog.
pub static RULE_CATALOG: Lazy<RuleCatalog> = Lazy::new(RuleCatalog::builtin);

/// Site classes for one standards version.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardRules {
    pub version: &'static str,
    pub site_classes: Vec<&'static str>,
}

/// Allowed values for every validated column.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCatalog {
    standards: Vec<StandardRules>,
    risk_levels: Vec<&'static str>,
}

impl RuleCatalog {
    fn builtin() -> Self {
        const BASE: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

        let standards = vec![
            StandardRules {
                version: "7-10",
                site_classes: BASE.to_vec(),
            },
            StandardRules {
                version: "7-16",
                site_classes: vec![
                    "A", "B", "C", "D", "E", "F", "B-estimated", "D-default", "BC", "DE",
                ],
            },
            StandardRules {
                version: "7-22",
                site_classes: vec![
                    "A", "B", "C", "D", "E", "B-estimated", "D-default", "BC", "CD", "DE",
                    "Default",
                ],
            },
            StandardRules {
                version: "41-17",
                site_classes: BASE.to_vec(),
            },
        ];

        Self {
            standards,
            risk_levels: vec!["1", "2", "3", "4"],
        }
    }

    /// Known standards versions, in catalog order.
    pub fn standards_versions(&self) -> Vec<&'static str> {
        self.standards.iter().map(|s| s.version).collect()
    }

    /// Known risk levels.
    pub fn risk_levels(&self) -> &[&'static str] {
        &self.risk_levels
    }

    pub fn is_standards_version(&self, value: &str) -> bool {
        self.standards.iter().any(|s| s.version == value)
    }

    pub fn is_risk_level(&self, value: &str) -> bool {
        self.risk_levels.contains(&value)
    }

    /// Whether `value` is a site class under any standards version.
    pub fn is_site_class(&self, value: &str) -> bool {
        self.standards.iter().any(|s| s.site_classes.contains(&value))
    }

    /// Site classes legal under `standards_version`, or `None` if the
    /// version is not in the catalog.
    pub fn site_classes_for(&self, standards_version: &str) -> Option<&[&'static str]> {
        self.standards
            .iter()
            .find(|s| s.version == standards_version)
            .map(|s| s.site_classes.as_slice())
    }
}
