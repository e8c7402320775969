/// Emissions (reward token) APR heuristics
///
/// Reward APR is not observable from the indexer, so it is estimated from a
/// hand-calibrated table of (range width in USD, APR) observations. Two
/// policies exist and one is selected explicitly through configuration:
///
/// - `Proportional`: one reference. Narrower ranges saturate at the reference
///   APR, wider ones scale down as `apr_ref × width_ref / width`.
/// - `Interpolated`: several references sorted by width. Inside the table the
///   APR is interpolated linearly; outside it is extrapolated inversely from
///   the nearest end of the table.
///
/// Out-of-range positions earn no rewards under either policy.
use crate::config::EstimatorConfig;
use crate::errors::{AprError, AprResult};
use crate::logger::{self, LogTag};
use serde::{Deserialize, Serialize};

/// One calibration observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub width_usd: f64,
    /// Percent
    pub apr: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_price: Option<f64>,
}

impl ReferencePoint {
    pub fn new(width_usd: f64, apr: f64) -> Self {
        Self {
            width_usd,
            apr,
            lower_price: None,
            upper_price: None,
        }
    }

    /// Observation taken for a concrete price range
    pub fn observed(lower_price: f64, upper_price: f64, width_usd: f64, apr: f64) -> Self {
        Self {
            width_usd,
            apr,
            lower_price: Some(lower_price),
            upper_price: Some(upper_price),
        }
    }

    fn validate(&self, field: &str) -> AprResult<()> {
        if !(self.width_usd.is_finite() && self.width_usd > 0.0) {
            return Err(AprError::invalid_configuration(
                field,
                format!("reference width must be positive, got {}", self.width_usd),
            ));
        }
        if !(self.apr.is_finite() && self.apr >= 0.0) {
            return Err(AprError::invalid_configuration(
                field,
                format!("reference APR must be non-negative, got {}", self.apr),
            ));
        }
        Ok(())
    }

    /// `apr × (width_usd / width)`
    fn scaled_to(&self, width: f64) -> f64 {
        self.apr * (self.width_usd / width)
    }
}

/// Policy selector stored in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionsPolicy {
    Proportional,
    Interpolated,
}

impl std::fmt::Display for EmissionsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmissionsPolicy::Proportional => write!(f, "proportional"),
            EmissionsPolicy::Interpolated => write!(f, "interpolated"),
        }
    }
}

/// A validated policy together with its calibration data
#[derive(Debug, Clone, PartialEq)]
pub enum EmissionsEstimator {
    Proportional { reference: ReferencePoint },
    /// Sorted by ascending width, never empty
    Interpolated { references: Vec<ReferencePoint> },
}

impl EmissionsEstimator {
    pub fn proportional(reference: ReferencePoint) -> AprResult<Self> {
        reference.validate("estimator.proportional_reference")?;
        Ok(EmissionsEstimator::Proportional { reference })
    }

    pub fn interpolated(mut references: Vec<ReferencePoint>) -> AprResult<Self> {
        if references.is_empty() {
            return Err(AprError::invalid_configuration(
                "estimator.references",
                "at least one reference point is required",
            ));
        }
        for reference in &references {
            reference.validate("estimator.references")?;
        }
        references.sort_by(|a, b| a.width_usd.total_cmp(&b.width_usd));
        Ok(EmissionsEstimator::Interpolated { references })
    }

    pub fn policy(&self) -> EmissionsPolicy {
        match self {
            EmissionsEstimator::Proportional { .. } => EmissionsPolicy::Proportional,
            EmissionsEstimator::Interpolated { .. } => EmissionsPolicy::Interpolated,
        }
    }

    pub fn references(&self) -> Vec<ReferencePoint> {
        match self {
            EmissionsEstimator::Proportional { reference } => vec![reference.clone()],
            EmissionsEstimator::Interpolated { references } => references.clone(),
        }
    }

    /// Estimated rewards APR (percent) for a range `width_usd` wide
    pub fn estimate(&self, width_usd: f64, in_range: bool) -> AprResult<f64> {
        if !(width_usd.is_finite() && width_usd > 0.0) {
            return Err(AprError::invalid_input(
                "range_width_usd",
                format!("must be positive, got {}", width_usd),
            ));
        }

        if !in_range {
            return Ok(0.0);
        }

        let apr = match self {
            EmissionsEstimator::Proportional { reference } => {
                if width_usd <= reference.width_usd {
                    reference.apr
                } else {
                    reference.scaled_to(width_usd)
                }
            }
            EmissionsEstimator::Interpolated { references } => {
                interpolate(references, width_usd)
            }
        };

        if !apr.is_finite() {
            return Err(AprError::invalid_input(
                "range_width_usd",
                format!("width {} gives a non-finite emissions APR", width_usd),
            ));
        }

        if logger::is_debug_enabled(LogTag::Emissions) {
            logger::debug(
                LogTag::Emissions,
                &format!(
                    "Width ${:.2} -> emissions APR {:.4}% ({} policy)",
                    width_usd,
                    apr,
                    self.policy()
                ),
            );
        }

        Ok(apr)
    }
}

/// `references` must be sorted by width and non-empty
fn interpolate(references: &[ReferencePoint], width: f64) -> f64 {
    let narrowest = &references[0];
    let widest = &references[references.len() - 1];

    if width < narrowest.width_usd {
        return narrowest.scaled_to(width);
    }
    if width > widest.width_usd {
        return widest.scaled_to(width);
    }

    for pair in references.windows(2) {
        let (narrow, wide) = (&pair[0], &pair[1]);
        if width >= narrow.width_usd && width <= wide.width_usd {
            let span = wide.width_usd - narrow.width_usd;
            if span <= 0.0 {
                return narrow.apr;
            }
            // t = 0 at the narrow reference, 1 at the wide one
            let t = (width - narrow.width_usd) / span;
            return narrow.apr * (1.0 - t) + wide.apr * t;
        }
    }

    // Single-entry table, or no bracket matched
    let closest = references
        .iter()
        .min_by(|a, b| {
            (a.width_usd - width)
                .abs()
                .total_cmp(&(b.width_usd - width).abs())
        })
        .unwrap_or(narrowest);
    closest.scaled_to(width)
}

impl EstimatorConfig {
    /// Build the emissions estimator selected by `emissions_policy`
    pub fn emissions_estimator(&self) -> AprResult<EmissionsEstimator> {
        match self.emissions_policy {
            EmissionsPolicy::Proportional => {
                EmissionsEstimator::proportional(self.proportional_reference.clone())
            }
            EmissionsPolicy::Interpolated => {
                EmissionsEstimator::interpolated(self.references.clone())
            }
        }
    }
}
