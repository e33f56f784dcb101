//! Fixed per-family risk thresholds and warning texts.

use crate::{
    constants::{ELBOW_RISK_THRESHOLD, KNEE_RISK_THRESHOLD, SHOULDER_RISK_THRESHOLD, SPINE_LEAN_RISK_THRESHOLD},
    landmarks::AngleFamily,
    utils::whole_degrees,
};

/// Which side of the threshold counts as risky
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskDirection {
    /// Values below the threshold are risky
    LowIsBad,
    /// Values above the threshold are risky
    HighIsBad,
}

/// Threshold rule for one angle family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskRule {
    pub family: AngleFamily,
    pub threshold: f64,
    pub direction: RiskDirection,
    /// Warning line; `{angle}` is replaced by the integer degree value
    pub template: &'static str,
}

/// Rules in reporting order: elbow, spine, knee, shoulder
pub const RISK_RULES: [RiskRule; 4] = [
    RiskRule {
        family: AngleFamily::Elbow,
        threshold: ELBOW_RISK_THRESHOLD,
        direction: RiskDirection::LowIsBad,
        template: "⚠️ Elbow angle is too low ({angle}°) — may indicate illegal action or strain.",
    },
    RiskRule {
        family: AngleFamily::SpineLean,
        threshold: SPINE_LEAN_RISK_THRESHOLD,
        direction: RiskDirection::HighIsBad,
        template: "⚠️ Excessive spine lean detected ({angle}°). Can cause back strain.",
    },
    RiskRule {
        family: AngleFamily::Knee,
        threshold: KNEE_RISK_THRESHOLD,
        direction: RiskDirection::LowIsBad,
        template: "⚠️ Front knee bend is too deep ({angle}°). Risk of knee injury.",
    },
    RiskRule {
        family: AngleFamily::ShoulderAbduction,
        threshold: SHOULDER_RISK_THRESHOLD,
        direction: RiskDirection::HighIsBad,
        template: "⚠️ Shoulder raised too far ({angle}°). Risk of shoulder impingement.",
    },
];

impl RiskRule {
    /// Rule for a family
    #[must_use]
    pub fn for_family(family: AngleFamily) -> &'static RiskRule {
        match family {
            AngleFamily::Elbow => &RISK_RULES[0],
            AngleFamily::SpineLean => &RISK_RULES[1],
            AngleFamily::Knee => &RISK_RULES[2],
            AngleFamily::ShoulderAbduction => &RISK_RULES[3],
        }
    }

    /// Whether `value` lies strictly past the threshold in the risky direction
    #[must_use]
    pub fn is_breached(&self, value: f64) -> bool {
        match self.direction {
            RiskDirection::LowIsBad => value < self.threshold,
            RiskDirection::HighIsBad => value > self.threshold,
        }
    }

    /// Warning line for a measured value
    #[must_use]
    pub fn warning(&self, value: f64) -> String {
        self.template.replace("{angle}", &whole_degrees(value).to_string())
    }
}
