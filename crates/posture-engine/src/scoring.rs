//! Posture score from a list of issues.

use std::fmt;
use std::str::FromStr;

use posture_models::{Issue, Severity, PERFECT_SCORE};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Points deducted per issue, by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionTable {
    pub high: u8,
    pub moderate: u8,
    pub low: u8,
}

impl DeductionTable {
    /// 25 / 15 / 5: the canonical table.
    pub const fn standard() -> Self {
        Self {
            high: 25,
            moderate: 15,
            low: 5,
        }
    }

    /// 20 / 10 / 5: the softer table used by demo deployments.
    pub const fn lenient() -> Self {
        Self {
            high: 20,
            moderate: 10,
            low: 5,
        }
    }

    pub fn deduction(&self, severity: Severity) -> u8 {
        match severity {
            Severity::High => self.high,
            Severity::Moderate => self.moderate,
            Severity::Low => self.low,
        }
    }

    /// Start from 100, deduct per issue, floor at 0.
    pub fn score(&self, issues: &[Issue]) -> u8 {
        issues.iter().fold(PERFECT_SCORE, |score, issue| {
            score.saturating_sub(self.deduction(issue.severity))
        })
    }
}

impl Default for DeductionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Named deduction tables selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringScheme {
    #[default]
    Standard,
    Lenient,
}

impl ScoringScheme {
    pub fn table(&self) -> DeductionTable {
        match self {
            ScoringScheme::Standard => DeductionTable::standard(),
            ScoringScheme::Lenient => DeductionTable::lenient(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringScheme::Standard => "standard",
            ScoringScheme::Lenient => "lenient",
        }
    }
}

impl fmt::Display for ScoringScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringScheme {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ScoringScheme::Standard),
            "lenient" => Ok(ScoringScheme::Lenient),
            other => Err(EngineError::invalid_config(format!("unknown scoring scheme: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posture_models::{BodyRegion, IssueType};

    fn issue(severity: Severity) -> Issue {
        Issue::new(IssueType::Slouching, severity, 0.7, "test", BodyRegion::Spine)
    }

    #[test]
    fn test_no_issues_is_perfect() {
        assert_eq!(DeductionTable::standard().score(&[]), 100);
        assert_eq!(DeductionTable::lenient().score(&[]), 100);
    }

    #[test]
    fn test_standard_deductions() {
        let table = DeductionTable::standard();
        assert_eq!(table.score(&[issue(Severity::High)]), 75);
        assert_eq!(table.score(&[issue(Severity::Moderate)]), 85);
        assert_eq!(table.score(&[issue(Severity::Low)]), 95);
        assert_eq!(
            table.score(&[issue(Severity::High), issue(Severity::Moderate), issue(Severity::Low)]),
            55
        );
    }

    #[test]
    fn test_lenient_deductions() {
        let table = DeductionTable::lenient();
        assert_eq!(table.score(&[issue(Severity::High), issue(Severity::Moderate)]), 70);
    }

    #[test]
    fn test_floored_at_zero() {
        let five_high = vec![issue(Severity::High); 5];
        assert_eq!(DeductionTable::standard().score(&five_high), 0);
        let ten_high = vec![issue(Severity::High); 10];
        assert_eq!(DeductionTable::standard().score(&ten_high), 0);
    }

    #[test]
    fn test_monotonic_in_issue_count() {
        let table = DeductionTable::standard();
        let mut issues = Vec::new();
        let mut previous = table.score(&issues);
        for severity in [Severity::Low, Severity::Moderate, Severity::High].iter().cycle().take(12) {
            issues.push(issue(*severity));
            let current = table.score(&issues);
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn test_order_independent() {
        let table = DeductionTable::standard();
        let forward = [issue(Severity::High), issue(Severity::Low), issue(Severity::Moderate)];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(table.score(&forward), table.score(&reversed));
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("standard".parse::<ScoringScheme>().unwrap(), ScoringScheme::Standard);
        assert_eq!("Lenient".parse::<ScoringScheme>().unwrap(), ScoringScheme::Lenient);
        assert!("harsh".parse::<ScoringScheme>().is_err());
        assert_eq!(ScoringScheme::default().table(), DeductionTable::standard());
    }
}
