use crate::fault::{Fault, FaultKind};
use serde::Serialize;
use std::fmt;

/// What happened when one scenario ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    Completed { scenario: String },
    Faulted { scenario: String, fault: Fault },
}

impl Outcome {
    pub fn completed(scenario: impl Into<String>) -> Self {
        Outcome::Completed {
            scenario: scenario.into(),
        }
    }

    pub fn faulted(scenario: impl Into<String>, fault: Fault) -> Self {
        Outcome::Faulted {
            scenario: scenario.into(),
            fault,
        }
    }

    pub fn scenario(&self) -> &str {
        match self {
            Outcome::Completed { scenario } | Outcome::Faulted { scenario, .. } => scenario,
        }
    }

    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Outcome::Completed { .. } => None,
            Outcome::Faulted { fault, .. } => Some(fault),
        }
    }

    pub fn kind(&self) -> Option<FaultKind> {
        self.fault().map(Fault::kind)
    }

    pub fn message(&self) -> Option<&str> {
        self.fault().map(Fault::message)
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, Outcome::Faulted { .. })
    }
}

/// One report line per outcome:
/// `<name> occurred: <message>`, or `<name>: completed` when nothing broke.
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed { scenario } => write!(f, "{scenario}: completed"),
            Outcome::Faulted { scenario, fault } if fault.kind().is_natural_end() => {
                write!(f, "{scenario}: completed ({fault})")
            }
            Outcome::Faulted { scenario, fault } => write!(f, "{scenario} occurred: {fault}"),
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// The ordered outcomes of a full run with a couple of counts on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
    pub completed: usize,
    pub faulted: usize,
}

impl Report {
    pub fn from_outcomes(outcomes: Vec<Outcome>) -> Self {
        let faulted = outcomes.iter().filter(|o| o.is_faulted()).count();
        Self {
            completed: outcomes.len() - faulted,
            faulted,
            outcomes,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Fault kinds in run order, `None` for scenarios that completed.
    pub fn kinds(&self) -> Vec<Option<FaultKind>> {
        self.outcomes.iter().map(Outcome::kind).collect()
    }

    pub fn summary(&self) -> String {
        let count = self.len();
        let plural = if count == 1 { "" } else { "s" };
        format!(
            "{count} scenario{plural}, {} fault{} contained",
            self.faulted,
            if self.faulted == 1 { "" } else { "s" }
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample() -> Vec<Outcome> {
        vec![
            Outcome::faulted(
                "divide-by-zero",
                Fault::new(FaultKind::InvalidArithmetic, "attempt to divide by zero"),
            ),
            Outcome::faulted(
                "read-past-end",
                Fault::new(FaultKind::EndOfStream, "end of file reached after 2 records"),
            ),
            Outcome::completed("open-missing-file"),
        ]
    }

    #[test]
    fn test_faulted_line_format() {
        let outcomes = sample();
        assert_eq!(
            outcomes[0].to_string(),
            "divide-by-zero occurred: attempt to divide by zero"
        );
    }

    #[test]
    fn test_natural_end_renders_as_completed() {
        let outcomes = sample();
        assert_eq!(
            outcomes[1].to_string(),
            "read-past-end: completed (end of file reached after 2 records)"
        );
        assert!(outcomes[1].is_faulted());
    }

    #[test]
    fn test_completed_line_format() {
        let outcomes = sample();
        assert_eq!(outcomes[2].to_string(), "open-missing-file: completed");
        assert_eq!(outcomes[2].kind(), None);
        assert_eq!(outcomes[2].message(), None);
    }

    #[test]
    fn test_report_counts() {
        let report = Report::from_outcomes(sample());
        assert_eq!(report.len(), 3);
        assert_eq!(report.faulted, 2);
        assert_eq!(report.completed, 1);
        assert_eq!(report.summary(), "3 scenarios, 2 faults contained");
        assert_eq!(
            report.kinds(),
            vec![
                Some(FaultKind::InvalidArithmetic),
                Some(FaultKind::EndOfStream),
                None
            ]
        );
    }

    #[test]
    fn test_empty_report_summary() {
        let report = Report::from_outcomes(Vec::new());
        assert!(report.is_empty());
        assert_eq!(report.summary(), "0 scenarios, 0 faults contained");
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report::from_outcomes(sample());
        let json: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["faulted"], 2);
        assert_eq!(json["outcomes"][0]["status"], "faulted");
        assert_eq!(json["outcomes"][0]["scenario"], "divide-by-zero");
        assert_eq!(
            json["outcomes"][0]["fault"]["kind"],
            "invalid-arithmetic-operation"
        );
        assert_eq!(json["outcomes"][2]["status"], "completed");
    }
}
