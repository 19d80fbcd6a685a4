//! Test cases, pass criteria, and test results
//!
//! These types form the grading contract: challenge definitions supply
//! [`TestCase`] lists as static data, the test runner produces one
//! [`TestResult`] per case. Results live only for the current submission.

use crate::behavior::{ComponentBehaviors, PrebuiltBehavior};
use crate::traffic::TrafficProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What aspect of the design a test case exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Functional,
    Performance,
    Scalability,
    Reliability,
}

/// Declared failure to inject during a test window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    DbCrash,
    ServerCrash,
    CacheCrash,
    /// Cache contents are lost; the component stays up but every read misses
    CacheFlush,
    NetworkPartition,
}

impl FailureKind {
    /// Availability of the targeted component while degraded.
    ///
    /// Crash kinds take the component fully offline; a partition leaves a
    /// constrained fraction reachable. A cache flush does not reduce
    /// availability at all; it zeroes the hit ratio instead.
    pub fn degraded_availability(self) -> f64 {
        match self {
            FailureKind::DbCrash | FailureKind::ServerCrash | FailureKind::CacheCrash => 0.0,
            FailureKind::NetworkPartition => 0.5,
            FailureKind::CacheFlush => 1.0,
        }
    }
}

/// Failure-injection window declared by a test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureSpec {
    #[serde(rename = "type")]
    pub kind: FailureKind,
    pub at_second: u64,
    #[serde(default)]
    pub recovery_second: Option<u64>,
}

/// Thresholds a submission must meet; absent fields are not checked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PassCriteria {
    pub max_p99_latency: Option<f64>,
    pub max_error_rate: Option<f64>,
    pub max_monthly_cost: Option<f64>,
    pub min_availability: Option<f64>,
    pub min_cache_hit_rate: Option<f64>,
    pub max_downtime: Option<f64>,
}

/// One traffic profile plus pass/fail thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TestKind,
    pub traffic: TrafficProfile,
    /// Test window length in seconds
    pub duration: u64,
    #[serde(default)]
    pub failure_injection: Option<FailureSpec>,
    pub pass_criteria: PassCriteria,
}

/// Static challenge definition, as far as the simulator is concerned.
///
/// Challenges are authored as static data; the simulator reads the test
/// cases and behavior configuration and never writes back. Presentation
/// fields (lesson text, hints, reference solutions) live outside this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    /// Component kinds the canvas offers for this challenge
    #[serde(default)]
    pub available_components: Vec<String>,
    pub test_cases: Vec<TestCase>,
    /// Behavior configuration per component id or kind name
    #[serde(default)]
    pub component_behaviors: ComponentBehaviors,
    /// Behavior bundles the user can pick from, per component kind
    #[serde(default)]
    pub prebuilt_behaviors: HashMap<String, Vec<PrebuiltBehavior>>,
}

/// Aggregated end-to-end metrics reported with a test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetrics {
    pub p50_latency: f64,
    pub p99_latency: f64,
    pub error_rate: f64,
    pub monthly_cost: f64,
    pub availability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hit_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infrastructure_cost: Option<f64>,
    /// Seconds of the test window with zero availability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downtime_secs: Option<f64>,
}

/// How the run of a single test case concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    /// The run itself broke (structural graph problem, executor failure);
    /// always implies `passed == false`
    Error,
}

/// Verdict for one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub passed: bool,
    pub status: TestStatus,
    pub metrics: ResultMetrics,
    pub explanation: String,
}

impl TestResult {
    /// A failing result with worst-case metrics, used when the run could not
    /// be performed at all (no entry component, validator gate, executor
    /// failure).
    pub fn failed_closed(explanation: impl Into<String>, monthly_cost: f64) -> Self {
        Self {
            passed: false,
            status: TestStatus::Error,
            metrics: ResultMetrics {
                p50_latency: f64::INFINITY,
                p99_latency: f64::INFINITY,
                error_rate: 1.0,
                monthly_cost,
                availability: 0.0,
                cache_hit_rate: None,
                infrastructure_cost: Some(monthly_cost),
                downtime_secs: None,
            },
            explanation: explanation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_degraded_availability() {
        assert_eq!(FailureKind::DbCrash.degraded_availability(), 0.0);
        assert_eq!(FailureKind::ServerCrash.degraded_availability(), 0.0);
        assert_eq!(FailureKind::NetworkPartition.degraded_availability(), 0.5);
        assert_eq!(FailureKind::CacheFlush.degraded_availability(), 1.0);
    }

    #[test]
    fn test_test_case_deserializes_challenge_json() {
        let json = r#"{
            "name": "NFR-R1: Database Failure",
            "type": "functional",
            "traffic": { "rps": 2000, "readRatio": 0.95 },
            "duration": 120,
            "passCriteria": { "maxErrorRate": 0.1, "minAvailability": 0.95 },
            "failureInjection": { "type": "db_crash", "atSecond": 30, "recoverySecond": 90 }
        }"#;
        let case: TestCase = serde_json::from_str(json).unwrap();
        assert_eq!(case.kind, TestKind::Functional);
        assert_eq!(case.duration, 120);
        let failure = case.failure_injection.unwrap();
        assert_eq!(failure.kind, FailureKind::DbCrash);
        assert_eq!(failure.at_second, 30);
        assert_eq!(failure.recovery_second, Some(90));
        assert_eq!(case.pass_criteria.min_availability, Some(0.95));
        assert_eq!(case.pass_criteria.max_p99_latency, None);
    }

    #[test]
    fn test_challenge_deserializes_with_behaviors() {
        let json = r#"{
            "id": "image-pipeline",
            "title": "Image Processing Pipeline",
            "availableComponents": ["client", "app_server", "message_queue", "worker", "object_storage"],
            "testCases": [{
                "name": "Upload burst",
                "type": "scalability",
                "traffic": { "rps": 500, "readRatio": 0.2 },
                "duration": 60,
                "passCriteria": { "maxErrorRate": 0.05 }
            }],
            "componentBehaviors": {
                "worker": { "behavior": "media_transcode", "transformations": ["thumbnail_resize"] }
            },
            "prebuiltBehaviors": {
                "worker": [
                    { "name": "Transcode", "config": { "behavior": "media_transcode" } },
                    { "name": "Thumbnail only", "config": { "transformations": ["thumbnail_resize"] } }
                ]
            }
        }"#;
        let challenge: Challenge = serde_json::from_str(json).unwrap();
        assert_eq!(challenge.id, "image-pipeline");
        assert_eq!(challenge.test_cases.len(), 1);
        assert_eq!(
            challenge.component_behaviors.0["worker"].behavior.as_deref(),
            Some("media_transcode")
        );
        assert_eq!(challenge.prebuilt_behaviors["worker"].len(), 2);
        assert!(challenge.prebuilt_behaviors["worker"][0].description.is_none());
    }

    #[test]
    fn test_failed_closed_result() {
        let result = TestResult::failed_closed("nothing is connected", 125.0);
        assert!(!result.passed);
        assert_eq!(result.status, TestStatus::Error);
        assert_eq!(result.metrics.error_rate, 1.0);
        assert_eq!(result.metrics.availability, 0.0);
        assert!(result.metrics.p99_latency.is_infinite());
        assert_eq!(result.metrics.monthly_cost, 125.0);
    }
}
