//! External code-executor boundary
//!
//! Some challenges benchmark user-submitted code for real latency. The
//! executor is an opaque external service: one request/response round trip
//! per test case, no concurrency, no cancellation. Its raw output carries a
//! single marker line (`__TEST_RESULT__ <json>`) with the measurement; any
//! response without that marker is an execution failure, surfaced to the
//! user as a failing test case rather than an exception.

use archsim_core::ExecError;
use serde::Deserialize;
use uuid::Uuid;

/// Marker line prefix the executor prints before its result payload
pub const RESULT_MARKER: &str = "__TEST_RESULT__";

/// Raw output of one executor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub output: String,
}

/// Boundary to the external execution service.
///
/// Implementations are expected to bound their own execution time; the
/// engine does not enforce a timeout.
pub trait CodeExecutor {
    fn execute(&mut self, script_id: Uuid, source: &str) -> Result<ExecutionOutput, ExecError>;
}

/// Measurement extracted from the executor's marker line
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub latency_ms: f64,
    #[serde(default)]
    pub passed: Option<bool>,
    #[serde(default)]
    pub output: Option<String>,
}

/// Extract the benchmark result from raw executor output.
///
/// Scans for the last marker line and parses the JSON after it; everything
/// else in the output (prints, logs) is ignored.
pub fn parse_benchmark(raw: &str) -> Result<BenchmarkResult, ExecError> {
    let payload = raw
        .lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix(RESULT_MARKER))
        .ok_or_else(|| ExecError::MissingMarker {
            raw: raw.trim().to_string(),
        })?;
    let result: BenchmarkResult = serde_json::from_str(payload.trim())?;
    Ok(result)
}
