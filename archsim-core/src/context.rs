//! Per-run simulation context

/// Read-only context shared by every `simulate` call within one test case.
///
/// `elapsed_secs` is the test window length, used by queue-depth estimates;
/// `benchmarked_latency_ms` carries a measured latency from the external code
/// executor when the challenge benchmarks user-submitted code.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationContext {
    pub elapsed_secs: f64,
    pub benchmarked_latency_ms: Option<f64>,
}

impl SimulationContext {
    pub fn new(elapsed_secs: f64) -> Self {
        Self {
            elapsed_secs: elapsed_secs.max(0.0),
            benchmarked_latency_ms: None,
        }
    }

    pub fn with_benchmarked_latency(mut self, latency_ms: f64) -> Self {
        self.benchmarked_latency_ms = Some(latency_ms);
        self
    }
}
