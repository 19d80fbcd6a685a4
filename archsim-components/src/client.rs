//! Client model
//!
//! The traffic generator. Pure pass-through: zero latency, zero cost, zero
//! errors; it exists so the traversal has a root.

use archsim_core::{ClientConfig, ComponentMetrics, Load};

use crate::model::EffectiveOutput;

pub struct Client<'a> {
    pub name: &'a str,
}

impl<'a> Client<'a> {
    pub fn new(name: &'a str, _config: &'a ClientConfig) -> Self {
        Self { name }
    }

    pub fn simulate(&self, load: Load) -> EffectiveOutput {
        EffectiveOutput {
            metrics: ComponentMetrics::passthrough(),
            forwarded: load,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_is_identity() {
        let config = ClientConfig {};
        let client = Client::new("web", &config);
        let load = Load::new(500.0, 100.0);
        let out = client.simulate(load);
        assert_eq!(out.metrics, ComponentMetrics::passthrough());
        assert_eq!(out.forwarded, load);
    }
}
