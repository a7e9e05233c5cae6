//! Token usage and cost tracking types.

use serde::{Deserialize, Serialize};

/// Token usage for a generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Merge another usage into this one (accumulate).
    pub fn merge(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Estimated cost for a generation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Cost {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    pub currency: String,
}

impl Cost {
    /// Compute cost from usage and per-million-token pricing.
    pub fn from_usage(usage: &Usage, input_price_per_m: f64, output_price_per_m: f64) -> Self {
        let input_cost = (usage.input_tokens as f64 / 1_000_000.0) * input_price_per_m;
        let output_cost = (usage.output_tokens as f64 / 1_000_000.0) * output_price_per_m;
        Self {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
            currency: "USD".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_accumulates() {
        let mut total = Usage::default();
        total.merge(&Usage { input_tokens: 10, output_tokens: 5, total_tokens: 15 });
        total.merge(&Usage { input_tokens: 1, output_tokens: 2, total_tokens: 3 });
        assert_eq!(total, Usage { input_tokens: 11, output_tokens: 7, total_tokens: 18 });
    }

    #[test]
    fn cost_from_usage_uses_per_million_prices() {
        let usage = Usage { input_tokens: 1_000_000, output_tokens: 500_000, total_tokens: 1_500_000 };
        let cost = Cost::from_usage(&usage, 30.0, 60.0);
        assert!((cost.input_cost - 30.0).abs() < 1e-9);
        assert!((cost.output_cost - 30.0).abs() < 1e-9);
        assert!((cost.total_cost - 60.0).abs() < 1e-9);
    }
}
