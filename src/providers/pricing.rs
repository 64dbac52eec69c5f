//! Per-provider token pricing.

use crate::types::TokenUsage;

/// USD per million tokens, input and output priced separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

/// Claude Sonnet class models.
pub const ANTHROPIC: Pricing = Pricing {
    input_per_million: 3.0,
    output_per_million: 15.0,
};

/// GPT-4o mini.
pub const OPENAI: Pricing = Pricing {
    input_per_million: 0.15,
    output_per_million: 0.60,
};

impl Pricing {
    /// Estimated cost of one call in USD.
    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        (f64::from(usage.input_tokens) * self.input_per_million
            + f64::from(usage.output_tokens) * self.output_per_million)
            / 1_000_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_input_and_output_separately() {
        let usage = TokenUsage::new(1_000_000, 0);
        assert_eq!(ANTHROPIC.cost(&usage), 3.0);
        let usage = TokenUsage::new(0, 1_000_000);
        assert_eq!(ANTHROPIC.cost(&usage), 15.0);
    }

    #[test]
    fn small_calls_cost_fractions_of_a_cent() {
        let cost = OPENAI.cost(&TokenUsage::new(500, 1500));
        assert!((cost - 0.000_975).abs() < 1e-12);
    }
}
