//! Pure cost computation over a static model-pricing table.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Per-million-token USD pricing for one model.
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    /// USD per million input tokens.
    pub input_per_million: Decimal,
    /// USD per million output tokens.
    pub output_per_million: Decimal,
    /// USD per million cache-read tokens (typically a fraction of input price).
    pub cache_read_per_million: Decimal,
    /// USD per million cache-write tokens (typically a premium over input price).
    pub cache_write_per_million: Decimal,
}

fn pricing_table() -> &'static HashMap<&'static str, ModelPricing> {
    static TABLE: OnceLock<HashMap<&'static str, ModelPricing>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m = HashMap::new();
        m.insert(
            "fast-cheap",
            ModelPricing {
                input_per_million: Decimal::new(80, 2),
                output_per_million: Decimal::new(400, 2),
                cache_read_per_million: Decimal::new(8, 2),
                cache_write_per_million: Decimal::new(100, 2),
            },
        );
        m.insert(
            "mid-reasoning",
            ModelPricing {
                input_per_million: Decimal::new(300, 2),
                output_per_million: Decimal::new(1500, 2),
                cache_read_per_million: Decimal::new(30, 2),
                cache_write_per_million: Decimal::new(375, 2),
            },
        );
        m.insert(
            "frontier",
            ModelPricing {
                input_per_million: Decimal::new(1500, 2),
                output_per_million: Decimal::new(7500, 2),
                cache_read_per_million: Decimal::new(150, 2),
                cache_write_per_million: Decimal::new(1875, 2),
            },
        );
        m
    })
}

/// USD cost for one LLM call. Unknown models fall back to `mid-reasoning`
/// pricing rather than panicking — this function must never fail, since it
/// runs on the telemetry hot path where the provider's model id is
/// whatever configuration says it is.
pub fn cost(
    model: &str,
    input_tokens: u64,
    output_tokens: u64,
    cache_read_tokens: u64,
    cache_write_tokens: u64,
) -> Decimal {
    let pricing = pricing_table()
        .get(model)
        .copied()
        .unwrap_or_else(|| pricing_table()["mid-reasoning"]);
    let per_million = |tokens: u64, rate: Decimal| Decimal::from(tokens) * rate / Decimal::from(1_000_000u32);
    per_million(input_tokens, pricing.input_per_million)
        + per_million(output_tokens, pricing.output_per_million)
        + per_million(cache_read_tokens, pricing.cache_read_per_million)
        + per_million(cache_write_tokens, pricing.cache_write_per_million)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tokens_cost_nothing() {
        assert_eq!(cost("fast-cheap", 0, 0, 0, 0), Decimal::ZERO);
    }

    #[test]
    fn unknown_model_falls_back_to_mid_reasoning() {
        assert_eq!(
            cost("some-unreleased-model", 1_000_000, 0, 0, 0),
            cost("mid-reasoning", 1_000_000, 0, 0, 0)
        );
    }

    #[test]
    fn cost_scales_linearly_with_tokens() {
        let one = cost("fast-cheap", 1_000_000, 0, 0, 0);
        let two = cost("fast-cheap", 2_000_000, 0, 0, 0);
        assert_eq!(two, one * Decimal::from(2));
    }
}
