//! Per-model token pricing, USD per token.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// (input, output) price per token for known models. Unknown models cost zero.
pub fn model_cost(model: &str) -> (Decimal, Decimal) {
    match model {
        "deepseek-chat" => (dec!(0.00000027), dec!(0.0000011)),
        "deepseek-reasoner" => (dec!(0.00000055), dec!(0.00000219)),
        "gpt-4o-mini" => (dec!(0.00000015), dec!(0.0000006)),
        "gpt-4o" => (dec!(0.0000025), dec!(0.00001)),
        _ => (Decimal::ZERO, Decimal::ZERO),
    }
}

/// Estimated cost of one call.
pub fn estimate(cost_per_token: (Decimal, Decimal), input_tokens: u32, output_tokens: u32) -> Decimal {
    let (input, output) = cost_per_token;
    input * Decimal::from(input_tokens) + output * Decimal::from(output_tokens)
}
