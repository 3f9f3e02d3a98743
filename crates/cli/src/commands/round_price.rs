use std::str::FromStr;

use glassquote_core::pricing::round_price;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_INVALID_INPUT};

#[derive(Debug, Serialize)]
struct RoundedPrice {
    input: Decimal,
    rounded: Decimal,
}

pub fn run(raw: &str) -> CommandResult {
    let input = match Decimal::from_str(raw.trim()) {
        Ok(value) => value,
        Err(error) => {
            return CommandResult::failure(
                "round-price",
                "invalid_input",
                format!("`{raw}` is not a price: {error}"),
                EXIT_INVALID_INPUT,
            )
        }
    };

    let rounded = round_price(input);
    CommandResult::success_with(
        "round-price",
        format!("{input} -> {rounded}"),
        Some(RoundedPrice { input, rounded }),
    )
}
