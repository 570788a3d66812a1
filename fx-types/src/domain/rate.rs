//! USD-relative rate tables and rate rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

use super::currency::CurrencyCode;

/// Number of decimal places every persisted rate is rounded to.
pub const RATE_SCALE: u32 = 6;

/// Units of each currency per 1 USD.
///
/// Entries may be zero or negative when the upstream source reports them so;
/// such entries are treated as unresolved when read.
pub type RateTable = HashMap<CurrencyCode, Decimal>;

/// Rounds to `scale` decimal places, with halves rounded away from zero.
pub fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to [`RATE_SCALE`].
pub fn round_rate(value: Decimal) -> Decimal {
    round_half_up(value, RATE_SCALE)
}
