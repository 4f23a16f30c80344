//! Decimal-string amounts and fixed-point formatting.
//!
//! Amounts entered by the user are converted once into 18-decimal base units
//! and never touched again; everything shown back is formatted from integers.

use alloy_primitives::U256;
use dex_api_types::{RecordedAmount, ReserveSnapshot, TokenSide};
use thiserror::Error;

pub const TOKEN_DECIMALS: u8 = 18;
pub const RATE_DECIMALS: usize = 6;
pub const ZERO_RATE: &str = "0.000000";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("`{0}` is not a decimal number")]
    NotNumeric(String),
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("at most {TOKEN_DECIMALS} fractional digits are supported")]
    TooManyDecimals,
    #[error("amount is too large")]
    Overflow,
}

/// A validated, positive amount in base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedAmount {
    input: String,
    base_units: U256,
}

impl FixedAmount {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn base_units(&self) -> U256 {
        self.base_units
    }

    pub fn recorded(&self, token: TokenSide) -> RecordedAmount {
        RecordedAmount {
            token,
            input: self.input.clone(),
            base_units: self.base_units,
        }
    }
}

/// Parses user input like `"1.5"` into `1.5 * 10^18`.
pub fn parse_amount(raw: &str) -> Result<FixedAmount, AmountError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    if input.starts_with('-') {
        // "-0" is not positive either
        return match parse_amount(&input[1..]) {
            Err(AmountError::NotNumeric(_)) | Err(AmountError::Empty) => {
                Err(AmountError::NotNumeric(input.to_owned()))
            }
            _ => Err(AmountError::NotPositive),
        };
    }

    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(AmountError::NotNumeric(input.to_owned()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > TOKEN_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals);
    }

    let mut digits = String::with_capacity(whole.len() + TOKEN_DECIMALS as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    for _ in fraction.len()..TOKEN_DECIMALS as usize {
        digits.push('0');
    }
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Err(AmountError::NotPositive);
    }

    let base_units = U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow)?;
    Ok(FixedAmount {
        input: input.to_owned(),
        base_units,
    })
}

/// Formats base units with `decimals` fractional digits, trimming trailing
/// zeros but keeping at least one (`"1.0"`, `"0.25"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let decimals = decimals as usize;
    let mut digits = value.to_string();
    if digits.len() <= decimals {
        let padding = decimals + 1 - digits.len();
        digits.insert_str(0, &"0".repeat(padding));
    }

    let split = digits.len() - decimals;
    let whole = &digits[..split];
    let fraction = digits[split..].trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

/// `numerator / denominator` with six decimals, rounded half-up.
/// `None` when the scaled numerator does not fit in 256 bits.
fn ratio(numerator: U256, denominator: U256) -> Option<String> {
    let scale = U256::from(10u64).pow(U256::from(RATE_DECIMALS as u64 + 1));
    let scaled = numerator.checked_mul(scale)? / denominator;
    let rounded = (scaled + U256::from(5u64)) / U256::from(10u64);

    let unit = U256::from(10u64).pow(U256::from(RATE_DECIMALS as u64));
    let whole = rounded / unit;
    let fraction = (rounded % unit).as_limbs()[0];
    Some(format!("{whole}.{fraction:0width$}", width = RATE_DECIMALS))
}

/// Returns `(a_to_b, b_to_a)`. Either reserve at zero yields `"0.000000"` for both.
pub fn exchange_rates(reserves: &ReserveSnapshot) -> Option<(String, String)> {
    if reserves.has_zero_side() {
        return Some((ZERO_RATE.to_owned(), ZERO_RATE.to_owned()));
    }
    let a_to_b = ratio(reserves.reserve_b, reserves.reserve_a)?;
    let b_to_a = ratio(reserves.reserve_a, reserves.reserve_b)?;
    Some((a_to_b, b_to_a))
}
