use crate::error::ValidationError;
use ethers::types::{Address, U256};

/// Fractional digits kept when a total is divided across recipients.
pub const DIVIDE_DECIMALS: u32 = 6;

/// Decimals of the native currency (wei scale).
pub const NATIVE_DECIMALS: u32 = 18;

pub fn format_ether(wei: U256) -> String {
    ethers::utils::format_units(wei, "ether").unwrap_or_else(|_| "0.0".to_string())
}

/// Format wei as a decimal string without trailing zeros ("10", "2.5").
pub fn format_amount_trimmed(wei: U256) -> String {
    let full = format_ether(wei);
    if !full.contains('.') {
        return full;
    }
    let trimmed = full.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format wei with exactly `decimals` fractional digits, truncating the rest.
pub fn format_amount_fixed(wei: U256, decimals: usize) -> String {
    let full = format_ether(wei);
    match full.split_once('.') {
        Some((whole, frac)) => {
            if decimals == 0 {
                return whole.to_string();
            }
            let mut frac: String = frac.chars().take(decimals).collect();
            while frac.len() < decimals {
                frac.push('0');
            }
            format!("{}.{}", whole, frac)
        }
        None if decimals == 0 => full,
        None => format!("{}.{}", full, "0".repeat(decimals)),
    }
}

/// Human-scaled value of a smallest-unit amount. Lossy; display only.
pub fn wei_to_display_value(wei: U256) -> f64 {
    format_ether(wei).parse().unwrap_or(0.0)
}

/// Parse a user-entered native amount to wei.
///
/// Scaling uses checked arithmetic, so amounts beyond `U256` are rejected
/// rather than wrapped. Zero and negative values are reported separately
/// from malformed input.
pub fn parse_amount(input: &str) -> Result<U256, ValidationError> {
    let trimmed = input.trim();
    let invalid = || ValidationError::InvalidAmount(trimmed.to_string());

    let as_float: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !as_float.is_finite() {
        return Err(invalid());
    }
    if as_float <= 0.0 {
        return Err(ValidationError::NonPositiveAmount);
    }

    let wei = decimal_to_wei(trimmed.strip_prefix('+').unwrap_or(trimmed)).ok_or_else(invalid)?;
    if wei.is_zero() {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(wei)
}

/// Plain decimal ("12", "0.5", ".5") to wei. `None` for exponents, more than
/// 18 fractional digits, or a value that does not fit in `U256`.
fn decimal_to_wei(text: &str) -> Option<U256> {
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > NATIVE_DECIMALS as usize {
        return None;
    }

    let whole = if whole.is_empty() { U256::zero() } else { U256::from_dec_str(whole).ok()? };
    let frac = if frac.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(frac).ok()? * U256::exp10(NATIVE_DECIMALS as usize - frac.len())
    };

    whole
        .checked_mul(U256::exp10(NATIVE_DECIMALS as usize))?
        .checked_add(frac)
}

/// Divide `total` by `count`, rounding half-up to `decimals` fractional
/// digits of the native unit. Returns zero when `count` is zero.
pub fn divide_rounded(total: U256, count: usize, decimals: u32) -> U256 {
    if count == 0 {
        return U256::zero();
    }
    let unit = U256::exp10((NATIVE_DECIMALS - decimals.min(NATIVE_DECIMALS)) as usize);
    let divisor = unit * U256::from(count);
    let quotient = total / divisor;
    let remainder = total % divisor;
    let rounded = if remainder * U256::from(2u8) >= divisor {
        quotient + U256::one()
    } else {
        quotient
    };
    rounded * unit
}

/// Address format check: `0x` prefix, 40 hex digits, and a valid EIP-55
/// checksum when the hex part mixes cases.
pub fn is_valid_address_format(input: &str) -> bool {
    let Some(hex_part) = input.strip_prefix("0x") else {
        return false;
    };
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    match input.parse::<Address>() {
        Ok(address) => ethers::utils::to_checksum(&address, None) == input,
        Err(_) => false,
    }
}

/// Parse an address that already passed `is_valid_address_format`.
pub fn parse_address(input: &str) -> Result<Address, ValidationError> {
    if !is_valid_address_format(input) {
        return Err(ValidationError::InvalidAddress(input.to_string()));
    }
    input
        .parse()
        .map_err(|_| ValidationError::InvalidAddress(input.to_string()))
}
