//! Token amount scaling.
//!
//! Operators supply dollar-denominated amounts in whole tokens; the ledger
//! works in the token's smallest unit. Conversion is `whole * 10^decimals`
//! with checked arithmetic, and overflow is rejected before anything touches
//! the network.

use crate::error::{CliError, CliResult};

/// Scale a whole-token amount into the smallest unit.
pub fn scale_amount(whole: u64, decimals: u8) -> CliResult<u64> {
    let factor = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or_else(|| scale_error(whole, decimals))?;
    whole
        .checked_mul(factor)
        .ok_or_else(|| scale_error(whole, decimals))
}

fn scale_error(whole: u64, decimals: u8) -> CliError {
    CliError::InvalidArgument(format!(
        "Amount {} with {} decimals overflows the 64-bit base unit range",
        whole, decimals
    ))
}

/// Render a base-unit amount back in whole tokens for operator display.
pub fn format_amount(base_units: u64, decimals: u8) -> String {
    let factor = 10u128.pow(u32::from(decimals));
    let value = u128::from(base_units);
    let whole = value / factor;
    let frac = value % factor;
    if frac == 0 {
        whole.to_string()
    } else {
        let rendered = format!("{:0width$}", frac, width = decimals as usize);
        format!("{}.{}", whole, rendered.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_amount_exact() {
        assert_eq!(scale_amount(5, 6).unwrap(), 5_000_000);
        assert_eq!(scale_amount(0, 6).unwrap(), 0);
        assert_eq!(scale_amount(1, 0).unwrap(), 1);
    }

    #[test]
    fn test_scale_amount_overflow_rejected() {
        assert!(scale_amount(u64::MAX, 1).is_err());
        assert!(scale_amount(1, 20).is_err());
    }

    #[test]
    fn test_scale_round_trips_through_format() {
        let base = scale_amount(1_250, 6).unwrap();
        assert_eq!(base, 1_250_000_000);
        assert_eq!(format_amount(base, 6), "1250");
    }

    #[test]
    fn test_format_amount_fractional() {
        assert_eq!(format_amount(1_500_000, 6), "1.5");
        assert_eq!(format_amount(42, 6), "0.000042");
        assert_eq!(format_amount(7, 0), "7");
    }
}
