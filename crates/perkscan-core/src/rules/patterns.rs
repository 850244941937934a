//! Regex patterns for offer field extraction.
//!
//! Built from two token fragments: a money amount (currency symbol,
//! optional comma-grouped thousands, optional fraction) and a percent
//! (decimal number before a percent sign). Capture group 1 of each
//! fragment is the numeric text.

use lazy_static::lazy_static;
use regex::Regex;

/// Money token: `£1,200.50` captures `1,200.50`.
pub const MONEY: &str = r"£\s*([0-9]+(?:,[0-9]{3})*(?:\.[0-9]+)?)";

/// Percent token: `9.5 %` captures `9.5`.
pub const PERCENT: &str = r"([0-9]+(?:\.[0-9]+)?)\s*%";

lazy_static! {
    /// "spend £X or more ... get £Y back". The span between the two
    /// money mentions is non-greedy so the match binds to the nearest
    /// qualifying pair when more amounts appear later in the text.
    pub static ref SPEND_THRESHOLD: Regex =
        Regex::new(&format!(r"(?i)spend\s*{MONEY}.*?get\s*{MONEY}\s*back")).unwrap();

    /// "get X% back ... up to £Y".
    pub static ref CAPPED_PERCENTAGE: Regex =
        Regex::new(&format!(r"(?i)get\s*{PERCENT}\s*back.*?up\s*to\s*{MONEY}")).unwrap();

    /// "save X%" (common on gift card screens).
    pub static ref SAVE_PERCENTAGE: Regex =
        Regex::new(&format!(r"(?i)save\s*{PERCENT}")).unwrap();

    /// Any percent mention ("10% off", "get 5% back").
    pub static ref GENERIC_PERCENTAGE: Regex = Regex::new(PERCENT).unwrap();

    /// "get £X back" without a spend threshold.
    pub static ref CASHBACK_AMOUNT: Regex =
        Regex::new(&format!(r"(?i)get\s*{MONEY}\s*back")).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_token_handles_thousands_and_fraction() {
        let re = Regex::new(MONEY).unwrap();
        let caps = re.captures("£1,200.50 cashback").unwrap();
        assert_eq!(&caps[1], "1,200.50");

        let caps = re.captures("£ 10").unwrap();
        assert_eq!(&caps[1], "10");
    }

    #[test]
    fn percent_token_allows_whitespace_before_sign() {
        let re = Regex::new(PERCENT).unwrap();
        assert_eq!(&re.captures("9.5 %").unwrap()[1], "9.5");
        assert_eq!(&re.captures("20%").unwrap()[1], "20");
    }

    #[test]
    fn spend_threshold_binds_to_nearest_pair() {
        let caps = SPEND_THRESHOLD
            .captures("spend £100 or more, get £10 back. later: get £999 back")
            .unwrap();
        assert_eq!(&caps[1], "100");
        assert_eq!(&caps[2], "10");
    }
}
