use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;
use num_rational::Ratio;
use num_traits::checked_pow;
use thiserror::Error;

/// The decimal expansion of a rational number.
///
/// Renders as `[-]<integer>[.<digits>]`, with the repeating tail of the digits, if any,
/// wrapped in parentheses: `0.1(6)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    negative: bool,
    integer_part: u64,
    digits: Vec<u8>,
    repeat_start: Option<usize>,
}

impl Expansion {
    pub(crate) fn new(negative: bool, integer_part: u64, digits: Vec<u8>, repeat_start: Option<usize>) -> Self {
        debug_assert!(repeat_start.map_or(true, |start| start < digits.len()));
        Self {
            negative,
            integer_part,
            digits,
            repeat_start,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn integer_part(&self) -> u64 {
        self.integer_part
    }

    /// All fractional digits, in order, including the repeating ones.
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Index into [`Self::digits`] at which the repeating group begins.
    pub fn repeat_start(&self) -> Option<usize> {
        self.repeat_start
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat_start.is_some()
    }

    pub fn non_repeating(&self) -> &[u8] {
        &self.digits[..self.repeat_start.unwrap_or(self.digits.len())]
    }

    pub fn repeating(&self) -> &[u8] {
        &self.digits[self.repeat_start.unwrap_or(self.digits.len())..]
    }

    /// The exact rational value of this expansion.
    ///
    /// Returns `None` if the numerator or denominator would overflow an `i128`, which
    /// happens for long repeating groups.
    pub fn to_ratio(&self) -> Option<Ratio<i128>> {
        let integer = i128::from(self.integer_part);
        let prefix = self.non_repeating();
        let repeating = self.repeating();

        let prefix_scale = checked_pow(10_i128, prefix.len())?;
        let prefix_value = digits_value(prefix)?;

        let (numerator, denominator) = if repeating.is_empty() {
            let numerator = integer
                .checked_mul(prefix_scale)?
                .checked_add(prefix_value)?;
            (numerator, prefix_scale)
        } else {
            // 0.(r) == r / (10^len(r) - 1)
            let nines = checked_pow(10_i128, repeating.len())? - 1;
            let repeating_value = digits_value(repeating)?;
            let denominator = prefix_scale.checked_mul(nines)?;
            let numerator = integer
                .checked_mul(denominator)?
                .checked_add(prefix_value.checked_mul(nines)?)?
                .checked_add(repeating_value)?;
            (numerator, denominator)
        };

        let numerator = if self.negative { -numerator } else { numerator };
        Some(Ratio::new(numerator, denominator))
    }
}

fn digits_value(digits: &[u8]) -> Option<i128> {
    digits
        .iter()
        .try_fold(0_i128, |acc, &digit| acc.checked_mul(10)?.checked_add(i128::from(digit)))
}

impl Display for Expansion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(f, "{}", self.integer_part)?;

        if self.digits.is_empty() {
            return Ok(());
        }

        write!(f, ".{}", self.non_repeating().iter().join(""))?;
        if self.is_repeating() {
            write!(f, "({})", self.repeating().iter().join(""))?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid expansion. input: '{input}', reason: {reason}")]
pub struct ParseExpansionError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for Expansion {
    type Err = ParseExpansionError;

    /// Parses the notation produced by [`Display`], e.g. `-1.(6)`, `0.25` or `3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |reason| ParseExpansionError {
            input: s.to_string(),
            reason,
        };

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (integer_str, fraction) = match unsigned.split_once('.') {
            Some((integer_str, fraction)) => (integer_str, Some(fraction)),
            None => (unsigned, None),
        };

        if integer_str.is_empty() {
            return Err(error("missing integer part"));
        }
        let integer_part = parse_digits(integer_str)
            .ok_or_else(|| error("integer part must contain only digits"))?
            .iter()
            .try_fold(0_u64, |acc, &digit| acc.checked_mul(10)?.checked_add(u64::from(digit)))
            .ok_or_else(|| error("integer part is too large"))?;

        let Some(fraction) = fraction else {
            return Ok(Expansion::new(negative, integer_part, Vec::new(), None));
        };

        let (prefix_str, repeating_str) = match fraction.split_once('(') {
            Some((prefix_str, rest)) => {
                let repeating_str = rest
                    .strip_suffix(')')
                    .ok_or_else(|| error("repeating group must end with ')'"))?;
                if repeating_str.is_empty() {
                    return Err(error("repeating group is empty"));
                }
                (prefix_str, Some(repeating_str))
            }
            None => (fraction, None),
        };

        let mut digits = parse_digits(prefix_str).ok_or_else(|| error("fraction must contain only digits"))?;
        let repeat_start = match repeating_str {
            Some(repeating_str) => {
                let start = digits.len();
                digits.extend(
                    parse_digits(repeating_str).ok_or_else(|| error("repeating group must contain only digits"))?,
                );
                Some(start)
            }
            None => None,
        };

        if digits.is_empty() {
            return Err(error("missing fraction digits after '.'"));
        }

        Ok(Expansion::new(negative, integer_part, digits, repeat_start))
    }
}

fn parse_digits(s: &str) -> Option<Vec<u8>> {
    s.chars()
        .map(|c| c.to_digit(10).map(|digit| digit as u8))
        .collect()
}
