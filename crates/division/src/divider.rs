use thiserror::Error;
use tracing::{debug, trace};

use crate::cycle::{CycleDetected, CycleDetector, CycleMode};
use crate::expansion::Expansion;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DivisionError {
    #[error("Division by zero. numerator: {numerator}")]
    DivisionByZero { numerator: i64 },

    #[error("Expansion does not terminate. repeats from digit: {start}, detected at digit: {position}")]
    Repeating { start: usize, position: usize },
}

impl From<CycleDetected> for DivisionError {
    fn from(value: CycleDetected) -> Self {
        DivisionError::Repeating {
            start: value.start,
            position: value.position,
        }
    }
}

/// Converts integer fractions into decimal [`Expansion`]s by long division.
#[derive(Debug, Clone, Copy, Default)]
pub struct Divider {
    mode: CycleMode,
}

impl Divider {
    /// A divider that describes repeating expansions with a parenthesized group.
    pub fn new() -> Self {
        Self::default()
    }

    /// With [`CycleMode::Fail`], any non-terminating expansion is an error.
    pub fn with_cycle_mode(mode: CycleMode) -> Self {
        Self {
            mode,
        }
    }

    pub fn cycle_mode(&self) -> CycleMode {
        self.mode
    }

    pub fn divide(&self, numerator: i64, denominator: i64) -> Result<Expansion, DivisionError> {
        if denominator == 0 {
            return Err(DivisionError::DivisionByZero {
                numerator,
            });
        }

        // zero has no sign
        let negative = numerator != 0 && (numerator < 0) != (denominator < 0);

        // u128 so that `remainder * 10` cannot overflow, even for i64::MIN
        let dividend = u128::from(numerator.unsigned_abs());
        let divisor = u128::from(denominator.unsigned_abs());

        // |i64| / |i64| with a non-zero divisor always fits in a u64
        let integer_part = (dividend / divisor) as u64;
        let mut remainder = dividend % divisor;

        if remainder == 0 {
            return Ok(Expansion::new(negative, integer_part, Vec::new(), None));
        }

        let mut detector = CycleDetector::new(self.mode);
        let mut digits: Vec<u8> = Vec::new();

        while remainder != 0 {
            if let Some(cycle) = detector.observe(remainder, digits.len())? {
                debug!(
                    "Repeating expansion. numerator: {}, denominator: {}, start: {}, length: {}",
                    numerator, denominator, cycle.start, cycle.length
                );
                return Ok(Expansion::new(negative, integer_part, digits, Some(cycle.start)));
            }

            let scaled = remainder * 10;
            let digit = (scaled / divisor) as u8;
            remainder = scaled % divisor;
            trace!("Long division step. digit: {}, remainder: {}", digit, remainder);

            digits.push(digit);
        }

        Ok(Expansion::new(negative, integer_part, digits, None))
    }
}

/// Divides `numerator` by `denominator`, rendering the result in repeating-decimal notation.
pub fn divide(numerator: i64, denominator: i64) -> Result<String, DivisionError> {
    Divider::new()
        .divide(numerator, denominator)
        .map(|expansion| expansion.to_string())
}
