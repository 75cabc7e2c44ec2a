//! Exact decimal integer parsing and formatting.
//!
//! Used by the JSON, configuration and command-line paths (e.g. Vim buffer numbers). Parsing is
//! strict: a non-empty run of ASCII digits, optionally preceded by `-` for signed types. No
//! whitespace, no `+`, no radix prefixes. A leading `0` is not special.

use thiserror::Error;

/// Why [`parse_integer_exact`] rejected its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseIntegerExactError {
    /// The input is a well-formed number which does not fit the target type.
    #[error("number out of range")]
    OutOfRange,
    /// The input is not a well-formed decimal number.
    #[error("invalid decimal number")]
    Invalid,
}

/// Integer types supported by the decimal codec.
pub trait DecimalInteger: Copy + Sized {
    /// Upper bound on the number of bytes [`write_integer`] writes for any value of this type.
    const STRING_LENGTH: usize;

    #[doc(hidden)]
    fn from_decimal_digits(
        negative: bool,
        digits: impl Iterator<Item = u8>,
    ) -> Result<Self, ParseIntegerExactError>;

    #[doc(hidden)]
    fn write_decimal(self, out: &mut [u8]) -> usize;
}

/// Number of decimal digits of `max`, computed at compile time.
const fn decimal_digit_count(mut max: u128) -> usize {
    let mut count = 1;
    while max >= 10 {
        max /= 10;
        count += 1;
    }
    count
}

macro_rules! impl_decimal_unsigned {
    ($($ty:ty),*) => {$(
        impl DecimalInteger for $ty {
            const STRING_LENGTH: usize = decimal_digit_count(<$ty>::MAX as u128);

            fn from_decimal_digits(
                negative: bool,
                digits: impl Iterator<Item = u8>,
            ) -> Result<Self, ParseIntegerExactError> {
                if negative {
                    return Err(ParseIntegerExactError::Invalid);
                }
                let mut value: $ty = 0;
                let mut out_of_range = false;
                for digit in digits {
                    match value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(<$ty>::from(digit)))
                    {
                        Some(v) if !out_of_range => value = v,
                        _ => out_of_range = true,
                    }
                }
                if out_of_range {
                    Err(ParseIntegerExactError::OutOfRange)
                } else {
                    Ok(value)
                }
            }

            fn write_decimal(self, out: &mut [u8]) -> usize {
                let mut scratch = [0u8; 40];
                let mut value = self;
                let mut i = scratch.len();
                loop {
                    i -= 1;
                    scratch[i] = b'0' + (value % 10) as u8;
                    value /= 10;
                    if value == 0 {
                        break;
                    }
                }
                let digits = &scratch[i..];
                out[..digits.len()].copy_from_slice(digits);
                digits.len()
            }
        }
    )*};
}

macro_rules! impl_decimal_signed {
    ($($ty:ty => $unsigned:ty),*) => {$(
        impl DecimalInteger for $ty {
            const STRING_LENGTH: usize = 1 + decimal_digit_count(<$ty>::MAX as u128);

            fn from_decimal_digits(
                negative: bool,
                digits: impl Iterator<Item = u8>,
            ) -> Result<Self, ParseIntegerExactError> {
                // Accumulate towards the sign so that MIN is representable.
                let mut value: $ty = 0;
                let mut out_of_range = false;
                for digit in digits {
                    let digit = <$ty>::from(digit as i8);
                    let next = value.checked_mul(10).and_then(|v| {
                        if negative {
                            v.checked_sub(digit)
                        } else {
                            v.checked_add(digit)
                        }
                    });
                    match next {
                        Some(v) if !out_of_range => value = v,
                        _ => out_of_range = true,
                    }
                }
                if out_of_range {
                    Err(ParseIntegerExactError::OutOfRange)
                } else {
                    Ok(value)
                }
            }

            fn write_decimal(self, out: &mut [u8]) -> usize {
                let magnitude: $unsigned = self.unsigned_abs();
                if self < 0 {
                    out[0] = b'-';
                    1 + magnitude.write_decimal(&mut out[1..])
                } else {
                    magnitude.write_decimal(out)
                }
            }
        }
    )*};
}

impl_decimal_unsigned!(u8, u16, u32, u64, usize);
impl_decimal_signed!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, isize => usize);

/// Upper bound on the decimal length (including a sign) of any value of `T`.
pub const fn integer_string_length<T: DecimalInteger>() -> usize {
    T::STRING_LENGTH
}

/// Write `value` in decimal into the start of `out` and return the number of bytes written.
///
/// # Panics
///
/// Panics if `out` is shorter than the value's representation. Buffers of
/// [`integer_string_length`] bytes are always large enough.
pub fn write_integer<T: DecimalInteger>(value: T, out: &mut [u8]) -> usize {
    value.write_decimal(out)
}

/// Parse all of `input` as a decimal integer of type `T`.
pub fn parse_integer_exact<T: DecimalInteger>(input: &str) -> Result<T, ParseIntegerExactError> {
    parse_digits(input.as_bytes().iter().map(|&b| u32::from(b)))
}

/// Like [`parse_integer_exact`], for UTF-16 input (e.g. Windows command lines).
pub fn parse_integer_exact_utf16<T: DecimalInteger>(
    input: &[u16],
) -> Result<T, ParseIntegerExactError> {
    parse_digits(input.iter().map(|&unit| u32::from(unit)))
}

fn parse_digits<T: DecimalInteger>(
    units: impl Iterator<Item = u32> + Clone,
) -> Result<T, ParseIntegerExactError> {
    let mut rest = units.clone().peekable();
    let negative = rest.peek() == Some(&u32::from(b'-'));
    if negative {
        rest.next();
    }
    let mut digits = rest.clone().peekable();
    if digits.peek().is_none() {
        return Err(ParseIntegerExactError::Invalid);
    }
    if !digits.all(|unit| (u32::from(b'0')..=u32::from(b'9')).contains(&unit)) {
        return Err(ParseIntegerExactError::Invalid);
    }
    T::from_decimal_digits(negative, rest.map(|unit| (unit - u32::from(b'0')) as u8))
}
