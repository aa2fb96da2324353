//! Phone number normalization.
//!
//! Customers sign in with a phone number typed in whatever shape they are used
//! to. Everything is folded into E.164 (`+<digits>`) before it touches the
//! database or the login limiter, so `8 (912) 345-67-89`, `+7 912 345 67 89`
//! and `9123456789` all name the same account.

use crate::errors::ServiceError;
use thiserror::Error;

const NATIONAL_PREFIX: &str = "7";
const MIN_INTERNATIONAL_DIGITS: usize = 11;
const MAX_INTERNATIONAL_DIGITS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("phone number is empty")]
    Empty,
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("phone number has an unexpected number of digits ({0})")]
    InvalidLength(usize),
}

/// Normalizes a user supplied phone number to `+<country><subscriber>`.
///
/// Accepted shapes:
/// - `+` followed by 11 to 15 digits, kept as is;
/// - 10 national digits, prefixed with the default country code;
/// - 11 digits starting with `8` or `7`, the trunk prefix replaced by `+7`.
///
/// Spaces, dashes, dots and parentheses are ignored. The function is idempotent.
pub fn normalize_phone(raw: &str) -> Result<String, PhoneError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PhoneError::Empty);
    }

    let international = trimmed.starts_with('+');
    let body = if international { &trimmed[1..] } else { trimmed };

    let mut digits = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' | '.' => {}
            other => return Err(PhoneError::InvalidCharacter(other)),
        }
    }

    match (international, digits.len()) {
        (_, 0) => Err(PhoneError::Empty),
        (true, n) if (MIN_INTERNATIONAL_DIGITS..=MAX_INTERNATIONAL_DIGITS).contains(&n) => {
            Ok(format!("+{}", digits))
        }
        (false, 10) => Ok(format!("+{}{}", NATIONAL_PREFIX, digits)),
        (false, 11) if digits.starts_with('8') || digits.starts_with('7') => {
            Ok(format!("+{}{}", NATIONAL_PREFIX, &digits[1..]))
        }
        (_, n) => Err(PhoneError::InvalidLength(n)),
    }
}

impl From<PhoneError> for ServiceError {
    fn from(err: PhoneError) -> Self {
        ServiceError::BadRequest(format!("Invalid phone: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("8 (912) 345-67-89")]
    #[case("+7 912 345 67 89")]
    #[case("9123456789")]
    #[case("7-912-345-67-89")]
    #[case("+7(912)345.67.89")]
    fn common_formats_fold_to_one_number(#[case] raw: &str) {
        assert_eq!(normalize_phone(raw).unwrap(), "+79123456789");
    }

    #[test]
    fn international_numbers_are_kept() {
        assert_eq!(normalize_phone("+44 20 7946 0958").unwrap(), "+442079460958");
    }

    #[test]
    fn rejects_garbage() {
        assert_matches!(normalize_phone("   "), Err(PhoneError::Empty));
        assert_matches!(normalize_phone("+"), Err(PhoneError::Empty));
        assert_matches!(normalize_phone("912abc4567"), Err(PhoneError::InvalidCharacter('a')));
        assert_matches!(normalize_phone("12345"), Err(PhoneError::InvalidLength(5)));
        assert_matches!(normalize_phone("59123456789"), Err(PhoneError::InvalidLength(11)));
        assert_matches!(normalize_phone("+1234"), Err(PhoneError::InvalidLength(4)));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(digits in "[0-9]{10}") {
            let once = normalize_phone(&digits).unwrap();
            let twice = normalize_phone(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn trunk_prefix_and_plus_seven_agree(digits in "[0-9]{10}") {
            let with_trunk = normalize_phone(&format!("8{}", digits)).unwrap();
            let with_plus = normalize_phone(&format!("+7 {}", digits)).unwrap();
            let bare = normalize_phone(&digits).unwrap();
            prop_assert_eq!(&with_trunk, &with_plus);
            prop_assert_eq!(&with_trunk, &bare);
        }
    }
}
