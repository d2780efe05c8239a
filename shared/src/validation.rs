//! Person identifier validation
//!
//! The national ID is an 11-digit number whose last two digits are mod-11
//! check digits over the preceding ones. Punctuation is ignored, so
//! `"529.982.247-25"` and `"52998224725"` are the same identifier.
//!
//! The secondary ID is a free-form alphanumeric document number. Separators
//! (`.`, `-`, `/`, whitespace) are dropped and letters uppercased before the
//! length window [`SECONDARY_ID_MIN_LEN`]..=[`SECONDARY_ID_MAX_LEN`] is applied.

use thiserror::Error;

pub const NATIONAL_ID_LEN: usize = 11;
pub const SECONDARY_ID_MIN_LEN: usize = 5;
pub const SECONDARY_ID_MAX_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NationalIdError {
    #[error("national ID must have {NATIONAL_ID_LEN} digits, got {0}")]
    Length(usize),
    #[error("national ID cannot repeat a single digit")]
    RepeatedDigits,
    #[error("national ID check digits do not match")]
    CheckDigits,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecondaryIdError {
    #[error(
        "secondary ID must have between {SECONDARY_ID_MIN_LEN} and {SECONDARY_ID_MAX_LEN} characters, got {0}"
    )]
    Length(usize),
    #[error("secondary ID contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Validate a national ID and return its 11-digit normalised form.
pub fn normalize_national_id(raw: &str) -> Result<String, NationalIdError> {
    let digits: Vec<u8> = national_id_digits(raw).bytes().map(|b| b - b'0').collect();

    if digits.len() != NATIONAL_ID_LEN {
        return Err(NationalIdError::Length(digits.len()));
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return Err(NationalIdError::RepeatedDigits);
    }
    if check_digit(&digits[..9]) != digits[9] || check_digit(&digits[..10]) != digits[10] {
        return Err(NationalIdError::CheckDigits);
    }

    Ok(digits.iter().map(|d| char::from(b'0' + d)).collect())
}

pub fn is_valid_national_id(raw: &str) -> bool {
    normalize_national_id(raw).is_ok()
}

/// Digits of `raw` with all punctuation removed; no checksum applied.
///
/// Used for lookups, where an invalid value simply matches nothing.
pub fn national_id_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Append both check digits to a 9-digit base.
pub fn complete_national_id(base: &str) -> Option<String> {
    let mut digits: Vec<u8> = national_id_digits(base).bytes().map(|b| b - b'0').collect();
    if digits.len() != 9 {
        return None;
    }
    digits.push(check_digit(&digits));
    digits.push(check_digit(&digits));
    Some(digits.iter().map(|d| char::from(b'0' + d)).collect())
}

/// Weighted sum with weights `len+1 ..= 2`, then `(sum * 10) mod 11`, 10 → 0.
fn check_digit(digits: &[u8]) -> u8 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| d as u32 * (top - i as u32))
        .sum();
    match (sum * 10) % 11 {
        10 => 0,
        r => r as u8,
    }
}

/// Validate a secondary ID.
///
/// Returns `Ok(None)` for blank input: blank and absent are the same thing.
pub fn normalize_secondary_id(raw: &str) -> Result<Option<String>, SecondaryIdError> {
    let cleaned = clean_secondary_id(raw);

    if cleaned.is_empty() {
        return Ok(None);
    }
    if let Some(bad) = cleaned.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(SecondaryIdError::InvalidCharacter(bad));
    }
    let len = cleaned.chars().count();
    if !(SECONDARY_ID_MIN_LEN..=SECONDARY_ID_MAX_LEN).contains(&len) {
        return Err(SecondaryIdError::Length(len));
    }
    Ok(Some(cleaned))
}

pub fn is_valid_secondary_id(raw: &str) -> bool {
    matches!(normalize_secondary_id(raw), Ok(Some(_)))
}

/// Separators removed and letters uppercased; no format check applied.
pub fn clean_secondary_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '.' | '-' | '/') && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    /// Textbook formulation: remainder r = sum mod 11, digit = 0 if r < 2 else 11 - r.
    fn expected_digit(digits: &[u8]) -> u8 {
        let top = digits.len() as u32 + 1;
        let sum: u32 = digits
            .iter()
            .zip((2..=top).rev())
            .map(|(&d, w)| d as u32 * w)
            .sum();
        let r = sum % 11;
        if r < 2 { 0 } else { (11 - r) as u8 }
    }

    fn expected_valid(digits: &[u8; 11]) -> bool {
        !digits.iter().all(|&d| d == digits[0])
            && expected_digit(&digits[..9]) == digits[9]
            && expected_digit(&digits[..10]) == digits[10]
    }

    fn render(digits: &[u8]) -> String {
        digits.iter().map(|d| char::from(b'0' + d)).collect()
    }

    #[test]
    fn test_known_national_ids() {
        assert_eq!(normalize_national_id("529.982.247-25").unwrap(), "52998224725");
        assert_eq!(normalize_national_id("52998224725").unwrap(), "52998224725");
        assert!(is_valid_national_id("111.444.777-35"));
        assert!(!is_valid_national_id("529.982.247-26"));
        assert!(!is_valid_national_id("111.444.777-53"));
    }

    #[test]
    fn test_national_id_length() {
        assert_eq!(normalize_national_id(""), Err(NationalIdError::Length(0)));
        assert_eq!(
            normalize_national_id("5299822472"),
            Err(NationalIdError::Length(10))
        );
        assert_eq!(
            normalize_national_id("529982247250"),
            Err(NationalIdError::Length(12))
        );
    }

    #[test]
    fn test_repeated_digits_always_invalid() {
        for d in 0..=9u8 {
            let id = render(&[d; 11]);
            assert_eq!(
                normalize_national_id(&id),
                Err(NationalIdError::RepeatedDigits),
                "{id}"
            );
        }
        assert!(!is_valid_national_id("111.111.111-11"));
    }

    #[test]
    fn test_random_national_ids_match_formula() {
        let mut rng = rand::thread_rng();
        let mut accepted = 0;
        for _ in 0..10_000 {
            let mut digits = [0u8; 11];
            for d in digits.iter_mut() {
                *d = rng.gen_range(0..10);
            }
            let id = render(&digits);
            let expected = expected_valid(&digits);
            assert_eq!(is_valid_national_id(&id), expected, "{id}");
            if expected {
                accepted += 1;
            }
        }
        // Roughly 1 in 100 random sequences is valid
        assert!(accepted < 1_000);
    }

    #[test]
    fn test_generated_valid_national_ids_accepted() {
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let mut digits = [0u8; 11];
            for d in digits.iter_mut().take(9) {
                *d = rng.gen_range(0..10);
            }
            digits[9] = expected_digit(&digits[..9]);
            digits[10] = expected_digit(&digits[..10]);
            let id = render(&digits);
            assert_eq!(is_valid_national_id(&id), expected_valid(&digits), "{id}");
        }
    }

    #[test]
    fn test_complete_national_id() {
        assert_eq!(complete_national_id("529982247").unwrap(), "52998224725");
        assert_eq!(complete_national_id("111.444.777").unwrap(), "11144477735");
        assert_eq!(complete_national_id("12345"), None);
        assert_eq!(national_id_digits("529.982.247-25"), "52998224725");
    }

    #[test]
    fn test_secondary_id_normalisation() {
        assert_eq!(
            normalize_secondary_id("12.345.678-x").unwrap(),
            Some("12345678X".to_string())
        );
        assert_eq!(
            normalize_secondary_id(" mg 12/345 ").unwrap(),
            Some("MG12345".to_string())
        );
    }

    #[test]
    fn test_secondary_id_blank_is_absent() {
        assert_eq!(normalize_secondary_id(""), Ok(None));
        assert_eq!(normalize_secondary_id("   "), Ok(None));
        assert_eq!(normalize_secondary_id(".-/"), Ok(None));
        assert!(!is_valid_secondary_id(""));
    }

    #[test]
    fn test_secondary_id_rejections() {
        assert_eq!(
            normalize_secondary_id("1234"),
            Err(SecondaryIdError::Length(4))
        );
        assert_eq!(
            normalize_secondary_id(&"9".repeat(21)),
            Err(SecondaryIdError::Length(21))
        );
        assert_eq!(
            normalize_secondary_id("12345_6"),
            Err(SecondaryIdError::InvalidCharacter('_'))
        );
        assert!(is_valid_secondary_id(&"9".repeat(20)));
    }
}
