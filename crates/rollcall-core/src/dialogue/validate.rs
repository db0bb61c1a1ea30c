//! Field validators for the registration dialogue.
//!
//! Pure, total functions. Invalid input yields `None`; the state machine
//! turns that into a re-prompt.

/// Minimum accepted age, inclusive.
pub const MIN_AGE: u32 = 1;
/// Maximum accepted age, inclusive.
pub const MAX_AGE: u32 = 120;

/// Validate a name: any non-empty string after trimming.
pub fn validate_name(text: &str) -> Option<String> {
    let name = text.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Validate an age: a base-10 integer in [MIN_AGE, MAX_AGE].
pub fn validate_age(text: &str) -> Option<u32> {
    let age: u32 = text.trim().parse().ok()?;
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        Some(age)
    } else {
        None
    }
}

/// Validate a grade/class label: any non-empty string after trimming.
pub fn validate_grade(text: &str) -> Option<String> {
    let grade = text.trim();
    if grade.is_empty() {
        None
    } else {
        Some(grade.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts_trimmed() {
        assert_eq!(validate_name("  Ann  "), Some("Ann".to_string()));
        assert_eq!(validate_name("Ann"), Some("Ann".to_string()));
    }

    #[test]
    fn test_validate_name_rejects_empty_and_whitespace() {
        assert_eq!(validate_name(""), None);
        assert_eq!(validate_name("   "), None);
        assert_eq!(validate_name("\t\n"), None);
    }

    #[test]
    fn test_validate_age_bounds() {
        assert_eq!(validate_age("1"), Some(1));
        assert_eq!(validate_age("120"), Some(120));
        assert_eq!(validate_age("0"), None);
        assert_eq!(validate_age("121"), None);
    }

    #[test]
    fn test_validate_age_rejects_non_integers() {
        assert_eq!(validate_age("-5"), None);
        assert_eq!(validate_age(""), None);
        assert_eq!(validate_age("5.5"), None);
        assert_eq!(validate_age("abc"), None);
    }

    #[test]
    fn test_validate_age_trims_input() {
        assert_eq!(validate_age(" 10 "), Some(10));
    }

    #[test]
    fn test_validate_grade() {
        assert_eq!(validate_grade(" 4B "), Some("4B".to_string()));
        assert_eq!(validate_grade("5"), Some("5".to_string()));
        assert_eq!(validate_grade("  "), None);
    }
}
