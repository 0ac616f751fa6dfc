// Client-side form validation: password policy, age-of-majority check, and
// bet completeness. A request is never sent when any of these fail.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

/// Minimum password length at registration.
pub const MIN_PASSWORD_LEN_REGISTER: usize = 6;
/// Minimum password length when changing an existing password.
pub const MIN_PASSWORD_LEN_CHANGE: usize = 8;
/// Minimum age to place bets.
pub const MIN_AGE: u32 = 18;

static HAS_LOWER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]").unwrap());
static HAS_UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]").unwrap());
static HAS_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in every field.")]
    MissingField,

    #[error("That doesn't look like an email address.")]
    InvalidEmail,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error(
        "Password needs at least one uppercase letter, one lowercase letter and one digit, minimum {min} characters."
    )]
    WeakPassword { min: usize },

    #[error("Birth date must be YYYY-MM-DD.")]
    BadBirthDate,

    #[error("You must be at least 18 years old to register.")]
    Underage,

    #[error("Pick three different drivers before placing the bet.")]
    IncompleteBet,
}

// ---------------------------------------------------------------------------
// Password policy
// ---------------------------------------------------------------------------

/// Whether `password` satisfies the policy: at least one lowercase letter,
/// one uppercase letter, one digit, and `min_len` characters.
pub fn password_meets_policy(password: &str, min_len: usize) -> bool {
    password.chars().count() >= min_len
        && HAS_LOWER.is_match(password)
        && HAS_UPPER.is_match(password)
        && HAS_DIGIT.is_match(password)
}

// ---------------------------------------------------------------------------
// Age check
// ---------------------------------------------------------------------------

/// Whether someone born on `birth` is at least [`MIN_AGE`] on `today`.
/// The boundary is inclusive: a birth date exactly 18 years before today
/// qualifies.
pub fn is_adult(birth: NaiveDate, today: NaiveDate) -> bool {
    today.years_since(birth).is_some_and(|age| age >= MIN_AGE)
}

// ---------------------------------------------------------------------------
// Form validation
// ---------------------------------------------------------------------------

/// Validate the login form.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingField);
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Validate the registration form. `today` is injected so the age boundary
/// is testable.
pub fn validate_registration(
    first_name: &str,
    last_name: &str,
    email: &str,
    birth_date: &str,
    password: &str,
    confirm: &str,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    if first_name.trim().is_empty()
        || last_name.trim().is_empty()
        || email.trim().is_empty()
        || birth_date.trim().is_empty()
        || password.is_empty()
        || confirm.is_empty()
    {
        return Err(ValidationError::MissingField);
    }
    if !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if !password_meets_policy(password, MIN_PASSWORD_LEN_REGISTER) {
        return Err(ValidationError::WeakPassword {
            min: MIN_PASSWORD_LEN_REGISTER,
        });
    }
    let birth = NaiveDate::parse_from_str(birth_date.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::BadBirthDate)?;
    if !is_adult(birth, today) {
        return Err(ValidationError::Underage);
    }
    Ok(())
}

/// Validate the change-password form. The new password uses the stricter
/// 8-character minimum.
pub fn validate_password_change(
    current: &str,
    new: &str,
    confirm: &str,
) -> Result<(), ValidationError> {
    if current.is_empty() || new.is_empty() || confirm.is_empty() {
        return Err(ValidationError::MissingField);
    }
    if new != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if !password_meets_policy(new, MIN_PASSWORD_LEN_CHANGE) {
        return Err(ValidationError::WeakPassword {
            min: MIN_PASSWORD_LEN_CHANGE,
        });
    }
    Ok(())
}

/// Validate a podium pick before submission: all three slots selected and
/// pairwise distinct. The picker group already enforces distinctness; this
/// re-checks it at the submission boundary.
pub fn validate_top3(selections: &[Option<u32>]) -> Result<(u32, u32, u32), ValidationError> {
    match selections {
        [Some(a), Some(b), Some(c)] if a != b && a != c && b != c => Ok((*a, *b, *c)),
        _ => Err(ValidationError::IncompleteBet),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
