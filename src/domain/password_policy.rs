//! Rule-based password strength checks.
//!
//! Pure and deterministic: the same input always yields the same report.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{LONG_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, VERY_LONG_PASSWORD_LENGTH};

static SPECIAL_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]"#).expect("valid regex"));

/// Passwords that are rejected outright (compared lower-cased).
static COMMON_PASSWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "123456", "password", "123456789", "12345678", "12345", "1234567", "1234567890",
        "qwerty", "abc123", "million2", "000000", "1234", "iloveyou", "aaron431", "password1",
        "qqww1122", "123123", "omgpop", "123321", "654321", "qwertyuiop", "qwer1234", "123abc",
        "admin", "administrator", "root", "user", "guest", "test", "demo", "welcome", "login",
        "pass", "secret", "master", "super", "default", "colombia", "bogota", "medellin", "cali",
        "barranquilla", "cartagena", "bucaramanga", "pereira", "manizales", "ibague", "cucuta",
        "villavicencio", "juzgado", "justicia", "derecho", "abogado", "tribunal", "corte",
        "expediente", "proceso", "demanda", "sentencia", "juez", "magistrado",
    ]
    .into_iter()
    .collect()
});

const KEYBOARD_RUNS: &[&str] = &["qwerty", "asdf", "zxcv", "qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Coarse strength bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    fn from_score(score: u8) -> Self {
        if score >= 60 {
            Strength::Strong
        } else if score >= 40 {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }
}

/// Outcome of [`validate_password`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PasswordReport {
    pub is_valid: bool,
    pub strength: Strength,
    /// 0 to 100
    #[schema(example = 86)]
    pub score: u8,
    pub errors: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct Traits {
    length: usize,
    has_upper: bool,
    has_lower: bool,
    has_digit: bool,
    has_special: bool,
    is_common: bool,
    has_weak_pattern: bool,
}

impl Traits {
    fn of(password: &str) -> Self {
        Self {
            length: password.chars().count(),
            has_upper: password.chars().any(|c| c.is_ascii_uppercase()),
            has_lower: password.chars().any(|c| c.is_ascii_lowercase()),
            has_digit: password.chars().any(|c| c.is_ascii_digit()),
            has_special: SPECIAL_CHAR.is_match(password),
            is_common: COMMON_PASSWORDS.contains(password.to_lowercase().as_str()),
            has_weak_pattern: has_weak_pattern(password),
        }
    }
}

/// Check a password against every rule and score it.
pub fn validate_password(password: &str) -> PasswordReport {
    let traits = Traits::of(password);
    let score = score(password, &traits);
    let errors = errors(&traits);

    PasswordReport {
        is_valid: errors.is_empty(),
        strength: Strength::from_score(score),
        score,
        errors,
        suggestions: suggestions(&traits),
    }
}

fn errors(t: &Traits) -> Vec<String> {
    let mut errors = Vec::new();

    if t.length < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !t.has_upper {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if !t.has_lower {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if !t.has_digit {
        errors.push("Password must contain at least one number".to_string());
    }
    if !t.has_special {
        errors.push("Password must contain at least one special character".to_string());
    }
    if t.is_common {
        errors.push("Password is too common".to_string());
    }
    if t.has_weak_pattern {
        errors.push("Password contains sequences or repeated characters".to_string());
    }

    errors
}

fn suggestions(t: &Traits) -> Vec<String> {
    let mut suggestions = Vec::new();

    if t.length < MIN_PASSWORD_LENGTH {
        suggestions.push(format!("Use at least {} characters", MIN_PASSWORD_LENGTH));
    }
    if !t.has_upper {
        suggestions.push("Add an uppercase letter".to_string());
    }
    if !t.has_lower {
        suggestions.push("Add a lowercase letter".to_string());
    }
    if !t.has_digit {
        suggestions.push("Add a number".to_string());
    }
    if !t.has_special {
        suggestions.push("Add a special character".to_string());
    }
    if t.is_common {
        suggestions.push("Avoid common passwords and choose something unique".to_string());
    }
    if t.has_weak_pattern {
        suggestions.push("Avoid sequences and repetitions".to_string());
    }
    if t.length < LONG_PASSWORD_LENGTH {
        suggestions.push(format!(
            "Consider {} or more characters for extra safety",
            LONG_PASSWORD_LENGTH
        ));
    }

    suggestions
}

fn score(password: &str, t: &Traits) -> u8 {
    let mut score: i32 = 0;

    if t.length >= MIN_PASSWORD_LENGTH {
        score += (t.length as i32 * 2).min(25);
    }
    for present in [t.has_lower, t.has_upper, t.has_digit, t.has_special] {
        if present {
            score += 10;
        }
    }

    let unique = password.chars().collect::<HashSet<_>>().len() as i32;
    score += unique.min(15);

    if t.has_weak_pattern {
        score -= 20;
    }
    if t.is_common {
        score -= 30;
    }
    if t.length >= LONG_PASSWORD_LENGTH {
        score += 10;
    }
    if t.length >= VERY_LONG_PASSWORD_LENGTH {
        score += 10;
    }

    score.clamp(0, 100) as u8
}

/// Runs like `123`, `cba`, `aaa` or keyboard rows such as `qwerty`.
fn has_weak_pattern(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();

    for w in chars.windows(3) {
        if w[0] == w[1] && w[1] == w[2] {
            return true;
        }

        let digits: Option<Vec<i64>> = w.iter().map(|c| c.to_digit(10).map(i64::from)).collect();
        if let Some(d) = digits {
            if is_step_run(d[0], d[1], d[2]) {
                return true;
            }
            continue;
        }

        if w.iter().all(|c| c.is_alphabetic()) {
            let codes: Vec<i64> = w
                .iter()
                .map(|c| c.to_lowercase().next().unwrap_or(*c) as i64)
                .collect();
            if is_step_run(codes[0], codes[1], codes[2]) {
                return true;
            }
        }
    }

    let lower = password.to_lowercase();
    KEYBOARD_RUNS.iter().any(|run| {
        let reversed: String = run.chars().rev().collect();
        lower.contains(run) || lower.contains(&reversed)
    })
}

fn is_step_run(a: i64, b: i64, c: i64) -> bool {
    (b == a + 1 && c == b + 1) || (b == a - 1 && c == b - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_password_is_invalid() {
        let report = validate_password("");
        assert!(!report.is_valid);
        assert_eq!(report.score, 0);
        assert_eq!(report.strength, Strength::Weak);
    }

    #[test]
    fn test_very_short_password_is_invalid() {
        let report = validate_password("123");
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("at least 8")));
    }

    #[test]
    fn test_mixed_password_is_strong() {
        let report = validate_password("Juzg4do#Seguro");
        assert!(report.is_valid, "unexpected errors: {:?}", report.errors);
        assert_eq!(report.strength, Strength::Strong);
        assert_eq!(report.score, 86);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_common_password_flagged() {
        let report = validate_password("Expediente");
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("too common")));
    }

    #[test]
    fn test_weak_patterns_detected() {
        assert!(has_weak_pattern("ab123xy"));
        assert!(has_weak_pattern("x987y"));
        assert!(has_weak_pattern("Xabc!"));
        assert!(has_weak_pattern("CBA"));
        assert!(has_weak_pattern("pass111"));
        assert!(has_weak_pattern("myQwErTy"));
        assert!(has_weak_pattern("fdsa"));
        assert!(!has_weak_pattern("Juzg4do#Seguro"));
    }

    #[test]
    fn test_validation_is_deterministic() {
        assert_eq!(validate_password("M1xed!Case"), validate_password("M1xed!Case"));
    }

    #[test]
    fn test_suggestions_track_missing_classes() {
        let report = validate_password("lowercaseonly");
        assert!(report.suggestions.iter().any(|s| s.contains("uppercase")));
        assert!(report.suggestions.iter().any(|s| s.contains("number")));
        assert!(report.suggestions.iter().any(|s| s.contains("special")));
    }
}
