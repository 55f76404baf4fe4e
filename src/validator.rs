//! Field-level validation of drafts.
//!
//! Validators are pure and total: the same draft always yields the same
//! [`FieldErrors`], and no rule ever panics. Each field is checked on its own,
//! so a draft with five bad fields reports five messages. Within one field the
//! first failing rule wins.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9]{9,10}$"));
static COURSE_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Za-z]{2,5}\d{2,4}$"));

fn compile(pattern: &str) -> Regex {
    // Patterns are literals above; a failure here is a programming error.
    Regex::new(pattern).expect("built-in validation pattern must compile")
}

/// Mapping from field name to a human readable message. An absent entry means
/// the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    /// Records `result` under `field` when it carries a message.
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.insert(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was reported.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Trimmed value must be non-empty.
pub fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(message.to_string())
    } else {
        Ok(trimmed)
    }
}

pub fn min_length(value: &str, min: usize, message: &str) -> Result<(), String> {
    if value.chars().count() < min {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

pub fn max_length(value: &str, max: usize, message: &str) -> Result<(), String> {
    if value.chars().count() > max {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

pub fn matches(value: &str, pattern: &Regex, message: &str) -> Result<(), String> {
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(message.to_string())
    }
}

/// Parses trimmed text as a finite number. `NaN` and infinities are rejected.
pub fn finite_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn in_range(value: &str, min: f64, max: f64, message: &str) -> Result<f64, String> {
    match finite_number(value) {
        Some(n) if n >= min && n <= max => Ok(n),
        _ => Err(message.to_string()),
    }
}

pub fn email(value: &str) -> Result<(), String> {
    let value = required(value, "Email is required")?;
    matches(value, &EMAIL, "Invalid email format")
}

pub fn phone(value: &str) -> Result<(), String> {
    let value = required(value, "Phone is required")?;
    matches(value, &PHONE, "Phone must contain 9-10 digits")
}

/// Full name between `min` and `max` characters after trimming.
pub fn full_name(value: &str, min: usize, max: usize) -> Result<(), String> {
    let value = required(value, "Full name is required")?;
    min_length(value, min, &format!("Full name must be at least {} characters", min))?;
    max_length(value, max, &format!("Full name must be at most {} characters", max))
}

/// Course code format: 2-5 letters followed by 2-4 digits.
pub fn course_code_format(value: &str) -> Result<(), String> {
    let value = required(value, "Course code is required")?;
    matches(value, &COURSE_CODE, "Use format like CS101")
}

/// Normalized form used for storage and uniqueness checks.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Fails when another record (other than `exclude_id`) already uses `code`,
/// compared case-insensitively.
pub fn unique_code<'a, I>(code: &str, existing: I, exclude_id: Option<&str>) -> Result<(), String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let normalized = normalize_code(code);
    if normalized.is_empty() {
        return Ok(());
    }

    let taken = existing
        .into_iter()
        .any(|(id, other)| Some(id) != exclude_id && other.to_uppercase() == normalized);

    if taken {
        Err("Course code already exists".to_string())
    } else {
        Ok(())
    }
}

pub fn at_least_one<T>(items: &[T], message: &str) -> Result<(), String> {
    if items.is_empty() {
        Err(message.to_string())
    } else {
        Ok(())
    }
}

/// Adapts a rule returning a value to the unit result stored in [`FieldErrors`].
pub fn discard<T>(result: Result<T, String>) -> Result<(), String> {
    result.map(|_| ())
}
