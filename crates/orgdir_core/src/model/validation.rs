//! Write-time validation shared by all directory entities.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum stored length, in characters, of names, addresses and comments.
pub const MAX_TEXT_CHARS: usize = 200;

/// Invariant violation detected before a write reaches storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    BlankField(&'static str),
    /// Text field exceeds [`MAX_TEXT_CHARS`].
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// Latitude is not a finite value in `[-90, 90]`.
    LatitudeOutOfRange(f64),
    /// Longitude is not a finite value in `[-180, 180]`.
    LongitudeOutOfRange(f64),
    /// Phone number is not `+` followed by 1..=15 digits.
    InvalidPhoneNumber(String),
    /// Occupation would become its own parent.
    SelfParent(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} is {actual_chars} characters long; at most {max_chars} allowed"
            ),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
            Self::InvalidPhoneNumber(value) => {
                write!(f, "phone number `{value}` is not in E.164 format")
            }
            Self::SelfParent(id) => write!(f, "occupation {id} cannot be its own parent"),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and checks it against blank/length rules.
pub(crate) fn normalize_text(
    field: &'static str,
    value: &str,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    let actual_chars = trimmed.chars().count();
    if actual_chars > MAX_TEXT_CHARS {
        return Err(ValidationError::FieldTooLong {
            field,
            max_chars: MAX_TEXT_CHARS,
            actual_chars,
        });
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_latitude(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (-90.0..=90.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::LatitudeOutOfRange(value))
    }
}

pub(crate) fn validate_longitude(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (-180.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::LongitudeOutOfRange(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_text, validate_latitude, validate_longitude, ValidationError};

    #[test]
    fn normalize_text_trims_and_rejects_blank() {
        assert_eq!(normalize_text("name", "  Аптека  ").unwrap(), "Аптека");
        assert_eq!(
            normalize_text("name", " \t ").unwrap_err(),
            ValidationError::BlankField("name")
        );
    }

    #[test]
    fn normalize_text_counts_characters_not_bytes() {
        let cyrillic = "ж".repeat(200);
        assert!(normalize_text("name", &cyrillic).is_ok());

        let err = normalize_text("name", &"ж".repeat(201)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::FieldTooLong {
                actual_chars: 201,
                ..
            }
        ));
    }

    #[test]
    fn coordinate_bounds_are_inclusive_and_reject_nan() {
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.000_001).is_err());
        assert!(validate_latitude(f64::NAN).is_err());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.5).is_err());
        assert!(validate_longitude(f64::INFINITY).is_err());
    }
}
