//! Phone number domain model.
//!
//! # Invariants
//! - `value` is E.164: `+` followed by 1..=15 digits.
//! - A value is unique per organization.

use crate::model::organization::OrganizationId;
use crate::model::validation::{normalize_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub type PhoneNumberId = i64;

static E164_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[0-9]{1,15}$").expect("valid E.164 regex"));

/// Phone line category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneNumberType {
    #[default]
    Work,
    Mobile,
    Fax,
}

impl PhoneNumberType {
    /// Storage/wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Mobile => "mobile",
            Self::Fax => "fax",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "work" => Some(Self::Work),
            "mobile" => Some(Self::Mobile),
            "fax" => Some(Self::Fax),
            _ => None,
        }
    }
}

/// Phone number read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub id: PhoneNumberId,
    pub value: String,
    pub is_primary: bool,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: PhoneNumberType,
    pub comment: Option<String>,
}

/// Write model for inserting a phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoneNumber {
    pub organization_id: OrganizationId,
    pub value: String,
    pub is_primary: bool,
    pub kind: PhoneNumberType,
    pub comment: Option<String>,
}

impl NewPhoneNumber {
    /// Creates a non-primary work number without comment.
    pub fn work(organization_id: OrganizationId, value: impl Into<String>) -> Self {
        Self {
            organization_id,
            value: value.into(),
            is_primary: false,
            kind: PhoneNumberType::Work,
            comment: None,
        }
    }

    /// Validates E.164 format and normalizes the optional comment.
    ///
    /// A blank comment is stored as `None`.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let value = self.value.trim();
        if !is_e164(value) {
            return Err(ValidationError::InvalidPhoneNumber(self.value.clone()));
        }
        let comment = match self.comment.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(normalize_text("phone comment", text)?),
        };
        Ok(Self {
            value: value.to_string(),
            comment,
            ..self.clone()
        })
    }
}

pub fn is_e164(value: &str) -> bool {
    E164_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{is_e164, NewPhoneNumber, PhoneNumberType};
    use crate::model::validation::ValidationError;

    #[test]
    fn e164_accepts_plus_and_up_to_fifteen_digits() {
        assert!(is_e164("+7"));
        assert!(is_e164("+74951234567"));
        assert!(is_e164("+123456789012345"));
        assert!(!is_e164("+1234567890123456"));
        assert!(!is_e164("74951234567"));
        assert!(!is_e164("+7 495 123"));
        assert!(!is_e164("+"));
    }

    #[test]
    fn validated_trims_value_and_drops_blank_comment() {
        let mut phone = NewPhoneNumber::work(1, " +78124445566 ");
        phone.comment = Some("   ".to_string());

        let normalized = phone.validated().unwrap();
        assert_eq!(normalized.value, "+78124445566");
        assert_eq!(normalized.comment, None);
    }

    #[test]
    fn validated_rejects_non_e164_value() {
        let err = NewPhoneNumber::work(1, "8-800-555-35-35")
            .validated()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidPhoneNumber("8-800-555-35-35".to_string())
        );
    }

    #[test]
    fn phone_type_labels_round_trip() {
        for kind in [
            PhoneNumberType::Work,
            PhoneNumberType::Mobile,
            PhoneNumberType::Fax,
        ] {
            assert_eq!(PhoneNumberType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(PhoneNumberType::parse("pager"), None);
    }
}
