//! Business-rule validation. Violations are data, not errors: validators
//! collect every finding so callers can present all problems at once.

pub(crate) mod application;
pub(crate) mod entity;

use serde::{Deserialize, Serialize};

/// One business-rule finding, addressed by the wire-level field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub field_path: String,
    pub message: String,
}

impl Violation {
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            message: message.into(),
        }
    }
}

pub use application::validate_application;
pub use entity::{
    normalize_residence_rent, validate_application_fields, validate_employment,
    validate_income_source, validate_liability, validate_property, validate_reo_property,
    validate_residence,
};
