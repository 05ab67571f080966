//! Error types of the layout engine.

use crate::register::{AddressRange, CoilIndex};
use crate::value_type::TypeError;

/// Errors raised while compiling or validating a register map.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("field `{field}`: {source}")]
    InvalidTypeSyntax { field: String, source: TypeError },

    #[error("field name `{name}` is used more than once")]
    DuplicateName { name: String },

    #[error("field `{name}` does not fit into the 16-bit register space")]
    AddressOverflow { name: String },

    #[error("address overlap: register `{first}` ({first_range}) and register `{second}` ({second_range})")]
    AddressConflict {
        first: String,
        first_range: AddressRange,
        second: String,
        second_range: AddressRange,
    },

    #[error("coil overlap: coil {index} is claimed by `{first}` and `{second}`")]
    FlagConflict {
        first: String,
        second: String,
        index: CoilIndex,
    },

    #[error("malformed version `{version}`: {source}")]
    MalformedVersion {
        version: String,
        source: semver::Error,
    },

    #[error("schema violation: {0}")]
    Schema(String),
}

impl LayoutError {
    /// Conflicts are validation findings; everything else means the map could not be compiled.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            LayoutError::AddressConflict { .. } | LayoutError::FlagConflict { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LayoutError::AddressConflict {
            first: "Voltage".into(),
            first_range: AddressRange { start: 5, end: 7 },
            second: "Current".into(),
            second_range: AddressRange { start: 5, end: 6 },
        };
        let message = err.to_string();
        assert!(message.contains("`Voltage` (5..7)"));
        assert!(message.contains("`Current` (5..6)"));
        assert!(err.is_conflict());

        let err = LayoutError::FlagConflict {
            first: "a".into(),
            second: "b".into(),
            index: 2,
        };
        assert_eq!(err.to_string(), "coil overlap: coil 2 is claimed by `a` and `b`");
    }

    #[test]
    fn error_variants() {
        let source = "int99".parse::<crate::ValueType>().unwrap_err();
        let err = LayoutError::InvalidTypeSyntax {
            field: "serial".into(),
            source,
        };
        assert!(err.to_string().starts_with("field `serial`"));
        assert!(!err.is_conflict());
        assert!(!LayoutError::Schema("x".into()).is_conflict());
    }
}
