//! This module defines the canonical, type-safe representation of the column
//! type tags reported by Simplace results and varmaps.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The type tag of a single Simplace output column.
///
/// Simplace reports these as strings (`getTypeStrings()`). Every decoder
/// dispatches on this enum instead of comparing strings, so a new variant is a
/// compile error at every match site. Tags the bridge does not know about are
/// kept verbatim in `Other` and decoded without conversion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "String", from = "String")]
pub enum SimplaceType {
    Double,
    Int,
    Boolean,
    Char,
    Date,
    DoubleArray,
    IntArray,
    CharArray,
    Other(String),
}

impl SimplaceType {
    /// Parses an Engine type tag. Unknown tags never fail.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "DOUBLE" => Self::Double,
            "INT" => Self::Int,
            "BOOLEAN" => Self::Boolean,
            "CHAR" => Self::Char,
            "DATE" => Self::Date,
            "DOUBLEARRAY" => Self::DoubleArray,
            "INTARRAY" => Self::IntArray,
            "CHARARRAY" => Self::CharArray,
            other => Self::Other(other.to_string()),
        }
    }

    /// The tag as Simplace spells it.
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Double => "DOUBLE",
            Self::Int => "INT",
            Self::Boolean => "BOOLEAN",
            Self::Char => "CHAR",
            Self::Date => "DATE",
            Self::DoubleArray => "DOUBLEARRAY",
            Self::IntArray => "INTARRAY",
            Self::CharArray => "CHARARRAY",
            Self::Other(tag) => tag,
        }
    }
}

impl FromStr for SimplaceType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(s))
    }
}

impl From<String> for SimplaceType {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<SimplaceType> for String {
    fn from(ty: SimplaceType) -> Self {
        ty.as_tag().to_string()
    }
}

/// Provides the canonical string representation for a `SimplaceType`.
impl fmt::Display for SimplaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // This is the Engine's own spelling and part of the public contract.
        f.write_str(self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_round_trip_through_display() {
        for tag in [
            "DOUBLE",
            "INT",
            "BOOLEAN",
            "CHAR",
            "DATE",
            "DOUBLEARRAY",
            "INTARRAY",
            "CHARARRAY",
        ] {
            let ty = SimplaceType::from_tag(tag);
            assert!(!matches!(ty, SimplaceType::Other(_)), "{tag} parsed as Other");
            assert_eq!(ty.to_string(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_kept_verbatim() {
        let ty: SimplaceType = "DATEARRAY".parse().unwrap();
        assert_eq!(ty, SimplaceType::Other("DATEARRAY".into()));
        assert_eq!(ty.as_tag(), "DATEARRAY");
        // Tags are case sensitive on the Java side as well.
        assert_eq!(
            SimplaceType::from_tag("double"),
            SimplaceType::Other("double".into())
        );
    }

    #[test]
    fn test_serde_uses_engine_spelling() {
        let json = serde_json::to_string(&SimplaceType::IntArray).unwrap();
        assert_eq!(json, "\"INTARRAY\"");
        let back: SimplaceType = serde_json::from_str("\"CHAR\"").unwrap();
        assert_eq!(back, SimplaceType::Char);
    }
}
