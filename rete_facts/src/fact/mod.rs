//! Facts - the (identifier, attribute, value) triples held in working memory.

use serde::{Deserialize, Serialize};

/// A scalar symbol appearing in one position of a fact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One position of a fact triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Identifier,
    Attribute,
    Value,
}

impl Field {
    /// Get the short name of this field.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Identifier => "id",
            Field::Attribute => "attr",
            Field::Value => "value",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single datum in working memory.
///
/// Facts are compared and hashed structurally: two facts built from the same
/// three symbols are the same fact. They are never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fact {
    pub identifier: Symbol,
    pub attribute: Symbol,
    pub value: Symbol,
}

impl Fact {
    /// Create a new fact from its three positions.
    pub fn new(
        identifier: impl Into<Symbol>,
        attribute: impl Into<Symbol>,
        value: impl Into<Symbol>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Get the symbol stored in `field`.
    pub fn field(&self, field: Field) -> &Symbol {
        match field {
            Field::Identifier => &self.identifier,
            Field::Attribute => &self.attribute,
            Field::Value => &self.value,
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.identifier, self.attribute, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fact_fields() {
        let fact = Fact::new("b1", "on", "b2");
        assert_eq!(fact.field(Field::Identifier).as_str(), "b1");
        assert_eq!(fact.field(Field::Attribute).as_str(), "on");
        assert_eq!(fact.field(Field::Value).as_str(), "b2");
    }

    #[test]
    fn test_structural_equality() {
        let mut set = HashSet::new();
        set.insert(Fact::new("b1", "on", "b2"));
        set.insert(Fact::new("b1", "on", "b2")); // Same triple

        assert_eq!(set.len(), 1);
        assert_ne!(Fact::new("b1", "on", "b2"), Fact::new("b2", "on", "b1"));
    }

    #[test]
    fn test_fact_display() {
        assert_eq!(Fact::new("b3", "color", "red").to_string(), "(b3 color red)");
    }

    #[test]
    fn test_symbol_serializes_as_string() {
        let json = serde_json::to_string(&Fact::new("b1", "on", "table")).unwrap();
        assert_eq!(
            json,
            r#"{"identifier":"b1","attribute":"on","value":"table"}"#
        );
    }
}
