//! Predicates - the single-fact and fact-against-token tests of the network.
//!
//! - **ConditionTest**: filters one fact on one of its fields
//! - **JoinTest**: compares a field of a new fact with a field of one fact
//!   already held by a token
//!
//! Variable bindings are never resolved symbolically. Whoever builds the
//! network states "the same variable appears twice" as an explicit
//! field-to-field join test; [`Variable`] only labels such a test.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::fact::{Fact, Field, Symbol};
use crate::token::Token;

/// Errors raised while configuring a test.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    #[error("unsupported comparison operator `{0}`")]
    UnsupportedOperator(String),
}

/// Comparison operators available to condition and join tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    NotEqual,
}

impl Comparison {
    /// Apply the operator to two symbols.
    pub fn apply(&self, left: &Symbol, right: &Symbol) -> bool {
        match self {
            Comparison::Equal => left == right,
            Comparison::NotEqual => left != right,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
        }
    }
}

impl FromStr for Comparison {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" | "=" => Ok(Comparison::Equal),
            "!=" | "<>" => Ok(Comparison::NotEqual),
            other => Err(PredicateError::UnsupportedOperator(other.to_string())),
        }
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Named placeholder used when authoring a rule, e.g. `<y>`.
///
/// Carries no runtime behavior.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// A single-field filter: `fact[field] <comparison> value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionTest {
    pub field: Field,
    pub comparison: Comparison,
    pub value: Symbol,
}

impl ConditionTest {
    /// Create a new condition test.
    pub fn new(field: Field, comparison: Comparison, value: impl Into<Symbol>) -> Self {
        Self {
            field,
            comparison,
            value: value.into(),
        }
    }

    /// Shorthand for `fact[field] == value`.
    pub fn equals(field: Field, value: impl Into<Symbol>) -> Self {
        Self::new(field, Comparison::Equal, value)
    }

    /// Build a test from an operator written as text.
    ///
    /// Returns `Err` when the operator is not supported.
    pub fn parse(field: Field, operator: &str, value: impl Into<Symbol>) -> Result<Self, PredicateError> {
        Ok(Self::new(field, operator.parse()?, value))
    }

    /// Check whether `fact` passes this test.
    pub fn matches(&self, fact: &Fact) -> bool {
        self.comparison.apply(fact.field(self.field), &self.value)
    }
}

impl std::fmt::Display for ConditionTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparison, self.value)
    }
}

/// A consistency test between a new fact and a token:
/// `fact[fact_field] <comparison> token[token_index][token_field]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinTest {
    pub fact_field: Field,
    pub comparison: Comparison,
    pub token_index: usize,
    pub token_field: Field,
    /// Authoring label only, never consulted while matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Variable>,
}

impl JoinTest {
    /// Create a new join test.
    pub fn new(fact_field: Field, comparison: Comparison, token_index: usize, token_field: Field) -> Self {
        Self {
            fact_field,
            comparison,
            token_index,
            token_field,
            binding: None,
        }
    }

    /// Shorthand for `fact[fact_field] == token[token_index][token_field]`.
    pub fn equals(fact_field: Field, token_index: usize, token_field: Field) -> Self {
        Self::new(fact_field, Comparison::Equal, token_index, token_field)
    }

    /// Build a test from an operator written as text.
    ///
    /// Returns `Err` when the operator is not supported.
    pub fn parse(
        fact_field: Field,
        operator: &str,
        token_index: usize,
        token_field: Field,
    ) -> Result<Self, PredicateError> {
        Ok(Self::new(fact_field, operator.parse()?, token_index, token_field))
    }

    /// Label the test with the variable it stands for.
    pub fn with_binding(mut self, variable: Variable) -> Self {
        self.binding = Some(variable);
        self
    }

    /// Check whether the test holds between `fact` and `token`.
    ///
    /// A token too short to hold `token_index` never passes.
    pub fn holds(&self, fact: &Fact, token: &Token) -> bool {
        match token.get(self.token_index) {
            Some(earlier) => self
                .comparison
                .apply(fact.field(self.fact_field), earlier.field(self.token_field)),
            None => false,
        }
    }
}

impl std::fmt::Display for JoinTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fact.{} {} token[{}].{}",
            self.fact_field, self.comparison, self.token_index, self.token_field
        )?;
        if let Some(binding) = &self.binding {
            write!(f, " {}", binding)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_parse_comparison() {
        assert_eq!("==".parse::<Comparison>(), Ok(Comparison::Equal));
        assert_eq!(" = ".parse::<Comparison>(), Ok(Comparison::Equal));
        assert_eq!("<>".parse::<Comparison>(), Ok(Comparison::NotEqual));
        assert_eq!(
            ">=".parse::<Comparison>(),
            Err(PredicateError::UnsupportedOperator(">=".to_string()))
        );
    }

    #[test]
    fn test_condition_matches() {
        let on = ConditionTest::equals(Field::Attribute, "on");
        assert!(on.matches(&Fact::new("b1", "on", "b2")));
        assert!(!on.matches(&Fact::new("b1", "color", "red")));

        let not_table = ConditionTest::parse(Field::Value, "!=", "table").unwrap();
        assert!(not_table.matches(&Fact::new("b1", "on", "b2")));
        assert!(!not_table.matches(&Fact::new("b1", "on", "table")));
    }

    #[test]
    fn test_condition_rejects_unknown_operator() {
        let err = ConditionTest::parse(Field::Value, "~", "red").unwrap_err();
        assert_eq!(err.to_string(), "unsupported comparison operator `~`");
    }

    #[test]
    fn test_join_test_holds() {
        // (X on Y), (Y left_of Z): fact.id == token[0].value
        let test = JoinTest::equals(Field::Identifier, 0, Field::Value).with_binding(Variable::new("y"));
        let token = Token::single(Arc::new(Fact::new("b1", "on", "b2")));

        assert!(test.holds(&Fact::new("b2", "left_of", "b3"), &token));
        assert!(!test.holds(&Fact::new("b4", "left_of", "b3"), &token));
    }

    #[test]
    fn test_join_test_out_of_range_index() {
        let test = JoinTest::equals(Field::Identifier, 3, Field::Value);
        let token = Token::single(Arc::new(Fact::new("b1", "on", "b2")));
        assert!(!test.holds(&Fact::new("b2", "left_of", "b3"), &token));
    }

    #[test]
    fn test_binding_is_documentation_only() {
        let plain = JoinTest::equals(Field::Identifier, 0, Field::Value);
        let labelled = plain.clone().with_binding(Variable::new("unrelated"));
        let token = Token::single(Arc::new(Fact::new("b1", "on", "b2")));
        let fact = Fact::new("b2", "left_of", "b3");

        assert_eq!(plain.holds(&fact, &token), labelled.holds(&fact, &token));
        assert_eq!(labelled.to_string(), "fact.id == token[0].value <unrelated>");
    }
}
