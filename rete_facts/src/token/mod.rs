//! Tokens - partial matches flowing through the join network.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::fact::Fact;

/// An ordered sequence of facts, one per condition satisfied so far.
///
/// Index 0 holds the fact matched by the first condition of the rule. A
/// token is never modified once built: [`Token::extend`] produces a new
/// token and leaves the parent untouched in whatever memory stores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token {
    facts: Vec<Arc<Fact>>,
}

impl Token {
    /// Create a single-fact token, as built by an adapter.
    pub fn single(fact: Arc<Fact>) -> Self {
        Self { facts: vec![fact] }
    }

    /// Create a token from an explicit list of facts.
    pub fn from_facts(facts: impl IntoIterator<Item = Arc<Fact>>) -> Self {
        Self {
            facts: facts.into_iter().collect(),
        }
    }

    /// Build the token `self + fact`.
    pub fn extend(&self, fact: Arc<Fact>) -> Self {
        let mut facts = Vec::with_capacity(self.facts.len() + 1);
        facts.extend(self.facts.iter().cloned());
        facts.push(fact);
        Self { facts }
    }

    /// Get the fact matched by the condition at `index`.
    pub fn get(&self, index: usize) -> Option<&Fact> {
        self.facts.get(index).map(|fact| fact.as_ref())
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterate over the facts in condition order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter().map(|fact| fact.as_ref())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, fact) in self.facts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", fact)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(id: &str, attr: &str, value: &str) -> Arc<Fact> {
        Arc::new(Fact::new(id, attr, value))
    }

    #[test]
    fn test_extend_leaves_parent_untouched() {
        let parent = Token::single(fact("b1", "on", "b2"));
        let child = parent.extend(fact("b2", "left_of", "b3"));

        assert_eq!(parent.len(), 1);
        assert_eq!(child.len(), 2);
        assert_eq!(child.get(0), parent.get(0));
        assert_eq!(child.get(1), Some(&Fact::new("b2", "left_of", "b3")));
    }

    #[test]
    fn test_token_equality_is_structural() {
        let a = Token::single(fact("b1", "on", "b2")).extend(fact("b2", "left_of", "b3"));
        let b = Token::from_facts(vec![fact("b1", "on", "b2"), fact("b2", "left_of", "b3")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_token_display() {
        let token = Token::single(fact("b1", "on", "b2")).extend(fact("b3", "color", "red"));
        assert_eq!(token.to_string(), "[(b1 on b2), (b3 color red)]");
        assert!(token.get(2).is_none());
    }
}
