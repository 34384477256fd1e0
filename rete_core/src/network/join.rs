//! The join operator: extends tokens by one fact when every join test holds.
//!
//! A join is activated from two sides:
//! 1. **Fact side**: a new fact is tested against every token already held
//!    by the token parent
//! 2. **Token side**: a new token is tested against every fact already held
//!    by the fact parent
//!
//! Both sides run the same tests on the same (fact, token) pair and build the
//! same extended token, so a combination is produced by whichever of its two
//! halves arrives second.

use rete_facts::{Fact, JoinTest, Token};
use std::sync::Arc;

use super::node::{JoinNode, NodeId};
use crate::error::ReteError;

impl JoinNode {
    /// Whether every test holds between `fact` and `token`. Stops at the first failure.
    pub fn passes(&self, fact: &Fact, token: &Token) -> bool {
        self.tests.iter().all(|test| test.holds(fact, token))
    }

    /// Fact-side activation: extend each stored token that agrees with `fact`.
    pub fn on_fact(&self, fact: &Arc<Fact>, tokens: &[Token]) -> Vec<Token> {
        tokens
            .iter()
            .filter(|token| self.passes(fact, token))
            .map(|token| token.extend(Arc::clone(fact)))
            .collect()
    }

    /// Token-side activation: extend `token` with each stored fact that agrees with it.
    pub fn on_token(&self, token: &Token, facts: &[Arc<Fact>]) -> Vec<Token> {
        facts
            .iter()
            .filter(|fact| self.passes(fact, token))
            .map(|fact| token.extend(Arc::clone(fact)))
            .collect()
    }

    /// Every combination of the two parents' current contents, in token order.
    pub fn cross(&self, tokens: &[Token], facts: &[Arc<Fact>]) -> Vec<Token> {
        tokens
            .iter()
            .flat_map(|token| self.on_token(token, facts))
            .collect()
    }
}

/// Reject tests that read past the end of the tokens `parent` emits.
pub(crate) fn check_token_indices(
    tests: &[JoinTest],
    parent: NodeId,
    arity: usize,
) -> Result<(), ReteError> {
    match tests.iter().find(|test| test.token_index >= arity) {
        Some(test) => Err(ReteError::TokenIndexOutOfRange {
            parent,
            index: test.token_index,
            arity,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rete_facts::{Comparison, Field};

    fn fact(id: &str, attr: &str, value: &str) -> Arc<Fact> {
        Arc::new(Fact::new(id, attr, value))
    }

    /// Join for "(X on Y), (Y left_of Z)": fact.id == token[0].value
    fn on_then_left_of() -> JoinNode {
        JoinNode {
            fact_parent: Some(NodeId(1)),
            token_parent: Some(NodeId(2)),
            tests: vec![JoinTest::equals(Field::Identifier, 0, Field::Value)],
            arity: 2,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_join_symmetry() {
        let join = on_then_left_of();
        let on = fact("b1", "on", "b2");
        let left_of = fact("b2", "left_of", "b3");
        let token = Token::single(on.clone());

        let from_fact_side = join.on_fact(&left_of, &[token.clone()]);
        let from_token_side = join.on_token(&token, &[left_of.clone()]);

        assert_eq!(from_fact_side, from_token_side);
        assert_eq!(from_fact_side, vec![Token::from_facts(vec![on, left_of])]);
    }

    #[test]
    fn test_failing_test_drops_pair() {
        let join = on_then_left_of();
        let token = Token::single(fact("b1", "on", "b2"));

        assert!(join.on_fact(&fact("b9", "left_of", "b3"), &[token.clone()]).is_empty());
        assert!(join.on_token(&token, &[fact("b9", "left_of", "b3")]).is_empty());
    }

    #[test]
    fn test_all_tests_must_pass() {
        let mut join = on_then_left_of();
        join.tests.push(JoinTest::new(Field::Value, Comparison::NotEqual, 0, Field::Identifier));
        let token = Token::single(fact("b1", "on", "b2"));

        // Second test fails: value b1 == token[0].id b1
        assert!(!join.passes(&Fact::new("b2", "left_of", "b1"), &token));
        assert!(join.passes(&Fact::new("b2", "left_of", "b3"), &token));
    }

    #[test]
    fn test_no_tests_is_cross_product() {
        let mut join = on_then_left_of();
        join.tests.clear();
        let tokens = vec![Token::single(fact("a", "on", "b")), Token::single(fact("c", "on", "d"))];
        let facts = vec![fact("x", "color", "red"), fact("y", "color", "blue")];

        let crossed = join.cross(&tokens, &facts);
        assert_eq!(crossed.len(), 4);
        assert!(crossed.iter().all(|token| token.len() == 2));
        assert_eq!(crossed[1].to_string(), "[(a on b), (y color blue)]");
    }

    #[test]
    fn test_parent_token_not_modified() {
        let join = on_then_left_of();
        let token = Token::single(fact("b1", "on", "b2"));
        let extended = join.on_token(&token, &[fact("b2", "left_of", "b3")]);

        assert_eq!(token.len(), 1);
        assert_eq!(extended[0].len(), 2);
    }

    #[test]
    fn test_check_token_indices() {
        let tests = vec![
            JoinTest::equals(Field::Identifier, 0, Field::Value),
            JoinTest::equals(Field::Identifier, 1, Field::Value),
        ];
        assert!(check_token_indices(&tests, NodeId(3), 2).is_ok());

        let err = check_token_indices(&tests, NodeId(3), 1).unwrap_err();
        assert!(matches!(
            err,
            ReteError::TokenIndexOutOfRange { index: 1, arity: 1, .. }
        ));
    }
}
