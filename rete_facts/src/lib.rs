//! # Rete Facts
//!
//! The working-memory data model shared by every node of the Rete network.
//! This crate holds no matching logic of its own: it defines what a fact is,
//! how a single fact or a pair (fact, token) is tested, and what a partial
//! match looks like.
//!
//! ## Core Types
//!
//! - **fact**: `(identifier, attribute, value)` triples of symbols
//! - **predicate**: condition tests, join tests and their comparison operators
//! - **token**: ordered, immutable sequences of facts

pub mod fact;
pub mod predicate;
pub mod token;

pub use fact::*;
pub use predicate::*;
pub use token::*;
