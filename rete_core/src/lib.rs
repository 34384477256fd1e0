//! # Rete Core
//!
//! An incremental pattern-matching network implementing the Rete algorithm.
//! Facts are pushed through a condition network into fact memories, and join
//! nodes extend cached partial matches by one fact at a time, so an insertion
//! only touches the partial matches relevant to it.
//!
//! ## Core Components
//!
//! - **network**: the node arena, construction API, propagation and inspection
//! - **config**: duplicate-handling policy and logging switches, loadable from TOML
//! - **shared**: a mutex-guarded handle for use from several threads
//! - **sample**: a hand-wired blocks-world network
//!
//! ## Example
//!
//! ```
//! use rete_core::{NetworkConfig, ReteNetwork};
//! use rete_facts::{ConditionTest, Field, JoinTest};
//! use std::sync::{Arc, Mutex};
//!
//! let mut net = ReteNetwork::new(NetworkConfig::default());
//! let on = net.add_condition(net.root(), ConditionTest::equals(Field::Attribute, "on")).unwrap();
//! let on_mem = net.add_fact_memory(on).unwrap();
//! let first = net.add_adapter(on_mem).unwrap();
//!
//! let red = net.add_condition(net.root(), ConditionTest::equals(Field::Value, "red")).unwrap();
//! let red_mem = net.add_fact_memory(red).unwrap();
//! let join = net
//!     .register_join(Some(red_mem), Some(first), vec![JoinTest::equals(Field::Identifier, 0, Field::Value)])
//!     .unwrap();
//!
//! let fired = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&fired);
//! net.add_terminal(join, "on-red", move |_, token| {
//!     sink.lock().unwrap().push(token.to_string());
//!     Ok(())
//! })
//! .unwrap();
//!
//! net.insert_triple("b1", "on", "b2").unwrap();
//! net.insert_triple("b2", "color", "red").unwrap();
//! assert_eq!(*fired.lock().unwrap(), vec!["[(b1 on b2), (b2 color red)]"]);
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod sample;
pub mod shared;

pub use config::*;
pub use error::*;
pub use network::*;
pub use shared::*;
