//! The Rete network - an arena of nodes wired into a condition network and a
//! partial-match network.
//!
//! Propagation of one inserted fact works as follows:
//! 1. **Root**: the fact is handed to every child of the root
//! 2. **Conditions**: single-field tests drop the fact or pass it on
//! 3. **Fact memories**: the fact is stored, then pushed to adapters and joins
//! 4. **Joins**: the fact (or a token built from it) is combined with what the
//!    opposite parent already stores
//! 5. **Partial-match memories**: new tokens are stored and pushed further
//! 6. **Terminals**: complete tokens run the rule's action
//!
//! Everything happens depth-first before [`ReteNetwork::insert`] returns.
//!
//! Nodes refer to each other by [`NodeId`], an index into the arena, so a join
//! and the memories it reads never own one another.
//!
//! Children are activated most-recently-attached first. A node can only be
//! attached below nodes that already exist, so this visits descendants before
//! their ancestors whenever one memory feeds two joins of the same rule path,
//! and each fact/token pair is combined exactly once.

mod inspect;
mod join;
mod memory;
mod node;

pub use inspect::*;
pub use memory::*;
pub use node::*;

use rete_facts::{ConditionTest, Fact, JoinTest, Symbol, Token};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::NetworkConfig;
use crate::error::{ActionError, ReteError};
use join::check_token_indices;

/// Unique identifier for a network instance, used in logs and snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId(pub Uuid);

impl NetworkId {
    /// Create a new random network ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Running totals kept while facts propagate.
#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    facts_inserted: u64,
    join_attempts: u64,
    tokens_emitted: u64,
    rules_fired: u64,
}

/// What an activated node hands to its children.
enum Forward {
    Nothing,
    Fact(Vec<NodeId>),
    Tokens(Vec<NodeId>, Vec<Token>),
    Join,
}

/// An incremental pattern-matching network.
///
/// Built once through the `add_*` and [`ReteNetwork::register_join`]
/// operations, then fed facts through [`ReteNetwork::insert`].
#[derive(Debug)]
pub struct ReteNetwork {
    id: NetworkId,
    config: NetworkConfig,
    nodes: Vec<Node>,
    root: NodeId,
    counters: Counters,
}

impl Default for ReteNetwork {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}

impl ReteNetwork {
    /// Create a network holding only its root node.
    pub fn new(config: NetworkConfig) -> Self {
        let id = NetworkId::new();
        debug!(network = %id, ?config, "creating network");
        Self {
            id,
            config,
            nodes: vec![Node::Root(RootNode::default())],
            root: NodeId(0),
            counters: Counters::default(),
        }
    }

    /// Create a network from a TOML configuration file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ReteError> {
        Ok(Self::new(NetworkConfig::load(path)?))
    }

    pub fn id(&self) -> NetworkId {
        self.id
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// The single entry point for new facts.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Result<&Node, ReteError> {
        self.nodes.get(id.index()).ok_or(ReteError::UnknownNode(id))
    }

    /// Iterate over all nodes in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Facts stored by a fact memory.
    pub fn facts(&self, memory: NodeId) -> Result<&[Arc<Fact>], ReteError> {
        let node = self.node(memory)?;
        node.facts().ok_or(ReteError::WrongKind {
            node: memory,
            kind: node.kind(),
            expected: "fact memory",
        })
    }

    /// Tokens stored by a partial-match memory or an adapter.
    pub fn tokens(&self, memory: NodeId) -> Result<&[Token], ReteError> {
        let node = self.node(memory)?;
        node.tokens().ok_or(ReteError::WrongKind {
            node: memory,
            kind: node.kind(),
            expected: "token memory",
        })
    }

    /// Add a single-field filter below the root or below another condition.
    pub fn add_condition(&mut self, parent: NodeId, test: ConditionTest) -> Result<NodeId, ReteError> {
        self.check_parent(parent, NodeKind::Condition, &[NodeKind::Root, NodeKind::Condition])?;
        let id = self.attach(
            &[parent],
            Node::Condition(ConditionNode {
                test,
                children: Vec::new(),
            }),
        );
        debug!(network = %self.id, node = %id, %parent, "added condition");
        Ok(id)
    }

    /// Add a fact memory at the end of a condition chain.
    pub fn add_fact_memory(&mut self, parent: NodeId) -> Result<NodeId, ReteError> {
        self.check_parent(parent, NodeKind::FactMemory, &[NodeKind::Root, NodeKind::Condition])?;
        let id = self.attach(
            &[parent],
            Node::FactMemory(FactMemoryNode {
                facts: Memory::new(),
                children: Vec::new(),
            }),
        );
        debug!(network = %self.id, node = %id, %parent, "added fact memory");
        Ok(id)
    }

    /// Add an adapter presenting `fact_memory` as one-fact tokens.
    ///
    /// Facts the memory already holds are wrapped right away.
    pub fn add_adapter(&mut self, fact_memory: NodeId) -> Result<NodeId, ReteError> {
        self.check_parent(fact_memory, NodeKind::Adapter, &[NodeKind::FactMemory])?;
        let policy = self.config.duplicates;
        let mut tokens = Memory::new();
        for fact in self.facts(fact_memory)? {
            tokens.insert(Token::single(Arc::clone(fact)), policy);
        }
        let id = self.attach(
            &[fact_memory],
            Node::Adapter(AdapterNode {
                source: fact_memory,
                tokens,
                children: Vec::new(),
            }),
        );
        debug!(network = %self.id, node = %id, parent = %fact_memory, "added adapter");
        Ok(id)
    }

    /// Build a join and link it below both of its parents in one step.
    ///
    /// `fact_parent` must be a fact memory and `token_parent` an adapter or a
    /// partial-match memory. Nothing is added when any check fails.
    ///
    /// # Errors
    ///
    /// - [`ReteError::DanglingJoin`] when both parents are `None`
    /// - [`ReteError::InvalidParent`] when a parent has the wrong kind
    /// - [`ReteError::TokenIndexOutOfRange`] when a test reads past the end
    ///   of the tokens the token parent emits
    pub fn register_join(
        &mut self,
        fact_parent: Option<NodeId>,
        token_parent: Option<NodeId>,
        tests: Vec<JoinTest>,
    ) -> Result<NodeId, ReteError> {
        if fact_parent.is_none() && token_parent.is_none() {
            return Err(ReteError::DanglingJoin);
        }
        if let Some(parent) = fact_parent {
            self.check_parent(parent, NodeKind::Join, &[NodeKind::FactMemory])?;
        }
        let mut arity = 1;
        if let Some(parent) = token_parent {
            let node = self.check_parent(
                parent,
                NodeKind::Join,
                &[NodeKind::Adapter, NodeKind::PartialMatchMemory],
            )?;
            let parent_arity = node.token_arity().unwrap_or(0);
            check_token_indices(&tests, parent, parent_arity)?;
            arity = parent_arity + 1;
        }

        let parents: Vec<NodeId> = fact_parent.into_iter().chain(token_parent).collect();
        let id = self.attach(
            &parents,
            Node::Join(JoinNode {
                fact_parent,
                token_parent,
                tests,
                arity,
                children: Vec::new(),
            }),
        );
        if parents.len() < 2 {
            warn!(
                network = %self.id,
                node = %id,
                ?fact_parent,
                ?token_parent,
                "join registered with a single parent can never emit tokens"
            );
        }
        debug!(network = %self.id, node = %id, ?fact_parent, ?token_parent, "registered join");
        Ok(id)
    }

    /// Add a partial-match memory storing the tokens a join emits.
    ///
    /// The join's current combinations are stored right away.
    pub fn add_partial_match_memory(&mut self, join: NodeId) -> Result<NodeId, ReteError> {
        self.check_parent(join, NodeKind::PartialMatchMemory, &[NodeKind::Join])?;
        let join_node = self.join_node(join)?;

        let policy = self.config.duplicates;
        let stored_tokens: &[Token] = match join_node.token_parent {
            Some(parent) => self.tokens(parent)?,
            None => &[],
        };
        let stored_facts: &[Arc<Fact>] = match join_node.fact_parent {
            Some(parent) => self.facts(parent)?,
            None => &[],
        };
        let mut tokens = Memory::new();
        for token in join_node.cross(stored_tokens, stored_facts) {
            tokens.insert(token, policy);
        }
        let arity = join_node.arity;

        let id = self.attach(
            &[join],
            Node::PartialMatchMemory(PartialMatchMemoryNode {
                tokens,
                arity,
                children: Vec::new(),
            }),
        );
        debug!(network = %self.id, node = %id, parent = %join, arity, "added partial-match memory");
        Ok(id)
    }

    /// Add a terminal running `action` for every complete token.
    ///
    /// Tokens that reached `parent` before the terminal existed are not replayed.
    pub fn add_terminal<F>(&mut self, parent: NodeId, name: impl Into<String>, action: F) -> Result<NodeId, ReteError>
    where
        F: FnMut(&str, &Token) -> Result<(), ActionError> + Send + 'static,
    {
        self.check_parent(
            parent,
            NodeKind::Terminal,
            &[NodeKind::Join, NodeKind::PartialMatchMemory, NodeKind::Adapter],
        )?;
        let name = name.into();
        let id = self.attach(
            &[parent],
            Node::Terminal(TerminalNode {
                name: name.clone(),
                action: Box::new(action),
            }),
        );
        debug!(network = %self.id, node = %id, %parent, rule = %name, "added terminal");
        Ok(id)
    }

    fn check_parent(&self, parent: NodeId, child: NodeKind, allowed: &[NodeKind]) -> Result<&Node, ReteError> {
        let node = self.node(parent)?;
        if allowed.contains(&node.kind()) {
            Ok(node)
        } else {
            Err(ReteError::InvalidParent {
                parent,
                kind: node.kind(),
                child,
            })
        }
    }

    /// Push `node` into the arena and list it as a child of every parent.
    /// Parents must already have been checked.
    fn attach(&mut self, parents: &[NodeId], node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        for parent in parents {
            if let Some(children) = self.nodes[parent.index()].children_mut() {
                children.push(id);
            }
        }
        id
    }

    /// Insert a fact and propagate it through the whole network.
    ///
    /// Returns once every join expansion and every rule firing it causes has
    /// completed. A failing action does not stop propagation: every node the
    /// fact reaches is still updated and every other rule still fires, then
    /// the first failure is returned as [`ReteError::Action`].
    pub fn insert(&mut self, fact: Fact) -> Result<(), ReteError> {
        let fact = Arc::new(fact);
        debug!(network = %self.id, %fact, "inserting fact");
        self.counters.facts_inserted += 1;
        self.activate_fact(self.root, &fact)
    }

    /// Insert the fact `(identifier attribute value)`.
    pub fn insert_triple(
        &mut self,
        identifier: impl Into<Symbol>,
        attribute: impl Into<Symbol>,
        value: impl Into<Symbol>,
    ) -> Result<(), ReteError> {
        self.insert(Fact::new(identifier, attribute, value))
    }

    fn activate_fact(&mut self, id: NodeId, fact: &Arc<Fact>) -> Result<(), ReteError> {
        let policy = self.config.duplicates;
        let kind = self.node(id)?.kind();
        trace!(node = %id, %kind, %fact, "fact activation");

        let forward = match &mut self.nodes[id.index()] {
            Node::Root(node) => Forward::Fact(fanout(&node.children)),
            Node::Condition(node) => {
                if node.test.matches(fact) {
                    Forward::Fact(fanout(&node.children))
                } else {
                    Forward::Nothing
                }
            }
            Node::FactMemory(node) => {
                if node.facts.insert(Arc::clone(fact), policy) {
                    Forward::Fact(fanout(&node.children))
                } else {
                    trace!(node = %id, %fact, "fact already stored");
                    Forward::Nothing
                }
            }
            Node::Adapter(node) => {
                let token = Token::single(Arc::clone(fact));
                if node.tokens.insert(token.clone(), policy) {
                    Forward::Tokens(fanout(&node.children), vec![token])
                } else {
                    Forward::Nothing
                }
            }
            Node::Join(_) => Forward::Join,
            Node::PartialMatchMemory(_) | Node::Terminal(_) => {
                return Err(ReteError::WrongKind {
                    node: id,
                    kind,
                    expected: "fact-activated node",
                })
            }
        };

        match forward {
            Forward::Nothing => Ok(()),
            Forward::Fact(children) => {
                let mut failed = None;
                for child in children {
                    defer_action_error(&mut failed, self.activate_fact(child, fact))?;
                }
                failed.map_or(Ok(()), Err)
            }
            Forward::Tokens(children, tokens) => self.forward_tokens(&children, &tokens),
            Forward::Join => {
                let (children, tokens) = self.join_on_fact(id, fact)?;
                self.forward_tokens(&children, &tokens)
            }
        }
    }

    fn activate_token(&mut self, id: NodeId, token: &Token) -> Result<(), ReteError> {
        let policy = self.config.duplicates;
        let log_firings = self.config.log_firings;
        let kind = self.node(id)?.kind();
        trace!(node = %id, %kind, %token, "token activation");

        let forward = match &mut self.nodes[id.index()] {
            Node::PartialMatchMemory(node) => {
                if node.tokens.insert(token.clone(), policy) {
                    Forward::Tokens(fanout(&node.children), vec![token.clone()])
                } else {
                    trace!(node = %id, %token, "token already stored");
                    Forward::Nothing
                }
            }
            Node::Join(_) => Forward::Join,
            Node::Terminal(node) => {
                if log_firings {
                    info!(rule = %node.name, %token, "rule fired");
                }
                (node.action)(&node.name, token).map_err(|source| ReteError::Action {
                    rule: node.name.clone(),
                    source,
                })?;
                self.counters.rules_fired += 1;
                Forward::Nothing
            }
            Node::Root(_) | Node::Condition(_) | Node::FactMemory(_) | Node::Adapter(_) => {
                return Err(ReteError::WrongKind {
                    node: id,
                    kind,
                    expected: "token-activated node",
                })
            }
        };

        match forward {
            Forward::Nothing | Forward::Fact(_) => Ok(()),
            Forward::Tokens(children, tokens) => self.forward_tokens(&children, &tokens),
            Forward::Join => {
                let (children, tokens) = self.join_on_token(id, token)?;
                self.forward_tokens(&children, &tokens)
            }
        }
    }

    fn forward_tokens(&mut self, children: &[NodeId], tokens: &[Token]) -> Result<(), ReteError> {
        let mut failed = None;
        for token in tokens {
            for child in children {
                defer_action_error(&mut failed, self.activate_token(*child, token))?;
            }
        }
        failed.map_or(Ok(()), Err)
    }

    fn join_node(&self, id: NodeId) -> Result<&JoinNode, ReteError> {
        match self.node(id)? {
            Node::Join(join) => Ok(join),
            other => Err(ReteError::WrongKind {
                node: id,
                kind: other.kind(),
                expected: "join",
            }),
        }
    }

    fn join_on_fact(&mut self, id: NodeId, fact: &Arc<Fact>) -> Result<(Vec<NodeId>, Vec<Token>), ReteError> {
        let join = self.join_node(id)?;
        let stored: &[Token] = match join.token_parent {
            Some(parent) => self.tokens(parent)?,
            None => &[],
        };
        let attempts = stored.len();
        let tokens = join.on_fact(fact, stored);
        let children = fanout(&join.children);
        trace!(node = %id, attempts, emitted = tokens.len(), "join on fact");
        self.record_join(attempts, tokens.len());
        Ok((children, tokens))
    }

    fn join_on_token(&mut self, id: NodeId, token: &Token) -> Result<(Vec<NodeId>, Vec<Token>), ReteError> {
        let join = self.join_node(id)?;
        let stored: &[Arc<Fact>] = match join.fact_parent {
            Some(parent) => self.facts(parent)?,
            None => &[],
        };
        let attempts = stored.len();
        let tokens = join.on_token(token, stored);
        let children = fanout(&join.children);
        trace!(node = %id, attempts, emitted = tokens.len(), "join on token");
        self.record_join(attempts, tokens.len());
        Ok((children, tokens))
    }

    fn record_join(&mut self, attempts: usize, emitted: usize) {
        self.counters.join_attempts += attempts as u64;
        self.counters.tokens_emitted += emitted as u64;
    }
}

/// Children in activation order: most recently attached first.
fn fanout(children: &[NodeId]) -> Vec<NodeId> {
    children.iter().rev().copied().collect()
}

/// Record an action failure and let propagation carry on; other errors abort.
fn defer_action_error(failed: &mut Option<ReteError>, result: Result<(), ReteError>) -> Result<(), ReteError> {
    match result {
        Err(err @ ReteError::Action { .. }) => {
            if failed.is_none() {
                *failed = Some(err);
            }
            Ok(())
        }
        other => other,
    }
}
