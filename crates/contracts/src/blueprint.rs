//! TopologyBlueprint - Config Loader output
//!
//! Describes a sink topology: the named leaf sinks, and the tree of
//! dispatch strategies and routes built on top of them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Level, Value, ValueKind};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete topology blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Wrap the root in a recovery wrapper that logs failures
    #[serde(default)]
    pub recover: bool,

    /// Named leaf sinks
    pub sinks: Vec<SinkConfig>,

    /// Dispatch tree
    pub root: NodeConfig,
}

/// Leaf sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name, referenced from the dispatch tree
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Minimum enabled level
    #[serde(default)]
    pub min_level: Level,
}

/// Leaf sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Emit through `tracing`
    Log,
    /// Keep records in memory
    Memory,
}

/// One node of the dispatch tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum NodeConfig {
    /// Reference to a named leaf sink
    Sink { name: String },
    /// Send to every member
    Fanout { members: Vec<NodeConfig> },
    /// First member that succeeds
    Failover { members: Vec<NodeConfig> },
    /// Random rotation start, then failover
    Pool { members: Vec<NodeConfig> },
    /// Predicate-based routing
    Router {
        routes: Vec<RouteConfig>,
        #[serde(default)]
        first_match: bool,
    },
}

impl NodeConfig {
    /// Strategy name as written in configuration files
    pub fn strategy(&self) -> &'static str {
        match self {
            NodeConfig::Sink { .. } => "sink",
            NodeConfig::Fanout { .. } => "fanout",
            NodeConfig::Failover { .. } => "failover",
            NodeConfig::Pool { .. } => "pool",
            NodeConfig::Router { .. } => "router",
        }
    }

    /// Direct children of this node
    pub fn children(&self) -> Vec<&NodeConfig> {
        match self {
            NodeConfig::Sink { .. } => Vec::new(),
            NodeConfig::Fanout { members }
            | NodeConfig::Failover { members }
            | NodeConfig::Pool { members } => members.iter().collect(),
            NodeConfig::Router { routes, .. } => routes.iter().map(|r| &r.target).collect(),
        }
    }
}

/// A router branch: target node plus predicates that must all pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    #[serde(default)]
    pub predicates: Vec<PredicateConfig>,
    pub target: NodeConfig,
}

/// Routing predicate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredicateConfig {
    LevelIs { levels: Vec<Level> },
    LevelIsNot { levels: Vec<Level> },
    MessageIs { message: String },
    MessageIsNot { message: String },
    MessageContains { part: String },
    MessageNotContains { part: String },
    AttrValueIs { attrs: BTreeMap<String, ConfigValue> },
    AttrKindIs { attrs: BTreeMap<String, ValueKind> },
}

/// Scalar value usable in configuration files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<&ConfigValue> for Value {
    fn from(v: &ConfigValue) -> Self {
        match v {
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Int(i) => Value::Int(*i),
            ConfigValue::Float(f) => Value::Float(*f),
            ConfigValue::String(s) => Value::String(s.clone()),
        }
    }
}
