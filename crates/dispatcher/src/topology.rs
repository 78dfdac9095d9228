//! Topology builder - turns a `TopologyBlueprint` into a sink tree

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{
    NodeConfig, PredicateConfig, SinkConfig, SinkRef, SinkType, TopologyBlueprint, Value,
};
use tracing::{debug, info, instrument};

use crate::error::DispatcherError;
use crate::failover::failover;
use crate::fanout::fanout;
use crate::middleware::Middleware;
use crate::pool::pool;
use crate::predicate::{self, PredicateRef};
use crate::recover::Recover;
use crate::router::Router;
use crate::sinks::{LogSink, MemorySink};

/// Named leaf sinks available to the dispatch tree
#[derive(Default, Clone)]
pub struct LeafRegistry {
    sinks: HashMap<String, SinkRef>,
    memory: HashMap<String, MemorySink>,
}

impl LeafRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the leaves declared in `blueprint.sinks`
    #[instrument(
        name = "leaf_registry_from_blueprint",
        skip(blueprint),
        fields(sink_count = blueprint.sinks.len())
    )]
    pub fn from_blueprint(blueprint: &TopologyBlueprint) -> Result<Self, DispatcherError> {
        let mut registry = Self::new();
        for config in &blueprint.sinks {
            registry.create(config)?;
        }
        Ok(registry)
    }

    /// Register an externally built leaf. Replaces any leaf of the same name.
    pub fn register(&mut self, name: impl Into<String>, sink: SinkRef) {
        let name = name.into();
        self.memory.remove(&name);
        self.sinks.insert(name, sink);
    }

    /// Replace every leaf with `f(name, leaf)`, e.g. to install a middleware
    /// on all leaves. Memory handles keep observing the original buffers.
    pub fn map_leaves<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, SinkRef) -> SinkRef,
    {
        for (name, sink) in self.sinks.iter_mut() {
            *sink = f(name, sink.clone());
        }
    }

    /// Leaf names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sinks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn get(&self, name: &str) -> Option<&SinkRef> {
        self.sinks.get(name)
    }

    /// Handle to a memory leaf created from configuration
    pub fn memory(&self, name: &str) -> Option<&MemorySink> {
        self.memory.get(name)
    }

    /// Memory leaves, sorted by name
    pub fn memory_sinks(&self) -> Vec<(&str, &MemorySink)> {
        let mut out: Vec<_> = self
            .memory
            .iter()
            .map(|(name, sink)| (name.as_str(), sink))
            .collect();
        out.sort_by_key(|(name, _)| *name);
        out
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    #[instrument(
        name = "leaf_registry_create",
        skip(self, config),
        fields(sink = %config.name, sink_type = ?config.sink_type)
    )]
    fn create(&mut self, config: &SinkConfig) -> Result<(), DispatcherError> {
        if self.sinks.contains_key(&config.name) {
            return Err(DispatcherError::sink_creation(
                &config.name,
                "duplicate sink name",
            ));
        }
        match config.sink_type {
            SinkType::Log => {
                let sink = LogSink::new(&config.name).with_min_level(config.min_level);
                self.sinks.insert(config.name.clone(), Arc::new(sink));
            }
            SinkType::Memory => {
                let sink = MemorySink::new(&config.name).with_min_level(config.min_level);
                self.sinks
                    .insert(config.name.clone(), Arc::new(sink.clone()));
                self.memory.insert(config.name.clone(), sink);
            }
        }
        debug!(sink = %config.name, "Leaf sink created");
        Ok(())
    }
}

/// Build the sink tree described by `blueprint` over the leaves in `registry`
#[instrument(
    name = "build_topology",
    skip(blueprint, registry),
    fields(root = blueprint.root.strategy(), recover = blueprint.recover)
)]
pub fn build_topology(
    blueprint: &TopologyBlueprint,
    registry: &LeafRegistry,
) -> Result<SinkRef, DispatcherError> {
    let root = build_node(&blueprint.root, registry)?;
    let root = if blueprint.recover {
        Recover::logging().wrap(root)
    } else {
        root
    };
    info!(leaves = registry.len(), "Topology built");
    Ok(root)
}

fn build_node(node: &NodeConfig, registry: &LeafRegistry) -> Result<SinkRef, DispatcherError> {
    match node {
        NodeConfig::Sink { name } => registry
            .get(name)
            .cloned()
            .ok_or_else(|| DispatcherError::unknown_sink(name)),
        NodeConfig::Fanout { members } => Ok(fanout(build_members(members, registry)?)),
        NodeConfig::Failover { members } => Ok(failover(build_members(members, registry)?)),
        NodeConfig::Pool { members } => Ok(pool(build_members(members, registry)?)),
        NodeConfig::Router {
            routes,
            first_match,
        } => {
            let mut router = Router::new();
            for route in routes {
                let target = build_node(&route.target, registry)?;
                let predicates = route.predicates.iter().map(build_predicate).collect();
                router = router.add(target, predicates);
            }
            if *first_match {
                router = router.first_match();
            }
            Ok(router.build())
        }
    }
}

fn build_members(
    members: &[NodeConfig],
    registry: &LeafRegistry,
) -> Result<Vec<SinkRef>, DispatcherError> {
    members.iter().map(|m| build_node(m, registry)).collect()
}

/// Predicate described by a configuration entry
pub fn build_predicate(config: &PredicateConfig) -> PredicateRef {
    match config {
        PredicateConfig::LevelIs { levels } => predicate::level_is(levels.iter().copied()),
        PredicateConfig::LevelIsNot { levels } => predicate::level_is_not(levels.iter().copied()),
        PredicateConfig::MessageIs { message } => predicate::message_is(message.as_str()),
        PredicateConfig::MessageIsNot { message } => predicate::message_is_not(message.as_str()),
        PredicateConfig::MessageContains { part } => predicate::message_contains(part.as_str()),
        PredicateConfig::MessageNotContains { part } => {
            predicate::message_not_contains(part.as_str())
        }
        PredicateConfig::AttrValueIs { attrs } => predicate::attr_value_is(
            attrs
                .iter()
                .map(|(key, value)| (key.as_str(), Value::from(value))),
        ),
        PredicateConfig::AttrKindIs { attrs } => {
            predicate::attr_kind_is(attrs.iter().map(|(key, kind)| (key.as_str(), *kind)))
        }
    }
}
