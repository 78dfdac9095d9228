//! # Dispatcher
//!
//! Composable sink tree.
//!
//! Provides:
//! - Dispatch strategies: fanout, failover, pool, router (fan or first-match)
//! - Routing predicates evaluated against bound context
//! - Middleware pipeline, recovery and metering wrappers
//! - Leaf sinks and a topology builder for configuration files

pub mod error;
pub mod failover;
pub mod fanout;
pub mod fault;
pub mod first_match;
pub mod logger;
pub mod metrics;
pub mod middleware;
pub mod middleware_inline;
pub mod pool;
pub mod predicate;
pub mod recover;
pub mod routable;
pub mod router;
pub mod scope;
pub mod sinks;
pub mod topology;

pub use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef, Value, ValueKind};
pub use error::DispatcherError;
pub use failover::{failover, Failover};
pub use fanout::{fanout, Fanout};
pub use first_match::FirstMatch;
pub use logger::Logger;
pub use metrics::{Metered, MetricsSnapshot, SinkMetrics};
pub use middleware::{Middleware, MiddlewareRef, Pipe};
pub use middleware_inline::InlineMiddleware;
pub use pool::{pool, Pool};
pub use predicate::{Predicate, PredicateRef};
pub use recover::{Recover, RecoveryFn};
pub use routable::RoutableSink;
pub use router::Router;
pub use scope::AttrScope;
pub use sinks::{InlineSink, LogSink, MemorySink};
pub use topology::{build_predicate, build_topology, LeafRegistry};
