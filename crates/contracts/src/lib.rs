//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! record/attribute model, the `Sink` capability trait and the error types.
//! All other crates depend on this crate; reverse dependencies are prohibited.
//!
//! ## Record Model
//! - A `Record` carries time, `Level`, message and an ordered list of `Attr`
//! - Attributes nest through `Value::Group`; keys need not be unique
//! - Sinks derive new sinks through `with_attrs` / `with_group`, never by mutation

mod blueprint;
mod context;
mod error;
mod key;
mod level;
mod record;
mod sink;
mod value;

pub use blueprint::*;
pub use context::Context;
pub use error::*;
pub use key::Key;
pub use level::Level;
pub use record::Record;
pub use sink::{Sink, SinkRef};
pub use value::{Attr, Value, ValueKind};
