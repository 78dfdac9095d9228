//! Fault boundary around child sink calls
//!
//! A panic inside a child never unwinds past a composite: it is caught here
//! and turned into `SinkError::Panic`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use contracts::{Context, Record, Sink, SinkError};
use tracing::warn;

/// Call `sink.handle`, converting a panic into an error
pub fn try_handle(sink: &dyn Sink, ctx: &Context, record: Record) -> Result<(), SinkError> {
    match panic::catch_unwind(AssertUnwindSafe(|| sink.handle(ctx, record))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(sink = %sink.name(), panic = %message, "Sink panicked while handling record");
            Err(SinkError::panic(sink.name(), message))
        }
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(e) = payload.downcast_ref::<SinkError>() {
        e.to_string()
    } else {
        "unknown panic payload".to_string()
    }
}
