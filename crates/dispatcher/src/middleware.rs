//! Middleware pipeline
//!
//! A middleware turns the next sink into a new sink. `Pipe` chains them in
//! declaration order: the first middleware is the outermost wrapper and sees
//! each record first; the terminal sink is innermost.
//!
//! ```text
//!   Pipe::new([m1, m2]).pipe(m3).build(sink)  ==  m1(m2(m3(sink)))
//! ```

use std::sync::Arc;

use contracts::SinkRef;

/// Sink transform
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: SinkRef) -> SinkRef;
}

impl<F> Middleware for F
where
    F: Fn(SinkRef) -> SinkRef + Send + Sync,
{
    fn wrap(&self, next: SinkRef) -> SinkRef {
        self(next)
    }
}

/// Shared middleware handle
pub type MiddlewareRef = Arc<dyn Middleware>;

/// Ordered middleware chain
#[derive(Clone, Default)]
pub struct Pipe {
    middlewares: Vec<MiddlewareRef>,
}

impl Pipe {
    pub fn new(middlewares: Vec<MiddlewareRef>) -> Self {
        Self { middlewares }
    }

    /// Append a middleware to the end of the chain (closest to the sink)
    pub fn pipe(mut self, middleware: MiddlewareRef) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Wrap `sink`. The pipe is left intact and can be built again.
    pub fn build(&self, sink: SinkRef) -> SinkRef {
        self.middlewares
            .iter()
            .rev()
            .fold(sink, |next, middleware| middleware.wrap(next))
    }
}
