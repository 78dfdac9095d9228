//! Middleware Pipeline Example
//!
//! Two middlewares in front of a log sink:
//! - error formatting: an `error` attribute holding an error value becomes a
//!   `{message, source}` group
//! - GDPR: attributes and groups whose key looks like user data are masked,
//!   both on the record and on attributes bound with `with`
//!
//! Run with: cargo run -p demos --bin pipe

use std::sync::Arc;

use contracts::{Attr, Context, Level, Record, Sink, SinkError, SinkRef, Value};
use dispatcher::{InlineMiddleware, LogSink, Logger, Middleware, MiddlewareRef, Pipe};

const MASK: &str = "*******";

fn might_contain_pii(key: &str) -> bool {
    key == "user"
        || key.starts_with("user_")
        || key.starts_with("user-")
        || key.starts_with("user.")
}

fn anonymize(attr: Attr) -> Attr {
    match attr.value {
        Value::Group(children) => {
            Attr::group(attr.key, children.into_iter().map(anonymize).collect())
        }
        _ => Attr::new(attr.key, MASK),
    }
}

/// Masks personal data before it reaches the next sink
struct Gdpr;

impl Middleware for Gdpr {
    fn wrap(&self, next: SinkRef) -> SinkRef {
        Arc::new(GdprSink {
            next,
            anonymize: false,
        })
    }
}

struct GdprSink {
    next: SinkRef,
    // set once a PII-looking group is open: everything below it is masked
    anonymize: bool,
}

impl GdprSink {
    fn scrub(&self, attr: Attr) -> Attr {
        if self.anonymize || might_contain_pii(&attr.key) {
            anonymize(attr)
        } else {
            attr
        }
    }
}

impl Sink for GdprSink {
    fn name(&self) -> &str {
        self.next.name()
    }

    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.next.enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, record: Record) -> Result<(), SinkError> {
        let mut scrubbed = record.derive();
        scrubbed.add_attrs(record.into_attrs().into_iter().map(|a| self.scrub(a)));
        self.next.handle(ctx, scrubbed)
    }

    fn with_attrs(self: Arc<Self>, attrs: Vec<Attr>) -> SinkRef {
        let attrs = attrs.into_iter().map(|a| self.scrub(a)).collect();
        Arc::new(GdprSink {
            next: self.next.clone().with_attrs(attrs),
            anonymize: self.anonymize,
        })
    }

    fn with_group(self: Arc<Self>, name: &str) -> SinkRef {
        if name.is_empty() {
            return self;
        }
        Arc::new(GdprSink {
            next: self.next.clone().with_group(name),
            anonymize: self.anonymize || might_contain_pii(name),
        })
    }
}

/// `error=<error value>` becomes `error={message=.. source=..}`
fn error_formatting() -> InlineMiddleware {
    InlineMiddleware::new().on_handle(|ctx, record, next| {
        let mut formatted = record.derive();
        formatted.add_attrs(record.into_attrs().into_iter().map(|attr| {
            match (&*attr.key, &attr.value) {
                ("error", Value::Error(err)) => {
                    let mut fields = vec![Attr::new("message", err.to_string())];
                    if let Some(source) = err.source() {
                        fields.push(Attr::new("source", source.to_string()));
                    }
                    Attr::group("error", fields)
                }
                _ => attr,
            }
        }));
        next.handle(ctx, formatted)
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let middlewares: Vec<MiddlewareRef> = vec![Arc::new(error_formatting()), Arc::new(Gdpr)];
    let sink = Pipe::new(middlewares).build(Arc::new(LogSink::new("stderr")));

    Logger::new(sink)
        .with(vec![Attr::group(
            "user",
            vec![
                Attr::new("id", "user-123"),
                Attr::new("email", "user-123@example.com"),
            ],
        )])
        .with(vec![Attr::new("environment", "dev")])
        .error(
            "A message",
            vec![
                Attr::new("foo", "bar"),
                Attr::new("error", Value::error(std::io::Error::other("an error"))),
            ],
        )?;

    // expected attrs:
    //   user.id=******* user.email=******* environment=dev foo=bar error.message=an error

    Ok(())
}
