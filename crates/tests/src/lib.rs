//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 组合 sink 的行为性质测试
//! - 配置文件 -> 拓扑 -> 投递的端到端测试

#[cfg(test)]
mod support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use contracts::{Level, SinkError, SinkRef};
    use dispatcher::InlineSink;

    /// Shared call journal: names of sinks in the order they handled records
    pub type Journal = Arc<Mutex<Vec<String>>>;

    pub fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// What a probe does when asked to handle a record
    #[derive(Clone, Copy)]
    pub enum Behavior {
        Succeed,
        Fail,
        Panic,
    }

    /// Test sink recording each call into `journal` and a call counter
    pub struct Probe {
        pub sink: SinkRef,
        calls: Arc<AtomicUsize>,
    }

    impl Probe {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    pub fn probe(name: &str, behavior: Behavior, journal: &Journal) -> Probe {
        probe_at(name, behavior, Level::Trace, journal)
    }

    pub fn probe_at(name: &str, behavior: Behavior, min: Level, journal: &Journal) -> Probe {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let journal = Arc::clone(journal);
        let label = name.to_string();
        let sink = InlineSink::new(
            name,
            move |_, _, level| level >= min,
            move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                journal.lock().unwrap().push(label.clone());
                match behavior {
                    Behavior::Succeed => Ok(()),
                    Behavior::Fail => Err(SinkError::write(label.as_str(), "refused")),
                    Behavior::Panic => panic!("{} exploded", label),
                }
            },
        );
        Probe {
            sink: Arc::new(sink),
            calls,
        }
    }
}

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod property_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use contracts::{Attr, Context, Level, Record, SinkError, SinkRef};
    use dispatcher::predicate::{attr_value_is, level_is, message_contains};
    use dispatcher::{
        failover, fanout, pool, InlineMiddleware, MemorySink, Metered, MiddlewareRef, Pipe, Recover,
        RoutableSink, Router,
    };

    use crate::support::{journal, probe, probe_at, Behavior};

    fn ctx() -> Context {
        Context::background()
    }

    fn record(level: Level, message: &str) -> Record {
        Record::now(level, message)
    }

    #[test]
    fn test_flatten_idempotence() {
        let j = journal();
        let a = probe("a", Behavior::Succeed, &j);
        let b = probe("b", Behavior::Succeed, &j);
        let c = probe("c", Behavior::Succeed, &j);

        let nested = fanout(vec![
            fanout(vec![a.sink.clone(), b.sink.clone()]),
            c.sink.clone(),
        ]);
        nested.handle(&ctx(), record(Level::Info, "x")).unwrap();
        let nested_order = std::mem::take(&mut *j.lock().unwrap());

        let flat = fanout(vec![a.sink.clone(), b.sink.clone(), c.sink.clone()]);
        flat.handle(&ctx(), record(Level::Info, "x")).unwrap();
        let flat_order = j.lock().unwrap().clone();

        assert_eq!(nested_order, vec!["a", "b", "c"]);
        assert_eq!(nested_order, flat_order);
        assert_eq!(nested.fanout_members().map(<[SinkRef]>::len), Some(3));
    }

    #[test]
    fn test_degenerate_fanout_is_the_child() {
        let j = journal();
        let x = probe("x", Behavior::Succeed, &j);
        let single = fanout(vec![x.sink.clone()]);
        assert!(Arc::ptr_eq(&single, &x.sink));
    }

    #[test]
    fn test_context_visibility_through_bound_attrs() {
        let memory = MemorySink::new("mem");
        let routable: SinkRef = Arc::new(RoutableSink::new(
            Arc::new(memory.clone()),
            vec![attr_value_is([("user.id", "u1")])],
        ));

        let derived = routable
            .with_group("user")
            .with_attrs(vec![Attr::new("id", "u1")])
            .with_group("req")
            .with_attrs(vec![Attr::new("path", "/x")]);

        derived.handle(&ctx(), record(Level::Info, "hit")).unwrap();
        assert_eq!(memory.len(), 1);

        // same predicate, no bound context: no match
        let plain = RoutableSink::new(
            Arc::new(MemorySink::new("other")),
            vec![attr_value_is([("user.id", "u1")])],
        );
        assert!(!plain.is_match(&ctx(), &record(Level::Info, "miss")));
    }

    #[test]
    fn test_first_match_short_circuit() {
        let j = journal();
        let first = probe("first", Behavior::Succeed, &j);
        let second = probe("second", Behavior::Succeed, &j);
        let third = probe("third", Behavior::Succeed, &j);

        let sink = Router::new()
            .add(first.sink.clone(), vec![message_contains("db")])
            .add(second.sink.clone(), vec![message_contains("db")])
            .add(third.sink.clone(), vec![])
            .first_match()
            .build();

        sink.handle(&ctx(), record(Level::Info, "db query")).unwrap();

        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
        assert_eq!(third.calls(), 0);
    }

    #[test]
    fn test_first_match_level_gate_drops_record() {
        let j = journal();
        let gated = probe_at("gated", Behavior::Succeed, Level::Error, &j);
        let fallback = probe("fallback", Behavior::Succeed, &j);

        let sink = Router::new()
            .add(gated.sink.clone(), vec![message_contains("db")])
            .add(fallback.sink.clone(), vec![message_contains("db")])
            .first_match()
            .build();

        sink.handle(&ctx(), record(Level::Info, "db query")).unwrap();

        assert_eq!(gated.calls(), 0);
        assert_eq!(fallback.calls(), 0);
    }

    #[test]
    fn test_failover_success_stops_iteration() {
        let j = journal();
        let a = probe("a", Behavior::Fail, &j);
        let b = probe("b", Behavior::Succeed, &j);
        let c = probe("c", Behavior::Fail, &j);

        let sink = failover(vec![a.sink.clone(), b.sink.clone(), c.sink.clone()]);
        sink.handle(&ctx(), record(Level::Info, "x")).unwrap();

        assert_eq!(*j.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(c.calls(), 0);
    }

    #[test]
    fn test_failover_exhaustion_returns_last_error() {
        let j = journal();
        let a = probe("a", Behavior::Fail, &j);
        let b = probe("b", Behavior::Panic, &j);

        let err = failover(vec![a.sink.clone(), b.sink.clone()])
            .handle(&ctx(), record(Level::Info, "x"))
            .unwrap_err();

        assert!(err.is_panic());
        assert!(err.to_string().contains("b exploded"));
    }

    #[test]
    fn test_pool_distribution() {
        const CALLS: usize = 6_000;
        const K: usize = 3;

        let j = journal();
        let probes: Vec<_> = (0..K)
            .map(|i| probe(&format!("p{i}"), Behavior::Succeed, &j))
            .collect();
        let sink = pool(probes.iter().map(|p| p.sink.clone()).collect());

        for _ in 0..CALLS {
            sink.handle(&ctx(), record(Level::Info, "x")).unwrap();
        }

        let expected = CALLS / K;
        for p in &probes {
            let calls = p.calls();
            assert!(
                calls > expected * 7 / 10 && calls < expected * 13 / 10,
                "uneven distribution: {calls} of {CALLS}"
            );
        }
        assert_eq!(probes.iter().map(|p| p.calls()).sum::<usize>(), CALLS);
    }

    #[test]
    fn test_pool_retries_on_failure() {
        let j = journal();
        let bad = probe("bad", Behavior::Fail, &j);
        let good = probe("good", Behavior::Succeed, &j);
        let sink = pool(vec![bad.sink.clone(), good.sink.clone()]);

        for _ in 0..50 {
            sink.handle(&ctx(), record(Level::Info, "x")).unwrap();
        }
        assert_eq!(good.calls(), 50);
    }

    #[test]
    fn test_empty_group_identity_for_every_composite() {
        let j = journal();
        let a = probe("a", Behavior::Succeed, &j).sink;
        let b = probe("b", Behavior::Succeed, &j).sink;

        let composites: Vec<(&str, SinkRef)> = vec![
            ("fanout", fanout(vec![a.clone(), b.clone()])),
            ("failover", failover(vec![a.clone(), b.clone()])),
            ("pool", pool(vec![a.clone(), b.clone()])),
            (
                "router",
                Router::new()
                    .add(a.clone(), vec![level_is([Level::Info])])
                    .add(b.clone(), vec![])
                    .build(),
            ),
            (
                "first_match",
                Router::new().add(a.clone(), vec![]).first_match().build(),
            ),
            (
                "routable",
                Arc::new(RoutableSink::new(a.clone(), vec![])) as SinkRef,
            ),
            ("recover", Pipe::default().pipe(Arc::new(Recover::logging())).build(a.clone())),
            ("metered", Pipe::default().pipe(Arc::new(Metered::new())).build(a.clone())),
            (
                "inline_middleware",
                Pipe::default()
                    .pipe(Arc::new(InlineMiddleware::new()))
                    .build(a.clone()),
            ),
        ];

        for (kind, sink) in composites {
            let same = sink.clone().with_group("");
            assert!(Arc::ptr_eq(&sink, &same), "{kind} wrapped on empty group");
        }
    }

    #[test]
    fn test_aggregate_error_completeness() {
        let j = journal();
        let one = probe("one", Behavior::Fail, &j);
        let two = probe("two", Behavior::Succeed, &j);
        let three = probe("three", Behavior::Panic, &j);

        let err = fanout(vec![one.sink.clone(), two.sink.clone(), three.sink.clone()])
            .handle(&ctx(), record(Level::Error, "x"))
            .unwrap_err();

        let members = err.errors();
        assert_eq!(members.len(), 2);
        assert!(matches!(members[0], SinkError::Write { sink_name, .. } if sink_name == "one"));
        assert!(matches!(members[1], SinkError::Panic { sink_name, .. } if sink_name == "three"));
        assert_eq!(two.calls(), 1);
    }

    #[test]
    fn test_recovery_never_suppresses() {
        let j = journal();
        let boom = probe("boom", Behavior::Panic, &j);
        let callbacks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&callbacks);

        let recover: MiddlewareRef = Arc::new(Recover::new(move |_, _, err| {
            assert!(!err.to_string().is_empty());
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let sink = Pipe::new(vec![recover]).build(boom.sink.clone());

        let result = sink.handle(&ctx(), record(Level::Info, "x"));

        assert!(result.is_err());
        assert_eq!(callbacks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_derivation_does_not_touch_parent() {
        let memory = MemorySink::new("mem");
        let parent: SinkRef = Arc::new(memory.clone());
        let _child = parent.clone().with_attrs(vec![Attr::new("k", "v")]);

        parent.handle(&ctx(), record(Level::Info, "x")).unwrap();
        assert!(memory.records()[0].attrs().is_empty());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Attr, Level};
    use dispatcher::{build_topology, LeafRegistry, Logger};

    const TOPOLOGY: &str = r#"
recover = true

[[sinks]]
name = "errors"
sink_type = "memory"

[[sinks]]
name = "db"
sink_type = "memory"
min_level = "debug"

[[sinks]]
name = "everything"
sink_type = "memory"
min_level = "trace"

[root]
strategy = "fanout"

[[root.members]]
strategy = "router"
first_match = true

[[root.members.routes]]
predicates = [{ type = "level_is", levels = ["error"] }]
target = { strategy = "sink", name = "errors" }

[[root.members.routes]]
predicates = [{ type = "attr_value_is", attrs = { scope = "db" } }]
target = { strategy = "sink", name = "db" }

[[root.members]]
strategy = "failover"
members = [{ strategy = "sink", name = "everything" }]
"#;

    /// End-to-end test: 配置文件 -> LeafRegistry -> 拓扑 -> Logger
    ///
    /// 验证完整的数据流：
    /// 1. ConfigLoader 从文件加载并校验拓扑
    /// 2. build_topology 构建 sink 树
    /// 3. Logger 派生上下文并投递记录
    #[test]
    fn test_e2e_config_to_delivery() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(TOPOLOGY.as_bytes()).unwrap();

        let blueprint = ConfigLoader::load_from_path(file.path()).unwrap();
        let registry = LeafRegistry::from_blueprint(&blueprint).unwrap();
        let root = build_topology(&blueprint, &registry).unwrap();

        let logger = Logger::new(root);
        let db_logger = logger.with(vec![Attr::new("scope", "db")]);

        db_logger
            .debug("SELECT 1", vec![Attr::new("rows", 1i64)])
            .unwrap();
        db_logger.error("deadlock", vec![]).unwrap();
        logger.info("started", vec![]).unwrap();

        let messages = |name: &str| -> Vec<String> {
            registry
                .memory(name)
                .unwrap()
                .records()
                .into_iter()
                .map(|r| r.message)
                .collect()
        };

        assert_eq!(messages("errors"), vec!["deadlock"]);
        assert_eq!(messages("db"), vec!["SELECT 1"]);
        assert_eq!(messages("everything"), vec!["SELECT 1", "deadlock", "started"]);

        let db_record = &registry.memory("db").unwrap().records()[0];
        assert_eq!(
            db_record.attrs(),
            &[Attr::new("scope", "db"), Attr::new("rows", 1i64)]
        );
        assert_eq!(db_record.level, Level::Debug);
    }

    #[test]
    fn test_json_round_trip_builds_same_topology() {
        let blueprint = ConfigLoader::load_from_str(TOPOLOGY, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&blueprint).unwrap();
        let reparsed = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        let registry = LeafRegistry::from_blueprint(&reparsed).unwrap();
        let root = build_topology(&reparsed, &registry).unwrap();
        Logger::new(root).error("boom", vec![]).unwrap();

        assert_eq!(registry.memory("errors").unwrap().len(), 1);
        assert_eq!(registry.memory("everything").unwrap().len(), 1);
    }
}
