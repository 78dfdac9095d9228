//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{ConfigValue, NodeConfig, PredicateConfig, TopologyBlueprint};
use serde::Serialize;
use tracing::{info, instrument};

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    recover: bool,
    sinks: Vec<SinkInfo>,
    root: NodeInfo,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    min_level: String,
}

#[derive(Serialize)]
struct NodeInfo {
    strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    first_match: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    predicates: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NodeInfo>,
}

/// Execute the `info` command
#[instrument(name = "cli_info", skip(args), fields(config = %args.config.display()))]
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!("Loading configuration info");

    let blueprint = load_blueprint(&args.config)?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &TopologyBlueprint) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        recover: blueprint.recover,
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                min_level: s.min_level.to_string(),
            })
            .collect(),
        root: build_node_info(&blueprint.root, Vec::new()),
    }
}

fn build_node_info(node: &NodeConfig, predicates: Vec<String>) -> NodeInfo {
    let mut info = NodeInfo {
        strategy: node.strategy().to_string(),
        name: None,
        first_match: false,
        predicates,
        children: Vec::new(),
    };
    match node {
        NodeConfig::Sink { name } => info.name = Some(name.clone()),
        NodeConfig::Fanout { members }
        | NodeConfig::Failover { members }
        | NodeConfig::Pool { members } => {
            info.children = members
                .iter()
                .map(|m| build_node_info(m, Vec::new()))
                .collect();
        }
        NodeConfig::Router {
            routes,
            first_match,
        } => {
            info.first_match = *first_match;
            info.children = routes
                .iter()
                .map(|r| {
                    build_node_info(
                        &r.target,
                        r.predicates.iter().map(describe_predicate).collect(),
                    )
                })
                .collect();
        }
    }
    info
}

/// One-line description of a predicate, e.g. `level_is [error, warn]`
fn describe_predicate(predicate: &PredicateConfig) -> String {
    let levels = |levels: &[contracts::Level]| {
        levels
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    match predicate {
        PredicateConfig::LevelIs { levels: l } => format!("level_is [{}]", levels(l)),
        PredicateConfig::LevelIsNot { levels: l } => format!("level_is_not [{}]", levels(l)),
        PredicateConfig::MessageIs { message } => format!("message_is {message:?}"),
        PredicateConfig::MessageIsNot { message } => format!("message_is_not {message:?}"),
        PredicateConfig::MessageContains { part } => format!("message_contains {part:?}"),
        PredicateConfig::MessageNotContains { part } => format!("message_not_contains {part:?}"),
        PredicateConfig::AttrValueIs { attrs } => {
            let pairs: Vec<String> = attrs
                .iter()
                .map(|(k, v)| match v {
                    ConfigValue::String(s) => format!("{k}={s:?}"),
                    ConfigValue::Int(i) => format!("{k}={i}"),
                    ConfigValue::Float(f) => format!("{k}={f}"),
                    ConfigValue::Bool(b) => format!("{k}={b}"),
                })
                .collect();
            format!("attr_value_is {{{}}}", pairs.join(" "))
        }
        PredicateConfig::AttrKindIs { attrs } => {
            let pairs: Vec<String> = attrs.iter().map(|(k, v)| format!("{k}:{v:?}")).collect();
            format!("attr_kind_is {{{}}}", pairs.join(" "))
        }
    }
}

fn print_config_info(blueprint: &TopologyBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  sinkmux Topology                            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("⚙️  Settings");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   └─ Recover: {}", blueprint.recover);

    println!("\n📤 Sinks ({})", blueprint.sinks.len());
    for (i, sink) in blueprint.sinks.iter().enumerate() {
        let is_last = i == blueprint.sinks.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        println!(
            "   {} {} ({:?}, min level {})",
            prefix, sink.name, sink.sink_type, sink.min_level
        );
    }

    println!("\n🌳 Topology");
    let root = build_node_info(&blueprint.root, Vec::new());
    for line in render_tree(&root) {
        println!("   {}", line);
    }

    println!();
}

/// Tree rendering, one line per node
fn render_tree(root: &NodeInfo) -> Vec<String> {
    let mut lines = vec![node_label(root)];
    render_children(&root.children, "", &mut lines);
    lines
}

fn render_children(children: &[NodeInfo], indent: &str, lines: &mut Vec<String>) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_indent = if is_last { "   " } else { "│  " };
        lines.push(format!("{indent}{prefix} {}", node_label(child)));
        render_children(&child.children, &format!("{indent}{child_indent}"), lines);
    }
}

fn node_label(node: &NodeInfo) -> String {
    let mut label = match &node.name {
        Some(name) => format!("sink {name}"),
        None if node.first_match => format!("{} (first match)", node.strategy),
        None => node.strategy.clone(),
    };
    if !node.predicates.is_empty() {
        label.push_str(&format!("  when {}", node.predicates.join(" and ")));
    }
    label
}
