//! `validate` command implementation.

use std::collections::HashSet;

use anyhow::{Context, Result};
use contracts::{NodeConfig, TopologyBlueprint};
use serde::Serialize;
use tracing::{info, instrument};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    root_strategy: String,
    sink_count: usize,
    node_count: usize,
    depth: usize,
    recover: bool,
}

/// Execute the `validate` command
#[instrument(name = "cli_validate", skip(args), fields(config = %args.config.display()))]
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!("Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    root_strategy: blueprint.root.strategy().to_string(),
                    sink_count: blueprint.sinks.len(),
                    node_count: count_nodes(&blueprint.root),
                    depth: depth(&blueprint.root),
                    recover: blueprint.recover,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn count_nodes(node: &NodeConfig) -> usize {
    1 + node.children().into_iter().map(count_nodes).sum::<usize>()
}

fn depth(node: &NodeConfig) -> usize {
    1 + node.children().into_iter().map(depth).max().unwrap_or(0)
}

fn collect_references<'a>(node: &'a NodeConfig, out: &mut HashSet<&'a str>) {
    if let NodeConfig::Sink { name } = node {
        out.insert(name.as_str());
    }
    for child in node.children() {
        collect_references(child, out);
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &TopologyBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    let mut referenced = HashSet::new();
    collect_references(&blueprint.root, &mut referenced);
    for sink in &blueprint.sinks {
        if !referenced.contains(sink.name.as_str()) {
            warnings.push(format!(
                "Sink '{}' is declared but never used in the topology",
                sink.name
            ));
        }
    }

    check_routers(&blueprint.root, &mut warnings);

    if !blueprint.recover {
        warnings.push("recover is disabled - sink failures are only returned to the caller".to_string());
    }

    warnings
}

fn check_routers(node: &NodeConfig, warnings: &mut Vec<String>) {
    if let NodeConfig::Router {
        routes,
        first_match: true,
    } = node
    {
        let has_catch_all = routes.iter().any(|r| r.predicates.is_empty());
        if !has_catch_all {
            warnings.push(
                "first_match router has no catch-all route - unmatched records are dropped"
                    .to_string(),
            );
        }
    }
    for child in node.children() {
        check_routers(child, warnings);
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Root: {}", summary.root_strategy);
            println!("  Sinks: {}", summary.sink_count);
            println!("  Nodes: {} (depth {})", summary.node_count, summary.depth);
            println!("  Recover: {}", summary.recover);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::{ConfigFormat, ConfigLoader};

    const CONFIG: &str = r#"
[[sinks]]
name = "console"
sink_type = "log"

[[sinks]]
name = "spare"
sink_type = "memory"

[root]
strategy = "router"
first_match = true

[[root.routes]]
predicates = [{ type = "level_is", levels = ["error"] }]
target = { strategy = "fanout", members = [{ strategy = "sink", name = "console" }] }
"#;

    #[test]
    fn test_tree_measures() {
        let bp = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        assert_eq!(count_nodes(&bp.root), 3);
        assert_eq!(depth(&bp.root), 3);
    }

    #[test]
    fn test_warnings() {
        let bp = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let warnings = collect_warnings(&bp);
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert!(warnings[0].contains("'spare'"));
        assert!(warnings[1].contains("catch-all"));
        assert!(warnings[2].contains("recover is disabled"));
    }
}
