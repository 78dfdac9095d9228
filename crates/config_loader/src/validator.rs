//! 配置校验模块
//!
//! 校验规则：
//! - sink name 非空且唯一
//! - 拓扑中引用的 sink 必须已声明
//! - fanout / failover / pool 至少一个成员
//! - router 至少一条路由
//! - 谓词的 levels / attrs 非空

use std::collections::HashSet;

use contracts::{ContractError, NodeConfig, PredicateConfig, TopologyBlueprint};

/// 校验 TopologyBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &TopologyBlueprint) -> Result<(), ContractError> {
    let names = validate_sinks(blueprint)?;
    validate_node(&blueprint.root, "root", &names)?;
    Ok(())
}

/// 校验 sink 名称，返回已声明的名称集合
fn validate_sinks(blueprint: &TopologyBlueprint) -> Result<HashSet<&str>, ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(seen)
}

/// 递归校验拓扑节点
fn validate_node(
    node: &NodeConfig,
    path: &str,
    names: &HashSet<&str>,
) -> Result<(), ContractError> {
    match node {
        NodeConfig::Sink { name } => {
            if !names.contains(name.as_str()) {
                return Err(ContractError::config_validation(
                    format!("{path}.name"),
                    format!("sink '{name}' is not declared in [[sinks]]"),
                ));
            }
        }
        NodeConfig::Fanout { members }
        | NodeConfig::Failover { members }
        | NodeConfig::Pool { members } => {
            if members.is_empty() {
                return Err(ContractError::config_validation(
                    format!("{path}.members"),
                    format!("{} needs at least one member", node.strategy()),
                ));
            }
            for (idx, member) in members.iter().enumerate() {
                validate_node(member, &format!("{path}.members[{idx}]"), names)?;
            }
        }
        NodeConfig::Router { routes, .. } => {
            if routes.is_empty() {
                return Err(ContractError::config_validation(
                    format!("{path}.routes"),
                    "router needs at least one route",
                ));
            }
            for (idx, route) in routes.iter().enumerate() {
                let route_path = format!("{path}.routes[{idx}]");
                for (p_idx, predicate) in route.predicates.iter().enumerate() {
                    validate_predicate(predicate, &format!("{route_path}.predicates[{p_idx}]"))?;
                }
                validate_node(&route.target, &format!("{route_path}.target"), names)?;
            }
        }
    }
    Ok(())
}

/// 校验谓词参数
fn validate_predicate(predicate: &PredicateConfig, path: &str) -> Result<(), ContractError> {
    let empty = match predicate {
        PredicateConfig::LevelIs { levels } | PredicateConfig::LevelIsNot { levels } => {
            levels.is_empty().then_some("levels")
        }
        PredicateConfig::AttrValueIs { attrs } => attrs.is_empty().then_some("attrs"),
        PredicateConfig::AttrKindIs { attrs } => attrs.is_empty().then_some("attrs"),
        _ => None,
    };
    match empty {
        Some(field) => Err(ContractError::config_validation(
            format!("{path}.{field}"),
            format!("{field} cannot be empty"),
        )),
        None => Ok(()),
    }
}
