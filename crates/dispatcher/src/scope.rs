//! AttrScope - accumulated groups and bound attributes
//!
//! Every sink that must know the *effective* attribute set of a record (the
//! routable sink for predicate evaluation, leaf sinks for rendering) carries
//! an `AttrScope`. It is a plain value: deriving returns a new scope.
//!
//! ```text
//!   sink.with_group("user").with_attrs([id=u1]).with_group("req").with_attrs([path=/x])
//!
//!   groups = [user, req]
//!   attrs  = [ user={ id=u1 req={ path=/x } } ]
//! ```

use contracts::{Attr, Key, Record, Value};

/// Groups in scope plus attributes bound so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrScope {
    groups: Vec<Key>,
    attrs: Vec<Attr>,
}

impl AttrScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open group path, outermost first
    pub fn groups(&self) -> &[Key] {
        &self.groups
    }

    /// Bound attributes, already nested under their groups
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.attrs.is_empty()
    }

    /// Bind `attrs` under the currently open group path
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        Self {
            groups: self.groups.clone(),
            attrs: append_attrs_to_group(&self.groups, &self.attrs, attrs),
        }
    }

    /// Open a group. An empty name leaves the scope unchanged.
    pub fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        let mut groups = self.groups.clone();
        groups.push(Key::from(name));
        Self {
            groups,
            attrs: self.attrs.clone(),
        }
    }

    /// Effective attribute list of `record` in this scope: bound attributes
    /// followed by the record's own attributes wrapped in the open groups.
    pub fn merged_attrs(&self, record: &Record) -> Vec<Attr> {
        let mut out = Vec::with_capacity(self.attrs.len() + record.num_attrs());
        out.extend(self.attrs.iter().cloned());
        out.extend(
            record
                .attrs()
                .iter()
                .cloned()
                .map(|attr| nest_in_groups(&self.groups, attr)),
        );
        out
    }

    /// Record-shaped view with the effective attribute set, for predicates.
    /// The input record is left untouched.
    pub fn synthesize(&self, record: &Record) -> Record {
        let mut view = record.derive();
        view.add_attrs(self.merged_attrs(record));
        view
    }
}

fn nest_in_groups(groups: &[Key], attr: Attr) -> Attr {
    groups
        .iter()
        .rev()
        .fold(attr, |inner, group| Attr::group(group.clone(), vec![inner]))
}

/// Append `new` under the group path `groups` inside `actual`, descending
/// into an existing group attribute of the same name at each level and
/// creating it when missing.
pub fn append_attrs_to_group(groups: &[Key], actual: &[Attr], new: Vec<Attr>) -> Vec<Attr> {
    let mut out = actual.to_vec();
    let Some((head, rest)) = groups.split_first() else {
        out.extend(new);
        return out;
    };

    if let Some(slot) = out
        .iter_mut()
        .find(|attr| attr.key == *head && attr.is_group())
    {
        if let Value::Group(children) = &slot.value {
            slot.value = Value::Group(append_attrs_to_group(rest, children, new));
        }
        return out;
    }

    out.push(Attr::group(
        head.clone(),
        append_attrs_to_group(rest, &[], new),
    ));
    out
}

/// Walk attributes depth-first as `(dotted path, value)` pairs. Group
/// attributes are visited themselves before their children; a group with an
/// empty key is inlined into its parent.
pub fn walk_attrs<'a>(attrs: &'a [Attr], visit: &mut dyn FnMut(&str, &'a Value) -> bool) -> bool {
    walk_prefixed(attrs, "", visit)
}

fn walk_prefixed<'a>(
    attrs: &'a [Attr],
    prefix: &str,
    visit: &mut dyn FnMut(&str, &'a Value) -> bool,
) -> bool {
    for attr in attrs {
        let path = match (prefix.is_empty(), attr.key.is_empty()) {
            (true, _) => attr.key.to_string(),
            (false, true) => prefix.to_string(),
            (false, false) => format!("{prefix}.{}", attr.key),
        };

        if let Value::Group(children) = &attr.value {
            if !attr.key.is_empty() && !visit(&path, &attr.value) {
                return false;
            }
            if !walk_prefixed(children, &path, visit) {
                return false;
            }
        } else if !visit(&path, &attr.value) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Level;

    fn paths(attrs: &[Attr]) -> Vec<String> {
        let mut out = Vec::new();
        walk_attrs(attrs, &mut |path, value| {
            out.push(format!("{path}={value}"));
            true
        });
        out
    }

    #[test]
    fn test_attrs_nest_under_open_groups() {
        let scope = AttrScope::new()
            .with_group("user")
            .with_attrs(vec![Attr::new("id", "u1")])
            .with_group("req")
            .with_attrs(vec![Attr::new("path", "/x")]);

        assert_eq!(scope.groups(), &[Key::from("user"), Key::from("req")]);
        assert_eq!(
            scope.attrs(),
            &[Attr::group(
                "user",
                vec![
                    Attr::new("id", "u1"),
                    Attr::group("req", vec![Attr::new("path", "/x")]),
                ]
            )]
        );
    }

    #[test]
    fn test_empty_group_is_noop() {
        let scope = AttrScope::new().with_attrs(vec![Attr::new("a", 1i64)]);
        assert_eq!(scope.with_group(""), scope);
    }

    #[test]
    fn test_derivation_leaves_parent_untouched() {
        let parent = AttrScope::new().with_group("g");
        let _child = parent.with_attrs(vec![Attr::new("a", 1i64)]);
        assert!(parent.attrs().is_empty());
    }

    #[test]
    fn test_synthesize_wraps_record_attrs() {
        let scope = AttrScope::new()
            .with_attrs(vec![Attr::new("scope", "influx")])
            .with_group("db");
        let record = Record::now(Level::Info, "query").with_attr(Attr::new("sql", "SELECT 1"));

        let view = scope.synthesize(&record);

        assert_eq!(record.num_attrs(), 1);
        assert_eq!(
            paths(view.attrs()),
            vec!["scope=influx", "db={sql=SELECT 1}", "db.sql=SELECT 1"]
        );
        assert_eq!(view.message, "query");
    }

    #[test]
    fn test_walk_inlines_empty_group_keys() {
        let attrs = vec![Attr::group(
            "a",
            vec![Attr::group("", vec![Attr::new("b", true)])],
        )];
        assert_eq!(paths(&attrs), vec!["a={={b=true}}", "a.b=true"]);
    }
}
