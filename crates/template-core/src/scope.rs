use std::fmt;

use itertools::Itertools;
use serde_json::Value;

/// One step into the data graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPart {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPart::Key(key) => f.write_str(key),
            PathPart::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Resolves the value bound to a scope path.
pub trait ScopeResolver: Send + Sync {
    fn resolve<'d>(&self, path: &[PathPart], data: &'d Value) -> Option<&'d Value>;
}

/// Looks the last key up in the innermost scope first, then in each
/// enclosing scope out to the root.
///
/// For `[items, 0, name]` the candidates are `items[0].name`, `items.name`
/// and `name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScopeResolver;

impl ScopeResolver for LexicalScopeResolver {
    fn resolve<'d>(&self, path: &[PathPart], data: &'d Value) -> Option<&'d Value> {
        let Some((last, prefix)) = path.split_last() else {
            return Some(data);
        };
        (0..=prefix.len()).rev().find_map(|depth| {
            let scope = walk(data, &prefix[..depth])?;
            step(scope, last)
        })
    }
}

fn walk<'d>(data: &'d Value, parts: &[PathPart]) -> Option<&'d Value> {
    parts.iter().try_fold(data, step)
}

fn step<'d>(value: &'d Value, part: &PathPart) -> Option<&'d Value> {
    match (value, part) {
        (Value::Object(map), PathPart::Key(key)) => map.get(key),
        (Value::Array(items), PathPart::Index(index)) => items.get(*index),
        (Value::Array(items), PathPart::Key(key)) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// The scope path stack plus the data it points into.
pub struct ScopeData<'d> {
    path: Vec<PathPart>,
    data: &'d Value,
    resolver: &'d dyn ScopeResolver,
}

impl<'d> ScopeData<'d> {
    pub fn new(data: &'d Value, resolver: &'d dyn ScopeResolver) -> Self {
        Self {
            path: Vec::new(),
            data,
            resolver,
        }
    }

    pub fn path(&self) -> &[PathPart] {
        &self.path
    }

    pub fn data(&self) -> &'d Value {
        self.data
    }

    pub fn push(&mut self, part: PathPart) {
        self.path.push(part);
    }

    pub fn pop(&mut self) -> Option<PathPart> {
        self.path.pop()
    }

    /// Dotted form of the current path, e.g. `items.0.name`.
    pub fn path_string(&self) -> String {
        self.path.iter().join(".")
    }

    /// The value bound to the current path, if any.
    pub fn scope_value(&self) -> Option<&'d Value> {
        self.resolver.resolve(&self.path, self.data)
    }

    /// Runs `f` with `part` pushed, popping it again whatever `f` returns.
    pub fn with_part<T>(&mut self, part: PathPart, f: impl FnOnce(&mut Self) -> T) -> T {
        let depth = self.path.len();
        self.path.push(part);
        let result = f(self);
        self.path.truncate(depth);
        result
    }
}

impl fmt::Debug for ScopeData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeData")
            .field("path", &self.path_string())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(k: &str) -> PathPart {
        PathPart::Key(k.to_string())
    }

    #[test]
    fn resolves_nested_values() {
        let data = json!({"items": [{"name": "a"}, {"name": "b"}]});
        let resolver = LexicalScopeResolver;
        let mut scope = ScopeData::new(&data, &resolver);
        scope.push(key("items"));
        scope.push(PathPart::Index(1));
        scope.push(key("name"));
        assert_eq!(scope.scope_value(), Some(&json!("b")));
        assert_eq!(scope.path_string(), "items.1.name");
    }

    #[test]
    fn falls_back_to_enclosing_scopes() {
        let data = json!({"title": "root", "items": [{"name": "a"}]});
        let resolver = LexicalScopeResolver;
        let mut scope = ScopeData::new(&data, &resolver);
        for part in [key("items"), PathPart::Index(0), key("title")] {
            scope.push(part);
        }
        assert_eq!(scope.scope_value(), Some(&json!("root")));
        scope.pop();
        scope.push(key("missing"));
        assert_eq!(scope.scope_value(), None);
    }

    #[test]
    fn with_part_restores_depth() {
        let data = json!({});
        let resolver = LexicalScopeResolver;
        let mut scope = ScopeData::new(&data, &resolver);
        scope.push(key("outer"));
        let result: Result<(), &str> = scope.with_part(PathPart::Index(3), |inner| {
            inner.push(key("leaked"));
            Err("failure")
        });
        assert!(result.is_err());
        assert_eq!(scope.path(), &[key("outer")]);
    }

    #[test]
    fn empty_path_resolves_to_root() {
        let data = json!({"a": 1});
        let resolver = LexicalScopeResolver;
        let scope = ScopeData::new(&data, &resolver);
        assert_eq!(scope.scope_value(), Some(&data));
    }
}
