use crate::error::ContextError;
use crate::value::Value;
use indexmap::IndexMap;

/// A single layer of name bindings.
pub type Scope = IndexMap<String, Value>;

/// Evaluation context: a stack of scopes, innermost last.
///
/// Lookups scan from the innermost scope outwards and return the first
/// binding found, so pushed scopes shadow the ones below them.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    scopes: Vec<Scope>,
}

impl Context {
    /// Creates a context with `base` as its only scope.
    pub fn new(base: Scope) -> Self {
        Context { scopes: vec![base] }
    }

    /// Returns the value bound to `name` in the innermost scope that has it.
    pub fn get(&self, name: &str) -> Result<&Value, ContextError> {
        self.lookup(name)
            .ok_or_else(|| ContextError::VariableNotFound(name.to_string()))
    }

    /// Like [`Context::get`], falling back to `default` when no scope binds `name`.
    ///
    /// `None` means there is no fallback; a `Some(&Value::Null)` default is a
    /// real value.
    pub fn get_or<'a>(
        &'a self,
        name: &str,
        default: Option<&'a Value>,
    ) -> Result<&'a Value, ContextError> {
        match (self.lookup(name), default) {
            (Some(value), _) => Ok(value),
            (None, Some(default)) => Ok(default),
            (None, None) => Err(ContextError::VariableNotFound(name.to_string())),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Binds `name` in the innermost scope, starting a new scope if every
    /// scope has been popped.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::new());
        }
        if let Some(top) = self.scopes.last_mut() {
            top.insert(name.into(), value.into());
        }
    }

    /// Pushes a new innermost scope.
    pub fn push<I, K, V>(&mut self, bindings: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.scopes.push(collect_scope(bindings));
    }

    /// Removes and returns the innermost scope.
    pub fn pop(&mut self) -> Result<Scope, ContextError> {
        self.scopes.pop().ok_or(ContextError::PopUnderflow)
    }

    /// Number of scopes currently on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(Scope::new())
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Context::new(collect_scope(iter))
    }
}

fn collect_scope<I, K, V>(bindings: I) -> Scope
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    bindings
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
