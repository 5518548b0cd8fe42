// Evaluation context for remappers

use super::clock::{Clock, SystemClock};
use super::config::EvaluationConfig;
use super::engine::RemapperEngine;
use super::error::{EvaluationError, EvaluationResult};
use super::history::History;
use super::messages::MessageCatalog;
use super::random::{FastRandSource, RandomSource};
use crate::model::ValueExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// The authenticated subject a remapper is evaluated for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Subject identifier
    #[serde(default, alias = "sub")]
    pub id: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// App-specific custom properties
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl UserInfo {
    /// Create a user with an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set a custom property
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Resolve a dotted field path.
    ///
    /// `id`, `name`, `email` and `properties` address the fixed fields; any
    /// other first segment is looked up among the custom properties.
    pub fn field(&self, path: &str) -> Value {
        let mut segments = path.split('.');
        let head = segments.next().unwrap_or_default();
        let rest: Vec<&str> = segments.collect();
        let optional = |value: &Option<String>| {
            value.as_ref().map_or(Value::Null, |s| Value::String(s.clone()))
        };

        match head {
            "id" if rest.is_empty() => optional(&self.id),
            "name" if rest.is_empty() => optional(&self.name),
            "email" if rest.is_empty() => optional(&self.email),
            "properties" => {
                let properties = Value::Object(self.properties.clone());
                properties.lookup(&rest).cloned().unwrap_or(Value::Null)
            }
            key => self
                .properties
                .get(key)
                .and_then(|value| value.lookup(&rest))
                .cloned()
                .unwrap_or(Value::Null),
        }
    }
}

/// Position of the element being visited by an array operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPosition {
    /// Zero-based index of the element
    pub index: usize,
    /// Length of the array being iterated
    pub length: usize,
}

/// Assembles root evaluation contexts from the values external collaborators supply.
///
/// Holds the authenticated user, app variables, container params, locale,
/// message catalogue, and the injected clock and random source. One builder
/// can serve any number of evaluation calls.
///
/// ```rust
/// use remapper_engine::{ContextBuilder, RemapperEngine, UserInfo};
/// use serde_json::json;
///
/// let engine = RemapperEngine::standard();
/// let builder = ContextBuilder::new()
///     .with_user(UserInfo::new("42").with_name("Alice"))
///     .with_locale("nl");
///
/// let result = engine
///     .evaluate(&json!({ "user": "name" }), &json!(null), &builder)
///     .unwrap();
/// assert_eq!(result, json!("Alice"));
/// ```
#[derive(Clone)]
pub struct ContextBuilder {
    user: Option<UserInfo>,
    variables: Map<String, Value>,
    params: Map<String, Value>,
    locale: Option<String>,
    messages: Arc<MessageCatalog>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextBuilder")
            .field("user", &self.user)
            .field("variables", &self.variables.len())
            .field("params", &self.params.len())
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl ContextBuilder {
    /// Anonymous builder with the system clock and an entropy-seeded random source
    pub fn new() -> Self {
        Self {
            user: None,
            variables: Map::new(),
            params: Map::new(),
            locale: None,
            messages: Arc::new(MessageCatalog::new()),
            clock: Arc::new(SystemClock),
            random: Arc::new(FastRandSource::new()),
        }
    }

    /// Set the authenticated user
    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.user = Some(user);
        self
    }

    /// Replace all app variables
    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    /// Set one app variable
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    /// Replace all container params
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Set one container param
    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Set the active locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the message catalogue
    pub fn with_messages(mut self, messages: impl Into<Arc<MessageCatalog>>) -> Self {
        self.messages = messages.into();
        self
    }

    /// Substitute the time source used by `date.now`
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Substitute the random source used by `random.*`
    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Arc::new(random);
        self
    }

    /// Share an existing random source between builders
    pub fn with_shared_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Build the root context for one top-level evaluation of `input`
    pub fn build<'a>(&'a self, engine: &'a RemapperEngine, input: &'a Value) -> EvaluationContext<'a> {
        let config = engine.config();
        EvaluationContext {
            current: input,
            root: input,
            scope: self,
            locale: self.locale.as_deref().unwrap_or(&config.default_locale),
            engine,
            history: History::new(config.max_history),
            item: None,
            depth: 0,
        }
    }
}

/// Immutable snapshot a remapper is evaluated against.
///
/// Child contexts replace `current` (and the item position while iterating)
/// and borrow everything else from their parent. Cloning is cheap: the only
/// owned part is the history handle.
#[derive(Clone)]
pub struct EvaluationContext<'a> {
    current: &'a Value,
    root: &'a Value,
    scope: &'a ContextBuilder,
    locale: &'a str,
    engine: &'a RemapperEngine,
    history: History,
    item: Option<ItemPosition>,
    depth: usize,
}

impl fmt::Debug for EvaluationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("current", self.current)
            .field("locale", &self.locale)
            .field("history", &self.history.len())
            .field("item", &self.item)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

impl<'a> EvaluationContext<'a> {
    /// The value being transformed
    pub fn current(&self) -> &'a Value {
        self.current
    }

    /// The original top-level input
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// The authenticated user, if any
    pub fn user(&self) -> Option<&'a UserInfo> {
        self.scope.user.as_ref()
    }

    /// App variables
    pub fn variables(&self) -> &'a Map<String, Value> {
        &self.scope.variables
    }

    /// Container params
    pub fn params(&self) -> &'a Map<String, Value> {
        &self.scope.params
    }

    /// Active locale
    pub fn locale(&self) -> &'a str {
        self.locale
    }

    /// Limits of the engine running this evaluation
    pub fn config(&self) -> &'a EvaluationConfig {
        self.engine.config()
    }

    /// Locale the message catalogue falls back to
    pub fn default_locale(&self) -> &'a str {
        &self.engine.config().default_locale
    }

    /// Message catalogue
    pub fn messages(&self) -> &'a MessageCatalog {
        &self.scope.messages
    }

    /// Injected time source
    pub fn clock(&self) -> &'a dyn Clock {
        self.scope.clock.as_ref()
    }

    /// Injected random source
    pub fn random(&self) -> &'a dyn RandomSource {
        self.scope.random.as_ref()
    }

    /// Previous values, most recent first
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Position within the nearest enclosing array iteration
    pub fn item(&self) -> Option<ItemPosition> {
        self.item
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Child context with a different current value at the same depth
    pub fn with_current<'b>(&'b self, current: &'b Value) -> EvaluationContext<'b> {
        EvaluationContext {
            current,
            root: self.root,
            scope: self.scope,
            locale: self.locale,
            engine: self.engine,
            history: self.history.clone(),
            item: self.item,
            depth: self.depth,
        }
    }

    /// Child context for the next step of a sequence
    pub(crate) fn with_history<'b>(
        &'b self,
        current: &'b Value,
        history: History,
    ) -> EvaluationContext<'b> {
        EvaluationContext {
            history,
            ..self.with_current(current)
        }
    }

    fn descend(mut self) -> EvaluationResult<Self> {
        let max_depth = self.engine.config().max_depth;
        if self.depth >= max_depth {
            return Err(EvaluationError::DepthExceeded { max_depth });
        }
        self.depth += 1;
        Ok(self)
    }

    /// Evaluate a sub-remapper against the current value, one level deeper
    pub fn evaluate(&self, remapper: &Value) -> EvaluationResult<Value> {
        let child = self.clone().descend()?;
        self.engine.evaluate_in(remapper, &child)
    }

    /// Evaluate a sub-remapper against another value, one level deeper
    pub fn evaluate_with(&self, remapper: &Value, current: &Value) -> EvaluationResult<Value> {
        let child = self.with_current(current).descend()?;
        self.engine.evaluate_in(remapper, &child)
    }

    /// Evaluate a sub-remapper against an array element, exposing its position
    pub fn evaluate_item(
        &self,
        remapper: &Value,
        item: &Value,
        position: ItemPosition,
    ) -> EvaluationResult<Value> {
        let mut child = self.with_current(item).descend()?;
        child.item = Some(position);
        self.engine.evaluate_in(remapper, &child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_fields() {
        let user = UserInfo::new("u1")
            .with_name("Alice")
            .with_property("team", json!({ "name": "Core" }));

        assert_eq!(user.field("id"), json!("u1"));
        assert_eq!(user.field("name"), json!("Alice"));
        assert_eq!(user.field("email"), Value::Null);
        assert_eq!(user.field("team.name"), json!("Core"));
        assert_eq!(user.field("properties.team.name"), json!("Core"));
        assert_eq!(user.field("missing"), Value::Null);
    }

    #[test]
    fn test_user_deserialize_sub_alias() {
        let user: UserInfo = serde_json::from_value(json!({ "sub": "x", "name": "Bob" })).unwrap();
        assert_eq!(user.id.as_deref(), Some("x"));
        assert!(user.properties.is_empty());
    }

    #[test]
    fn test_child_context_shares_scope() {
        let engine = RemapperEngine::standard();
        let builder = ContextBuilder::new()
            .with_variable("theme", json!("dark"))
            .with_locale("nl");
        let input = json!({ "items": [1, 2] });
        let root = builder.build(&engine, &input);

        let element = json!(1);
        let child = root.with_current(&element);
        assert_eq!(child.current(), &json!(1));
        assert!(std::ptr::eq(child.root(), root.root()));
        assert!(std::ptr::eq(child.variables(), root.variables()));
        assert_eq!(child.locale(), "nl");
        assert_eq!(child.depth(), root.depth());
    }

    #[test]
    fn test_default_locale_from_config() {
        let engine = RemapperEngine::standard();
        let builder = ContextBuilder::new();
        let input = Value::Null;
        let context = builder.build(&engine, &input);
        assert_eq!(context.locale(), "en");
        assert!(context.user().is_none());
        assert!(context.item().is_none());
    }
}
