//! Context access operators

use super::{expect_keyword, expect_str};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::model::{ValueExt, split_path};
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::PayloadShape;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Resolve a dotted path whose first segment names an entry of `map`
fn lookup_in(map: &Map<String, Value>, path: &str) -> Value {
    let segments = split_path(path);
    let Some((first, rest)) = segments.split_first() else {
        return Value::Object(map.clone());
    };
    map.get(*first)
        .and_then(|value| value.lookup(rest))
        .cloned()
        .unwrap_or(Value::Null)
}

/// `user`: reads a field of the authenticated user
pub struct UserOperator;

impl RemapperOperator for UserOperator {
    fn name(&self) -> &str {
        "user"
    }
    fn human_friendly_name(&self) -> &str {
        "User"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::string);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Read id, name, email, properties or a custom property of the user. Anonymous evaluation yields null."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let field = expect_str(self.name(), payload)?;
        Ok(context
            .user()
            .map_or(Value::Null, |user| user.field(field)))
    }
}

/// `variable`: reads an app variable
pub struct VariableOperator;

impl RemapperOperator for VariableOperator {
    fn name(&self) -> &str {
        "variable"
    }
    fn human_friendly_name(&self) -> &str {
        "Variable"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::string);
        &SHAPE
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let path = expect_str(self.name(), payload)?;
        Ok(lookup_in(context.variables(), path))
    }
}

/// `param`: reads a container parameter
pub struct ParamOperator;

impl RemapperOperator for ParamOperator {
    fn name(&self) -> &str {
        "param"
    }
    fn human_friendly_name(&self) -> &str {
        "Parameter"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::string);
        &SHAPE
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let path = expect_str(self.name(), payload)?;
        Ok(lookup_in(context.params(), path))
    }
}

const APP_FIELDS: &[&str] = &["locale"];

/// `app`: reads evaluation-wide settings
pub struct AppOperator;

impl RemapperOperator for AppOperator {
    fn name(&self) -> &str {
        "app"
    }
    fn human_friendly_name(&self) -> &str {
        "App"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| PayloadShape::Keyword(APP_FIELDS));
        &SHAPE
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        expect_keyword(self.name(), payload, APP_FIELDS)?;
        Ok(Value::String(context.locale().to_string()))
    }
}

const ARRAY_FIELDS: &[&str] = &["index", "length"];

/// `array`: position within the nearest enclosing array iteration
pub struct ArrayPositionOperator;

impl RemapperOperator for ArrayPositionOperator {
    fn name(&self) -> &str {
        "array"
    }
    fn human_friendly_name(&self) -> &str {
        "Array Position"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::Keyword(ARRAY_FIELDS));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Index of the element being visited, or the length of the array being iterated. Null outside an iteration."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let field = expect_keyword(self.name(), payload, ARRAY_FIELDS)?;
        let Some(position) = context.item() else {
            return Ok(Value::Null);
        };
        Ok(match field {
            "index" => position.index.into(),
            _ => position.length.into(),
        })
    }
}

/// Register the context access operators
pub fn register_environment_operators(registry: &mut OperatorRegistry) {
    registry.register(UserOperator);
    registry.register(VariableOperator);
    registry.register(ParamOperator);
    registry.register(AppOperator);
    registry.register(ArrayPositionOperator);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{remap, remap_with};
    use crate::evaluator::{ContextBuilder, UserInfo};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_user_fields() {
        let builder = ContextBuilder::new().with_user(
            UserInfo::new("u1")
                .with_email("a@example.com")
                .with_property("team", json!({ "name": "Core" })),
        );
        let remapper = json!({ "object.from": {
            "id": { "user": "id" },
            "email": { "user": "email" },
            "name": { "user": "name" },
            "team": { "user": "team.name" }
        } });
        assert_eq!(
            remap_with(remapper, json!(null), &builder),
            json!({ "id": "u1", "email": "a@example.com", "name": null, "team": "Core" })
        );
    }

    #[test]
    fn test_anonymous_user() {
        assert_eq!(remap(json!({ "user": "id" }), json!(null)), json!(null));
    }

    #[test]
    fn test_variables_and_params() {
        let builder = ContextBuilder::new()
            .with_variable("api", json!({ "url": "https://example.com" }))
            .with_param("id", json!(7));
        let remapper = json!({ "array.from": [
            { "variable": "api.url" },
            { "variable": "missing" },
            { "param": "id" },
            { "param": "id.nested" }
        ] });
        assert_eq!(
            remap_with(remapper, json!(null), &builder),
            json!(["https://example.com", null, 7, null])
        );
    }

    #[test]
    fn test_app_locale() {
        let builder = ContextBuilder::new().with_locale("nl-BE");
        assert_eq!(remap_with(json!({ "app": "locale" }), json!(null), &builder), json!("nl-BE"));
        assert_eq!(remap(json!({ "app": "locale" }), json!(null)), json!("en"));
    }

    #[test]
    fn test_array_outside_iteration() {
        assert_eq!(remap(json!({ "array": "index" }), json!([1, 2])), json!(null));
    }
}
