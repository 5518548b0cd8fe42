//! String operators

use super::{expect_keyword, expect_object, expect_str, invalid_payload, soft_null};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::model::{JsonPointer, ValueExt};
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::{FieldInfo, PayloadShape};
use crate::validator::RemapperValidator;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::sync::LazyLock;

const REGEX_CACHE_CAPACITY: usize = 256;

static REGEX_CACHE: Lazy<RwLock<FxHashMap<String, Regex>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

/// Compile a pattern, reusing earlier compilations
fn cached_regex(pattern: &str) -> Result<Regex, regex::Error> {
    if let Some(regex) = REGEX_CACHE.read().get(pattern) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(pattern)?;
    let mut cache = REGEX_CACHE.write();
    if cache.len() >= REGEX_CACHE_CAPACITY {
        cache.clear();
    }
    cache.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// Substitute `{name}` placeholders. Missing and null values become "".
///
/// Braces that do not enclose a non-empty name without whitespace are
/// copied through unchanged.
pub(crate) fn interpolate(template: &str, values: &Map<String, Value>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let name_end = after.find(|c: char| c == '}' || c == '{' || c.is_whitespace());
        match name_end {
            Some(end) if end > 0 && after[end..].starts_with('}') => {
                if let Some(value) = values.get(&after[..end]) {
                    result.push_str(&value.to_display_string());
                }
                rest = &after[end + 1..];
            }
            _ => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// `string.format`: fills a template with remapper results
pub struct StringFormatOperator;

impl RemapperOperator for StringFormatOperator {
    fn name(&self) -> &str {
        "string.format"
    }
    fn human_friendly_name(&self) -> &str {
        "String Format"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| {
            PayloadShape::Record(vec![
                FieldInfo::optional("template", PayloadShape::string()),
                FieldInfo::optional("messageId", PayloadShape::string()),
                FieldInfo::optional("values", PayloadShape::map(PayloadShape::Remapper)),
            ])
        });
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Interpolate {name} placeholders in a template, or in the catalogue message for messageId, with the results of the value remappers."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let fields = expect_object(self.name(), payload)?;
        let translated = match fields.get("messageId") {
            Some(id) => {
                let id = expect_str(self.name(), id)?;
                context
                    .messages()
                    .lookup(context.locale(), context.default_locale(), id)
            }
            None => None,
        };
        let template = match (translated, fields.get("template")) {
            (Some(message), _) => message,
            (None, Some(template)) => expect_str(self.name(), template)?,
            (None, None) if fields.contains_key("messageId") => {
                return Ok(soft_null(self.name(), "message not found"));
            }
            (None, None) => {
                return Err(invalid_payload(self.name(), "missing field 'template'"));
            }
        };

        let values = match fields.get("values") {
            Some(values) => super::object::evaluate_properties(self.name(), values, context)?,
            None => Map::new(),
        };
        Ok(Value::String(interpolate(template, &values)))
    }
    fn validate_shape(&self, payload: &Value, path: &JsonPointer, validator: &mut RemapperValidator<'_>) {
        validator.check_shape(self.shape(), payload, path, self.name());
        if let Some(fields) = payload.as_object() {
            if !fields.contains_key("template") && !fields.contains_key("messageId") {
                validator.report(
                    DiagnosticBuilder::missing_field(self.name(), "template")
                        .at(path)
                        .build(),
                );
            }
        }
    }
}

/// `string.case`: converts to lower or upper case
pub struct StringCaseOperator;

impl RemapperOperator for StringCaseOperator {
    fn name(&self) -> &str {
        "string.case"
    }
    fn human_friendly_name(&self) -> &str {
        "String Case"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::Keyword(&["lower", "upper"]));
        &SHAPE
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let case = expect_keyword(self.name(), payload, &["lower", "upper"])?;
        let Some(text) = input.as_str() else {
            return Ok(soft_null(self.name(), "input is not a string"));
        };
        Ok(Value::String(match case {
            "upper" => text.to_uppercase(),
            _ => text.to_lowercase(),
        }))
    }
}

/// `string.replace`: applies regex replacements in order
pub struct StringReplaceOperator;

impl RemapperOperator for StringReplaceOperator {
    fn name(&self) -> &str {
        "string.replace"
    }
    fn human_friendly_name(&self) -> &str {
        "String Replace"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::map(PayloadShape::string()));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Replace every match of each regular expression key with its value. Replacements may refer to groups as $1 or ${name}."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let replacements = expect_object(self.name(), payload)?;
        let Some(text) = input.as_str() else {
            return Ok(soft_null(self.name(), "input is not a string"));
        };

        let mut result = text.to_string();
        for (pattern, replacement) in replacements {
            let regex = cached_regex(pattern)
                .map_err(|error| invalid_payload(self.name(), format!("invalid pattern: {error}")))?;
            let replacement = expect_str(self.name(), replacement)?;
            result = regex.replace_all(&result, replacement).into_owned();
        }
        Ok(Value::String(result))
    }
    fn validate_shape(&self, payload: &Value, path: &JsonPointer, validator: &mut RemapperValidator<'_>) {
        validator.check_shape(self.shape(), payload, path, self.name());
        let Some(replacements) = payload.as_object() else {
            return;
        };
        for pattern in replacements.keys() {
            if let Err(error) = Regex::new(pattern) {
                validator.report(
                    DiagnosticBuilder::error(DiagnosticCode::InvalidValue)
                        .with_message(format!("Invalid regular expression: {error}"))
                        .at(&path.key(pattern.as_str()))
                        .build(),
                );
            }
        }
    }
}

/// `string.startsWith`
pub struct StringStartsWithOperator;

impl RemapperOperator for StringStartsWithOperator {
    fn name(&self) -> &str {
        "string.startsWith"
    }
    fn human_friendly_name(&self) -> &str {
        "String Starts With"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::string);
        &SHAPE
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let prefix = expect_str(self.name(), payload)?;
        Ok(Value::Bool(input.as_str().is_some_and(|text| text.starts_with(prefix))))
    }
}

/// `string.endsWith`
pub struct StringEndsWithOperator;

impl RemapperOperator for StringEndsWithOperator {
    fn name(&self) -> &str {
        "string.endsWith"
    }
    fn human_friendly_name(&self) -> &str {
        "String Ends With"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::string);
        &SHAPE
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let suffix = expect_str(self.name(), payload)?;
        Ok(Value::Bool(input.as_str().is_some_and(|text| text.ends_with(suffix))))
    }
}

/// `string.trim`
pub struct StringTrimOperator;

impl RemapperOperator for StringTrimOperator {
    fn name(&self) -> &str {
        "string.trim"
    }
    fn human_friendly_name(&self) -> &str {
        "String Trim"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::null);
        &SHAPE
    }
    fn evaluate(
        &self,
        input: &Value,
        _payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        match input.as_str() {
            Some(text) => Ok(Value::String(text.trim().to_string())),
            None => Ok(soft_null(self.name(), "input is not a string")),
        }
    }
}

/// `translate`: message catalogue lookup for the active locale
pub struct TranslateOperator;

impl RemapperOperator for TranslateOperator {
    fn name(&self) -> &str {
        "translate"
    }
    fn human_friendly_name(&self) -> &str {
        "Translate"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::string);
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Look up a message id for the active locale, falling back to its base language and then the default locale."
    }
    fn evaluate(
        &self,
        _input: &Value,
        payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let id = expect_str(self.name(), payload)?;
        Ok(context
            .messages()
            .lookup(context.locale(), context.default_locale(), id)
            .map_or_else(
                || soft_null(self.name(), format_args!("no message '{id}'")),
                |message| Value::String(message.to_string()),
            ))
    }
}

/// Register the string operators
pub fn register_string_operators(registry: &mut OperatorRegistry) {
    registry.register(StringFormatOperator);
    registry.register(StringCaseOperator);
    registry.register(StringReplaceOperator);
    registry.register(StringStartsWithOperator);
    registry.register(StringEndsWithOperator);
    registry.register(StringTrimOperator);
    registry.register(TranslateOperator);
}
