//! Date operators
//!
//! Dates are read from RFC 3339 strings, `YYYY-MM-DD` dates, naive
//! date-times (taken as UTC) and epoch milliseconds, and are written as
//! RFC 3339 UTC strings with millisecond precision.

use super::{expect_integer, expect_keyword, expect_object, expect_str, invalid_payload, required_field, soft_null};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::evaluator::{EvaluationContext, EvaluationResult};
use crate::model::JsonPointer;
use crate::registry::operator::{OperatorRegistry, RemapperOperator};
use crate::registry::signature::{FieldInfo, PayloadShape};
use crate::validator::RemapperValidator;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use serde_json::Value;
use std::fmt::Write;
use std::sync::LazyLock;

const UNITS: &[&str] = &[
    "milliseconds",
    "seconds",
    "minutes",
    "hours",
    "days",
    "weeks",
    "months",
    "years",
];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Read a date from any of the accepted representations
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_date_str(text),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn parse_date_str(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse with an explicit chrono format, with or without an offset
fn parse_with_format(text: &str, format: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_str(text, format) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Canonical output form
pub fn format_date(date: DateTime<Utc>) -> Value {
    Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn format_items(format: &str) -> Option<Vec<Item<'_>>> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        None
    } else {
        Some(items)
    }
}

fn shift(date: DateTime<Utc>, amount: i64, unit: &str) -> Option<DateTime<Utc>> {
    let delta = match unit {
        "milliseconds" => TimeDelta::try_milliseconds(amount),
        "seconds" => TimeDelta::try_seconds(amount),
        "minutes" => TimeDelta::try_minutes(amount),
        "hours" => TimeDelta::try_hours(amount),
        "days" => TimeDelta::try_days(amount),
        "weeks" => TimeDelta::try_weeks(amount),
        "months" => return shift_months(date, amount),
        "years" => return shift_months(date, amount.checked_mul(12)?),
        _ => None,
    }?;
    date.checked_add_signed(delta)
}

// Month arithmetic clamps to the last day of the target month.
fn shift_months(date: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(count)
    } else {
        date.checked_sub_months(count)
    }
}

fn check_format(payload: &Value, path: &JsonPointer, validator: &mut RemapperValidator<'_>) {
    if let Some(format) = payload.as_str() {
        if format_items(format).is_none() {
            validator.report(
                DiagnosticBuilder::error(DiagnosticCode::InvalidValue)
                    .with_message(format!("Invalid date format \"{format}\""))
                    .at(path)
                    .build(),
            );
        }
    }
}

/// `date.now`: the injected clock's current time
pub struct DateNowOperator;

impl RemapperOperator for DateNowOperator {
    fn name(&self) -> &str {
        "date.now"
    }
    fn human_friendly_name(&self) -> &str {
        "Now"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(PayloadShape::null);
        &SHAPE
    }
    fn is_deterministic(&self) -> bool {
        false
    }
    fn evaluate(
        &self,
        _input: &Value,
        _payload: &Value,
        context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        Ok(format_date(context.clock().now()))
    }
}

/// Signed date shift by an amount of a unit
pub struct DateShiftOperator {
    name: &'static str,
    human_friendly_name: &'static str,
    sign: i64,
}

impl DateShiftOperator {
    /// `date.add`
    pub const ADD: Self = Self {
        name: "date.add",
        human_friendly_name: "Add To Date",
        sign: 1,
    };

    /// `date.subtract`
    pub const SUBTRACT: Self = Self {
        name: "date.subtract",
        human_friendly_name: "Subtract From Date",
        sign: -1,
    };
}

impl RemapperOperator for DateShiftOperator {
    fn name(&self) -> &str {
        self.name
    }
    fn human_friendly_name(&self) -> &str {
        self.human_friendly_name
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> = LazyLock::new(|| {
            PayloadShape::Record(vec![
                FieldInfo::required("amount", PayloadShape::integer()),
                FieldInfo::required("unit", PayloadShape::Keyword(UNITS)),
            ])
        });
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Shift the current date by an amount of milliseconds, seconds, minutes, hours, days, weeks, months or years. Unparseable dates yield null."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let fields = expect_object(self.name, payload)?;
        let amount = expect_integer(self.name, required_field(self.name, fields, "amount")?)?;
        let unit = expect_keyword(self.name, required_field(self.name, fields, "unit")?, UNITS)?;
        let Some(date) = parse_date(input) else {
            return Ok(soft_null(self.name, "input is not a date"));
        };
        let Some(amount) = amount.checked_mul(self.sign) else {
            return Ok(soft_null(self.name, "date out of range"));
        };
        Ok(match shift(date, amount, unit) {
            Some(shifted) => format_date(shifted),
            None => soft_null(self.name, "date out of range"),
        })
    }
}

/// `date.parse`: reads a date, optionally with an explicit format
pub struct DateParseOperator;

impl RemapperOperator for DateParseOperator {
    fn name(&self) -> &str {
        "date.parse"
    }
    fn human_friendly_name(&self) -> &str {
        "Parse Date"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::optional(PayloadShape::string()));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Parse the current value as a date using a chrono format string, or the accepted default representations when the payload is null."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let parsed = match payload {
            Value::Null => parse_date(input),
            format => {
                let format = expect_str(self.name(), format)?;
                input
                    .as_str()
                    .and_then(|text| parse_with_format(text.trim(), format))
            }
        };
        Ok(parsed.map_or_else(|| soft_null(self.name(), "input is not a date"), format_date))
    }
    fn validate_shape(&self, payload: &Value, path: &JsonPointer, validator: &mut RemapperValidator<'_>) {
        validator.check_shape(self.shape(), payload, path, self.name());
        check_format(payload, path, validator);
    }
}

/// `date.format`: renders a date with a chrono format string
pub struct DateFormatOperator;

impl RemapperOperator for DateFormatOperator {
    fn name(&self) -> &str {
        "date.format"
    }
    fn human_friendly_name(&self) -> &str {
        "Format Date"
    }
    fn shape(&self) -> &PayloadShape {
        static SHAPE: LazyLock<PayloadShape> =
            LazyLock::new(|| PayloadShape::optional(PayloadShape::string()));
        &SHAPE
    }
    fn documentation(&self) -> &str {
        "Render the current date with a chrono format string, or as RFC 3339 when the payload is null."
    }
    fn evaluate(
        &self,
        input: &Value,
        payload: &Value,
        _context: &EvaluationContext<'_>,
    ) -> EvaluationResult<Value> {
        let Some(date) = parse_date(input) else {
            return Ok(soft_null(self.name(), "input is not a date"));
        };
        let format = match payload {
            Value::Null => return Ok(format_date(date)),
            other => expect_str(self.name(), other)?,
        };
        let items = format_items(format)
            .ok_or_else(|| invalid_payload(self.name(), format!("invalid date format \"{format}\"")))?;

        let mut rendered = String::new();
        Ok(
            match write!(rendered, "{}", date.format_with_items(items.into_iter())) {
                Ok(()) => Value::String(rendered),
                Err(_) => soft_null(self.name(), "date cannot be rendered with this format"),
            },
        )
    }
    fn validate_shape(&self, payload: &Value, path: &JsonPointer, validator: &mut RemapperValidator<'_>) {
        validator.check_shape(self.shape(), payload, path, self.name());
        check_format(payload, path, validator);
    }
}

/// Register the date operators
pub fn register_date_operators(registry: &mut OperatorRegistry) {
    registry.register(DateNowOperator);
    registry.register(DateShiftOperator::ADD);
    registry.register(DateShiftOperator::SUBTRACT);
    registry.register(DateParseOperator);
    registry.register(DateFormatOperator);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{remap, remap_with};
    use super::*;
    use crate::evaluator::{ContextBuilder, FixedClock};
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("2024-01-31T10:00:00Z"), "2024-01-31T10:00:00.000Z")]
    #[case(json!("2024-01-31T12:00:00+02:00"), "2024-01-31T10:00:00.000Z")]
    #[case(json!("2024-01-31"), "2024-01-31T00:00:00.000Z")]
    #[case(json!("2024-01-31 10:00:00"), "2024-01-31T10:00:00.000Z")]
    #[case(json!(0), "1970-01-01T00:00:00.000Z")]
    fn test_parse_date(#[case] input: Value, #[case] expected: &str) {
        assert_eq!(parse_date(&input).map(format_date), Some(json!(expected)));
    }

    #[test]
    fn test_parse_date_rejects() {
        assert_eq!(parse_date(&json!("yesterday")), None);
        assert_eq!(parse_date(&json!(true)), None);
    }

    #[test]
    fn test_now_uses_injected_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let builder = ContextBuilder::new().with_clock(FixedClock::new(instant));
        assert_eq!(
            remap_with(json!({ "date.now": null }), json!(null), &builder),
            json!("2024-05-01T08:30:00.000Z")
        );
    }

    #[rstest]
    #[case("date.add", 90, "minutes", "2024-01-31T11:30:00.000Z")]
    #[case("date.add", 1, "months", "2024-02-29T10:00:00.000Z")]
    #[case("date.add", 1, "years", "2025-01-31T10:00:00.000Z")]
    #[case("date.subtract", 2, "weeks", "2024-01-17T10:00:00.000Z")]
    #[case("date.subtract", 1, "months", "2023-12-31T10:00:00.000Z")]
    #[case("date.add", -1500, "milliseconds", "2024-01-31T09:59:58.500Z")]
    fn test_shift(#[case] operator: &str, #[case] amount: i64, #[case] unit: &str, #[case] expected: &str) {
        let result = remap(
            json!({ operator: { "amount": amount, "unit": unit } }),
            json!("2024-01-31T10:00:00Z"),
        );
        assert_eq!(result, json!(expected));
    }

    #[rstest]
    #[case("date.subtract", i64::MIN, "days")]
    #[case("date.subtract", i64::MIN, "months")]
    #[case("date.add", i64::MAX, "years")]
    #[case("date.add", i64::MAX, "milliseconds")]
    fn test_shift_out_of_range_is_null(#[case] operator: &str, #[case] amount: i64, #[case] unit: &str) {
        let result = remap(
            json!({ operator: { "amount": amount, "unit": unit } }),
            json!("2024-01-31T10:00:00Z"),
        );
        assert_eq!(result, json!(null));
    }

    #[test]
    fn test_shift_invalid_input_is_null() {
        assert_eq!(
            remap(json!({ "date.add": { "amount": 1, "unit": "days" } }), json!("not a date")),
            json!(null)
        );
    }

    #[test]
    fn test_parse_and_format() {
        assert_eq!(
            remap(json!({ "date.parse": "%d/%m/%Y" }), json!("05/03/2024")),
            json!("2024-03-05T00:00:00.000Z")
        );
        assert_eq!(remap(json!({ "date.parse": "%d/%m/%Y" }), json!("2024-03-05")), json!(null));
        assert_eq!(
            remap(json!({ "date.format": "%Y-%m-%d %H:%M" }), json!("2024-03-05T14:07:00Z")),
            json!("2024-03-05 14:07")
        );
        assert_eq!(
            remap(json!({ "date.format": null }), json!(1_700_000_000_000_i64)),
            json!("2023-11-14T22:13:20.000Z")
        );
    }
}
