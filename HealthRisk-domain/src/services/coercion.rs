//! Field coercion for intake form edits.
//!
//! Raw control events are turned into typed values here before they reach
//! [`FormState`](crate::entities::FormState). Nothing in this module fails:
//! a number that does not parse becomes NaN and is forwarded as-is.

use serde_json::Value;

use crate::entities::form_state::FormField;

/// Declared kind of the control that produced an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Checkbox,
    Number,
    /// Text inputs, selects and anything else
    Text,
}

impl InputKind {
    /// Map an HTML-style input type attribute to a kind
    pub fn from_type_attr(attr: &str) -> Self {
        match attr {
            "checkbox" => InputKind::Checkbox,
            "number" => InputKind::Number,
            _ => InputKind::Text,
        }
    }
}

/// Raw payload of an input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// Checked state of a checkbox
    Checked(bool),
    /// Textual value of any other control
    Text(String),
}

/// A single edit addressed to a form field by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub name: String,
    pub kind: InputKind,
    pub raw: RawInput,
}

impl InputEvent {
    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::Checkbox,
            raw: RawInput::Checked(checked),
        }
    }

    pub fn number(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::Number,
            raw: RawInput::Text(value.into()),
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: InputKind::Text,
            raw: RawInput::Text(value.into()),
        }
    }

    /// Build an event from typed text, using the kind the field is declared
    /// with. Unlisted names are treated as text inputs.
    pub fn for_field(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match FormField::lookup(&name).map(|f| f.kind) {
            Some(InputKind::Checkbox) => {
                let checked = is_truthy(&value);
                Self::checkbox(name, checked)
            }
            Some(InputKind::Number) => Self::number(name, value),
            _ => Self::text(name, value),
        }
    }
}

/// Typed value produced by coercion
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view: booleans become 1/0, text is parsed like a number input
    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => parse_float(s),
        }
    }

    /// Boolean view: non-zero non-NaN numbers and truthy words are true
    pub fn as_flag(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => is_truthy(s),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s,
        }
    }

    /// JSON form used for unlisted fields; NaN and infinities become null
    pub fn into_json(self) -> Value {
        match self {
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Number(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::Null => FieldValue::Number(f64::NAN),
            Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

/// Convert a raw input into a typed value according to its declared kind.
pub fn coerce(kind: InputKind, raw: &RawInput) -> FieldValue {
    match (kind, raw) {
        (InputKind::Checkbox, RawInput::Checked(checked)) => FieldValue::Bool(*checked),
        (InputKind::Checkbox, RawInput::Text(text)) => FieldValue::Bool(is_truthy(text)),
        (InputKind::Number, RawInput::Text(text)) => FieldValue::Number(parse_float(text)),
        (InputKind::Number, RawInput::Checked(checked)) => {
            FieldValue::Number(if *checked { 1.0 } else { 0.0 })
        }
        (InputKind::Text, RawInput::Text(text)) => FieldValue::Text(text.clone()),
        (InputKind::Text, RawInput::Checked(checked)) => FieldValue::Text(checked.to_string()),
    }
}

fn is_truthy(text: &str) -> bool {
    let text = text.trim();
    text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("on") || text == "1"
}

/// Parse the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// Mirrors the lenient parsing of browser number inputs: `"12abc"` is 12,
/// `"  -3.5e2x"` is -350, `"Infinity"` is +inf, and text with no numeric
/// prefix is NaN.
pub fn parse_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digit_count = end - digits_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut cursor = fraction_start;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        digit_count += cursor - fraction_start;
        if digit_count > 0 {
            end = cursor;
        }
    }

    if digit_count == 0 {
        return f64::NAN;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut cursor = end + 1;
        if cursor < bytes.len() && (bytes[cursor] == b'+' || bytes[cursor] == b'-') {
            cursor += 1;
        }
        let exponent_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if cursor > exponent_start {
            end = cursor;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FormState;

    #[test]
    fn test_parse_float_prefixes() {
        assert_eq!(parse_float("42"), 42.0);
        assert_eq!(parse_float("  1.5"), 1.5);
        assert_eq!(parse_float("12abc"), 12.0);
        assert_eq!(parse_float("-3.5e2x"), -350.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("7."), 7.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("+8"), 8.0);
        assert_eq!(parse_float("Infinity"), f64::INFINITY);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_parse_float_without_digits_is_nan() {
        assert!(parse_float("").is_nan());
        assert!(parse_float("abc").is_nan());
        assert!(parse_float(".").is_nan());
        assert!(parse_float("-").is_nan());
        assert!(parse_float("e5").is_nan());
    }

    #[test]
    fn test_coerce_by_kind() {
        assert_eq!(
            coerce(InputKind::Checkbox, &RawInput::Checked(true)),
            FieldValue::Bool(true)
        );
        assert_eq!(
            coerce(InputKind::Number, &RawInput::Text("0.1".to_string())),
            FieldValue::Number(0.1)
        );
        assert_eq!(
            coerce(InputKind::Text, &RawInput::Text("Female".to_string())),
            FieldValue::Text("Female".to_string())
        );
        assert_eq!(InputKind::from_type_attr("select"), InputKind::Text);
    }

    #[test]
    fn test_invalid_number_is_stored_as_nan() {
        let mut form = FormState::default();
        form.apply(&InputEvent::number("chol", "high"));
        assert!(form.chol.is_nan());
    }

    #[test]
    fn test_checkbox_twice_restores_original() {
        let mut form = FormState::default();
        let before = form.clone();

        form.apply(&InputEvent::checkbox("thrush", true));
        assert!(form.thrush);
        form.apply(&InputEvent::checkbox("thrush", false));

        assert_eq!(form, before);
    }

    #[test]
    fn test_last_numeric_edit_wins_and_others_untouched() {
        let mut form = FormState::default();
        let before = serde_json::to_value(&form).unwrap();

        form.apply(&InputEvent::number("trestbps", "130"));
        form.apply(&InputEvent::number("trestbps", "145"));

        let after = serde_json::to_value(&form).unwrap();
        assert_eq!(form.trestbps, 145.0);
        for (key, value) in before.as_object().unwrap() {
            if key != "trestbps" {
                assert_eq!(&after[key], value, "field {} changed", key);
            }
        }
    }

    #[test]
    fn test_kind_mismatch_is_converted() {
        let mut form = FormState::default();

        form.apply(&InputEvent::number("exang", "1"));
        assert!(form.exang);
        form.apply(&InputEvent::number("exang", "nope"));
        assert!(!form.exang);

        form.apply(&InputEvent::checkbox("fbs", true));
        assert_eq!(form.fbs, 1.0);

        form.apply(&InputEvent::text("age", "61"));
        assert_eq!(form.age, 61.0);
    }

    #[test]
    fn test_for_field_uses_declared_kind() {
        assert_eq!(InputEvent::for_field("age", "55").kind, InputKind::Number);
        assert_eq!(
            InputEvent::for_field("obesity", "on").raw,
            RawInput::Checked(true)
        );
        assert_eq!(InputEvent::for_field("gender", "Female").kind, InputKind::Text);
        assert_eq!(InputEvent::for_field("notes", "x").kind, InputKind::Text);
    }
}
