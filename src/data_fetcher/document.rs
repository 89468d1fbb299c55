//! Navigation helpers for parsed feed documents.
//!
//! Feed documents are string-keyed trees of maps, sequences and scalars. The
//! SportsData feeds are loose about shapes: a repeated element with a single
//! occurrence comes back as a map instead of a one-item list, and numbers may
//! arrive as strings. Everything here reads those shapes leniently. Absent
//! keys yield a zero value unless the caller asks for a required field, in
//! which case the lookup fails with [`AppError::MissingField`].

use serde_json::Value;

use crate::error::AppError;

/// A parsed feed document.
pub type Document = Value;

/// Lookup helpers on a parsed feed document.
pub trait DocumentExt {
    /// Returns the value under `field`, treating JSON `null` as absent.
    fn field(&self, field: &str) -> Option<&Value>;

    /// Walks a chain of map keys, stopping at the first absent one.
    fn path(&self, fields: &[&str]) -> Option<&Value>;

    /// Like [`DocumentExt::field`] but a missing key is a hard error.
    fn required(&self, field: &str, context: &str) -> Result<&Value, AppError>;

    /// Required scalar rendered as a string.
    fn required_str(&self, field: &str, context: &str) -> Result<String, AppError>;

    /// Optional scalar rendered as a string, empty when absent.
    fn str_or_empty(&self, field: &str) -> String;
}

impl DocumentExt for Value {
    fn field(&self, field: &str) -> Option<&Value> {
        match self.get(field) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    fn path(&self, fields: &[&str]) -> Option<&Value> {
        fields
            .iter()
            .try_fold(self, |current, field| current.field(field))
    }

    fn required(&self, field: &str, context: &str) -> Result<&Value, AppError> {
        self.field(field)
            .ok_or_else(|| AppError::missing_field(field, context))
    }

    fn required_str(&self, field: &str, context: &str) -> Result<String, AppError> {
        let value = self.required(field, context)?;
        scalar_string(value).ok_or_else(|| AppError::missing_field(field, context))
    }

    fn str_or_empty(&self, field: &str) -> String {
        self.field(field).and_then(scalar_string).unwrap_or_default()
    }
}

/// Moves a required top-level entry out of an owned document.
pub fn into_required(doc: Document, field: &str, context: &str) -> Result<Document, AppError> {
    match doc {
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Null) | None => Err(AppError::missing_field(field, context)),
            Some(value) => Ok(value),
        },
        _ => Err(AppError::missing_field(field, context)),
    }
}

/// Renders a scalar as a string. Maps and lists have no scalar form.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Wraps whatever sits at a repeated element into a list: absent or an empty
/// map gives nothing, a lone map gives one item, a list is returned as-is.
pub fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) if map.is_empty() => Vec::new(),
        Some(other) => vec![other],
    }
}

/// Reads a count the way the feed encodes it. Leading digits of a string are
/// used (`"12"` and `"12 "` both read 12); anything unreadable or negative is 0.
pub fn to_count(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let digits: String = s
                .trim_start()
                .trim_start_matches('+')
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

/// Feed booleans are the string `"1"`; anything else is false.
pub fn is_flag_set(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s == "1",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_treats_null_as_absent() {
        let doc = json!({"id": "abc", "venue": null});
        assert_eq!(doc.field("id"), Some(&json!("abc")));
        assert_eq!(doc.field("venue"), None);
        assert_eq!(doc.field("missing"), None);
    }

    #[test]
    fn test_path_walks_nested_maps() {
        let doc = json!({"pitching": {"team": {"games": {"save": "1"}}}});
        assert_eq!(
            doc.path(&["pitching", "team", "games", "save"]),
            Some(&json!("1"))
        );
        assert_eq!(doc.path(&["pitching", "players", "games"]), None);
    }

    #[test]
    fn test_required_reports_field_and_context() {
        let doc = json!({"calendars": {}});
        let err = doc.required("id", "schedule event").unwrap_err();
        match err {
            AppError::MissingField { field, context } => {
                assert_eq!(field, "id");
                assert_eq!(context, "schedule event");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_required_str_rejects_maps() {
        let doc = json!({"id": {"nested": true}, "abbr": 12});
        assert!(doc.required_str("id", "box score").is_err());
        assert_eq!(doc.required_str("abbr", "box score").unwrap(), "12");
    }

    #[test]
    fn test_into_required() {
        let doc = json!({"statistics": {"home": {}}, "other": 1});
        assert_eq!(
            into_required(doc, "statistics", "statistics document").unwrap(),
            json!({"home": {}})
        );

        let err = into_required(json!({"boxscores": null}), "boxscores", "daily box score")
            .unwrap_err();
        assert!(err.is_missing_field());
        assert!(into_required(json!([1, 2]), "event", "event info").is_err());
    }

    #[test]
    fn test_as_list_shapes() {
        let list = json!([{"id": 1}, {"id": 2}]);
        let single = json!({"id": 1});
        let empty = json!({});

        assert_eq!(as_list(Some(&list)).len(), 2);
        assert_eq!(as_list(Some(&single)).len(), 1);
        assert!(as_list(Some(&empty)).is_empty());
        assert!(as_list(Some(&Value::Null)).is_empty());
        assert!(as_list(None).is_empty());
    }

    #[test]
    fn test_to_count() {
        assert_eq!(to_count(Some(&json!("7"))), 7);
        assert_eq!(to_count(Some(&json!(" 12abc"))), 12);
        assert_eq!(to_count(Some(&json!(3))), 3);
        assert_eq!(to_count(Some(&json!("-2"))), 0);
        assert_eq!(to_count(Some(&json!(""))), 0);
        assert_eq!(to_count(Some(&json!({"runs": 4}))), 0);
        assert_eq!(to_count(None), 0);
    }

    #[test]
    fn test_is_flag_set() {
        assert!(is_flag_set(Some(&json!("1"))));
        assert!(!is_flag_set(Some(&json!(1))));
        assert!(!is_flag_set(Some(&json!(true))));
        assert!(!is_flag_set(Some(&json!("0"))));
        assert!(!is_flag_set(Some(&json!("true"))));
        assert!(!is_flag_set(None));
    }
}
