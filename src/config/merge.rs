//! Field-by-field merging of configuration tiers.
//!
//! Each tier is parsed into a `serde_json::Value` and folded over the
//! previous ones; a key set in a later tier wins, keys it leaves out keep
//! their earlier value.

use serde_json::Value;

/// Merge `overlay` onto `base`.
///
/// Objects merge recursively. Any other overlay value replaces the base
/// value, except `null`, which leaves the base untouched.
///
/// ```
/// use serde_json::json;
/// use todo_web::config::deep_merge;
///
/// let defaults = json!({ "server": { "host": "0.0.0.0", "port": 5000 } });
/// let project = json!({ "server": { "port": 8080 } });
/// assert_eq!(
///     deep_merge(defaults, project),
///     json!({ "server": { "host": "0.0.0.0", "port": 8080 } })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let value = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, lowest priority first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
