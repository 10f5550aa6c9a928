//! Argument normalization: caller-supplied arguments into contract order.
//!
//! Callers may pass arguments positionally (asserting they already match the
//! declared order) or by parameter name. Normalization reorders named
//! arguments against a [`Signature`](crate::Signature), filling missing
//! parameters with null and collecting keys the contract does not declare as
//! diagnostics. Nothing at this layer is an error: a half-filled call is
//! transmitted and left for the remote service to reject.

use std::collections::HashMap;

use serde_json::Value;

use crate::catalog::Signature;

/// Arguments for one call, either positional or named.
///
/// Transient, one per invocation.
///
/// # Examples
///
/// ```
/// use soapline::CallArgs;
/// use serde_json::json;
///
/// let by_position = CallArgs::positional([json!("alice"), json!(3)]);
/// let by_name = CallArgs::named([("who", json!("alice")), ("times", json!(3))]);
/// # let _ = (by_position, by_name);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CallArgs {
    /// Values already in declared parameter order.
    Positional(Vec<Value>),
    /// Values keyed by declared parameter name.
    Named(HashMap<String, Value>),
}

impl CallArgs {
    /// Positional arguments, in the order the contract declares.
    pub fn positional<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        CallArgs::Positional(values.into_iter().collect())
    }

    /// Named arguments, keyed by declared parameter name.
    pub fn named<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        CallArgs::Named(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<Vec<Value>> for CallArgs {
    fn from(values: Vec<Value>) -> Self {
        CallArgs::Positional(values)
    }
}

impl From<HashMap<String, Value>> for CallArgs {
    fn from(entries: HashMap<String, Value>) -> Self {
        CallArgs::Named(entries)
    }
}

/// The outcome of normalization: ordered values plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Argument values in declared parameter order.
    pub values: Vec<Value>,
    /// Caller-supplied keys with no declared counterpart, sorted. These were
    /// dropped from `values`; they are diagnostics, never an error.
    pub dropped: Vec<String>,
}

/// Normalizes `args` against `signature`.
///
/// Positional arguments pass through unchanged, with no arity validation:
/// the caller asserts the order is correct, and re-normalizing is a no-op.
/// Named arguments are reordered by walking the signature's parameters;
/// missing parameters become [`Value::Null`] and undeclared keys are dropped
/// into [`Normalized::dropped`].
///
/// # Examples
///
/// ```
/// use soapline::{normalize, CallArgs, Catalog};
/// use serde_json::json;
///
/// let catalog = Catalog::build(["string greet(string $a, string $b, int $c)"]);
/// let signature = catalog.lookup("greet").unwrap();
///
/// let result = normalize(signature, CallArgs::named([
///     ("c", json!(3)),
///     ("a", json!(1)),
///     ("x", json!(9)),
/// ]));
/// assert_eq!(result.values, vec![json!(1), json!(null), json!(3)]);
/// assert_eq!(result.dropped, vec!["x"]);
/// ```
pub fn normalize(signature: &Signature, args: CallArgs) -> Normalized {
    match args {
        CallArgs::Positional(values) => Normalized {
            values,
            dropped: Vec::new(),
        },
        CallArgs::Named(mut entries) => {
            let mut values = Vec::with_capacity(signature.params().len());
            for param in signature.params() {
                match entries.remove(param) {
                    Some(value) => values.push(value),
                    None => {
                        tracing::debug!(
                            operation = %signature.name(),
                            parameter = %param,
                            "missing argument filled with null"
                        );
                        values.push(Value::Null);
                    }
                }
            }
            let mut dropped: Vec<String> = entries.into_keys().collect();
            dropped.sort();
            Normalized { values, dropped }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use serde_json::json;

    fn signature(raw: &str) -> Signature {
        let catalog = Catalog::build([raw]);
        let sig = catalog.signatures().next().unwrap().clone();
        sig
    }

    #[test]
    fn named_args_are_reordered_with_null_fill_and_dropped_extras() {
        let sig = signature("string op(string $a, string $b, int $c)");
        let result = normalize(
            &sig,
            CallArgs::named([("c", json!(3)), ("a", json!(1)), ("x", json!(9))]),
        );
        assert_eq!(result.values, vec![json!(1), Value::Null, json!(3)]);
        assert_eq!(result.dropped, vec!["x"]);
    }

    #[test]
    fn positional_args_pass_through_unchanged() {
        let sig = signature("string op(string $a, string $b)");
        let result = normalize(&sig, CallArgs::positional([json!(10), json!(20)]));
        assert_eq!(result.values, vec![json!(10), json!(20)]);
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn normalizing_positional_args_is_idempotent() {
        let sig = signature("string op(string $a, string $b)");
        let once = normalize(&sig, CallArgs::positional([json!(10), json!(20)]));
        let twice = normalize(&sig, CallArgs::Positional(once.values.clone()));
        assert_eq!(once.values, twice.values);
    }

    #[test]
    fn positional_arity_is_not_validated() {
        // The caller asserts order; too few or too many values are passed on
        // for the remote service to reject.
        let sig = signature("string op(string $a, string $b)");
        let result = normalize(&sig, CallArgs::positional([json!(1)]));
        assert_eq!(result.values, vec![json!(1)]);
    }

    #[test]
    fn all_params_missing_yields_all_nulls() {
        let sig = signature("string op(string $a, string $b)");
        let result = normalize(&sig, CallArgs::named([] as [(&str, Value); 0]));
        assert_eq!(result.values, vec![Value::Null, Value::Null]);
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn dropped_keys_are_sorted() {
        let sig = signature("string op(string $a)");
        let result = normalize(
            &sig,
            CallArgs::named([("z", json!(1)), ("a", json!(2)), ("m", json!(3))]),
        );
        assert_eq!(result.dropped, vec!["m", "z"]);
    }
}
