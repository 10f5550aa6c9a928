//! Signature catalog: what the service can do, and in which argument order.
//!
//! The catalog is built once from the raw signature strings extracted from
//! the service's interface contract and is immutable for the client's
//! lifetime. Each entry maps an operation name to the declared, ordered
//! parameter names; that ordering is what the argument normalizer reorders
//! named arguments against.

use std::collections::HashMap;

use serde::Serialize;

/// One operation's name plus its declared, ordered parameter names.
///
/// Signatures are produced by [`Catalog::build`] and never change afterwards.
///
/// # Examples
///
/// ```
/// use soapline::Catalog;
///
/// let catalog = Catalog::build(["string sayHello(string $who, int $times)"]);
/// let signature = catalog.lookup("sayHello").unwrap();
/// assert_eq!(signature.name(), "sayHello");
/// assert_eq!(signature.params(), ["who", "times"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    name: String,
    params: Vec<String>,
}

impl Signature {
    /// The operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parameter names, in contract order.
    pub fn params(&self) -> &[String] {
        &self.params
    }
}

/// Mapping from operation name to [`Signature`], built from raw signature
/// strings of the shape `<returnType> <name>(<type> $<param>, ...)`.
///
/// Construction is lenient: entries that do not parse are skipped with a
/// warning rather than failing the build, and duplicate operation names keep
/// the first occurrence. A contract with defects still yields a usable
/// catalog for the operations that did parse.
#[derive(Debug, Default)]
pub struct Catalog {
    signatures: HashMap<String, Signature>,
}

impl Catalog {
    /// Builds a catalog from raw signature strings.
    ///
    /// Unparsable entries and duplicate operation names are dropped with a
    /// warning; neither is an error.
    pub fn build<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut signatures = HashMap::new();
        for entry in raw {
            let entry = entry.into();
            let Some(signature) = parse_signature(&entry) else {
                tracing::warn!(entry = %entry, "skipping unparsable signature entry");
                continue;
            };
            if signatures.contains_key(signature.name()) {
                tracing::warn!(
                    operation = %signature.name(),
                    "skipping duplicate signature entry; first occurrence wins"
                );
                continue;
            }
            signatures.insert(signature.name.clone(), signature);
        }
        Self { signatures }
    }

    /// Looks up the signature for an operation name.
    pub fn lookup(&self, name: &str) -> Option<&Signature> {
        self.signatures.get(name)
    }

    /// Number of operations in the catalog.
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Returns `true` if the catalog holds no operations.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Iterates over every signature, in no guaranteed order.
    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.values()
    }
}

/// Parses one raw signature string.
///
/// Extracts only what the call pipeline needs: the operation name (the last
/// whitespace-separated token before the opening parenthesis) and the ordered
/// `$`-prefixed parameter names. Return and parameter types are ignored.
/// Returns `None` when the entry has no parameter list, no operation name, or
/// a non-empty parameter clause without a `$name`.
fn parse_signature(raw: &str) -> Option<Signature> {
    let open = raw.find('(')?;
    let close = raw.rfind(')')?;
    if close < open {
        return None;
    }

    let name = raw[..open].split_whitespace().last()?.to_string();
    if name.is_empty() {
        return None;
    }

    let mut params = Vec::new();
    for clause in raw[open + 1..close].split(',') {
        if clause.trim().is_empty() {
            // Empty clause from a trailing comma or a bare `()`.
            continue;
        }
        let dollar = clause.find('$')?;
        let param: String = clause[dollar + 1..]
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if param.is_empty() {
            return None;
        }
        params.push(param);
    }

    Some(Signature { name, params })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_ordered_params() {
        let catalog = Catalog::build(["string sayHello(string $who, int $times)"]);
        let sig = catalog.lookup("sayHello").unwrap();
        assert_eq!(sig.name(), "sayHello");
        assert_eq!(sig.params(), ["who", "times"]);
    }

    #[test]
    fn parses_parameterless_signature() {
        let catalog = Catalog::build(["int getServerTime()"]);
        let sig = catalog.lookup("getServerTime").unwrap();
        assert!(sig.params().is_empty());
    }

    #[test]
    fn tolerates_surrounding_whitespace_and_trailing_comma() {
        let catalog = Catalog::build(["  array listUsers( string $filter, )  "]);
        let sig = catalog.lookup("listUsers").unwrap();
        assert_eq!(sig.params(), ["filter"]);
    }

    #[test]
    fn skips_unparsable_entries_without_failing_the_build() {
        let catalog = Catalog::build([
            "not a signature at all",
            "string good(string $x)",
            "string broken(string no_dollar)",
            "",
        ]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.lookup("good").is_some());
        assert!(catalog.lookup("broken").is_none());
    }

    #[test]
    fn duplicate_names_keep_the_first_entry() {
        let catalog = Catalog::build([
            "string frob(string $a)",
            "string frob(string $a, string $b)",
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("frob").unwrap().params(), ["a"]);
    }

    #[test]
    fn lookup_misses_report_none() {
        let catalog = Catalog::build(["string sayHello(string $who)"]);
        assert!(catalog.lookup("sayGoodbye").is_none());
    }

    #[test]
    fn complex_types_in_clauses_do_not_confuse_the_parser() {
        let catalog = Catalog::build(["ArrayOfUser findUsers(UserFilter $filter, int $limit)"]);
        let sig = catalog.lookup("findUsers").unwrap();
        assert_eq!(sig.params(), ["filter", "limit"]);
    }
}
