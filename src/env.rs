use std::collections::HashMap;

/// A snapshot of environment variables with typed accessors.
///
/// Every accessor returns `None` when the variable is absent, empty, or
/// malformed. Reading never fails.
///
/// Tests build an `Env` from synthetic pairs instead of mutating the
/// process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Snapshot the current process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { vars }
    }

    fn raw(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The value of `name`. Empty counts as absent.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.raw(name).map(str::to_string)
    }

    /// `Some(true)` for the literal `true`, `Some(false)` for `false`, else `None`.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.raw(name).and_then(parse_bool)
    }

    /// A base-10 signed integer within `i32` range.
    pub fn get_int32(&self, name: &str) -> Option<i32> {
        self.raw(name).and_then(parse_int32)
    }

    /// Split on `,` without trimming or dropping empty elements.
    pub fn get_string_list(&self, name: &str) -> Option<Vec<String>> {
        self.raw(name)
            .map(|v| v.split(',').map(str::to_string).collect())
    }

    /// Parse a single enum name with `parse`. Unknown names count as absent.
    pub fn get_enum<T>(&self, name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        self.raw(name).and_then(parse)
    }

    /// Parse a comma-separated list element by element.
    ///
    /// Each element is trimmed before `parse`. Elements `parse` rejects are
    /// skipped. If nothing survives the variable counts as absent.
    pub fn get_list<T>(&self, name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
        let values: Vec<T> = self
            .raw(name)?
            .split(',')
            .filter_map(|element| parse(element.trim()))
            .collect();
        if values.is_empty() { None } else { Some(values) }
    }
}

/// Accepts only the literals `true` and `false`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

pub fn parse_int32(value: &str) -> Option<i32> {
    value.parse::<i32>().ok()
}
