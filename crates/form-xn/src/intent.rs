// File: src/intent.rs
// Purpose: Compose and split "intent?key=value&..." action strings

use crate::query::QueryParams;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// An intent name plus the parameters addressing one handler instance.
///
/// Renders as `intent` when there are no parameters, otherwise as
/// `intent?k1=v1&k2=v2` in insertion order.
///
/// ```
/// use form_xn::FormAction;
///
/// let action = FormAction::new("updateTodo").param("id", 42);
/// assert_eq!(action.to_string(), "updateTodo?id=42");
///
/// let parsed: FormAction = "updateTodo?id=42".parse().unwrap();
/// assert_eq!(parsed.intent(), "updateTodo");
/// assert_eq!(parsed.params().get("id"), Some("42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormAction {
    intent: String,
    params: QueryParams,
}

impl FormAction {
    pub fn new(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            params: QueryParams::new(),
        }
    }

    /// Add a parameter, stringified with `Display`.
    pub fn param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.set(key, value.to_string());
        self
    }

    /// Add a parameter only when a value is present.
    pub fn param_opt<V: fmt::Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Split an action string on its first `?`.
    pub fn parse(action: &str) -> Self {
        match action.split_once('?') {
            Some((intent, query)) => Self {
                intent: intent.to_string(),
                params: QueryParams::parse(query),
            },
            None => Self::new(action),
        }
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn into_parts(self) -> (String, QueryParams) {
        (self.intent, self.params)
    }
}

impl fmt::Display for FormAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            f.write_str(&self.intent)
        } else {
            write!(f, "{}?{}", self.intent, self.params.to_query_string())
        }
    }
}

impl FromStr for FormAction {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for FormAction {
    fn from(action: &str) -> Self {
        Self::parse(action)
    }
}

impl From<String> for FormAction {
    fn from(action: String) -> Self {
        Self::parse(&action)
    }
}

/// Build an action string from an intent and optional parameter values.
///
/// Absent values are skipped; everything else is stringified.
///
/// ```
/// use form_xn::build_form_action;
///
/// let action = build_form_action("updateTodo", [("id", Some(42)), ("page", None)]);
/// assert_eq!(action, "updateTodo?id=42");
/// assert_eq!(build_form_action("addTodo", Vec::<(&str, Option<u8>)>::new()), "addTodo");
/// ```
pub fn build_form_action<I, K, V>(intent: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: Into<String>,
    V: fmt::Display,
{
    params
        .into_iter()
        .fold(FormAction::new(intent), |action, (key, value)| {
            action.param_opt(key, value)
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_build_without_params() {
        assert_eq!(FormAction::new("addTodo").to_string(), "addTodo");
    }

    #[test]
    fn test_build_update_todo() {
        assert_eq!(
            build_form_action("updateTodo", [("id", Some("42"))]),
            "updateTodo?id=42"
        );
    }

    #[test]
    fn test_build_keeps_caller_order() {
        let action = FormAction::new("list")
            .param("page", 2)
            .param("sort", "title")
            .param("desc", true);
        assert_eq!(action.to_string(), "list?page=2&sort=title&desc=true");
    }

    #[test]
    fn test_build_skips_absent_values() {
        let action = build_form_action("list", [("page", None), ("sort", Some("title"))]);
        assert_eq!(action, "list?sort=title");

        let action = build_form_action("list", [("page", None::<u32>)]);
        assert_eq!(action, "list");
    }

    #[test]
    fn test_build_encodes_values() {
        let action = FormAction::new("search").param("q", "milk & eggs");
        assert_eq!(action.to_string(), "search?q=milk+%26+eggs");
    }

    #[rstest]
    #[case("addTodo", "addTodo", &[])]
    #[case("updateTodo?id=42", "updateTodo", &[("id", "42")])]
    #[case("a?x=1&y=two", "a", &[("x", "1"), ("y", "two")])]
    #[case("a?x=1?y=2", "a", &[("x", "1?y=2")])]
    #[case("?x=1", "", &[("x", "1")])]
    fn test_parse(#[case] input: &str, #[case] intent: &str, #[case] params: &[(&str, &str)]) {
        let action = FormAction::parse(input);
        assert_eq!(action.intent(), intent);
        assert_eq!(action.params().iter().collect::<Vec<_>>(), params.to_vec());
    }

    #[test]
    fn test_round_trip_restricted_to_present_params() {
        let params = [
            ("id", Some("42".to_string())),
            ("filter", None),
            ("q", Some("a=b&c".to_string())),
        ];
        let built = build_form_action("updateTodo", params.clone());

        let (intent, query) = built.split_once('?').expect("has params");
        assert_eq!(intent, "updateTodo");

        let expected: QueryParams = params
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (*k, v.as_str())))
            .collect();
        assert_eq!(QueryParams::parse(query), expected);
    }
}
