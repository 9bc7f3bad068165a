use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::draft::Draft;

/// Field name to message, one entry per violated field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation. A later message for the same field replaces the
    /// earlier one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

/// What a rule checks.
///
/// Every check except `Required` and `Custom` accepts a blank value, so an
/// optional field only has to be well-formed when filled.
#[derive(Clone, Copy)]
pub enum Check {
    Required,
    /// `YYYY-MM-DD`, RFC 3339, or `YYYY-MM-DDTHH:MM[:SS]`.
    Date,
    OneOf(&'static [&'static str]),
    Number { min: Option<f64> },
    /// Cross-field predicate over the whole draft; `true` means valid.
    Custom(fn(&Draft) -> bool),
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Required => f.write_str("Required"),
            Check::Date => f.write_str("Date"),
            Check::OneOf(options) => f.debug_tuple("OneOf").field(options).finish(),
            Check::Number { min } => f.debug_struct("Number").field("min", min).finish(),
            Check::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One row of an entity's rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
}

impl Rule {
    pub const fn required(field: &'static str, message: &'static str) -> Self {
        Self {
            field,
            check: Check::Required,
            message,
        }
    }

    pub const fn date(field: &'static str, message: &'static str) -> Self {
        Self {
            field,
            check: Check::Date,
            message,
        }
    }

    pub const fn one_of(
        field: &'static str,
        options: &'static [&'static str],
        message: &'static str,
    ) -> Self {
        Self {
            field,
            check: Check::OneOf(options),
            message,
        }
    }

    pub const fn number(field: &'static str, min: Option<f64>, message: &'static str) -> Self {
        Self {
            field,
            check: Check::Number { min },
            message,
        }
    }

    pub const fn custom(field: &'static str, check: fn(&Draft) -> bool, message: &'static str) -> Self {
        Self {
            field,
            check: Check::Custom(check),
            message,
        }
    }

    /// `true` if `draft` satisfies this rule.
    pub fn passes(&self, draft: &Draft) -> bool {
        let value = draft.get(self.field).trim();
        match self.check {
            Check::Required => !value.is_empty(),
            Check::Custom(check) => check(draft),
            _ if value.is_empty() => true,
            Check::Date => parse_date(value).is_some(),
            Check::OneOf(options) => options.contains(&value),
            Check::Number { min } => value
                .parse::<f64>()
                .is_ok_and(|n| n.is_finite() && min.is_none_or(|m| n >= m)),
        }
    }
}

/// Run every rule against `draft`. Never stops at the first failure.
pub fn validate(rules: &[Rule], draft: &Draft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for rule in rules {
        if !rule.passes(draft) {
            errors.insert(rule.field, rule.message);
        }
    }
    errors
}

/// Parse the date part of a form value.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &[&str] = &["Active", "Ready", "Terminate"];

    fn rules() -> Vec<Rule> {
        vec![
            Rule::required("serialNumber", "Serial number is required"),
            Rule::required("dateActivation", "Activation date is required"),
            Rule::date("dateActivation", "Activation date is not a valid date"),
            Rule::one_of("status", STATUS, "Status must be Active, Ready or Terminate"),
            Rule::number("length", Some(0.0), "Length must be a non-negative number"),
        ]
    }

    #[test]
    fn all_rules_run_without_short_circuit() {
        let draft = Draft::new()
            .with("dateActivation", "yesterday")
            .with("status", "Broken")
            .with("length", "-3");

        let errors = validate(&rules(), &draft);

        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["dateActivation", "length", "serialNumber", "status"]
        );
    }

    #[test]
    fn valid_draft_has_no_errors() {
        let draft = Draft::new()
            .with("serialNumber", "ZTEG0001")
            .with("dateActivation", "2024-03-01T08:30:00.000Z")
            .with("status", "Ready")
            .with("length", "120.5");
        assert!(validate(&rules(), &draft).is_empty());
    }

    #[test]
    fn format_checks_accept_blank() {
        let draft = Draft::new()
            .with("serialNumber", "x")
            .with("dateActivation", "2024-03-01");
        assert!(validate(&rules(), &draft).is_empty());
    }

    #[test]
    fn later_rule_message_wins() {
        let rules = [
            Rule::required("dateOut", "Date out is required"),
            Rule::custom("dateOut", |d| d.get("dateOut") != "never", "Date out is invalid"),
        ];
        let errors = validate(&rules, &Draft::new().with("dateOut", "   "));
        assert_eq!(errors.get("dateOut"), Some("Date out is required"));

        let rules = [
            Rule::custom("dateOut", |d| !d.is_blank("dateOut"), "first"),
            Rule::required("dateOut", "second"),
        ];
        let errors = validate(&rules, &Draft::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("dateOut"), Some("second"));
    }

    #[test]
    fn custom_rule_sees_whole_draft() {
        fn out_after_in(d: &Draft) -> bool {
            match (parse_date(d.get("dateIn")), parse_date(d.get("dateOut"))) {
                (Some(a), Some(b)) => b >= a,
                _ => true,
            }
        }
        let rules = [Rule::custom("dateOut", out_after_in, "Date out precedes date in")];

        let bad = Draft::new().with("dateIn", "2024-05-02").with("dateOut", "2024-05-01");
        let good = Draft::new().with("dateIn", "2024-05-02").with("dateOut", "2024-05-02");
        assert!(validate(&rules, &bad).contains("dateOut"));
        assert!(validate(&rules, &good).is_empty());
    }

    #[test]
    fn parse_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(parse_date("2024-01-31"), Some(d));
        assert_eq!(parse_date("2024-01-31T23:00:00+07:00"), Some(d));
        assert_eq!(parse_date("2024-01-31T10:15"), Some(d));
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("31/01/2024"), None);
    }

    #[test]
    fn display_joins_fields() {
        let mut errors = ValidationErrors::new();
        errors.insert("b", "two");
        errors.insert("a", "one");
        assert_eq!(errors.to_string(), "a: one; b: two");
    }
}
