use chrono::NaiveDate;
use serde_json::{Map, Number, Value};

use crate::draft::Draft;
use crate::validate::{Rule, ValidationErrors, validate};

/// Input widget of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    LongText,
    Date,
    Select(&'static [&'static str]),
    /// Identifier of a record of another entity (`locationId` → `location`).
    Reference(&'static str),
    Number,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::LongText => "long_text",
            Self::Date => "date",
            Self::Select(_) => "select",
            Self::Reference(_) => "reference",
            Self::Number => "number",
        }
    }
}

/// Initial value of a field in a create-mode template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Empty,
    /// The current date, `YYYY-MM-DD`.
    Today,
    Value(&'static str),
}

/// One editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Wire name (`serialNumber`).
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: FieldDefault,
}

impl FieldDef {
    pub const fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            default: FieldDefault::Empty,
        }
    }

    pub const fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub const fn default_to(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }
}

/// Field whitelist and rule table of one entity form.
#[derive(Debug, Clone)]
pub struct FormSchema {
    pub entity: &'static str,
    pub fields: Vec<FieldDef>,
    pub rules: Vec<Rule>,
}

impl FormSchema {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            fields: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_def(name).is_some()
    }

    /// `true` if some `Required` rule covers `name`.
    pub fn is_required(&self, name: &str) -> bool {
        self.rules
            .iter()
            .any(|r| r.field == name && matches!(r.check, crate::validate::Check::Required))
    }

    /// Blank create-mode draft.
    pub fn template(&self, today: NaiveDate) -> Draft {
        let mut draft = Draft::new();
        for f in &self.fields {
            let value = match f.default {
                FieldDefault::Empty => String::new(),
                FieldDefault::Today => today.format("%Y-%m-%d").to_string(),
                FieldDefault::Value(v) => v.to_string(),
            };
            draft.set(f.name, value);
        }
        draft
    }

    /// Copy the whitelisted fields of a loaded record into a draft.
    ///
    /// Backend-only fields (timestamps, computed columns) are dropped.
    pub fn draft_from(&self, id: &str, record: &Value) -> Draft {
        let mut draft = Draft::for_record(id);
        for f in &self.fields {
            let value = match record.get(f.name) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                _ => String::new(),
            };
            draft.set(f.name, value);
        }
        draft
    }

    /// Request body for `draft`: whitelisted fields only, identifier
    /// excluded.
    ///
    /// Number fields are sent as JSON numbers, a blank number as `null`.
    pub fn payload(&self, draft: &Draft) -> Value {
        let mut body = Map::new();
        for f in &self.fields {
            let raw = draft.get(f.name).trim();
            let value = match f.kind {
                FieldKind::Number if raw.is_empty() => Value::Null,
                FieldKind::Number => number(raw),
                _ => Value::String(raw.to_string()),
            };
            body.insert(f.name.to_string(), value);
        }
        Value::Object(body)
    }

    pub fn validate(&self, draft: &Draft) -> ValidationErrors {
        validate(&self.rules, draft)
    }
}

fn number(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}
