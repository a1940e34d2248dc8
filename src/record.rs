use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::CtError;

const IDENTITY_SEPARATOR: char = '/';
const IDENTITY_ESCAPE: char = '\\';

/// One column of the campaign schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    #[serde(rename = "campaign")]
    Campaign,
    #[serde(rename = "campaign_id")]
    CampaignId,
    #[serde(rename = "ad")]
    Ad,
    #[serde(rename = "ad_id")]
    AdId,
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "spent")]
    Spent,
    #[serde(rename = "impressions")]
    Impressions,
    #[serde(rename = "clicks")]
    Clicks,
    #[serde(rename = "reach")]
    Reach,
    #[serde(rename = "views_25%")]
    Views25,
    #[serde(rename = "views_50%")]
    Views50,
    #[serde(rename = "views_75%")]
    Views75,
    #[serde(rename = "views_100%")]
    Views100,
    #[serde(rename = "sessions")]
    Sessions,
    #[serde(rename = "bounce_rate")]
    BounceRate,
    #[serde(rename = "average_session_duration")]
    AverageSessionDuration,
    #[serde(rename = "pages_per_session")]
    PagesPerSession,
}

impl FieldKey {
    pub const ALL: [FieldKey; 17] = [
        FieldKey::Campaign,
        FieldKey::CampaignId,
        FieldKey::Ad,
        FieldKey::AdId,
        FieldKey::Day,
        FieldKey::Spent,
        FieldKey::Impressions,
        FieldKey::Clicks,
        FieldKey::Reach,
        FieldKey::Views25,
        FieldKey::Views50,
        FieldKey::Views75,
        FieldKey::Views100,
        FieldKey::Sessions,
        FieldKey::BounceRate,
        FieldKey::AverageSessionDuration,
        FieldKey::PagesPerSession,
    ];

    /// Column name as it appears in data files.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKey::Campaign => "campaign",
            FieldKey::CampaignId => "campaign_id",
            FieldKey::Ad => "ad",
            FieldKey::AdId => "ad_id",
            FieldKey::Day => "day",
            FieldKey::Spent => "spent",
            FieldKey::Impressions => "impressions",
            FieldKey::Clicks => "clicks",
            FieldKey::Reach => "reach",
            FieldKey::Views25 => "views_25%",
            FieldKey::Views50 => "views_50%",
            FieldKey::Views75 => "views_75%",
            FieldKey::Views100 => "views_100%",
            FieldKey::Sessions => "sessions",
            FieldKey::BounceRate => "bounce_rate",
            FieldKey::AverageSessionDuration => "average_session_duration",
            FieldKey::PagesPerSession => "pages_per_session",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldKey {
    type Err = CtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKey::ALL
            .iter()
            .find(|f| f.name() == s)
            .copied()
            .ok_or_else(|| CtError::UnknownField(s.to_string()))
    }
}

/// A single cell. Comparison never coerces between the two variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Ordering of the stored values as-is: numeric for numbers, lexicographic
    /// for text. Numbers order before text when the variants differ.
    pub fn natural_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                if a == b {
                    Ordering::Equal
                } else {
                    a.total_cmp(b)
                }
            }
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// One row of the table. Fields missing from the source are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    values: BTreeMap<FieldKey, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: FieldKey, value: impl Into<Value>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn insert(&mut self, field: FieldKey, value: Value) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: FieldKey) -> Result<&Value, CtError> {
        self.values.get(&field).ok_or(CtError::FieldNotFound(field))
    }

    /// Cell text for rendering, `∅` for absent fields.
    pub fn display(&self, field: FieldKey) -> String {
        match self.values.get(&field) {
            Some(v) => v.to_string(),
            None => String::from("∅"),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The fields whose joined values identify a record for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    fields: Vec<FieldKey>,
}

impl Identity {
    pub fn new(fields: Vec<FieldKey>) -> Result<Self, CtError> {
        if fields.is_empty() {
            return Err(CtError::InvalidArgument(
                "identity needs at least one field".into(),
            ));
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldKey] {
        &self.fields
    }

    /// Field values joined by `/`. Separators and escapes inside a value are
    /// escaped with a backslash, so distinct value tuples never share a key.
    pub fn key(&self, record: &Record) -> Result<String, CtError> {
        let mut key = String::new();
        for (i, &field) in self.fields.iter().enumerate() {
            if i > 0 {
                key.push(IDENTITY_SEPARATOR);
            }
            for c in record.get(field)?.to_string().chars() {
                if c == IDENTITY_SEPARATOR || c == IDENTITY_ESCAPE {
                    key.push(IDENTITY_ESCAPE);
                }
                key.push(c);
            }
        }
        Ok(key)
    }

    /// Identity keys of all records in source order.
    pub fn keys(&self, records: &[Record]) -> Result<Vec<String>, CtError> {
        records.iter().map(|r| self.key(r)).collect()
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            fields: vec![FieldKey::AdId, FieldKey::Day],
        }
    }
}

impl FromStr for Identity {
    type Err = CtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s
            .split(',')
            .map(|f| f.trim().parse::<FieldKey>())
            .collect::<Result<Vec<FieldKey>, CtError>>()?;
        Identity::new(fields)
    }
}
