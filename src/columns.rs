use crate::record::{FieldKey, Record, Value};

/// Header configuration for one table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: FieldKey,
    pub label: &'static str,
    pub numeric: bool,
    pub percent: bool,
}

impl ColumnSpec {
    /// Cell text for `record`. Percent columns hold fractions and are shown
    /// scaled by 100.
    pub fn cell(&self, record: &Record) -> String {
        match record.get(self.field) {
            Ok(Value::Number(n)) if self.percent => format!("{:.1}%", n * 100.0),
            _ => record.display(self.field),
        }
    }
}

const fn text(field: FieldKey, label: &'static str) -> ColumnSpec {
    ColumnSpec {
        field,
        label,
        numeric: false,
        percent: false,
    }
}

const fn number(field: FieldKey, label: &'static str) -> ColumnSpec {
    ColumnSpec {
        field,
        label,
        numeric: true,
        percent: false,
    }
}

const fn percent(field: FieldKey, label: &'static str) -> ColumnSpec {
    ColumnSpec {
        percent: true,
        ..number(field, label)
    }
}

/// Columns in display order.
pub const COLUMNS: [ColumnSpec; 17] = [
    text(FieldKey::Campaign, "Campaign"),
    text(FieldKey::CampaignId, "Campaign ID"),
    text(FieldKey::Ad, "Ad"),
    text(FieldKey::AdId, "Ad ID"),
    text(FieldKey::Day, "Day"),
    number(FieldKey::Spent, "Spent"),
    number(FieldKey::Impressions, "Impressions"),
    number(FieldKey::Clicks, "Clicks"),
    number(FieldKey::Reach, "Reach"),
    number(FieldKey::Views25, "25% Views"),
    number(FieldKey::Views50, "50% Views"),
    number(FieldKey::Views75, "75% Views"),
    number(FieldKey::Views100, "100% Views"),
    number(FieldKey::Sessions, "Sessions"),
    percent(FieldKey::BounceRate, "Bounce Rate"),
    number(FieldKey::AverageSessionDuration, "Avg Session Duration"),
    number(FieldKey::PagesPerSession, "Pages Per Session"),
];
