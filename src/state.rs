use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{CtConfig, CtError};
use crate::record::FieldKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("sorted ascending"),
            SortDirection::Descending => f.write_str("sorted descending"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: 5,
        }
    }
}

/// Selected identity keys. Membership is what counts, but iteration keeps
/// first-insertion order.
pub type Selection = IndexSet<String>;

/// Sort, selection and pagination state of one table.
///
/// Every transition consumes the state and returns the next one; nothing else
/// is touched. Callers recompute the view after each transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    pub sort_field: FieldKey,
    pub sort_direction: SortDirection,
    pub selection: Selection,
    pub pagination: Pagination,
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(FieldKey::CampaignId)
    }
}

impl TableState {
    pub fn new(sort_field: FieldKey) -> Self {
        Self {
            sort_field,
            sort_direction: SortDirection::Ascending,
            selection: Selection::new(),
            pagination: Pagination::default(),
        }
    }

    pub fn from_config(cfg: &CtConfig) -> Result<Self, CtError> {
        let mut state = Self::new(cfg.sort_field).set_page_size(cfg.page_size)?;
        state.sort_direction = cfg.sort_direction;
        Ok(state)
    }

    pub fn toggle_sort(mut self, field: FieldKey) -> Self {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Ascending;
        }
        trace!("Sort by {} {:?}", self.sort_field, self.sort_direction);
        self
    }

    pub fn toggle_select_all<I, S>(mut self, all_identities: I, checked: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection.clear();
        if checked {
            self.selection.extend(all_identities.into_iter().map(Into::into));
        }
        trace!("Select all: {checked}, {} selected", self.selection.len());
        self
    }

    pub fn toggle_row_selection(mut self, identity: &str) -> Self {
        if !self.selection.shift_remove(identity) {
            self.selection.insert(identity.to_string());
        }
        self
    }

    pub fn set_page(mut self, page_index: usize) -> Self {
        self.pagination.page_index = page_index;
        self
    }

    pub fn set_page_size(mut self, page_size: usize) -> Result<Self, CtError> {
        if page_size == 0 {
            return Err(CtError::InvalidArgument(
                "page size must be positive".into(),
            ));
        }
        self.pagination.page_size = page_size;
        self.pagination.page_index = 0;
        Ok(self)
    }

    /// Drops selected identities that are not in `identities`. Applied when
    /// the record sequence is replaced.
    pub fn retain_identities<'a, I>(mut self, identities: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: IndexSet<&str> = identities.into_iter().collect();
        let before = self.selection.len();
        self.selection.retain(|id| known.contains(id.as_str()));
        if before != self.selection.len() {
            trace!(
                "Dropped {} stale selections",
                before - self.selection.len()
            );
        }
        self
    }

    pub fn is_selected(&self, identity: &str) -> bool {
        self.selection.contains(identity)
    }

    /// Selected identities as a JSON array, in selection order.
    pub fn selection_json(&self) -> Result<String, CtError> {
        Ok(serde_json::to_string(&self.selection)?)
    }
}
