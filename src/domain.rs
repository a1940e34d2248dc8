use std::io;
use std::time::Duration;

use derive_setters::Setters;
use polars::error::PolarsError;
use thiserror::Error;

use crate::record::{FieldKey, Identity};
use crate::state::SortDirection;

pub const PAGE_SIZE_OPTIONS: [usize; 3] = [5, 10, 25];

pub const HELP_TEXT: &str = "\
ctab - campaign table viewer

  q            quit
  ↑ ↓ / k j    move row cursor
  ← → / h l    move column cursor
  s / Enter    sort by column under cursor (again to flip direction)
  Space        select / unselect row
  a            select / unselect all rows
  n / PgDn     next page
  p / PgUp     previous page
  g / G        first / last page
  + / -        more / fewer rows per page
  ?            show this help
  Esc          close popup";

#[derive(Debug, Error)]
pub enum CtError {
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type")]
    UnknownFileType,
    #[error("unknown field \"{0}\"")]
    UnknownField(String),
    #[error("record has no value for field \"{0}\"")]
    FieldNotFound(FieldKey),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
    #[error("logging setup failed: {0}")]
    LoggingFailed(String),
}

/// Runtime configuration, assembled from the command line in `main`.
#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct CtConfig {
    pub event_poll_time: u64,
    pub page_size: usize,
    pub sort_field: FieldKey,
    pub sort_direction: SortDirection,
    pub identity: Identity,
    pub max_column_width: usize,
}

impl Default for CtConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            page_size: PAGE_SIZE_OPTIONS[0],
            sort_field: FieldKey::CampaignId,
            sort_direction: SortDirection::Ascending,
            identity: Identity::default(),
            max_column_width: 24,
        }
    }
}

impl CtConfig {
    pub fn poll_duration(&self) -> Duration {
        Duration::from_millis(self.event_poll_time)
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Quit,
    Exit,
    Help,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ToggleSort,
    ToggleRow,
    ToggleAll,
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    IncreasePageSize,
    DecreasePageSize,
    Resize(usize, usize),
}
