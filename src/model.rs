use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::columns::COLUMNS;
use crate::domain::{CtConfig, CtError, HELP_TEXT, Message, PAGE_SIZE_OPTIONS};
use crate::loader::Dataset;
use crate::record::{FieldKey, Identity, Record};
use crate::state::{SortDirection, TableState};
use crate::ui::{BORDER_WIDTH, CHECKBOX_WIDTH, COLUMN_WIDTH_MARGIN};
use crate::view::{PageView, SelectAll, compute_view};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub label: String,
    pub width: usize,
    pub numeric: bool,
    pub sorted: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub cells: Vec<String>,
    pub selected: bool,
}

/// Everything the UI needs for one frame, detached from the records.
#[derive(Debug, Clone)]
pub struct UIData {
    pub name: String,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub padding_rows: usize,
    pub select_all: SelectAll,
    pub selected_row: usize,
    pub selected_column: usize,
    pub range_label: String,
    pub page_size: usize,
    pub selected_count: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub status_message: String,
    pub last_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            headers: Vec::new(),
            rows: Vec::new(),
            padding_rows: 0,
            select_all: SelectAll::None,
            selected_row: 0,
            selected_column: 0,
            range_label: String::new(),
            page_size: 0,
            selected_count: 0,
            show_popup: false,
            popup_message: String::new(),
            status_message: String::new(),
            last_update: Instant::now(),
        }
    }
}

/// One computed page, copied out of the records it was sliced from.
struct PageRows {
    identities: Vec<String>,
    rows: Vec<RowView>,
    padding_rows: usize,
    page_count: usize,
    select_all: SelectAll,
    range_label: String,
}

impl PageRows {
    fn new(view: &PageView, state: &TableState) -> Self {
        PageRows {
            identities: view.visible_rows.iter().map(|r| r.identity.clone()).collect(),
            rows: view
                .visible_rows
                .iter()
                .map(|r| RowView {
                    cells: COLUMNS.iter().map(|c| c.cell(r.record)).collect(),
                    selected: r.selected,
                })
                .collect(),
            padding_rows: view.padding_row_count,
            page_count: view.page_count,
            select_all: view.select_all,
            range_label: view.range_label(state),
        }
    }
}

pub struct Model {
    config: CtConfig,
    pub status: Status,
    modus: Modus,
    name: String,
    records: Vec<Record>,
    identities: Vec<String>,
    state: TableState,
    visible_identities: Vec<String>,
    page_count: usize,
    select_all: SelectAll,
    curser_row: usize,
    curser_column: usize,
    offset_column: usize,
    visible_columns: Vec<usize>,
    width: usize,
    uidata: UIData,
    status_message: String,
}

impl Model {
    pub fn init(config: &CtConfig, dataset: Dataset, ui_width: usize) -> Result<Self, CtError> {
        let mut config = config.clone();
        if !dataset.fields.is_empty() && !dataset.fields.contains(&config.sort_field) {
            warn!(
                "Sort field {} is not in {}, falling back to {}",
                config.sort_field, dataset.name, dataset.fields[0]
            );
            config.sort_field = dataset.fields[0];
        }
        let state = TableState::from_config(&config)?;

        let mut model = Self {
            config,
            status: Status::READY,
            modus: Modus::TABLE,
            name: String::new(),
            records: Vec::new(),
            identities: Vec::new(),
            state,
            visible_identities: Vec::new(),
            page_count: 0,
            select_all: SelectAll::None,
            curser_row: 0,
            curser_column: 0,
            offset_column: 0,
            visible_columns: Vec::new(),
            width: ui_width,
            uidata: UIData::empty(),
            status_message: String::new(),
        };
        model.replace_records(dataset)?;
        model.set_status_message(format!(
            "Loaded {} records, press ? for help",
            model.records.len()
        ));
        Ok(model)
    }

    /// Swaps in a new record sequence. Selected identities that no longer
    /// exist are dropped and the view starts over at the first page.
    pub fn replace_records(&mut self, dataset: Dataset) -> Result<(), CtError> {
        let identities = self.config.identity.keys(&dataset.records)?;
        let mut seen = HashSet::with_capacity(identities.len());
        let duplicates = identities.iter().filter(|id| !seen.insert(*id)).count();
        if duplicates > 0 {
            warn!(
                "{duplicates} records share an identity with an earlier record, selecting one selects all of them"
            );
        }

        let state = self
            .state
            .clone()
            .retain_identities(identities.iter().map(String::as_str))
            .set_page(0);

        info!("Showing {} ({} records)", dataset.name, dataset.records.len());
        self.name = dataset.name;
        self.records = dataset.records;
        self.identities = identities;
        self.curser_row = 0;
        self.apply(state)
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn identity(&self) -> &Identity {
        &self.config.identity
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), CtError> {
        let Some(msg) = message else {
            return Ok(());
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);

        let result = match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => {
                    self.quit();
                    Ok(())
                }
                Message::MoveUp => self.move_row(-1),
                Message::MoveDown => self.move_row(1),
                Message::MoveLeft => self.move_column_left(),
                Message::MoveRight => self.move_column_right(),
                Message::ToggleSort => self.toggle_sort(),
                Message::ToggleRow => self.toggle_row(),
                Message::ToggleAll => self.toggle_all(),
                Message::NextPage => self.next_page(),
                Message::PreviousPage => self.previous_page(),
                Message::FirstPage => self.apply(self.state.clone().set_page(0)),
                Message::LastPage => {
                    let last = self.page_count.saturating_sub(1);
                    self.apply(self.state.clone().set_page(last))
                }
                Message::IncreasePageSize => self.step_page_size(true),
                Message::DecreasePageSize => self.step_page_size(false),
                Message::Resize(width, _height) => self.ui_resize(width),
                Message::Help => {
                    self.show_help();
                    Ok(())
                }
                Message::Exit => Ok(()),
            },
            Modus::POPUP => match msg {
                Message::Quit => {
                    self.quit();
                    Ok(())
                }
                Message::Resize(width, _height) => self.ui_resize(width),
                Message::Exit | Message::Help => {
                    self.close_popup();
                    Ok(())
                }
                _ => Ok(()),
            },
        };

        match result {
            Err(e @ (CtError::FieldNotFound(_) | CtError::InvalidArgument(_))) => {
                error!("{e}");
                self.set_status_message(format!("Error: {e}"));
                Ok(())
            }
            other => other,
        }
    }

    // -------------------- Control handling functions ---------------------- //

    /// Recomputes the view for `next` and commits it. On error the previous
    /// state stays in place.
    fn apply(&mut self, next: TableState) -> Result<(), CtError> {
        let page = PageRows::new(
            &compute_view(&self.records, &next, &self.config.identity)?,
            &next,
        );
        self.state = next;
        self.absorb_page(page);
        Ok(())
    }

    fn absorb_page(&mut self, page: PageRows) {
        let PageRows {
            identities,
            rows,
            padding_rows,
            page_count,
            select_all,
            range_label,
        } = page;
        self.visible_identities = identities;
        self.page_count = page_count;
        self.select_all = select_all;
        self.curser_row = self
            .curser_row
            .min(self.visible_identities.len().saturating_sub(1));

        let widths: Vec<usize> = COLUMNS
            .iter()
            .enumerate()
            .map(|(cidx, c)| {
                let cell_width = rows
                    .iter()
                    .map(|r| r.cells[cidx].chars().count())
                    .max()
                    .unwrap_or(0);
                let width = std::cmp::max(c.label.chars().count() + 2, cell_width)
                    + COLUMN_WIDTH_MARGIN;
                std::cmp::min(width, self.config.max_column_width)
            })
            .collect();
        self.update_visible_columns(&widths);

        let headers = self
            .visible_columns
            .iter()
            .map(|&cidx| {
                let column = &COLUMNS[cidx];
                HeaderView {
                    label: column.label.to_string(),
                    width: widths[cidx],
                    numeric: column.numeric,
                    sorted: (column.field == self.state.sort_field)
                        .then_some(self.state.sort_direction),
                }
            })
            .collect();

        let rows = rows
            .into_iter()
            .map(|r| RowView {
                cells: self
                    .visible_columns
                    .iter()
                    .map(|&cidx| r.cells[cidx].clone())
                    .collect(),
                selected: r.selected,
            })
            .collect();

        self.uidata = UIData {
            name: self.name.clone(),
            headers,
            rows,
            padding_rows,
            select_all,
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            range_label,
            page_size: self.state.pagination.page_size,
            selected_count: self.state.selection.len(),
            show_popup: self.modus == Modus::POPUP,
            popup_message: self.uidata.popup_message.clone(),
            status_message: self.status_message.clone(),
            last_update: Instant::now(),
        };
    }

    fn update_visible_columns(&mut self, widths: &[usize]) {
        let table_width = self
            .width
            .saturating_sub(CHECKBOX_WIDTH + BORDER_WIDTH);

        self.visible_columns = Vec::new();
        let mut visible_width = 0;
        for (cidx, width) in widths.iter().enumerate().skip(self.offset_column) {
            if visible_width + width + 1 > table_width && !self.visible_columns.is_empty() {
                break;
            }
            self.visible_columns.push(cidx);
            visible_width += width + 1;
        }
        self.curser_column = std::cmp::min(
            self.curser_column,
            self.visible_columns.len().saturating_sub(1),
        );
    }

    fn refresh(&mut self) -> Result<(), CtError> {
        self.apply(self.state.clone())
    }

    fn current_field(&self) -> FieldKey {
        let cidx = self
            .visible_columns
            .get(self.curser_column)
            .copied()
            .unwrap_or(0);
        COLUMNS[cidx].field
    }

    fn toggle_sort(&mut self) -> Result<(), CtError> {
        let field = self.current_field();
        self.apply(self.state.clone().toggle_sort(field))?;
        self.set_status_message(format!("{} {}", field, self.state.sort_direction));
        Ok(())
    }

    fn toggle_row(&mut self) -> Result<(), CtError> {
        let Some(identity) = self.visible_identities.get(self.curser_row).cloned() else {
            return Ok(());
        };
        debug!("Toggle selection of {identity}");
        self.apply(self.state.clone().toggle_row_selection(&identity))
    }

    fn toggle_all(&mut self) -> Result<(), CtError> {
        let checked = self.select_all != SelectAll::All;
        let next = self
            .state
            .clone()
            .toggle_select_all(self.identities.iter().cloned(), checked);
        self.apply(next)
    }

    fn next_page(&mut self) -> Result<(), CtError> {
        let page = self.state.pagination.page_index;
        if page + 1 < self.page_count {
            self.apply(self.state.clone().set_page(page + 1))?;
        }
        Ok(())
    }

    fn previous_page(&mut self) -> Result<(), CtError> {
        let page = self.state.pagination.page_index;
        if page > 0 {
            self.apply(self.state.clone().set_page(page - 1))?;
        }
        Ok(())
    }

    fn step_page_size(&mut self, grow: bool) -> Result<(), CtError> {
        let current = self.state.pagination.page_size;
        let next = if grow {
            PAGE_SIZE_OPTIONS.iter().find(|&&s| s > current)
        } else {
            PAGE_SIZE_OPTIONS.iter().rev().find(|&&s| s < current)
        };
        if let Some(&size) = next {
            self.apply(self.state.clone().set_page_size(size)?)?;
            self.set_status_message(format!("{size} rows per page"));
        }
        Ok(())
    }

    fn move_row(&mut self, step: isize) -> Result<(), CtError> {
        let last = self.visible_identities.len().saturating_sub(1);
        self.curser_row = self.curser_row.saturating_add_signed(step).min(last);
        self.uidata.selected_row = self.curser_row;
        self.uidata.last_update = Instant::now();
        Ok(())
    }

    fn move_column_left(&mut self) -> Result<(), CtError> {
        if self.curser_column > 0 {
            self.curser_column -= 1;
        } else if self.offset_column > 0 {
            self.offset_column -= 1;
        }
        self.refresh()
    }

    fn move_column_right(&mut self) -> Result<(), CtError> {
        let absolute = self.offset_column + self.curser_column;
        if absolute + 1 < COLUMNS.len() {
            if self.curser_column + 1 < self.visible_columns.len() {
                self.curser_column += 1;
            } else {
                self.offset_column += 1;
            }
        }
        self.refresh()
    }

    fn ui_resize(&mut self, width: usize) -> Result<(), CtError> {
        trace!("UI was resized! w:{}->{}", self.width, width);
        self.width = width;
        self.refresh()
    }

    fn show_help(&mut self) {
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
        self.uidata.last_update = Instant::now();
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = Modus::TABLE;
        self.uidata.show_popup = false;
        self.uidata.last_update = Instant::now();
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_update = Instant::now();
    }
}
