use tracing::trace;

use crate::domain::CtError;
use crate::record::{Identity, Record};
use crate::sort::{build_comparator, stable_sort};
use crate::state::TableState;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow<'a> {
    pub record: &'a Record,
    pub identity: String,
    pub selected: bool,
}

/// State of the select-all checkbox in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAll {
    None,
    Some,
    All,
}

/// What the presentation layer renders for one state. Borrows the records.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub visible_rows: Vec<ViewRow<'a>>,
    pub padding_row_count: usize,
    pub total_rows: usize,
    pub page_count: usize,
    pub select_all: SelectAll,
}

impl PageView<'_> {
    /// Pagination footer text, e.g. `6–7 of 7`.
    pub fn range_label(&self, state: &TableState) -> String {
        let start = state
            .pagination
            .page_index
            .saturating_mul(state.pagination.page_size);
        if self.visible_rows.is_empty() {
            return format!("0–0 of {}", self.total_rows);
        }
        format!(
            "{}–{} of {}",
            start + 1,
            start + self.visible_rows.len(),
            self.total_rows
        )
    }
}

/// Filler rows for a short page beyond the first. Page 0 never pads and a
/// page past the end of the data yields no rows and therefore no padding.
pub fn padding_rows(total_rows: usize, page_index: usize, page_size: usize) -> usize {
    if page_index == 0 {
        return 0;
    }
    if page_index.saturating_mul(page_size) >= total_rows {
        return 0;
    }
    (page_index + 1)
        .saturating_mul(page_size)
        .saturating_sub(total_rows)
}

pub fn page_count(total_rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total_rows.div_ceil(page_size)
    }
}

/// Checkbox state over the identities of the records, one per record. Stale
/// selected identities with no record do not count.
pub fn select_all_state(identities: &[String], state: &TableState) -> SelectAll {
    let selected = identities
        .iter()
        .filter(|id| state.is_selected(id.as_str()))
        .count();
    if selected == 0 {
        SelectAll::None
    } else if selected == identities.len() {
        SelectAll::All
    } else {
        SelectAll::Some
    }
}

/// Sorts, slices and marks the current page of `records`.
pub fn compute_view<'a>(
    records: &'a [Record],
    state: &TableState,
    identity: &Identity,
) -> Result<PageView<'a>, CtError> {
    let page_size = state.pagination.page_size;
    if page_size == 0 {
        return Err(CtError::InvalidArgument(
            "page size must be positive".into(),
        ));
    }
    let page_index = state.pagination.page_index;

    let sorted = stable_sort(
        records,
        build_comparator(state.sort_direction, state.sort_field),
    )?;

    let start = page_index.saturating_mul(page_size).min(sorted.len());
    let end = start.saturating_add(page_size).min(sorted.len());

    let visible_rows = sorted[start..end]
        .iter()
        .map(|&record| {
            let key = identity.key(record)?;
            Ok(ViewRow {
                record,
                selected: state.is_selected(&key),
                identity: key,
            })
        })
        .collect::<Result<Vec<ViewRow<'a>>, CtError>>()?;

    let select_all = select_all_state(&identity.keys(records)?, state);

    let view = PageView {
        visible_rows,
        padding_row_count: padding_rows(records.len(), page_index, page_size),
        total_rows: records.len(),
        page_count: page_count(records.len(), page_size),
        select_all,
    };
    trace!(
        "View: page {} size {}, rows {}..{}, padding {}",
        page_index, page_size, start, end, view.padding_row_count
    );
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldKey;
    use crate::state::SortDirection;

    fn rows(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                Record::new()
                    .with(FieldKey::CampaignId, format!("c{i}"))
                    .with(FieldKey::Spent, i as f64)
            })
            .collect()
    }

    fn by_campaign() -> Identity {
        Identity::new(vec![FieldKey::CampaignId]).unwrap()
    }

    fn spent_state() -> TableState {
        TableState::new(FieldKey::Spent)
    }

    #[test]
    fn short_second_page_is_padded() {
        let records = rows(7);
        let state = spent_state().set_page(1);
        let view = compute_view(&records, &state, &by_campaign()).unwrap();
        assert_eq!(view.visible_rows.len(), 2);
        assert_eq!(view.padding_row_count, 3);
        assert_eq!(view.page_count, 2);
        assert_eq!(view.range_label(&state), "6–7 of 7");
    }

    #[test]
    fn first_page_never_pads() {
        let records = rows(3);
        let view = compute_view(&records, &spent_state(), &by_campaign()).unwrap();
        assert_eq!(view.visible_rows.len(), 3);
        assert_eq!(view.padding_row_count, 0);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let records = rows(7);
        let state = spent_state().set_page(5);
        let view = compute_view(&records, &state, &by_campaign()).unwrap();
        assert!(view.visible_rows.is_empty());
        assert_eq!(view.padding_row_count, 0);
        assert_eq!(view.range_label(&state), "0–0 of 7");

        let huge = spent_state().set_page(usize::MAX);
        let view = compute_view(&records, &huge, &by_campaign()).unwrap();
        assert!(view.visible_rows.is_empty());
    }

    #[test]
    fn end_to_end_sort_keeps_ties_in_input_order() {
        let records = vec![
            Record::new().with(FieldKey::CampaignId, "A").with(FieldKey::Spent, 10.0),
            Record::new().with(FieldKey::CampaignId, "B").with(FieldKey::Spent, 5.0),
            Record::new().with(FieldKey::CampaignId, "C").with(FieldKey::Spent, 5.0),
        ];
        let view = compute_view(&records, &spent_state(), &by_campaign()).unwrap();
        let ids: Vec<&str> = view.visible_rows.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["B", "C", "A"]);

        let state = spent_state().toggle_sort(FieldKey::Spent);
        assert_eq!(state.sort_direction, SortDirection::Descending);
        let view = compute_view(&records, &state, &by_campaign()).unwrap();
        let ids: Vec<&str> = view.visible_rows.iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn selection_marks_rows() {
        let records = rows(4);
        let state = spent_state().toggle_row_selection("c2");
        let view = compute_view(&records, &state, &by_campaign()).unwrap();
        let selected: Vec<bool> = view.visible_rows.iter().map(|r| r.selected).collect();
        assert_eq!(selected, vec![false, false, true, false]);
        assert_eq!(view.select_all, SelectAll::Some);

        let all = state.toggle_select_all(by_campaign().keys(&records).unwrap(), true);
        let view = compute_view(&records, &all, &by_campaign()).unwrap();
        assert!(view.visible_rows.iter().all(|r| r.selected));
        assert_eq!(view.select_all, SelectAll::All);
    }

    #[test]
    fn select_all_covers_records_sharing_an_identity() {
        let mut records = rows(3);
        records.push(records[0].clone());
        let ids = by_campaign().keys(&records).unwrap();
        let all = spent_state().toggle_select_all(ids.iter().cloned(), true);
        assert_eq!(all.selection.len(), 3);
        let view = compute_view(&records, &all, &by_campaign()).unwrap();
        assert_eq!(view.select_all, SelectAll::All);

        let stale = spent_state().toggle_row_selection("gone");
        let view = compute_view(&records, &stale, &by_campaign()).unwrap();
        assert_eq!(view.select_all, SelectAll::None);
    }

    #[test]
    fn missing_sort_field_propagates() {
        let records = rows(3);
        let state = TableState::new(FieldKey::Clicks);
        let err = compute_view(&records, &state, &by_campaign()).unwrap_err();
        assert!(matches!(err, CtError::FieldNotFound(FieldKey::Clicks)));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let records = rows(3);
        let mut state = spent_state();
        state.pagination.page_size = 0;
        assert!(matches!(
            compute_view(&records, &state, &by_campaign()),
            Err(CtError::InvalidArgument(_))
        ));
    }

    #[test]
    fn padding_formula() {
        assert_eq!(padding_rows(7, 1, 5), 3);
        assert_eq!(padding_rows(10, 1, 5), 0);
        assert_eq!(padding_rows(7, 0, 5), 0);
        assert_eq!(padding_rows(26, 1, 25), 24);
        assert_eq!(padding_rows(7, 2, 5), 0);
        assert_eq!(page_count(0, 5), 0);
        assert_eq!(page_count(11, 5), 3);
    }
}
