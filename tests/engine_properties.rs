use ctab::{
    FieldKey, Identity, Record, SortDirection, TableState, build_comparator, compute_view,
    stable_sort,
};
use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

// Small value ranges so ties are common.
fn record_strategy() -> impl Strategy<Value = (u8, String)> {
    (0u8..5, "[a-c]{1,2}")
}

fn records_from(values: &[(u8, String)]) -> Vec<Record> {
    values
        .iter()
        .enumerate()
        .map(|(i, (spent, campaign))| {
            Record::new()
                .with(FieldKey::CampaignId, format!("id{i}"))
                .with(FieldKey::Campaign, campaign.as_str())
                .with(FieldKey::Spent, *spent as f64)
        })
        .collect()
}

fn position(record: &Record) -> usize {
    record.display(FieldKey::CampaignId)[2..].parse().unwrap()
}

fn by_id() -> Identity {
    Identity::new(vec![FieldKey::CampaignId]).unwrap()
}

fn direction_strategy() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Ascending), Just(SortDirection::Descending)]
}

fn field_strategy() -> impl Strategy<Value = FieldKey> {
    prop_oneof![Just(FieldKey::Spent), Just(FieldKey::Campaign)]
}

// Property: equal keys keep their input order
proptest! {
    #[test]
    fn prop_sort_is_stable(
        values in prop_vec(record_strategy(), 0..40),
        direction in direction_strategy(),
        field in field_strategy(),
    ) {
        let records = records_from(&values);
        let cmp = build_comparator(direction, field);
        let sorted = stable_sort(&records, &cmp).unwrap();

        for pair in sorted.windows(2) {
            let order = cmp(pair[0], pair[1]).unwrap();
            prop_assert_ne!(order, std::cmp::Ordering::Greater);
            if order == std::cmp::Ordering::Equal {
                prop_assert!(position(pair[0]) < position(pair[1]));
            }
        }
    }
}

// Property: ascending is the exact negation of descending
proptest! {
    #[test]
    fn prop_sign_inversion(
        values in prop_vec(record_strategy(), 2..10),
        field in field_strategy(),
    ) {
        let records = records_from(&values);
        let asc = build_comparator(SortDirection::Ascending, field);
        let desc = build_comparator(SortDirection::Descending, field);
        for a in &records {
            for b in &records {
                prop_assert_eq!(asc(a, b).unwrap(), desc(a, b).unwrap().reverse());
            }
        }
    }
}

// Property: sorting is a permutation of the input
proptest! {
    #[test]
    fn prop_sort_is_permutation(
        values in prop_vec(record_strategy(), 0..40),
        direction in direction_strategy(),
    ) {
        let records = records_from(&values);
        let sorted = stable_sort(&records, build_comparator(direction, FieldKey::Spent)).unwrap();
        prop_assert_eq!(sorted.len(), records.len());

        let mut positions: Vec<usize> = sorted.iter().map(|r| position(r)).collect();
        positions.sort_unstable();
        prop_assert_eq!(positions, (0..records.len()).collect::<Vec<usize>>());
    }
}

// Property: toggling a row twice restores the selection
proptest! {
    #[test]
    fn prop_row_toggle_is_idempotent(
        initial in prop_vec("[a-e]", 0..6),
        id in "[a-f]",
    ) {
        let state = TableState::default().toggle_select_all(initial, true);
        let twice = state.clone().toggle_row_selection(&id).toggle_row_selection(&id);
        prop_assert_eq!(twice, state);
    }
}

// Property: select all covers every identity, unselect clears
proptest! {
    #[test]
    fn prop_select_all_totality(
        prior in prop_vec("[a-z]{1,3}", 0..5),
        all in prop_vec("[a-z]{1,3}", 0..20),
    ) {
        let state = TableState::default().toggle_select_all(prior, true);
        let selected = state.clone().toggle_select_all(all.clone(), true);
        for id in &all {
            prop_assert!(selected.is_selected(id));
        }
        let cleared = selected.toggle_select_all(all, false);
        prop_assert!(cleared.selection.is_empty());
    }
}

// Property: changing page size always lands on the first page
proptest! {
    #[test]
    fn prop_page_size_resets_page(page in 0usize..1000, size in prop_oneof![Just(5usize), Just(10), Just(25)]) {
        let state = TableState::default().set_page(page).set_page_size(size).unwrap();
        prop_assert_eq!(state.pagination.page_index, 0);
        prop_assert_eq!(state.pagination.page_size, size);
    }
}

// Property: the page slice never exceeds the page size and matches the sorted order
proptest! {
    #[test]
    fn prop_view_is_a_slice_of_the_sort(
        values in prop_vec(record_strategy(), 0..60),
        page in 0usize..15,
        size in prop_oneof![Just(5usize), Just(10), Just(25)],
    ) {
        let records = records_from(&values);
        let state = TableState::new(FieldKey::Spent)
            .set_page_size(size)
            .unwrap()
            .set_page(page);
        let view = compute_view(&records, &state, &by_id()).unwrap();
        let sorted = stable_sort(&records, build_comparator(SortDirection::Ascending, FieldKey::Spent)).unwrap();

        let start = (page * size).min(sorted.len());
        let end = (start + size).min(sorted.len());
        let expected: Vec<&Record> = sorted[start..end].to_vec();
        let shown: Vec<&Record> = view.visible_rows.iter().map(|r| r.record).collect();
        prop_assert_eq!(shown, expected);

        if page == 0 || view.visible_rows.is_empty() {
            prop_assert_eq!(view.padding_row_count, 0);
        } else {
            prop_assert_eq!(view.visible_rows.len() + view.padding_row_count, size);
        }
    }
}

#[test]
fn padding_scenario() {
    let values: Vec<(u8, String)> = (0..7).map(|i| (i, "a".to_string())).collect();
    let records = records_from(&values);
    let state = TableState::new(FieldKey::Spent).set_page(1);
    let view = compute_view(&records, &state, &by_id()).unwrap();
    assert_eq!(view.visible_rows.len(), 2);
    assert_eq!(view.padding_row_count, 3);
}

#[test]
fn sort_toggle_scenario() {
    let state = TableState::new(FieldKey::Spent);
    let flipped = state.clone().toggle_sort(FieldKey::Spent);
    assert_eq!(flipped.sort_field, FieldKey::Spent);
    assert_eq!(flipped.sort_direction, SortDirection::Descending);

    let other = state.toggle_sort(FieldKey::Clicks);
    assert_eq!(other.sort_field, FieldKey::Clicks);
    assert_eq!(other.sort_direction, SortDirection::Ascending);
}

#[test]
fn end_to_end_scenario() {
    let records = vec![
        Record::new().with(FieldKey::CampaignId, "A").with(FieldKey::Spent, 10.0),
        Record::new().with(FieldKey::CampaignId, "B").with(FieldKey::Spent, 5.0),
        Record::new().with(FieldKey::CampaignId, "C").with(FieldKey::Spent, 5.0),
    ];
    let view = compute_view(&records, &TableState::new(FieldKey::Spent), &by_id()).unwrap();
    let ids: Vec<&str> = view.visible_rows.iter().map(|r| r.identity.as_str()).collect();
    assert_eq!(ids, vec!["B", "C", "A"]);
}
