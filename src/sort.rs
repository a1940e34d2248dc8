use std::cmp::Ordering;

use crate::domain::CtError;
use crate::record::{FieldKey, Record};
use crate::state::SortDirection;

/// Builds a comparator over `field`. The descending order is the base; the
/// ascending comparator is its exact reverse, so equal stays equal.
pub fn build_comparator(
    direction: SortDirection,
    field: FieldKey,
) -> impl Fn(&Record, &Record) -> Result<Ordering, CtError> {
    move |a: &Record, b: &Record| {
        let descending = descending_cmp(a, b, field)?;
        Ok(match direction {
            SortDirection::Descending => descending,
            SortDirection::Ascending => descending.reverse(),
        })
    }
}

fn descending_cmp(a: &Record, b: &Record, field: FieldKey) -> Result<Ordering, CtError> {
    let a = a.get(field)?;
    let b = b.get(field)?;
    Ok(b.natural_cmp(a))
}

/// Returns `items` ordered by `cmp`, keeping input order among equal items.
///
/// A top-down merge sort over references: ties always take the element from
/// the left run, so the result is stable whatever the comparator. The first
/// comparator error aborts the sort and is returned as is.
pub fn stable_sort<'a, T, F>(items: &'a [T], cmp: F) -> Result<Vec<&'a T>, CtError>
where
    F: Fn(&T, &T) -> Result<Ordering, CtError>,
{
    let mut sorted: Vec<&'a T> = items.iter().collect();
    let mut buffer = Vec::with_capacity(sorted.len());
    merge_sort(&mut sorted, &mut buffer, &cmp)?;
    Ok(sorted)
}

fn merge_sort<'a, T, F>(run: &mut [&'a T], buffer: &mut Vec<&'a T>, cmp: &F) -> Result<(), CtError>
where
    F: Fn(&T, &T) -> Result<Ordering, CtError>,
{
    if run.len() < 2 {
        return Ok(());
    }
    let mid = run.len() / 2;
    merge_sort(&mut run[..mid], buffer, cmp)?;
    merge_sort(&mut run[mid..], buffer, cmp)?;

    buffer.clear();
    let (mut left, mut right) = (0, mid);
    while left < mid && right < run.len() {
        if cmp(run[right], run[left])? == Ordering::Less {
            buffer.push(run[right]);
            right += 1;
        } else {
            buffer.push(run[left]);
            left += 1;
        }
    }
    buffer.extend_from_slice(&run[left..mid]);
    buffer.extend_from_slice(&run[right..]);
    run.copy_from_slice(buffer);
    Ok(())
}
