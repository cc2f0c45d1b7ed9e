#![forbid(unsafe_code)]

use std::ops::Range;

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
/// The read-only item names served by GET /items/.
pub static FAKE_ITEMS_DB: [&str; 3] = ["Foo", "Bar", "Baz"];

/// The fixed item ids served by GET /products/.
pub static PRODUCT_IDS: [&str; 2] = ["Foo", "Bar"];

// ***************************************************************************
//                              Slice Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// slice_range:
// ---------------------------------------------------------------------------
/** Compute the index range selected by `[start:stop]` over a sequence of `len`
 * elements.  Negative indices count back from the end, out-of-range indices
 * clamp to the sequence bounds and an inverted window is empty.  Nothing is
 * ever rejected.
 */
pub fn slice_range(len: usize, start: i64, stop: i64) -> Range<usize> {
    let start = clamp_index(len, start);
    let stop = clamp_index(len, stop);
    if start >= stop {start..start} else {start..stop}
}

// ---------------------------------------------------------------------------
// page:
// ---------------------------------------------------------------------------
/** Select `limit` elements starting at `skip`, i.e. `[skip:skip + limit]`. */
pub fn page<T>(items: &[T], skip: i64, limit: i64) -> &[T] {
    &items[slice_range(items.len(), skip, skip.saturating_add(limit))]
}

// ---------------------------------------------------------------------------
// clamp_index:
// ---------------------------------------------------------------------------
fn clamp_index(len: usize, index: i64) -> usize {
    let len = len as i64;
    let index = if index < 0 {index.saturating_add(len)} else {index};
    index.clamp(0, len) as usize
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_is_foo() {
        assert_eq!(page(&FAKE_ITEMS_DB, 0, 1), ["Foo"]);
    }

    #[test]
    fn skip_one_take_one() {
        assert_eq!(page(&FAKE_ITEMS_DB, 1, 1), ["Bar"]);
    }

    #[test]
    fn large_limit_clamps() {
        assert_eq!(page(&FAKE_ITEMS_DB, 1, 100), ["Bar", "Baz"]);
    }

    #[test]
    fn skip_past_end_is_empty() {
        assert!(page(&FAKE_ITEMS_DB, 10, 1).is_empty());
        assert!(page(&FAKE_ITEMS_DB, 3, 1).is_empty());
    }

    #[test]
    fn zero_or_negative_limit_is_empty() {
        assert!(page(&FAKE_ITEMS_DB, 0, 0).is_empty());
        assert!(page(&FAKE_ITEMS_DB, 2, -1).is_empty());
    }

    #[test]
    fn negative_skip_counts_from_end() {
        // [-2:-1]
        assert_eq!(page(&FAKE_ITEMS_DB, -2, 1), ["Bar"]);
        // [-1:0] is inverted.
        assert!(page(&FAKE_ITEMS_DB, -1, 1).is_empty());
        // [-10:-8] clamps to [0:0].
        assert!(page(&FAKE_ITEMS_DB, -10, 2).is_empty());
        // [-10:-1] clamps to [0:2].
        assert_eq!(page(&FAKE_ITEMS_DB, -10, 9), ["Foo", "Bar"]);
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        assert!(page(&FAKE_ITEMS_DB, i64::MAX, i64::MAX).is_empty());
        assert_eq!(page(&FAKE_ITEMS_DB, 0, i64::MAX), FAKE_ITEMS_DB);
        assert!(page(&FAKE_ITEMS_DB, i64::MIN, 1).is_empty());
    }

    #[test]
    fn negative_limit_on_negative_skip() {
        // [-1:-3] is inverted.
        assert!(page(&FAKE_ITEMS_DB, -1, -2).is_empty());
        assert_eq!(slice_range(3, -1, -3), 2..2);
    }
}
