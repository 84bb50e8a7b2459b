/// Resolves a range against a length, panicking on an invalid range.
#[inline(always)]
pub(crate) fn split_range_bound(
    src: &impl core::ops::RangeBounds<usize>,
    len: usize,
) -> (usize, usize) {
    let start = match src.start_bound() {
        core::ops::Bound::Included(&i) => i,
        core::ops::Bound::Excluded(&i) => match i.checked_add(1) {
            Some(start) => start,
            None => panic!("range start (is {i}, excluded) overflows usize"),
        },
        core::ops::Bound::Unbounded => 0,
    };

    let end = match src.end_bound() {
        core::ops::Bound::Included(&i) => match i.checked_add(1) {
            Some(end) => end,
            None => panic!("range end (is {i}, included) overflows usize"),
        },
        core::ops::Bound::Excluded(&i) => i,
        core::ops::Bound::Unbounded => len,
    };

    assert!(start <= end, "range start (is {start}) should be <= range end (is {end})");
    assert!(end <= len, "range end (is {end}) should be <= len (is {len})");
    (start, end)
}

/// Marks the calling branch as unlikely.
#[cold]
#[inline(always)]
pub(crate) const fn cold_path() {}
