//! Overlap test between an event period and the query interval.

/// Whether period `a` overlaps period `b`.
///
/// True when either end of `a` lies strictly inside `b`. Boundaries are
/// exclusive, and an `a` that fully contains `b` does not count: callers
/// rely on exactly this behavior, so it is not a general overlap test.
pub fn intersects<T: PartialOrd>(a_start: &T, a_end: &T, b_start: &T, b_end: &T) -> bool {
    (a_end > b_start && a_end < b_end) || (a_start > b_start && a_start < b_end)
}
