/// Integer percentage of `part / whole`, rounded half up.
///
/// Returns 0 for an empty `whole`.
pub fn rounded_percentage(part: usize, whole: usize) -> i32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as i32
}
