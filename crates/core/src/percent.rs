/// `round(100 * part / whole)` with halves rounded up, 0 when `whole` is 0,
/// clamped to 100.
#[must_use]
pub(crate) fn rounded_percentage(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let scaled = (part.saturating_mul(200) + whole) / (whole * 2);
    u8::try_from(scaled.min(100)).unwrap_or(100)
}
