/// Maps an issuance date to a horizontal offset from the first year's
/// gridline. A missing month behaves as January. The month term floors in
/// f64 before narrowing so `date_to_x(2001, 2001, Some(7), 400.0)` is
/// exactly 200, matching the double-precision source data.
pub fn date_to_x(
    first_year: i32,
    year: i32,
    month: Option<u32>,
    distance_between_years: f32,
) -> f32 {
    let year_index = (year - first_year) as f32;
    let month_offset = month.map(|m| m.saturating_sub(1)).unwrap_or(0);
    let month_x = (f64::from(distance_between_years) / 12.0 * f64::from(month_offset)).floor();
    year_index * distance_between_years + month_x as f32
}

/// Canvas width for a given span of years. Never narrower than the
/// configured minimum, so sparse corpora still get a usable canvas.
pub fn canvas_width(year_count: u32, distance_between_years: f32, min_canvas_width: f32) -> f32 {
    (year_count as f32 * distance_between_years).max(min_canvas_width)
}
