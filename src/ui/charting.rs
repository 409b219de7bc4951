use crate::time_series::SamplePoint;

/// X (seconds) and Y (speed) upper bounds for the results chart.
pub fn chart_bounds(samples: &[SamplePoint], elapsed_secs: f64) -> (f64, f64) {
    let top_speed = samples
        .iter()
        .map(|p| p.wpm.max(p.raw))
        .max()
        .unwrap_or(0) as f64;

    let duration = samples.last().map_or(elapsed_secs, |p| p.t).max(1.0);

    (duration, top_speed)
}

/// Axis label: whole numbers without decimals, everything else to two places.
pub fn format_label(val: f64) -> String {
    if val.fract().abs() < f64::EPSILON {
        format!("{}", val as i64)
    } else {
        format!("{val:.2}")
    }
}
