/// Clamp `value` into `[min_db, max_db]` and scale it onto `out_min..=out_max`.
///
/// At or below `min_db` gives `out_min`, at or above `max_db` gives
/// `out_max`; in between the result is rounded to the nearest step.
pub fn squeeze(value: f32, min_db: f64, max_db: f64, out_min: f64, out_max: f64) -> f64 {
    let v = value as f64;
    if v <= min_db {
        out_min
    } else if v >= max_db {
        out_max
    } else {
        out_min + ((v - min_db) / (max_db - min_db) * (out_max - out_min)).round()
    }
}

/// Colormap index (0–255) for a dB value.
pub fn color_index(value: f32, min_db: f64, max_db: f64) -> u8 {
    squeeze(value, min_db, max_db, 0.0, 255.0) as u8
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let p = 10f64.powi(decimals);
    (value * p).round() / p
}

/// Hz value with a magnitude-appropriate unit: "433.920MHz", "-12.500kHz".
pub fn format_frequency(hz: f64, decimals: usize) -> String {
    let m = hz.abs();
    if m < 1.0e3 {
        format!("{:.*}Hz", decimals, hz)
    } else if m < 1.0e6 {
        format!("{:.*}kHz", decimals, hz / 1e3)
    } else if m < 1.0e9 {
        format!("{:.*}MHz", decimals, hz / 1e6)
    } else {
        format!("{:.*}GHz", decimals, hz / 1e9)
    }
}

/// Axis label for `hz`. The unit is chosen once for the whole axis from
/// `upper_hz` so all three labels share a suffix.
pub fn format_axis_frequency(hz: f64, upper_hz: f64) -> String {
    if upper_hz > 1e9 {
        format!("{:.3}G", hz / 1e9)
    } else if upper_hz > 1e6 {
        format!("{:.3}M", hz / 1e6)
    } else if upper_hz > 1e3 {
        format!("{:.3}k", hz / 1e3)
    } else {
        format!("{}", hz)
    }
}
