//! Pure rendering helpers: clock text, progress and the progress ring.

use std::f64::consts::{FRAC_PI_2, TAU};

/// `MM:SS`, both parts zero padded.
pub fn format_clock(remaining_secs: u32) -> String {
    format!("{:02}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

/// Elapsed fraction of the phase, 0.0 ..= 1.0.
pub fn progress(duration_secs: u32, remaining_secs: u32) -> f64 {
    if duration_secs == 0 {
        return 0.0;
    }
    let elapsed = duration_secs.saturating_sub(remaining_secs) as f64;
    (elapsed / duration_secs as f64).clamp(0.0, 1.0)
}

/// Points along the elapsed arc of a ring centred on the origin.
///
/// The arc starts at twelve o'clock and runs clockwise. `samples` is the
/// number of points a full ring would have.
pub fn ring_points(progress: f64, radius: f64, samples: usize) -> Vec<(f64, f64)> {
    let count = (progress.clamp(0.0, 1.0) * samples as f64).round() as usize;
    (0..count)
        .map(|i| {
            let angle = FRAC_PI_2 - TAU * (i as f64 / samples as f64);
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect()
}
