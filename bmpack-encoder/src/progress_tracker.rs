//! Progress reporting for a packing run

use std::time::Instant;

/// Counts processed files and logs progress with elapsed time and ETA
pub struct ProgressTracker {
    total: u64,
    processed: u64,
    start_time: Instant,
    label: String,
}

impl ProgressTracker {
    /// Creates a new progress tracker
    pub fn new(total: u64, label: &str) -> Self {
        Self {
            total,
            processed: 0,
            start_time: Instant::now(),
            label: label.to_string(),
        }
    }

    /// Number of items counted so far
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Increments the processed count by one and logs every `report_interval`
    /// items and on the last one
    pub fn increment_and_report(&mut self, report_interval: u64) {
        self.processed += 1;
        let current = self.processed;
        if current % report_interval.max(1) == 0 || current == self.total {
            self.log_progress(current);
        }
    }

    fn log_progress(&self, current: u64) {
        let elapsed_secs = self.start_time.elapsed().as_secs_f64();

        let percent = if self.total > 0 {
            (current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        };

        if current < self.total {
            let rate = current as f64 / elapsed_secs.max(f64::EPSILON);
            let remaining = (self.total - current) as f64 / rate;
            log::info!(
                "{} {}/{} ({:.1}%) - elapsed: {} - ETA: {}",
                self.label,
                current,
                self.total,
                percent,
                format_duration(elapsed_secs),
                format_duration(remaining),
            );
        } else {
            log::info!(
                "{} {}/{} (100.0%) - completed in {}",
                self.label,
                current,
                self.total,
                format_duration(elapsed_secs),
            );
        }
    }
}

/// Short human-readable duration: tenths of a second below a minute, whole
/// seconds above it
pub fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        return format!("{:.1}s", secs);
    }

    let total = secs.round() as u64;
    let (hours, mins, secs) = (total / 3600, total % 3600 / 60, total % 60);
    if hours == 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}h {}m {}s", hours, mins, secs)
    }
}
