use crate::domain::ports::ProgressReporter;
use std::sync::Mutex;

/// 以 debug 日誌回報進度，只在百分比前進時輸出
#[derive(Debug, Default)]
pub struct TracingProgress {
    last_percent: Mutex<Option<u32>>,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for TracingProgress {
    fn report(&self, fraction: f64) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).floor() as u32;
        let Ok(mut last) = self.last_percent.lock() else {
            return;
        };
        if last.map_or(true, |prev| percent > prev) {
            *last = Some(percent);
            tracing::debug!("⏳ Progress: {}%", percent);
        }
    }
}

/// 不回報任何進度
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _fraction: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_progress_only_moves_forward() {
        let progress = TracingProgress::new();
        progress.report(0.5);
        progress.report(0.25);
        assert_eq!(*progress.last_percent.lock().unwrap(), Some(50));
        progress.report(1.5);
        assert_eq!(*progress.last_percent.lock().unwrap(), Some(100));
    }
}
