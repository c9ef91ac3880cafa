use serde::{Deserialize, Serialize};

/// 單次執行的統計，執行結束時回報，不會保存
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_orphans: usize,
    pub assigned: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RunStats {
    pub fn processed(&self) -> usize {
        self.assigned + self.skipped + self.errors
    }

    pub fn record_assigned(&mut self) {
        self.assigned += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn log_summary(&self, dry_run: bool) {
        tracing::info!("{}", "=".repeat(50));
        tracing::info!(
            "✅ Processing complete!{}",
            if dry_run { " (dry run, nothing was changed)" } else { "" }
        );
        tracing::info!("📊 Total orphan scenes: {}", self.total_orphans);
        tracing::info!("🔗 Assigned: {}", self.assigned);
        tracing::info!("⏭️  Skipped: {}", self.skipped);
        tracing::info!("❌ Errors: {}", self.errors);
        tracing::info!("{}", "=".repeat(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_add_up() {
        let mut stats = RunStats {
            total_orphans: 4,
            ..Default::default()
        };
        stats.record_assigned();
        stats.record_assigned();
        stats.record_skipped();
        stats.record_error();

        assert_eq!(stats.processed(), stats.total_orphans);
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            serde_json::json!({"total_orphans": 4, "assigned": 2, "skipped": 1, "errors": 1})
        );
    }
}
