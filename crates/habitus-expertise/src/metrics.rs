//! Metrics collection for decay sweeps

use habitus_domain::DomainCode;
use std::collections::HashMap;

/// Metrics collected across decay sweeps
///
/// Tracks decayed domains per domain code and the levels removed.
#[derive(Debug, Clone, Default)]
pub struct SweepMetrics {
    /// Domains decayed, per domain code
    pub decayed: HashMap<DomainCode, usize>,

    /// Levels removed, per domain code
    pub levels_removed: HashMap<DomainCode, u64>,

    /// Users examined
    pub users_scanned: usize,

    /// Domains examined
    pub domains_scanned: usize,

    /// Overall levels lowered as a result of decay
    pub overall_changes: usize,

    /// History records appended
    pub history_recorded: usize,

    /// Decays skipped because of dry-run mode
    pub dry_run_skipped: usize,

    /// Total sweep iterations completed
    pub sweep_count: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl SweepMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one decayed domain
    pub fn record_decay(&mut self, domain: &DomainCode, levels: u32) {
        *self.decayed.entry(domain.clone()).or_insert(0) += 1;
        *self.levels_removed.entry(domain.clone()).or_insert(0) += u64::from(levels);
    }

    /// Record a scanned user and their domain count
    pub fn record_scan(&mut self, domains: usize) {
        self.users_scanned += 1;
        self.domains_scanned += domains;
    }

    /// Record a sweep cycle completion
    pub fn record_sweep(&mut self) {
        self.sweep_count += 1;
    }

    /// Domains decayed across all codes
    pub fn total_decayed(&self) -> usize {
        self.decayed.values().sum()
    }

    /// Levels removed across all codes
    pub fn total_levels_removed(&self) -> u64 {
        self.levels_removed.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Decay Sweep Summary".to_string(),
            "===================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            format!("Users scanned: {}", self.users_scanned),
            format!("Domains scanned: {}", self.domains_scanned),
            format!("History records: {}", self.history_recorded),
        ];

        if self.dry_run_skipped > 0 {
            lines.push(format!("Dry-run skipped: {}", self.dry_run_skipped));
        }

        if !self.decayed.is_empty() {
            lines.push(String::new());
            lines.push("Decay by domain:".to_string());
            let mut codes: Vec<&DomainCode> = self.decayed.keys().collect();
            codes.sort();
            for code in codes {
                lines.push(format!(
                    "  {}: {} decayed, {} levels",
                    code,
                    self.decayed.get(code).copied().unwrap_or(0),
                    self.levels_removed.get(code).copied().unwrap_or(0)
                ));
            }
            lines.push(format!(
                "  Total: {} decayed, {} levels",
                self.total_decayed(),
                self.total_levels_removed()
            ));
        }

        lines.join("\n")
    }
}
