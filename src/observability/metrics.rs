// Session metrics
//
// Counters, gauges and a latency histogram for question loading, sandbox
// provisioning and query runs. Exported in Prometheus text format.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::verdict::verdict::VerdictCause;

/// Counter metric (monotonically increasing)
#[derive(Debug)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

/// Gauge metric (can go up or down)
#[derive(Debug)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Gauge {
    fn default() -> Self {
        Self::new()
    }
}

/// Histogram bucket for latency tracking
#[derive(Debug)]
pub struct HistogramBucket {
    pub le: f64, // upper bound in seconds
    pub count: AtomicU64,
}

/// Histogram metric for latency/duration tracking
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<HistogramBucket>,
    sum: AtomicU64, // microseconds
    count: AtomicU64,
}

impl Histogram {
    /// Buckets sized for in-memory query latency (in seconds)
    pub fn new_latency() -> Self {
        let bucket_bounds = vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0];
        let buckets = bucket_bounds
            .into_iter()
            .map(|le| HistogramBucket {
                le,
                count: AtomicU64::new(0),
            })
            .collect();
        Self {
            buckets,
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn observe(&self, value: Duration) {
        let seconds = value.as_secs_f64();
        self.sum
            .fetch_add(value.as_micros() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        for bucket in &self.buckets {
            if seconds <= bucket.le {
                bucket.count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn get_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn get_sum_micros(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn get_bucket_count(&self, le: f64) -> u64 {
        self.buckets
            .iter()
            .find(|b| (b.le - le).abs() < 1e-9)
            .map(|b| b.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

/// Global metrics registry
#[derive(Debug)]
pub struct MetricsRegistry {
    // Question loading
    pub loads_total: Counter,
    pub loads_fallback: Counter,
    pub entries_skipped: Counter,
    pub questions_loaded: Gauge,
    pub imports_accepted: Counter,
    pub imports_rejected: Counter,

    // Sandboxes
    pub sandboxes_provisioned: Counter,
    pub schema_failures: Counter,

    // Runs
    pub runs_total: Counter,
    pub runs_correct: Counter,
    pub runs_incorrect: Counter,
    pub execution_errors: Counter,
    pub validation_errors: Counter,

    // Verdict causes for incorrect runs
    pub cause_no_result: Counter,
    pub cause_column_mismatch: Counter,
    pub cause_row_count_mismatch: Counter,
    pub cause_row_mismatch: Counter,

    pub run_duration: Histogram,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            loads_total: Counter::new(),
            loads_fallback: Counter::new(),
            entries_skipped: Counter::new(),
            questions_loaded: Gauge::new(),
            imports_accepted: Counter::new(),
            imports_rejected: Counter::new(),
            sandboxes_provisioned: Counter::new(),
            schema_failures: Counter::new(),
            runs_total: Counter::new(),
            runs_correct: Counter::new(),
            runs_incorrect: Counter::new(),
            execution_errors: Counter::new(),
            validation_errors: Counter::new(),
            cause_no_result: Counter::new(),
            cause_column_mismatch: Counter::new(),
            cause_row_count_mismatch: Counter::new(),
            cause_row_mismatch: Counter::new(),
            run_duration: Histogram::new_latency(),
        }
    }

    /// Record a completed run and its verdict cause
    pub fn record_verdict(&self, cause: VerdictCause, elapsed: Duration) {
        self.runs_total.inc();
        self.run_duration.observe(elapsed);
        match cause {
            VerdictCause::Match => self.runs_correct.inc(),
            VerdictCause::NoResult => {
                self.runs_incorrect.inc();
                self.cause_no_result.inc();
            }
            VerdictCause::ColumnMismatch => {
                self.runs_incorrect.inc();
                self.cause_column_mismatch.inc();
            }
            VerdictCause::RowCountMismatch => {
                self.runs_incorrect.inc();
                self.cause_row_count_mismatch.inc();
            }
            VerdictCause::RowMismatch => {
                self.runs_incorrect.inc();
                self.cause_row_mismatch.inc();
            }
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP sqlbox_loads_total Question list loads\n");
        output.push_str("# TYPE sqlbox_loads_total counter\n");
        output.push_str(&format!(
            "sqlbox_loads_total{{origin=\"source\"}} {}\n",
            self.loads_total.get().saturating_sub(self.loads_fallback.get())
        ));
        output.push_str(&format!(
            "sqlbox_loads_total{{origin=\"fallback\"}} {}\n",
            self.loads_fallback.get()
        ));

        output.push_str("# HELP sqlbox_entries_skipped_total Remote entries skipped during load\n");
        output.push_str("# TYPE sqlbox_entries_skipped_total counter\n");
        output.push_str(&format!(
            "sqlbox_entries_skipped_total {}\n",
            self.entries_skipped.get()
        ));

        output.push_str("# HELP sqlbox_questions_loaded Questions currently in the list\n");
        output.push_str("# TYPE sqlbox_questions_loaded gauge\n");
        output.push_str(&format!(
            "sqlbox_questions_loaded {}\n",
            self.questions_loaded.get()
        ));

        output.push_str("# HELP sqlbox_imports_total Import attempts\n");
        output.push_str("# TYPE sqlbox_imports_total counter\n");
        output.push_str(&format!(
            "sqlbox_imports_total{{outcome=\"accepted\"}} {}\n",
            self.imports_accepted.get()
        ));
        output.push_str(&format!(
            "sqlbox_imports_total{{outcome=\"rejected\"}} {}\n",
            self.imports_rejected.get()
        ));

        output.push_str("# HELP sqlbox_sandboxes_total Sandbox provisioning attempts\n");
        output.push_str("# TYPE sqlbox_sandboxes_total counter\n");
        output.push_str(&format!(
            "sqlbox_sandboxes_total{{outcome=\"ready\"}} {}\n",
            self.sandboxes_provisioned.get()
        ));
        output.push_str(&format!(
            "sqlbox_sandboxes_total{{outcome=\"schema_error\"}} {}\n",
            self.schema_failures.get()
        ));

        output.push_str("# HELP sqlbox_runs_total Query runs by outcome\n");
        output.push_str("# TYPE sqlbox_runs_total counter\n");
        output.push_str(&format!(
            "sqlbox_runs_total{{outcome=\"correct\"}} {}\n",
            self.runs_correct.get()
        ));
        output.push_str(&format!(
            "sqlbox_runs_total{{outcome=\"incorrect\"}} {}\n",
            self.runs_incorrect.get()
        ));
        output.push_str(&format!(
            "sqlbox_runs_total{{outcome=\"execution_error\"}} {}\n",
            self.execution_errors.get()
        ));
        output.push_str(&format!(
            "sqlbox_runs_total{{outcome=\"validation_error\"}} {}\n",
            self.validation_errors.get()
        ));

        output.push_str("# HELP sqlbox_incorrect_by_cause Incorrect runs by verdict cause\n");
        output.push_str("# TYPE sqlbox_incorrect_by_cause counter\n");
        for (cause, counter) in [
            (VerdictCause::NoResult, &self.cause_no_result),
            (VerdictCause::ColumnMismatch, &self.cause_column_mismatch),
            (VerdictCause::RowCountMismatch, &self.cause_row_count_mismatch),
            (VerdictCause::RowMismatch, &self.cause_row_mismatch),
        ] {
            output.push_str(&format!(
                "sqlbox_incorrect_by_cause{{cause=\"{}\"}} {}\n",
                cause.as_str(),
                counter.get()
            ));
        }

        output.push_str("# HELP sqlbox_run_duration_seconds Query run latency\n");
        output.push_str("# TYPE sqlbox_run_duration_seconds histogram\n");
        for bucket in &self.run_duration.buckets {
            output.push_str(&format!(
                "sqlbox_run_duration_seconds_bucket{{le=\"{}\"}} {}\n",
                bucket.le,
                bucket.count.load(Ordering::Relaxed)
            ));
        }
        output.push_str(&format!(
            "sqlbox_run_duration_seconds_sum {}\n",
            self.run_duration.get_sum_micros() as f64 / 1_000_000.0
        ));
        output.push_str(&format!(
            "sqlbox_run_duration_seconds_count {}\n",
            self.run_duration.get_count()
        ));

        output
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global metrics instance
static METRICS: once_cell::sync::Lazy<Arc<MetricsRegistry>> =
    once_cell::sync::Lazy::new(|| Arc::new(MetricsRegistry::new()));

/// Get global metrics registry
pub fn get_metrics() -> Arc<MetricsRegistry> {
    Arc::clone(&METRICS)
}
