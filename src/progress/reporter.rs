//! Run-count and byte-throughput bars for hashing and benchmarks

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Tracks timed runs (or hashed files) and the bytes they covered.
///
/// Counters are atomic so one reporter can be shared with rayon workers.
pub struct ProgressReporter {
    multi: MultiProgress,
    /// Spinner naming the candidate being timed
    candidate: ProgressBar,
    runs: ProgressBar,
    bytes: ProgressBar,
    started: Instant,
    runs_expected: AtomicU64,
    runs_done: AtomicU64,
    bytes_hashed: AtomicU64,
    visible: bool,
}

impl ProgressReporter {
    /// Reporter drawing to stderr
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr(), true)
    }

    /// Reporter that counts but never draws (quiet mode, tests)
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden(), false)
    }

    fn with_target(target: ProgressDrawTarget, visible: bool) -> Self {
        let multi = MultiProgress::with_draw_target(target);

        let candidate = multi.add(ProgressBar::new_spinner());
        candidate.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        let runs = multi.add(ProgressBar::new(0));
        runs.set_style(
            ProgressStyle::with_template("{prefix:>5.bold.dim} [{bar:40.green/white}] {pos}/{len} {eta}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        runs.set_prefix("runs");

        let bytes = multi.add(ProgressBar::new_spinner());
        bytes.set_style(
            ProgressStyle::with_template("{prefix:>5.bold.dim} {bytes} at {bytes_per_sec}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bytes.set_prefix("data");

        Self {
            multi,
            candidate,
            runs,
            bytes,
            started: Instant::now(),
            runs_expected: AtomicU64::new(0),
            runs_done: AtomicU64::new(0),
            bytes_hashed: AtomicU64::new(0),
            visible,
        }
    }

    /// Raise the expected run count by `runs`
    pub fn expect_runs(&self, runs: u64) {
        let expected = self.runs_expected.fetch_add(runs, Ordering::Relaxed) + runs;
        self.runs.set_length(expected);
    }

    /// One run finished after hashing `bytes` bytes
    pub fn record_run(&self, bytes: u64) {
        self.runs_done.fetch_add(1, Ordering::Relaxed);
        self.bytes_hashed.fetch_add(bytes, Ordering::Relaxed);
        self.runs.inc(1);
        self.bytes.inc(bytes);
    }

    /// Name what is being timed or hashed now
    pub fn set_candidate(&self, label: &str) {
        self.candidate.set_message(label.to_string());
    }

    /// Leave the bars in place with a closing message
    pub fn complete(&self, message: &str) {
        self.candidate.finish_with_message(format!("done: {}", message));
        self.runs.finish();
        self.bytes.finish();
    }

    /// Stop the bars where they are, with an error message
    pub fn fail(&self, message: &str) {
        self.candidate.abandon_with_message(format!("failed: {}", message));
        self.runs.abandon();
        self.bytes.abandon();
    }

    /// Whether anything is drawn
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Counters as they stand now
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            runs_expected: self.runs_expected.load(Ordering::Relaxed),
            runs_done: self.runs_done.load(Ordering::Relaxed),
            bytes_hashed: self.bytes_hashed.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }

    /// Clear the bars from the terminal
    pub fn clear(&self) {
        self.multi.clear().ok();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of a reporter's counters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Runs announced through [`ProgressReporter::expect_runs`]
    pub runs_expected: u64,
    /// Runs recorded so far
    pub runs_done: u64,
    /// Bytes hashed across all recorded runs
    pub bytes_hashed: u64,
    /// Time since the reporter was created
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Share of expected runs already done, 0 to 100
    pub fn percentage(&self) -> f64 {
        match self.runs_expected {
            0 => 0.0,
            expected => self.runs_done as f64 * 100.0 / expected as f64,
        }
    }

    /// Bytes hashed per second of wall time
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes_hashed as f64 / secs
        } else {
            0.0
        }
    }

    /// One line for the log
    pub fn describe(&self) -> String {
        use humansize::{format_size, BINARY};
        format!(
            "{}/{} runs, {} hashed in {:.1?} ({}/s)",
            self.runs_done,
            self.runs_expected,
            format_size(self.bytes_hashed, BINARY),
            self.elapsed,
            format_size(self.throughput() as u64, BINARY)
        )
    }
}
