//! Repeated wall-clock timing with best-of-k averaging

use crate::error::{HashBenchError, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Runs a closure a fixed number of times and summarizes the samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    iterations: usize,
    best_of: usize,
}

impl Timer {
    /// `best_of` of the `iterations` samples are averaged into
    /// [`Measurement::best_mean`]
    pub fn new(iterations: usize, best_of: usize) -> Result<Self> {
        if iterations == 0 {
            return Err(HashBenchError::invalid("iterations must be positive"));
        }
        if best_of == 0 || best_of > iterations {
            return Err(HashBenchError::invalid(format!(
                "best-of must be between 1 and {} (the iteration count), got {}",
                iterations, best_of
            )));
        }
        Ok(Self { iterations, best_of })
    }

    /// Timed runs per measurement
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Time `f` once per iteration.
    ///
    /// Stops at the first error. The output of the last run is returned
    /// alongside the measurement so callers can check it.
    pub fn measure<T, F>(&self, label: impl Into<String>, mut f: F) -> Result<(Measurement, T)>
    where
        F: FnMut() -> Result<T>,
    {
        let label = label.into();
        let mut samples = Vec::with_capacity(self.iterations);
        let mut last = None;

        for _ in 0..self.iterations {
            let start = Instant::now();
            let output = f()?;
            samples.push(start.elapsed());
            last = Some(output);
        }

        let measurement = Measurement::from_samples(label, &samples, self.best_of);
        tracing::debug!(
            label = %measurement.label,
            best_mean = measurement.best_mean,
            "measured"
        );

        match last {
            Some(output) => Ok((measurement, output)),
            None => Err(HashBenchError::invalid("iterations must be positive")),
        }
    }
}

/// Summary of one candidate's timing samples, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// What was timed
    pub label: String,
    /// Every sample, in run order
    pub samples: Vec<f64>,
    /// Fastest sample
    pub min: f64,
    /// Mean of all samples
    pub mean: f64,
    /// Mean of the fastest `best_of` samples
    pub best_mean: f64,
}

impl Measurement {
    /// Summarize raw samples
    pub fn from_samples(label: impl Into<String>, samples: &[Duration], best_of: usize) -> Self {
        let samples: Vec<f64> = samples.iter().map(Duration::as_secs_f64).collect();

        let mut sorted = samples.clone();
        sorted.sort_by(f64::total_cmp);

        let mean = average(&sorted);
        let best = &sorted[..best_of.max(1).min(sorted.len())];

        Self {
            label: label.into(),
            min: sorted.first().copied().unwrap_or(0.0),
            mean,
            best_mean: average(best),
            samples,
        }
    }

    /// The reported time as a `Duration`
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.best_mean)
    }

    /// Bytes per second for a run over `bytes` bytes
    pub fn throughput(&self, bytes: u64) -> f64 {
        if self.best_mean > 0.0 {
            bytes as f64 / self.best_mean
        } else {
            0.0
        }
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sort fastest first
pub fn rank(measurements: &mut [Measurement]) {
    measurements.sort_by(|a, b| a.best_mean.total_cmp(&b.best_mean));
}
