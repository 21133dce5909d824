//! Benchmark reports and their text / JSON renderings

use super::timer::Measurement;
use crate::config::{HashAlgorithm, OutputFormat};
use crate::error::Result;
use humansize::{format_size, BINARY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A report that can be printed as text or serialized as JSON
pub trait Report: Serialize + fmt::Display {
    /// Render in the requested format
    fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_string()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Candidates timed against one file, fastest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    /// What was compared
    pub title: String,
    /// File that was hashed
    pub path: PathBuf,
    /// Its size in bytes
    pub file_size: u64,
    /// Algorithm used for every run
    pub algorithm: HashAlgorithm,
    /// The digest every candidate agreed on
    pub digest: String,
    /// Timings, fastest first
    pub rankings: Vec<Measurement>,
}

impl RankingReport {
    /// Label of the fastest candidate
    pub fn fastest(&self) -> Option<&str> {
        self.rankings.first().map(|m| m.label.as_str())
    }
}

impl Report for RankingReport {}

impl fmt::Display for RankingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.title)?;
        writeln!(f, "File:      {}", self.path.display())?;
        writeln!(f, "Size:      {}", format_size(self.file_size, BINARY))?;
        writeln!(f, "Algorithm: {}", self.algorithm.name())?;
        writeln!(f, "Digest:    {} (identical for every candidate)", self.digest)?;
        writeln!(f)?;
        writeln!(f, "{:>4}  {:>12}  {:>12}  {:>12}  candidate", "rank", "time", "min", "throughput")?;
        for (i, m) in self.rankings.iter().enumerate() {
            writeln!(
                f,
                "{:>4}  {:>12.2?}  {:>12.2?}  {:>10}/s  {}",
                i + 1,
                m.duration(),
                std::time::Duration::from_secs_f64(m.min),
                format_size(m.throughput(self.file_size) as u64, BINARY),
                m.label
            )?;
        }
        Ok(())
    }
}

/// A named ratio of two timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ratio {
    /// `numerator/denominator` label
    pub label: String,
    /// Seconds over seconds; `None` when the denominator was zero
    pub ratio: Option<f64>,
}

impl Ratio {
    /// `a / b`, labelled
    pub fn of(numerator: &str, denominator: &str, a: f64, b: f64) -> Self {
        Self {
            label: format!("{}/{}", numerator, denominator),
            ratio: (b > 0.0).then(|| a / b),
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio {
            Some(ratio) => write!(f, "{}={:.2}", self.label, ratio),
            None => write!(f, "{}=n/a", self.label),
        }
    }
}

/// Every algorithm timed on one generated file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleResult {
    /// Chunks in the file
    pub chunks: u64,
    /// File size in bytes
    pub bytes: u64,
    /// Timings, fastest first
    pub timings: Vec<Measurement>,
    /// Each algorithm's time over the fastest one's
    pub relative_to_fastest: Vec<Ratio>,
}

/// Algorithms compared across growing file sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmReport {
    /// Algorithm the averages are taken against
    pub reference: HashAlgorithm,
    /// One entry per file size
    pub scales: Vec<ScaleResult>,
    /// Mean over all sizes of each algorithm's time over the reference's,
    /// smallest first
    pub average_ratios: Vec<Ratio>,
}

impl Report for AlgorithmReport {}

impl fmt::Display for AlgorithmReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Hash algorithm comparison ===")?;
        for scale in &self.scales {
            writeln!(f)?;
            writeln!(
                f,
                "--- {} chunks, {} ---",
                scale.chunks,
                format_size(scale.bytes, BINARY)
            )?;
            for m in &scale.timings {
                writeln!(
                    f,
                    "  {:<8} {:>12.2?}  {:>10}/s",
                    m.label,
                    m.duration(),
                    format_size(m.throughput(scale.bytes) as u64, BINARY)
                )?;
            }
            let speedups: Vec<String> = scale
                .relative_to_fastest
                .iter()
                .map(Ratio::to_string)
                .collect();
            writeln!(f, "  speedup: {}", speedups.join(", "))?;
        }

        writeln!(f)?;
        writeln!(f, "Average ratio against {} (over all sizes):", self.reference)?;
        for r in &self.average_ratios {
            match r.ratio {
                Some(ratio) => writeln!(f, "  {:<16} {:.2}", r.label, ratio)?,
                None => writeln!(f, "  {:<16} n/a", r.label)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_ranking() -> RankingReport {
        RankingReport {
            title: "Block size policies".to_string(),
            path: PathBuf::from("/tmp/data.bin"),
            file_size: 1 << 20,
            algorithm: HashAlgorithm::Xx64,
            digest: "ef46db3751d8e999".to_string(),
            rankings: vec![
                Measurement::from_samples("constant 1 MiB", &[Duration::from_millis(2)], 1),
                Measurement::from_samples("doubling from 1 MiB", &[Duration::from_millis(3)], 1),
            ],
        }
    }

    #[test]
    fn test_ranking_text() {
        let report = sample_ranking();
        let text = report.render(OutputFormat::Text).unwrap();
        assert!(text.contains("=== Block size policies ==="));
        assert!(text.contains("ef46db3751d8e999"));
        assert!(text.contains("constant 1 MiB"));
        assert_eq!(report.fastest(), Some("constant 1 MiB"));
    }

    #[test]
    fn test_ranking_json() {
        let json = sample_ranking().render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["algorithm"], "xx64");
        assert_eq!(value["rankings"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_ratio() {
        let r = Ratio::of("sha1", "xx64", 3.0, 1.5);
        assert_eq!(r.label, "sha1/xx64");
        assert_eq!(r.ratio, Some(2.0));
        assert_eq!(Ratio::of("a", "b", 1.0, 0.0).ratio, None);
        assert_eq!(Ratio::of("a", "b", 1.0, 0.0).to_string(), "a/b=n/a");
    }

    #[test]
    fn test_algorithm_report_text() {
        let report = AlgorithmReport {
            reference: HashAlgorithm::Xx64,
            scales: vec![ScaleResult {
                chunks: 32,
                bytes: 32 << 10,
                timings: vec![Measurement::from_samples("xx64", &[Duration::from_micros(5)], 1)],
                relative_to_fastest: vec![Ratio::of("xx64", "xx64", 1.0, 1.0)],
            }],
            average_ratios: vec![Ratio::of("sha1", "xx64", 4.0, 1.0)],
        };
        let text = report.to_string();
        assert!(text.contains("--- 32 chunks, 32 KiB ---"));
        assert!(text.contains("speedup: xx64/xx64=1.00"));
        assert!(text.contains("sha1/xx64"));
    }

    #[test]
    fn test_algorithm_report_json_reads_back() {
        let report = AlgorithmReport {
            reference: HashAlgorithm::Xx64,
            scales: vec![ScaleResult {
                chunks: 1,
                bytes: 1024,
                timings: vec![Measurement::from_samples("xx64", &[Duration::ZERO], 1)],
                relative_to_fastest: vec![Ratio::of("xx64", "xx64", 0.0, 0.0)],
            }],
            average_ratios: vec![Ratio::of("sha1", "xx64", 2.0, 0.0)],
        };

        let json = report.render(OutputFormat::Json).unwrap();
        let parsed: AlgorithmReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.average_ratios, report.average_ratios);
        assert_eq!(parsed.scales[0].relative_to_fastest[0].ratio, None);
    }
}
