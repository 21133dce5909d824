//! Benchmark scenarios
//!
//! Every scenario checks that all of its runs over one file agree on the
//! digest before reporting any timings.

use super::data::DataGenerator;
use super::report::{AlgorithmReport, RankingReport, Ratio, ScaleResult};
use super::timer::{rank, Measurement, Timer};
use crate::config::HashAlgorithm;
use crate::error::{HashBenchError, IoResultExt, Result};
use crate::hash::{BlockSizePolicy, StreamingFileHasher};
use crate::progress::ProgressReporter;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Block size used when comparing algorithms (1 MiB)
pub const BENCH_BLOCK_SIZE: usize = 1024 * 1024;

/// Constant, doubling and capped policies sharing one initial size
pub fn default_policies(initial: usize, max: usize) -> Vec<BlockSizePolicy> {
    vec![
        BlockSizePolicy::constant(initial),
        BlockSizePolicy::doubling(initial),
        BlockSizePolicy::doubling_capped(initial, max),
    ]
}

/// Runs benchmark scenarios with one timer and progress display
pub struct BenchSuite<'a> {
    timer: Timer,
    progress: &'a ProgressReporter,
}

impl<'a> BenchSuite<'a> {
    /// Create a suite
    pub fn new(timer: Timer, progress: &'a ProgressReporter) -> Self {
        Self { timer, progress }
    }

    /// Time hashing `path` under each policy
    pub fn compare_policies(
        &self,
        path: &Path,
        algorithm: HashAlgorithm,
        policies: &[BlockSizePolicy],
    ) -> Result<RankingReport> {
        let candidates = policies.iter().map(|p| (p.label(), *p)).collect();
        self.rank_candidates("Block size policies", path, algorithm, candidates)
    }

    /// Time hashing `path` with constant block sizes `2^e` for `e` in `powers`
    pub fn find_optimal_block_size(
        &self,
        path: &Path,
        algorithm: HashAlgorithm,
        powers: Range<u32>,
    ) -> Result<RankingReport> {
        if powers.is_empty() {
            return Err(HashBenchError::invalid("block size power range is empty"));
        }
        if powers.end >= usize::BITS {
            return Err(HashBenchError::invalid(format!(
                "block size power {} does not fit in memory",
                powers.end - 1
            )));
        }

        let candidates = powers
            .map(|e| {
                let size = 1usize << e;
                (format!("constant 2^{} = {}", e, size), BlockSizePolicy::constant(size))
            })
            .collect();
        self.rank_candidates("Constant block sizes", path, algorithm, candidates)
    }

    fn rank_candidates(
        &self,
        title: &str,
        path: &Path,
        algorithm: HashAlgorithm,
        candidates: Vec<(String, BlockSizePolicy)>,
    ) -> Result<RankingReport> {
        let file_size = std::fs::metadata(path).with_path(path)?.len();
        self.progress
            .expect_runs((candidates.len() * self.timer.iterations()) as u64);
        tracing::info!(title, path = %path.display(), candidates = candidates.len(), "benchmark started");

        let mut rankings = Vec::with_capacity(candidates.len());
        let mut digests = Vec::with_capacity(candidates.len());

        for (label, policy) in candidates {
            let hasher = StreamingFileHasher::new(algorithm, policy)?;
            self.progress.set_candidate(&format!("{}: {}", title, label));

            let (measurement, result) = self.timer.measure(label.clone(), || {
                let result = hasher.hash(path)?;
                self.progress.record_run(result.size);
                Ok(result)
            })?;

            digests.push((label, result.hash));
            rankings.push(measurement);
        }

        let digest = check_agreement(&digests)?;
        rank(&mut rankings);

        Ok(RankingReport {
            title: title.to_string(),
            path: path.to_path_buf(),
            file_size,
            algorithm,
            digest,
            rankings,
        })
    }

    /// Time every algorithm on generated files of `2^s` chunks for `s` in `scales`.
    ///
    /// `reference` is timed too even when `algorithms` leaves it out. Each
    /// generated file is removed once it has been measured.
    pub fn compare_algorithms(
        &self,
        generator: &mut DataGenerator,
        dir: &Path,
        algorithms: &[HashAlgorithm],
        scales: Range<u32>,
        reference: HashAlgorithm,
    ) -> Result<AlgorithmReport> {
        if scales.is_empty() {
            return Err(HashBenchError::invalid("scale range is empty"));
        }

        let mut selected: Vec<HashAlgorithm> = Vec::with_capacity(algorithms.len() + 1);
        for &algorithm in algorithms.iter().chain(std::iter::once(&reference)) {
            if !selected.contains(&algorithm) {
                selected.push(algorithm);
            }
        }

        self.progress.expect_runs(
            (scales.len() * selected.len() * self.timer.iterations()) as u64,
        );

        let mut results = Vec::with_capacity(scales.len());
        for scale in scales {
            let chunks = 1usize
                .checked_shl(scale)
                .ok_or_else(|| HashBenchError::invalid(format!("scale {} is too large", scale)))?;
            let file = GeneratedFile(generator.write_file(dir, chunks)?);
            let path = file.0.as_path();
            let bytes = std::fs::metadata(path).with_path(path)?.len();
            tracing::info!(chunks, bytes, "timing algorithms");

            let mut timings = Vec::with_capacity(selected.len());
            for &algorithm in &selected {
                let hasher =
                    StreamingFileHasher::new(algorithm, BlockSizePolicy::constant(BENCH_BLOCK_SIZE))?;
                self.progress
                    .set_candidate(&format!("{} chunks: {}", chunks, algorithm.name()));
                let (measurement, _) = self.timer.measure(algorithm.id(), || {
                    let result = hasher.hash(path)?;
                    self.progress.record_run(result.size);
                    Ok(result)
                })?;
                timings.push(measurement);
            }
            drop(file);

            rank(&mut timings);
            let relative_to_fastest = match timings.first() {
                Some(fastest) => timings
                    .iter()
                    .map(|m| Ratio::of(&m.label, &fastest.label, m.best_mean, fastest.best_mean))
                    .collect(),
                None => Vec::new(),
            };

            results.push(ScaleResult {
                chunks: chunks as u64,
                bytes,
                timings,
                relative_to_fastest,
            });
        }

        let average_ratios = average_ratios(&results, &selected, reference);
        Ok(AlgorithmReport {
            reference,
            scales: results,
            average_ratios,
        })
    }
}

/// Benchmark file that is deleted when dropped, including on early error returns
struct GeneratedFile(PathBuf);

impl Drop for GeneratedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            tracing::warn!(path = %self.0.display(), error = %e, "could not remove benchmark file");
        }
    }
}

/// All runs must have produced the same digest; returns it
fn check_agreement(digests: &[(String, String)]) -> Result<String> {
    let Some((first_label, expected)) = digests.first() else {
        return Err(HashBenchError::invalid("no candidates to compare"));
    };

    for (label, actual) in &digests[1..] {
        if actual != expected {
            tracing::warn!(
                expected_from = %first_label,
                label = %label,
                expected = %expected,
                actual = %actual,
                "digest depends on block size policy"
            );
            return Err(HashBenchError::mismatch(label.clone(), expected.clone(), actual.clone()));
        }
    }
    Ok(expected.clone())
}

fn time_of<'m>(timings: &'m [Measurement], algorithm: HashAlgorithm) -> Option<&'m Measurement> {
    timings.iter().find(|m| m.label == algorithm.id())
}

fn average_ratios(
    results: &[ScaleResult],
    algorithms: &[HashAlgorithm],
    reference: HashAlgorithm,
) -> Vec<Ratio> {
    let mut ratios: Vec<Ratio> = algorithms
        .iter()
        .filter(|&&algorithm| algorithm != reference)
        .map(|&algorithm| {
            let per_scale: Vec<f64> = results
                .iter()
                .filter_map(|scale| {
                    let a = time_of(&scale.timings, algorithm)?;
                    let r = time_of(&scale.timings, reference)?;
                    Ratio::of(algorithm.id(), reference.id(), a.best_mean, r.best_mean).ratio
                })
                .collect();
            let mean = (!per_scale.is_empty())
                .then(|| per_scale.iter().sum::<f64>() / per_scale.len() as f64);
            Ratio {
                label: format!("{}/{}", algorithm.id(), reference.id()),
                ratio: mean,
            }
        })
        .collect();

    // undefined ratios last
    ratios.sort_by(|a, b| match (a.ratio, b.ratio) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    ratios
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn quick_suite(progress: &ProgressReporter) -> BenchSuite<'_> {
        BenchSuite::new(Timer::new(2, 1).unwrap(), progress)
    }

    fn generated_file(dir: &Path) -> std::path::PathBuf {
        DataGenerator::new(0, 4096, 4).unwrap().write_file(dir, 20).unwrap()
    }

    #[test]
    fn test_compare_policies_agree() {
        let dir = TempDir::new().unwrap();
        let path = generated_file(dir.path());
        let progress = ProgressReporter::hidden();

        let report = quick_suite(&progress)
            .compare_policies(&path, HashAlgorithm::Xx64, &default_policies(1024, 16 * 1024))
            .unwrap();

        assert_eq!(report.rankings.len(), 3);
        assert_eq!(report.file_size, 20 * 4096);
        let content = std::fs::read(&path).unwrap();
        assert_eq!(report.digest, crate::hash::hash_bytes(&content, HashAlgorithm::Xx64).hash);
        assert_eq!(progress.snapshot().runs_done, 6);
    }

    #[test]
    fn test_find_optimal_block_size() {
        let dir = TempDir::new().unwrap();
        let path = generated_file(dir.path());
        let progress = ProgressReporter::hidden();

        let report = quick_suite(&progress)
            .find_optimal_block_size(&path, HashAlgorithm::Blake3, 10..14)
            .unwrap();

        assert_eq!(report.rankings.len(), 4);
        assert!(report.rankings.iter().any(|m| m.label == "constant 2^12 = 4096"));
        let times: Vec<f64> = report.rankings.iter().map(|m| m.best_mean).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_find_optimal_rejects_bad_ranges() {
        let dir = TempDir::new().unwrap();
        let path = generated_file(dir.path());
        let progress = ProgressReporter::hidden();
        let suite = quick_suite(&progress);

        assert!(suite.find_optimal_block_size(&path, HashAlgorithm::Xx64, 12..12).is_err());
        assert!(suite.find_optimal_block_size(&path, HashAlgorithm::Xx64, 10..200).is_err());
    }

    #[test]
    fn test_compare_algorithms() {
        let dir = TempDir::new().unwrap();
        let progress = ProgressReporter::hidden();
        let mut generator = DataGenerator::new(0, 1024, 4).unwrap();

        let report = quick_suite(&progress)
            .compare_algorithms(
                &mut generator,
                dir.path(),
                &[HashAlgorithm::Sha1, HashAlgorithm::Blake3],
                2..4,
                HashAlgorithm::Xx64,
            )
            .unwrap();

        assert_eq!(report.scales.len(), 2);
        assert_eq!(report.scales[0].chunks, 4);
        assert_eq!(report.scales[1].bytes, 8 * 1024);
        for scale in &report.scales {
            assert_eq!(scale.timings.len(), 3);
            assert!(scale.relative_to_fastest.iter().all(|r| r.ratio.map_or(true, |x| x >= 1.0)));
        }
        let labels: Vec<&str> = report.average_ratios.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels.len(), 2);
        assert!(labels.contains(&"sha1/xx64"));
        assert!(labels.contains(&"blake3/xx64"));

        // generated files are cleaned up
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_generated_file_removed_on_error() {
        let dir = TempDir::new().unwrap();
        let mut generator = DataGenerator::new(0, 64, 2).unwrap();

        let fail_while_holding = |generator: &mut DataGenerator| -> Result<()> {
            let file = GeneratedFile(generator.write_file(dir.path(), 3)?);
            assert!(file.0.exists());
            Err(HashBenchError::invalid("run failed"))
        };
        assert!(fail_while_holding(&mut generator).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_check_agreement() {
        let same = vec![
            ("a".to_string(), "00ff".to_string()),
            ("b".to_string(), "00ff".to_string()),
        ];
        assert_eq!(check_agreement(&same).unwrap(), "00ff");

        let different = vec![
            ("a".to_string(), "00ff".to_string()),
            ("b".to_string(), "ff00".to_string()),
        ];
        let err = check_agreement(&different).unwrap_err();
        assert!(matches!(err, HashBenchError::DigestMismatch { ref label, .. } if label == "b"));

        assert!(check_agreement(&[]).is_err());
    }

    #[test]
    fn test_average_ratios() {
        let ms = |pairs: &[(&str, u64)]| -> Vec<Measurement> {
            pairs
                .iter()
                .map(|(l, ms)| Measurement::from_samples(*l, &[Duration::from_millis(*ms)], 1))
                .collect()
        };
        let results = vec![
            ScaleResult {
                chunks: 1,
                bytes: 1,
                timings: ms(&[("xx64", 10), ("sha1", 40)]),
                relative_to_fastest: Vec::new(),
            },
            ScaleResult {
                chunks: 2,
                bytes: 2,
                timings: ms(&[("xx64", 10), ("sha1", 20)]),
                relative_to_fastest: Vec::new(),
            },
        ];

        let ratios = average_ratios(
            &results,
            &[HashAlgorithm::Sha1, HashAlgorithm::Xx64],
            HashAlgorithm::Xx64,
        );
        assert_eq!(ratios.len(), 1);
        assert_eq!(ratios[0].label, "sha1/xx64");
        assert!((ratios[0].ratio.unwrap() - 3.0).abs() < 1e-9);
    }
}
