//! HashBench CLI - streaming file hashing and hash benchmarks

use clap::Parser;
use hashbench::bench::{
    default_policies, BenchSuite, DataGenerator, Report, ScratchDir, Timer, DEFAULT_POOL_SIZE,
};
use hashbench::config::{
    parse_block_size, parse_scale_range, BenchArgs, CliArgs, Commands, HashAlgorithm, HashConfig,
    HashingArgs, OutputFormat,
};
use hashbench::error::{HashBenchError, Result};
use hashbench::hash::{hash_files_parallel, HashResult};
use hashbench::progress::ProgressReporter;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = CliArgs::parse();

    // RUST_LOG wins over -v
    let default_level = match (args.quiet, args.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let progress = if args.progress && !args.quiet {
        ProgressReporter::new()
    } else {
        ProgressReporter::hidden()
    };

    match &args.command {
        Commands::Hash {
            paths,
            hashing,
            parallel,
            format,
        } => cmd_hash(paths, hashing, *parallel, *format, &progress),
        Commands::Verify {
            path,
            expected,
            hashing,
        } => cmd_verify(path, expected, hashing, args.quiet),
        Commands::Algorithms => cmd_algorithms(),
        Commands::BenchPolicies {
            bench,
            algorithm,
            initial,
            max,
        } => cmd_bench_policies(bench, algorithm, initial, max, &progress),
        Commands::BenchBlocksize {
            bench,
            algorithm,
            min_power,
            max_power,
        } => cmd_bench_blocksize(bench, algorithm, *min_power..*max_power, &progress),
        Commands::BenchAlgorithms {
            bench,
            scales,
            algorithms,
            reference,
        } => cmd_bench_algorithms(bench, scales, algorithms, reference, &progress),
    }
}

#[derive(Serialize)]
struct FileOutcome {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<HashResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn cmd_hash(
    paths: &[PathBuf],
    hashing: &HashingArgs,
    parallel: bool,
    format: OutputFormat,
    progress: &ProgressReporter,
) -> Result<()> {
    let config = HashConfig::from_cli(hashing)?;
    let hasher = config.hasher()?;
    tracing::info!(
        algorithm = %config.algorithm,
        policy = %config.policy,
        files = paths.len(),
        "hashing"
    );

    progress.expect_runs(paths.len() as u64);
    let hash_one = |path: &Path| {
        progress.set_candidate(&path.display().to_string());
        let result = hasher.hash(path);
        if let Ok(result) = &result {
            progress.record_run(result.size);
        }
        result
    };

    let results: Vec<Result<HashResult>> = if parallel {
        let refs: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
        let results = hash_files_parallel(&refs, &hasher);
        for result in results.iter().flatten() {
            progress.record_run(result.size);
        }
        results
    } else {
        paths.iter().map(|p| hash_one(p)).collect()
    };

    let outcomes: Vec<FileOutcome> = paths
        .iter()
        .zip(results)
        .map(|(path, result)| match result {
            Ok(result) => FileOutcome {
                path: path.clone(),
                result: Some(result),
                error: None,
            },
            Err(e) => FileOutcome {
                path: path.clone(),
                result: None,
                error: Some(e.to_string()),
            },
        })
        .collect();
    let failures = outcomes.iter().filter(|o| o.error.is_some()).count();

    if failures == 0 {
        progress.complete(&format!("hashed {} files", outcomes.len()));
    } else {
        progress.fail(&format!("{} of {} files failed", failures, outcomes.len()));
    }
    tracing::debug!("{}", progress.snapshot().describe());
    progress.clear();

    match format {
        OutputFormat::Text => {
            for outcome in &outcomes {
                match (&outcome.result, &outcome.error) {
                    (Some(result), _) => println!("{}  {}", result.hash, outcome.path.display()),
                    (None, Some(error)) => eprintln!("{}: {}", outcome.path.display(), error),
                    (None, None) => {}
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_verify(path: &Path, expected: &str, hashing: &HashingArgs, quiet: bool) -> Result<()> {
    let hasher = HashConfig::from_cli(hashing)?.hasher()?;
    let matches = hasher.verify(path, expected)?;

    if !quiet {
        println!("{}: {}", path.display(), if matches { "OK" } else { "FAILED" });
    }
    if !matches {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_algorithms() -> Result<()> {
    println!("{:<8} {:<10} {:>6}  cryptographic", "id", "name", "bits");
    for algorithm in HashAlgorithm::ALL {
        println!(
            "{:<8} {:<10} {:>6}  {}",
            algorithm.id(),
            algorithm.name(),
            algorithm.output_size() * 8,
            if algorithm.is_cryptographic() { "yes" } else { "no" }
        );
    }
    Ok(())
}

/// Scratch space, a seeded generator, and a timer, from the shared flags
fn bench_setup(bench: &BenchArgs) -> Result<(ScratchDir, DataGenerator, Timer)> {
    let chunk_size = parse_block_size(&bench.chunk_size)?;
    let timer = Timer::new(bench.iterations, bench.best_of)?;
    let scratch = ScratchDir::new(bench.dir.as_deref())?;
    let generator = DataGenerator::new(bench.seed, chunk_size, DEFAULT_POOL_SIZE)?;
    tracing::info!(dir = %scratch.path().display(), "benchmark scratch directory");
    Ok((scratch, generator, timer))
}

fn print_report(report: &impl Report, format: OutputFormat) -> Result<()> {
    println!("{}", report.render(format)?);
    Ok(())
}

fn cmd_bench_policies(
    bench: &BenchArgs,
    algorithm: &str,
    initial: &str,
    max: &str,
    progress: &ProgressReporter,
) -> Result<()> {
    let algorithm: HashAlgorithm = algorithm.parse()?;
    let policies = default_policies(parse_block_size(initial)?, parse_block_size(max)?);
    for policy in &policies {
        policy.validate()?;
    }

    let (scratch, mut generator, timer) = bench_setup(bench)?;
    let path = generator.write_file(scratch.path(), bench.chunks)?;

    let suite = BenchSuite::new(timer, progress);
    let outcome = suite.compare_policies(&path, algorithm, &policies);
    std::fs::remove_file(&path).ok();
    finish(progress, &outcome);

    print_report(&outcome?, bench.format)
}

fn cmd_bench_blocksize(
    bench: &BenchArgs,
    algorithm: &str,
    powers: std::ops::Range<u32>,
    progress: &ProgressReporter,
) -> Result<()> {
    let algorithm: HashAlgorithm = algorithm.parse()?;
    if powers.is_empty() {
        return Err(HashBenchError::invalid(format!(
            "--min-power {} must be below --max-power {}",
            powers.start, powers.end
        )));
    }

    let (scratch, mut generator, timer) = bench_setup(bench)?;
    let path = generator.write_file(scratch.path(), bench.chunks)?;

    let suite = BenchSuite::new(timer, progress);
    let outcome = suite.find_optimal_block_size(&path, algorithm, powers);
    std::fs::remove_file(&path).ok();
    finish(progress, &outcome);

    print_report(&outcome?, bench.format)
}

fn cmd_bench_algorithms(
    bench: &BenchArgs,
    scales: &str,
    algorithms: &[String],
    reference: &str,
    progress: &ProgressReporter,
) -> Result<()> {
    let algorithms = algorithms
        .iter()
        .map(|name| name.parse::<HashAlgorithm>())
        .collect::<Result<Vec<_>>>()?;
    let reference: HashAlgorithm = reference.parse()?;
    let scales = parse_scale_range(scales)?;

    let (scratch, mut generator, timer) = bench_setup(bench)?;
    let suite = BenchSuite::new(timer, progress);
    let outcome =
        suite.compare_algorithms(&mut generator, scratch.path(), &algorithms, scales, reference);
    finish(progress, &outcome);

    print_report(&outcome?, bench.format)
}

fn finish<T>(progress: &ProgressReporter, outcome: &Result<T>) {
    match outcome {
        Ok(_) => progress.complete("benchmark complete"),
        Err(e) => progress.fail(&e.to_string()),
    }
    tracing::info!("{}", progress.snapshot().describe());
}
