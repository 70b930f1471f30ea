//! Leak Triage Core - Outlier Detection CLI
//!
//! The main entry point for lt-core, handling:
//! - Scanning per-site leak counts for outliers
//! - A self-test over canonical vectors
//! - Policy inspection and validation

use clap::{Args, Parser, Subcommand};
use lt_core::config::{
    list_presets, load_policy, read_policy, ConfigError, ConfigOptions, PresetName, RetestTrials,
};
use lt_core::exit_codes::ExitCode;
use lt_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, Stage, Verbosity,
};
use lt_core::log_event;
use lt_core::output::{render_scans, OutputFormat, ScanResult, SCHEMA_VERSION};
use lt_core::{DetectionReport, OutlierDetector, OutlierError};
use std::path::PathBuf;

/// Leak Triage Core - find allocation sites that leak more than chance explains
#[derive(Parser)]
#[command(name = "lt-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Policy file (overrides LEAK_TRIAGE_POLICY and config directories)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Named preset (strict, standard, exploratory); wins over policy files
    #[arg(long, global = true)]
    preset: Option<PresetName>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the detector on the canonical demonstration vectors
    Selftest(SelftestArgs),

    /// Scan one count vector for outliers
    Detect(DetectArgs),

    /// Inspect and validate detection policies
    Config(ConfigArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct SelftestArgs {
    /// Seed the Monte Carlo sampler for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct DetectArgs {
    /// Comma-separated counts; `nan` or `-` marks a missing entry
    #[arg(long, required = true, value_delimiter = ',', allow_hyphen_values = true)]
    counts: Vec<String>,

    /// Name reported for the vector
    #[arg(long, default_value = "counts")]
    label: String,

    /// False-discovery rate level in (0, 1)
    #[arg(long)]
    alpha: Option<f64>,

    /// Monte Carlo trials for the first test
    #[arg(long)]
    trials: Option<usize>,

    /// Trials for re-tests: default, inherit, or a number
    #[arg(long)]
    retest: Option<RetestTrials>,

    /// Seed the Monte Carlo sampler for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective policy and where it came from
    Show,

    /// Validate a policy file (or the resolved one)
    Validate {
        /// Path to the policy file
        path: Option<PathBuf>,
    },

    /// List the built-in presets
    Presets,
}

/// Canonical vectors exercised by `selftest`.
const SELFTEST_VECTORS: &[&[f64]] = &[
    &[1000.0, 8.0, 8.0, 1.0, 0.0],
    &[8.0, 8.0, 1.0, 0.0],
    &[8.0, 1.0, 0.0],
    &[1.0, 0.0],
];
const SELFTEST_ALPHA: f64 = 0.01;
const SELFTEST_TRIALS: usize = 10_000;

fn main() {
    let cli = Cli::parse();

    init_logging(&LogConfig::from_env(Verbosity::from_flags(
        cli.global.verbose,
        cli.global.quiet,
    )));

    let ctx = LogContext::new(generate_run_id());
    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_STARTED,
        Stage::Init,
        "lt-core started"
    );

    let exit_code = match &cli.command {
        Commands::Selftest(args) => run_selftest(&cli.global, &ctx, args),
        Commands::Detect(args) => run_detect(&cli.global, &ctx, args),
        Commands::Config(args) => run_config(&cli.global, &ctx, args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Report,
        "lt-core finished",
        exit_code = exit_code.as_i32()
    );
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_selftest(global: &GlobalOpts, ctx: &LogContext, args: &SelftestArgs) -> ExitCode {
    let mut detector = OutlierDetector::new()
        .with_alpha(SELFTEST_ALPHA)
        .with_trials(SELFTEST_TRIALS);
    if let Some(seed) = args.seed {
        detector = detector.with_seed(seed);
    }

    let mut scans = Vec::with_capacity(SELFTEST_VECTORS.len());
    for (i, values) in SELFTEST_VECTORS.iter().enumerate() {
        let label = format!("selftest-{}", i);
        let vctx = ctx.clone().with_vector_label(label.as_str());
        match scan(&vctx, &detector, values) {
            Ok(report) => scans.push(ScanResult::new(label, values, report)),
            Err(e) => {
                return output_error(global, ctx, ExitCode::InternalError, &e.to_string());
            }
        }
    }

    // Sanity: the dominant site must go first and a lone unit is never flagged.
    let dominant_first = scans
        .first()
        .and_then(|s| s.report.outliers.first())
        .is_some_and(|o| o.index == 0);
    let lone_unit_clean = scans.last().is_some_and(|s| !s.report.has_outliers());
    if !(dominant_first && lone_unit_clean) {
        log_event!(
            ctx,
            ERROR,
            event_names::INTERNAL_ERROR,
            Stage::Report,
            "selftest expectations not met"
        );
        emit(global, ctx, render_scans(global.format, "selftest", &ctx.run_id, &scans));
        return ExitCode::InternalError;
    }

    if let Some(code) = emit(
        global,
        ctx,
        render_scans(global.format, "selftest", &ctx.run_id, &scans),
    ) {
        return code;
    }
    ExitCode::Clean
}

fn run_detect(global: &GlobalOpts, ctx: &LogContext, args: &DetectArgs) -> ExitCode {
    let ctx = ctx.clone().with_vector_label(args.label.as_str());

    let loaded = match load_policy(&config_options(global)) {
        Ok(loaded) => loaded,
        Err(e) => return output_config_error(global, &ctx, &e),
    };
    log_event!(
        ctx,
        DEBUG,
        event_names::CONFIG_LOADED,
        Stage::Init,
        "policy loaded",
        source = loaded.source.as_str()
    );

    let mut detector = OutlierDetector::from_policy(&loaded.policy);
    if let Some(alpha) = args.alpha {
        detector = detector.with_alpha(alpha);
    }
    if let Some(trials) = args.trials {
        detector = detector.with_trials(trials);
    }
    if let Some(retest) = args.retest {
        detector = detector.with_retest(retest);
    }
    if let Some(seed) = args.seed {
        detector = detector.with_seed(seed);
    }

    let values = match parse_counts(&args.counts) {
        Ok(values) => values,
        Err(message) => {
            log_event!(
                ctx,
                WARN,
                event_names::INPUT_ERROR,
                Stage::Input,
                "invalid counts",
                error = message.as_str()
            );
            return output_error(global, &ctx, ExitCode::ArgsError, &message);
        }
    };

    let report = match scan(&ctx, &detector, &values) {
        Ok(report) => report,
        Err(e) => return output_error(global, &ctx, ExitCode::for_error(&e), &e.to_string()),
    };

    let outcome = ExitCode::for_report(&report);
    let scans = [ScanResult::new(args.label.as_str(), &values, report)];
    if let Some(code) = emit(
        global,
        &ctx,
        render_scans(global.format, "detect", &ctx.run_id, &scans),
    ) {
        return code;
    }

    outcome
}

fn run_config(global: &GlobalOpts, ctx: &LogContext, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => run_config_show(global, ctx),
        ConfigCommands::Validate { path } => run_config_validate(global, ctx, path.as_ref()),
        ConfigCommands::Presets => run_config_presets(global, ctx),
    }
}

/// Display the effective policy (including defaults if no files present).
fn run_config_show(global: &GlobalOpts, ctx: &LogContext) -> ExitCode {
    let loaded = match load_policy(&config_options(global)) {
        Ok(loaded) => loaded,
        Err(e) => return output_config_error(global, ctx, &e),
    };
    if loaded.path.is_none() {
        log_event!(
            ctx,
            DEBUG,
            event_names::CONFIG_DEFAULT_USED,
            Stage::Init,
            "no policy file found",
            source = loaded.source.as_str()
        );
    }

    let rendered = match global.format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": ctx.run_id,
            "source": {
                "origin": loaded.source,
                "path": loaded.path.as_ref().map(|p| p.display().to_string()),
                "using_defaults": loaded.path.is_none(),
            },
            "policy": &loaded.policy,
            "retest_trials": loaded.policy.retest_trials(),
        })),
        OutputFormat::Summary => Ok(format!(
            "policy from {}: alpha={} trials={} retest={} ({} trials) seed={}",
            loaded.source,
            loaded.policy.alpha,
            loaded.policy.trials,
            loaded.policy.retest,
            loaded.policy.retest_trials(),
            loaded
                .policy
                .seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string()),
        )),
    };
    emit(global, ctx, rendered).unwrap_or(ExitCode::Clean)
}

fn run_config_validate(global: &GlobalOpts, ctx: &LogContext, path: Option<&PathBuf>) -> ExitCode {
    let result = match path {
        Some(path) => read_policy(path).map(|policy| (policy, Some(path.clone()))),
        None => load_policy(&ConfigOptions {
            policy_path: global.policy.clone(),
            preset: None,
        })
        .map(|loaded| (loaded.policy, loaded.path)),
    };

    let (policy, path) = match result {
        Ok(ok) => ok,
        Err(e) => return output_config_error(global, ctx, &e),
    };

    let rendered = match global.format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": ctx.run_id,
            "valid": true,
            "path": path.as_ref().map(|p| p.display().to_string()),
            "policy": policy,
        })),
        OutputFormat::Summary => Ok(format!(
            "valid: {}",
            path.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "builtin default".to_string())
        )),
    };
    emit(global, ctx, rendered).unwrap_or(ExitCode::Clean)
}

fn run_config_presets(global: &GlobalOpts, ctx: &LogContext) -> ExitCode {
    let presets = list_presets();
    let rendered = match global.format {
        OutputFormat::Json => {
            let entries: Vec<_> = presets
                .iter()
                .map(|(name, description)| {
                    serde_json::json!({
                        "name": name.as_str(),
                        "description": description,
                        "policy": lt_core::config::get_preset(*name),
                    })
                })
                .collect();
            serde_json::to_string_pretty(&serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "presets": entries,
            }))
        }
        OutputFormat::Summary => Ok(presets
            .iter()
            .map(|(name, description)| format!("{}: {}", name, description))
            .collect::<Vec<_>>()
            .join("\n")),
    };
    emit(global, ctx, rendered).unwrap_or(ExitCode::Clean)
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            let version_info = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "lt_core_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{:#}", version_info);
        }
        OutputFormat::Summary => {
            println!("lt-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn config_options(global: &GlobalOpts) -> ConfigOptions {
    ConfigOptions {
        policy_path: global.policy.clone(),
        preset: global.preset,
    }
}

/// Parse CLI count tokens; `nan`, `-` and empty tokens are missing entries.
fn parse_counts(tokens: &[String]) -> Result<Vec<f64>, String> {
    tokens
        .iter()
        .map(|token| {
            let t = token.trim();
            if t.is_empty() || t == "-" || t.eq_ignore_ascii_case("nan") {
                Ok(f64::NAN)
            } else {
                t.parse::<f64>()
                    .map_err(|_| format!("invalid count '{}'", token))
            }
        })
        .collect()
}

fn scan(
    ctx: &LogContext,
    detector: &OutlierDetector,
    values: &[f64],
) -> Result<DetectionReport, OutlierError> {
    log_event!(
        ctx,
        INFO,
        event_names::DETECT_STARTED,
        Stage::Detect,
        "scanning vector",
        m = values.len(),
        alpha = detector.alpha(),
        trials = detector.trials()
    );
    let result = detector.detect_values(values);
    match &result {
        Ok(report) => log_event!(
            ctx,
            INFO,
            event_names::DETECT_FINISHED,
            Stage::Detect,
            "scan complete",
            outliers = report.outliers.len(),
            iterations = report.iterations.len()
        ),
        Err(e) => {
            let error = e.to_string();
            log_event!(
                ctx,
                WARN,
                event_names::INPUT_ERROR,
                Stage::Detect,
                "scan failed",
                error = error.as_str()
            )
        }
    }
    result
}

/// Print a rendered payload; returns an exit code if rendering failed.
fn emit(
    global: &GlobalOpts,
    ctx: &LogContext,
    rendered: serde_json::Result<String>,
) -> Option<ExitCode> {
    match rendered {
        Ok(text) => {
            println!("{}", text);
            None
        }
        Err(e) => Some(output_error(
            global,
            ctx,
            ExitCode::InternalError,
            &format!("failed to serialize output: {}", e),
        )),
    }
}

fn output_config_error(global: &GlobalOpts, ctx: &LogContext, err: &ConfigError) -> ExitCode {
    let message = err.to_string();
    log_event!(
        ctx,
        ERROR,
        event_names::CONFIG_ERROR,
        Stage::Init,
        "policy error",
        error = message.as_str()
    );
    output_error(global, ctx, ExitCode::ConfigError, &message)
}

fn output_error(global: &GlobalOpts, ctx: &LogContext, code: ExitCode, message: &str) -> ExitCode {
    match global.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "error": {
                    "code": code.code_name(),
                    "exit_code": code.as_i32(),
                    "message": message,
                },
            });
            println!("{:#}", output);
        }
        OutputFormat::Summary => {
            eprintln!("lt-core: error: {}", message);
        }
    }
    code
}
