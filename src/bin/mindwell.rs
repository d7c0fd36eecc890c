//! Mindwell CLI - Command-line interface for the stress-assessment engine
//!
//! Commands:
//! - evaluate: Assess a single reading (flags or JSON input)
//! - batch: Assess a stream of readings (NDJSON)
//! - fetch: Pull vitals from Google Fit and assess (requires `fetch` feature)
//! - schema: Print schema information
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;

use mindwell::{
    AssessmentReport, EvalError, Reading, ReadingSource, StressMonitor, MINDWELL_VERSION,
    PRODUCER_NAME, REPORT_VERSION,
};

/// Mindwell - Stress assessment over physiological and environmental readings
#[derive(Parser)]
#[command(name = "mindwell")]
#[command(author = "Mindwell Project")]
#[command(version = MINDWELL_VERSION)]
#[command(about = "Assess stress from heart rate, sleep, noise, and light", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess a single reading
    Evaluate {
        /// Heart rate (bpm)
        #[arg(long)]
        heart_rate: Option<f64>,

        /// Sleep duration (hours)
        #[arg(long)]
        sleep_hours: Option<f64>,

        /// Ambient noise level (dB)
        #[arg(long)]
        noise: Option<f64>,

        /// Ambient light level (lux)
        #[arg(long)]
        light: Option<f64>,

        /// Read the reading as JSON from a file instead (use - for stdin)
        #[arg(short, long, conflicts_with_all = ["heart_rate", "sleep_hours", "noise", "light"])]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Assess an NDJSON stream of readings
    Batch {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        batch_format: BatchFormat,
    },

    /// Pull heart-rate and sleep vitals from Google Fit and assess
    #[cfg(feature = "fetch")]
    Fetch {
        /// OAuth2 token file (desktop token.json)
        #[arg(long, default_value = "token.json")]
        token_file: PathBuf,

        /// Ambient noise level (dB), always entered manually
        #[arg(long)]
        noise: f64,

        /// Ambient light level (lux), always entered manually
        #[arg(long)]
        light: f64,

        /// Manual heart-rate fallback when the cloud has no data (bpm)
        #[arg(long)]
        heart_rate: Option<f64>,

        /// Manual sleep fallback when the cloud has no data (hours)
        #[arg(long)]
        sleep_hours: Option<f64>,

        /// Output format
        #[arg(long, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check an OAuth2 token file
        #[arg(long)]
        token_file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable score and recommendation
    Text,
    /// Full assessment report as JSON
    Json,
    /// Full assessment report as pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum BatchFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (reading.v1)
    Input,
    /// Output schema (assessment_report.v1)
    Output,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), MindwellCliError> {
    match cli.command {
        Commands::Evaluate {
            heart_rate,
            sleep_hours,
            noise,
            light,
            input,
            output_format,
        } => cmd_evaluate(heart_rate, sleep_hours, noise, light, input.as_deref(), output_format),

        Commands::Batch {
            input,
            output,
            batch_format,
        } => cmd_batch(&input, &output, batch_format),

        #[cfg(feature = "fetch")]
        Commands::Fetch {
            token_file,
            noise,
            light,
            heart_rate,
            sleep_hours,
            output_format,
        } => cmd_fetch(&token_file, noise, light, heart_rate, sleep_hours, output_format),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),

        Commands::Doctor { token_file, json } => cmd_doctor(token_file.as_deref(), json),
    }
}

fn cmd_evaluate(
    heart_rate: Option<f64>,
    sleep_hours: Option<f64>,
    noise: Option<f64>,
    light: Option<f64>,
    input: Option<&std::path::Path>,
    output_format: OutputFormat,
) -> Result<(), MindwellCliError> {
    let reading = if let Some(input) = input {
        let raw = read_input(input)?;
        serde_json::from_str(&raw)?
    } else {
        match (heart_rate, sleep_hours, noise, light) {
            (Some(hr), Some(sleep), Some(noise), Some(light)) => {
                Reading::new(hr, sleep, noise, light)
            }
            _ => return Err(MindwellCliError::MissingValues),
        }
    };

    let monitor = StressMonitor::new();
    let report = monitor.assess(&reading, ReadingSource::Manual, Utc::now())?;

    print_report(&report, &output_format)?;
    Ok(())
}

fn cmd_batch(
    input: &std::path::Path,
    output: &std::path::Path,
    batch_format: BatchFormat,
) -> Result<(), MindwellCliError> {
    let monitor = StressMonitor::new();
    let mut reports: Vec<AssessmentReport> = Vec::new();

    if input.to_string_lossy() == "-" {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            if let Some(report) = assess_line(&monitor, &line)? {
                reports.push(report);
            }
        }
    } else {
        let raw = fs::read_to_string(input)?;
        for line in raw.lines() {
            if let Some(report) = assess_line(&monitor, line)? {
                reports.push(report);
            }
        }
    }

    if reports.is_empty() {
        return Err(MindwellCliError::NoReadings);
    }

    let output_data = match batch_format {
        BatchFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for report in &reports {
                lines.push(serde_json::to_string(report)?);
            }
            lines.join("\n") + "\n"
        }
        BatchFormat::Json => serde_json::to_string(&reports)?,
    };

    if output.to_string_lossy() == "-" {
        print!("{output_data}");
        io::stdout().flush()?;
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn assess_line(
    monitor: &StressMonitor,
    line: &str,
) -> Result<Option<AssessmentReport>, MindwellCliError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let reading: Reading = serde_json::from_str(trimmed)
        .map_err(|e| MindwellCliError::ParseError(format!("Failed to parse reading: {e}")))?;

    let report = monitor.assess(&reading, ReadingSource::Manual, Utc::now())?;
    Ok(Some(report))
}

#[cfg(feature = "fetch")]
fn cmd_fetch(
    token_file: &std::path::Path,
    noise: f64,
    light: f64,
    heart_rate_fallback: Option<f64>,
    sleep_fallback: Option<f64>,
    output_format: OutputFormat,
) -> Result<(), MindwellCliError> {
    use mindwell::{FetchedVitals, GoogleFitClient};

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let fetched: Result<FetchedVitals, mindwell::FetchError> = (|| {
        let mut client = GoogleFitClient::from_token_file(token_file)?;
        runtime.block_on(client.fetch_vitals())
    })();

    let (vitals, source) = match fetched {
        Ok(vitals) => (vitals, ReadingSource::GoogleFit),
        Err(e) => {
            // Cloud fetch failed; fall back to manual entry when the caller
            // supplied values for it
            if heart_rate_fallback.is_some() && sleep_fallback.is_some() {
                log::warn!("cloud fetch failed ({e}), using manual fallback values");
                (
                    FetchedVitals {
                        heart_rate_bpm: heart_rate_fallback,
                        sleep_hours: sleep_fallback,
                    },
                    ReadingSource::Manual,
                )
            } else {
                return Err(MindwellCliError::Fetch(e));
            }
        }
    };

    // Fill per-field gaps in the cloud data from the fallback flags
    let vitals = FetchedVitals {
        heart_rate_bpm: vitals.heart_rate_bpm.or(heart_rate_fallback),
        sleep_hours: vitals.sleep_hours.or(sleep_fallback),
    };

    let reading = vitals
        .into_reading(noise, light)
        .ok_or(MindwellCliError::NoVitals)?;

    let monitor = StressMonitor::new();
    let report = monitor.assess(&reading, source, Utc::now())?;

    print_report(&report, &output_format)?;
    Ok(())
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), MindwellCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: reading.v1");
                println!();
                println!("A reading is a JSON object with four numeric fields:");
                println!();
                println!("  heart_rate_bpm  - heart rate in beats per minute");
                println!("  sleep_hours     - sleep duration over the trailing night");
                println!("  noise_level_db  - ambient noise level in decibels");
                println!("  light_level_lux - ambient light level in lux");
                println!();
                println!("All fields must be finite numbers; NaN and infinity are rejected");
                println!("before evaluation.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: assessment_report.v1");
                println!();
                println!("An assessment report contains:");
                println!();
                println!("- report_version: Schema version ({REPORT_VERSION})");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- provenance: {{ source, observed_at_utc, computed_at_utc }}");
                println!("- reading: the evaluated input reading");
                println!("- score: 0-4 count of readings outside their normal band");
                println!("- level: balanced | slight | moderate | high | critical");
                println!("- message: canned recommendation for the band");
            }
        }
    }

    Ok(())
}

fn cmd_doctor(token_file: Option<&std::path::Path>, json: bool) -> Result<(), MindwellCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    // Check Mindwell version
    checks.push(DoctorCheck {
        name: "mindwell_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Mindwell version {MINDWELL_VERSION}"),
    });

    // Check report schema version
    checks.push(DoctorCheck {
        name: "report_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Report schema: {REPORT_VERSION}"),
    });

    // Check token file if provided
    if let Some(token_path) = token_file {
        if token_path.exists() {
            match fs::read_to_string(token_path) {
                Ok(content) => match serde_json::from_str::<serde_json::Value>(&content) {
                    Ok(value) => {
                        let has_refresh = value
                            .get("refresh_token")
                            .and_then(|v| v.as_str())
                            .is_some();
                        if has_refresh {
                            checks.push(DoctorCheck {
                                name: "token_file".to_string(),
                                status: CheckStatus::Ok,
                                message: "Token file valid (refresh token present)".to_string(),
                            });
                        } else {
                            checks.push(DoctorCheck {
                                name: "token_file".to_string(),
                                status: CheckStatus::Warning,
                                message:
                                    "Token file has no refresh token; fetch will fail once the access token expires"
                                        .to_string(),
                            });
                        }
                    }
                    Err(e) => {
                        checks.push(DoctorCheck {
                            name: "token_file".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid token JSON: {e}"),
                        });
                    }
                },
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "token_file".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot read token file: {e}"),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "token_file".to_string(),
                status: CheckStatus::Warning,
                message: "Token file does not exist; run the desktop authorization flow first"
                    .to_string(),
            });
        }
    }

    // Check whether cloud fetch support is compiled in
    let fetch_check = if cfg!(feature = "fetch") {
        DoctorCheck {
            name: "fetch".to_string(),
            status: CheckStatus::Ok,
            message: "Cloud fetch support compiled in".to_string(),
        }
    } else {
        DoctorCheck {
            name: "fetch".to_string(),
            status: CheckStatus::Warning,
            message: "Built without the fetch feature; only manual entry available".to_string(),
        }
    };
    checks.push(fetch_check);

    // Check stdin is available (for batch mode)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (batch mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: MINDWELL_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Mindwell Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(MindwellCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &std::path::Path) -> Result<String, MindwellCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn print_report(
    report: &AssessmentReport,
    output_format: &OutputFormat,
) -> Result<(), MindwellCliError> {
    match output_format {
        OutputFormat::Text => {
            println!("Stress Score: {} ({})", report.score, report.level.as_str());
            println!("Recommendation: {}", report.message);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://mindwell.dev/schemas/reading.v1.json",
        "title": "reading.v1",
        "description": "Mindwell input reading schema",
        "type": "object",
        "required": ["heart_rate_bpm", "sleep_hours", "noise_level_db", "light_level_lux"],
        "properties": {
            "heart_rate_bpm": { "type": "number" },
            "sleep_hours": { "type": "number" },
            "noise_level_db": { "type": "number" },
            "light_level_lux": { "type": "number" }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://mindwell.dev/schemas/assessment_report.v1.json",
        "title": "assessment_report.v1",
        "description": "Mindwell assessment report schema",
        "type": "object",
        "required": ["report_version", "producer", "provenance", "reading", "score", "level", "message"],
        "properties": {
            "report_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "provenance": {
                "type": "object",
                "properties": {
                    "source": { "type": "string", "enum": ["manual", "google_fit"] },
                    "observed_at_utc": { "type": "string" },
                    "computed_at_utc": { "type": "string" }
                }
            },
            "reading": {
                "type": "object",
                "properties": {
                    "heart_rate_bpm": { "type": "number" },
                    "sleep_hours": { "type": "number" },
                    "noise_level_db": { "type": "number" },
                    "light_level_lux": { "type": "number" }
                }
            },
            "score": { "type": "integer", "minimum": 0, "maximum": 4 },
            "level": { "type": "string", "enum": ["balanced", "slight", "moderate", "high", "critical"] },
            "message": { "type": "string" }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum MindwellCliError {
    Io(io::Error),
    Eval(EvalError),
    Json(serde_json::Error),
    #[cfg(feature = "fetch")]
    Fetch(mindwell::FetchError),
    MissingValues,
    NoReadings,
    #[cfg(feature = "fetch")]
    NoVitals,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for MindwellCliError {
    fn from(e: io::Error) -> Self {
        MindwellCliError::Io(e)
    }
}

impl From<EvalError> for MindwellCliError {
    fn from(e: EvalError) -> Self {
        MindwellCliError::Eval(e)
    }
}

impl From<serde_json::Error> for MindwellCliError {
    fn from(e: serde_json::Error) -> Self {
        MindwellCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MindwellCliError> for CliError {
    fn from(e: MindwellCliError) -> Self {
        match e {
            MindwellCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MindwellCliError::Eval(e) => CliError {
                code: "EVAL_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure all reading fields are finite numbers".to_string()),
            },
            MindwellCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            #[cfg(feature = "fetch")]
            MindwellCliError::Fetch(e) => CliError {
                code: "FETCH_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Cloud fetch failed; enter values manually with 'mindwell evaluate'"
                        .to_string(),
                ),
            },
            MindwellCliError::MissingValues => CliError {
                code: "MISSING_VALUES".to_string(),
                message: "All four readings are required".to_string(),
                hint: Some(
                    "Pass --heart-rate, --sleep-hours, --noise, and --light, or --input"
                        .to_string(),
                ),
            },
            MindwellCliError::NoReadings => CliError {
                code: "NO_READINGS".to_string(),
                message: "No readings found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            #[cfg(feature = "fetch")]
            MindwellCliError::NoVitals => CliError {
                code: "NO_VITALS".to_string(),
                message: "Provider returned no heart-rate or sleep data".to_string(),
                hint: Some(
                    "Supply --heart-rate and --sleep-hours as manual fallback values".to_string(),
                ),
            },
            MindwellCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            MindwellCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
