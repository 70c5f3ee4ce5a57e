//! Sigpost CLI
//!
//! Validate, score, and submit security signals to the scoring platform.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use sigpost_client::{load_signal, signal_files, ClientConfig, Communication};
use sigpost_core::{
    quality_of_signal, validate_value, AttackPattern, ComplianceStatus, Effect, Entity,
    EntityAttributes, EntityType, SecurityContext, SecurityType, Severity, SeverityLevel, Signal,
    SignalSource, SignalType, StandardMapping, Status, TechniqueMapping, SOURCE_QUALYS_CA,
};

#[derive(Parser)]
#[command(name = "sigpost")]
#[command(author, version, about = "Sigpost: security-signal scoring and submission", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the quality score of signal files
    Score {
        /// A .json signal file, or a directory of them
        path: PathBuf,
    },

    /// Validate signal files against the schema's required fields
    Validate {
        /// A .json signal file, or a directory of them
        path: PathBuf,
    },

    /// Write sample signals for experimentation
    Sample {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Submit every .json and .zip in a directory to the platform
    Submit {
        /// Directory of signal files
        #[arg(short, long)]
        dir: PathBuf,

        /// Platform base URL
        #[arg(long, env = "SIGNAL_URL")]
        url: String,

        /// REST API username
        #[arg(long, env = "SIGNAL_USERNAME")]
        username: String,

        /// REST API password
        #[arg(long, env = "SIGNAL_PASSWORD")]
        password: String,

        /// Skip signals whose quality score falls below this threshold
        #[arg(long)]
        min_quality: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Score { path } => score(&path)?,
        Commands::Validate { path } => validate(&path)?,
        Commands::Sample { out } => write_samples(&out)?,
        Commands::Submit {
            dir,
            url,
            username,
            password,
            min_quality,
        } => submit(&dir, &url, &username, &password, min_quality).await?,
    }

    Ok(())
}

/// The .json files under `path`, or `path` itself when it is a file.
fn json_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(path)
        .with_context(|| format!("cannot read directory {}", path.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    files.sort();

    anyhow::ensure!(!files.is_empty(), "no .json files in {}", path.display());
    Ok(files)
}

fn score(path: &Path) -> Result<()> {
    for file in json_files(path)? {
        match load_signal(&file) {
            Ok(signal) => {
                println!("{:>8.2}  {}", quality_of_signal(&signal), file.display());
            }
            Err(e) => println!("   error  {} ({})", file.display(), e),
        }
    }
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let mut invalid = 0usize;
    for file in json_files(path)? {
        let text = fs::read_to_string(&file)
            .with_context(|| format!("cannot read {}", file.display()))?;
        let raw: serde_json::Value = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(e) => {
                println!("✗ {} (malformed JSON: {})", file.display(), e);
                invalid += 1;
                continue;
            }
        };

        let report = validate_value(&raw);
        if report.valid {
            println!("✓ {}", file.display());
        } else {
            invalid += 1;
            println!("✗ {}", file.display());
            for error in &report.errors {
                println!("    - {}", error);
            }
        }
    }

    anyhow::ensure!(invalid == 0, "{invalid} file(s) failed validation");
    Ok(())
}

async fn submit(
    dir: &Path,
    url: &str,
    username: &str,
    password: &str,
    min_quality: Option<f64>,
) -> Result<()> {
    let config = ClientConfig::new(url, username, password);
    let client = Communication::new(config)?;
    let files = signal_files(dir)?;

    println!("📡 Submitting {} file(s) from {} to {}\n", files.len(), dir.display(), url);

    let mut accepted = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for file in &files {
        let is_zip = file
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

        let outcome = if is_zip {
            client.submit_zip(file).await
        } else {
            match load_signal(file) {
                Ok(signal) => {
                    let quality = quality_of_signal(&signal);
                    if min_quality.is_some_and(|min| quality < min) {
                        println!("⏭️  {} (quality {:.2} below threshold)", file.display(), quality);
                        skipped += 1;
                        continue;
                    }
                    client.submit_signal(&signal).await
                }
                Err(e) => Err(e),
            }
        };

        // One bad file never aborts the batch.
        match outcome {
            Ok(response) if response.is_success() => {
                accepted += 1;
                println!("✅ {} ({})", file.display(), response.message);
            }
            Ok(response) => {
                failed += 1;
                match response.retry_in {
                    Some(retry_in) => println!(
                        "❌ {} ({}, retry in {})",
                        file.display(),
                        response.message,
                        retry_in
                    ),
                    None => println!("❌ {} ({})", file.display(), response.message),
                }
            }
            Err(e) => {
                failed += 1;
                println!("❌ {} ({})", file.display(), e);
            }
        }
    }

    println!("\n📊 accepted: {accepted}, skipped: {skipped}, failed: {failed}");
    anyhow::ensure!(failed == 0, "{failed} submission(s) failed");
    Ok(())
}

fn write_samples(out: &Path) -> Result<()> {
    fs::create_dir_all(out)
        .with_context(|| format!("cannot create {}", out.display()))?;

    let samples = [
        ("simple_ca_signal.json", simple_ca_signal()),
        ("high_quality_va_signal.json", high_quality_va_signal()),
    ];

    for (filename, signal) in samples {
        let path = out.join(filename);
        fs::write(&path, serde_json::to_string_pretty(&signal)?)
            .with_context(|| format!("cannot write {}", path.display()))?;
        println!(
            "📄 {} (quality {:.2})",
            path.display(),
            quality_of_signal(&signal)
        );
    }

    Ok(())
}

/// A minimal misconfiguration finding: entity plus a bare CA context.
fn simple_ca_signal() -> Signal {
    let source = SignalSource {
        name: SOURCE_QUALYS_CA.to_string(),
        next_submission_interval_in_mins: Some(1440),
    };

    Signal::builder(
        "Ensure 'Windows Firewall: Domain: Firewall state' is set to 'On'",
        source,
    )
    .signal_type(SignalType::Default)
    .description(
        "Select On to have Windows Firewall with Advanced Security use the \
         settings for this profile to filter network traffic.",
    )
    .entity(Entity::new(EntityType::Machine, "MyVirtualMachine.acme.com"))
    .security_context(SecurityContext::new(
        SecurityType::Ca,
        Status {
            compliance_status: Some(ComplianceStatus::Fail),
            workflow_status: None,
        },
        Severity::scored("ccss", 7.2),
    ))
    .build()
}

/// A vulnerability finding with the enrichment the scorer rewards:
/// standards mapping, technique mapping, impact, effect, and control type.
fn high_quality_va_signal() -> Signal {
    let mut context = SecurityContext::new(
        SecurityType::Va,
        Status {
            compliance_status: Some(ComplianceStatus::Fail),
            workflow_status: None,
        },
        Severity::scored("cvss", 9.8),
    )
    .with_degree_of_impact(8);
    context.standards_mapping = Some(vec![StandardMapping {
        name: "nvd".to_string(),
        value: "CVE-2021-44228".to_string(),
        properties: None,
    }]);
    context.attack_pattern = Some(vec![AttackPattern {
        name: "Exploitation of Remote Services".to_string(),
        description: None,
        source_name: "capec".to_string(),
        source_id: Some("CAPEC-555".to_string()),
        mapping: Some(TechniqueMapping {
            technique_name: "Exploitation of Remote Services".to_string(),
            technique_id: "T1210".to_string(),
        }),
    }]);
    context.effect = Some(vec![Effect::DataExfiltration]);
    context.control_type = Some(sigpost_core::ControlType::Detection);

    let attributes = EntityAttributes {
        attribute_type: Some("Ubuntu 22.04".to_string()),
        criticality: Some(SeverityLevel::High),
        confidentiality_requirement: Some(SeverityLevel::High),
        integrity_requirement: Some(SeverityLevel::High),
        availability_requirement: Some(SeverityLevel::Medium),
        ..Default::default()
    };

    Signal::builder(
        "Remote code execution in log4j (Log4Shell)",
        SignalSource {
            name: "com.acme.vascanner".to_string(),
            next_submission_interval_in_mins: Some(1440),
        },
    )
    .signal_type(SignalType::Default)
    .confidence(95)
    .expires_at(Utc::now() + Duration::hours(24))
    .entity(
        Entity::new(EntityType::Machine, "log-ingest-01.acme.com").with_attributes(attributes),
    )
    .security_context(context)
    .build()
}
