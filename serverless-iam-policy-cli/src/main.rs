use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::debug;

use serverless_iam_policy_generation::api::{self, model::GeneratePolicyConfig};
use serverless_iam_policy_generation::{report, SynthesizerConfig, DEFAULT_CONFIG_PATH};

/// Serverless deployment policy builder
///
/// Reads a Serverless Framework descriptor, detects the AWS services the
/// deployment uses and writes an IAM policy granting the actions needed to
/// deploy it, scoped to the service, stage and region.
#[derive(Parser, Debug)]
#[command(name = "serverless-iam-policy")]
#[command(version)]
#[command(about, long_about)]
struct Cli {
    /// Path to the serverless.yml descriptor
    #[arg(value_name = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// JSON permission table to use instead of the built-in one
    #[arg(
        short = 'p',
        long = "permissions",
        value_name = "FILE",
        env = "SERVERLESS_IAM_POLICY_PERMISSIONS"
    )]
    permissions: Option<PathBuf>,

    /// Where to write the generated policy
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = api::DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Leave the catch-all "*" resource out of the policy
    #[arg(long = "no-wildcard-fallback")]
    no_wildcard_fallback: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "serverless_iam_policy=debug,serverless_iam_policy_generation=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    println!("Reading serverless config from: {}", cli.config.display());

    let config = GeneratePolicyConfig {
        config_path: cli.config.clone(),
        permission_table_path: cli.permissions.clone(),
        synthesizer: SynthesizerConfig {
            include_wildcard_fallback: !cli.no_wildcard_fallback,
        },
    };
    let result = api::generate_policy(&config)?;

    print!("{}", report::render_report(&result)?);

    api::write_policy(&result.policy, &cli.output)?;
    println!("\nPolicy saved to: {}", cli.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("Parsed arguments: {:?}", cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
