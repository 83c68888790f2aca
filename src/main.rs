use clap::{Args, Parser, Subcommand};
use dnssec_sync::config::Config;
use dnssec_sync::control_plane::ControlPlaneClient;
use dnssec_sync::error::Result;
use dnssec_sync::reconcile::Reconciler;
use dnssec_sync::registrar::RegistrarClient;
use dnssec_sync::{export, report};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, warn};

#[derive(Parser, Debug)]
#[command(
    name = "dnssec-sync",
    version,
    about = "Sync DNSSEC signing keys from the DNS hosting control plane to the domain registrar"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load DNSSEC keys from the control plane and write the export file
    Export,
    /// Perform requests against the registrar API. Specify at least one action.
    Registrar(RegistrarArgs),
}

#[derive(Args, Debug)]
struct RegistrarArgs {
    /// Print a summary of published keys
    #[arg(short, long)]
    summary: bool,

    /// Print a detailed report of published keys
    #[arg(short, long)]
    report: bool,

    /// Print the zones known locally and at the registrar
    #[arg(short, long)]
    list: bool,

    /// Print the key data of a specific origin
    #[arg(short, long, value_name = "ORIGIN")]
    keylist: Option<String>,

    /// Push all local keys that are not yet published
    #[arg(short, long)]
    publish: bool,

    /// Clean corrupted and orphaned keys of a specific origin
    #[arg(short, long, value_name = "ORIGIN")]
    clean: Option<String>,

    /// Delete registrar keys that are not known locally
    #[arg(long)]
    clean_orphans: bool,

    /// Delete registrar keys that are known locally but differ in record details
    #[arg(long)]
    clean_corrupt: bool,
}

impl RegistrarArgs {
    fn has_action(&self) -> bool {
        self.summary
            || self.report
            || self.list
            || self.keylist.is_some()
            || self.publish
            || self.clean.is_some()
            || self.clean_orphans
            || self.clean_corrupt
    }
}

// The whole run is sequential request/response work; the current-thread
// flavor keeps it that way.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    match cli.command {
        Commands::Export => run_export(&config).await,
        Commands::Registrar(args) => run_registrar(&config, args).await,
    }
}

/// Fetch signing data from the control plane and write the export
/// artifact. The session is closed whatever the outcome.
async fn run_export(config: &Config) -> Result<()> {
    let mut client = ControlPlaneClient::new(config)?;
    let collected = client.collect_signed_zones().await;
    if let Err(e) = client.logout().await {
        warn!("Control plane logout failed: {}", e);
    }
    let keys = collected?;
    export::write_export(Path::new(&config.export_file), &keys)
}

/// Run the requested registrar actions over a single loaded registry. The
/// session is closed whatever the outcome.
async fn run_registrar(config: &Config, args: RegistrarArgs) -> Result<()> {
    if !args.has_action() {
        warn!("Pass at least one action flag to perform registrar requests (see --help)");
        return Ok(());
    }

    let registrar = RegistrarClient::new(config)?;
    let mut reconciler = Reconciler::new(registrar);
    let outcome = execute_actions(&mut reconciler, config, &args).await;
    reconciler.finish(outcome).await
}

async fn execute_actions(
    reconciler: &mut Reconciler<RegistrarClient>,
    config: &Config,
    args: &RegistrarArgs,
) -> Result<()> {
    reconciler.load(Path::new(&config.export_file)).await?;

    if args.summary {
        report::print_summary(reconciler.registry());
    }
    if args.report {
        report::print_report(reconciler.registry());
    }
    if args.list {
        report::print_zone_list(reconciler.registry());
    }
    if let Some(origin) = &args.keylist {
        report::print_zone_keys(reconciler.registry(), origin)?;
    }
    if args.publish {
        reconciler.publish_unpublished().await?;
    }
    if let Some(origin) = &args.clean {
        reconciler.clean_corrupted(Some(origin.as_str())).await?;
        reconciler.clean_orphaned(Some(origin.as_str())).await?;
    }
    if args.clean_orphans {
        reconciler.clean_orphaned(None).await?;
    }
    if args.clean_corrupt {
        reconciler.clean_corrupted(None).await?;
    }
    Ok(())
}
