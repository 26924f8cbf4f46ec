use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tagsession::{SessionController, SessionError};
use tagsession_demo::present::{SectionTitle, sensitive_data_warning, warning};
use tagsession_demo::{
    ConsolePresenter, Credentials, Presenter, SimCommandSet, SimReader, run_initialize, run_select,
};

#[derive(Parser)]
#[command(version, about = "Demo application exercising a Keycard-style tag session")]
struct Cli {
    /// Trace level output
    #[arg(short, long)]
    verbose: bool,

    /// Pretend the platform has no contactless radio
    #[arg(long)]
    no_radio: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the card applet and show its status
    Select,

    /// Initialize a card with PIN, PUK and pairing password
    Init {
        /// Optional PIN (6 digits, default is random)
        #[arg(long)]
        pin: Option<String>,

        /// Optional PUK (12 digits, default is random)
        #[arg(long)]
        puk: Option<String>,

        /// Optional pairing password (default is random)
        #[arg(long)]
        pairing_password: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let reader = if cli.no_radio {
        SimReader::unsupported()
    } else {
        SimReader::with_card()
    };
    let controller = Arc::new(SessionController::new(reader));
    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter);

    // Availability is checked once before any action is offered.
    if !controller.is_available() {
        presenter.present(&warning(&format!(
            "{}. The functionality is disabled.",
            SessionError::Unavailable
        )));
        return Ok(());
    }

    let done = match cli.command {
        Commands::Select => run_select(&controller, SimCommandSet::new(), Arc::downgrade(&presenter)),
        Commands::Init {
            pin,
            puk,
            pairing_password,
        } => {
            // Fill in anything the user did not provide with random values.
            let generated = Credentials::generate();
            let pin = pin.unwrap_or_else(|| generated.pin().to_string());
            let puk = puk.unwrap_or_else(|| generated.puk().to_string());
            let pairing_password =
                pairing_password.unwrap_or_else(|| generated.pairing_pass().to_string());
            let credentials = Credentials::new(&pin, &puk, &pairing_password)?;

            println!("{}", SectionTitle("Credentials"));
            println!("{}", sensitive_data_warning());
            println!("{}", credentials.memo());

            run_initialize(
                &controller,
                SimCommandSet::new(),
                credentials,
                Arc::downgrade(&presenter),
            )
        }
    };

    done.recv_timeout(Duration::from_secs(60))
        .context("session did not complete")?;
    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .init();
}
