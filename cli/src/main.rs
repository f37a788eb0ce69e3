use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use patungan::config::PatunganConfig;
use patungan::host::TerminalHost;
use patungan::receipt;
use patungan::split::{BillState, MAX_PARTICIPANTS, MIN_PARTICIPANTS};
use patungan::ui::{run_app, App};
use ratatui::{backend::CrosstermBackend, Terminal};
use rust_decimal::Decimal;
use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "patungan")]
#[command(about = "Split a bill equally or by hand", long_about = None)]
struct Args {
    /// Config file [default: ~/.patungan/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bill total in rupiah, e.g. 150000 or 150.000
    #[arg(short, long)]
    bill: Option<String>,

    /// Number of people (1-20)
    #[arg(short, long)]
    people: Option<usize>,

    /// Participant name, in order (repeatable)
    #[arg(short, long = "name")]
    names: Vec<String>,

    /// Manual amount in plain digits without thousands separators, e.g. 50000
    /// (repeatable, in order); switches to manual split
    #[arg(short, long = "amount")]
    amounts: Vec<String>,

    /// Print the breakdown to stdout and exit without starting the TUI
    #[arg(long)]
    print: bool,

    /// With --print, emit the breakdown as JSON
    #[arg(long, requires = "print")]
    json: bool,
}

fn cleanup_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match open_log_file() {
        Some((path, file)) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %path.display(), "Logging initialized");
        }
        // Without a log file, drop logs rather than draw over the TUI.
        None => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn open_log_file() -> Option<(PathBuf, fs::File)> {
    let mut candidates = Vec::new();
    if let Some(dir) = PatunganConfig::path().as_deref().and_then(|p| p.parent()) {
        candidates.push(dir.join("logs").join("patungan.log"));
    }
    candidates.push(PathBuf::from(".patungan").join("logs").join("patungan.log"));

    candidates.into_iter().find_map(|path| {
        let parent = path.parent()?;
        fs::create_dir_all(parent).ok()?;
        let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;
        Some((path, file))
    })
}

fn load_config(args: &Args) -> Result<PatunganConfig> {
    Ok(match &args.config {
        Some(path) => PatunganConfig::load_from(path)?,
        None => PatunganConfig::load()?.unwrap_or_default(),
    })
}

/// Starting bill from config defaults overlaid with command-line values.
fn initial_state(args: &Args, config: &PatunganConfig) -> Result<BillState> {
    let mut bill = BillState::new();

    if let Some(n) = config.initial_people() {
        if !bill.set_participant_count(n) {
            tracing::warn!(people = n, "ignoring out-of-range [session] people");
        }
    }
    bill.set_show_names(config.show_names() || !args.names.is_empty());

    if let Some(raw) = &args.bill {
        if !bill.set_bill_amount(raw) {
            bail!("invalid bill amount {:?}: use whole rupiah digits", raw);
        }
    }

    let listed = args.names.len().max(args.amounts.len());
    let people = args.people.or((listed > bill.participant_count()).then_some(listed));
    if let Some(n) = people {
        if !bill.set_participant_count(n) {
            bail!(
                "people must be between {} and {}, got {}",
                MIN_PARTICIPANTS,
                MAX_PARTICIPANTS,
                n
            );
        }
    }

    let ids: Vec<_> = bill.participants().iter().map(|p| p.id()).collect();
    for (id, name) in ids.iter().zip(&args.names) {
        bill.set_participant_name(*id, name.as_str());
    }
    if !args.amounts.is_empty() {
        bill.toggle_split_mode(true);
        for (id, amount) in ids.iter().zip(&args.amounts) {
            check_amount(amount)?;
            bill.set_participant_amount(*id, amount.as_str());
        }
    }

    Ok(bill)
}

/// Reject command-line amounts the breakdown would read as zero, such as
/// `50,000` or `-5`.
fn check_amount(raw: &str) -> Result<()> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(());
    }
    match Decimal::from_str(text) {
        Ok(amount) if !amount.is_sign_negative() => Ok(()),
        _ => bail!(
            "invalid amount {:?}: use plain digits without separators, e.g. 50000",
            raw
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = load_config(&args)?;
    let bill = initial_state(&args, &config)?;

    // One-shot mode - render the breakdown and exit
    if args.print {
        let breakdown = bill.compute_breakdown();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
        } else {
            print!("{}", receipt::printable(&breakdown, &chrono::Local::now()));
        }
        return Ok(());
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let app = App::new(TerminalHost::from_config(&config), bill);
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    cleanup_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "event loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
