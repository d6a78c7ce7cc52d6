use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use time::format_description::well_known::Rfc3339;
use time::macros::datetime;
use time::Duration;

use claim_engine::clock::SteppingClock;
use claim_engine::domain::{ClaimStatus, UserRole};
use claim_engine::events::Action;
use claim_engine::history::{sort_history, HistoryOrder};
use claim_engine::transitions::available_actions;
use claim_runtime::config::SessionConfig;
use claim_runtime::script::{load_script, sample_script, ScriptStep};
use claim_runtime::session::ClaimSession;
use claim_runtime::snapshot_codec::encode_snapshot_pretty;

#[derive(Parser)]
#[command(name = "claim-demo", version, about = "Replay and drive an insurance claim review")]
struct Cli {
    /// Session configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the snapshot replayed to a script step as JSON
    Replay {
        /// Script file (JSON); the bundled demo script if omitted
        #[arg(long)]
        script: Option<PathBuf>,
        /// Step index; negative gives a blank claim, past the end clamps
        #[arg(long, allow_hyphen_values = true)]
        step: i64,
        /// History order in the output
        #[arg(long, value_enum, default_value = "asc")]
        order: OrderArg,
    },
    /// Print the canonical hash of the snapshot replayed to a script step
    Hash {
        #[arg(long)]
        script: Option<PathBuf>,
        #[arg(long, allow_hyphen_values = true)]
        step: i64,
    },
    /// List actions a role may take in a status
    Actions {
        /// Status label, e.g. "Pending Adjuster Review"
        #[arg(long, value_parser = parse_status)]
        status: ClaimStatus,
        /// agent, adjuster, or repairShop
        #[arg(long, value_parser = parse_role)]
        role: UserRole,
    },
    /// Replay the demo script, then drive the claim to closure
    Walkthrough,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for HistoryOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Asc => HistoryOrder::Ascending,
            OrderArg::Desc => HistoryOrder::Descending,
        }
    }
}

fn parse_status(s: &str) -> Result<ClaimStatus, String> {
    ClaimStatus::from_label(s).ok_or_else(|| format!("unknown status {s:?}"))
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    UserRole::from_key(s).ok_or_else(|| format!("unknown role {s:?} (agent, adjuster, repairShop)"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Replay { script, step, order } => {
            let steps = load_steps(script.as_deref())?;
            let mut session = ClaimSession::new(config);
            let mut snapshot = session.navigate(&steps, step).clone();
            sort_history(&mut snapshot.history, order.into());
            println!("{}", encode_snapshot_pretty(&snapshot)?);
        }
        Command::Hash { script, step } => {
            let steps = load_steps(script.as_deref())?;
            let mut session = ClaimSession::new(config);
            session.navigate(&steps, step);
            println!("{}", session.current_hash()?);
        }
        Command::Actions { status, role } => {
            for action in available_actions(status, role) {
                println!("{action}");
            }
        }
        Command::Walkthrough => walkthrough(config)?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SessionConfig::from_toml_str(&source)
        .with_context(|| format!("parsing config {}", path.display()))
}

fn load_steps(path: Option<&Path>) -> anyhow::Result<Vec<ScriptStep>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display()))?;
            load_script(&json).with_context(|| format!("parsing script {}", path.display()))
        }
        None => Ok(sample_script()?),
    }
}

fn walkthrough(config: SessionConfig) -> anyhow::Result<()> {
    let steps = sample_script()?;
    let clock = SteppingClock::new(datetime!(2025-07-20 23:00 UTC), Duration::minutes(5));
    let mut session = ClaimSession::with_clock(config, Box::new(clock));

    let last = i64::try_from(steps.len()).context("script too long")? - 1;
    session.navigate(&steps, last);
    session.set_active_role(UserRole::Agent);
    println!("replayed: {}", session.snapshot().status);

    let plan = [
        (Action::ForwardToAdjuster, "Please review the AI estimate."),
        (Action::ApproveEstimate, "Estimate consistent with photos."),
        (Action::RouteToShop, ""),
        (Action::AcceptJob, ""),
        (Action::CompleteRepair, "Bumper replaced and refinished."),
        (Action::CloseClaim, ""),
    ];
    for (action, note) in plan {
        let role = session.active_role();
        let status = session
            .act(action, note)
            .with_context(|| format!("{action} as {role}"))?
            .status;
        println!("{role} {action}: {status} [{}]", status.stage());
    }

    println!();
    for event in session.history(HistoryOrder::Descending) {
        let at = event.timestamp.format(&Rfc3339)?;
        println!("{at}  {}  ({})", event.action, event.user);
    }
    Ok(())
}
