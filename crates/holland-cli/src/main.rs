use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use holland_core::{
    ExecutorSettings, PlannerKind, PlayerId, RefereeCommand, RefereeMsg, TeamColor,
};
use holland_executor::{Executor, TickOutput};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::mock_vision::MockVision;

mod mock_vision;

/// Ticks spent in Stop before the chosen referee command is sent.
const STOP_TICKS: u64 = 60;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlannerArg {
    Global,
    Local,
}

impl From<PlannerArg> for PlannerKind {
    fn from(arg: PlannerArg) -> Self {
        match arg {
            PlannerArg::Global => PlannerKind::Global,
            PlannerArg::Local => PlannerKind::Local,
        }
    }
}

/// Referee command played against the mock field after the initial Stop.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum RefereeArg {
    ForceStart,
    OurKickoff,
    TheirKickoff,
    OurPenalty,
    TheirPenalty,
    OurFreeKick,
    TheirFreeKick,
}

impl RefereeArg {
    fn command(self, own: TeamColor) -> RefereeCommand {
        let opp = own.opposite();
        match self {
            RefereeArg::ForceStart => RefereeCommand::ForceStart,
            RefereeArg::OurKickoff => RefereeCommand::PrepareKickoff(own),
            RefereeArg::TheirKickoff => RefereeCommand::PrepareKickoff(opp),
            RefereeArg::OurPenalty => RefereeCommand::PreparePenalty(own),
            RefereeArg::TheirPenalty => RefereeCommand::PreparePenalty(opp),
            RefereeArg::OurFreeKick => RefereeCommand::DirectFree(own),
            RefereeArg::TheirFreeKick => RefereeCommand::DirectFree(opp),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "holland")]
struct Args {
    #[clap(long, short = 'f', default_value = "holland-settings.json")]
    settings: PathBuf,

    #[clap(long, default_value = "info")]
    log_level: String,

    #[clap(long, default_value = "auto")]
    log_file: String,

    /// Comma separated ids of the robots we control.
    #[clap(long, default_value = "0,1,2,3,4,5")]
    robot_ids: String,

    /// Keeper id. Defaults to the one the referee names.
    #[clap(long)]
    goalie: Option<u32>,

    /// Override the team color from the settings file.
    #[clap(long)]
    blue: Option<bool>,

    /// Number of ticks to run, 0 to run until Ctrl-C.
    #[clap(long, default_value = "0")]
    ticks: u64,

    #[clap(long)]
    planner: Option<PlannerArg>,

    #[clap(long, default_value = "force-start")]
    referee: RefereeArg,

    #[clap(long, default_value = "42")]
    seed: u64,
}

fn parse_robot_ids(ids: &str) -> Result<Vec<PlayerId>> {
    let mut parsed = Vec::new();
    for part in ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let id: u32 = part
            .parse()
            .with_context(|| format!("Invalid robot id: {}", part))?;
        let id = PlayerId::new(id);
        if !id.is_valid() {
            bail!("Robot id out of range: {}", id);
        }
        parsed.push(id);
    }
    if parsed.is_empty() {
        bail!("No robot ids given");
    }
    Ok(parsed)
}

fn log_file_path(arg: &str) -> Result<PathBuf> {
    if arg != "auto" {
        let path = PathBuf::from(arg);
        if path.exists() {
            bail!("Log file already exists: {}", path.display());
        }
        return Ok(path);
    }
    let time = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let filename = format!("holland-{time}.log");
    let path = dirs::data_local_dir()
        .map(|p| p.join("holland").join(&filename))
        .unwrap_or_else(|| PathBuf::from(&filename));
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }
    Ok(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up log file
    let log_file_path = log_file_path(&args.log_file)?;
    let (Some(log_dir), Some(log_name)) = (log_file_path.parent(), log_file_path.file_name())
    else {
        bail!("Invalid log file path: {}", log_file_path.display());
    };
    let appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(appender);

    // Set up tracing. Records from the `log` macros are bridged in by `try_init`.
    let log_level = tracing::Level::from_str(&args.log_level)
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", args.log_level))?;
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    let stdout_layer = fmt::layer().without_time();
    let logfile_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(non_blocking_appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(logfile_layer)
        .try_init()
        .context("Unable to set global tracing subscriber")?;

    tracing::info!("Saving logs to {}", log_file_path.display());

    let mut settings = ExecutorSettings::load_or_insert(&args.settings)?;
    if let Some(blue) = args.blue {
        settings.tracker_settings.is_blue = blue;
    }
    let own_color = if settings.tracker_settings.is_blue {
        TeamColor::Blue
    } else {
        TeamColor::Yellow
    };
    let robot_ids = parse_robot_ids(&args.robot_ids)?;
    tracing::info!(
        "Controlling {} robots as {}: {:?}",
        robot_ids.len(),
        own_color,
        robot_ids
    );

    let mut executor = Executor::new(&settings, robot_ids.clone());
    if let Some(goalie) = args.goalie {
        executor.set_goalie(Some(PlayerId::new(goalie)));
    }
    if let Some(planner) = args.planner {
        executor.set_planner(planner.into());
    }

    let mut vision = MockVision::new(own_color, &robot_ids, args.seed)?;
    executor.update_geometry(vision.geometry());
    executor.update_from_referee(&RefereeMsg::new(RefereeCommand::Stop));

    let dt = settings.tracker_settings.tick_interval;
    let mut interval = tokio::time::interval(Duration::from_secs_f64(dt));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut commands = Vec::new();
    let mut tick: u64 = 0;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
            _ = interval.tick() => {
                vision.step(&commands, dt);
                executor.update_from_vision(&vision.frame());
                if tick == STOP_TICKS {
                    let command = args.referee.command(own_color);
                    tracing::info!("Referee: {:?}", command);
                    executor.update_from_referee(&RefereeMsg::new(command));
                }

                commands = match executor.tick() {
                    TickOutput::Commands(commands) => commands,
                    TickOutput::StopAll => Vec::new(),
                };
                if tick % 60 == 0 {
                    let situation = executor
                        .controller()
                        .situation()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "none".to_string());
                    tracing::info!(
                        "tick {} state {} situation {}",
                        tick,
                        executor.world().game_state.game_state,
                        situation
                    );
                    for (id, assignment) in executor.controller().assignments() {
                        tracing::debug!("  robot {} -> {}", id, assignment.mode);
                    }
                }

                tick += 1;
                if args.ticks > 0 && tick >= args.ticks {
                    tracing::info!("Ran {} ticks", tick);
                    break;
                }
            }
        }
    }

    Ok(())
}
