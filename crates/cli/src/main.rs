//! kpiboard CLI - monthly KPI tracking.

mod display;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use kpiboard_core::{
    AuditEntry, ComparisonMode, EvaluationConfig, Fill, FillFilter, Indicator, IndicatorId,
    MonthlyTarget, Role, Sector, SectorId, User, UserId, ValueClass, Visibility, YearMonth,
};
use kpiboard_progress::{
    build_history, require_number, summarize, sync_targets, visible_to, BasicProgressTracker,
    Evaluator, HistoryQuery, Ledger, ProgressTracker, Schedule, StatusFilter,
};
use kpiboard_storage::{JsonStorage, Storage};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kpiboard")]
#[command(about = "Monthly KPI tracking and goal evaluation", long_about = None)]
struct Cli {
    /// Store directory
    #[arg(long, global = true, default_value = ".kpiboard")]
    store: PathBuf,

    /// Evaluation config file (defaults to <store>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Acting user ID
    #[arg(long = "as", global = true)]
    acting: Option<UserId>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage sectors
    Sector {
        #[command(subcommand)]
        command: SectorCommand,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Manage indicators
    Indicator {
        #[command(subcommand)]
        command: IndicatorCommand,
    },
    /// Record a monthly value
    Fill {
        /// Indicator ID
        indicator: IndicatorId,
        /// Month (YYYY-MM)
        month: YearMonth,
        /// Realized value, e.g. 1.234,56; omit to record an empty fill
        value: Option<String>,
        /// Comment
        #[arg(long, default_value = "")]
        comment: String,
        /// Evidence link
        #[arg(long)]
        evidence: Option<String>,
    },
    /// List recorded fills
    Fills {
        /// Only this indicator
        #[arg(long)]
        indicator: Option<IndicatorId>,
        /// Only this year
        #[arg(long)]
        year: Option<i32>,
        /// Only this month number (1-12)
        #[arg(long)]
        month: Option<u32>,
        /// Only fills by this user
        #[arg(long)]
        author: Option<UserId>,
        /// Skip fills without a value
        #[arg(long)]
        only_filled: bool,
    },
    /// Manage monthly target overrides
    Target {
        #[command(subcommand)]
        command: TargetCommand,
    },
    /// Align target overrides with indicator calendars
    Targets {
        #[command(subcommand)]
        command: TargetsCommand,
    },
    /// List due months of an indicator
    Due {
        /// Indicator ID
        indicator: IndicatorId,
        /// First month (defaults to the anchor)
        #[arg(long)]
        from: Option<YearMonth>,
        /// Last month (defaults to the current month)
        #[arg(long)]
        to: Option<YearMonth>,
    },
    /// Show the current status of every visible indicator
    Status {
        /// Last month expected to be reported (defaults to last month)
        #[arg(long)]
        reference: Option<YearMonth>,
    },
    /// Show a month-by-month history grid
    History {
        /// First month
        #[arg(long)]
        from: YearMonth,
        /// Last month
        #[arg(long)]
        to: YearMonth,
        /// Restrict to a sector
        #[arg(long)]
        sector: Option<SectorId>,
        /// Restrict to an indicator
        #[arg(long)]
        indicator: Option<IndicatorId>,
        /// all | achieved | not-achieved
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show the audit trail
    Log {
        /// Only the most recent entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Format a number the way reports show it
    Format {
        /// Raw value
        value: String,
        /// numeric | monetary | percentage
        #[arg(long, default_value = "numeric")]
        class: String,
    },
}

#[derive(Subcommand)]
enum SectorCommand {
    /// Add a sector
    Add {
        /// Sector name
        name: String,
    },
    /// List sectors
    List,
}

#[derive(Subcommand)]
enum UserCommand {
    /// Add a user
    Add {
        /// Display name
        name: String,
        /// E-mail
        #[arg(long)]
        email: String,
        /// master | manager
        #[arg(long, default_value = "manager")]
        role: Role,
        /// Sector memberships
        #[arg(long = "sector")]
        sectors: Vec<SectorId>,
        /// Indicators granted individually
        #[arg(long = "grant")]
        granted: Vec<IndicatorId>,
    },
    /// List users
    List,
}

#[derive(Subcommand)]
enum IndicatorCommand {
    /// Add an indicator
    Add {
        /// Indicator name
        name: String,
        /// Owning sector
        #[arg(long)]
        sector: SectorId,
        /// Default monthly target
        #[arg(long)]
        target: String,
        /// increasing | decreasing | monitoring
        #[arg(long, default_value = "increasing")]
        mode: ComparisonMode,
        /// numeric | monetary | percentage
        #[arg(long, default_value = "numeric")]
        class: String,
        /// First reporting month (YYYY-MM)
        #[arg(long)]
        anchor: Option<YearMonth>,
        /// Months between reports
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        step: i64,
        /// Final reporting month (YYYY-MM)
        #[arg(long)]
        end: Option<YearMonth>,
        /// Visible only to its sector and granted users
        #[arg(long)]
        restricted: bool,
        /// How the value is extracted
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List indicators visible to the acting user
    List,
    /// Show an indicator with its history
    Show {
        /// Indicator ID
        id: IndicatorId,
    },
}

#[derive(Subcommand)]
enum TargetCommand {
    /// Override the target of one month
    Set {
        /// Indicator ID
        indicator: IndicatorId,
        /// Month (YYYY-MM)
        month: YearMonth,
        /// Target value
        value: String,
    },
}

#[derive(Subcommand)]
enum TargetsCommand {
    /// Create missing overrides (and drop ones after a final month)
    Sync {
        /// Only this indicator
        indicator: Option<IndicatorId>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.store.join("config.json"));
    let config = EvaluationConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let evaluator = Evaluator::new(config);

    let mut storage = JsonStorage::new(&cli.store).await?;
    let actor = match cli.acting {
        Some(id) => Some(
            storage
                .load_user(id)
                .await?
                .ok_or_else(|| anyhow!("unknown user: {id}"))?,
        ),
        None => None,
    };
    let this_month = YearMonth::of(&chrono::Local::now().date_naive());

    match cli.command {
        Commands::Sector { command } => match command {
            SectorCommand::Add { name } => {
                let sector = Sector::new(name.trim());
                if sector.name.is_empty() {
                    bail!("sector name is empty");
                }
                storage.save_sector(&sector).await?;
                audit(&mut storage, actor.as_ref(), format!("added sector {}", sector.name)).await?;
                println!("Added sector: {} - {}", sector.id, sector.name);
            }
            SectorCommand::List => {
                let sectors = storage.list_sectors().await?;
                if cli.json {
                    return print_json(&sectors);
                }
                display::sectors(&sectors);
            }
        },

        Commands::User { command } => match command {
            UserCommand::Add { name, email, role, sectors, granted } => {
                let mut user = User::new(name, email, role);
                user.sectors = sectors;
                user.granted = granted;
                storage.save_user(&user).await?;
                audit(&mut storage, actor.as_ref(), format!("added user {}", user.display_name())).await?;
                println!("Added user: {} - {}", user.id, user.display_name());
            }
            UserCommand::List => {
                let users = storage.list_users().await?;
                if cli.json {
                    return print_json(&users);
                }
                display::users(&users);
            }
        },

        Commands::Indicator { command } => match command {
            IndicatorCommand::Add {
                name,
                sector,
                target,
                mode,
                class,
                anchor,
                step,
                end,
                restricted,
                notes,
            } => {
                if storage.load_sector(sector).await?.is_none() {
                    bail!("unknown sector: {sector}");
                }
                let target = require_number("target", &target)?;
                let mut indicator = Indicator::new(name.trim(), sector, target, mode)
                    .with_value_class(ValueClass::resolve(&class));
                indicator.step = kpiboard_progress::normalize_step(Some(step));
                indicator.anchor = anchor;
                indicator.end = end;
                indicator.extraction_notes = notes;
                if restricted {
                    indicator = indicator.with_visibility(Visibility::SectorRestricted);
                }
                indicator.validate()?;

                storage.save_indicator(&indicator).await?;
                sync_targets(&mut storage, &indicator, this_month).await?;
                audit(&mut storage, actor.as_ref(), format!("added indicator {}", indicator.name)).await?;
                println!("Added indicator: {} - {}", indicator.id, indicator.name);
            }
            IndicatorCommand::List => {
                let indicators: Vec<_> = storage
                    .list_indicators()
                    .await?
                    .into_iter()
                    .filter(|i| visible_to(actor.as_ref(), i))
                    .collect();
                if cli.json {
                    return print_json(&indicators);
                }
                display::indicators(&indicators, &evaluator);
            }
            IndicatorCommand::Show { id } => {
                let ledger = Ledger::load(&storage).await?;
                let Some(indicator) = ledger.indicator(id) else {
                    bail!("indicator not found: {id}");
                };
                if !visible_to(actor.as_ref(), indicator) {
                    bail!("indicator not visible to this user: {id}");
                }
                let summary = summarize(indicator, &ledger, &evaluator, this_month.add_months(-1));
                if cli.json {
                    return print_json(&summary);
                }
                display::indicator(indicator, &summary, &evaluator);
            }
        },

        Commands::Fill { indicator, month, value, comment, evidence } => {
            let Some(ind) = storage.load_indicator(indicator).await? else {
                bail!("indicator not found: {indicator}");
            };
            let author = actor
                .as_ref()
                .map(|u| u.id)
                .ok_or_else(|| anyhow!("--as <user> is required to record a fill"))?;
            let value = value
                .as_deref()
                .map(|raw| require_number("value", raw))
                .transpose()?;

            if !Schedule::for_indicator(&ind).is_due(month) {
                warn!(indicator = %ind.id, %month, "month is not due for this indicator");
            }

            let mut fill = Fill::new(ind.id, month, value, author).with_comment(comment);
            if let Some(link) = evidence {
                fill = fill.with_evidence(link);
            }
            fill.validate()?;
            storage.save_fill(&fill).await?;
            audit(
                &mut storage,
                actor.as_ref(),
                format!("filled {} for {}", ind.name, month),
            )
            .await?;
            println!(
                "Recorded {} for {}: {}",
                month,
                ind.name,
                evaluator.format_amount(fill.realized(), ind.value_class)
            );
        }

        Commands::Fills { indicator, year, month, author, only_filled } => {
            if let Some(m) = month.filter(|m| !(1..=12).contains(m)) {
                bail!("--month must be between 1 and 12, got {m}");
            }
            let filter = FillFilter { indicator, year, month, author, only_filled };
            let indicators: HashMap<IndicatorId, Indicator> = storage
                .list_indicators()
                .await?
                .into_iter()
                .filter(|i| visible_to(actor.as_ref(), i))
                .map(|i| (i.id, i))
                .collect();
            let fills: Vec<Fill> = storage
                .list_fills(&filter)
                .await?
                .into_iter()
                .filter(|f| indicators.contains_key(&f.indicator_id))
                .collect();
            if cli.json {
                return print_json(&fills);
            }
            display::fills(&fills, &indicators, &evaluator);
        }

        Commands::Target { command } => match command {
            TargetCommand::Set { indicator, month, value } => {
                let Some(ind) = storage.load_indicator(indicator).await? else {
                    bail!("indicator not found: {indicator}");
                };
                let target = MonthlyTarget::new(ind.id, month, require_number("target", &value)?);
                storage.save_target(&target).await?;
                audit(
                    &mut storage,
                    actor.as_ref(),
                    format!("set target of {} for {}", ind.name, month),
                )
                .await?;
                println!(
                    "Target of {} for {}: {}",
                    ind.name,
                    month,
                    evaluator.format_amount(Some(target.value), ind.value_class)
                );
            }
        },

        Commands::Targets { command } => match command {
            TargetsCommand::Sync { indicator } => {
                let indicators = match indicator {
                    Some(id) => vec![storage
                        .load_indicator(id)
                        .await?
                        .ok_or_else(|| anyhow!("indicator not found: {id}"))?],
                    None => storage.list_indicators().await?,
                };

                let (mut created, mut removed) = (0, 0);
                for ind in &indicators {
                    let plan = sync_targets(&mut storage, ind, this_month).await?;
                    created += plan.create.len();
                    removed += plan.remove.len();
                }
                if created + removed > 0 {
                    audit(
                        &mut storage,
                        actor.as_ref(),
                        format!("synced targets: {created} created, {removed} removed"),
                    )
                    .await?;
                }
                info!(indicators = indicators.len(), created, removed, "targets synced");
                println!("Targets synced: {created} created, {removed} removed");
            }
        },

        Commands::Due { indicator, from, to } => {
            let Some(ind) = storage.load_indicator(indicator).await? else {
                bail!("indicator not found: {indicator}");
            };
            let schedule = Schedule::for_indicator(&ind);
            let from = from.unwrap_or(schedule.anchor());
            let to = to.unwrap_or(this_month);
            let months = schedule.due_months(from, to);
            if cli.json {
                return print_json(&months);
            }
            display::due(&ind, &schedule, &months, schedule.next_due(to));
        }

        Commands::Status { reference } => {
            let reference = reference.unwrap_or(this_month.add_months(-1));
            let tracker = BasicProgressTracker::new(Arc::new(storage))
                .with_evaluator(evaluator.clone())
                .with_reference(reference);
            let snapshot = tracker.snapshot(actor.as_ref()).await?;
            if cli.json {
                return print_json(&snapshot);
            }
            display::snapshot(&snapshot, &evaluator);
        }

        Commands::History { from, to, sector, indicator, status } => {
            if from > to {
                bail!("--from {from} is after --to {to}");
            }
            let ledger = Ledger::load(&storage).await?;
            let sectors = storage.list_sectors().await?;
            let query = HistoryQuery { from, to, sector, indicator, status };
            let grid = build_history(&ledger, &sectors, actor.as_ref(), &query, &evaluator);
            if cli.json {
                return print_json(&grid);
            }
            display::history(&grid, &evaluator);
        }

        Commands::Log { limit } => {
            let mut entries = storage.list_audit().await?;
            if let Some(limit) = limit {
                let skip = entries.len().saturating_sub(limit);
                entries = entries.split_off(skip);
            }
            if cli.json {
                return print_json(&entries);
            }
            display::audit(&entries);
        }

        Commands::Format { value, class } => {
            println!("{}", evaluator.format_value(&value, ValueClass::resolve(&class)));
        }
    }

    Ok(())
}

async fn audit(storage: &mut JsonStorage, actor: Option<&User>, action: String) -> Result<()> {
    let entry = match actor {
        Some(user) => AuditEntry::new(user.display_name(), action),
        None => AuditEntry::system(action),
    };
    storage.append_audit(&entry).await?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_history() {
        let cli = Cli::try_parse_from([
            "kpiboard",
            "history",
            "--from",
            "2024-01",
            "--to",
            "2024-06",
            "--status",
            "nao-atingidos",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::History { from, to, status, .. } => {
                assert_eq!(from, YearMonth::new(2024, 1).unwrap());
                assert_eq!(to, YearMonth::new(2024, 6).unwrap());
                assert_eq!(status, StatusFilter::NotAchieved);
            }
            _ => panic!("expected history"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_month() {
        assert!(Cli::try_parse_from(["kpiboard", "due", "01ARZ3NDEKTSV4RRFFQ69G5FAV", "--to", "2024-13"]).is_err());
    }

    #[test]
    fn test_cli_parses_fill_filters() {
        let cli = Cli::try_parse_from([
            "kpiboard",
            "fills",
            "--year",
            "2024",
            "--month",
            "3",
            "--only-filled",
        ])
        .unwrap();
        match cli.command {
            Commands::Fills { year, month, only_filled, indicator, author } => {
                assert_eq!(year, Some(2024));
                assert_eq!(month, Some(3));
                assert!(only_filled);
                assert!(indicator.is_none() && author.is_none());
            }
            _ => panic!("expected fills"),
        }
    }
}
