//! Text output for the CLI.

use std::collections::HashMap;

use kpiboard_core::{AuditEntry, Fill, Indicator, IndicatorId, Sector, User, YearMonth};
use kpiboard_progress::{
    Evaluator, HistoryGrid, IndicatorSummary, Outcome, ProgressSnapshot, Schedule,
};

pub fn sectors(sectors: &[Sector]) {
    println!("Sectors ({})", sectors.len());
    for sector in sectors {
        let state = if sector.active { "" } else { " (inactive)" };
        println!("  {} | {}{}", sector.id, sector.name, state);
    }
}

pub fn users(users: &[User]) {
    println!("Users ({})", users.len());
    for user in users {
        println!(
            "  {} | {:?} | {} <{}> | {} sector(s), {} grant(s)",
            user.id,
            user.role,
            user.display_name(),
            user.email,
            user.sectors.len(),
            user.granted.len(),
        );
    }
}

pub fn indicators(indicators: &[Indicator], evaluator: &Evaluator) {
    println!("Indicators ({})", indicators.len());
    for ind in indicators {
        println!(
            "  {} | {} | {} | target {} | every {} month(s){}",
            ind.id,
            ind.name,
            ind.mode,
            evaluator.format_amount(Some(ind.target), ind.value_class),
            ind.step,
            if ind.active { "" } else { " (inactive)" },
        );
    }
}

pub fn indicator(ind: &Indicator, summary: &IndicatorSummary, evaluator: &Evaluator) {
    let schedule = Schedule::for_indicator(ind);
    println!("Indicator: {}", ind.id);
    println!("  Name: {}", ind.name);
    println!("  Mode: {}", ind.mode);
    println!("  Class: {}", ind.value_class.as_str());
    println!(
        "  Default target: {}",
        evaluator.format_amount(Some(ind.target), ind.value_class)
    );
    println!(
        "  Calendar: from {} every {} month(s){}",
        schedule.anchor(),
        schedule.step(),
        schedule.end().map(|e| format!(" until {e}")).unwrap_or_default(),
    );
    if !ind.extraction_notes.is_empty() {
        println!("  Notes: {}", ind.extraction_notes);
    }

    match &summary.current {
        Some(current) => println!(
            "  Current: {} {} (target {}, {}, {})",
            current.entry.month,
            evaluator.format_amount(current.entry.value, ind.value_class),
            evaluator.format_amount(current.entry.target, ind.value_class),
            current.entry.outcome.label(),
            evaluator.format_variance(current.entry.variance),
        ),
        None => println!("  Current: nothing reported"),
    }
    if !summary.missing.is_empty() {
        println!("  Missing: {}", months(&summary.missing));
    }
    if let Some(next) = summary.next_due {
        println!("  Next due: {next}");
    }

    if !summary.history.is_empty() {
        println!("  History:");
        for entry in summary.history.iter().rev() {
            println!(
                "    {} | {} | target {} | {}",
                entry.month,
                evaluator.format_amount(entry.value, ind.value_class),
                evaluator.format_amount(entry.target, ind.value_class),
                entry.outcome.label(),
            );
        }
    }
}

pub fn fills(fills: &[Fill], indicators: &HashMap<IndicatorId, Indicator>, evaluator: &Evaluator) {
    println!("Fills ({})", fills.len());
    for fill in fills {
        let Some(ind) = indicators.get(&fill.indicator_id) else {
            continue;
        };
        let comment = if fill.comment.is_empty() {
            String::new()
        } else {
            format!(" | {}", fill.comment)
        };
        println!(
            "  {:04}-{:02} | {} | {} | by {} at {}{}",
            fill.year,
            fill.month,
            ind.name,
            evaluator.format_amount(fill.realized(), ind.value_class),
            fill.author,
            fill.entered_at.format("%Y-%m-%d %H:%M"),
            comment,
        );
    }
}

pub fn due(ind: &Indicator, schedule: &Schedule, due: &[YearMonth], next: Option<YearMonth>) {
    println!(
        "{}: every {} month(s) from {}",
        ind.name,
        schedule.step(),
        schedule.anchor()
    );
    println!("  Due: {}", if due.is_empty() { "none".to_string() } else { months(due) });
    if let Some(next) = next {
        println!("  Next: {next}");
    }
}

pub fn snapshot(snapshot: &ProgressSnapshot, evaluator: &Evaluator) {
    println!("Status as of {}", snapshot.reference);
    println!(
        "  achieved: {} | not achieved: {} | monitoring: {} | no data: {}",
        snapshot.achieved, snapshot.not_achieved, snapshot.monitoring, snapshot.no_data
    );
    for summary in &snapshot.summaries {
        let (month, value) = match &summary.current {
            Some(c) => (
                c.entry.month.to_string(),
                evaluator.format_amount(c.entry.value, summary.value_class),
            ),
            None => ("-".to_string(), evaluator.config().format.placeholder.clone()),
        };
        let missing = if summary.missing.is_empty() {
            String::new()
        } else {
            format!(" | {} missing", summary.missing.len())
        };
        println!(
            "  {} {} | {} | {}{}",
            marker(summary.outcome()),
            summary.name,
            month,
            value,
            missing
        );
    }
}

pub fn history(grid: &HistoryGrid, evaluator: &Evaluator) {
    println!("History {} {} indicator(s)", months_bounds(grid), grid.rows.len());
    for row in &grid.rows {
        println!("  {} ({})", row.name, row.sector);
        for cell in &row.cells {
            println!(
                "    {}{} | {} | target {} | {}",
                cell.month,
                if cell.due { "" } else { " (not due)" },
                evaluator.format_amount(cell.value, row.value_class),
                evaluator.format_amount(cell.target, row.value_class),
                cell.outcome.label(),
            );
        }
    }
}

pub fn audit(entries: &[AuditEntry]) {
    for entry in entries {
        println!(
            "  {} | {} | {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.actor,
            entry.action
        );
    }
}

fn marker(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Achieved => "[+]",
        Outcome::NotAchieved => "[-]",
        Outcome::Monitoring { within_tolerance: true } => "[~]",
        Outcome::Monitoring { within_tolerance: false } => "[!]",
        Outcome::NoData => "[ ]",
    }
}

fn months(months: &[YearMonth]) -> String {
    months
        .iter()
        .map(YearMonth::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn months_bounds(grid: &HistoryGrid) -> String {
    match (grid.months.first(), grid.months.last()) {
        (Some(first), Some(last)) => format!("{first}..{last}:"),
        _ => "(empty window):".to_string(),
    }
}
