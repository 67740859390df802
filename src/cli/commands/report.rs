use chrono::Datelike;

use crate::cli::core::{format_amount, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::ledger::{month_key, month_name, year_key};

use super::print_balance;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("years", "List years that hold operations", "years", cmd_years),
        CommandEntry::new(
            "stats",
            "Daily totals for a month (current month by default)",
            "stats [<year> <month>]",
            cmd_stats,
        ),
        CommandEntry::new(
            "summary",
            "Spending versus earning for the current month",
            "summary",
            cmd_summary,
        ),
    ]
}

fn cmd_years(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Years");
    for year in context.manager.list_years() {
        output::info(format!("  {year}"));
    }
    Ok(())
}

fn cmd_stats(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (year, month) = match args {
        [] => {
            let today = context.manager.today();
            (format!("{:04}", today.year()), format!("{:02}", today.month()))
        }
        [year, month] => (year_key(year)?, month_key(month)?),
        _ => return Err(context.usage_error("stats")),
    };
    let totals = context.manager.monthly_daily_totals(&year, &month)?;
    let title = format!("{} {year}", month_name(&month).unwrap_or(month.as_str()));

    output::section(format!("Daily totals: {title}"));
    if totals.is_empty() {
        output::info(format!("No operations in {title}."));
        return Ok(());
    }

    let mut table = Table::new(vec![TableColumn::right("Day"), TableColumn::right("Total")]);
    for (day, total) in &totals {
        table.push_row(vec![day.clone(), format_amount(*total)]);
    }
    output::info(table.render());
    output::info(format!(
        "Month total: {}",
        format_amount(totals.values().sum::<f64>())
    ));
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Current month");
    let split = context.manager.current_month_split();
    match (split.spending_share(), split.earning_share()) {
        (Some(spending_share), Some(earning_share)) => {
            let mut table = Table::new(vec![
                TableColumn::left("Kind"),
                TableColumn::right("Amount"),
                TableColumn::right("Share"),
            ]);
            table.push_row(vec![
                "Spending".into(),
                format_amount(split.spending),
                format!("{spending_share:.1}%"),
            ]);
            table.push_row(vec![
                "Earning".into(),
                format_amount(split.earning),
                format!("{earning_share:.1}%"),
            ]);
            output::info(table.render());
        }
        _ => output::info("No data for current month"),
    }
    print_balance(context);
    Ok(())
}
