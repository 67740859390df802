use crate::cli::core::{
    format_amount, looks_like_date, parse_amount_arg, parse_index, short_id, CommandError,
    CommandResult, ShellContext,
};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::errors::LedgerError;
use crate::ledger::{DatePath, OperationEntry, OperationFilter};

use super::print_balance;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Record an operation (negative amounts are spending)",
            "add <date|today> <amount> [category]",
            cmd_add,
        ),
        CommandEntry::new(
            "edit",
            "Change the amount and category of an operation",
            "edit <id> <amount> [category] | edit <date> <index> <amount> [category]",
            cmd_edit,
        ),
        CommandEntry::new(
            "delete",
            "Remove an operation",
            "delete <id> | delete <date> <index>",
            cmd_delete,
        ),
        CommandEntry::new(
            "history",
            "List operations, optionally filtered by date",
            "history [year=<YYYY>] [month=<MM|name>] [day=<DD>]",
            cmd_history,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (date, amount, category) = match args {
        [date, amount] => (*date, *amount, None),
        [date, amount, category] => (*date, *amount, Some(*category)),
        _ => return Err(context.usage_error("add")),
    };
    let date = context.parse_date(date)?;
    let value = parse_amount_arg(amount)?;
    let category = category
        .map(str::to_string)
        .unwrap_or_else(|| context.config.default_category.clone());

    let id = context.manager.add_operation(&date, value, &category)?;
    output::success(format!(
        "Added {} ({category}) on {} [{}]",
        format_amount(value),
        slash_date(&date),
        short_id(id)
    ));
    print_balance(context);
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (previous, category, value) = match args {
        [date, index, amount, rest @ ..] if rest.len() <= 1 && looks_like_date(date) => {
            let date = context.parse_date(date)?;
            let index = parse_index(index)?;
            let value = parse_amount_arg(amount)?;
            let category = match rest.first() {
                Some(category) => category.to_string(),
                None => current_category(context, &date, index)?,
            };
            let operation = context
                .manager
                .update_operation(&date, index, value, &category)?;
            (
                OperationEntry {
                    date,
                    index,
                    operation,
                },
                category,
                value,
            )
        }
        [reference, amount, rest @ ..] if rest.len() <= 1 && !looks_like_date(reference) => {
            let id = context.manager.resolve_id(reference)?;
            let value = parse_amount_arg(amount)?;
            let category = match rest.first() {
                Some(category) => category.to_string(),
                None => context
                    .manager
                    .find(id)
                    .map(|entry| entry.operation.category)
                    .ok_or(LedgerError::OperationNotFound(id))?,
            };
            let previous = context
                .manager
                .update_operation_by_id(id, value, &category)?;
            (previous, category, value)
        }
        _ => return Err(context.usage_error("edit")),
    };

    output::success(format!(
        "Updated {} #{}: {} ({}) -> {} ({category})",
        slash_date(&previous.date),
        previous.index,
        format_amount(previous.operation.value),
        previous.operation.category,
        format_amount(value),
    ));
    print_balance(context);
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let removed = match args {
        [date, index] if looks_like_date(date) => {
            let date = context.parse_date(date)?;
            let index = parse_index(index)?;
            let operation = context.manager.delete_operation(&date, index)?;
            OperationEntry {
                date,
                index,
                operation,
            }
        }
        [reference] if !looks_like_date(reference) => {
            let id = context.manager.resolve_id(reference)?;
            context.manager.delete_operation_by_id(id)?
        }
        _ => return Err(context.usage_error("delete")),
    };

    output::success(format!(
        "Deleted {} ({}) from {}",
        format_amount(removed.operation.value),
        removed.operation.category,
        slash_date(&removed.date)
    ));
    print_balance(context);
    Ok(())
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = parse_filter(args)?;
    let entries = context.manager.entries(&filter);

    output::section("History");
    output::info(&filter);
    if entries.is_empty() {
        output::info("No operations match.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Date"),
        TableColumn::right("#"),
        TableColumn::right("Amount"),
        TableColumn::left("Category"),
    ]);
    for entry in &entries {
        table.push_row(vec![
            short_id(entry.operation.id),
            slash_date(&entry.date),
            entry.index.to_string(),
            format_amount(entry.operation.value),
            entry.operation.category.clone(),
        ]);
    }
    output::info(table.render());

    let net: f64 = entries.iter().map(|entry| entry.operation.value).sum();
    output::info(format!(
        "{} operation(s), net {}",
        entries.len(),
        format_amount(net)
    ));
    Ok(())
}

/// `year=2024 month=mar day=5` style arguments; omitted parts match all.
fn parse_filter(args: &[&str]) -> Result<OperationFilter, CommandError> {
    let mut filter = OperationFilter::all();
    for arg in args {
        let (key, value) = arg.split_once('=').ok_or_else(|| {
            CommandError::InvalidArguments(format!("expected key=value, got `{arg}`"))
        })?;
        filter = match key.to_ascii_lowercase().as_str() {
            "year" => filter.year(value)?,
            "month" => filter.month(value)?,
            "day" => filter.day(value)?,
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown filter `{other}` (use year, month or day)"
                )))
            }
        };
    }
    Ok(filter)
}

fn current_category(
    context: &ShellContext,
    date: &DatePath,
    index: usize,
) -> Result<String, CommandError> {
    context
        .manager
        .ledger()
        .operations()
        .day(date)
        .and_then(|ops| ops.get(index))
        .map(|op| op.category.clone())
        .ok_or_else(|| {
            LedgerError::IndexOutOfRange {
                date: date.clone(),
                index,
            }
            .into()
        })
}

fn slash_date(date: &DatePath) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}
