use crate::cli::core::{format_amount, parse_amount_arg, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

use super::print_balance;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "balance",
        "Show, override or reconcile the running balance",
        "balance [show | set <amount> | reconcile]",
        cmd_balance,
    )]
}

fn cmd_balance(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {
            print_balance(context);
            warn_on_drift(context);
            Ok(())
        }
        ["set", amount] => {
            let value = parse_amount_arg(amount)?;
            context.manager.set_balance(value)?;
            output::success(format!("Balance set to {}", format_amount(value)));
            warn_on_drift(context);
            Ok(())
        }
        ["reconcile"] => {
            let (previous, current) = context.manager.reconcile_balance()?;
            if previous == current {
                output::info("Balance already matches the recorded operations.");
            } else {
                output::success(format!(
                    "Balance reconciled: {} -> {}",
                    format_amount(previous),
                    format_amount(current)
                ));
            }
            Ok(())
        }
        _ => Err(context.usage_error("balance")),
    }
}

fn warn_on_drift(context: &ShellContext) {
    let drift = context.manager.ledger().balance_drift();
    if drift != 0.0 {
        output::warning(format!(
            "Balance differs from the sum of operations by {}.",
            format_amount(drift)
        ));
        output::hint("Run `balance reconcile` to rebuild it from the operations.");
    }
}
