pub mod balance;
pub mod category;
pub mod config;
pub mod operation;
pub mod report;
pub mod system;

use crate::cli::core::{format_amount, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandRegistry;

pub fn register_all(registry: &mut CommandRegistry) {
    let groups = [
        operation::definitions(),
        category::definitions(),
        balance::definitions(),
        report::definitions(),
        config::definitions(),
        system::definitions(),
    ];
    for entry in groups.into_iter().flatten() {
        registry.register(entry);
    }
}

pub(crate) fn print_balance(context: &ShellContext) {
    output::info(format!(
        "Balance: {}",
        format_amount(context.manager.balance())
    ));
}
