use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change preferences",
        "config [show | set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {
            show_config(context);
            Ok(())
        }
        ["set", key, value @ ..] if !value.is_empty() => {
            context.config.set_value(key, &value.join(" "))?;
            context.config_manager.save(&context.config)?;
            context.apply_preferences();
            output::success(format!("Updated `{key}`."));
            if *key == "store_path" {
                output::hint("The new store is opened on the next start.");
            }
            Ok(())
        }
        _ => Err(context.usage_error("config")),
    }
}

fn show_config(context: &ShellContext) {
    output::section("Configuration");
    output::info(format!(
        "  {:<18} {}",
        "file",
        context.config_manager.path().display()
    ));
    output::info(format!("  {:<18} {}", "store", context.manager.location()));
    for (key, value) in context.config.entries() {
        output::info(format!("  {key:<18} {value}"));
    }
}
