use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "category",
        "List or register categories",
        "category list | category add <name>",
        cmd_category,
    )]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => list_categories(context),
        [action, rest @ ..] => match action.to_lowercase().as_str() {
            "list" if rest.is_empty() => list_categories(context),
            "add" if !rest.is_empty() => {
                let name = context.manager.add_category(&rest.join(" "))?;
                output::success(format!("Category `{name}` added."));
                Ok(())
            }
            _ => Err(context.usage_error("category")),
        },
    }
}

fn list_categories(context: &ShellContext) -> CommandResult {
    output::section("Categories");
    let mut table = Table::new(vec![TableColumn::right("#"), TableColumn::left("Name")]);
    for (idx, name) in context.manager.list_categories().into_iter().enumerate() {
        table.push_row(vec![(idx + 1).to_string(), name]);
    }
    output::info(table.render());
    Ok(())
}
