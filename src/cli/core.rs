//! Shell dispatch, error types and the argument helpers shared by command
//! handlers.

use std::{env, io};

use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    core::{
        clock::{Clock, FixedClock, SystemClock},
        ledger_manager::{LedgerManager, LoadMetadata},
    },
    ledger::{parse_amount, DatePath},
    storage::{JsonStorage, LoadOrigin},
};

pub use crate::errors::CliError;
use crate::errors::LedgerError;

use super::commands;
use super::output::{self, OutputPreferences};
use super::registry::CommandRegistry;
use super::shell::parse_command_line;
pub use super::shell_context::{CliMode, ShellContext};

pub const SCRIPT_ENV: &str = "EXPENSE_TRACKER_CLI_SCRIPT";
pub const TODAY_ENV: &str = "EXPENSE_TRACKER_TODAY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    /// Opens the configured store under the application home.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let store = config.resolve_store_path(config_manager.base_dir());
        let (manager, meta) =
            LedgerManager::open(Box::new(JsonStorage::new(store)), clock_from_env()?)?;
        let context = Self::from_parts(mode, manager, config_manager, config);
        context.report_load(&meta);
        Ok(context)
    }

    pub fn from_parts(
        mode: CliMode,
        manager: LedgerManager,
        config_manager: ConfigManager,
        config: Config,
    ) -> Self {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        let context = Self {
            mode,
            registry,
            manager,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            running: true,
        };
        context.apply_preferences();
        context
    }

    /// Scripts never get ANSI styling.
    pub(crate) fn apply_preferences(&self) {
        output::set_preferences(OutputPreferences {
            plain_mode: !self.config.ui_color_enabled || self.mode == CliMode::Script,
            quiet_mode: self.config.quiet_mode,
        });
    }

    fn report_load(&self, meta: &LoadMetadata) {
        if meta.origin == LoadOrigin::Fresh {
            output::info(format!("Created a new store at {}", meta.location));
        }
        if !meta.repaired_keys.is_empty() {
            output::warning(format!(
                "Restored missing keys: {}",
                meta.repaired_keys.join(", ")
            ));
        }
        if meta.rewritten_keys > 0 {
            output::info(format!("Normalized {} date key(s)", meta.rewritten_keys));
        }
        for warning in &meta.warnings {
            output::warning(warning);
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        if self.manager.has_unsaved_changes() {
            "expenses*> ".into()
        } else {
            "expenses> ".into()
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };

        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();

        let control = self.dispatch(&command, raw, &args)?;
        if control == LoopControl::Exit {
            self.running = false;
        }
        Ok(control)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = closest_command(self.registry.names(), input) {
            output::hint(format!("Did you mean `{best}`?"));
        }
    }

    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(CommandError::from)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        let prompt = if self.manager.has_unsaved_changes() {
            "There are unsaved changes. Exit anyway?"
        } else {
            "Exit shell?"
        };
        self.confirm(prompt).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::Ledger(err @ LedgerError::SaveFailed { .. }) => {
                output::error(err);
                output::hint("The change is kept in memory; run `save` to retry.");
            }
            CommandError::Ledger(err @ LedgerError::IndexOutOfRange { .. }) => {
                output::error(err);
                output::hint("Run `history` to see the current entries.");
            }
            other => output::error(other),
        }
        Ok(())
    }

    pub(crate) fn usage_error(&self, command: &str) -> CommandError {
        let usage = self
            .registry
            .get(command)
            .map(|entry| entry.usage)
            .unwrap_or(command);
        CommandError::InvalidArguments(format!("Usage: {usage}"))
    }

    /// `today` or a `YYYY-MM-DD` / `YYYY/MM/DD` date.
    pub(crate) fn parse_date(&self, raw: &str) -> Result<DatePath, CommandError> {
        if raw.eq_ignore_ascii_case("today") {
            return Ok(DatePath::from_date(self.manager.today()));
        }
        raw.parse::<DatePath>().map_err(CommandError::from)
    }
}

fn clock_from_env() -> Result<Box<dyn Clock>, CliError> {
    match env::var(TODAY_ENV) {
        Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(|date| Box::new(FixedClock(date)) as Box<dyn Clock>)
            .map_err(|_| CliError::Input(format!("{TODAY_ENV} must be YYYY-MM-DD, got `{raw}`"))),
        Err(_) => Ok(Box::new(SystemClock)),
    }
}

fn closest_command<'a>(names: impl Iterator<Item = &'a str>, input: &str) -> Option<&'a str> {
    let needle = input.to_lowercase();
    names
        .map(|name| (levenshtein(name, &needle), name))
        .min_by_key(|(distance, _)| *distance)
        .filter(|(distance, _)| *distance <= 3)
        .map(|(_, name)| name)
}

pub(crate) fn looks_like_date(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("today") || raw.parse::<DatePath>().is_ok()
}

pub(crate) fn parse_amount_arg(raw: &str) -> Result<f64, CommandError> {
    parse_amount(raw).map_err(CommandError::from)
}

pub(crate) fn parse_index(raw: &str) -> Result<usize, CommandError> {
    raw.parse().map_err(|_| {
        CommandError::InvalidArguments(format!("`{raw}` is not a valid entry index"))
    })
}

pub(crate) fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Ledger(inner),
            CliError::Input(message) | CliError::Command(message) => {
                CommandError::InvalidArguments(message)
            }
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Ledger(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn script_context(
    storage: std::sync::Arc<crate::storage::MemoryStorage>,
    base: &std::path::Path,
) -> ShellContext {
    let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"));
    let (manager, _) =
        LedgerManager::open(Box::new(storage), Box::new(clock)).expect("open manager");
    let config_manager =
        ConfigManager::with_base_dir(base.to_path_buf()).expect("config manager");
    let config = config_manager.load().expect("load config");
    ShellContext::from_parts(CliMode::Script, manager, config_manager, config)
}
