//! Agenda CLI - a multi-user task list with local JSON storage.

use agenda::cli::{BackupCommands, Cli, Commands, ConfigCommands, TaskCommands, UserCommands};
use agenda::commands::{backup, config, output, report, session, task, user};
use agenda::config::{AgendaConfig, AppPaths, ConfigOverrides, OutputFormat, ResolvedConfig};
use agenda::config::{resolve_config, resolve_data_dir};
use agenda::logging;
use agenda::storage::Storage;
use clap::Parser;
use std::io::{self, BufRead};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Data directories must exist before anything else runs.
    let data_dir = resolve_data_dir(cli.data_dir);
    let paths = AppPaths::from_data_dir(&data_dir);
    if let Err(e) = paths.setup_dirs() {
        report_error(&e, cli.human_readable);
        process::exit(1);
    }

    let mut overrides = ConfigOverrides::new();
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    let file_config = match AgendaConfig::load(&paths.config_file) {
        Ok(config) => config,
        Err(e) => {
            // Unparsable config.kdl: run on defaults.
            eprintln!("Warning: {}", e);
            AgendaConfig::new()
        }
    };
    let resolved = resolve_config(&file_config, &overrides);
    let human = resolved.human();

    let _log_guard = logging::init(&paths.log_dir, resolved.log_level());
    tracing::debug!(data_dir = %paths.data_dir.display(), "starting");

    let storage = Storage::new(paths);
    if let Err(e) = run_command(cli.command, &storage, &resolved) {
        tracing::error!(error = %e, "command failed");
        report_error(&e, human);
        process::exit(1);
    }
}

fn report_error(e: &agenda::Error, human: bool) {
    if human {
        eprintln!("Error: {}", e);
    } else {
        eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
    }
}

/// Read a password from the first line of stdin.
fn read_password() -> Result<String, agenda::Error> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn run_command(
    command: Option<Commands>,
    storage: &Storage,
    resolved: &ResolvedConfig,
) -> Result<(), agenda::Error> {
    let human = resolved.human();
    match command {
        None => output(&session::status(storage)?, human),

        Some(Commands::Login { username, password }) => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            output(&session::login(storage, &username, &password)?, human);
        }

        Some(Commands::Logout) => output(&session::logout(storage)?, human),

        Some(Commands::Whoami) => output(&session::whoami(storage)?, human),

        Some(Commands::Task { command }) => match command {
            TaskCommands::Create {
                description,
                priority,
                category,
            } => {
                let result = task::task_create(
                    storage,
                    resolved,
                    &description,
                    priority,
                    category.as_deref(),
                )?;
                output(&result, human);
            }
            TaskCommands::List { completed, all } => {
                output(&task::task_list(storage, completed, all)?, human);
            }
            TaskCommands::Show { id } => output(&task::task_show(storage, &id)?, human),
            TaskCommands::Edit {
                id,
                description,
                priority,
                category,
            } => {
                let result = task::task_edit(
                    storage,
                    &id,
                    description.as_deref(),
                    priority,
                    category.as_deref(),
                )?;
                output(&result, human);
            }
            TaskCommands::Complete { id } => output(&task::task_complete(storage, &id)?, human),
            TaskCommands::Reopen { id } => output(&task::task_reopen(storage, &id)?, human),
            TaskCommands::Delete { id } => output(&task::task_delete(storage, &id)?, human),
        },

        Some(Commands::User { command }) => match command {
            UserCommands::List => output(&user::user_list(storage)?, human),
            UserCommands::Add {
                username,
                password,
                level,
                email,
            } => {
                output(
                    &user::user_add(storage, &username, &password, level, &email)?,
                    human,
                );
            }
            UserCommands::Passwd { username, password } => {
                output(
                    &user::user_passwd(storage, username.as_deref(), &password)?,
                    human,
                );
            }
            UserCommands::SetLevel { username, level } => {
                output(&user::user_set_level(storage, &username, level)?, human);
            }
        },

        Some(Commands::Backup { command }) => match command {
            BackupCommands::Create => output(&backup::backup_create(storage)?, human),
            BackupCommands::List => output(&backup::backup_list(storage)?, human),
            BackupCommands::Restore { timestamp } => {
                output(&backup::backup_restore(storage, &timestamp)?, human);
            }
        },

        Some(Commands::Report { kind, open }) => {
            output(&report::report(storage, kind, open)?, human);
        }

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => output(&config::config_show(&storage.paths, resolved), human),
            ConfigCommands::Set { key, value } => {
                output(&config::config_set(&storage.paths, &key, &value)?, human);
            }
        },

        Some(Commands::About) => output(&session::about(&storage.paths), human),
    }
    Ok(())
}
