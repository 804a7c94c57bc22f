use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tasklist_cli::cli::{
    Cli, Command, CompletedCommand, ViewTarget, collect_overrides, position_to_index,
};
use tasklist_core::config::{self, Config};
use tasklist_core::error::AppError;
use tasklist_core::model::{ListKind, Task};
use tasklist_core::session::Session;
use tasklist_core::storage::FileStorage;
use tasklist_core::store::Change;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TASKLIST_LOG";

struct App {
    session: Session<FileStorage>,
    view: ViewTarget,
}

fn setup_logging(config: &Config) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(config.log_level_or_default()));
    // A second init only happens in tests that share the process; ignore it.
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}

fn load_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARN: ignoring configuration: {}", err);
    }
    let overrides = collect_overrides(raw_overrides).map_err(AppError::invalid_input)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn open_app(config: &Config) -> Result<App, AppError> {
    let session = Session::open_default(config)?;
    for err in session.initial_load().errors() {
        eprintln!("WARN: starting with an empty list: {}", err);
    }
    Ok(App {
        session,
        view: ViewTarget::Main,
    })
}

fn print_tasks_plain(kind: ListKind, tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No {} tasks.", kind.label());
        return;
    }
    for (index, task) in tasks.iter().enumerate() {
        println!("{}. {}", index + 1, task);
    }
}

fn print_tasks_json(kind: ListKind, tasks: &[Task]) {
    let items: Vec<serde_json::Value> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            serde_json::json!({
                "position": index + 1,
                "text": task,
            })
        })
        .collect();
    let json = serde_json::json!({
        "list": kind,
        "tasks": items,
    });
    println!("{}", json);
}

fn print_tasks(json: bool, kind: ListKind, tasks: &[Task]) {
    if json {
        print_tasks_json(kind, tasks);
    } else {
        print_tasks_plain(kind, tasks);
    }
}

fn report_change(json: bool, verb: &str, change: &Change) {
    for failure in &change.failures {
        eprintln!(
            "WARN: could not save {} tasks: {}",
            failure.kind, failure.error
        );
    }

    if json {
        let json = serde_json::json!({
            "action": verb,
            "task": change.task,
            "lists": change.lists,
            "synced": change.is_synced(),
        });
        println!("{}", json);
    } else {
        let label = match verb {
            "add" => "Added task",
            "complete" => "Completed task",
            "delete" => "Deleted task",
            _ => "Deleted completed task",
        };
        println!("{}: {}", label, change.task);
    }
}

fn index_arg(position: usize) -> Result<usize, AppError> {
    position_to_index(position).map_err(AppError::invalid_input)
}

fn show_completed(app: &mut App, json: bool) {
    let (load, _) = app.session.show_completed();
    if let Some(err) = load.error() {
        eprintln!("WARN: could not reload completed tasks: {}", err);
    }
    print_tasks(json, ListKind::Completed, app.session.completed());
}

fn delete_completed(app: &mut App, json: bool, position: usize) -> Result<(), AppError> {
    let index = index_arg(position)?;
    let change = app.session.store_mut().delete_completed_task(index)?;
    report_change(json, "delete_completed", &change);
    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;
    let mut quoted = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(app: &mut App, command: Command, json: bool) -> Result<(), AppError> {
    match command {
        Command::Add { text } => {
            let text = text.ok_or_else(|| AppError::invalid_input("task text is required"))?;
            if let Some(change) = app.session.store_mut().add_task(&text) {
                report_change(json, "add", &change);
            }
        }
        Command::List => match app.view {
            ViewTarget::Main => print_tasks(json, ListKind::Pending, app.session.store().pending()),
            ViewTarget::Completed => {
                print_tasks(json, ListKind::Completed, app.session.completed())
            }
        },
        Command::Done { position } => {
            let index = index_arg(position)?;
            let change = app.session.store_mut().complete_task(index)?;
            report_change(json, "complete", &change);
        }
        Command::Delete { position } => match app.view {
            ViewTarget::Main => {
                let index = index_arg(position)?;
                let change = app.session.store_mut().delete_task(index)?;
                report_change(json, "delete", &change);
            }
            ViewTarget::Completed => delete_completed(app, json, position)?,
        },
        Command::Completed { action } => match action {
            None | Some(CompletedCommand::List) => show_completed(app, json),
            Some(CompletedCommand::Delete { position }) => delete_completed(app, json, position)?,
        },
        Command::View { target } => {
            app.view = target;
            match target {
                ViewTarget::Main => {
                    print_tasks(json, ListKind::Pending, app.session.store().pending())
                }
                ViewTarget::Completed => show_completed(app, json),
            }
        }
    }

    Ok(())
}

fn run_interactive() -> Result<(), AppError> {
    let config = load_config(&[])?;
    setup_logging(&config);
    let mut app = open_app(&config)?;

    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasklist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if !cli.config_override.is_empty() {
            eprintln!(
                "ERROR: {}",
                AppError::invalid_input("config overrides only apply when starting tasklist")
            );
            continue;
        }

        if let Err(err) = run_command(&mut app, cli.command, cli.json) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run_once(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli.config_override)?;
    setup_logging(&config);
    let mut app = open_app(&config)?;
    run_command(&mut app, cli.command, cli.json)
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) {
                err.exit();
            }
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_once(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
