// src/main.rs

/*
 * Console host for the text search dialog. It plays the role of the platform
 * layer: stdin lines are turned into `AppEvent`s and every `PlatformCommand` the
 * presenter emits is rendered as text. Usage: `text_finder [PROJECT_ROOT]`.
 *
 * Input lines:
 *   <text>      search for <text>
 *   :open N     open result N (as listed)
 *   :cancel     cancel the running search
 *   :q          close the dialog
 */

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use simplelog::{
    ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger,
};

use text_finder::app_logic::SearchDialogLogic;
use text_finder::app_logic::ui_constants::APP_NAME;
use text_finder::core::{ConfigManagerOperations, CoreConfigManager, SearchSettings, path_utils};
use text_finder::platform_layer::{
    AppEvent, MessageSeverity, PlatformCommand, PlatformEventHandler, WindowId,
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const DRAIN_ON_EOF_TIMEOUT: Duration = Duration::from_secs(3600);
const DIALOG_WINDOW_ID: WindowId = WindowId::new(1);

fn initialize_logging(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Debug)
        .set_target_level(LevelFilter::Off)
        .build();

    if TermLogger::init(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .is_ok()
    {
        return;
    }

    /* No terminal available; fall back to a log file next to the settings. */
    let Some(log_path) = path_utils::get_log_file_path(APP_NAME) else {
        return;
    };
    match std::fs::File::create(&log_path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, config, file) {
                eprintln!("Could not start file logger at {log_path:?}: {e}");
            }
        }
        Err(e) => eprintln!("Could not create log file {log_path:?}: {e}"),
    }
}

fn load_settings() -> SearchSettings {
    match CoreConfigManager::new().load_settings(APP_NAME) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Using default settings: {e}");
            SearchSettings::default()
        }
    }
}

fn spawn_stdin_reader() -> io::Result<Receiver<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if sender.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(receiver)
}

fn event_for_line(line: &str) -> Option<AppEvent> {
    let window_id = DIALOG_WINDOW_ID;
    let trimmed = line.trim();
    if trimmed == ":q" {
        return Some(AppEvent::WindowCloseRequestedByUser { window_id });
    }
    if trimmed == ":cancel" {
        return Some(AppEvent::CancelSearchRequested { window_id });
    }
    if let Some(arg) = trimmed.strip_prefix(":open") {
        return match arg.trim().parse::<usize>() {
            Ok(index) => Some(AppEvent::ResultActivated { window_id, index }),
            Err(_) => {
                eprintln!("usage: :open N");
                None
            }
        };
    }
    Some(AppEvent::SearchSubmitted {
        window_id,
        text: line.to_string(),
    })
}

// Prints one command. Returns false once the dialog window is closed.
fn render_command(command: PlatformCommand) -> bool {
    match command {
        PlatformCommand::SetWindowTitle { title, .. } => println!("== {title} =="),
        PlatformCommand::ShowWindow { .. } => {
            println!("Type a query, ':open N', ':cancel' or ':q'.")
        }
        PlatformCommand::CloseWindow { .. } => return false,
        PlatformCommand::UpdateLabelText { text, severity, .. } => match severity {
            MessageSeverity::Error => println!("[error] {text}"),
            MessageSeverity::Warning => println!("[warning] {text}"),
            MessageSeverity::Information | MessageSeverity::None => println!("[status] {text}"),
        },
        PlatformCommand::PopulateResultList { items, .. } => {
            for item in items {
                println!("{:>4}: {}", item.index, item.text);
            }
        }
        PlatformCommand::UpdateProgress {
            fraction,
            current_file_name,
            ..
        } => {
            log::trace!("progress {:.0}% {current_file_name}", fraction * 100.0);
        }
        PlatformCommand::SetControlVisible { .. } | PlatformCommand::SetControlEnabled { .. } => {}
        PlatformCommand::OpenFileAtLocation {
            path,
            line_number,
            column_number,
        } => println!(
            "open {}:{}:{}",
            path.display(),
            line_number + 1,
            column_number + 1
        ),
    }
    true
}

// Drains queued commands. Returns false once the dialog window is closed.
fn drain_commands(logic: &mut SearchDialogLogic) -> bool {
    while let Some(command) = logic.try_dequeue_command() {
        if !render_command(command) {
            return false;
        }
    }
    true
}

fn main() -> io::Result<()> {
    let settings = load_settings();
    let level = settings.log_level_filter();
    initialize_logging(level.as_ref().copied().unwrap_or(LevelFilter::Info));
    log::info!("Application starting...");
    if let Err(e) = level {
        log::warn!(
            "Unknown log level '{}' in settings ({e}), using 'info'.",
            settings.log_level
        );
    }

    let project_root = match std::env::args_os().nth(1) {
        Some(arg) => Some(PathBuf::from(arg)),
        None => std::env::current_dir().ok(),
    };
    let mut logic = SearchDialogLogic::from_settings(project_root, &settings);
    let input = spawn_stdin_reader()?;

    logic.handle_event(AppEvent::SearchDialogOpened {
        window_id: DIALOG_WINDOW_ID,
    });

    let mut running = drain_commands(&mut logic);
    while running {
        match input.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                if let Some(event) = event_for_line(&line) {
                    logic.handle_event(event);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                /* End of input: let a running search finish before leaving. */
                logic.wait_for_search(DRAIN_ON_EOF_TIMEOUT);
                drain_commands(&mut logic);
                break;
            }
        }
        running = drain_commands(&mut logic);
    }

    logic.handle_event(AppEvent::WindowDestroyed {
        window_id: DIALOG_WINDOW_ID,
    });
    logic.on_quit();
    log::info!("Application exiting.");
    Ok(())
}
