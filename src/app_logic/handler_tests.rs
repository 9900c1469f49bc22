use super::handler::*;
use super::ui_constants::{
    DIALOG_TITLE, RESULT_LIST_ID, SEARCH_BUTTON_ID, SEARCH_INPUT_ID, STATUS_CANCELLED,
    STATUS_ENTER_QUERY, STATUS_NO_PROJECT, STATUS_SEARCHING,
};

use crate::core::SearchSettings;
use crate::core::test_doubles::{GatedContent, InMemoryContent, StaticEnumerator, handles};
use crate::platform_layer::{
    AppEvent, MessageSeverity, PlatformCommand, PlatformEventHandler, ResultItemDescriptor,
    WindowId,
};

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

/*
 * This module contains unit tests for `SearchDialogLogic` from the `super::handler`
 * module. Searches run on real worker threads against in-memory enumerators and
 * content providers; tests either block with `wait_for_search` or gate the
 * content provider to hold a session mid-flight. Assertions are made on the
 * commands dequeued from the presenter.
 */

const WAIT: Duration = Duration::from_secs(5);

fn window() -> WindowId {
    WindowId::new(1)
}

fn hello_logic() -> SearchDialogLogic {
    SearchDialogLogic::new(
        Some(PathBuf::from("/project")),
        Arc::new(StaticEnumerator::new(handles(&[
            "/project/a.txt",
            "/project/b.txt",
        ]))),
        Arc::new(InMemoryContent::new(&[
            ("/project/a.txt", "Hello World"),
            ("/project/b.txt", "hello there, hello!"),
        ])),
    )
}

fn gated_logic(files: &[&str]) -> (SearchDialogLogic, mpsc::Sender<()>, Arc<Mutex<usize>>) {
    let (gate_sender, gate_receiver) = mpsc::channel();
    let content = GatedContent::new(gate_receiver, "needle in a haystack");
    let loads = content.load_counter();
    let logic = SearchDialogLogic::new(
        Some(PathBuf::from("/p")),
        Arc::new(StaticEnumerator::new(handles(files))),
        Arc::new(content),
    );
    (logic, gate_sender, loads)
}

fn wait_for_loads(counter: &Arc<Mutex<usize>>, at_least: usize) {
    let deadline = Instant::now() + WAIT;
    while *counter.lock().unwrap() < at_least {
        assert!(Instant::now() < deadline, "Worker never reached the gate");
        thread::sleep(Duration::from_millis(5));
    }
}

fn drain(logic: &mut SearchDialogLogic) -> Vec<PlatformCommand> {
    let mut commands = Vec::new();
    while let Some(command) = logic.try_dequeue_command() {
        commands.push(command);
    }
    commands
}

fn open(logic: &mut SearchDialogLogic) -> Vec<PlatformCommand> {
    logic.handle_event(AppEvent::SearchDialogOpened {
        window_id: window(),
    });
    drain(logic)
}

fn submit(logic: &mut SearchDialogLogic, text: &str) {
    logic.handle_event(AppEvent::SearchSubmitted {
        window_id: window(),
        text: text.to_string(),
    });
}

fn submit_and_settle(logic: &mut SearchDialogLogic, text: &str) -> Vec<PlatformCommand> {
    submit(logic, text);
    assert!(logic.wait_for_search(WAIT), "search did not settle in time");
    drain(logic)
}

fn statuses(commands: &[PlatformCommand]) -> Vec<(String, MessageSeverity)> {
    commands
        .iter()
        .filter_map(|c| match c {
            PlatformCommand::UpdateLabelText { text, severity, .. } => {
                Some((text.clone(), *severity))
            }
            _ => None,
        })
        .collect()
}

fn last_status(commands: &[PlatformCommand]) -> Option<(String, MessageSeverity)> {
    statuses(commands).pop()
}

fn last_result_list(commands: &[PlatformCommand]) -> Option<Vec<ResultItemDescriptor>> {
    commands.iter().rev().find_map(|c| match c {
        PlatformCommand::PopulateResultList {
            items, control_id, ..
        } if *control_id == RESULT_LIST_ID => Some(items.clone()),
        _ => None,
    })
}

fn progress_updates(commands: &[PlatformCommand]) -> Vec<(f64, String)> {
    commands
        .iter()
        .filter_map(|c| match c {
            PlatformCommand::UpdateProgress {
                fraction,
                current_file_name,
                ..
            } => Some((*fraction, current_file_name.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn test_dialog_opened_sets_title_prompt_and_shows_window() {
    let mut logic = hello_logic();

    let commands = open(&mut logic);

    assert!(commands.iter().any(|c| matches!(
        c,
        PlatformCommand::SetWindowTitle { title, .. } if title.starts_with(DIALOG_TITLE)
    )));
    assert_eq!(
        last_status(&commands),
        Some((STATUS_ENTER_QUERY.to_string(), MessageSeverity::Information))
    );
    assert_eq!(last_result_list(&commands), Some(Vec::new()));
    assert_eq!(
        commands.last(),
        Some(&PlatformCommand::ShowWindow {
            window_id: window()
        })
    );
}

#[test]
fn test_blank_query_prompts_and_starts_nothing() {
    let mut logic = hello_logic();
    open(&mut logic);

    submit(&mut logic, "   ");
    let commands = drain(&mut logic);

    assert_eq!(
        statuses(&commands),
        vec![(STATUS_ENTER_QUERY.to_string(), MessageSeverity::Information)]
    );
    assert!(!logic.is_search_running());
    assert!(progress_updates(&commands).is_empty());
    thread::sleep(Duration::from_millis(50));
    assert!(drain(&mut logic).is_empty());
}

#[test]
fn test_hello_search_lists_three_results() {
    let mut logic = hello_logic();
    open(&mut logic);

    let commands = submit_and_settle(&mut logic, "hello");

    let texts: Vec<String> = statuses(&commands).into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        texts,
        vec![
            STATUS_SEARCHING.to_string(),
            "Searching... (2 files)".to_string(),
            "3 results found".to_string()
        ]
    );
    let items = last_result_list(&commands).expect("results should be populated");
    assert_eq!(items.len(), 3);
    assert!(items[0].text.starts_with("a.txt ("));
    assert!(items[0].text.ends_with(":1) - Hello World"));
    assert!(items[2].text.starts_with("b.txt ("));

    let ui_state = logic.ui_state().unwrap();
    assert_eq!(ui_state.results[2].column_number, 13);
    assert!(ui_state.pending_session.is_none());
}

#[test]
fn test_no_match_reports_no_results() {
    let mut logic = hello_logic();
    open(&mut logic);

    let commands = submit_and_settle(&mut logic, "zzz");

    assert_eq!(
        last_status(&commands),
        Some(("No results found".to_string(), MessageSeverity::Information))
    );
    assert_eq!(last_result_list(&commands), Some(Vec::new()));
}

#[test]
fn test_progress_updates_carry_file_names() {
    let mut logic = hello_logic();
    open(&mut logic);

    let commands = submit_and_settle(&mut logic, "hello");

    assert_eq!(
        progress_updates(&commands),
        vec![
            (0.0, "a.txt".to_string()),
            (0.5, "b.txt".to_string()),
            (1.0, String::new())
        ]
    );
}

#[test]
fn test_results_are_delivered_in_one_batch() {
    let mut logic = hello_logic();
    open(&mut logic);

    let commands = submit_and_settle(&mut logic, "hello");

    let populated: Vec<usize> = commands
        .iter()
        .filter_map(|c| match c {
            PlatformCommand::PopulateResultList { items, .. } => Some(items.len()),
            _ => None,
        })
        .collect();
    // The list is cleared when the search starts and filled once at completion.
    assert_eq!(populated, vec![0, 3]);
}

#[test]
fn test_activating_result_opens_file_at_match() {
    let mut logic = hello_logic();
    open(&mut logic);
    submit_and_settle(&mut logic, "hello");

    logic.handle_event(AppEvent::ResultActivated {
        window_id: window(),
        index: 2,
    });
    let commands = drain(&mut logic);

    assert_eq!(
        commands,
        vec![PlatformCommand::OpenFileAtLocation {
            path: PathBuf::from("/project/b.txt"),
            line_number: 0,
            column_number: 13,
        }]
    );
    assert_eq!(logic.ui_state().unwrap().selected_index, Some(2));
}

#[test]
fn test_activating_missing_result_does_nothing() {
    let mut logic = hello_logic();
    open(&mut logic);
    submit_and_settle(&mut logic, "hello");

    logic.handle_event(AppEvent::ResultActivated {
        window_id: window(),
        index: 99,
    });

    assert!(drain(&mut logic).is_empty());
    assert_eq!(logic.ui_state().unwrap().selected_index, None);
}

#[test]
fn test_cancel_suppresses_completion_message() {
    let (mut logic, gate, loads) = gated_logic(&["/p/1.txt", "/p/2.txt", "/p/3.txt"]);
    open(&mut logic);
    submit(&mut logic, "needle");
    wait_for_loads(&loads, 1);

    logic.handle_event(AppEvent::CancelSearchRequested {
        window_id: window(),
    });
    let commands = drain(&mut logic);
    assert_eq!(
        last_status(&commands),
        Some((STATUS_CANCELLED.to_string(), MessageSeverity::Information))
    );
    assert!(!logic.is_search_running());

    drop(gate);
    thread::sleep(Duration::from_millis(200));
    let late = drain(&mut logic);
    assert!(
        late.is_empty(),
        "Cancelled session must not deliver anything: {late:?}"
    );
}

#[test]
fn test_new_search_supersedes_running_one() {
    let (mut logic, gate, loads) = gated_logic(&["/p/1.txt", "/p/2.txt"]);
    open(&mut logic);
    submit(&mut logic, "needle");
    wait_for_loads(&loads, 1);

    submit(&mut logic, "haystack");
    drop(gate);
    assert!(logic.wait_for_search(WAIT));
    let commands = drain(&mut logic);

    let completions: Vec<String> = statuses(&commands)
        .into_iter()
        .map(|(t, _)| t)
        .filter(|t| t.ends_with("found"))
        .collect();
    assert_eq!(completions, vec!["2 results found".to_string()]);
    let items = last_result_list(&commands).unwrap();
    assert!(items.iter().all(|i| i.text.contains("haystack")));
}

#[test]
fn test_new_search_replaces_previous_results() {
    let mut logic = hello_logic();
    open(&mut logic);
    submit_and_settle(&mut logic, "hello");

    let commands = submit_and_settle(&mut logic, "world");

    assert_eq!(last_result_list(&commands).map(|items| items.len()), Some(1));
    assert_eq!(logic.ui_state().unwrap().results.len(), 1);
}

#[test]
fn test_close_cancels_running_search_and_closes_window() {
    let (mut logic, gate, loads) = gated_logic(&["/p/1.txt", "/p/2.txt"]);
    open(&mut logic);
    submit(&mut logic, "needle");
    wait_for_loads(&loads, 1);

    logic.handle_event(AppEvent::WindowCloseRequestedByUser {
        window_id: window(),
    });
    let commands = drain(&mut logic);

    assert!(commands.contains(&PlatformCommand::CloseWindow {
        window_id: window()
    }));
    assert!(!logic.is_search_running());
    drop(gate);
}

#[test]
fn test_window_destroyed_discards_dialog_state() {
    let mut logic = hello_logic();
    open(&mut logic);
    submit_and_settle(&mut logic, "hello");

    logic.handle_event(AppEvent::WindowDestroyed {
        window_id: window(),
    });

    assert!(logic.ui_state().is_none());
    submit(&mut logic, "hello");
    assert!(drain(&mut logic).is_empty());
    assert!(!logic.is_search_running());
}

#[test]
fn test_enumeration_failure_shows_error_status() {
    let mut logic = SearchDialogLogic::new(
        Some(PathBuf::from("/missing")),
        Arc::new(StaticEnumerator::failing()),
        Arc::new(InMemoryContent::new(&[])),
    );
    open(&mut logic);

    let commands = submit_and_settle(&mut logic, "anything");

    let (text, severity) = last_status(&commands).unwrap();
    assert!(text.starts_with("Error during search: "), "got {text:?}");
    assert!(text.contains("/missing"));
    assert_eq!(severity, MessageSeverity::Error);
    assert!(last_result_list(&commands).unwrap().is_empty());
}

#[test]
fn test_without_project_search_is_disabled() {
    assert!(!is_search_action_enabled(None));
    assert!(is_search_action_enabled(Some(Path::new("/p"))));

    let mut logic = SearchDialogLogic::from_settings(None, &SearchSettings::default());
    let commands = open(&mut logic);
    for control_id in [SEARCH_INPUT_ID, SEARCH_BUTTON_ID] {
        assert!(commands.contains(&PlatformCommand::SetControlEnabled {
            window_id: window(),
            control_id,
            enabled: false,
        }));
    }

    submit(&mut logic, "hello");
    let commands = drain(&mut logic);

    assert_eq!(
        statuses(&commands),
        vec![(STATUS_NO_PROJECT.to_string(), MessageSeverity::Warning)]
    );
    assert!(!logic.is_search_running());
}

#[test]
fn test_events_for_other_windows_are_ignored() {
    let mut logic = hello_logic();
    open(&mut logic);

    logic.handle_event(AppEvent::SearchSubmitted {
        window_id: WindowId::new(42),
        text: "hello".to_string(),
    });

    assert!(!logic.is_search_running());
    assert!(drain(&mut logic).is_empty());
}

#[test]
fn test_search_over_real_project_tree() -> std::io::Result<()> {
    let dir = tempdir()?;
    std::fs::write(dir.path().join("a.txt"), "Hello World")?;
    std::fs::write(dir.path().join("b.txt"), "hello there, hello!")?;
    let mut logic =
        SearchDialogLogic::from_settings(Some(dir.path().to_path_buf()), &SearchSettings::default());
    open(&mut logic);

    let commands = submit_and_settle(&mut logic, "HELLO");

    assert_eq!(
        last_status(&commands).map(|(t, _)| t),
        Some("3 results found".to_string())
    );
    let results = &logic.ui_state().unwrap().results;
    let located: Vec<(&str, usize, usize)> = results
        .iter()
        .map(|r| (r.file.name(), r.line_number, r.column_number))
        .collect();
    assert_eq!(
        located,
        vec![("a.txt", 0, 0), ("b.txt", 0, 0), ("b.txt", 0, 13)]
    );
    Ok(())
}
