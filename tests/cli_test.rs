//! End-to-end command tests: parse arguments, run, inspect the outline file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tempfile::TempDir;

use kbtree::application::services::OutlineService;
use kbtree::cli::{execute_command, Cli, CliError};
use kbtree::domain::{Node, OrderKeyEngine};
use kbtree::exitcode;
use kbtree::infrastructure::traits::RealFileSystem;
use kbtree::util::testing::{doc, write_outline};

fn run(dir: &Path, file: &Path, args: &[&str]) -> Result<(), CliError> {
    let dir = dir.to_string_lossy().to_string();
    let file = file.to_string_lossy().to_string();
    let mut argv = vec!["kbtree", "-C", dir.as_str(), "-f", file.as_str()];
    argv.extend_from_slice(args);
    execute_command(&Cli::parse_from(argv))
}

fn load(file: &Path) -> Vec<Node> {
    OutlineService::new(Arc::new(RealFileSystem), OrderKeyEngine::default())
        .load(file)
        .unwrap()
}

fn setup() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("outline.toml");
    (temp, file)
}

#[test]
fn given_empty_outline_when_adding_nodes_then_file_holds_them_in_order() {
    // Arrange
    let (temp, file) = setup();

    // Act
    run(temp.path(), &file, &["add", "Inbox", "--kind", "folder"]).unwrap();
    run(temp.path(), &file, &["add", "Archive", "--kind", "folder"]).unwrap();

    // Assert
    let nodes = load(&file);
    let keys: Vec<_> = nodes
        .iter()
        .map(|n| (n.name.as_str(), n.order_key.as_str()))
        .collect();
    assert_eq!(keys, vec![("Inbox", "b"), ("Archive", "c")]);
}

#[test]
fn given_three_docs_when_moving_last_between_first_two_then_key_is_between() {
    // Arrange
    let (temp, file) = setup();
    run(temp.path(), &file, &["add", "first"]).unwrap();
    run(temp.path(), &file, &["add", "second"]).unwrap();
    run(temp.path(), &file, &["add", "third"]).unwrap();
    let nodes = load(&file);
    let id_of = |name: &str| nodes.iter().find(|n| n.name == name).unwrap().id.clone();
    let (first, second, third) = (id_of("first"), id_of("second"), id_of("third"));

    // Act
    run(
        temp.path(),
        &file,
        &["move", &third, "--before", &first, "--after", &second],
    )
    .unwrap();

    // Assert
    let moved = load(&file).into_iter().find(|n| n.id == third).unwrap();
    assert_eq!(moved.order_key.as_str(), "bm");
    assert!(run(temp.path(), &file, &["check"]).is_ok());
}

#[test]
fn given_added_docs_when_moving_last_to_head_then_sorts_before_first() {
    // Arrange
    let (temp, file) = setup();
    run(temp.path(), &file, &["add", "first"]).unwrap();
    run(temp.path(), &file, &["add", "second"]).unwrap();
    let nodes = load(&file);
    let first = nodes[0].id.clone();
    let second = nodes[1].id.clone();

    // Act
    run(temp.path(), &file, &["move", &second, "--after", &first]).unwrap();

    // Assert
    let names: Vec<_> = load(&file).into_iter().map(|n| n.name).collect();
    assert_eq!(names, vec!["second", "first"]);
    assert!(run(temp.path(), &file, &["check"]).is_ok());
}

#[test]
fn given_move_without_neighbours_when_running_then_rejected_and_outline_sound() {
    // Arrange
    let (temp, file) = setup();
    for name in ["A", "B", "C"] {
        run(temp.path(), &file, &["add", name]).unwrap();
    }
    let before = load(&file);
    let last = before[2].id.clone();

    // Act
    let err = run(temp.path(), &file, &["move", &last]).unwrap_err();

    // Assert
    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert_eq!(load(&file), before);
    assert!(run(temp.path(), &file, &["check"]).is_ok());
}

#[test]
fn given_doc_parent_when_adding_then_data_error() {
    let (temp, file) = setup();
    run(temp.path(), &file, &["add", "doc"]).unwrap();
    let parent = load(&file)[0].id.clone();

    let err = run(temp.path(), &file, &["add", "child", "--parent", &parent]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert_eq!(load(&file).len(), 1);
}

#[test]
fn given_missing_outline_when_showing_tree_then_no_input() {
    let (temp, file) = setup();

    let err = run(temp.path(), &file, &["tree"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_sound_outline_when_checking_then_ok() {
    let (temp, file) = setup();
    run(temp.path(), &file, &["add", "Inbox", "--kind", "folder"]).unwrap();

    assert!(run(temp.path(), &file, &["check"]).is_ok());
    assert!(run(temp.path(), &file, &["tree", "--keys"]).is_ok());
    assert!(run(temp.path(), &file, &["list"]).is_ok());
}

#[test]
fn given_duplicate_keys_when_checking_then_check_failed() {
    let (temp, file) = setup();
    write_outline(temp.path(), &[doc("x", None, "a"), doc("y", None, "a")]);

    let err = run(temp.path(), &file, &["check"]).unwrap_err();

    assert!(matches!(err, CliError::CheckFailed(1)));
}

#[test]
fn given_bounds_when_asking_key_then_succeeds_and_bad_bounds_fail() {
    let (temp, file) = setup();

    assert!(run(temp.path(), &file, &["key", "--before", "a", "--after", "b"]).is_ok());
    let err = run(temp.path(), &file, &["key", "--before", "b", "--after", "a"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_project_dir_when_config_init_then_writes_template_once() {
    let (temp, file) = setup();

    run(temp.path(), &file, &["config", "init"]).unwrap();
    let err = run(temp.path(), &file, &["config", "init"]).unwrap_err();

    assert!(temp.path().join(".kbtree.toml").exists());
    assert_eq!(err.exit_code(), exitcode::USAGE);
}
