//! Contract Tests for the Terminal Runner
//!
//! These tests pin down how a single definition is turned into host
//! operations: spawning, command sending, persistence and splitting.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use termdeck::models::{CommandSpec, Configuration, TerminalDefinition};
use termdeck::substitution::SubstitutionMap;
use termdeck::{PersistentRegistry, TerminalRunner};
use test_utils::{definition, MockHost, TEST_ROOT};

fn runner() -> (Arc<MockHost>, TerminalRunner) {
    let host = Arc::new(MockHost::new());
    let runner = TerminalRunner::new(host.clone(), Arc::new(PersistentRegistry::new()));
    (host, runner)
}

fn config() -> Configuration {
    Configuration::empty(PathBuf::from(TEST_ROOT).join(".vscode/terminals.json"))
}

fn root() -> Option<&'static Path> {
    Some(Path::new(TEST_ROOT))
}

#[tokio::test]
async fn test_single_command_is_submitted() {
    let (host, runner) = runner();
    let terminal = definition("build", "cargo build");

    let handle = runner
        .run(&terminal, &config(), root(), &SubstitutionMap::new(), None)
        .await
        .expect("terminal should be created");

    assert_eq!(handle.name, "build");
    assert!(!handle.reused);
    assert_eq!(
        host.sent_to(&handle.id),
        [("cargo build".to_string(), true)]
    );
}

#[tokio::test]
async fn test_commands_sent_in_order() {
    let (host, runner) = runner();
    let terminal = TerminalDefinition::with_commands("multi", ["cd src", "ls", "git status"]);

    let handle = runner
        .run(&terminal, &config(), root(), &SubstitutionMap::new(), None)
        .await
        .unwrap();

    let texts: Vec<String> = host
        .sent_to(&handle.id)
        .into_iter()
        .map(|(text, _)| text)
        .collect();
    assert_eq!(texts, ["cd src", "ls", "git status"]);
}

#[tokio::test]
async fn test_no_execute_leaves_only_last_unsubmitted() {
    let (host, runner) = runner();
    let mut terminal = TerminalDefinition::with_commands("staged", ["cd src", "make deploy"]);
    terminal.execute = false;

    let handle = runner
        .run(&terminal, &config(), root(), &SubstitutionMap::new(), None)
        .await
        .unwrap();

    assert_eq!(
        host.sent_to(&handle.id),
        [
            ("cd src".to_string(), true),
            ("make deploy".to_string(), false)
        ]
    );
}

#[tokio::test]
async fn test_substitution_applies_to_each_command() {
    let (host, runner) = runner();
    let subs: SubstitutionMap = [("file", "/work/app/src/main.rs"), ("lineNumber", "7")]
        .into_iter()
        .collect();
    let terminal = TerminalDefinition::with_commands(
        "inspect",
        ["echo [file]:[lineNumber]", "wc -l [file] [unknown]"],
    );

    let handle = runner
        .run(&terminal, &config(), root(), &subs, None)
        .await
        .unwrap();

    let texts: Vec<String> = host
        .sent_to(&handle.id)
        .into_iter()
        .map(|(text, _)| text)
        .collect();
    assert_eq!(
        texts,
        [
            "echo /work/app/src/main.rs:7",
            "wc -l /work/app/src/main.rs [unknown]"
        ]
    );
}

#[tokio::test]
async fn test_empty_command_produces_nothing() {
    let (host, runner) = runner();
    let mut terminal = definition("blank", "  ");

    assert!(runner
        .run(&terminal, &config(), root(), &SubstitutionMap::new(), None)
        .await
        .is_none());

    terminal.commands = Some(CommandSpec::Multi(Vec::new()));
    assert!(runner
        .run(&terminal, &config(), root(), &SubstitutionMap::new(), None)
        .await
        .is_none());

    assert!(host.created().is_empty());
}

#[tokio::test]
async fn test_spawn_failure_produces_nothing() {
    let (host, runner) = runner();
    host.fail_on("broken");

    let result = runner
        .run(
            &definition("broken", "ls"),
            &config(),
            root(),
            &SubstitutionMap::new(),
            None,
        )
        .await;

    assert!(result.is_none());
    assert!(host.events().is_empty());
}

#[tokio::test]
async fn test_cwd_resolution() {
    let (host, runner) = runner();
    let subs: SubstitutionMap = [("fileDirname", "/work/app/src")].into_iter().collect();

    let plain = runner
        .run(&definition("plain", "ls"), &config(), root(), &subs, None)
        .await
        .unwrap();
    assert_eq!(host.cwd_of(&plain.id), Some(PathBuf::from(TEST_ROOT)));

    let mut relative = definition("relative", "ls");
    relative.cwd = Some("docs".to_string());
    let relative = runner
        .run(&relative, &config(), root(), &subs, None)
        .await
        .unwrap();
    assert_eq!(
        host.cwd_of(&relative.id),
        Some(PathBuf::from(TEST_ROOT).join("docs"))
    );

    let mut substituted = definition("substituted", "ls");
    substituted.cwd = Some("[fileDirname]".to_string());
    let substituted = runner
        .run(&substituted, &config(), root(), &subs, None)
        .await
        .unwrap();
    assert_eq!(
        host.cwd_of(&substituted.id),
        Some(PathBuf::from("/work/app/src"))
    );
}

#[tokio::test]
async fn test_parent_makes_a_split() {
    let (host, runner) = runner();
    let subs = SubstitutionMap::new();

    let first = runner
        .run(&definition("first", "ls"), &config(), root(), &subs, None)
        .await
        .unwrap();
    let second = runner
        .run(&definition("second", "ls"), &config(), root(), &subs, Some(&first))
        .await
        .unwrap();

    let created = host.created();
    assert_eq!(created[0].2, None);
    assert_eq!(created[1].0, second.id);
    assert_eq!(created[1].2, Some(first.id));
}

#[tokio::test]
async fn test_persistent_terminal_is_reused_without_resend() {
    let (host, runner) = runner();
    let mut terminal = definition("watch", "cargo watch");
    terminal.persistent = Some("watcher".to_string());
    let subs = SubstitutionMap::new();

    let first = runner
        .run(&terminal, &config(), root(), &subs, None)
        .await
        .unwrap();
    let second = runner
        .run(&terminal, &config(), root(), &subs, None)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert!(!first.reused);
    assert!(second.reused);
    assert_eq!(host.created().len(), 1);
    assert_eq!(host.sent_to(&first.id).len(), 1);
    let entry = runner.registry().get("watcher").await.unwrap();
    assert_eq!(entry.id, first.id);
    assert!(entry.belongs_to(host.session()));
}

#[tokio::test]
async fn test_closed_persistent_terminal_is_respawned() {
    let (host, runner) = runner();
    let mut terminal = definition("watch", "cargo watch");
    terminal.persistent = Some("watcher".to_string());
    let subs = SubstitutionMap::new();

    let first = runner
        .run(&terminal, &config(), root(), &subs, None)
        .await
        .unwrap();
    host.close(&first.id);

    let second = runner
        .run(&terminal, &config(), root(), &subs, None)
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    assert!(!second.reused);
    assert_eq!(host.sent_to(&second.id), [("cargo watch".to_string(), true)]);
    assert_eq!(
        runner.registry().get("watcher").await.map(|entry| entry.id),
        Some(second.id)
    );
}

#[tokio::test]
async fn test_concurrent_persistent_runs_spawn_once() {
    let (host, runner) = runner();
    let mut terminal = definition("server", "npm start");
    terminal.persistent = Some("server".to_string());
    let (config, subs) = (config(), SubstitutionMap::new());

    let (a, b) = tokio::join!(
        runner.run(&terminal, &config, root(), &subs, None),
        runner.run(&terminal, &config, root(), &subs, None),
    );

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.id, b.id);
    assert_eq!(host.created().len(), 1);
    assert!(a.reused != b.reused);
}

#[tokio::test]
async fn test_definitions_sharing_a_key_share_a_terminal() {
    let (host, runner) = runner();
    let mut first = definition("first", "echo one");
    first.persistent = Some("shared".to_string());
    let mut second = definition("second", "echo two");
    second.persistent = Some("shared".to_string());
    let subs = SubstitutionMap::new();

    let a = runner
        .run(&first, &config(), root(), &subs, None)
        .await
        .unwrap();
    let b = runner
        .run(&second, &config(), root(), &subs, None)
        .await
        .unwrap();

    assert_eq!(a.id, b.id);
    assert_eq!(b.name, "second");
    assert_eq!(host.sent_to(&a.id), [("echo one".to_string(), true)]);
}

#[tokio::test]
async fn test_entry_from_another_session_is_not_reused() {
    let registry = Arc::new(PersistentRegistry::new());
    let mut terminal = definition("watch", "cargo watch");
    terminal.persistent = Some("watcher".to_string());
    let subs = SubstitutionMap::new();

    let old_host = Arc::new(MockHost::new());
    let old = TerminalRunner::new(old_host.clone(), registry.clone())
        .run(&terminal, &config(), root(), &subs, None)
        .await
        .unwrap();

    // the new session hands out the recorded id to an unrelated terminal
    let new_host = Arc::new(MockHost::new());
    let runner = TerminalRunner::new(new_host.clone(), registry.clone());
    let scratch = runner
        .run(&definition("scratch", "vim notes"), &config(), root(), &subs, None)
        .await
        .unwrap();
    assert_eq!(scratch.id, old.id);

    let watch = runner
        .run(&terminal, &config(), root(), &subs, None)
        .await
        .unwrap();

    assert!(!watch.reused);
    assert_ne!(watch.id, scratch.id);
    assert_eq!(new_host.sent_to(&scratch.id), [("vim notes".to_string(), true)]);
    assert_eq!(new_host.sent_to(&watch.id), [("cargo watch".to_string(), true)]);
    let entry = registry.get("watcher").await.unwrap();
    assert_eq!(entry.id, watch.id);
    assert!(entry.belongs_to(new_host.session()));
}
