//! Integration Tests for Persistent Terminals
//!
//! These tests verify reuse of persistent terminals across triggers and
//! across launcher invocations sharing a registry file.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use termdeck::substitution::ContextResolver;
use termdeck::{Orchestrator, PersistentRegistry, TerminalRunner};
use test_utils::{definition, with_display, MockHost, MockUi, StaticProvider, TEST_ROOT};

fn persistent(name: &str, key: &str) -> termdeck::TerminalDefinition {
    let mut terminal = with_display(name, false, true);
    terminal.persistent = Some(key.to_string());
    terminal
}

#[tokio::test]
async fn test_run_by_name_twice_reuses_terminal() {
    let harness = test_utils::Harness::new(vec![persistent("server", "server")]);

    let first = harness.orchestrator.run_by_name("server").await;
    let second = harness.orchestrator.run_by_name("server").await;

    assert_eq!(first.handles[0].id, second.handles[0].id);
    assert!(second.handles[0].reused);
    assert_eq!(harness.host.created().len(), 1);
    assert_eq!(harness.host.sent_to(&first.handles[0].id).len(), 1);
    // reused terminals are still brought forward
    assert_eq!(harness.host.shown().len(), 2);
}

#[tokio::test]
async fn test_batch_reuses_persistent_and_spawns_others() {
    let harness = test_utils::Harness::new(vec![
        persistent("server", "server"),
        definition("scratch", "ls"),
    ]);

    harness.orchestrator.run_all(None).await;
    let report = harness.orchestrator.run_all(None).await;

    let server = report.handles.iter().find(|h| h.name == "server").unwrap();
    let scratch = report.handles.iter().find(|h| h.name == "scratch").unwrap();
    assert!(server.reused);
    assert!(!scratch.reused);
    assert_eq!(harness.host.created().len(), 3);
    assert_eq!(harness.registry.len(), 1);
}

#[tokio::test]
async fn test_registry_file_is_shared_between_invocations() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("state").join("persistent.json");
    let host = Arc::new(MockHost::new());
    let terminals = vec![persistent("server", "server")];

    let invocation = |registry: PersistentRegistry| {
        Orchestrator::new(
            Arc::new(StaticProvider::new(terminals.clone())),
            Arc::new(ContextResolver::default()),
            TerminalRunner::new(host.clone(), Arc::new(registry)),
            Arc::new(MockUi::new()),
            Some(PathBuf::from(TEST_ROOT)),
        )
    };

    let first = invocation(PersistentRegistry::with_store(&store).unwrap())
        .run_by_name("server")
        .await;
    assert!(store.is_file());

    let second = invocation(PersistentRegistry::with_store(&store).unwrap())
        .run_by_name("server")
        .await;

    assert_eq!(first.handles[0].id, second.handles[0].id);
    assert!(second.handles[0].reused);
    assert_eq!(host.created().len(), 1);
}

#[tokio::test]
async fn test_stale_registry_entry_is_replaced() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("persistent.json");
    std::fs::write(
        &store,
        r#"{ "server": { "id": "term-gone", "session": "session-a" } }"#,
    )
    .unwrap();

    let host = Arc::new(MockHost::with_session("session-a"));
    let registry = Arc::new(PersistentRegistry::with_store(&store).unwrap());
    let orchestrator = Orchestrator::new(
        Arc::new(StaticProvider::new(vec![persistent("server", "server")])),
        Arc::new(ContextResolver::default()),
        TerminalRunner::new(host.clone(), registry.clone()),
        Arc::new(MockUi::new()),
        Some(PathBuf::from(TEST_ROOT)),
    );

    let report = orchestrator.run_by_name("server").await;

    assert!(!report.handles[0].reused);
    assert_eq!(host.created().len(), 1);
    let stored = std::fs::read_to_string(&store).unwrap();
    assert!(stored.contains(report.handles[0].id.as_str()));
    assert!(!stored.contains("term-gone"));
}

#[tokio::test]
async fn test_restarted_host_does_not_inherit_terminals() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("persistent.json");
    let terminals = vec![persistent("server", "server"), definition("scratch", "vim notes")];

    let invocation = |host: Arc<MockHost>| {
        Orchestrator::new(
            Arc::new(StaticProvider::new(terminals.clone())),
            Arc::new(ContextResolver::default()),
            TerminalRunner::new(
                host,
                Arc::new(PersistentRegistry::with_store(&store).unwrap()),
            ),
            Arc::new(MockUi::new()),
            Some(PathBuf::from(TEST_ROOT)),
        )
    };

    let first_host = Arc::new(MockHost::new());
    let first = invocation(first_host.clone()).run_by_name("server").await;

    // a restarted host numbers its terminals from the start again
    let second_host = Arc::new(MockHost::new());
    let orchestrator = invocation(second_host.clone());
    let scratch = orchestrator.run_by_name("scratch").await;
    assert_eq!(scratch.handles[0].id, first.handles[0].id);

    let second = orchestrator.run_by_name("server").await;

    assert!(!second.handles[0].reused);
    assert_ne!(second.handles[0].id, scratch.handles[0].id);
    assert_eq!(
        second_host.sent_to(&scratch.handles[0].id),
        [("vim notes".to_string(), true)]
    );
    assert_eq!(
        second_host.sent_to(&second.handles[0].id),
        [("echo server".to_string(), true)]
    );
}

#[test]
fn test_corrupt_registry_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("persistent.json");
    std::fs::write(&store, "not json").unwrap();

    assert!(PersistentRegistry::with_store(&store).is_err());
}
