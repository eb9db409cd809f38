//! Integration tests for docr
//!
//! These tests verify the lookup pipeline end to end against a real
//! shell-script backend in a temporary directory: command composition,
//! process execution, output classification, disambiguation parsing,
//! caching, and the bounded asynchronous scheduler.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tokio::runtime::Handle;

use docr::backend::{BackendAdapter, EnvValue};
use docr::cache::{CacheKey, DocCache};
use docr::options::{self, ParseOutcome};
use docr::runner::CommandRunner;

const FAKEDOC_SCRIPT: &str = r#"#!/bin/sh
echo invoked >> "$DOCR_COUNT"
read -r sel
term="$1"
if [ -n "$sel" ]; then
  echo "content for $term option $sel"
  echo "width=$DOCR_COLS"
  exit 0
fi
case "$term" in
  sort)
    echo "1. std::sort Sorts a range"
    echo "2. std::ranges::sort Constrained sort"
    ;;
  ghost)
    echo "error: no entry for ghost"
    ;;
  slow)
    sleep 1
    echo "slow page"
    ;;
  empty)
    ;;
  *)
    echo "PAGE $term"
    echo "width=$DOCR_COLS"
    ;;
esac
"#;

/// Write the fake documentation tool into `dir` and build an adapter for it
fn fakedoc_adapter(dir: &Path) -> (Arc<BackendAdapter>, PathBuf) {
    let tool = dir.join("fakedoc");
    fs::write(&tool, FAKEDOC_SCRIPT).unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let counter = dir.join("count.log");
    fs::write(&counter, "").unwrap();

    let adapter = BackendAdapter::new("fakedoc", tool.to_string_lossy())
        .with_env(
            "DOCR_COUNT",
            EnvValue::Literal(counter.to_string_lossy().into_owned()),
        )
        .with_env("DOCR_COLS", EnvValue::Width)
        .with_exit_code_error(false)
        .with_error_patterns(vec![Regex::new("(?m)^error:").unwrap()])
        .with_selections(options::parse_numbered_options);

    (Arc::new(adapter), counter)
}

fn invocations(counter: &Path) -> usize {
    fs::read_to_string(counter).unwrap().lines().count()
}

fn runner(max_jobs: usize) -> (CommandRunner, tokio::sync::mpsc::UnboundedReceiver<docr::runner::Completion>) {
    CommandRunner::new(
        max_jobs,
        Arc::new(docr::runner::ShellSpawner),
        DocCache::new(),
        Handle::current(),
    )
}

#[tokio::test]
async fn test_disambiguation_roundtrip_with_real_processes() {
    let dir = tempfile::tempdir().unwrap();
    let (adapter, counter) = fakedoc_adapter(dir.path());
    let (runner, _events) = runner(2);

    let outcome = options::parse(&runner, &adapter, "sort", 80).unwrap();
    let ParseOutcome::Options(opts) = outcome else {
        panic!("expected options");
    };
    assert_eq!(opts.len(), 2);
    assert_eq!(opts[0].value, "std::sort");
    assert_eq!(opts[1].num, 2);

    // The piped selection answer reaches the backend's prompt.
    let lines = runner.run_sync(&adapter, "sort", Some(1), 80).unwrap();
    assert_eq!(lines[0], "content for sort option 1");
    assert!(runner.cache().contains(&CacheKey::new("sort", Some(1), 80)));

    // Cache idempotence: identical lookup, identical bytes, no new process.
    let before = invocations(&counter);
    let again = runner.run_sync(&adapter, "sort", Some(1), 80).unwrap();
    assert_eq!(lines, again);
    assert_eq!(invocations(&counter), before);
}

#[tokio::test]
async fn test_not_found_classification() {
    let dir = tempfile::tempdir().unwrap();
    let (adapter, _counter) = fakedoc_adapter(dir.path());
    let (runner, _events) = runner(2);

    let outcome = options::parse(&runner, &adapter, "ghost", 80).unwrap();
    assert_eq!(outcome, ParseOutcome::NotFound);
}

#[tokio::test]
async fn test_width_flows_into_the_environment() {
    let dir = tempfile::tempdir().unwrap();
    let (adapter, _counter) = fakedoc_adapter(dir.path());
    let (runner, _events) = runner(2);

    let lines = runner.run_sync(&adapter, "printf", None, 77).unwrap();
    assert_eq!(lines[0], "PAGE printf");
    assert_eq!(lines[1], "width=77");
}

#[tokio::test]
async fn test_empty_output_yields_uncached_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let (adapter, counter) = fakedoc_adapter(dir.path());
    let (runner, _events) = runner(2);

    let lines = runner.run_sync(&adapter, "empty", None, 80).unwrap();
    assert!(lines[0].contains("no output"));
    assert!(!runner.cache().contains(&CacheKey::new("empty", None, 80)));

    let _ = runner.run_sync(&adapter, "empty", None, 80).unwrap();
    assert_eq!(invocations(&counter), 2);
}

#[tokio::test]
async fn test_scheduler_queues_real_processes_beyond_the_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let (adapter, _counter) = fakedoc_adapter(dir.path());
    let (runner, mut events) = runner(1);

    runner.run_async(&adapter, "slow", None, 80);
    runner.run_async(&adapter, "printf", None, 80);
    runner.run_async(&adapter, "vector", None, 80);

    assert_eq!(runner.scheduler().running_len(), 1);
    assert_eq!(runner.scheduler().queued_len(), 2);

    for _ in 0..3 {
        let completion = tokio::time::timeout(Duration::from_secs(10), events.recv())
            .await
            .expect("completion within timeout")
            .expect("channel open");
        assert!(completion.result.is_ok());
    }
    assert_eq!(runner.scheduler().running_len(), 0);
    assert_eq!(runner.scheduler().queued_len(), 0);
}
