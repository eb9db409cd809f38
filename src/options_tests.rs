use std::sync::Arc;

use tokio::runtime::Handle;

use super::*;
use crate::cache::DocCache;
use crate::runner::CommandRunner;
use crate::testing::{FakeSpawner, plain_adapter, selection_adapter};

#[test]
fn test_parse_numbered_options_extracts_num_text_value() {
    let raw = "header\n1. std::sort Sorts a range\n2. std::ranges::sort Constrained sort\ntrailer";
    let options = parse_numbered_options(raw);
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].num, 1);
    assert_eq!(options[0].value, "std::sort");
    assert_eq!(options[0].text, "std::sort Sorts a range");
    assert_eq!(options[1].num, 2);
    assert_eq!(options[1].value, "std::ranges::sort");
}

#[test]
fn test_parse_numbered_options_keeps_backend_order() {
    let raw = "3. third\n1. first\n2. second";
    let nums: Vec<u32> = parse_numbered_options(raw).iter().map(|o| o.num).collect();
    assert_eq!(nums, [3, 1, 2]);
}

#[test]
fn test_parse_numbered_options_ignores_prose() {
    let raw = "The version is 2.1. See also:\n  not an option\n10.5 something";
    assert!(parse_numbered_options(raw).is_empty());
}

fn runner_with(spawner: FakeSpawner) -> (CommandRunner, Arc<FakeSpawner>) {
    let spawner = Arc::new(spawner);
    let (runner, _events) =
        CommandRunner::new(2, spawner.clone(), DocCache::new(), Handle::current());
    (runner, spawner)
}

#[tokio::test]
async fn test_parse_yields_disambiguation_options() {
    let (runner, _) = runner_with(
        FakeSpawner::new().with_response("sort", "1. std::sort x\n2. std::ranges::sort y", 0),
    );
    let adapter = Arc::new(selection_adapter("fake"));

    let outcome = parse(&runner, &adapter, "sort", 80).unwrap();
    match outcome {
        ParseOutcome::Options(options) => {
            assert_eq!(options.len(), 2);
            assert_eq!(options[1].value, "std::ranges::sort");
        }
        ParseOutcome::NotFound => panic!("expected options"),
    }
}

#[tokio::test]
async fn test_parse_zero_options_is_direct_content() {
    let (runner, _) = runner_with(
        FakeSpawner::new().with_response("vector", "std::vector\n\nA sequence container.", 0),
    );
    let adapter = Arc::new(selection_adapter("fake"));

    let outcome = parse(&runner, &adapter, "vector", 80).unwrap();
    assert_eq!(outcome, ParseOutcome::Options(Vec::new()));
}

#[tokio::test]
async fn test_parse_zero_options_with_marker_is_not_found() {
    let (runner, _) = runner_with(
        // No numbered options and no adapter error pattern, but a generic
        // failure marker in the output.
        FakeSpawner::new().with_response("missing", "nothing found: no entry available", 0),
    );
    let adapter = Arc::new(selection_adapter("fake"));

    let outcome = parse(&runner, &adapter, "missing", 80).unwrap();
    assert_eq!(outcome, ParseOutcome::NotFound);
}

#[tokio::test]
async fn test_parse_backend_error_pattern_is_not_found() {
    let (runner, _) = runner_with(
        FakeSpawner::new().with_response("missing", "error: documentation not available", 0),
    );
    let adapter = Arc::new(selection_adapter("fake"));

    let outcome = parse(&runner, &adapter, "missing", 80).unwrap();
    assert_eq!(outcome, ParseOutcome::NotFound);
}

#[tokio::test]
async fn test_existence_probe_runs_once_per_query() {
    let (runner, spawner) =
        runner_with(FakeSpawner::new().with_response("printf", "PRINTF(1)\nbody", 0));
    let adapter = Arc::new(plain_adapter("fake"));

    assert_eq!(
        parse(&runner, &adapter, "printf", 80).unwrap(),
        ParseOutcome::Options(Vec::new())
    );
    assert_eq!(
        parse(&runner, &adapter, "printf", 120).unwrap(),
        ParseOutcome::Options(Vec::new())
    );
    assert_eq!(spawner.blocking_spawns(), 1);
}

#[tokio::test]
async fn test_negative_existence_is_cached_too() {
    let (runner, spawner) =
        runner_with(FakeSpawner::new().with_response("ghost", "not here", 7));
    let adapter = Arc::new(plain_adapter("fake"));

    assert_eq!(
        parse(&runner, &adapter, "ghost", 80).unwrap(),
        ParseOutcome::NotFound
    );
    assert_eq!(
        parse(&runner, &adapter, "ghost", 80).unwrap(),
        ParseOutcome::NotFound
    );
    assert_eq!(spawner.blocking_spawns(), 1);
}

#[tokio::test]
async fn test_spawn_failure_propagates() {
    let (runner, _) = runner_with(FakeSpawner::new().with_spawn_failure());
    let adapter = Arc::new(plain_adapter("fake"));
    assert!(parse(&runner, &adapter, "anything", 80).is_err());
}
