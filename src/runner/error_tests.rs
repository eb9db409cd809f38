use super::{BackendFailure, RunnerError};

#[test]
fn test_exit_code_failure_names_the_command() {
    let err = RunnerError::from(BackendFailure::ExitCode {
        exit_code: 16,
        command: "man 'frobnicate' 2>&1".into(),
    });
    let msg = err.to_string();
    assert!(msg.contains("16"));
    assert!(msg.contains("frobnicate"));
}

#[test]
fn test_pattern_failure_names_the_pattern() {
    let err = RunnerError::from(BackendFailure::Pattern {
        pattern: "No manual entry for".into(),
        command: "man 'x' 2>&1".into(),
    });
    assert!(err.to_string().contains("No manual entry for"));
}

#[test]
fn test_spawn_error_wraps_io_message() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "sh: not found");
    let err = RunnerError::spawn(&io);
    assert!(err.to_string().contains("sh: not found"));
}
