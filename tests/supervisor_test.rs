//! Integration tests for build supervision
//!
//! Runs fake builder scripts through [`BuildSupervisor`] and checks what
//! reaches the progress display and the error report.

#![cfg(unix)]

mod common;

use common::{SharedBuffer, TestWorkspace, SAMPLE_PLAN};
use image_builder::core::progress::{
    DebugProgressBar, PlainProgressBar, ProgressBar, ProgressLevel, TerminalProgressBar,
};
use image_builder::error::{BuildError, StatusError};
use image_builder::infra::supervisor::BuildJob;

fn job(workspace: &TestWorkspace) -> BuildJob {
    BuildJob::new(
        SAMPLE_PLAN.as_bytes().to_vec(),
        workspace.path().join("store"),
        workspace.path().join("output"),
    )
    .with_export("qcow2")
}

#[tokio::test]
async fn test_live_progress_reaches_terminal_tree() {
    let workspace = TestWorkspace::new();
    let supervisor = workspace.fake_builder(
        r#"printf '\036{"progress": {"name": "x", "done": 0, "total": 5}}\n' >&3
exit 0"#,
    );
    let terminal = TerminalProgressBar::with_writer(SharedBuffer::new());
    let pb = ProgressBar::Terminal(terminal);

    supervisor.run(&job(&workspace), &pb).await.unwrap();

    let ProgressBar::Terminal(terminal) = &pb else {
        unreachable!()
    };
    assert_eq!(terminal.sub_progress(), vec![ProgressLevel::new("x", 0, 5)]);
    assert_eq!(terminal.sub_progress()[0].done, 1);
    assert_eq!(terminal.sub_progress()[0].total, 6);
}

#[tokio::test]
async fn test_live_run_passes_monitor_arguments_and_plan() {
    let workspace = TestWorkspace::new();
    let supervisor = workspace.fake_builder("exit 0");
    let pb = ProgressBar::Debug(DebugProgressBar::with_writer(SharedBuffer::new()));

    supervisor
        .run(&job(&workspace).with_export("vpc"), &pb)
        .await
        .unwrap();

    let store = workspace.path().join("store").display().to_string();
    let output = workspace.path().join("output").display().to_string();
    assert_eq!(
        workspace.builder_args(),
        [
            "--store",
            store.as_str(),
            "--output-directory",
            output.as_str(),
            "--monitor=JSONSeqMonitor",
            "--monitor-fd=3",
            "-",
            "--export",
            "qcow2",
            "--export",
            "vpc",
        ]
    );
    assert_eq!(workspace.read_file("plan.json"), SAMPLE_PLAN);
}

#[tokio::test]
async fn test_messages_are_shown_and_traces_are_not() {
    let workspace = TestWorkspace::new();
    let supervisor = workspace.fake_builder(
        r#"printf '\036{"message": "Starting module org.osbuild.rpm"}\n' >&3
printf '\036{"trace": "rpm: installing kernel"}\n' >&3
printf '\036{"progress": {"name": "pipelines", "done": 1, "total": 4, "progress": {"name": "stages", "done": 2, "total": 7}}}\n' >&3"#,
    );
    let buf = SharedBuffer::new();
    let pb = ProgressBar::Debug(DebugProgressBar::with_writer(buf.clone()));

    supervisor.run(&job(&workspace), &pb).await.unwrap();

    assert_eq!(
        buf.contents(),
        "msg: Starting module org.osbuild.rpm\n[1 / 4] pipelines\n  [2 / 7] stages\n"
    );
}

#[tokio::test]
async fn test_failure_carries_trace_log() {
    let workspace = TestWorkspace::new();
    let supervisor = workspace.fake_builder(
        r#"printf '\036{"message": "Building"}\n' >&3
printf '\036{"trace": "boom"}\n' >&3
exit 1"#,
    );
    let pb = ProgressBar::Debug(DebugProgressBar::with_writer(SharedBuffer::new()));

    let err = supervisor.run(&job(&workspace), &pb).await.unwrap_err();

    assert!(matches!(err, BuildError::ProcessFailed { .. }));
    assert_eq!(err.trace(), ["Building", "boom"]);
    let report = err.to_string();
    assert!(report.starts_with("build process failed: "));
    assert!(report.ends_with("\nLog:\nBuilding\nboom"));
}

#[tokio::test]
async fn test_malformed_record_is_an_error() {
    let workspace = TestWorkspace::new();
    let supervisor = workspace.fake_builder(r"printf '\036not json\n' >&3");
    let pb = ProgressBar::Debug(DebugProgressBar::with_writer(SharedBuffer::new()));

    let err = supervisor.run(&job(&workspace), &pb).await.unwrap_err();

    assert!(matches!(
        err,
        BuildError::Status(StatusError::Decode { ref record, .. }) if record == "not json"
    ));
}

#[tokio::test]
async fn test_plain_backend_runs_builder_directly() {
    let workspace = TestWorkspace::new();
    let supervisor = workspace.fake_builder("exit 0");
    let buf = SharedBuffer::new();
    let pb = ProgressBar::Plain(PlainProgressBar::with_writer(buf.clone()));

    supervisor.run(&job(&workspace), &pb).await.unwrap();

    let args = workspace.builder_args();
    assert!(!args.iter().any(|a| a.starts_with("--monitor")));
    assert_eq!(args.last().map(String::as_str), Some("qcow2"));
    assert_eq!(workspace.read_file("plan.json"), SAMPLE_PLAN);
    assert_eq!(buf.contents(), "");
}

#[tokio::test]
async fn test_plain_backend_reports_exit_status() {
    let workspace = TestWorkspace::new();
    let supervisor = workspace.fake_builder("exit 3");
    let pb = ProgressBar::Plain(PlainProgressBar::with_writer(SharedBuffer::new()));

    let err = supervisor.run(&job(&workspace), &pb).await.unwrap_err();

    match err {
        BuildError::Exited(status) => assert_eq!(status.code(), Some(3)),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_extra_environment_reaches_builder() {
    let workspace = TestWorkspace::new();
    let supervisor = workspace.fake_builder(&format!(
        "printf '%s' \"$FAKE_SETTING\" > '{}/env.txt'",
        workspace.path().display()
    ));
    let pb = ProgressBar::Debug(DebugProgressBar::with_writer(SharedBuffer::new()));

    let job = job(&workspace)
        .with_env("FAKE_SETTING=enabled")
        .with_env("not-an-entry");
    supervisor.run(&job, &pb).await.unwrap();

    assert_eq!(workspace.read_file("env.txt"), "enabled");
}
