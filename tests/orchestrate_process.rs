#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sigbridge::config::{ProcessOptions, RunOptions};
use sigbridge::errors::{BridgeError, ErrorKind};
use sigbridge::exec::{
    cancel_pair, drain_streams, launch, CancelReason, NullSink, OutputSink,
};
use sigbridge::exit_status;
use sigbridge::invocation::build_invocation;
use sigbridge::orchestrator::{orchestrate, orchestrate_with_cancel};
use sigbridge::result::ResultStatus;
use sigbridge::types::{StdinMode, StreamKind};
use sigbridge_test_utils::builders::LaunchConfigBuilder;
use sigbridge_test_utils::sink::RecordingSink;
use sigbridge_test_utils::worker::FakeWorker;

type TestResult = Result<(), Box<dyn Error>>;

/// Script prologue that records the worker's pid next to the script.
/// Later `exec`s keep the same pid.
const RECORD_PID: &str = "echo $$ > \"$(dirname \"$0\")/worker.pid\"\n";

/// `kill -0` succeeds for running and zombie (unreaped) processes alike.
fn assert_reaped(pid: u32) {
    let status = std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .expect("running kill -0");
    assert!(!status.success(), "worker pid {pid} still exists");
}

/// Fails the stdout reader on its first line.
struct PanickingSink;

impl OutputSink for PanickingSink {
    fn stdout_line(&self, line: &str) {
        panic!("sink rejected line {line:?}");
    }

    fn stderr_line(&self, _line: &str) {}
}

fn quiet() -> ProcessOptions {
    ProcessOptions {
        stdin: StdinMode::Null,
        ..ProcessOptions::default()
    }
}

#[tokio::test]
async fn successful_capture_is_reported_with_exit_code() -> TestResult {
    init_tracing();
    let worker = FakeWorker::printing(
        &[
            "Conexion establecida en COM8 a 115200 baudios.",
            "Firma guardada en: firmas/firma_1.png",
            r#"{"status": "success", "message": "Captura completada"}"#,
        ],
        0,
    )?;
    let sink = RecordingSink::new();

    let outcome = with_timeout(orchestrate(&worker.launch_config(), Arc::new(sink.clone()))).await?;

    assert_eq!(outcome.result.status, ResultStatus::Success);
    assert_eq!(outcome.result.message, "Captura completada");
    assert_eq!(outcome.exit_code, Some(0));
    assert!(outcome.is_consistent());
    assert_eq!(exit_status(&outcome), 0);

    // Every stdout line is mirrored live, including the result line.
    assert_eq!(sink.stdout_lines().len(), 3);
    assert_eq!(sink.stdout_lines()[0], "Conexion establecida en COM8 a 115200 baudios.");
    Ok(())
}

#[tokio::test]
async fn worker_reported_error_is_an_outcome_not_a_failure() -> TestResult {
    init_tracing();
    // Mirrors the capture wrapper: print the error document, then re-raise.
    let worker = FakeWorker::new(
        r#"
echo "Error: No se pudo conectar a COM8."
echo '{"status": "error", "message": "could not open port COM8"}'
echo "Traceback (most recent call last):" >&2
echo "serial.SerialException: could not open port" >&2
exit 1
"#,
    )?;
    let sink = RecordingSink::new();

    let outcome = with_timeout(orchestrate_with_cancel(
        &worker.launch_config(),
        &quiet(),
        RunOptions::default(),
        Arc::new(sink.clone()),
        None,
    ))
    .await?;

    assert_eq!(outcome.result.status, ResultStatus::Error);
    assert_eq!(outcome.result.message, "could not open port COM8");
    assert_eq!(outcome.exit_code, Some(1));
    assert!(outcome.is_consistent());
    assert_eq!(exit_status(&outcome), 1);
    assert_eq!(sink.stderr_lines().len(), 2);
    Ok(())
}

#[tokio::test]
async fn exit_code_and_status_are_reported_side_by_side() -> TestResult {
    let worker = FakeWorker::new(
        r#"
echo '{"status":"success","message":"done"}'
exit 3
"#,
    )?;

    let outcome = with_timeout(orchestrate_with_cancel(
        &worker.launch_config(),
        &quiet(),
        RunOptions::default(),
        Arc::new(NullSink),
        None,
    ))
    .await?;

    assert_eq!(outcome.result.status, ResultStatus::Success);
    assert_eq!(outcome.exit_code, Some(3));
    assert!(!outcome.is_consistent());
    Ok(())
}

#[tokio::test]
async fn worker_receives_arguments_in_order() -> TestResult {
    let worker = FakeWorker::new(
        r#"
for arg in "$@"; do
  printf '%s\n' "$arg"
done
echo '{"status":"success","message":"args"}'
"#,
    )?;
    let cfg = worker.builder().port("/dev/ttyUSB0").interactive(false).build();
    let sink = RecordingSink::new();

    with_timeout(orchestrate_with_cancel(
        &cfg,
        &quiet(),
        RunOptions::default(),
        Arc::new(sink.clone()),
        None,
    ))
    .await?;

    let inv = build_invocation(&cfg);
    let mut expected: Vec<String> = inv.args()[1..]
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    expected.push(r#"{"status":"success","message":"args"}"#.to_string());

    assert_eq!(sink.stdout_lines(), expected);
    assert_eq!(sink.stdout_lines()[1], "/dev/ttyUSB0");
    assert_eq!(sink.stdout_lines()[7], "false");
    Ok(())
}

#[tokio::test]
async fn stderr_content_never_changes_the_result() -> TestResult {
    let quiet_worker = FakeWorker::printing(&[r#"{"status":"success","message":"same"}"#], 0)?;
    let noisy_worker = FakeWorker::new(
        r#"
echo '{"status":"error","message":"stderr decoy"}' >&2
echo 'garbage on stderr' >&2
echo '{"status":"success","message":"same"}'
echo '' >&2
"#,
    )?;

    let a = with_timeout(orchestrate_with_cancel(
        &quiet_worker.launch_config(),
        &quiet(),
        RunOptions::default(),
        Arc::new(NullSink),
        None,
    ))
    .await?;
    let b = with_timeout(orchestrate_with_cancel(
        &noisy_worker.launch_config(),
        &quiet(),
        RunOptions::default(),
        Arc::new(NullSink),
        None,
    ))
    .await?;

    assert_eq!(a.result, b.result);
    Ok(())
}

#[tokio::test]
async fn heavy_output_on_both_streams_does_not_deadlock() -> TestResult {
    init_tracing();
    // Well beyond a 64 KiB pipe buffer on each stream.
    let worker = FakeWorker::new(
        r#"
i=0
while [ $i -lt 3000 ]; do
  echo "stderr noise $i xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx" >&2
  echo "stdout progress $i yyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyy"
  i=$((i+1))
done
echo '{"status":"success","message":"survived"}'
"#,
    )?;
    let sink = RecordingSink::new();

    let outcome = with_timeout(orchestrate_with_cancel(
        &worker.launch_config(),
        &quiet(),
        RunOptions::default(),
        Arc::new(sink.clone()),
        None,
    ))
    .await?;

    assert_eq!(outcome.result.message, "survived");
    assert_eq!(sink.stdout_lines().len(), 3001);
    assert_eq!(sink.stderr_lines().len(), 3000);
    assert!(sink.stdout_lines()[2999].starts_with("stdout progress 2999 "));
    Ok(())
}

#[tokio::test]
async fn no_output_is_empty_output_error() -> TestResult {
    let worker = FakeWorker::new("echo ''\necho '   '\nexit 0\n")?;

    let err = with_timeout(orchestrate_with_cancel(
        &worker.launch_config(),
        &quiet(),
        RunOptions::default(),
        Arc::new(NullSink),
        None,
    ))
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptyOutput);
    Ok(())
}

#[tokio::test]
async fn crash_without_result_line_is_malformed() -> TestResult {
    let worker = FakeWorker::printing(&["Enviando orden de captura...", "not json"], 2)?;

    let err = with_timeout(orchestrate_with_cancel(
        &worker.launch_config(),
        &quiet(),
        RunOptions::default(),
        Arc::new(NullSink),
        None,
    ))
    .await
    .unwrap_err();

    match err {
        BridgeError::MalformedResult { line, .. } => assert_eq!(line, "not json"),
        other => panic!("expected MalformedResult, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn missing_executable_is_launch_error() {
    let cfg = LaunchConfigBuilder::new()
        .executable("/definitely/not/a/real/python")
        .build();

    let err = orchestrate_with_cancel(
        &cfg,
        &quiet(),
        RunOptions::default(),
        Arc::new(NullSink),
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Launch);
    match err {
        BridgeError::Launch { program, source } => {
            assert_eq!(program, "/definitely/not/a/real/python");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected Launch, got {other:?}"),
    }
}

#[tokio::test]
async fn timeout_kills_worker_and_reports_cancelled() -> TestResult {
    init_tracing();
    let worker = FakeWorker::new(&format!("{RECORD_PID}echo 'waiting for pad'\nexec sleep 30\n"))?;
    let run = RunOptions {
        timeout: Some(Duration::from_millis(300)),
    };

    let started = Instant::now();
    let err = with_timeout(orchestrate_with_cancel(
        &worker.launch_config(),
        &quiet(),
        run,
        Arc::new(NullSink),
        None,
    ))
    .await
    .unwrap_err();

    match err {
        BridgeError::Cancelled(CancelReason::TimedOut(d)) => {
            assert_eq!(d, Duration::from_millis(300))
        }
        other => panic!("expected Cancelled(TimedOut), got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_reaped(worker.read_pid()?);
    Ok(())
}

#[tokio::test]
async fn explicit_cancel_kills_worker() -> TestResult {
    let worker = FakeWorker::new(&format!("{RECORD_PID}exec sleep 30\n"))?;
    let (handle, signal) = cancel_pair();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.cancel();
    });

    let err = with_timeout(orchestrate_with_cancel(
        &worker.launch_config(),
        &quiet(),
        RunOptions::default(),
        Arc::new(NullSink),
        Some(signal),
    ))
    .await
    .unwrap_err();

    assert!(matches!(err, BridgeError::Cancelled(CancelReason::Requested)));
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_reaped(worker.read_pid()?);
    Ok(())
}

#[tokio::test]
async fn failed_drain_kills_and_reaps_worker() -> TestResult {
    init_tracing();
    let worker = FakeWorker::new(&format!("{RECORD_PID}echo 'boom'\nexec sleep 30\n"))?;

    let started = Instant::now();
    let err = with_timeout(orchestrate_with_cancel(
        &worker.launch_config(),
        &quiet(),
        RunOptions::default(),
        Arc::new(PanickingSink),
        None,
    ))
    .await
    .unwrap_err();

    match &err {
        BridgeError::StreamRead { stream, .. } => assert_eq!(*stream, StreamKind::Stdout),
        other => panic!("expected StreamRead, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_reaped(worker.read_pid()?);
    Ok(())
}

#[tokio::test]
async fn dropped_cancel_handle_does_not_cancel() -> TestResult {
    let worker = FakeWorker::new(
        "sleep 1\necho '{\"status\":\"success\",\"message\":\"late\"}'\n",
    )?;
    let (handle, signal) = cancel_pair();
    drop(handle);

    let outcome = with_timeout(orchestrate_with_cancel(
        &worker.launch_config(),
        &quiet(),
        RunOptions::default(),
        Arc::new(NullSink),
        Some(signal),
    ))
    .await?;

    assert_eq!(outcome.result.message, "late");
    Ok(())
}

#[tokio::test]
async fn env_and_working_dir_are_applied() -> TestResult {
    let worker = FakeWorker::new(
        r#"
echo "$SIGBRIDGE_TEST_VAR"
pwd -P
echo '{"status":"success","message":"env"}'
"#,
    )?;
    let mut env = BTreeMap::new();
    env.insert("SIGBRIDGE_TEST_VAR".to_string(), "hello pad".to_string());
    let options = ProcessOptions {
        working_dir: Some(worker.dir().to_path_buf()),
        env,
        stdin: StdinMode::Null,
    };
    let sink = RecordingSink::new();

    with_timeout(orchestrate_with_cancel(
        &worker.launch_config(),
        &options,
        RunOptions::default(),
        Arc::new(sink.clone()),
        None,
    ))
    .await?;

    let lines = sink.stdout_lines();
    assert_eq!(lines[0], "hello pad");
    let expected_dir = std::fs::canonicalize(worker.dir())?;
    assert_eq!(lines[1], expected_dir.to_string_lossy());
    Ok(())
}

#[tokio::test]
async fn process_handle_reports_exit_code_once_waited() -> TestResult {
    let worker = FakeWorker::printing(&["bye"], 4)?;
    let inv = build_invocation(&worker.launch_config());

    let mut handle = launch(&inv, &quiet())?;
    assert!(handle.pid().is_some());
    assert_eq!(handle.exit_code(), None);

    let buffer = with_timeout(drain_streams(&mut handle, Arc::new(NullSink))).await?;
    assert_eq!(buffer.lines(), ["bye"]);

    let code = with_timeout(handle.wait()).await?;
    assert_eq!(code, Some(4));
    assert_eq!(handle.exit_code(), Some(Some(4)));

    // Waiting again returns the recorded code.
    assert_eq!(handle.wait().await?, Some(4));
    Ok(())
}
