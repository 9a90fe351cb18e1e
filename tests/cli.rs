use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const PARTICIPANTS: &str = r#"
[participants]
Alice = "alice@x.com"
Bob = "bob@x.com"
Carol = "carol@x.com"
"#;

fn santa() -> Command {
    Command::new(env!("CARGO_BIN_EXE_secret-santa"))
}

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("santa.toml");
    fs::write(&path, body).unwrap();
    path
}

fn run_with(path: &Path, args: &[&str]) -> Output {
    santa().arg(path).args(args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn missing_config_argument_exits_with_status_one() {
    let output = santa().output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "Please specify a config file\n");
}

#[test]
fn unreadable_config_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    let output = run_with(&path, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        format!("Config file {} not readable\n", path.display())
    );
}

#[test]
fn missing_participants_key_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[general]\ndebug = true\n");
    let output = run_with(&path, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "Config file is missing key: participants\n");
}

#[test]
fn single_participant_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[participants]\nAlice = \"alice@x.com\"\n");
    let output = run_with(&path, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("at least 2 participants"));
}

#[test]
fn single_run_prints_pairs_and_draw_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, PARTICIPANTS);
    let output = run_with(&path, &["--debug"]);
    assert!(output.status.success());

    let text = stdout(&output);
    let pairs: Vec<&str> = text
        .lines()
        .filter(|line| line.contains(" is buying for "))
        .collect();
    let forward = [
        "Alice is buying for Bob",
        "Bob is buying for Carol",
        "Carol is buying for Alice",
    ];
    let backward = [
        "Alice is buying for Carol",
        "Bob is buying for Alice",
        "Carol is buying for Bob",
    ];
    assert!(pairs == forward || pairs == backward, "{pairs:?}");
    let last = text.lines().last().unwrap();
    assert!(last.starts_with("All done! It took "));
    assert!(last.ends_with(" draws to get a result"));
}

#[test]
fn same_seed_gives_same_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, PARTICIPANTS);
    let a = run_with(&path, &["--debug", "--seed", "1234"]);
    let b = run_with(&path, &["--debug", "--seed", "1234"]);
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn multiple_runs_report_statistics_without_sending() {
    let dir = tempfile::tempdir().unwrap();
    // Nothing listens on port 1; any send attempt would fail the run.
    let body = format!(
        "{PARTICIPANTS}
[email]
smtp_server = \"127.0.0.1\"
smtp_port = 1
from_address = \"santa@x.com\"
send_email = true

[general]
runs = 5
"
    );
    let path = write_config(&dir, &body);
    let output = run_with(&path, &[]);
    assert!(output.status.success());

    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Total number of runs    : 5");
    let average: f64 = lines[1]
        .trim_start_matches("Average number of draws : ")
        .parse()
        .unwrap();
    assert!(average >= 1.0);
    assert!(lines[1].contains('.'), "{}", lines[1]);
    let max: usize = lines[2]
        .trim_start_matches("Maximum number of draws : ")
        .parse()
        .unwrap();
    assert!(max >= 1);
    let seconds: f64 = lines[3]
        .trim_start_matches("Time taken              : ")
        .trim_end_matches('s')
        .parse()
        .unwrap();
    assert!(seconds >= 0.0);
}

#[test]
fn info_events_reach_stderr_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, PARTICIPANTS);
    let output = santa().arg(&path).env_remove("RUST_LOG").output().unwrap();
    assert!(output.status.success());

    let logs = String::from_utf8(output.stderr.clone()).unwrap();
    assert!(logs.contains("configuration loaded"), "{logs}");
    assert!(logs.contains("drawing assignments"), "{logs}");
    assert!(!stdout(&output).contains("configuration loaded"));
}

#[test]
fn runs_flag_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, PARTICIPANTS);
    let output = run_with(&path, &["--runs", "3"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Total number of runs    : 3\n"));
}

#[test]
fn transport_failure_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "{PARTICIPANTS}
[email]
smtp_server = \"127.0.0.1\"
smtp_port = 1
from_address = \"santa@x.com\"
send_email = true
"
    );
    let path = write_config(&dir, &body);
    let output = run_with(&path, &[]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.starts_with("Error sending email: "), "{text}");
    assert!(!text.contains("All done!"));
}
