use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn run_interactive(dir: &Path, input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_upnext"))
        .env("UPNEXT_STORE_PATH", dir.join("storage.json"))
        .env("UPNEXT_CONFIG_PATH", dir.join("config.json"))
        .env("UPNEXT_DISABLE_NOTIFICATIONS", "1")
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn upnext");

    {
        let stdin = child.stdin.as_mut().expect("stdin available");
        stdin.write_all(input.as_bytes()).unwrap();
    }

    child.wait_with_output().expect("failed to wait on upnext")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn interactive_help_and_exit() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_interactive(dir.path(), "help\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
}

#[test]
fn interactive_invalid_command_keeps_running() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_interactive(dir.path(), "frobnicate\nadd \"still works\"\nquit\n");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: still works"));
}

#[test]
fn interactive_unterminated_quote_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_interactive(dir.path(), "add \"oops\nexit\n");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unterminated quote"));
}

#[test]
fn interactive_cursor_survives_between_commands() {
    let dir = tempfile::tempdir().unwrap();
    let script = [
        "next --json",
        "add \"tomorrow's task\"",
        "list --json",
        "prev --json",
        "list --json",
        "today --json",
    ]
    .join("\n");
    let output = run_interactive(dir.path(), &format!("{script}\n"));

    assert!(output.status.success());
    let values = json_lines(&output);
    assert_eq!(values.len(), 5);

    assert_eq!(values[0]["today"], false);
    let tomorrow = values[1].clone();
    assert_eq!(tomorrow["date"], values[0]["date"]);
    assert_eq!(tomorrow["tasks"][0]["text"], "tomorrow's task");
    assert_eq!(values[2]["today"], true);
    assert_eq!(values[3]["tasks"].as_array().unwrap().len(), 0);
    assert_eq!(values[4]["today"], true);
}
