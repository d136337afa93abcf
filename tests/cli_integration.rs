// CLI integration tests for the trim walk, prompt, and exit codes.
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_tailtrim");
    Command::new(exe)
}

fn run_with_root(root: &Path, extra: &[&str]) -> Output {
    cmd()
        .arg(root)
        .args(extra)
        .stdin(Stdio::null())
        .output()
        .expect("run")
}

fn parse_error_json(output: &[u8]) -> Value {
    let text = String::from_utf8_lossy(output);
    let line = text.lines().last().expect("json line");
    serde_json::from_str(line).expect("valid json")
}

fn seed_tree(root: &Path) {
    fs::create_dir_all(root.join("a").join("b")).expect("mkdir");
    fs::write(root.join("top.samples"), "1 0\n0 1\n1 1\n").expect("write");
    fs::write(root.join("a").join("b").join("deep.samples"), "x\ny\n").expect("write");
    fs::write(root.join("a").join("notes.txt"), "keep\nme\n").expect("write");
    fs::write(root.join("a").join("empty.samples"), "").expect("write");
}

#[test]
fn trims_matching_files_and_reports_progress() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    seed_tree(root);

    let out = run_with_root(root, &[]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    assert_eq!(fs::read_to_string(root.join("top.samples")).unwrap(), "1 0\n0 1\n");
    assert_eq!(
        fs::read_to_string(root.join("a").join("b").join("deep.samples")).unwrap(),
        "x\n"
    );
    assert_eq!(fs::read_to_string(root.join("a").join("notes.txt")).unwrap(), "keep\nme\n");
    assert_eq!(fs::read(root.join("a").join("empty.samples")).unwrap(), b"");

    let stdout = String::from_utf8(out.stdout).expect("utf8");
    let progress: Vec<&str> = stdout
        .lines()
        .filter(|line| line.starts_with("processing file: "))
        .collect();
    assert_eq!(progress.len(), 3);
    assert!(progress.iter().any(|line| line.ends_with("top.samples")));
    assert!(!stdout.contains("notes.txt"));
    assert_eq!(
        stdout.lines().last(),
        Some("processing complete: 3 matched, 2 trimmed, 1 empty")
    );
}

#[test]
fn second_run_removes_another_line() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("r.samples");
    fs::write(&path, "a\nb\nc\n").expect("write");

    assert!(run_with_root(temp.path(), &[]).status.success());
    assert!(run_with_root(temp.path(), &[]).status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\n");
}

#[test]
fn custom_suffix_selects_other_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed_tree(temp.path());

    let out = run_with_root(temp.path(), &["--suffix", ".txt"]);
    assert!(out.status.success());
    assert_eq!(
        fs::read_to_string(temp.path().join("a").join("notes.txt")).unwrap(),
        "keep\n"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("top.samples")).unwrap(),
        "1 0\n0 1\n1 1\n"
    );
}

#[test]
fn dry_run_leaves_files_untouched() {
    let temp = tempfile::tempdir().expect("tempdir");
    seed_tree(temp.path());

    let out = run_with_root(temp.path(), &["--dry-run"]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).expect("utf8");
    assert_eq!(stdout.lines().filter(|l| l.starts_with("would trim: ")).count(), 3);
    assert_eq!(
        fs::read_to_string(temp.path().join("top.samples")).unwrap(),
        "1 0\n0 1\n1 1\n"
    );
}

#[test]
fn prompts_for_root_on_stdin() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("p.samples");
    fs::write(&path, "a\nb\n").expect("write");

    let mut child = cmd()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    {
        let mut stdin = child.stdin.take().expect("stdin");
        writeln!(stdin, "{}", temp.path().display()).expect("write stdin");
    }
    let out = child.wait_with_output().expect("wait");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).expect("utf8");
    assert!(stdout.starts_with("Directory path: "));
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\n");
}

#[test]
fn empty_prompt_answer_is_usage_error() {
    let out = cmd().stdin(Stdio::null()).output().expect("run");
    assert_eq!(out.status.code().unwrap(), 2);
    let err = parse_error_json(&out.stderr);
    assert_eq!(err["error"]["kind"], "Usage");
}

#[test]
fn missing_root_exit_code_and_no_changes() {
    let temp = tempfile::tempdir().expect("tempdir");
    let sibling = temp.path().join("r.samples");
    fs::write(&sibling, "a\nb\n").expect("write");

    let out = run_with_root(&temp.path().join("absent"), &[]);
    assert_eq!(out.status.code().unwrap(), 3);
    let err = parse_error_json(&out.stderr);
    assert_eq!(err["error"]["kind"], "NotFound");
    assert!(err["error"]["path"].as_str().unwrap().ends_with("absent"));
    assert_eq!(fs::read_to_string(&sibling).unwrap(), "a\nb\n");
    assert!(!String::from_utf8_lossy(&out.stdout).contains("processing complete"));
}

#[test]
fn file_root_is_usage_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = temp.path().join("f.samples");
    fs::write(&file, "a\nb\n").expect("write");

    let out = run_with_root(&file, &[]);
    assert_eq!(out.status.code().unwrap(), 2);
    assert_eq!(fs::read_to_string(&file).unwrap(), "a\nb\n");
}

#[test]
fn invalid_utf8_aborts_with_encoding_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let bad = temp.path().join("bad.samples");
    fs::write(&bad, b"a\n\xff\n").expect("write");

    let out = run_with_root(temp.path(), &[]);
    assert_eq!(out.status.code().unwrap(), 5);
    let err = parse_error_json(&out.stderr);
    assert_eq!(err["error"]["kind"], "Encoding");
    assert!(err["error"]["hint"].is_string());
    assert_eq!(fs::read(&bad).unwrap(), b"a\n\xff\n");
}

#[test]
fn unknown_flag_is_usage_error() {
    let out = cmd().arg("--bogus").stdin(Stdio::null()).output().expect("run");
    assert_eq!(out.status.code().unwrap(), 2);
}

#[cfg(unix)]
#[test]
fn dangling_symlink_stops_run_and_keeps_earlier_trims() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    fs::create_dir(root.join("n")).expect("mkdir");
    let files = [
        root.join("a.samples"),
        root.join("b.samples"),
        root.join("n").join("c.samples"),
    ];
    for path in &files {
        fs::write(path, "1\n2\n").expect("write");
    }
    let dangling = root.join("n").join("dangling.samples");
    std::os::unix::fs::symlink(root.join("missing"), &dangling).expect("symlink");

    let out = run_with_root(root, &[]);
    assert_eq!(out.status.code().unwrap(), 3);
    let err = parse_error_json(&out.stderr);
    assert_eq!(err["error"]["kind"], "NotFound");
    assert_eq!(err["error"]["path"], dangling.display().to_string());

    let stdout = String::from_utf8(out.stdout).expect("utf8");
    let processed: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.strip_prefix("processing file: "))
        .collect();
    assert_eq!(processed.last().copied(), Some(dangling.to_str().unwrap()));
    assert!(!stdout.contains("processing complete"));
    for path in &files {
        let expected = if processed.contains(&path.to_str().unwrap()) {
            "1\n"
        } else {
            "1\n2\n"
        };
        assert_eq!(fs::read_to_string(path).unwrap(), expected);
    }
}

#[test]
fn color_always_renders_text_errors_off_a_terminal() {
    let temp = tempfile::tempdir().expect("tempdir");
    let out = run_with_root(&temp.path().join("absent"), &["--color", "always"]);
    assert_eq!(out.status.code().unwrap(), 3);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("\u{1b}[31merror:\u{1b}[0m"));
    assert!(stderr.contains("hint:"));
}
