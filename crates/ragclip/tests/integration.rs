use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn ragclip_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ragclip"))
}

struct TestEnv {
    _tmp: TempDir,
    root: PathBuf,
    config_path: PathBuf,
}

impl TestEnv {
    fn files_dir(&self) -> PathBuf {
        self.root.join("files")
    }

    fn query_file(&self) -> PathBuf {
        self.root.join("clipboard-in.txt")
    }

    fn prompt_file(&self) -> PathBuf {
        self.root.join("clipboard-out.txt")
    }
}

/// Three small documents, a config that points at them, and a
/// file-backed clipboard (`cat` to read, `sh -c 'cat > ...'` to write).
fn setup_test_env() -> TestEnv {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("alpha.txt"),
        "Alpha notes.\n\nThe build uses cargo and a Rust toolchain pinned to stable.",
    )
    .unwrap();
    fs::write(
        files_dir.join("beta.html"),
        "<html><head><style>p { color: red }</style></head><body>\
         <h1>Beta</h1><p>Python notebooks and machine learning experiments.</p></body></html>",
    )
    .unwrap();
    fs::write(
        files_dir.join("gamma.txt"),
        "Gamma runbook.\n\nKubernetes deployment goes through the staging cluster first.",
    )
    .unwrap();
    // Not on the extension allow-list.
    fs::write(files_dir.join("ignored.rs"), "fn main() {}").unwrap();

    let query_file = root.join("clipboard-in.txt");
    let prompt_file = root.join("clipboard-out.txt");

    let config_content = format!(
        r#"[db]
path = "{root}/data/ragclip.sqlite"

[sources]
directories = ["{root}/files"]

[retrieval]
top_k = 2

[clipboard]
read_command = ["cat", "{query}"]
write_command = ["sh", "-c", "cat > '{prompt}'"]
"#,
        root = root.display(),
        query = query_file.display(),
        prompt = prompt_file.display(),
    );

    let config_path = config_dir.join("ragclip.toml");
    fs::write(&config_path, config_content).unwrap();

    TestEnv {
        _tmp: tmp,
        root,
        config_path,
    }
}

fn command(config_path: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(ragclip_binary());
    cmd.arg("--config")
        .arg(config_path)
        .arg("--progress")
        .arg("off")
        .args(args);
    cmd
}

fn run_ragclip(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let output = command(config_path, args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ragclip binary: {}", e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_creates_database() {
    let env = setup_test_env();

    let (stdout, stderr, success) = run_ragclip(&env.config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(env.root.join("data/ragclip.sqlite").exists());

    let (_, _, again) = run_ragclip(&env.config_path, &["init"]);
    assert!(again, "second init failed (not idempotent)");
}

#[test]
fn test_index_then_rerun_is_unchanged() {
    let env = setup_test_env();

    let (stdout, stderr, success) = run_ragclip(&env.config_path, &["index"]);
    assert!(success, "index failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("scanned: 3 files"), "got: {}", stdout);
    assert!(stdout.contains("indexed: 3"), "got: {}", stdout);
    assert!(stdout.contains("ok"));

    let (stdout, _, success) = run_ragclip(&env.config_path, &["index"]);
    assert!(success);
    assert!(stdout.contains("indexed: 0"), "got: {}", stdout);
    assert!(stdout.contains("unchanged: 3"), "got: {}", stdout);
    assert!(stdout.contains("chunks written: 0"), "got: {}", stdout);
}

#[test]
fn test_modified_file_is_reindexed() {
    let env = setup_test_env();
    run_ragclip(&env.config_path, &["index"]);

    // Whitespace-only edits normalize to the same hash.
    fs::write(
        env.files_dir().join("alpha.txt"),
        "Alpha notes.   \r\n\r\n\r\nThe build uses cargo and a Rust toolchain pinned to stable.\n",
    )
    .unwrap();
    let (stdout, _, _) = run_ragclip(&env.config_path, &["index"]);
    assert!(stdout.contains("indexed: 0"), "got: {}", stdout);

    fs::write(env.files_dir().join("alpha.txt"), "Alpha notes, rewritten.").unwrap();
    let (stdout, _, _) = run_ragclip(&env.config_path, &["index"]);
    assert!(stdout.contains("indexed: 1"), "got: {}", stdout);
    assert!(stdout.contains("unchanged: 2"), "got: {}", stdout);
    assert!(stdout.contains("stale chunks removed: 1"), "got: {}", stdout);
}

#[test]
fn test_index_dry_run_writes_nothing() {
    let env = setup_test_env();

    let (stdout, _, success) = run_ragclip(&env.config_path, &["index", "--dry-run"]);
    assert!(success);
    assert!(stdout.contains("dry-run"));
    assert!(stdout.contains("would index: 3"), "got: {}", stdout);

    // A real pass afterwards still has everything to do.
    let (stdout, _, _) = run_ragclip(&env.config_path, &["index", "--limit", "1"]);
    assert!(stdout.contains("scanned: 1 files"), "got: {}", stdout);
    assert!(stdout.contains("indexed: 1"), "got: {}", stdout);
}

#[test]
fn test_ask_query_to_stdout() {
    let env = setup_test_env();
    run_ragclip(&env.config_path, &["index"]);

    let (stdout, stderr, success) = run_ragclip(
        &env.config_path,
        &["ask", "--query", "kubernetes deployment", "--stdout"],
    );
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("### CONTEXT FROM VECTOR DB"));
    assert!(stdout.contains("Query: kubernetes deployment"));
    assert!(stdout.contains("Kubernetes deployment goes through the staging cluster"));
    assert!(stdout.contains("--- END OF CONTEXT ---"));
    assert!(!env.prompt_file().exists());
}

#[test]
fn test_ask_reads_and_writes_clipboard() {
    let env = setup_test_env();
    run_ragclip(&env.config_path, &["index"]);
    fs::write(env.query_file(), "  which notebooks cover machine learning?\n").unwrap();

    let (stdout, stderr, success) = run_ragclip(&env.config_path, &["ask"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("copied to clipboard"));

    let prompt = fs::read_to_string(env.prompt_file()).unwrap();
    assert!(prompt.contains("Query: which notebooks cover machine learning?\n"));
    assert!(prompt.contains("Python notebooks and machine learning experiments."));
    assert!(!prompt.contains("color: red"));
}

#[test]
fn test_ask_with_refresh_indexes_first() {
    let env = setup_test_env();
    fs::write(env.query_file(), "cargo toolchain").unwrap();

    let (stdout, stderr, success) = run_ragclip(&env.config_path, &["ask", "--refresh"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    let prompt = fs::read_to_string(env.prompt_file()).unwrap();
    assert!(prompt.contains("Rust toolchain pinned to stable"));
}

#[test]
fn test_ask_empty_clipboard_is_reported() {
    let env = setup_test_env();
    run_ragclip(&env.config_path, &["index"]);
    fs::write(env.query_file(), " \n\t\n").unwrap();

    let (_, stderr, success) = run_ragclip(&env.config_path, &["ask"]);
    assert!(!success);
    assert!(stderr.contains("clipboard is empty"), "got: {}", stderr);
    assert!(!env.prompt_file().exists());
}

#[test]
fn test_ask_failing_clipboard_tool_counts_as_empty() {
    let env = setup_test_env();
    // No query file: the configured `cat` prints an error and exits 1,
    // like `xclip -o` and `wl-paste` do on an empty clipboard.
    let (_, stderr, success) = run_ragclip(&env.config_path, &["ask"]);
    assert!(!success);
    assert!(stderr.contains("clipboard is empty"), "got: {}", stderr);
    assert!(!env.prompt_file().exists());
}

#[test]
fn test_ask_empty_query_flag_names_the_flag() {
    let env = setup_test_env();

    let (_, stderr, success) =
        run_ragclip(&env.config_path, &["ask", "--query", " ", "--stdout"]);
    assert!(!success);
    assert!(stderr.contains("--query is empty"), "got: {}", stderr);
    assert!(!stderr.contains("clipboard"), "got: {}", stderr);
}

#[test]
fn test_listen_keeps_going_after_empty_clipboard() {
    let env = setup_test_env();

    let mut child = command(&env.config_path, &["listen"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"ask\nstatus\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "listen failed: {}", stderr);
    assert!(stderr.contains("clipboard is empty"), "got: {}", stderr);
    assert!(stdout.contains("tracked files: 0"), "got: {}", stdout);
}

#[test]
fn test_status_reports_missing_files() {
    let env = setup_test_env();
    run_ragclip(&env.config_path, &["index"]);
    fs::remove_file(env.files_dir().join("gamma.txt")).unwrap();

    let (stdout, _, success) = run_ragclip(&env.config_path, &["status"]);
    assert!(success);
    assert!(stdout.contains("vector store: sqlite"));
    assert!(stdout.contains("tracked files: 3"), "got: {}", stdout);
    assert!(stdout.contains("missing files: 1"), "got: {}", stdout);
    assert!(stdout.contains("gamma.txt"));
}

#[test]
fn test_listen_runs_stdin_commands() {
    let env = setup_test_env();
    fs::write(env.query_file(), "staging cluster").unwrap();

    let mut child = command(&env.config_path, &["listen"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"index\nbogus\nask\nstatus\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "listen failed: {}", stderr);
    assert!(stdout.contains("indexed: 3"), "got: {}", stdout);
    assert!(stdout.contains("tracked files: 3"), "got: {}", stdout);
    assert!(stderr.contains("Unknown command"), "got: {}", stderr);

    let prompt = fs::read_to_string(env.prompt_file()).unwrap();
    assert!(prompt.contains("staging cluster first"));
}

#[test]
fn test_invalid_config_fails() {
    let env = setup_test_env();
    fs::write(
        &env.config_path,
        concat!(
            "[db]\npath = \"x.sqlite\"\n\n",
            "[sources]\ndirectories = [\"/tmp\"]\n\n",
            "[chunking]\nsize = 10\noverlap = 10\n",
        ),
    )
    .unwrap();

    let (_, stderr, success) = run_ragclip(&env.config_path, &["status"]);
    assert!(!success);
    assert!(stderr.contains("chunking"), "got: {}", stderr);
}
