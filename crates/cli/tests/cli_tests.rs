// Integration tests for the `eodsweep` binary: exit codes, JSON output, config discovery.
// Run with: cargo test -p eodsweep-cli --test cli_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self { dir: tempfile::tempdir().unwrap() };
        fs::create_dir_all(ws.root()).unwrap();
        fs::create_dir_all(ws.path("xdg")).unwrap();
        ws
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn root(&self) -> PathBuf {
        self.path("root")
    }

    fn report(&self) -> PathBuf {
        self.path("eod_metadata.csv")
    }

    fn touch(&self, rel: &str) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"eod").unwrap();
    }

    fn manifest(&self, rel: &str, inputs: &[&str]) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::json!([{ "inputs": inputs }]).to_string()).unwrap();
    }

    /// The binary, isolated from the user's config and environment.
    fn eodsweep(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_eodsweep"));
        cmd.current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.path("xdg"))
            .env("HOME", self.dir.path())
            .env("RUST_LOG", "info")
            .env_remove("EODSWEEP_CONFIG")
            .env_remove("EODSWEEP_REPORT");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.eodsweep().args(args).output().expect("spawn eodsweep")
    }
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

fn code(output: &Output) -> i32 {
    output.status.code().expect("exited normally")
}

// ---------------------------------------------------------------------------
// scan
// ---------------------------------------------------------------------------

#[test]
fn scan_json_reports_summary_and_writes_report() {
    let ws = Workspace::new();
    ws.touch("a.eod");
    ws.touch("nested/b.eod");
    ws.manifest("jobs/nightly.runspec.json", &["a.eod", "c.eod"]);

    let out = ws.run(&["scan", s(&ws.root()), "--report", s(&ws.report()), "--json"]);
    assert_eq!(code(&out), 0, "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let doc = json(&out);
    assert_eq!(doc["summary"]["artifacts"], 2);
    assert_eq!(doc["summary"]["used"], 1);
    assert_eq!(doc["summary"]["unused"], 1);
    assert_eq!(doc["summary"]["missing"], 1);
    assert_eq!(doc["summary"]["manifests_read"], 1);

    let text = fs::read_to_string(ws.report()).unwrap();
    assert!(text.starts_with("File Path,File Name,Creation Date,Status,Manifest File,Resolved Manifest Path"));
}

#[test]
fn scan_defaults_report_to_working_directory() {
    let ws = Workspace::new();
    ws.touch("a.eod");
    let out = ws.run(&["scan", s(&ws.root())]);
    assert_eq!(code(&out), 0);
    assert!(ws.report().is_file());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("1 artifacts (0 used, 1 unused)"), "{stderr}");
}

#[test]
fn scan_invalid_root_exits_6() {
    let ws = Workspace::new();
    let out = ws.run(&["scan", s(&ws.path("nope"))]);
    assert_eq!(code(&out), 6);
    assert!(!ws.report().exists());
    assert!(String::from_utf8_lossy(&out.stderr).contains("error:"));
}

#[test]
fn scan_with_log_file_writes_events() {
    let ws = Workspace::new();
    ws.touch("a.eod");
    let log = ws.path("logs/sweep.log");
    let out = ws.run(&["scan", s(&ws.root()), "--log-file", s(&log)]);
    assert_eq!(code(&out), 0);
    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("Saved report"), "{text}");
}

// ---------------------------------------------------------------------------
// move
// ---------------------------------------------------------------------------

#[test]
fn move_without_scan_exits_3() {
    let ws = Workspace::new();
    let archive = ws.path("archive");
    let out = ws.run(&["move", s(&ws.root()), s(&archive)]);
    assert_eq!(code(&out), 3);
    assert!(!archive.exists());
    assert!(String::from_utf8_lossy(&out.stderr).contains("hint:"));
}

#[test]
fn scan_then_move_archives_only_unused() {
    let ws = Workspace::new();
    ws.touch("a.eod");
    ws.touch("b.eod");
    ws.manifest("m.runspec.json", &["a.eod"]);
    let archive = ws.path("archive");

    assert_eq!(code(&ws.run(&["scan", s(&ws.root())])), 0);
    let out = ws.run(&["move", s(&ws.root()), s(&archive), "--json"]);
    assert_eq!(code(&out), 0, "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let doc = json(&out);
    assert_eq!(doc["summary"]["candidates"], 1);
    assert_eq!(doc["summary"]["moved"], 1);
    // Small files on average: Auto picks the worker pool.
    assert_eq!(doc["summary"]["schedule"]["mode"], "concurrent");
    assert!(archive.join("b.eod").is_file());
    assert!(ws.root().join("a.eod").is_file());
    assert!(!ws.root().join("b.eod").exists());
}

#[test]
fn relative_scan_root_matches_absolute_move_root() {
    let ws = Workspace::new();
    ws.touch("a.eod");
    let archive = ws.path("archive");

    assert_eq!(code(&ws.run(&["scan", "./root"])), 0);
    let out = ws.run(&["move", s(&ws.root()), s(&archive), "--json"]);
    assert_eq!(code(&out), 0);
    let doc = json(&out);
    assert_eq!(doc["summary"]["skipped_foreign"], 0);
    assert_eq!(doc["summary"]["moved"], 1);
    assert!(archive.join("a.eod").is_file());
}

#[test]
fn forced_sequential_is_reported() {
    let ws = Workspace::new();
    ws.touch("a.eod");
    let archive = ws.path("archive");
    assert_eq!(code(&ws.run(&["scan", s(&ws.root())])), 0);

    let out = ws.run(&["move", s(&ws.root()), s(&archive), "--sequential", "--json"]);
    assert_eq!(code(&out), 0);
    let doc = json(&out);
    assert_eq!(doc["summary"]["schedule"]["mode"], "sequential");
    assert_eq!(doc["summary"]["moved"], 1);
    assert!(archive.join("a.eod").is_file());
}

#[test]
fn sequential_and_parallel_conflict() {
    let ws = Workspace::new();
    let out = ws.run(&["move", s(&ws.root()), s(&ws.path("archive")), "--sequential", "--parallel"]);
    assert_eq!(code(&out), 2);
}

#[test]
fn move_collision_exits_7_and_keeps_source() {
    let ws = Workspace::new();
    ws.touch("a.eod");
    ws.touch("b.eod");
    let archive = ws.path("archive");
    fs::create_dir_all(&archive).unwrap();
    fs::write(archive.join("b.eod"), b"older").unwrap();

    assert_eq!(code(&ws.run(&["scan", s(&ws.root())])), 0);
    let out = ws.run(&["move", s(&ws.root()), s(&archive)]);
    assert_eq!(code(&out), 7);
    assert!(archive.join("a.eod").is_file());
    assert!(ws.root().join("b.eod").is_file());
    assert_eq!(fs::read(archive.join("b.eod")).unwrap(), b"older");
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_filters_by_status() {
    let ws = Workspace::new();
    ws.touch("a.eod");
    ws.touch("b.eod");
    ws.manifest("m.runspec.json", &["a.eod", "gone.eod"]);
    assert_eq!(code(&ws.run(&["scan", s(&ws.root())])), 0);

    let out = ws.run(&["show", "--status", "missing", "--json"]);
    assert_eq!(code(&out), 0);
    let rows = json(&out);
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["File Name"], "gone.eod");
    assert_eq!(rows[0]["Status"], "Missing");
    assert_eq!(rows[0]["Creation Date"], "N/A");
}

#[test]
fn show_table_lists_rows() {
    let ws = Workspace::new();
    ws.touch("a.eod");
    assert_eq!(code(&ws.run(&["scan", s(&ws.root())])), 0);

    let out = ws.run(&["show"]);
    assert_eq!(code(&out), 0);
    let stdout = String::from_utf8_lossy(&out.stdout);
    let mut lines = stdout.lines();
    assert!(lines.next().unwrap().starts_with("Status"));
    assert!(stdout.contains("Unused"));
    assert!(stdout.contains("a.eod"));
}

#[test]
fn show_rejects_unknown_status() {
    let ws = Workspace::new();
    let out = ws.run(&["show", "--status", "stale"]);
    assert_eq!(code(&out), 2);
}

#[test]
fn show_corrupt_report_exits_4() {
    let ws = Workspace::new();
    fs::write(ws.report(), "INVALID EXCEL CONTENT").unwrap();
    let out = ws.run(&["show"]);
    assert_eq!(code(&out), 4);
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn long_version_names_engine_and_target() {
    let ws = Workspace::new();
    let out = ws.run(&["--version"]);
    assert_eq!(code(&out), 0);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("engine:  eodsweep-recon"), "{stdout}");
    assert!(stdout.contains("target:  "), "{stdout}");
    assert!(!stdout.contains("()"), "commit label must not be empty: {stdout}");
}

#[test]
fn invalid_config_exits_8() {
    let ws = Workspace::new();
    let config = ws.path("sweep.toml");
    fs::write(&config, "[archive]\nworkers = 0\n").unwrap();
    let out = ws.run(&["--config", s(&config), "scan", s(&ws.root())]);
    assert_eq!(code(&out), 8);
}

// XDG_CONFIG_HOME only steers `dirs::config_dir` on Linux.
#[cfg(target_os = "linux")]
#[test]
fn config_from_default_location_is_used() {
    let ws = Workspace::new();
    let dir = ws.path("xdg/eodsweep");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), "[scan]\nartifact_extension = \"dat\"\n").unwrap();
    ws.touch("a.eod");
    ws.touch("b.dat");

    let out = ws.run(&["scan", s(&ws.root()), "--json"]);
    assert_eq!(code(&out), 0);
    assert_eq!(json(&out)["summary"]["artifacts"], 1);
}

#[test]
fn config_show_prints_effective_toml() {
    let ws = Workspace::new();
    let out = ws.run(&["config", "show"]);
    assert_eq!(code(&out), 0);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[archive]"), "{stdout}");
    assert!(stdout.contains("workers = 5"), "{stdout}");
    assert!(stdout.contains("artifact_extension = \"eod\""), "{stdout}");
}

#[test]
fn config_path_works_with_broken_config() {
    let ws = Workspace::new();
    let config = ws.path("broken.toml");
    fs::write(&config, "not = [toml").unwrap();
    let out = ws.run(&["--config", s(&config), "config", "path"]);
    assert_eq!(code(&out), 0);
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), s(&config));
}
