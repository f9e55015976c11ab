//! End-to-end tests against the real `restic` and `rclone`.
//!
//! Every test here is `#[ignore]` so a plain `cargo test` stays green on
//! machines without the tools installed.  Run them with:
//!
//! ```sh
//! cargo test --test e2e -- --ignored
//! ```
//!
//! rclone is pointed at an empty config file so no real cloud remotes are
//! offered; every destination is a temp-dir "disk".

#![cfg(unix)]

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

const BIN: &str = env!("CARGO_BIN_EXE_manual-nas-tool");
const PASSWORD: &str = "e2e-secret";

// ─── Fixture ──────────────────────────────────────────────────────────────────

struct Fixture {
    _root: tempfile::TempDir,
    home: PathBuf,
    media: PathBuf,
    config: PathBuf,
    rclone_config: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let home = root.path().join("home");
        let media = root.path().join("media");
        let source = home.join("Photos 2024");

        fs::create_dir_all(source.join("trip")).unwrap();
        fs::write(source.join("hello.txt"), "hello").unwrap();
        fs::write(source.join("trip").join("nested.txt"), "nested").unwrap();
        fs::create_dir_all(media.join("Backup1")).unwrap();

        let rclone_config = root.path().join("rclone.conf");
        fs::write(&rclone_config, "").unwrap();

        let config = root.path().join("config.toml");
        fs::write(
            &config,
            format!(
                "[paths]\nmedia_root = \"{}\"\ninstall_dir = \"{}\"\n",
                media.display(),
                root.path().join("bin").display()
            ),
        )
        .unwrap();

        Self {
            _root: root,
            home,
            media,
            config,
            rclone_config,
        }
    }

    fn repo(&self) -> PathBuf {
        self.media.join("Backup1/manual_nas_encrypted/photos_2024_encrypted")
    }

    fn run(&self, stdin: &str) -> (bool, String, String) {
        let mut child = Command::new(BIN)
            .arg("--config")
            .arg(&self.config)
            .env("HOME", &self.home)
            .env("RCLONE_CONFIG", &self.rclone_config)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap_or_else(|e| panic!("failed to spawn {BIN}: {e}"));
        child
            .stdin
            .take()
            .unwrap()
            .write_all(stdin.as_bytes())
            .unwrap();
        let out = child.wait_with_output().unwrap();
        (
            out.status.success(),
            String::from_utf8_lossy(&out.stdout).into_owned(),
            String::from_utf8_lossy(&out.stderr).into_owned(),
        )
    }

    fn restic(&self, args: &[&str]) -> (bool, String) {
        let out = Command::new("restic")
            .arg("--repo")
            .arg(self.repo())
            .args(args)
            .env("RESTIC_PASSWORD", PASSWORD)
            .output()
            .unwrap_or_else(|e| panic!("failed to spawn restic: {e}"));
        (out.status.success(), String::from_utf8_lossy(&out.stdout).into_owned())
    }

    fn snapshot_count(&self) -> usize {
        let (ok, stdout) = self.restic(&["snapshots", "--json"]);
        if !ok {
            return 0;
        }
        let v: serde_json::Value = serde_json::from_str(&stdout).unwrap_or(serde_json::Value::Null);
        v.as_array().map_or(0, Vec::len)
    }
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Ok(rd) = fs::read_dir(dir) {
        for entry in rd.filter_map(Result::ok) {
            let path = entry.path();
            if path.is_dir() {
                out.extend(files_under(&path));
            } else {
                out.push(path);
            }
        }
    }
    out
}

// action, folder, confirm, disk, password, default sub-path, proceed, no install
fn secure_input() -> String {
    format!("1\n1\ny\n1\n{PASSWORD}\n\ny\nn\n")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[ignore]
#[test]
fn secure_backup_creates_a_snapshot() {
    let fx = Fixture::new();
    let (ok, stdout, stderr) = fx.run(&secure_input());
    assert!(ok, "stdout:\n{stdout}\nstderr:\n{stderr}");
    assert!(fx.repo().join("config").exists(), "restic repo initialised");
    assert_eq!(fx.snapshot_count(), 1);
}

#[ignore]
#[test]
fn second_secure_backup_adds_a_snapshot() {
    let fx = Fixture::new();
    assert!(fx.run(&secure_input()).0);

    fs::write(fx.home.join("Photos 2024/new.txt"), "more").unwrap();
    let (ok, stdout, _) = fx.run(&secure_input());
    assert!(ok);
    assert!(stdout.contains("Incremental backup"));
    assert_eq!(fx.snapshot_count(), 2);
}

#[ignore]
#[test]
fn snapshot_restores_source_files() {
    let fx = Fixture::new();
    assert!(fx.run(&secure_input()).0);

    let restore = tempfile::tempdir().unwrap();
    let (ok, _) = fx.restic(&["restore", "latest", "--target", restore.path().to_str().unwrap()]);
    assert!(ok);

    let names: Vec<String> = files_under(restore.path())
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    assert!(names.contains(&"hello.txt".to_string()), "{names:?}");
    assert!(names.contains(&"nested.txt".to_string()), "{names:?}");
}

#[ignore]
#[test]
fn simple_copy_mirrors_the_tree() {
    let fx = Fixture::new();
    let (ok, stdout, stderr) = fx.run("2\n1\ny\n1\n\ny\nn\n");
    assert!(ok, "stdout:\n{stdout}\nstderr:\n{stderr}");

    let target = fx.media.join("Backup1/manual_nas_backup/photos_2024_backup");
    assert_eq!(fs::read_to_string(target.join("hello.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(target.join("trip/nested.txt")).unwrap(), "nested");
}
