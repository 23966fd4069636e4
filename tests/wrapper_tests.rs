#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use git_clone_cache::cache::CacheKey;
use tempfile::{TempDir, tempdir};

const URL: &str = "https://example.com/r.git";

const FAKE_GIT: &str = r#"#!/bin/sh
echo "$@" >> "$FAKE_GIT_CALLS"
if [ "$1" = "clone" ] && [ "$2" = "--mirror" ]; then
    echo "mirror noise"
    if [ -n "$FAKE_GIT_FAIL_MIRROR" ]; then
        echo "mirror failed" >&2
        exit 128
    fi
    mkdir -p "$4"
    exit 0
fi
if [ "$1" = "-C" ]; then
    echo "fetch noise" >&2
    [ -n "$FAKE_GIT_FAIL_FETCH" ] && exit 1
    exit 0
fi
echo "fake git stdout"
echo "fake git stderr" >&2
exit "${FAKE_GIT_EXIT:-0}"
"#;

/// Scratch area with a fake git first on PATH and a private cache dir.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempdir().expect("Failed to create temp directory");
        let bin = dir.path().join("bin");
        fs::create_dir(&bin).unwrap();
        let git = bin.join("git");
        fs::write(&git, FAKE_GIT).unwrap();
        fs::set_permissions(&git, fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    fn bin_dir(&self) -> PathBuf {
        self.dir.path().join("bin")
    }

    fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    fn mirror(&self, source: &str) -> PathBuf {
        self.cache_dir().join(CacheKey::for_source(source).as_str())
    }

    fn search_path(&self) -> String {
        format!("{}:/usr/bin:/bin", self.bin_dir().display())
    }

    fn command(&self, program: &Path, path: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.current_dir(self.dir.path())
            .env("PATH", path)
            .env("GIT_CLONE_CACHE_DIR", self.cache_dir())
            .env("GIT_CLONE_CACHE_LOCK_TIMEOUT", "5")
            .env("FAKE_GIT_CALLS", self.dir.path().join("calls"))
            .env_remove("GIT_CLONE_CACHE_LOG")
            .env_remove("FAKE_GIT_EXIT")
            .env_remove("FAKE_GIT_FAIL_MIRROR")
            .env_remove("FAKE_GIT_FAIL_FETCH");
        cmd
    }

    fn wrapper(&self) -> Command {
        self.command(Path::new(env!("CARGO_BIN_EXE_git-clone-cache")), &self.search_path())
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn log_file(&self) -> String {
        fs::read_to_string(self.cache_dir().join("git-clone-cache.log")).unwrap_or_default()
    }
}

fn run(cmd: &mut Command, args: &[&str]) -> Output {
    cmd.args(args).output().expect("Failed to run wrapper")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn non_clone_is_passed_through_verbatim() {
    let sb = Sandbox::new();
    let output = run(
        sb.wrapper().env("FAKE_GIT_EXIT", "5"),
        &["status", "--short"],
    );

    assert_eq!(output.status.code(), Some(5));
    assert_eq!(stdout(&output), "fake git stdout\n");
    assert_eq!(stderr(&output), "fake git stderr\n");
    assert_eq!(sb.calls(), ["status --short"]);
    assert!(!sb.cache_dir().exists());
}

#[test]
fn first_clone_creates_mirror_and_references_it() {
    let sb = Sandbox::new();
    let mirror = sb.mirror(URL);

    let output = run(&mut sb.wrapper(), &["clone", URL, "dest"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(mirror.is_dir());
    assert_eq!(
        sb.calls(),
        [
            format!("clone --mirror {} {}", URL, mirror.display()),
            format!("clone --reference {} {} dest", mirror.display(), URL),
        ]
    );

    // Housekeeping output never reaches the caller.
    assert_eq!(stdout(&output), "fake git stdout\n");
    let err = stderr(&output);
    assert!(!err.contains("mirror noise"));
    assert!(err.contains(&format!("[git-clone-cache] Clone URL: {}", URL)));
    assert!(err.contains(&format!(
        "[git-clone-cache] Cache key: {}",
        CacheKey::for_source(URL)
    )));
    assert!(err.contains("[git-clone-cache] Initializing cache"));
    assert!(err.ends_with("fake git stderr\n"));

    let log = sb.log_file();
    assert!(log.contains("Initializing cache"));
    assert!(!log.contains("fake git"));
}

#[test]
fn second_clone_refreshes_existing_mirror() {
    let sb = Sandbox::new();
    let mirror = sb.mirror(URL);

    run(&mut sb.wrapper(), &["clone", URL, "one"]);
    let output = run(&mut sb.wrapper(), &["clone", URL, "two"]);

    assert_eq!(output.status.code(), Some(0));
    let calls = sb.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[2], format!("-C {} fetch --all", mirror.display()));
    assert_eq!(
        calls[3],
        format!("clone --reference {} {} two", mirror.display(), URL)
    );

    let err = stderr(&output);
    assert!(err.contains("Updating cache"));
    assert!(!err.contains("Initializing cache"));
    assert!(!err.contains("fetch noise"));
}

#[test]
fn refresh_failure_still_uses_mirror() {
    let sb = Sandbox::new();
    let mirror = sb.mirror(URL);

    run(&mut sb.wrapper(), &["clone", URL]);
    let output = run(sb.wrapper().env("FAKE_GIT_FAIL_FETCH", "1"), &["clone", URL]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("WARNING: Cache update failed"));
    assert_eq!(
        sb.calls().last().map(String::as_str),
        Some(format!("clone --reference {} {}", mirror.display(), URL).as_str())
    );
}

#[test]
fn mirror_init_failure_aborts() {
    let sb = Sandbox::new();

    let output = run(
        sb.wrapper().env("FAKE_GIT_FAIL_MIRROR", "1"),
        &["clone", URL, "dest"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(sb.calls().len(), 1);
    assert!(stderr(&output).contains("ERROR: cache init failed"));
    assert!(sb.log_file().contains("ERROR: cache init failed"));
}

#[test]
fn clone_exit_code_is_relayed() {
    let sb = Sandbox::new();
    let output = run(sb.wrapper().env("FAKE_GIT_EXIT", "128"), &["clone", URL]);
    assert_eq!(output.status.code(), Some(128));
}

#[test]
fn local_source_skips_cache() {
    let sb = Sandbox::new();
    let local = sb.bin_dir().display().to_string();

    let output = run(&mut sb.wrapper(), &["clone", &local, "dest"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(sb.calls(), [format!("clone {} dest", local)]);
    assert!(!sb.cache_dir().exists());
    assert_eq!(stderr(&output), "fake git stderr\n");
}

#[test]
fn options_before_source_are_skipped() {
    let sb = Sandbox::new();
    let mirror = sb.mirror(URL);

    run(
        &mut sb.wrapper(),
        &["clone", "--depth", "1", "--branch", "main", "-q", URL],
    );

    assert_eq!(
        sb.calls().last().map(String::as_str),
        Some(
            format!(
                "clone --reference {} --depth 1 --branch main -q {}",
                mirror.display(),
                URL
            )
            .as_str()
        )
    );
}

#[test]
fn missing_git_exits_one_without_touching_disk() {
    let sb = Sandbox::new();
    let empty = sb.dir.path().join("empty");
    fs::create_dir(&empty).unwrap();

    let output = run(
        &mut sb.command(
            Path::new(env!("CARGO_BIN_EXE_git-clone-cache")),
            &empty.display().to_string(),
        ),
        &["clone", URL],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("not found in PATH"));
    assert!(!sb.cache_dir().exists());
    assert!(sb.calls().is_empty());
}

#[test]
fn wrapper_installed_as_git_skips_itself() {
    let sb = Sandbox::new();
    let self_bin = sb.dir.path().join("self");
    fs::create_dir(&self_bin).unwrap();
    let installed = self_bin.join("git");
    fs::copy(env!("CARGO_BIN_EXE_git-clone-cache"), &installed).unwrap();

    let path = format!("{}:{}", self_bin.display(), sb.search_path());
    let output = run(&mut sb.command(&installed, &path), &["log", "-1"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(sb.calls(), ["log -1"]);
}

#[test]
fn log_filter_off_silences_wrapper() {
    let sb = Sandbox::new();
    let output = run(sb.wrapper().env("GIT_CLONE_CACHE_LOG", "off"), &["clone", URL]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stderr(&output), "fake git stderr\n");
    assert!(sb.mirror(URL).is_dir());
}
