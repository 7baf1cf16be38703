//! Integration tests for the denv binary
//!
//! Tests at the top level run the binary without touching the network. The
//! `s3` module needs a reachable S3-compatible server and an existing bucket.
//!
//! Run with:
//! ```bash
//! # Start an S3-compatible server and create a bucket
//! docker run -d --name minio -p 9000:9000 \
//!     -e MINIO_ROOT_USER=accesskey \
//!     -e MINIO_ROOT_PASSWORD=secretkey \
//!     minio/minio server /data
//!
//! # Run tests
//! TEST_S3_ENDPOINT=http://localhost:9000 TEST_S3_ACCESS_KEY=accesskey \
//! TEST_S3_SECRET_KEY=secretkey TEST_S3_BUCKET=denv-test \
//!     cargo test --features integration
//! ```

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Variables that would leak the developer's real credentials into a test
const CREDENTIAL_VARS: &[&str] = &[
    "AWS_ACCESS_KEY",
    "AWS_SECRET_KEY",
    "AWS_BUCKET_NAME",
    "AWS_BUCKET_REGION",
    "AWS_ENDPOINT_URL",
];

/// Build a denv command isolated to `home`
fn denv(args: &[&str], home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_denv"));
    cmd.args(args)
        .current_dir(home)
        .env("HOME", home)
        .env("DENV_CONFIG_DIR", home.join("denv"))
        .env_remove("RUST_LOG");
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn run_denv(args: &[&str], home: &Path) -> Output {
    denv(args, home).output().expect("Failed to execute denv")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_no_flags_prints_hint() {
    let home = TempDir::new().unwrap();

    let output = run_denv(&[], home.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains("denv --help"));
}

#[test]
fn test_hint_respects_output_modifiers() {
    let home = TempDir::new().unwrap();

    let output = run_denv(&["--quiet"], home.path());
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let output = run_denv(&["--json"], home.path());
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["hint"].as_str().unwrap().contains("denv --help"));
}

#[test]
fn test_help_lists_operations() {
    let home = TempDir::new().unwrap();

    let output = run_denv(&["--help"], home.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("denv --up [file path] --name [file nickname]"));
    assert!(text.contains("denv --rename"));
}

#[test]
fn test_upload_without_nickname() {
    let home = TempDir::new().unwrap();

    let output = run_denv(&["--up", "./.env"], home.path());

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("provide a nickname"));
}

#[test]
fn test_rename_without_new_name() {
    let home = TempDir::new().unwrap();

    let output = run_denv(&["--rename", "prod.env"], home.path());

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("provide a new name"));
}

#[test]
fn test_completion_files_is_silent_without_config() {
    let home = TempDir::new().unwrap();

    let output = run_denv(&["--completion-files", "--help"], home.path());

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(output.stderr.is_empty());
    // Completion bypasses initialization
    assert!(!home.path().join("denv").exists());
}

#[test]
fn test_list_without_config_prompts_setup() {
    let home = TempDir::new().unwrap();

    let output = run_denv(&["--list"], home.path());

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("denv --config"));
    assert!(home.path().join("denv/.env").exists());
}

#[test]
fn test_setup_message_respects_quiet() {
    let home = TempDir::new().unwrap();

    let output = run_denv(&["--list", "--quiet"], home.path());

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_config_then_partial_credentials_still_gated() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join("denv");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join(".env"),
        "AWS_ACCESS_KEY=AKIA123\nAWS_SECRET_KEY=s3cr3t\n",
    )
    .unwrap();

    let output = run_denv(&["--del", "prod.env"], home.path());

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("denv --config"));
}

#[test]
fn test_config_saves_credentials() {
    let home = TempDir::new().unwrap();

    let mut child = denv(&["--config"], home.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"AKIA123\ns3cr3t\nmy-bucket\nus-east-1\n\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Everything is right"));

    let saved = std::fs::read_to_string(home.path().join("denv/.env")).unwrap();
    assert!(saved.contains("AWS_ACCESS_KEY=AKIA123"));
    assert!(saved.contains("AWS_BUCKET_NAME=my-bucket"));
    assert!(saved.contains("AWS_BUCKET_REGION=us-east-1"));
}

#[test]
fn test_setup_completion_writes_script() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join(".zshrc"), "").unwrap();

    let output = run_denv(&["--setup-completion"], home.path());

    assert!(output.status.success());
    assert!(home.path().join(".zsh/functions/_denv").exists());
    let zshrc = std::fs::read_to_string(home.path().join(".zshrc")).unwrap();
    assert!(zshrc.contains("# Added by denv for completion"));
}

#[cfg(feature = "integration")]
mod s3 {
    use super::*;

    /// S3 test configuration from the environment
    struct TestConfig {
        endpoint: String,
        access_key: String,
        secret_key: String,
        bucket: String,
        region: String,
    }

    fn get_test_config() -> Option<TestConfig> {
        Some(TestConfig {
            endpoint: std::env::var("TEST_S3_ENDPOINT").ok()?,
            access_key: std::env::var("TEST_S3_ACCESS_KEY").ok()?,
            secret_key: std::env::var("TEST_S3_SECRET_KEY").ok()?,
            bucket: std::env::var("TEST_S3_BUCKET").ok()?,
            region: std::env::var("TEST_S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
        })
    }

    /// Write a complete env file into a fresh home directory
    fn setup_home() -> Option<TempDir> {
        let config = get_test_config()?;
        let home = TempDir::new().ok()?;
        let config_dir = home.path().join("denv");
        std::fs::create_dir_all(&config_dir).ok()?;
        std::fs::write(
            config_dir.join(".env"),
            format!(
                "AWS_ACCESS_KEY={}\nAWS_SECRET_KEY={}\nAWS_BUCKET_NAME={}\nAWS_BUCKET_REGION={}\nAWS_ENDPOINT_URL={}\n",
                config.access_key, config.secret_key, config.bucket, config.region, config.endpoint
            ),
        )
        .ok()?;
        Some(home)
    }

    /// Unique nickname so parallel runs don't collide
    fn unique(name: &str) -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        format!("{name}-{:x}", duration.as_nanos() % 0xFFFF_FFFF)
    }

    #[test]
    fn test_upload_download_delete() {
        let Some(home) = setup_home() else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };
        let nickname = unique("prod");
        let key = format!("{nickname}.env");
        std::fs::write(home.path().join(".env"), "KEY=value\n").unwrap();

        let output = run_denv(&["--up", ".env", "--name", &nickname], home.path());
        assert!(output.status.success(), "upload: {}", stderr(&output));

        let output = run_denv(&["--list"], home.path());
        assert!(output.status.success());
        assert!(stdout(&output).contains(&key));

        let output = run_denv(&["--completion-files"], home.path());
        assert!(stdout(&output).split_whitespace().any(|k| k == key));

        let output = run_denv(&["--name", &key, "--out", "copy.env"], home.path());
        assert!(output.status.success(), "download: {}", stderr(&output));
        assert_eq!(
            std::fs::read_to_string(home.path().join("copy.env")).unwrap(),
            "KEY=value\n"
        );

        let output = run_denv(&["--del", &key], home.path());
        assert!(output.status.success());

        let output = run_denv(&["--name", &key, "--out", "gone.env"], home.path());
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_rename_keeps_extension() {
        let Some(home) = setup_home() else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };
        let old = unique("old");
        let new = unique("new");
        std::fs::write(home.path().join("app.env"), "A=1\n").unwrap();

        let output = run_denv(&["--up", "app.env", "--name", &old], home.path());
        assert!(output.status.success());

        let output = run_denv(
            &["--rename", &format!("{old}.env"), "--name", &new],
            home.path(),
        );
        assert!(output.status.success(), "rename: {}", stderr(&output));

        let listing = stdout(&run_denv(&["--list", "--json"], home.path()));
        assert!(listing.contains(&format!("{new}.env")));
        assert!(!listing.contains(&format!("{old}.env")));

        let _ = run_denv(&["--del", &format!("{new}.env")], home.path());
    }

    #[test]
    fn test_recursive_round_trip() {
        let Some(home) = setup_home() else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };
        let nickname = unique("configs");
        let source = home.path().join("configs");
        std::fs::create_dir_all(source.join("nested")).unwrap();
        std::fs::write(source.join("a.env"), "A=1\n").unwrap();
        std::fs::write(source.join("nested/b.env"), "B=2\n").unwrap();

        let output = run_denv(&["--up", "configs", "--name", &nickname, "--r"], home.path());
        assert!(output.status.success(), "upload: {}", stderr(&output));

        let key = format!("{nickname}.zip");
        let output = run_denv(&["--name", &key, "--out", "restored.zip"], home.path());
        assert!(output.status.success(), "download: {}", stderr(&output));

        let restored = home.path().join("restored");
        assert!(!home.path().join("restored.zip").exists());
        assert_eq!(std::fs::read_to_string(restored.join("a.env")).unwrap(), "A=1\n");
        assert_eq!(
            std::fs::read_to_string(restored.join("nested/b.env")).unwrap(),
            "B=2\n"
        );

        let _ = run_denv(&["--del", &key], home.path());
    }
}
