//! Integration test for `npmflat version`.

use std::process::Command;

#[test]
fn test_version_output() {
    let output = Command::new(env!("CARGO"))
        .args(["run", "-q", "-p", "npmflat-cli", "--bin", "npmflat", "--", "version"])
        .output()
        .expect("Failed to run npmflat version");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("npmflat "), "unexpected output: {stdout}");
}
