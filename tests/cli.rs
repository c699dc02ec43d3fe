//! Runs the built binary end to end.

use std::net::TcpListener;
use std::process::Command;
use tempfile::TempDir;

fn porthole() -> Command {
    Command::new(env!("CARGO_BIN_EXE_porthole"))
}

#[test]
fn missing_target_prints_usage_and_exits_1() {
    let output = porthole().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr was: {}", stderr);
}

#[test]
fn import_of_missing_dataset_fails() {
    let dir = TempDir::new().unwrap();
    let output = porthole()
        .arg("--services")
        .arg(dir.path().join("services.json"))
        .arg("import")
        .arg(dir.path().join("missing.csv"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("services.json").exists());
}

#[test]
fn plain_scan_reports_imported_service() {
    let dir = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let settings = dir.path().join("settings.json");
    std::fs::write(&settings, "{}").unwrap();
    let store = dir.path().join("services.json");
    let dataset = dir.path().join("registry.csv");
    std::fs::write(
        &dataset,
        format!(
            "Service Name,Port Number,Transport Protocol\nporthole-test,{},tcp\n",
            port
        ),
    )
    .unwrap();

    let import = porthole()
        .arg("--config")
        .arg(&settings)
        .arg("--services")
        .arg(&store)
        .arg("import")
        .arg(&dataset)
        .output()
        .unwrap();
    assert!(import.status.success());

    let scan = porthole()
        .args(["--plain", "-t", "500"])
        .args(["-s", &port.to_string(), "-e", &port.to_string()])
        .arg("--config")
        .arg(&settings)
        .arg("--services")
        .arg(&store)
        .arg("127.0.0.1")
        .output()
        .unwrap();

    assert!(scan.status.success(), "stderr: {}", String::from_utf8_lossy(&scan.stderr));
    assert_eq!(
        String::from_utf8_lossy(&scan.stdout),
        format!("{} is open (service: porthole-test)\n", port)
    );
    drop(listener);
}
