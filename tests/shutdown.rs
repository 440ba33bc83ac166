//! Process-level shutdown tests against the built binary.

#![cfg(unix)]

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

#[tokio::test]
async fn test_sigterm_exits_with_stdin_open() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pagebridge-mcp"))
        .arg("browser")
        .env("RUST_LOG", "info")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .expect("spawn server");

    // Held open so the server sits in its stdin read.
    let _stdin = child.stdin.take().expect("stdin");
    let mut stderr = BufReader::new(child.stderr.take().expect("stderr")).lines();

    let started = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(line) = stderr.next_line().await.expect("read stderr") {
            if line.contains("MCP server starting on stdio") {
                return true;
            }
        }
        false
    })
    .await
    .expect("server did not start");
    assert!(started);

    // Drain the rest of stderr so the child never blocks on a full pipe.
    tokio::spawn(async move { while let Ok(Some(_)) = stderr.next_line().await {} });
    tokio::time::sleep(Duration::from_millis(200)).await;

    let pid = child.id().expect("pid");
    let kill = std::process::Command::new("kill")
        .args(["-TERM", &pid.to_string()])
        .status()
        .expect("run kill");
    assert!(kill.success());

    let status = tokio::time::timeout(Duration::from_secs(5), child.wait())
        .await
        .expect("server still running after SIGTERM")
        .expect("wait for server");
    assert!(status.success());
}
