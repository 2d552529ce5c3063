//! TestServer - end-to-end test harness
//!
//! Spawns the actual encounterd binary on a random port with a temporary
//! data directory for snapshot files. Uses a fresh temp directory per test
//! instance for isolation while exercising the complete server binary
//! including CLI parsing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tempfile::TempDir;

/// Test harness that spawns the actual encounterd binary on a random port
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    child: Child,
    /// Temp directory for snapshot files (cleaned up on drop)
    temp_dir: TempDir,
}

impl TestServer {
    /// Start a new test server instance
    pub async fn start() -> Result<Self> {
        // Create temp directory for this test instance
        let temp_dir = TempDir::new()?;
        let data_dir = temp_dir.path().join("sessions");

        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        // Find the binary path
        let binary_path = find_binary_path()?;

        // Spawn the server process
        let child = Command::new(&binary_path)
            .arg("--bind")
            .arg(addr.to_string())
            .arg("--data-dir")
            .arg(data_dir.to_string_lossy().as_ref())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                anyhow::anyhow!("Failed to spawn encounterd binary at {:?}: {}", binary_path, e)
            })?;

        // Wait for server to be ready
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        // Poll until server is ready (max 5 seconds to handle resource contention)
        let mut ready = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 5 seconds");
        }

        Ok(Self { addr, client, child, temp_dir })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Directory the server writes keyed snapshots to
    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("sessions")
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .put(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .delete(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Kill the server process
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Find the encounterd binary path
fn find_binary_path() -> Result<PathBuf> {
    // Check common locations
    let candidates = [
        // Debug build (most common for tests)
        Path::new(env!("CARGO_MANIFEST_DIR")).join("target/debug/encounterd"),
        // Release build
        Path::new(env!("CARGO_MANIFEST_DIR")).join("target/release/encounterd"),
        // Workspace root debug
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../target/debug/encounterd"),
        // Workspace root release
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../target/release/encounterd"),
    ];

    for path in &candidates {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    anyhow::bail!(
        "Could not find encounterd binary. Run 'cargo build' first. Searched: {:?}",
        candidates
    )
}
