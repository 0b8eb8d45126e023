//! Chrome process lifecycle.
//!
//! Launches a throwaway Chrome with remote debugging on a free port and a
//! temporary profile, waits for the DevTools endpoint to come up, and kills
//! the process on teardown.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::cdp::BrowserVersion;

#[derive(Debug, Error)]
pub enum ChromeError {
    #[error("chrome not found; install Google Chrome or set worker.chrome_binary")]
    NotFound,

    #[error("failed to launch chrome: {0}")]
    LaunchFailed(String),

    #[error("chrome did not become ready: {0}")]
    NotReady(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(target_os = "macos")]
const CHROME_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
];

#[cfg(target_os = "linux")]
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

#[cfg(target_os = "windows")]
const CHROME_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

/// Probe well-known install locations for a Chrome binary.
pub fn find_chrome() -> Option<PathBuf> {
    CHROME_PATHS.iter().map(PathBuf::from).find(|p| p.exists())
}

/// How to launch the browser.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub headless: bool,
    /// Explicit binary path; well-known locations are probed when unset.
    pub binary: Option<PathBuf>,
}

/// A running Chrome we own.
pub struct ChromeHandle {
    child: Child,
    port: u16,
    // Held so the profile directory outlives the process.
    _profile_dir: TempDir,
}

impl ChromeHandle {
    /// Spawn Chrome and wait until its DevTools endpoint answers.
    pub async fn launch(options: &LaunchOptions) -> Result<Self, ChromeError> {
        let binary = match &options.binary {
            Some(path) => path.clone(),
            None => find_chrome().ok_or(ChromeError::NotFound)?,
        };
        let port = free_port()?;
        let profile_dir = TempDir::new()?;

        info!(
            "launching {} with devtools on port {}",
            binary.display(),
            port
        );

        let mut cmd = Command::new(&binary);
        cmd.arg(format!("--remote-debugging-port={}", port))
            .arg(format!("--user-data-dir={}", profile_dir.path().display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--window-size=1280,720")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        if options.headless {
            cmd.arg("--headless=new");
        }

        let child = cmd
            .spawn()
            .map_err(|e| ChromeError::LaunchFailed(e.to_string()))?;

        let mut handle = Self {
            child,
            port,
            _profile_dir: profile_dir,
        };

        if let Err(err) = handle.wait_until_ready().await {
            handle.kill().await;
            return Err(err);
        }

        Ok(handle)
    }

    /// DevTools HTTP endpoint for this instance.
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Poll `/json/version` until the endpoint answers.
    async fn wait_until_ready(&mut self) -> Result<(), ChromeError> {
        let url = format!("{}/json/version", self.endpoint());
        for _ in 0..30 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            if let Ok(resp) = reqwest::get(&url).await {
                if let Ok(version) = resp.json::<BrowserVersion>().await {
                    debug!("devtools ready: {}", version.browser);
                    return Ok(());
                }
            }
        }
        Err(ChromeError::NotReady(format!(
            "no answer on port {} within 6s",
            self.port
        )))
    }

    /// Kill the browser process.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("failed to kill chrome: {}", e);
        }
    }
}

/// Bind port 0 and let the OS hand out a free port.
fn free_port() -> Result<u16, ChromeError> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
