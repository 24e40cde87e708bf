//! Opening device management pages in the system browser.

use tokio::process::Command;

/// Launch the platform's URL opener for `url`.
pub async fn open_url(url: String) -> Result<(), String> {
    let mut command = opener(&url);

    tracing::info!(url = %url, "Opening management page");

    let status = command
        .status()
        .await
        .map_err(|e| format!("Failed to launch browser for {}: {}", url, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("Browser launcher exited with {} for {}", status, url))
    }
}

#[cfg(target_os = "macos")]
fn opener(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn opener(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
