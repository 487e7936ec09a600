use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use url::Url;

use crate::error::{Error, Result};

/// How often a running git process is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Password paired with a token in an authenticated https URL.
const TOKEN_PASSWORD: &str = "x-oauth-basic";

/// Embed `token` as the user part of an http(s) clone URL.
///
/// Other URLs (ssh remotes, local paths) are returned unchanged.
pub fn authenticated_url(clone_url: &str, token: Option<&str>) -> Result<String> {
    let Some(token) = token else {
        return Ok(clone_url.to_string());
    };
    let mut url = match Url::parse(clone_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => return Ok(clone_url.to_string()),
    };

    let embedded = url
        .set_username(token)
        .and_then(|_| url.set_password(Some(TOKEN_PASSWORD)));
    if embedded.is_err() {
        return Err(Error::GitClone {
            url: redact_url(clone_url),
            message: "cannot embed credentials in this URL".to_string(),
        });
    }
    Ok(url.to_string())
}

/// Strip any credentials from a URL before it is logged or reported.
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if !parsed.username().is_empty() || parsed.password().is_some() => {
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}

fn redact_secret(text: &str, secret: Option<&str>) -> String {
    match secret {
        Some(secret) if !secret.is_empty() => text.replace(secret, "***"),
        _ => text.to_string(),
    }
}

/// Run `git <args>` in `cwd`, killing it once `timeout` has passed.
///
/// `label` names the command in errors instead of the raw arguments, which
/// may carry credentials. `secret` is scrubbed from captured stderr.
pub fn run_git(
    cwd: Option<&Path>,
    args: &[&str],
    label: &str,
    secret: Option<&str>,
    timeout: Duration,
) -> Result<()> {
    let dir = cwd
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| ".".to_string());

    let mut command = Command::new("git");
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }
    command
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| Error::GitCommand {
        command: label.to_string(),
        dir: dir.clone(),
        stderr: e.to_string(),
    })?;

    // Drain stderr on a separate thread so a chatty git never blocks on a
    // full pipe while we poll.
    let stderr_reader = child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut buffer = String::new();
            let _ = stderr.read_to_string(&mut buffer);
            buffer
        })
    });

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::GitTimeout {
                command: label.to_string(),
                dir,
                seconds: timeout.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    if !status.success() {
        let stderr = stderr_reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();
        return Err(Error::GitCommand {
            command: label.to_string(),
            dir,
            stderr: redact_secret(stderr.trim(), secret),
        });
    }
    Ok(())
}

/// Clone `clone_url` into `target_dir`.
///
/// The clone goes through the authenticated URL, then `origin` is reset to
/// the plain URL so the token never lands in `.git/config`. A failed clone
/// leaves no directory behind.
pub fn clone(clone_url: &str, token: Option<&str>, target_dir: &Path, timeout: Duration) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let auth_url = authenticated_url(clone_url, token)?;
    let target = target_dir.to_string_lossy();
    let cloned = run_git(None, &["clone", &auth_url, &target], "clone", token, timeout)
        .and_then(|_| {
            run_git(
                Some(target_dir),
                &["remote", "set-url", "origin", clone_url],
                "remote set-url",
                token,
                timeout,
            )
        });

    if let Err(e) = cloned {
        if target_dir.exists() {
            let _ = fs::remove_dir_all(target_dir);
        }
        let message = match e {
            Error::GitCommand { stderr, .. } => clone_failure_message(&stderr),
            other => other.to_string(),
        };
        return Err(Error::GitClone {
            url: redact_url(clone_url),
            message,
        });
    }
    Ok(())
}

fn clone_failure_message(stderr: &str) -> String {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        format!(
            "Authentication failed. Check that the access token can read this repository.\n\
            Error: {}",
            stderr
        )
    } else {
        stderr.to_string()
    }
}

/// Bring an existing clone to the remote state of `branch`.
///
/// Local commits and uncommitted changes are discarded: the fetched branch
/// head replaces whatever is checked out.
pub fn force_pull(
    repo_dir: &Path,
    clone_url: &str,
    branch: &str,
    token: Option<&str>,
    timeout: Duration,
) -> Result<()> {
    let auth_url = authenticated_url(clone_url, token)?;
    run_git(
        Some(repo_dir),
        &["fetch", "--force", &auth_url, branch],
        "fetch",
        token,
        timeout,
    )?;
    run_git(
        Some(repo_dir),
        &["reset", "--hard", "FETCH_HEAD"],
        "reset --hard",
        token,
        timeout,
    )
}
