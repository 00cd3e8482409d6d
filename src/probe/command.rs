// Probes backed by OS commands (`who`, `ss`, `systemctl`) and their output parsers.

use crate::models::{Connection, ConnectionState, ServiceState, UserSession};
use anyhow::Context;
use tokio::process::Command;

/// Run a command and return stdout; a non-zero exit is an error.
pub(super) async fn run_cmd(program: &str, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("failed to execute {}", program))?;
    anyhow::ensure!(
        output.status.success(),
        "{} exited with {}",
        program,
        output.status
    );
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `who` output: `user tty date time [(host)]`. Dates may be ISO ("2024-05-01")
/// or locale style ("May  1").
pub fn parse_who(output: &str) -> Vec<UserSession> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return None;
            }
            let (date, time, rest) = if parts[2].contains('-') {
                (parts[2].to_string(), parts[3], &parts[4..])
            } else if parts.len() >= 5 {
                (format!("{} {}", parts[2], parts[3]), parts[4], &parts[5..])
            } else {
                return None;
            };
            let ip = rest
                .iter()
                .find(|p| p.starts_with('('))
                .map(|p| p.trim_matches(|c| c == '(' || c == ')').to_string())
                .unwrap_or_default();
            Some(UserSession {
                user: parts[0].to_string(),
                tty: parts[1].to_string(),
                date,
                time: time.to_string(),
                ip,
            })
        })
        .collect()
}

/// Parse `ss -tanu` output (`Netid State Recv-Q Send-Q Local Peer ...`).
pub fn parse_ss(output: &str) -> Vec<Connection> {
    output
        .lines()
        .filter(|line| !line.starts_with("Netid"))
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 6 {
                return None;
            }
            Some(Connection {
                protocol: parts[0].to_string(),
                state: ConnectionState::from_ss(parts[1]),
                local_address: parts[4].to_string(),
                peer_address: parts[5].to_string(),
            })
        })
        .collect()
}

pub(super) async fn users() -> anyhow::Result<Vec<UserSession>> {
    let out = run_cmd("who", &[]).await?;
    Ok(parse_who(&out))
}

pub(super) async fn connections() -> anyhow::Result<Vec<Connection>> {
    let out = run_cmd("ss", &["-tanu"]).await?;
    Ok(parse_ss(&out))
}

/// `systemctl is-active a b c` prints one state per unit, in argument order. It exits
/// non-zero whenever any unit is inactive, so the status code is not checked here.
pub(super) async fn services(names: &[String]) -> anyhow::Result<Vec<ServiceState>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let output = Command::new("systemctl")
        .arg("is-active")
        .args(names)
        .output()
        .await
        .context("failed to execute systemctl")?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_is_active(names, &stdout))
}

fn parse_is_active(names: &[String], stdout: &str) -> Vec<ServiceState> {
    let mut states = stdout.lines().map(str::trim);
    names
        .iter()
        .map(|name| ServiceState {
            name: name.clone(),
            running: states.next() == Some("active"),
        })
        .collect()
}
