//! Alert command handlers.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;
use tabled::Tabled;

use netops_core::{Alert, AlertNotifier, Controller};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Site")]
    site: String,
}

fn alert_row(a: &Alert, color: bool) -> AlertRow {
    AlertRow {
        id: a.id.to_string(),
        time: util::format_time(Some(a.created_at)),
        severity: output::paint_alert_severity(a.severity, color),
        status: a.status.to_string(),
        title: a.title.clone(),
        site: util::or_dash(
            a.site
                .as_ref()
                .map(|s| s.name.clone())
                .or_else(|| a.site_id.as_ref().map(ToString::to_string)),
        ),
    }
}

// ── Notifier ────────────────────────────────────────────────────────

/// Rings the terminal bell and prints a highlighted line on stderr.
struct TerminalBell {
    color: bool,
}

impl AlertNotifier for TerminalBell {
    fn notify(&self, alert: &Alert) {
        let site = alert
            .site
            .as_ref()
            .map(|s| format!(" @ {}", s.name))
            .unwrap_or_default();
        let line = format!("CRITICAL {}{site}", alert.title);
        let line = if self.color {
            line.red().bold().to_string()
        } else {
            line
        };
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\x07");
        let _ = writeln!(stderr, "{line}");
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: AlertsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AlertsCommand::List { active, limit } => {
            let alerts = controller
                .alerts(active, usize::try_from(limit).ok())
                .await?;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &alerts,
                |a| alert_row(a, color),
                |a| a.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Watch { interval } => {
            let interval = resolve_interval(interval.as_deref(), controller.config().live_poll_interval)?;
            watch(controller, interval, true, global).await
        }

        AlertsCommand::Notify { interval } => {
            let interval = resolve_interval(interval.as_deref(), controller.config().alert_poll_interval)?;
            watch(controller, interval, false, global).await
        }
    }
}

/// `--interval` when given, else the profile's interval for the mode.
fn resolve_interval(raw: Option<&str>, default: Duration) -> Result<Duration, CliError> {
    raw.map_or(Ok(default), parse_interval)
}

fn parse_interval(raw: &str) -> Result<Duration, CliError> {
    let interval = humantime::parse_duration(raw).map_err(|e| CliError::Validation {
        field: "interval".into(),
        reason: e.to_string(),
    })?;
    if interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(interval)
}

/// Run the poller until Ctrl-C. With `show_list` off only the bell
/// notifications reach the terminal.
async fn watch(
    controller: &Controller,
    interval: Duration,
    show_list: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let poller = controller.spawn_alert_poller(interval, Arc::new(TerminalBell { color }));
    let mut alerts = poller.subscribe();

    if !global.quiet {
        let mode = if show_list { "Watching" } else { "Listening for critical" };
        eprintln!(
            "{mode} alerts every {} (Ctrl-C to stop)",
            humantime::format_duration(interval)
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = alerts.changed() => {
                let Some(list) = update else { break };
                if !show_list {
                    continue;
                }
                let out = output::render_list(
                    &global.output,
                    list.as_slice(),
                    |a| alert_row(a, color),
                    |a| a.id.to_string(),
                );
                output::print_output(&out, global.quiet);
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use netops_core::{AuthCredentials, BackendConfig};

    use super::*;

    #[test]
    fn intervals_use_humantime_syntax() {
        assert!(matches!(parse_interval("10s"), Ok(d) if d == Duration::from_secs(10)));
        assert!(matches!(parse_interval("1m 30s"), Ok(d) if d == Duration::from_secs(90)));
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn background_mode_defaults_to_alert_poll_interval() {
        let cfg = BackendConfig::new(
            "https://ops.example.net".parse().unwrap(),
            AuthCredentials::ApiKey {
                api_key: "k".to_string().into(),
                access_token: None,
            },
        );
        assert!(matches!(
            resolve_interval(None, cfg.alert_poll_interval),
            Ok(d) if d == Duration::from_secs(30)
        ));
        assert!(matches!(
            resolve_interval(None, cfg.live_poll_interval),
            Ok(d) if d == Duration::from_secs(10)
        ));
        assert!(matches!(
            resolve_interval(Some("45s"), cfg.alert_poll_interval),
            Ok(d) if d == Duration::from_secs(45)
        ));
    }
}
