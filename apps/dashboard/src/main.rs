mod render;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use client_core::{load_settings_from, AlertEvent, Dashboard, HttpDashboardApi, SubmitOutcome};
use shared::domain::GuildId;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const FIRST_POLL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(about = "Headless guild bot dashboard")]
struct Cli {
    /// Backend base URL; overrides dashboard.toml and the environment.
    #[arg(long)]
    url: Option<String>,
    /// Guild used when /api/config is unreachable.
    #[arg(long)]
    guild_id: Option<String>,
    #[arg(long, default_value = client_core::config::SETTINGS_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the bot status panel.
    Status,
    /// Print the guild's channels grouped by category.
    Channels,
    /// Send a plain text message.
    Send { channel: String, content: String },
    /// Send an embed.
    Embed {
        channel: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = client_core::embed::DEFAULT_EMBED_COLOR_HEX)]
        color: String,
        #[arg(long, default_value = "")]
        footer: String,
        #[arg(long, default_value = "")]
        image_url: String,
        /// Only render the preview, do not send.
        #[arg(long)]
        preview: bool,
    },
    /// Print the stored join, leave and join DM configs.
    Events,
    /// Print invite totals and the leaderboard.
    Invites,
    /// Enable or disable join messages.
    ToggleJoin {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Keep polling and print status changes and alerts until Ctrl-C.
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings_from(&cli.config, |key| std::env::var(key).ok());
    if let Some(url) = cli.url {
        settings.dashboard_url = url;
    }
    if let Some(guild_id) = cli.guild_id {
        settings.fallback_guild_id = Some(GuildId::new(guild_id));
    }
    info!(url = %settings.dashboard_url, "connecting to dashboard backend");

    let api = Arc::new(HttpDashboardApi::new(settings.dashboard_url.clone()));
    let dashboard = Dashboard::start(api, &settings)
        .await
        .context("dashboard startup failed")?;
    let mut status = dashboard.status.subscribe();
    let first_poll = tokio::time::timeout(FIRST_POLL_TIMEOUT, status.wait_for(Option::is_some));
    if first_poll.await.is_err() {
        warn!("no bot status yet; controls stay in their initial state");
    }
    drop(status);

    match cli.command {
        Command::Status => println!("{}", render::status_panel(&dashboard.status_panel.view())),
        Command::Channels => {
            println!("{}", render::channel_groups(&dashboard.channel_list.groups()))
        }
        Command::Send { channel, content } => {
            let selected = dashboard.text_message.edit(|form| {
                form.content = content;
                form.channel().select(&channel)
            });
            if !selected {
                bail!("channel {channel} is not in this guild");
            }
            let outcome = dashboard.text_message.submit().await;
            report(&dashboard, &outcome)?;
        }
        Command::Embed {
            channel,
            title,
            description,
            color,
            footer,
            image_url,
            preview,
        } => {
            let selected = dashboard.embed_message.edit(|form| {
                form.title = title;
                form.description = description;
                form.color.set_from_hex_text(&color);
                form.footer = footer;
                form.image_url = image_url;
                form.channel().select(&channel)
            });
            if !selected {
                bail!("channel {channel} is not in this guild");
            }
            println!(
                "{}",
                render::embed_preview(&dashboard.embed_message.read(|form| form.preview().clone()))
            );
            if !preview {
                let outcome = dashboard.embed_message.submit().await;
                report(&dashboard, &outcome)?;
            }
        }
        Command::Events => println!("{}", render::event_configs(&dashboard)),
        Command::Invites => println!("{}", render::invite_board(&dashboard.invites.view())),
        Command::ToggleJoin { enabled } => {
            dashboard.join.toggle_enabled(enabled).await?;
            print_alerts(&dashboard);
        }
        Command::Watch => watch(&dashboard).await?,
    }

    dashboard.shutdown();
    Ok(())
}

fn print_alerts(dashboard: &Dashboard) {
    for alert in dashboard.alerts.active() {
        println!("{}", render::alert(&alert));
    }
}

fn report(dashboard: &Dashboard, outcome: &SubmitOutcome) -> Result<()> {
    print_alerts(dashboard);
    match outcome {
        SubmitOutcome::Sent(_) => Ok(()),
        SubmitOutcome::Ignored => bail!("bot is offline, submit is disabled"),
        SubmitOutcome::Invalid(err) => bail!("{}", err.0),
        SubmitOutcome::Rejected(result) => bail!("{}", result.message),
        SubmitOutcome::Failed(text) => bail!("{text}"),
    }
}

async fn watch(dashboard: &Dashboard) -> Result<()> {
    let mut status = dashboard.status.subscribe();
    let mut alerts = dashboard.alerts.subscribe();
    println!("{}", render::status_panel(&dashboard.status_panel.view()));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                return Ok(());
            }
            changed = status.changed() => {
                changed.context("status poller stopped")?;
                println!("{}", render::status_panel(&dashboard.status_panel.view()));
            }
            event = alerts.recv() => {
                if let Ok(AlertEvent::Shown(alert)) = event {
                    println!("{}", render::alert(&alert));
                }
            }
        }
    }
}
