//! Plain-text rendering of the dashboard view models.

use std::fmt::Write;

use client_core::{
    AlertRecord, ChannelGroup, Dashboard, EmbedPreview, InviteBoardView, StatusDot,
    StatusPanelView,
};

pub fn status_panel(view: &StatusPanelView) -> String {
    let dot = match view.dot {
        StatusDot::Online => "●",
        StatusDot::Offline => "○",
        StatusDot::Unknown => "◌",
    };
    format!(
        "{dot} {}  [{}]\n  guilds:  {}\n  latency: {}\n  user:    {}",
        view.text, view.badge, view.guild_count, view.latency, view.bot_user
    )
}

pub fn channel_groups(groups: &[ChannelGroup]) -> String {
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{}", group.category);
        for channel in &group.channels {
            let _ = writeln!(out, "  # {} ({})", channel.name, channel.id);
        }
    }
    out.trim_end().to_string()
}

pub fn alert(alert: &AlertRecord) -> String {
    format!(
        "[{}] {} {}",
        alert.level.as_str(),
        alert.created_at.format("%H:%M:%S"),
        alert.text
    )
}

pub fn embed_preview(preview: &EmbedPreview) -> String {
    let mut out = format!(
        "┃ {} ({})\n┃ {}",
        preview.title, preview.accent_color, preview.description
    );
    if let Some(image) = &preview.image {
        let _ = write!(out, "\n┃ [image] {image}");
    }
    if let Some(footer) = &preview.footer {
        let _ = write!(out, "\n┃ {footer}");
    }
    out
}

pub fn event_configs(dashboard: &Dashboard) -> String {
    let channel = |value: Option<String>| value.unwrap_or_else(|| "-".into());
    let join = dashboard.join.read(|form| {
        format!(
            "join:    enabled={} channel={} embed={} template={:?}",
            form.enabled,
            channel(form.channel().value().map(|id| id.to_string())),
            form.embed_enabled,
            form.message_template
        )
    });
    let leave = dashboard.leave.read(|form| {
        format!(
            "leave:   enabled={} channel={} template={:?}",
            form.enabled,
            channel(form.channel().value().map(|id| id.to_string())),
            form.message_template
        )
    });
    let join_dm = dashboard.join_dm.read(|form| {
        format!(
            "join-dm: enabled={} template={:?}",
            form.enabled, form.message_template
        )
    });
    format!("{join}\n{leave}\n{join_dm}")
}

pub fn invite_board(view: &InviteBoardView) -> String {
    let mut out = format!(
        "invites: {}  uses: {}  top: {}",
        view.stats.total_invites,
        view.stats.total_uses,
        view.top_inviter.as_deref().unwrap_or("---")
    );
    if let Some(empty) = view.placeholder() {
        let _ = write!(out, "\n  {empty}");
    }
    for row in &view.rows {
        let _ = write!(out, "\n  {:>2}. {} {} pts", row.rank, row.user_id, row.points);
    }
    out
}
