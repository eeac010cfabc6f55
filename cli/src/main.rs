//! CLI entrypoint for panicbot
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use panicbot_application::{
    AuditLog, DEFAULT_REFRESH_INTERVAL, MessagingGateway, NoAuditLog, NoEmail, NoTelephony,
    PanicVoteEngine, TelephonyGateway, VotingPolicy,
};
use panicbot_domain::{ConfigIssue, GuildMember, MemberId, RoleId, VoteKind};
use panicbot_infrastructure::{
    ConfigLoader, DiscordRestGateway, FileConfig, JsonlAuditLog, TwilioGateway,
};
use panicbot_presentation::{Cli, ConsoleMessagingGateway, GatewayKind, OperatorConsole};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const WELCOME_MESSAGE: &str = "Hello! Thank you for inviting me!";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_tracing(&cli);

    info!("Starting panicbot");

    // === Configuration ===
    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    if cli.show_config {
        println!();
        println!("{}", config.to_display_toml()?);
        return Ok(());
    }

    let mut issues = config.validate();
    if cli.gateway == GatewayKind::Discord {
        issues.extend(config.validate_discord());
    }
    report_issues(&issues)?;

    let policy = config.to_voting_policy();

    // === Dependency Injection ===
    let (messaging, roster): (Arc<dyn MessagingGateway>, Option<Arc<ConsoleMessagingGateway>>) =
        match cli.gateway {
            GatewayKind::Discord => {
                let gateway = DiscordRestGateway::new(
                    config.discord_bot_token.clone(),
                    config.guild_id.clone(),
                    policy.primary_channel.clone(),
                )?;
                (Arc::new(gateway), None)
            }
            GatewayKind::Console => {
                let gateway = Arc::new(
                    ConsoleMessagingGateway::new(console_roster(&policy, &cli.operator))
                        .with_primary_channel(policy.primary_channel.as_ref()),
                );
                (gateway.clone(), Some(gateway))
            }
        };

    let telephony = build_telephony(&config)?;
    let audit: Arc<dyn AuditLog> = match &cli.audit_log {
        Some(path) => match JsonlAuditLog::open(path) {
            Some(log) => {
                info!(path = %log.path().display(), "Writing vote audit log");
                Arc::new(log)
            }
            None => {
                warn!("Continuing without an audit log");
                Arc::new(NoAuditLog)
            }
        },
        None => Arc::new(NoAuditLog),
    };

    let engine = PanicVoteEngine::new(messaging.clone(), policy)
        .with_telephony(telephony)
        .with_email(Arc::new(NoEmail))
        .with_audit_log(audit);

    match engine.refresh_members().await {
        Ok(count) => info!(count, "Loaded guild members"),
        Err(e) => warn!(error = %e, "Could not load guild members; will retry on the next refresh"),
    }
    let refresh = engine.spawn_member_refresh(DEFAULT_REFRESH_INTERVAL)?;

    if let Err(e) = messaging
        .send_channel_message(engine.policy().primary_channel.as_ref(), WELCOME_MESSAGE)
        .await
    {
        warn!(error = %e, "Failed to post welcome message");
    }

    // === Run ===
    let shutdown = CancellationToken::new();
    let ctrl_c = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, shutting down");
                shutdown.cancel();
            }
        })
    };

    let mut console = OperatorConsole::new(engine.clone(), cli.operator.as_str());
    if let Some(roster) = roster {
        console = console.with_roster(roster);
    }
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    if let Err(e) = console.run(stdin, shutdown.clone()).await {
        error!(error = %e, "Console input failed");
    }

    // === Shutdown ===
    shutdown.cancel();
    ctrl_c.abort();
    refresh.shutdown().await;

    let outstanding = engine.outstanding_votes().len();
    if outstanding > 0 {
        info!(outstanding, "Discarding outstanding votes");
    }
    info!("panicbot stopped");
    Ok(())
}

/// Initialise tracing; the returned guard flushes the file writer on drop.
fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    let requested = cli.log_directive().unwrap_or("info");
    let (level, invalid) = match requested.parse::<LevelFilter>() {
        Ok(level) => (level, false),
        Err(_) => (LevelFilter::INFO, true),
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "panicbot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    if invalid {
        error!(
            level = requested,
            "Invalid log level, falling back to info"
        );
    }
    guard
}

/// Print configuration issues; any error aborts startup.
fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("Config: {}", issue.message);
    }

    let errors: Vec<&ConfigIssue> = issues.iter().filter(|i| i.is_error()).collect();
    if errors.is_empty() {
        return Ok(());
    }
    for issue in &errors {
        error!("Config: {}", issue.message);
    }
    bail!(
        "Configuration has {} error(s); fix them and restart",
        errors.len()
    )
}

fn build_telephony(config: &FileConfig) -> Result<Arc<dyn TelephonyGateway>> {
    let twilio = &config.alerting_methods.twilio;
    if !twilio.is_configured() {
        return Ok(Arc::new(NoTelephony));
    }
    let gateway = TwilioGateway::from_config(twilio)?;
    info!(from = gateway.from_number(), "Twilio SMS alerts enabled");
    Ok(Arc::new(gateway))
}

/// Initial roster for the console gateway.
///
/// The operator holds every allow-listed role so they can trigger both
/// commands; listed users and contacts are present without roles. More
/// members are added with `/roles`.
fn console_roster(policy: &VotingPolicy, operator: &str) -> Vec<GuildMember> {
    let mut roster: BTreeMap<MemberId, Vec<RoleId>> = BTreeMap::new();

    let mut operator_roles = Vec::new();
    for kind in [VoteKind::Alert, VoteKind::Ban] {
        let allow_list = policy.eligibility.allow_list(kind);
        for role in &allow_list.roles {
            if !operator_roles.contains(role) {
                operator_roles.push(role.clone());
            }
        }
        for user in &allow_list.users {
            roster.entry(user.clone()).or_default();
        }
    }
    for user in &policy.contacts.discord_users {
        roster.entry(user.clone()).or_default();
    }
    roster.insert(MemberId::from(operator), operator_roles);

    roster
        .into_iter()
        .map(|(id, roles)| GuildMember::new(id, roles))
        .collect()
}
