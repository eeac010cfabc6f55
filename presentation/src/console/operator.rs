//! Interactive operator console
//!
//! Reads slash-style commands from a line source and feeds them to the
//! engine as if they were platform interactions, acting as one member at a
//! time.

use super::command::{ConsoleCommand, HELP, parse_console_command};
use super::gateway::ConsoleMessagingGateway;
use colored::Colorize;
use panicbot_application::{PanicEventHandler, PanicVoteEngine, Reply};
use panicbot_domain::{Actor, MemberId, RoleId};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Result of executing one console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(String),
    Quit,
}

pub struct OperatorConsole {
    engine: PanicVoteEngine,
    /// Present when the console gateway also owns the roster
    roster: Option<Arc<ConsoleMessagingGateway>>,
    actor: MemberId,
}

impl OperatorConsole {
    pub fn new(engine: PanicVoteEngine, actor: impl Into<MemberId>) -> Self {
        Self {
            engine,
            roster: None,
            actor: actor.into(),
        }
    }

    pub fn with_roster(mut self, roster: Arc<ConsoleMessagingGateway>) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn actor(&self) -> &MemberId {
        &self.actor
    }

    /// Run until `/quit`, end of input, or `shutdown` is cancelled.
    pub async fn run<R>(&mut self, input: R, shutdown: CancellationToken) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.print_welcome();

        loop {
            let line = tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Console shutdown requested");
                    break;
                }
                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                println!("Bye!");
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.handle_line(line).await {
                Step::Continue(output) => println!("{}", output),
                Step::Quit => {
                    println!("Bye!");
                    break;
                }
            }
        }
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          panicbot - Operator Console        │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Acting as: {}", self.actor.to_string().bold());
        println!("Type /help for available commands");
        println!();
    }

    pub async fn handle_line(&mut self, line: &str) -> Step {
        match parse_console_command(line) {
            Ok(command) => self.execute(command).await,
            Err(e) => Step::Continue(e.to_string().yellow().to_string()),
        }
    }

    pub async fn execute(&mut self, command: ConsoleCommand) -> Step {
        let output = match command {
            ConsoleCommand::Quit => return Step::Quit,
            ConsoleCommand::Help => HELP.to_string(),
            ConsoleCommand::As(member) => {
                self.actor = member;
                format!("Acting as {}", self.actor.to_string().bold())
            }
            ConsoleCommand::PanicAlert { message } => {
                let actor = self.current_actor();
                render_reply(&self.engine.on_panic_alert(&actor, &message).await)
            }
            ConsoleCommand::PanicBan {
                target,
                reason,
                days,
            } => {
                let actor = self.current_actor();
                render_reply(
                    &self
                        .engine
                        .on_panic_ban(&actor, &target, &reason, days)
                        .await,
                )
            }
            ConsoleCommand::Vote { token } => {
                let token = token.or_else(|| {
                    self.roster
                        .as_ref()
                        .and_then(|roster| roster.latest_prompt(&self.actor))
                });
                match token {
                    Some(token) => {
                        render_reply(&self.engine.on_vote_button(&self.actor, &token).await)
                    }
                    None => format!(
                        "{} has not received a vote prompt; pass a token: /vote <token>",
                        self.actor
                    )
                    .yellow()
                    .to_string(),
                }
            }
            ConsoleCommand::Roles {
                member,
                added,
                removed,
            } => self.change_roles(member, added, removed).await,
            ConsoleCommand::Members => self.list_members(),
            ConsoleCommand::Votes => self.list_votes(),
        };
        Step::Continue(output)
    }

    fn current_actor(&self) -> Actor {
        Actor::new(
            self.actor.clone(),
            self.engine.directory().roles_of(&self.actor),
        )
    }

    async fn change_roles(
        &self,
        member: MemberId,
        added: Vec<RoleId>,
        removed: Vec<RoleId>,
    ) -> String {
        if added.is_empty() && removed.is_empty() {
            let roles = self.engine.directory().roles_of(&member);
            return format!("{}: {}", member.to_string().bold(), join_roles(&roles));
        }

        // The roster reports only effective changes, like a member update event
        let (added, removed) = match &self.roster {
            Some(roster) => roster.update_roles(&member, &added, &removed),
            None => (added, removed),
        };
        self.engine.on_role_change(&member, &added, &removed).await;

        let roles = self.engine.directory().roles_of(&member);
        let mut out = format!("{}: {}", member.to_string().bold(), join_roles(&roles));
        if self.engine.grace().is_in_grace(&member) {
            out.push_str(&format!(" {}", "(grace period)".yellow()));
        }
        out
    }

    fn list_members(&self) -> String {
        let members = self.engine.directory().members();
        if members.is_empty() {
            return "No known members".to_string();
        }

        let grace = self.engine.grace();
        members
            .iter()
            .map(|m| {
                let marker = if grace.is_in_grace(&m.id) {
                    format!(" {}", "(grace period)".yellow())
                } else {
                    String::new()
                };
                format!("  {}: {}{}", m.id.to_string().bold(), join_roles(&m.roles), marker)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn list_votes(&self) -> String {
        let votes = self.engine.outstanding_votes();
        if votes.is_empty() {
            return "No outstanding votes".to_string();
        }

        let required = &self.engine.policy().required_votes;
        votes
            .iter()
            .map(|vote| {
                format!(
                    "  {} {} by {}: {}/{} votes, closes {}",
                    vote.id.token().dimmed(),
                    vote.kind().to_string().bold(),
                    vote.initiator,
                    vote.ballot_count(),
                    required.for_kind(vote.kind()).required(),
                    vote.deadline.format("%H:%M:%S UTC")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn join_roles(roles: &[RoleId]) -> String {
    if roles.is_empty() {
        return "(no roles)".to_string();
    }
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_reply(reply: &Reply) -> String {
    if reply.ephemeral {
        format!("{} {}", "(only you)".dimmed(), reply.content)
    } else {
        reply.content.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panicbot_application::VotingPolicy;
    use panicbot_domain::{AllowList, GuildMember, RequiredVotes};

    async fn setup() -> (OperatorConsole, Arc<ConsoleMessagingGateway>) {
        let roster = Arc::new(
            ConsoleMessagingGateway::new(vec![
                GuildMember::new("mod0", vec![RoleId::from("mod")]),
                GuildMember::new("mod1", vec![RoleId::from("mod")]),
                GuildMember::new("mod2", vec![RoleId::from("mod")]),
                GuildMember::new("troll", vec![]),
            ])
            .quiet(),
        );
        let policy = VotingPolicy::new(
            AllowList::default().with_role("mod"),
            AllowList::default().with_role("mod"),
        )
        .with_required_votes(RequiredVotes::new(0, 2));
        let engine = PanicVoteEngine::new(roster.clone(), policy);
        engine.refresh_members().await.unwrap();

        let console = OperatorConsole::new(engine, "mod0").with_roster(roster.clone());
        (console, roster)
    }

    fn output(step: Step) -> String {
        match step {
            Step::Continue(out) => out,
            Step::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_ban_vote_through_console() {
        let (mut console, roster) = setup().await;

        let out = output(console.handle_line("/panicban troll spam 1").await);
        assert!(out.contains("A Panic Ban vote has started"));
        assert!(output(console.handle_line("/votes").await).contains("0/2 votes"));

        console.handle_line("/as mod1").await;
        let out = output(console.handle_line("/vote").await);
        assert!(out.contains("1 more vote(s) needed"));

        console.handle_line("/as mod2").await;
        let out = output(console.handle_line("/vote").await);
        assert!(out.contains("The vote passed"));

        assert!(!roster.contains(&MemberId::from("troll")));
        assert_eq!(
            output(console.handle_line("/votes").await),
            "No outstanding votes"
        );
    }

    #[tokio::test]
    async fn test_unlisted_actor_is_denied() {
        let (mut console, _) = setup().await;
        console.handle_line("/as troll").await;
        let out = output(console.handle_line("/panicban mod0 revenge").await);
        assert!(out.contains("do not have permission"));
    }

    #[tokio::test]
    async fn test_vote_without_prompt() {
        let (mut console, _) = setup().await;
        console.handle_line("/as troll").await;
        let out = output(console.handle_line("/vote").await);
        assert!(out.contains("has not received a vote prompt"));
    }

    #[tokio::test]
    async fn test_roles_update_directory_and_grace() {
        let (mut console, roster) = setup().await;

        let out = output(console.handle_line("/roles mod1 -mod +helper").await);
        assert!(out.contains("helper"));
        assert!(out.contains("(grace period)"));
        assert_eq!(
            roster.roles_of(&MemberId::from("mod1")),
            vec![RoleId::from("helper")]
        );

        let out = output(console.handle_line("/roles mod1").await);
        assert!(out.contains("helper"));
        assert!(!out.contains("mod,"));
    }

    #[tokio::test]
    async fn test_run_stops_at_quit() {
        let (mut console, _) = setup().await;
        let input: &[u8] = b"/as mod2\n\n/quit\n/as troll\n";
        console
            .run(input, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(console.actor(), &MemberId::from("mod2"));
    }

    #[tokio::test]
    async fn test_run_stops_when_cancelled() {
        let (mut console, _) = setup().await;
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        // A reader that never yields a line
        let (reader, _writer) = tokio::io::duplex(64);
        console
            .run(tokio::io::BufReader::new(reader), shutdown)
            .await
            .unwrap();
        assert_eq!(console.actor(), &MemberId::from("mod0"));
    }

    #[tokio::test]
    async fn test_parse_errors_are_reported() {
        let (mut console, _) = setup().await;
        let out = output(console.handle_line("/dance").await);
        assert!(out.contains("Unknown command"));
        assert_eq!(console.handle_line("/quit").await, Step::Quit);
    }
}
