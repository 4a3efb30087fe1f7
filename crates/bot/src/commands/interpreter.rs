//! Running chat commands.

use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use esa_gatekeeper_core::{Email, RequestId, ScreenName};
use tracing::{info, instrument};

use super::discovery::select_expired;
use super::error::CommandError;
use super::parse::Command;
use crate::esa::{AccountDirectory, MemberQuery};
use crate::slack::format::{code_block, inline_code, strip_mailto, user_link};
use crate::slack::{ChatTransport, Message, MessageEvent};
use crate::workflow::{Approvers, PendingRequest, PendingStore, Renderer, Target};

/// Static command settings.
#[derive(Debug, Clone)]
pub struct CommandSettings {
    pub bot_id: String,
    pub bot_name: String,
    /// The only channel commands are accepted from.
    pub channel_id: String,
    pub usage_url: Option<String>,
    /// Domains invitations may target. Empty allows every domain.
    pub allowed_email_domains: Vec<String>,
    /// Minimum, and default, number of months for `cleanup`.
    pub min_expire_months: u32,
    pub organizations: Vec<String>,
}

/// What a command led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Not a command for this bot.
    Ignored,
    /// Answered without creating a request.
    Replied,
    /// A pending request was created and proposed.
    Proposed(RequestId),
}

/// Interprets channel messages that mention the bot.
pub struct CommandInterpreter {
    chat: Arc<dyn ChatTransport>,
    directory: Arc<dyn AccountDirectory>,
    store: PendingStore,
    approvers: Approvers,
    renderer: Renderer,
    settings: CommandSettings,
}

impl std::fmt::Debug for CommandInterpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInterpreter")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CommandInterpreter {
    #[must_use]
    pub fn new(
        chat: Arc<dyn ChatTransport>,
        directory: Arc<dyn AccountDirectory>,
        store: PendingStore,
        approvers: Approvers,
        renderer: Renderer,
        settings: CommandSettings,
    ) -> Self {
        Self {
            chat,
            directory,
            store,
            approvers,
            renderer,
            settings,
        }
    }

    /// Post a plain text reply.
    ///
    /// # Errors
    ///
    /// Returns the transport error if posting fails.
    pub async fn reply(&self, channel: &str, text: &str) -> Result<(), CommandError> {
        self.chat.post_message(channel, &Message::text(text)).await?;
        Ok(())
    }

    /// Handle one message event.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] for invalid arguments and failed calls.
    /// No request is stored when an error is returned.
    #[instrument(skip_all, fields(user_id = %event.user, ts = %event.ts))]
    pub async fn handle(&self, event: &MessageEvent) -> Result<CommandOutcome, CommandError> {
        if event.channel != self.settings.channel_id || !event.is_user_message() {
            return Ok(CommandOutcome::Ignored);
        }
        let mention = user_link(&self.settings.bot_id);
        let Some(rest) = event.text.strip_prefix(mention.as_str()) else {
            return Ok(CommandOutcome::Ignored);
        };

        let command = Command::parse(rest)?;
        info!(command = ?command, "Command received");
        match command {
            Command::Help => self.help(&event.channel).await,
            Command::Admins => self.admins(&event.channel).await,
            Command::Invite { target } => self.invite(event, target).await,
            Command::Delete { target } => self.delete(event, target).await,
            Command::Cleanup { months } => self.cleanup(event, months).await,
        }
    }

    async fn help(&self, channel: &str) -> Result<CommandOutcome, CommandError> {
        let bot = format!("@{}", self.settings.bot_name);
        let commands = [
            ("invite", "Invite yourself"),
            ("invite <email>", "Invite the email address"),
            ("delete <screen_name>", "Delete the account"),
            ("cleanup", "Delete accounts that have not been accessed recently"),
            ("cleanup <months>", "Same, with the number of months"),
            ("admins", "List the administrators"),
            ("help", "Show this help"),
        ];
        let lines: Vec<String> = commands
            .iter()
            .map(|(usage, description)| format!("{:<40}{description}", format!("{bot} {usage}")))
            .collect();

        let mut text = code_block(&lines);
        if let Some(url) = &self.settings.usage_url {
            text.push_str(&format!("\nSee {url} for details"));
        }
        self.reply(channel, &text).await?;
        Ok(CommandOutcome::Replied)
    }

    async fn admins(&self, channel: &str) -> Result<CommandOutcome, CommandError> {
        let lines: Vec<String> = self
            .approvers
            .names()
            .into_iter()
            .map(|name| format!("@{name}"))
            .collect();
        self.reply(channel, &format!("Administrators\n{}", code_block(&lines)))
            .await?;
        Ok(CommandOutcome::Replied)
    }

    async fn invite(
        &self,
        event: &MessageEvent,
        target: Option<String>,
    ) -> Result<CommandOutcome, CommandError> {
        let owner = self.chat.user_info(&event.user).await?;
        let raw = target.map_or_else(|| owner.email.clone(), |t| strip_mailto(&t).to_string());
        let email = self.validate_email(&raw)?;
        let self_invite = email.as_str().eq_ignore_ascii_case(&owner.email);

        let request = PendingRequest::new(self.store.generate(), Target::Invite(email), owner);
        let message =
            self.renderer
                .invite_proposal(&request, &self.settings.organizations, self_invite);
        self.propose(&event.channel, request, &message).await
    }

    async fn delete(
        &self,
        event: &MessageEvent,
        target: Option<String>,
    ) -> Result<CommandOutcome, CommandError> {
        let input = target.ok_or(CommandError::MissingTarget)?;
        let screen_name =
            ScreenName::parse(&input).map_err(|source| CommandError::InvalidScreenName {
                input: input.clone(),
                source,
            })?;
        let owner = self.chat.user_info(&event.user).await?;

        let profile_url = self.directory.profile_url(&screen_name);
        let request =
            PendingRequest::new(self.store.generate(), Target::Delete(screen_name), owner);
        let message = self.renderer.delete_proposal(&request, &profile_url);
        self.propose(&event.channel, request, &message).await
    }

    async fn cleanup(
        &self,
        event: &MessageEvent,
        months: Option<String>,
    ) -> Result<CommandOutcome, CommandError> {
        let months = self.validate_months(months)?;
        let page = self
            .directory
            .list_members(&MemberQuery::least_recently_accessed())
            .await
            .map_err(CommandError::Directory)?;

        let cutoff = self
            .store
            .now()
            .checked_sub_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let expired = select_expired(&page.members, cutoff);
        info!(months, cutoff = %cutoff, count = expired.len(), "Expired accounts discovered");
        if expired.is_empty() {
            self.reply(&event.channel, "No accounts match the conditions")
                .await?;
            return Ok(CommandOutcome::Replied);
        }

        let owner = self.chat.user_info(&event.user).await?;
        let lines: Vec<String> = expired
            .iter()
            .map(|member| {
                format!(
                    "- ({}) {}",
                    self.renderer
                        .local(member.last_accessed)
                        .format("%Y/%m/%d"),
                    self.directory.profile_url(&member.screen_name)
                )
            })
            .collect();
        let batch = expired.into_iter().map(|member| member.screen_name).collect();
        let request = PendingRequest::new(self.store.generate(), Target::Cleanup(batch), owner);
        let message = self.renderer.cleanup_proposal(&request, cutoff, &lines);
        self.propose(&event.channel, request, &message).await
    }

    async fn propose(
        &self,
        channel: &str,
        request: PendingRequest,
        message: &Message,
    ) -> Result<CommandOutcome, CommandError> {
        let id = request.id.clone();
        self.chat.post_message(channel, message).await?;
        info!(request_id = %id, kind = %request.kind(), "Request proposed");
        self.store.put(request).await;
        Ok(CommandOutcome::Proposed(id))
    }

    fn validate_email(&self, raw: &str) -> Result<Email, CommandError> {
        let email = Email::parse(raw).map_err(|source| CommandError::InvalidEmail {
            input: raw.to_string(),
            source,
        })?;
        let domains = &self.settings.allowed_email_domains;
        if !domains.is_empty()
            && !domains
                .iter()
                .any(|domain| domain.eq_ignore_ascii_case(email.domain()))
        {
            return Err(CommandError::DisallowedDomain {
                email: email.to_string(),
                allowed: domains
                    .iter()
                    .map(|domain| inline_code(domain))
                    .collect::<Vec<_>>()
                    .join(" or "),
            });
        }
        Ok(email)
    }

    fn validate_months(&self, input: Option<String>) -> Result<u32, CommandError> {
        let min = self.settings.min_expire_months;
        let Some(input) = input else {
            return Ok(min);
        };
        match input.parse::<u32>() {
            Ok(months) if months >= min => Ok(months),
            _ => Err(CommandError::InvalidMonth { input, min }),
        }
    }
}
