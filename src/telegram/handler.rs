//! Telegram update handling and the polling loop.

use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::common::error::ChannelResult;
use crate::reply::{passage_label, split_message, ReplyComposer, TELEGRAM_MAX_LEN};
use crate::scripture::PassageResolver;
use crate::telegram::client::{InlineArticle, Message, TelegramClient, Update};

/// What an incoming message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// `/start`
    Start,
    /// `/get <text>`
    Get(String),
    /// Any other text.
    Text(String),
}

/// Classify message text. Commands may carry a `@BotName` suffix.
pub fn parse_command(text: &str) -> Incoming {
    let trimmed = text.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };
    let command = head.split('@').next().unwrap_or(head);

    match command {
        "/start" => Incoming::Start,
        "/get" => Incoming::Get(rest.to_string()),
        _ => Incoming::Text(trimmed.to_string()),
    }
}

/// Exponential backoff for failed polls.
/// 5s initial, 5min max, factor 2, with jitter, unlimited retries.
fn poll_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(5))
        .with_max_delay(Duration::from_secs(300))
        .with_factor(2.0)
        .with_jitter()
        .without_max_times()
        .build()
}

/// Answers Telegram messages and inline queries with passage videos.
pub struct TelegramBot {
    client: TelegramClient,
    resolver: Arc<PassageResolver>,
    composer: ReplyComposer,
    poll_interval: Duration,
    /// Unix seconds. Messages dated earlier are ignored.
    started_at: i64,
}

impl TelegramBot {
    pub fn new(
        client: TelegramClient,
        resolver: Arc<PassageResolver>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            resolver,
            composer: ReplyComposer::telegram(),
            poll_interval,
            started_at: Utc::now().timestamp(),
        }
    }

    /// Poll for updates until shutdown. Each cycle finishes before the next starts.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("Telegram polling started");
        let mut offset = 0;
        let mut backoff = poll_backoff();

        loop {
            let polled = tokio::select! {
                polled = self.client.get_updates(offset, self.poll_interval) => polled,
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                    continue;
                }
            };

            let delay = match polled {
                Ok(updates) => {
                    backoff = poll_backoff();
                    if let Some(last) = updates.iter().map(|u| u.update_id).max() {
                        offset = last + 1;
                    }
                    self.handle_batch(updates).await;
                    continue;
                }
                Err(e) => {
                    let delay = backoff.next().unwrap_or(Duration::from_secs(300));
                    warn!(
                        "Telegram poll failed: {}. Retrying in {:.1}s...",
                        e,
                        delay.as_secs_f64()
                    );
                    delay
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {},
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Telegram polling stopped");
    }

    /// Handle a batch of updates concurrently.
    async fn handle_batch(&self, updates: Vec<Update>) {
        if updates.is_empty() {
            return;
        }
        debug!("Handling {} Telegram update(s)", updates.len());

        let results = join_all(updates.into_iter().map(|u| self.handle_update(u))).await;
        for e in results.into_iter().filter_map(|r| r.err()) {
            error!("Failed to answer Telegram update: {}", e);
        }
    }

    async fn handle_update(&self, update: Update) -> ChannelResult<()> {
        if let Some(message) = update.message {
            if let Some(reply) = self.reply_to(&message).await {
                for chunk in split_message(&reply, TELEGRAM_MAX_LEN) {
                    self.client.send_message(message.chat.id, &chunk).await?;
                }
            }
        } else if let Some(query) = update.inline_query {
            debug!("Inline query from {}: {}", query.from.display_name(), query.query);
            let articles = self.inline_articles(&query.query).await;
            self.client.answer_inline_query(&query.id, &articles).await?;
        }
        Ok(())
    }

    /// Reply text for a message, or None when the bot stays silent.
    pub async fn reply_to(&self, message: &Message) -> Option<String> {
        if message.date < self.started_at {
            debug!("Skipping message {} sent before startup", message.message_id);
            return None;
        }
        let text = message.text.as_deref()?;

        match parse_command(text) {
            Incoming::Start => {
                let user = message
                    .from
                    .as_ref()
                    .map(|u| u.display_name())
                    .unwrap_or("friend");
                Some(self.composer.greeting(user))
            }
            Incoming::Get(query) => {
                let result = self.resolver.resolve(&query).await;
                Some(self.composer.compose(&result))
            }
            Incoming::Text(text) => {
                if !self.resolver.contains_reference(&text) {
                    return None;
                }
                let result = self.resolver.resolve(&text).await;
                Some(self.composer.compose(&result))
            }
        }
    }

    /// Inline results: a citation, or else a book name at its first chapter.
    pub async fn inline_articles(&self, query: &str) -> Vec<InlineArticle> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let result = if self.resolver.contains_reference(query) {
            self.resolver.resolve(query).await
        } else {
            self.resolver.resolve_book(query, None).await
        };

        result
            .videos
            .iter()
            .enumerate()
            .map(|(i, video)| InlineArticle {
                id: i.to_string(),
                title: passage_label(video),
                description: video.title.clone(),
                url: video.media_path.clone(),
                message_text: self.composer.video(video),
            })
            .collect()
    }
}
