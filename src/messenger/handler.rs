//! Messenger webhook handling.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::common::error::ChannelResult;
use crate::common::types::PassageResult;
use crate::messenger::client::{MessagingEvent, MessengerClient, WebhookPayload};
use crate::messenger::signature::verify_signature;
use crate::reply::{split_message, ReplyComposer, ReplyKind, MESSENGER_MAX_LEN};
use crate::scripture::PassageResolver;

/// One Send API call in a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Video(String),
    Text(String),
}

/// Answers Messenger conversations that mention a passage.
pub struct MessengerBot {
    client: MessengerClient,
    resolver: Arc<PassageResolver>,
    composer: ReplyComposer,
    verify_token: String,
    app_secret: Option<String>,
    /// Epoch ms of the newest handled event.
    last_seen: AtomicI64,
}

impl MessengerBot {
    pub fn new(
        client: MessengerClient,
        resolver: Arc<PassageResolver>,
        verify_token: impl Into<String>,
        app_secret: Option<String>,
    ) -> Self {
        Self {
            client,
            resolver,
            composer: ReplyComposer::messenger(),
            verify_token: verify_token.into(),
            app_secret,
            last_seen: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    /// Webhook subscription handshake. Returns the challenge to echo back.
    pub fn verify_subscription<'a>(
        &self,
        mode: Option<&str>,
        token: Option<&str>,
        challenge: Option<&'a str>,
    ) -> Option<&'a str> {
        if mode == Some("subscribe") && token == Some(self.verify_token.as_str()) {
            info!("Messenger webhook subscription verified");
            challenge
        } else {
            None
        }
    }

    /// Check the delivery signature when an app secret is configured.
    pub fn authenticate(&self, body: &[u8], signature: Option<&str>) -> ChannelResult<()> {
        match self.app_secret {
            Some(ref secret) => verify_signature(secret, body, signature),
            None => Ok(()),
        }
    }

    /// Handle every new messaging event in a delivery concurrently.
    pub async fn handle_payload(&self, payload: WebhookPayload) {
        if payload.object != "page" {
            debug!("Ignoring webhook for object '{}'", payload.object);
            return;
        }

        let events = payload
            .entry
            .into_iter()
            .flat_map(|entry| entry.messaging)
            .collect();
        let events = self.claim_new(events);
        if events.is_empty() {
            return;
        }

        let results = join_all(events.iter().map(|e| self.handle_event(e))).await;
        for e in results.into_iter().filter_map(|r| r.err()) {
            error!("Failed to answer Messenger event: {}", e);
        }
    }

    /// Keep the events newer than anything already claimed and advance the
    /// clock past them in one step. An event is claimed by at most one
    /// delivery.
    fn claim_new(&self, mut events: Vec<MessagingEvent>) -> Vec<MessagingEvent> {
        let Some(newest) = events.iter().map(|e| e.timestamp).max() else {
            return events;
        };
        let since = self.last_seen.fetch_max(newest, Ordering::SeqCst);
        events.retain(|event| event.timestamp > since);
        events
    }

    async fn handle_event(&self, event: &MessagingEvent) -> ChannelResult<()> {
        let Some(text) = event
            .message
            .as_ref()
            .filter(|m| !m.is_echo)
            .and_then(|m| m.text.as_deref())
        else {
            return Ok(());
        };
        if !self.resolver.contains_reference(text) {
            return Ok(());
        }

        let recipient = event.sender.id.as_str();
        self.client.typing_on(recipient).await?;
        let result = self.resolver.resolve(text).await;

        for outgoing in self.plan_reply(&result) {
            match outgoing {
                Outgoing::Video(url) => self.client.send_video(recipient, &url).await?,
                Outgoing::Text(text) => self.client.send_text(recipient, &text).await?,
            }
        }
        Ok(())
    }

    /// Messages to send for a result: one video goes out as an attachment
    /// with a caption, anything else as text.
    pub fn plan_reply(&self, result: &PassageResult) -> Vec<Outgoing> {
        match ReplyKind::of(result) {
            ReplyKind::Single => {
                let video = &result.videos[0];
                vec![
                    Outgoing::Video(video.media_path.clone()),
                    Outgoing::Text(self.composer.caption(video)),
                ]
            }
            _ => split_message(&self.composer.compose(result), MESSENGER_MAX_LEN)
                .into_iter()
                .map(Outgoing::Text)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::stub::{video, StubCatalog};
    use crate::scripture::{BookRegistry, CollectionSettings};

    fn bot(app_secret: Option<&str>) -> MessengerBot {
        let registry = Arc::new(BookRegistry::new().unwrap());
        let settings = CollectionSettings {
            old_testament_collection: "OT".to_string(),
            new_testament_collection: "NT".to_string(),
            video_base_url: "http://video.dbt.io/".to_string(),
        };
        let catalog = Arc::new(StubCatalog::default());
        let resolver = PassageResolver::new(registry, catalog, settings).unwrap();
        let client = MessengerClient::new("page").unwrap();
        MessengerBot::new(client, Arc::new(resolver), "verify", app_secret.map(String::from))
    }

    fn result_with(count: usize) -> PassageResult {
        let mut result = PassageResult::book_only("John", true);
        for verse in 0..count as u32 {
            result
                .videos
                .push(video("John", 3, 16 + verse, "john/3.mp4").into_item("John", "http://v/"));
        }
        result
    }

    #[test]
    fn test_subscription_handshake() {
        let bot = bot(None);

        assert_eq!(
            bot.verify_subscription(Some("subscribe"), Some("verify"), Some("42")),
            Some("42")
        );
        assert_eq!(bot.verify_subscription(Some("subscribe"), Some("wrong"), Some("42")), None);
        assert_eq!(bot.verify_subscription(None, Some("verify"), Some("42")), None);
    }

    #[test]
    fn test_authenticate_without_secret_accepts_anything() {
        assert!(bot(None).authenticate(b"{}", None).is_ok());
    }

    #[test]
    fn test_authenticate_with_secret_requires_signature() {
        assert!(bot(Some("secret")).authenticate(b"{}", None).is_err());
    }

    #[test]
    fn test_single_video_is_attachment_and_caption() {
        let plan = bot(None).plan_reply(&result_with(1));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0], Outgoing::Video("http://v/john/3.mp4".to_string()));
        match &plan[1] {
            Outgoing::Text(text) => {
                assert!(text.starts_with("John 3:16\n\n"));
                assert!(text.contains("Deaf Bible Society"));
            }
            other => panic!("expected caption, got {:?}", other),
        }
    }

    #[test]
    fn test_many_videos_are_a_text_list() {
        let plan = bot(None).plan_reply(&result_with(3));

        assert!(plan.iter().all(|o| matches!(o, Outgoing::Text(_))));
        match &plan[0] {
            Outgoing::Text(text) => assert!(text.starts_with("I found 3 videos for John:")),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_unavailable_book_reply() {
        let plan = bot(None).plan_reply(&PassageResult::book_only("Leviticus", false));

        assert_eq!(
            plan,
            vec![Outgoing::Text(
                "Sorry, Leviticus is not yet available in American Sign Language.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_stale_events_are_skipped() {
        let bot = bot(None);
        let since = bot.last_seen.load(Ordering::SeqCst);
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "object": "page",
            "entry": [{
                "messaging": [{
                    "sender": {"id": "USER"},
                    "timestamp": since - 1000,
                    "message": {"text": "John 3:16"}
                }]
            }]
        }))
        .unwrap();

        bot.handle_payload(payload).await;

        assert_eq!(bot.last_seen.load(Ordering::SeqCst), since);
    }

    #[test]
    fn test_overlapping_deliveries_claim_events_once() {
        let bot = bot(None);
        let at = bot.last_seen.load(Ordering::SeqCst) + 1000;
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "object": "page",
            "entry": [{
                "messaging": [
                    {"sender": {"id": "A"}, "timestamp": at, "message": {"text": "John 3:16"}},
                    {"sender": {"id": "B"}, "timestamp": at - 10, "message": {"text": "Mark 1:1"}}
                ]
            }]
        }))
        .unwrap();
        let events: Vec<MessagingEvent> = payload.entry[0].messaging.clone();

        let claimed = std::thread::scope(|scope| {
            let first = scope.spawn(|| bot.claim_new(events.clone()).len());
            let second = scope.spawn(|| bot.claim_new(events.clone()).len());
            first.join().unwrap() + second.join().unwrap()
        });

        assert_eq!(claimed, 2);
        assert_eq!(bot.last_seen.load(Ordering::SeqCst), at);
        assert!(bot.claim_new(events).is_empty());
    }

    #[tokio::test]
    async fn test_events_without_citation_advance_clock() {
        let bot = bot(None);
        let later = bot.last_seen.load(Ordering::SeqCst) + 5000;
        let payload: WebhookPayload = serde_json::from_value(serde_json::json!({
            "object": "page",
            "entry": [{
                "messaging": [{
                    "sender": {"id": "USER"},
                    "timestamp": later,
                    "message": {"text": "hello there"}
                }]
            }]
        }))
        .unwrap();

        bot.handle_payload(payload).await;

        assert_eq!(bot.last_seen.load(Ordering::SeqCst), later);
    }
}
