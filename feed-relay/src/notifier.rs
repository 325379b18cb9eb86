use crate::types::{DeliveryError, Notification, NotificationKind, Notifier};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::info;

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

const ARTICLE_COLOR: u32 = 0x3498db;
const UPLOAD_COLOR: u32 = 0xe74c3c;
const NEWS_FOOTER: &str = "Qurrent Events • News";
const YOUTUBE_FOOTER: &str = "Qurrent Events • YouTube";

/// Posts notifications as embeds into one Discord text channel through the
/// REST API.
pub struct DiscordNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    channel_id: u64,
}

impl DiscordNotifier {
    pub fn new(client: Client, bot_token: impl Into<String>, channel_id: u64) -> Self {
        Self {
            client,
            api_base: DISCORD_API_BASE.to_string(),
            bot_token: bot_token.into(),
            channel_id,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn channel_url(&self) -> String {
        format!("{}/channels/{}", self.api_base, self.channel_id)
    }

    async fn check_response(&self, resp: reqwest::Response) -> Result<(), DeliveryError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND || status == StatusCode::FORBIDDEN {
            return Err(DeliveryError::DestinationUnavailable {
                destination: self.channel_id.to_string(),
            });
        }
        let body = resp.text().await.unwrap_or_default();
        Err(DeliveryError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .post(format!("{}/messages", self.channel_url()))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&json!({ "embeds": [build_embed(notification)] }))
            .send()
            .await
            .map_err(|e| DeliveryError::Http(e.to_string()))?;

        self.check_response(resp).await
    }

    async fn check_destination(&self) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .get(self.channel_url())
            .header("Authorization", format!("Bot {}", self.bot_token))
            .send()
            .await
            .map_err(|e| DeliveryError::Http(e.to_string()))?;

        self.check_response(resp).await
    }

    fn name(&self) -> String {
        format!("discord channel {}", self.channel_id)
    }
}

/// Render a notification as a Discord embed object.
pub fn build_embed(notification: &Notification) -> Value {
    let timestamp = Utc::now().to_rfc3339();

    match notification.kind {
        NotificationKind::Article => {
            let mut fields = vec![json!({
                "name": "Source",
                "value": notification.source_name,
                "inline": true
            })];
            if let Some(published) = &notification.published {
                fields.push(json!({ "name": "Published", "value": published, "inline": true }));
            }

            json!({
                "title": format!("📰 {}", notification.title),
                "url": notification.link,
                "description": notification.summary.as_deref().unwrap_or(""),
                "color": ARTICLE_COLOR,
                "timestamp": timestamp,
                "fields": fields,
                "footer": { "text": NEWS_FOOTER }
            })
        }
        NotificationKind::Upload => {
            let mut embed = json!({
                "title": format!("🎬 New Video: {}", notification.title),
                "url": notification.link,
                "description": format!("**{}** just uploaded a new video!", notification.source_name),
                "color": UPLOAD_COLOR,
                "timestamp": timestamp,
                "fields": [{
                    "name": "Published",
                    "value": notification.published.as_deref().unwrap_or("Unknown"),
                    "inline": true
                }],
                "footer": { "text": YOUTUBE_FOOTER }
            });
            if let Some(thumbnail) = &notification.thumbnail {
                embed["thumbnail"] = json!({ "url": thumbnail });
            }
            embed
        }
    }
}

/// Dry-run notifier: writes each notification to the log instead of a chat.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        info!(
            kind = ?notification.kind,
            source = %notification.source_name,
            link = %notification.link,
            "[dry-run] {}",
            notification.title
        );
        Ok(())
    }

    fn name(&self) -> String {
        "log".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn article() -> Notification {
        Notification {
            kind: NotificationKind::Article,
            title: "IonQ ships new system".to_string(),
            link: "https://wire.example/ionq".to_string(),
            summary: Some("Trapped ions".to_string()),
            source_name: "Quantum Wire".to_string(),
            published: Some("2025-07-01T09:00:00+00:00".to_string()),
            thumbnail: None,
        }
    }

    fn upload() -> Notification {
        Notification {
            kind: NotificationKind::Upload,
            title: "Quantum search, visualized".to_string(),
            link: "https://www.youtube.com/watch?v=abc123XYZ_0".to_string(),
            summary: None,
            source_name: "3Blue1Brown".to_string(),
            published: None,
            thumbnail: Some("https://i1.ytimg.com/vi/abc123XYZ_0/hqdefault.jpg".to_string()),
        }
    }

    #[test]
    fn article_embed_layout() {
        let embed = build_embed(&article());
        assert_eq!(embed["title"], "📰 IonQ ships new system");
        assert_eq!(embed["url"], "https://wire.example/ionq");
        assert_eq!(embed["description"], "Trapped ions");
        assert_eq!(embed["color"], ARTICLE_COLOR);
        assert_eq!(embed["fields"][0]["name"], "Source");
        assert_eq!(embed["fields"][0]["value"], "Quantum Wire");
        assert_eq!(embed["fields"][1]["name"], "Published");
        assert_eq!(embed["footer"]["text"], NEWS_FOOTER);
    }

    #[test]
    fn upload_embed_layout() {
        let embed = build_embed(&upload());
        assert_eq!(embed["title"], "🎬 New Video: Quantum search, visualized");
        assert_eq!(embed["description"], "**3Blue1Brown** just uploaded a new video!");
        assert_eq!(embed["fields"][0]["value"], "Unknown");
        assert_eq!(
            embed["thumbnail"]["url"],
            "https://i1.ytimg.com/vi/abc123XYZ_0/hqdefault.jpg"
        );
        assert_eq!(embed["color"], UPLOAD_COLOR);
    }

    #[tokio::test]
    async fn posts_embed_with_bot_authorization() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/channels/42/messages")
                .header("Authorization", "Bot secret-token");
            then.status(200).json_body(json!({ "id": "1" }));
        });

        let notifier = DiscordNotifier::new(Client::new(), "secret-token", 42)
            .with_api_base(server.base_url());
        notifier.notify(&article()).await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn missing_channel_is_destination_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/channels/7/messages");
            then.status(404).json_body(json!({ "message": "Unknown Channel", "code": 10003 }));
        });

        let notifier = DiscordNotifier::new(Client::new(), "t", 7).with_api_base(server.base_url());
        let err = notifier.notify(&upload()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::DestinationUnavailable { .. }), "got {:?}", err);
    }

    #[tokio::test]
    async fn other_failures_carry_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/channels/7/messages");
            then.status(429).body("slow down");
        });

        let notifier = DiscordNotifier::new(Client::new(), "t", 7).with_api_base(server.base_url());
        match notifier.notify(&article()).await {
            Err(DeliveryError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn destination_check_hits_channel_endpoint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/channels/42");
            then.status(200).json_body(json!({ "id": "42" }));
        });

        let notifier = DiscordNotifier::new(Client::new(), "t", 42).with_api_base(server.base_url());
        notifier.check_destination().await.unwrap();
        mock.assert();
    }
}
