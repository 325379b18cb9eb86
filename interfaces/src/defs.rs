use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Article,
    Upload,
}

/// A single item ready to be relayed to the chat destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub link: String,
    pub summary: Option<String>,
    pub source_name: String,
    pub published: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Destination {destination} is unavailable")]
    DestinationUnavailable { destination: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
}

// Object style note:
// A notifier is best-effort. Callers log a failed delivery and move on;
// nothing upstream retries, so implementations should not retry either.

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification to the destination.
    async fn notify(&self, notification: &Notification) -> Result<(), DeliveryError>;

    /// Confirm the destination exists and is reachable.
    async fn check_destination(&self) -> Result<(), DeliveryError> {
        Ok(())
    }

    fn name(&self) -> String;
}
