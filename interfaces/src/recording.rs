use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::defs::DeliveryError;
use crate::defs::Notification;
use crate::defs::Notifier;

/// Keeps every notification it is handed. With `unavailable` set, every
/// delivery fails as if the destination had been removed, but the attempt is
/// still recorded.
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notification>>,
    attempts: Mutex<usize>,
    unavailable: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
            unavailable: None,
        }
    }

    pub fn unavailable(destination: impl Into<String>) -> Self {
        Self {
            unavailable: Some(destination.into()),
            ..Self::new()
        }
    }

    pub async fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().await.clone()
    }

    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        *self.attempts.lock().await += 1;
        if let Some(destination) = &self.unavailable {
            return Err(DeliveryError::DestinationUnavailable {
                destination: destination.clone(),
            });
        }
        self.delivered.lock().await.push(notification.clone());
        Ok(())
    }

    async fn check_destination(&self) -> Result<(), DeliveryError> {
        match &self.unavailable {
            Some(destination) => Err(DeliveryError::DestinationUnavailable {
                destination: destination.clone(),
            }),
            None => Ok(()),
        }
    }

    fn name(&self) -> String {
        "recording".to_owned()
    }
}
