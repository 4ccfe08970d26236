//! Customer notifications.
//!
//! Delivery is fire-and-forget: a failed send is logged and never fails the
//! operation that triggered it.

use rust_decimal::Decimal;

use crate::{Currency, User};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Welcome {
        email: String,
        full_name: String,
    },
    QuoteReady {
        email: String,
        quote_number: String,
        shipping_method: Option<String>,
        total_cost: Option<Decimal>,
        currency: Currency,
    },
    TrackingUpdate {
        email: String,
        /// SMS is sent only when the owner has a phone number.
        phone: Option<String>,
        tracking_number: String,
        status: String,
        location: Option<String>,
    },
}

impl Notification {
    #[must_use]
    pub fn welcome(user: &User) -> Self {
        Self::Welcome {
            email: user.email.clone(),
            full_name: user.full_name.clone(),
        }
    }

    #[must_use]
    pub fn subject(&self) -> String {
        match self {
            Self::Welcome { .. } => "Welcome to Golden Sail Logistics".to_string(),
            Self::QuoteReady { quote_number, .. } => {
                format!("Your Shipping Quote: {quote_number}")
            }
            Self::TrackingUpdate {
                tracking_number, ..
            } => format!("Shipment Update: {tracking_number}"),
        }
    }

    #[must_use]
    pub fn recipient(&self) -> &str {
        match self {
            Self::Welcome { email, .. }
            | Self::QuoteReady { email, .. }
            | Self::TrackingUpdate { email, .. } => email,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// A delivery channel for [`Notification`]s.
pub trait Notifier: Send + Sync {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Sends `notification` and logs a failure instead of returning it.
pub fn notify(notifier: &dyn Notifier, notification: &Notification) {
    if let Err(err) = notifier.send(notification) {
        tracing::warn!(
            recipient = notification.recipient(),
            subject = %notification.subject(),
            %err,
            "notification not delivered"
        );
    }
}

/// Writes notifications to the log instead of delivering them.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let subject = notification.subject();
        match notification {
            Notification::Welcome { email, full_name } => {
                tracing::info!(channel = "email", to = %email, %subject, %full_name, "notification");
            }
            Notification::QuoteReady {
                email,
                shipping_method,
                total_cost,
                currency,
                ..
            } => {
                tracing::info!(
                    channel = "email",
                    to = %email,
                    %subject,
                    shipping_method = shipping_method.as_deref().unwrap_or("-"),
                    total_cost = ?total_cost,
                    %currency,
                    "notification"
                );
            }
            Notification::TrackingUpdate {
                email,
                phone,
                tracking_number,
                status,
                location,
            } => {
                tracing::info!(
                    channel = "email",
                    to = %email,
                    %subject,
                    %status,
                    location = location.as_deref().unwrap_or("-"),
                    "notification"
                );
                if let Some(phone) = phone {
                    tracing::info!(
                        channel = "sms",
                        to = %phone,
                        "Golden Sail: Your shipment {tracking_number} is now {status}."
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Failing(Mutex<usize>);

    impl Notifier for Failing {
        fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
            *self.0.lock().unwrap() += 1;
            Err(NotifyError("smtp down".to_string()))
        }
    }

    #[test]
    fn failed_delivery_is_swallowed() {
        let notifier = Failing(Mutex::new(0));
        notify(
            &notifier,
            &Notification::Welcome {
                email: "customer@test.com".to_string(),
                full_name: "Test Customer".to_string(),
            },
        );
        assert_eq!(*notifier.0.lock().unwrap(), 1);
    }

    #[test]
    fn subjects() {
        let update = Notification::TrackingUpdate {
            email: "customer@test.com".to_string(),
            phone: None,
            tracking_number: "RD1234567".to_string(),
            status: "in_transit".to_string(),
            location: None,
        };
        assert_eq!(update.subject(), "Shipment Update: RD1234567");
        assert_eq!(update.recipient(), "customer@test.com");
        assert!(LogNotifier.send(&update).is_ok());
    }
}
