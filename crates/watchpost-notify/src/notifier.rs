use std::sync::Arc;

use anyhow::Result;
use watchpost_storage::{AlertConditionRow, AlertEventRow, Store};

use crate::email::EmailSender;
use crate::template;

const DEFAULT_SUBJECT: &str = "Alert triggered: {{alertName}}";
const DEFAULT_BODY: &str = "Alert: {{alertName}}\nTime: {{alertTime}}\nThreshold: {{thresholdValue}}\n\n{{notes}}\n";

/// Sends the alert email for a freshly recorded event.
///
/// The condition's `email_template_id` selects the template; without one
/// (or if the row is gone) a built-in plain-text template is used.
pub struct Notifier {
    store: Arc<Store>,
    sender: Option<EmailSender>,
}

impl Notifier {
    pub fn new(store: Arc<Store>, sender: Option<EmailSender>) -> Self {
        if sender.is_none() {
            tracing::info!("SMTP not configured, alert email disabled");
        }
        Self { store, sender }
    }

    /// Returns `Ok(true)` if a mail was actually sent.
    pub async fn notify_triggered(
        &self,
        condition: &AlertConditionRow,
        event: &AlertEventRow,
    ) -> Result<bool> {
        let Some(sender) = &self.sender else {
            return Ok(false);
        };
        if !sender.has_recipients() {
            return Ok(false);
        }

        let (subject_tpl, body_tpl) = match &condition.email_template_id {
            Some(id) => match self.store.get_template_by_id(id).await? {
                Some(t) => (t.subject, t.body),
                None => {
                    tracing::warn!(template_id = %id, condition_id = %condition.id, "Email template missing, using default");
                    (DEFAULT_SUBJECT.to_string(), DEFAULT_BODY.to_string())
                }
            },
            None => (DEFAULT_SUBJECT.to_string(), DEFAULT_BODY.to_string()),
        };

        let data = template::alert_data(
            &condition.name,
            &event.triggered_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            &condition.threshold_value,
            event.notes.as_deref().unwrap_or(""),
        );
        let subject = template::render(&subject_tpl, &data);
        let body = template::render(&body_tpl, &data);

        sender.send(&subject, &body).await?;
        tracing::info!(condition_id = %condition.id, event_id = %event.id, "Alert email sent");
        Ok(true)
    }
}
