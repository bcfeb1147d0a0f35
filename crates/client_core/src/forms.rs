//! Form submission plumbing shared by every dashboard form.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::protocol::{EmbedMessageRequest, MessageSendResponse, SendMessageRequest};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    alerts::AlertNotifier,
    api::DashboardApi,
    controls::{ChannelSelect, SubmitButton, SubmitLabels},
    embed::{render_preview, ColorField, EmbedFields, EmbedPreview},
    error::{DashboardError, Result},
    lock,
};

/// Outcome reported by the backend for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmissionResult {
    pub success: bool,
    pub message: String,
}

impl FormSubmissionResult {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub &'static str);

/// A collected request body that knows which endpoint it goes to.
#[async_trait]
pub trait Submission: Send + Sync {
    /// Business refusals come back as `Ok` with `success == false`; only
    /// transport and decode problems are `Err`.
    async fn submit(&self, api: &dyn DashboardApi) -> Result<FormSubmissionResult>;
}

/// Folds a backend rejection into a failed result so callers only see `Err`
/// for transport problems.
pub(crate) fn business_outcome<T>(
    reply: Result<T>,
    on_ok: impl FnOnce(T) -> FormSubmissionResult,
) -> Result<FormSubmissionResult> {
    match reply {
        Ok(body) => Ok(on_ok(body)),
        Err(DashboardError::Backend(rejection)) => {
            Ok(FormSubmissionResult::failed(rejection.detail))
        }
        Err(err) => Err(err),
    }
}

fn message_outcome(body: MessageSendResponse, sent: &str) -> FormSubmissionResult {
    if body.success {
        let channel = body.channel.unwrap_or_default();
        FormSubmissionResult::succeeded(format!("{sent} to #{channel}"))
    } else {
        FormSubmissionResult::failed(body.error.unwrap_or_else(|| "Unknown error".to_string()))
    }
}

#[async_trait]
impl Submission for SendMessageRequest {
    async fn submit(&self, api: &dyn DashboardApi) -> Result<FormSubmissionResult> {
        business_outcome(api.send_message(self).await, |body| {
            message_outcome(body, "Message sent")
        })
    }
}

#[async_trait]
impl Submission for EmbedMessageRequest {
    async fn submit(&self, api: &dyn DashboardApi) -> Result<FormSubmissionResult> {
        business_outcome(api.send_embed(self).await, |body| {
            message_outcome(body, "Embed sent")
        })
    }
}

/// Field state and policy of one form.
pub trait FormKind: Send + 'static {
    type Request: Submission;

    const NAME: &'static str;
    const LABELS: SubmitLabels;
    /// Shown when the request never got an answer.
    const TRANSPORT_FAILURE: &'static str;

    /// Reads the fields and applies the required-field policy.
    fn collect(&self) -> std::result::Result<Self::Request, ValidationError>;

    /// Clears the fields this form owns after a successful submission.
    fn reset(&mut self) {}

    /// Runs after every edit.
    fn on_input(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The submit control was disabled; nothing happened.
    Ignored,
    Invalid(ValidationError),
    Sent(FormSubmissionResult),
    Rejected(FormSubmissionResult),
    Failed(String),
}

/// Binds one form's fields to its submit control, the backend and the alert
/// container.
pub struct FormBinder<F: FormKind> {
    form: Mutex<F>,
    button: Arc<SubmitButton>,
    pub(crate) api: Arc<dyn DashboardApi>,
    pub(crate) alerts: AlertNotifier,
}

impl<F: FormKind> FormBinder<F> {
    pub fn new(mut form: F, api: Arc<dyn DashboardApi>, alerts: AlertNotifier) -> Self {
        form.on_input();
        Self {
            form: Mutex::new(form),
            button: Arc::new(SubmitButton::new(F::LABELS)),
            api,
            alerts,
        }
    }

    pub fn button(&self) -> &Arc<SubmitButton> {
        &self.button
    }

    pub fn read<R>(&self, f: impl FnOnce(&F) -> R) -> R {
        f(&lock(&self.form))
    }

    /// Applies an input event to the form.
    pub fn edit<R>(&self, f: impl FnOnce(&mut F) -> R) -> R {
        let mut form = lock(&self.form);
        let result = f(&mut form);
        form.on_input();
        result
    }

    pub async fn submit(&self) -> SubmitOutcome {
        if self.button.is_disabled() {
            debug!(form = F::NAME, "submit ignored; control disabled");
            return SubmitOutcome::Ignored;
        }

        let request = match lock(&self.form).collect() {
            Ok(request) => request,
            Err(err) => {
                self.alerts.warning(err.0);
                return SubmitOutcome::Invalid(err);
            }
        };

        let Some(_busy) = self.button.begin() else {
            debug!(form = F::NAME, "submit ignored; another submission in flight");
            return SubmitOutcome::Ignored;
        };

        match request.submit(self.api.as_ref()).await {
            Ok(result) if result.success => {
                info!(form = F::NAME, "submission accepted");
                self.alerts.success(result.message.clone());
                self.edit(F::reset);
                SubmitOutcome::Sent(result)
            }
            Ok(result) => {
                info!(form = F::NAME, reason = %result.message, "submission rejected");
                self.alerts.danger(format!("Error: {}", result.message));
                SubmitOutcome::Rejected(result)
            }
            Err(err) => {
                warn!(form = F::NAME, error = %err, "submission failed");
                self.alerts.danger(F::TRANSPORT_FAILURE);
                SubmitOutcome::Failed(err.to_string())
            }
        }
    }
}

/// Plain text message with a live character counter.
pub struct TextMessageForm {
    channel: Arc<ChannelSelect>,
    pub content: String,
    char_count: usize,
}

impl TextMessageForm {
    pub fn new(channel: Arc<ChannelSelect>) -> Self {
        Self {
            channel,
            content: String::new(),
            char_count: 0,
        }
    }

    pub fn channel(&self) -> &Arc<ChannelSelect> {
        &self.channel
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }
}

impl FormKind for TextMessageForm {
    type Request = SendMessageRequest;

    const NAME: &'static str = "text-message";
    const LABELS: SubmitLabels = SubmitLabels {
        idle: "Send Message",
        busy: "Sending...",
    };
    const TRANSPORT_FAILURE: &'static str = "Error sending message";

    fn collect(&self) -> std::result::Result<SendMessageRequest, ValidationError> {
        match self.channel.value() {
            Some(channel_id) if !self.content.is_empty() => Ok(SendMessageRequest {
                channel_id,
                content: self.content.clone(),
            }),
            _ => Err(ValidationError("Please fill in all fields")),
        }
    }

    fn reset(&mut self) {
        self.content.clear();
    }

    fn on_input(&mut self) {
        self.char_count = self.content.chars().count();
    }
}

/// Embed composer with its preview pane.
pub struct EmbedMessageForm {
    channel: Arc<ChannelSelect>,
    pub title: String,
    pub description: String,
    pub color: ColorField,
    pub footer: String,
    pub image_url: String,
    preview: EmbedPreview,
}

impl EmbedMessageForm {
    pub fn new(channel: Arc<ChannelSelect>) -> Self {
        Self {
            channel,
            title: String::new(),
            description: String::new(),
            color: ColorField::default(),
            footer: String::new(),
            image_url: String::new(),
            preview: EmbedPreview::default(),
        }
    }

    pub fn channel(&self) -> &Arc<ChannelSelect> {
        &self.channel
    }

    pub fn preview(&self) -> &EmbedPreview {
        &self.preview
    }

    fn fields(&self) -> EmbedFields<'_> {
        EmbedFields {
            title: &self.title,
            description: &self.description,
            color: self.color.picker(),
            footer: &self.footer,
            image_url: &self.image_url,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl FormKind for EmbedMessageForm {
    type Request = EmbedMessageRequest;

    const NAME: &'static str = "embed-message";
    const LABELS: SubmitLabels = SubmitLabels {
        idle: "Send Embed",
        busy: "Sending...",
    };
    const TRANSPORT_FAILURE: &'static str = "Error sending embed";

    fn collect(&self) -> std::result::Result<EmbedMessageRequest, ValidationError> {
        match self.channel.value() {
            Some(channel_id) if !self.title.is_empty() => Ok(EmbedMessageRequest {
                channel_id,
                title: self.title.clone(),
                description: non_empty(&self.description),
                color: self.color.decimal(),
                footer: non_empty(&self.footer),
                image_url: non_empty(&self.image_url),
            }),
            _ => Err(ValidationError(
                "Please fill in at least the channel and the title",
            )),
        }
    }

    fn reset(&mut self) {
        self.title.clear();
        self.description.clear();
        self.footer.clear();
        self.image_url.clear();
        self.color = ColorField::default();
        self.channel.select("");
    }

    fn on_input(&mut self) {
        self.preview = render_preview(&self.fields());
    }
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
