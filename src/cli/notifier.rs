use flowzi_core::{CelebrationPrompt, CoreError, NotificationRequest, Notifier};

use crate::cli::output;

/// Prints notifications instead of scheduling them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn initialize(&self) -> Result<bool, CoreError> {
        Ok(true)
    }

    fn schedule_local(&self, request: NotificationRequest) -> Result<Option<String>, CoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        output::notice(format!(
            "{} | {} ({})",
            request.title, request.body, request.trigger
        ));
        Ok(Some(id))
    }

    fn cancel(&self, id: &str) -> Result<(), CoreError> {
        tracing::debug!(id, "cancel requested");
        Ok(())
    }

    fn cancel_all(&self) -> Result<(), CoreError> {
        tracing::debug!("cancel all requested");
        Ok(())
    }

    fn celebrate(&self, prompt: CelebrationPrompt) -> Result<(), CoreError> {
        output::notice(format!("{}: {}", prompt.title, prompt.message.replace("\n\n", " ")));
        Ok(())
    }
}
