//! Conversation State Machine
//!
//! Drives the sequential registration dialogue: name, then age, then grade.
//! Each user's session advances one validated field at a time; the final
//! step persists the record and clears the session.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info};

use crate::channel::{Channel, InboundMessage, OutboundMessage};
use crate::repo::StudentStore;

use super::session::{DialogueState, Session, SessionStore};
use super::validate::{validate_age, validate_grade, validate_name};

const START_PROMPT: &str = "Hi! I'm a bot that records students into a database.\n\
Let's take down your details.\n\n\
What is your name?\n\n\
You can cancel at any time with /cancel";
const CANCELLED: &str = "Operation cancelled. Use /start to begin again.";
const NAME_EMPTY: &str = "The name must not be empty. Please enter your name again.";
const AGE_PROMPT: &str = "How old are you? (a whole number from 1 to 120)";
const AGE_INVALID: &str = "Age must be a whole number between 1 and 120. Try again.";
const GRADE_PROMPT: &str = "Which grade are you in? (for example: 5A or 5)";
const GRADE_EMPTY: &str = "The grade must not be empty. Please enter your grade again.";
const DATA_INVALID: &str = "The collected data is invalid. Please start over with /start.";
const STORAGE_FAILED: &str = "Database error. Please try again later.";

/// The per-user conversational state machine.
///
/// Owns the session store; the repository is its only durable collaborator.
#[derive(Clone)]
pub struct DialogueMachine {
    sessions: SessionStore,
    repo: Arc<dyn StudentStore>,
}

impl DialogueMachine {
    pub fn new(repo: Arc<dyn StudentStore>) -> Self {
        Self {
            sessions: SessionStore::new(),
            repo,
        }
    }

    /// Access the session store (used by tests and the runtime).
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Begin a new dialogue for the sender, replacing any existing session.
    pub async fn on_start(&self, channel: &dyn Channel, message: &InboundMessage) -> Result<()> {
        self.sessions.remove(&message.sender_id).await;
        self.sessions.put(&message.sender_id, Session::new()).await;

        debug!("Started dialogue for user {}", message.sender_id);
        channel
            .send_text(&message.conversation_id, START_PROMPT)
            .await
    }

    /// Cancel the sender's dialogue, if any, and acknowledge.
    pub async fn on_cancel(&self, channel: &dyn Channel, message: &InboundMessage) -> Result<()> {
        self.sessions.remove(&message.sender_id).await;

        debug!("Cancelled dialogue for user {}", message.sender_id);
        channel.send_text(&message.conversation_id, CANCELLED).await
    }

    /// Feed free text into the sender's dialogue.
    ///
    /// Returns false if the sender has no active session (the text is not
    /// part of a dialogue and the caller decides what to do with it).
    pub async fn on_text(&self, channel: &dyn Channel, message: &InboundMessage) -> Result<bool> {
        let Some(session) = self.sessions.get(&message.sender_id).await else {
            return Ok(false);
        };

        match session.state {
            DialogueState::AwaitingName => self.on_name(channel, message, session).await?,
            DialogueState::AwaitingAge => self.on_age(channel, message, session).await?,
            DialogueState::AwaitingGrade => self.on_grade(channel, message, session).await?,
        }

        Ok(true)
    }

    async fn on_name(
        &self,
        channel: &dyn Channel,
        message: &InboundMessage,
        mut session: Session,
    ) -> Result<()> {
        let Some(name) = validate_name(&message.content) else {
            return channel.send_text(&message.conversation_id, NAME_EMPTY).await;
        };

        session.name = Some(name);
        session.state = DialogueState::AwaitingAge;
        self.sessions.put(&message.sender_id, session).await;

        channel.send_text(&message.conversation_id, AGE_PROMPT).await
    }

    async fn on_age(
        &self,
        channel: &dyn Channel,
        message: &InboundMessage,
        mut session: Session,
    ) -> Result<()> {
        let Some(age) = validate_age(&message.content) else {
            return channel.send_text(&message.conversation_id, AGE_INVALID).await;
        };

        session.age = Some(age);
        session.state = DialogueState::AwaitingGrade;
        self.sessions.put(&message.sender_id, session).await;

        channel
            .send_text(&message.conversation_id, GRADE_PROMPT)
            .await
    }

    async fn on_grade(
        &self,
        channel: &dyn Channel,
        message: &InboundMessage,
        session: Session,
    ) -> Result<()> {
        let Some(grade) = validate_grade(&message.content) else {
            return channel
                .send_text(&message.conversation_id, GRADE_EMPTY)
                .await;
        };

        // The session is finished after this step no matter what happens:
        // a failed final write is never retried (at-most-once).
        self.sessions.remove(&message.sender_id).await;

        let (Some(name), Some(age)) = (session.name, session.age) else {
            return channel
                .send_text(&message.conversation_id, DATA_INVALID)
                .await;
        };

        match self.repo.insert(name.clone(), age, grade.clone()).await {
            Ok(id) => {
                info!("Registered student #{} for user {}", id, message.sender_id);
                let text = format!(
                    "Saved!\n\n\
                     ID: {id}\n\
                     Name: {name}\n\
                     Age: {age}\n\
                     Grade: {grade}\n\n\
                     To add another student - /start\n\
                     To see recent entries - /students"
                );
                channel
                    .send(OutboundMessage::success(&message.conversation_id, text))
                    .await
            }
            Err(e) => {
                error!("Failed to persist student for user {}: {}", message.sender_id, e);
                channel
                    .send(OutboundMessage::error(
                        &message.conversation_id,
                        STORAGE_FAILED,
                    ))
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MessageLevel;
    use crate::channel::traits::mock::MockChannel;
    use crate::repo::StudentRepository;
    use crate::repo::mock::FailingStore;
    use rollcall_storage::Storage;
    use tempfile::tempdir;

    fn test_machine() -> (DialogueMachine, StudentRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path().join("test.db")).unwrap();
        let repo = StudentRepository::new(storage.students.clone());
        (DialogueMachine::new(Arc::new(repo.clone())), repo, dir)
    }

    fn message(sender: &str, content: &str) -> InboundMessage {
        InboundMessage::new("msg-1", sender, format!("chat-{sender}"), content)
    }

    async fn run_dialogue(
        machine: &DialogueMachine,
        channel: &MockChannel,
        sender: &str,
        inputs: &[&str],
    ) {
        machine
            .on_start(channel, &message(sender, "/start"))
            .await
            .unwrap();
        for input in inputs {
            machine
                .on_text(channel, &message(sender, input))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_full_dialogue_persists_record() {
        let (machine, repo, _dir) = test_machine();
        let channel = MockChannel::new();

        run_dialogue(&machine, &channel, "user-1", &["Ann", "10", "4B"]).await;

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Ann");
        assert_eq!(all[0].age, 10);
        assert_eq!(all[0].grade, "4B");

        // Session is gone after completion.
        assert!(machine.sessions().get("user-1").await.is_none());

        let last = channel.last_text().await.unwrap();
        assert!(last.contains("ID: 1"));
        assert!(last.contains("Name: Ann"));
        assert!(last.contains("Age: 10"));
        assert!(last.contains("Grade: 4B"));
    }

    #[tokio::test]
    async fn test_inputs_are_trimmed_before_storage() {
        let (machine, repo, _dir) = test_machine();
        let channel = MockChannel::new();

        run_dialogue(&machine, &channel, "user-1", &["  Ann  ", " 10 ", " 4B "]).await;

        let all = repo.list_all().await.unwrap();
        assert_eq!(all[0].name, "Ann");
        assert_eq!(all[0].age, 10);
        assert_eq!(all[0].grade, "4B");
    }

    #[tokio::test]
    async fn test_empty_name_reprompts_without_advancing() {
        let (machine, repo, _dir) = test_machine();
        let channel = MockChannel::new();

        machine
            .on_start(&channel, &message("user-1", "/start"))
            .await
            .unwrap();
        machine
            .on_text(&channel, &message("user-1", "   "))
            .await
            .unwrap();

        let session = machine.sessions().get("user-1").await.unwrap();
        assert_eq!(session.state, DialogueState::AwaitingName);
        assert!(repo.list_all().await.unwrap().is_empty());
        assert_eq!(channel.last_text().await.unwrap(), NAME_EMPTY);
    }

    #[tokio::test]
    async fn test_out_of_range_age_reprompts_without_advancing() {
        let (machine, repo, _dir) = test_machine();
        let channel = MockChannel::new();

        machine
            .on_start(&channel, &message("user-1", "/start"))
            .await
            .unwrap();
        machine
            .on_text(&channel, &message("user-1", "Ann"))
            .await
            .unwrap();
        machine
            .on_text(&channel, &message("user-1", "500"))
            .await
            .unwrap();

        let session = machine.sessions().get("user-1").await.unwrap();
        assert_eq!(session.state, DialogueState::AwaitingAge);
        assert!(repo.list_all().await.unwrap().is_empty());
        assert_eq!(channel.last_text().await.unwrap(), AGE_INVALID);
    }

    #[tokio::test]
    async fn test_cancel_removes_session_in_any_state() {
        let (machine, _repo, _dir) = test_machine();
        let channel = MockChannel::new();

        machine
            .on_start(&channel, &message("user-1", "/start"))
            .await
            .unwrap();
        machine
            .on_text(&channel, &message("user-1", "Ann"))
            .await
            .unwrap();
        machine
            .on_cancel(&channel, &message("user-1", "/cancel"))
            .await
            .unwrap();

        assert!(machine.sessions().get("user-1").await.is_none());

        // A fresh start begins with empty collected fields.
        machine
            .on_start(&channel, &message("user-1", "/start"))
            .await
            .unwrap();
        let session = machine.sessions().get("user-1").await.unwrap();
        assert_eq!(session.state, DialogueState::AwaitingName);
        assert!(session.name.is_none());
        assert!(session.age.is_none());
    }

    #[tokio::test]
    async fn test_text_without_session_is_not_consumed() {
        let (machine, _repo, _dir) = test_machine();
        let channel = MockChannel::new();

        let consumed = machine
            .on_text(&channel, &message("user-1", "hello"))
            .await
            .unwrap();
        assert!(!consumed);
        assert!(channel.sent_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_interleaved_users_do_not_cross_contaminate() {
        let (machine, repo, _dir) = test_machine();
        let channel = MockChannel::new();

        machine
            .on_start(&channel, &message("user-1", "/start"))
            .await
            .unwrap();
        machine
            .on_start(&channel, &message("user-2", "/start"))
            .await
            .unwrap();

        machine
            .on_text(&channel, &message("user-1", "Ann"))
            .await
            .unwrap();
        machine
            .on_text(&channel, &message("user-2", "Bob"))
            .await
            .unwrap();
        machine
            .on_text(&channel, &message("user-2", "11"))
            .await
            .unwrap();
        machine
            .on_text(&channel, &message("user-1", "10"))
            .await
            .unwrap();
        machine
            .on_text(&channel, &message("user-1", "4B"))
            .await
            .unwrap();
        machine
            .on_text(&channel, &message("user-2", "5A"))
            .await
            .unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);

        let ann = all.iter().find(|s| s.name == "Ann").unwrap();
        assert_eq!(ann.age, 10);
        assert_eq!(ann.grade, "4B");

        let bob = all.iter().find(|s| s.name == "Bob").unwrap();
        assert_eq!(bob.age, 11);
        assert_eq!(bob.grade, "5A");
    }

    #[tokio::test]
    async fn test_restart_replaces_session_mid_dialogue() {
        let (machine, _repo, _dir) = test_machine();
        let channel = MockChannel::new();

        machine
            .on_start(&channel, &message("user-1", "/start"))
            .await
            .unwrap();
        machine
            .on_text(&channel, &message("user-1", "Ann"))
            .await
            .unwrap();

        machine
            .on_start(&channel, &message("user-1", "/start"))
            .await
            .unwrap();
        let session = machine.sessions().get("user-1").await.unwrap();
        assert_eq!(session.state, DialogueState::AwaitingName);
        assert!(session.name.is_none());
    }

    #[tokio::test]
    async fn test_persist_failure_sends_generic_error_and_ends_session() {
        let machine = DialogueMachine::new(Arc::new(FailingStore));
        let channel = MockChannel::new();

        run_dialogue(&machine, &channel, "user-1", &["Ann", "10", "4B"]).await;

        let sent = channel.sent_messages().await;
        let last = sent.last().unwrap();
        assert_eq!(last.content, STORAGE_FAILED);
        assert_eq!(last.level, MessageLevel::Error);

        // The failed write is not retried: the session is already gone and
        // further text is no longer part of a dialogue.
        assert!(machine.sessions().get("user-1").await.is_none());
        let consumed = machine
            .on_text(&channel, &message("user-1", "4B"))
            .await
            .unwrap();
        assert!(!consumed);
    }
}
