//! In-memory session list with an active-session pointer
//!
//! The active id is always `None` or the id of a session in the list;
//! every mutation that can remove a session ends with [`SessionStore::repair_active`].

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Duration, Utc};
use log::debug;

use super::model::{
    ChatMessage, ChatSession, IdentificationFeedback, MessageContent, NEW_CHAT_TITLE,
};

const CONFIRMED_FOLLOWUP: &str =
    "Great! I've noted that. If you have more questions about it, feel free to ask!";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    active_id: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts; a missing or dangling active id falls back to the first session
    pub fn from_parts(sessions: Vec<ChatSession>, active_id: Option<String>) -> Self {
        let mut store = Self { sessions, active_id };
        store.repair_active();
        store
    }

    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active(&self) -> Option<&ChatSession> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut ChatSession> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Point the active id back at an existing session (first one) or clear it
    pub fn repair_active(&mut self) {
        let exists = self
            .active_id
            .as_deref()
            .is_some_and(|id| self.sessions.iter().any(|s| s.id == id));
        if !exists {
            self.active_id = self.sessions.first().map(|s| s.id.clone());
        }
    }

    /// Time-based id, bumped until unique within this store
    pub fn fresh_id(&self, now: DateTime<Utc>) -> String {
        let mut at = now;
        loop {
            let id = format!("chat_{}", at.timestamp_millis());
            if self.get(&id).is_none() {
                return id;
            }
            at += Duration::milliseconds(1);
        }
    }

    /// Prepend an empty "New Chat" session and make it active
    pub fn create(&mut self, now: DateTime<Utc>) -> String {
        let id = self.fresh_id(now);
        self.sessions.insert(0, ChatSession::new(id.clone(), NEW_CHAT_TITLE));
        self.active_id = Some(id.clone());
        debug!("Created session {id}");
        id
    }

    /// Make `id` active; unknown ids are ignored
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.active_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        let removed = self.sessions.len() != before;
        self.repair_active();
        removed
    }

    pub fn append(&mut self, session_id: &str, message: ChatMessage) -> Result<()> {
        let session = self
            .get_mut(session_id)
            .ok_or_else(|| anyhow!("Chat {session_id} no longer exists"))?;
        session.messages.push(message);
        Ok(())
    }

    pub fn set_title(&mut self, session_id: &str, title: impl Into<String>) -> Result<()> {
        let session = self
            .get_mut(session_id)
            .ok_or_else(|| anyhow!("Chat {session_id} no longer exists"))?;
        session.title = title.into();
        Ok(())
    }

    /// Add the first message of an exchange, starting a new session when needed
    ///
    /// If the active session is absent or empty, a new session titled `title`
    /// is created with `message` and placed first; an empty active placeholder
    /// is replaced rather than kept. Otherwise `message` is appended to the
    /// active session. Returns the id of the session that received the message.
    pub fn begin_exchange(&mut self, now: DateTime<Utc>, message: ChatMessage, title: &str) -> String {
        if let Some(id) = self.active_id.clone() {
            if let Some(session) = self.get_mut(&id) {
                if !session.is_empty() {
                    session.messages.push(message);
                    return id;
                }
            }
        }

        if let Some(placeholder) = self.active_id.take() {
            self.sessions.retain(|s| s.id != placeholder || !s.is_empty());
        }

        let id = self.fresh_id(now);
        let mut session = ChatSession::new(id.clone(), title);
        session.messages.push(message);
        self.sessions.insert(0, session);
        self.active_id = Some(id.clone());
        debug!("Started session {id} titled '{title}'");
        id
    }

    /// Replace message `index` with new user text and drop everything after it
    pub fn edit_message(&mut self, session_id: &str, index: usize, text: &str) -> Result<()> {
        let session = self
            .get_mut(session_id)
            .ok_or_else(|| anyhow!("Chat {session_id} no longer exists"))?;

        match session.messages.get(index) {
            Some(message) if message.is_editable() => {}
            Some(_) => bail!("Only your own text messages can be edited"),
            None => bail!("There is no message #{index} in this chat"),
        }

        session.messages.truncate(index);
        session.messages.push(ChatMessage::user_text(text));
        Ok(())
    }

    /// Record feedback on a model identification; returns the follow-up reply, if any
    pub fn attach_feedback(
        &mut self,
        session_id: &str,
        index: usize,
        feedback: IdentificationFeedback,
        corrected_name: Option<String>,
    ) -> Result<Option<String>> {
        let session = self
            .get_mut(session_id)
            .ok_or_else(|| anyhow!("Chat {session_id} no longer exists"))?;

        let message = session
            .messages
            .get_mut(index)
            .ok_or_else(|| anyhow!("There is no message #{index} in this chat"))?;

        if message.as_identification().is_none() {
            bail!("Feedback can only be given on a plant identification");
        }

        let corrected_name = corrected_name.filter(|n| !n.trim().is_empty());
        if let MessageContent::Identification(id) = &mut message.content {
            id.user_feedback = Some(feedback);
            id.corrected_name = corrected_name.clone();
        }

        let followup = match (feedback, corrected_name) {
            (IdentificationFeedback::Correct, _) => Some(CONFIRMED_FOLLOWUP.to_string()),
            (IdentificationFeedback::Incorrect, Some(name)) => Some(format!(
                "Thank you for the correction! I'll remember this is a {name}. What would you like to know about it?"
            )),
            (IdentificationFeedback::Incorrect, None) => None,
        };

        if let Some(text) = &followup {
            session.messages.push(ChatMessage::model_text(text.clone()));
        }

        Ok(followup)
    }

    /// Distinct non-placeholder titles in first-seen order
    pub fn plant_titles(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for session in &self.sessions {
            if !session.has_placeholder_title() && !seen.contains(&session.title) {
                seen.push(session.title.clone());
            }
        }
        seen
    }

    /// Resolve a user reference: 1-based list position or a literal id
    pub fn resolve(&self, reference: &str) -> Option<&ChatSession> {
        if let Ok(position) = reference.parse::<usize>() {
            if position >= 1 {
                return self.sessions.get(position - 1);
            }
        }
        self.get(reference)
    }
}
