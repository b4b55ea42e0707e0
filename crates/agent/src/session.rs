//! Chat Session State
//!
//! One session owns one append-only transcript. `send_message` is the
//! only mutator: it appends the user message, composes exactly one bot
//! reply and appends that, under a busy flag that rejects overlapping
//! sends instead of queueing them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{Mutex, RwLock};

use shopchat_core::{ChatMessage, TranscriptStats};

use crate::composer::ResponseStrategy;
use crate::AgentError;

/// One conversation with its transcript
pub struct ChatSession {
    id: String,
    strategy: Arc<dyn ResponseStrategy>,
    transcript: Mutex<Vec<ChatMessage>>,
    busy: AtomicBool,
    /// Unix millis of the last send; used for idle eviction
    last_activity: AtomicU64,
}

/// Clears the busy flag when the in-flight send ends, on every path
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatSession {
    pub fn new(id: String, strategy: Arc<dyn ResponseStrategy>) -> Self {
        Self {
            id,
            strategy,
            transcript: Mutex::new(Vec::new()),
            busy: AtomicBool::new(false),
            last_activity: AtomicU64::new(now_millis()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Handle one user message
    ///
    /// Appends the user message and exactly one bot reply, then returns
    /// the reply. Empty or whitespace-only input is rejected without
    /// touching the transcript; a second send while one is in flight is
    /// rejected with [`AgentError::Busy`].
    pub async fn send_message(&self, text: &str) -> Result<ChatMessage, AgentError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AgentError::EmptyMessage);
        }

        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(AgentError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        self.last_activity.store(now_millis(), Ordering::SeqCst);
        self.transcript.lock().push(ChatMessage::user(text));

        // The strategy is infallible; failures already became an apology
        let reply = self.strategy.respond(text).await;
        self.transcript.lock().push(reply.clone());

        Ok(reply)
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.transcript.lock().clone()
    }

    pub fn stats(&self) -> TranscriptStats {
        TranscriptStats::from_messages(&self.transcript.lock())
    }

    /// Completed user/bot exchanges so far
    pub fn turn_count(&self) -> usize {
        self.transcript.lock().len() / 2
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Drop the transcript; the session itself stays usable
    pub fn clear(&self) {
        self.transcript.lock().clear();
    }

    pub fn last_activity_millis(&self) -> u64 {
        self.last_activity.load(Ordering::SeqCst)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Creates, looks up and evicts sessions
pub struct SessionManager {
    strategy: Arc<dyn ResponseStrategy>,
    sessions: RwLock<HashMap<String, Arc<ChatSession>>>,
    max_sessions: usize,
    counter: AtomicU64,
}

impl SessionManager {
    pub fn new(strategy: Arc<dyn ResponseStrategy>, max_sessions: usize) -> Self {
        Self {
            strategy,
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            counter: AtomicU64::new(0),
        }
    }

    /// Create a session, enforcing the concurrent-session limit
    pub fn create(&self) -> Result<Arc<ChatSession>, AgentError> {
        let mut sessions = self.sessions.write();
        if sessions.len() >= self.max_sessions {
            return Err(AgentError::TooManySessions(self.max_sessions));
        }

        let id = format!(
            "sess-{}-{}",
            now_millis(),
            self.counter.fetch_add(1, Ordering::SeqCst)
        );
        let session = Arc::new(ChatSession::new(id.clone(), self.strategy.clone()));
        sessions.insert(id, session.clone());

        tracing::info!(session_id = %session.id(), "Session created");
        Ok(session)
    }

    pub fn get(&self, id: &str) -> Result<Arc<ChatSession>, AgentError> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| AgentError::SessionNotFound(id.to_string()))
    }

    pub fn remove(&self, id: &str) -> Result<(), AgentError> {
        match self.sessions.write().remove(id) {
            Some(_) => {
                tracing::info!(session_id = id, "Session removed");
                Ok(())
            }
            None => Err(AgentError::SessionNotFound(id.to_string())),
        }
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Evict sessions idle for longer than the given number of seconds
    pub fn evict_idle(&self, idle_timeout_seconds: u64) -> usize {
        let cutoff = now_millis().saturating_sub(idle_timeout_seconds * 1000);
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.is_busy() || s.last_activity_millis() >= cutoff);

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, "Idle sessions evicted");
        }
        evicted
    }
}
