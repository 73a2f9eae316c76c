//! In-process store implementing every driven port.
//!
//! The store mirrors the relational schema closely enough for the comment
//! core: comments reference existing polls, users and parents, and deleting a
//! comment that still has replies is rejected as it would be by the foreign
//! key. All state sits behind one mutex, so each operation is atomic.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    CommentRepository, CommentRepositoryError, PollRepository, PollRepositoryError,
    TokenAuthenticator, TokenAuthenticatorError,
};
use crate::domain::{
    ApiToken, Comment, CommentId, CommentText, NewComment, Poll, PollId, User, UserId,
};

#[derive(Debug, Clone)]
struct CommentRecord {
    poll_id: PollId,
    parent_id: Option<CommentId>,
    author_id: UserId,
    text: CommentText,
    is_published: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<UserId, User>,
    tokens: HashMap<String, UserId>,
    polls: BTreeMap<PollId, Poll>,
    comments: BTreeMap<CommentId, CommentRecord>,
    last_comment_id: i64,
}

impl StoreState {
    fn hydrate(&self, id: CommentId, record: &CommentRecord) -> Option<Comment> {
        let author = self.users.get(&record.author_id)?.clone();
        Some(Comment {
            id,
            poll_id: record.poll_id,
            parent_id: record.parent_id,
            author,
            text: record.text.clone(),
            is_published: record.is_published,
            created_at: record.created_at,
        })
    }

    fn insert_comment(&mut self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        if !self.polls.contains_key(&comment.poll_id) {
            return Err(CommentRepositoryError::missing_reference(format!(
                "poll {}",
                comment.poll_id
            )));
        }
        if !self.users.contains_key(&comment.author_id) {
            return Err(CommentRepositoryError::missing_reference(format!(
                "user {}",
                comment.author_id
            )));
        }
        if let Some(parent_id) = comment
            .parent_id
            .filter(|parent_id| !self.comments.contains_key(parent_id))
        {
            return Err(CommentRepositoryError::missing_reference(format!(
                "comment {parent_id}"
            )));
        }

        let id = CommentId::new(self.last_comment_id + 1)
            .map_err(|err| CommentRepositoryError::query(err.to_string()))?;
        let record = CommentRecord {
            poll_id: comment.poll_id,
            parent_id: comment.parent_id,
            author_id: comment.author_id,
            text: comment.text.clone(),
            is_published: comment.is_published,
            created_at: Utc::now(),
        };
        let stored = self
            .hydrate(id, &record)
            .ok_or_else(|| CommentRepositoryError::missing_reference("comment author"))?;
        self.last_comment_id = id.get();
        self.comments.insert(id, record);
        Ok(stored)
    }
}

/// Mutex-guarded store backing all three driven ports.
///
/// # Examples
/// ```
/// use polls_backend::outbound::memory::InMemoryStore;
///
/// let store = InMemoryStore::with_demo_data();
/// assert!(store.has_poll(1));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

fn poisoned() -> String {
    "in-memory store lock poisoned".to_owned()
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with two users (tokens `1` and `2`), two
    /// published polls and one unpublished poll.
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        for (raw, token) in [(1, "1"), (2, "2")] {
            let Ok(id) = UserId::new(raw) else { continue };
            let username = format!("user{raw}");
            if let Ok(user) = User::try_new(id, username.as_str(), format!("{username}@example.com"))
            {
                store.insert_user(user, token);
            }
        }
        for (raw, is_published) in [(1, true), (2, true), (3, false)] {
            let (Ok(id), Ok(owner_id)) = (PollId::new(raw), UserId::new(1)) else {
                continue;
            };
            store.insert_poll(Poll {
                id,
                title: format!("Poll {raw}"),
                description: String::new(),
                owner_id,
                is_published,
            });
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, String> {
        self.state.lock().map_err(|_| poisoned())
    }

    /// Register a user together with its API token. Poisoned stores ignore
    /// the call.
    pub fn insert_user(&self, user: User, token: &str) {
        if let Ok(mut state) = self.lock() {
            state.tokens.insert(token.to_owned(), user.id());
            state.users.insert(user.id(), user);
        }
    }

    /// Register or replace a poll.
    pub fn insert_poll(&self, poll: Poll) {
        if let Ok(mut state) = self.lock() {
            state.polls.insert(poll.id, poll);
        }
    }

    /// Seed a comment directly, bypassing service rules.
    ///
    /// # Errors
    ///
    /// Returns [`CommentRepositoryError::MissingReference`] when the poll,
    /// author or parent is unknown.
    pub fn insert_comment(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut state = self.lock().map_err(CommentRepositoryError::query)?;
        state.insert_comment(comment)
    }

    /// Whether a poll with the raw identifier exists.
    pub fn has_poll(&self, raw_id: i64) -> bool {
        let Ok(id) = PollId::new(raw_id) else {
            return false;
        };
        self.lock().is_ok_and(|state| state.polls.contains_key(&id))
    }

    /// Whether a comment with the given identifier exists.
    pub fn has_comment(&self, id: CommentId) -> bool {
        self.lock().is_ok_and(|state| state.comments.contains_key(&id))
    }

    /// Parent reference of a stored comment, if the comment exists.
    pub fn parent_of(&self, id: CommentId) -> Option<Option<CommentId>> {
        self.lock()
            .ok()
            .and_then(|state| state.comments.get(&id).map(|record| record.parent_id))
    }

    /// Number of stored comments.
    pub fn comment_count(&self) -> usize {
        self.lock().map_or(0, |state| state.comments.len())
    }
}

#[async_trait]
impl TokenAuthenticator for InMemoryStore {
    async fn resolve(&self, token: &ApiToken) -> Result<Option<User>, TokenAuthenticatorError> {
        let state = self.lock().map_err(TokenAuthenticatorError::query)?;
        Ok(state
            .tokens
            .get(token.expose())
            .and_then(|id| state.users.get(id))
            .cloned())
    }
}

#[async_trait]
impl PollRepository for InMemoryStore {
    async fn find_by_id(&self, poll_id: PollId) -> Result<Option<Poll>, PollRepositoryError> {
        let state = self.lock().map_err(PollRepositoryError::query)?;
        Ok(state.polls.get(&poll_id).cloned())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        comment_id: CommentId,
    ) -> Result<Option<Comment>, CommentRepositoryError> {
        let state = self.lock().map_err(CommentRepositoryError::query)?;
        Ok(state
            .comments
            .get(&comment_id)
            .and_then(|record| state.hydrate(comment_id, record)))
    }

    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        self.insert_comment(comment)
    }

    async fn reply_ids(
        &self,
        comment_id: CommentId,
    ) -> Result<Vec<CommentId>, CommentRepositoryError> {
        let state = self.lock().map_err(CommentRepositoryError::query)?;
        Ok(state
            .comments
            .iter()
            .filter(|(_, record)| record.parent_id == Some(comment_id))
            .map(|(id, _)| *id)
            .collect())
    }

    async fn delete_thread(
        &self,
        root: CommentId,
        descendants: &[CommentId],
    ) -> Result<Option<u64>, CommentRepositoryError> {
        let mut state = self.lock().map_err(CommentRepositoryError::query)?;
        if !state.comments.contains_key(&root) {
            return Ok(None);
        }
        let in_set = |id: &CommentId| *id == root || descendants.contains(id);
        let still_referenced = state.comments.iter().find(|(id, record)| {
            !in_set(*id) && record.parent_id.as_ref().is_some_and(in_set)
        });
        if let Some((reply, _)) = still_referenced {
            return Err(CommentRepositoryError::has_replies(format!(
                "comment {reply} replies to a removed comment"
            )));
        }
        state.comments.remove(&root);
        let mut removed = 0;
        for id in descendants {
            if *id != root && state.comments.remove(id).is_some() {
                removed += 1;
            }
        }
        Ok(Some(removed))
    }

    async fn delete_detaching_replies(
        &self,
        comment_id: CommentId,
    ) -> Result<Option<u64>, CommentRepositoryError> {
        let mut state = self.lock().map_err(CommentRepositoryError::query)?;
        if state.comments.remove(&comment_id).is_none() {
            return Ok(None);
        }
        let mut detached = 0;
        for record in state.comments.values_mut() {
            if record.parent_id == Some(comment_id) {
                record.parent_id = None;
                detached += 1;
            }
        }
        Ok(Some(detached))
    }
}
