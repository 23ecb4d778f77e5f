use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Message;

/// An ordered, append-only sequence of messages.
///
/// `Clone` yields another handle to the *same* conversation, so appends through
/// either handle are visible through both. Use [`Conversation::copy`] to get an
/// independent conversation that starts with the same messages.
#[derive(Clone, Default)]
pub struct Conversation {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("messages", &*self.read())
            .finish()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a detached copy. Later appends to either side are not shared.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self::from(self.messages())
    }

    /// Appends a message to the end of the conversation.
    pub fn push(&self, message: impl Into<Message>) {
        self.write().push(message.into());
    }

    pub fn extend(&self, messages: impl IntoIterator<Item = impl Into<Message>>) {
        self.write().extend(messages.into_iter().map(Into::into));
    }

    /// A point-in-time snapshot of the messages, in order.
    pub fn messages(&self) -> Vec<Message> {
        self.read().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns true if both handles point at the same conversation.
    pub fn same_as(&self, other: &Conversation) -> bool {
        Arc::ptr_eq(&self.messages, &other.messages)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Message>> {
        self.messages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Message>> {
        self.messages.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self {
            messages: Arc::new(RwLock::new(messages)),
        }
    }
}

impl<M: Into<Message>> FromIterator<M> for Conversation {
    fn from_iter<T: IntoIterator<Item = M>>(iter: T) -> Self {
        Self::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}
