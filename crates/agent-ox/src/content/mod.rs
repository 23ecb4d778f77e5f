pub mod conversation;
pub mod message;
pub mod part;

// Re-export commonly used types
pub use conversation::Conversation;
pub use message::{Message, MessageRole};
pub use part::Part;
