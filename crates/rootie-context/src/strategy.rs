use rootie_llm::Message;
use rootie_types::DialogueNode;

/// Result of context building
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub system_prompt: String,
    /// Ancestor (user, assistant) pairs, root first
    pub messages: Vec<Message>,
}

impl ContextWindow {
    /// Flatten into the provider message list, system message first
    pub fn into_messages(self) -> Vec<Message> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);
        out.push(Message::system(self.system_prompt));
        out.extend(self.messages);
        out
    }

    /// Number of ancestor turns included
    pub fn turns(&self) -> usize {
        self.messages.len() / 2
    }
}

/// Strategy for building a context window from a caller-supplied node set
///
/// Implementations are pure: the node set is always passed in, never read
/// from shared state.
pub trait ContextStrategy: Send + Sync {
    fn build(&self, target_parent_id: Option<&str>, known_nodes: &[DialogueNode]) -> ContextWindow;
}
