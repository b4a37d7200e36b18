use crate::model::ChatMessage;

#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
    turns: usize,
}

impl ConversationState {
    pub fn new(seed: Vec<ChatMessage>) -> Self {
        Self {
            messages: seed,
            turns: 0,
        }
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn snapshot(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn record_turn(&mut self, user: ChatMessage, assistant: ChatMessage) {
        self.append(user);
        self.append(assistant);
        self.turns += 1;
    }
}
