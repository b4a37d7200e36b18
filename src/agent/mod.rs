pub mod conversation;
pub mod dispatch;
pub mod functions;

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{Config, RetryPolicy};
use crate::error::ChatError;
use crate::model::ChatMessage;
use crate::model_gateway::{ChatReply, ModelGateway, ModelGatewayRequest};

use conversation::ConversationState;
use dispatch::FunctionDispatcher;
use functions::FunctionSpec;

pub const OPENING_MESSAGE: &str = "성별과 나이를 말씀해 주세요.";

#[derive(Debug)]
pub struct PendingTurn {
    user: ChatMessage,
    reply: ChatReply,
}

impl PendingTurn {
    pub fn reply(&self) -> &ChatReply {
        &self.reply
    }
}

pub struct Agent<'a, G> {
    gateway: &'a G,
    functions: Vec<FunctionSpec>,
    dispatcher: FunctionDispatcher,
    retry: RetryPolicy,
    max_turns: usize,
    state: ConversationState,
}

impl<'a, G> Agent<'a, G>
where
    G: ModelGateway,
{
    pub fn new(gateway: &'a G, cfg: &Config, dispatcher: FunctionDispatcher) -> Self {
        Self {
            gateway,
            functions: functions::catalog(),
            dispatcher,
            retry: cfg.retry.clone(),
            max_turns: cfg.max_turns,
            state: ConversationState::new(seed_messages(cfg)),
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        self.state.snapshot()
    }

    pub fn turns(&self) -> usize {
        self.state.turns()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn is_done(&self) -> bool {
        self.state.turns() >= self.max_turns
    }

    pub async fn run_turn(&mut self, user_input: &str) -> Result<ChatReply, ChatError> {
        let pending = self.send_turn(user_input).await?;
        Ok(self.complete_turn(pending))
    }

    pub async fn send_turn(&self, user_input: &str) -> Result<PendingTurn, ChatError> {
        let user = ChatMessage::user(user_input);
        let mut messages = self.state.snapshot().to_vec();
        messages.push(user.clone());

        let reply = self.send_with_retry(&messages).await?;
        Ok(PendingTurn { user, reply })
    }

    pub fn complete_turn(&mut self, pending: PendingTurn) -> ChatReply {
        let PendingTurn { user, reply } = pending;
        if let Some(call) = &reply.function_call {
            self.dispatcher.dispatch(call);
        }
        self.state
            .record_turn(user, ChatMessage::assistant(reply.content.clone()));
        debug!(
            turn = self.state.turns(),
            history_len = self.state.len(),
            "turn completed"
        );
        reply
    }

    async fn send_with_retry(&self, messages: &[ChatMessage]) -> Result<ChatReply, ChatError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let request = ModelGatewayRequest {
                messages,
                functions: &self.functions,
            };
            match self.gateway.chat(request).await {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "chat request failed, retrying"
                    );
                    if delay > Duration::ZERO {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn seed_messages(cfg: &Config) -> Vec<ChatMessage> {
    let mut messages = Vec::new();

    if !cfg.system_prompt.trim().is_empty() {
        messages.push(ChatMessage::system(cfg.system_prompt.clone()));
    }

    messages.push(ChatMessage::assistant(OPENING_MESSAGE));
    messages
}
