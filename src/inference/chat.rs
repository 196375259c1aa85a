//! Chat messages and prompt templates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Model-specific conversation format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatTemplate {
    /// `<|im_start|>role ... <|im_end|>` (Qwen, many instruct models)
    #[default]
    #[serde(alias = "qwen")]
    ChatMl,
    /// `<<SYS>>` / `[INST]` (Llama 2 chat)
    Llama2,
}

impl ChatTemplate {
    /// Render a conversation to a single prompt string.
    ///
    /// With `add_generation_prompt` the rendering ends where the assistant's
    /// reply is expected to start.
    pub fn render(&self, messages: &[Message], add_generation_prompt: bool) -> String {
        match self {
            ChatTemplate::ChatMl => render_chatml(messages, add_generation_prompt),
            ChatTemplate::Llama2 => render_llama2(messages),
        }
    }
}

fn render_chatml(messages: &[Message], add_generation_prompt: bool) -> String {
    let mut prompt = String::new();
    for msg in messages {
        prompt.push_str(&format!(
            "<|im_start|>{}\n{}<|im_end|>\n",
            msg.role.as_str(),
            msg.content
        ));
    }
    if add_generation_prompt {
        prompt.push_str("<|im_start|>assistant\n");
    }
    prompt
}

fn render_llama2(messages: &[Message]) -> String {
    let mut prompt = String::new();
    let mut pending_system: Option<&str> = None;

    for msg in messages {
        match msg.role {
            MessageRole::System => pending_system = Some(&msg.content),
            MessageRole::User => {
                prompt.push_str("<s>[INST] ");
                if let Some(system) = pending_system.take() {
                    prompt.push_str(&format!("<<SYS>>\n{system}\n<</SYS>>\n\n"));
                }
                prompt.push_str(&format!("{} [/INST]", msg.content));
            }
            MessageRole::Assistant => {
                prompt.push_str(&format!(" {} </s>", msg.content));
            }
        }
    }

    prompt
}

impl fmt::Display for ChatTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatTemplate::ChatMl => write!(f, "chatml"),
            ChatTemplate::Llama2 => write!(f, "llama2"),
        }
    }
}

impl FromStr for ChatTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chatml" | "qwen" => Ok(ChatTemplate::ChatMl),
            "llama2" => Ok(ChatTemplate::Llama2),
            other => Err(format!("unknown chat template: {other}")),
        }
    }
}
