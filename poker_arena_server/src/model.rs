use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use poker_arena_core::SeatView;

use crate::agent::PlayerAgent;

// --- chat-completions 接口的请求与响应 ---

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub messages: Vec<ChatMessage<'a>>,
    pub model: &'a str,
}

#[derive(Serialize, Debug)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    /// 单条用户消息，内容就是提示词
    pub fn single(model: &'a str, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest { messages: vec![ChatMessage { role: "user", content: prompt }], model }
    }
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize, Debug)]
struct ChatReply {
    content: Option<String>,
}

impl ChatResponse {
    /// 第一个候选回复，去掉首尾空白
    pub fn reply(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref().map(str::trim)
    }
}

/// 通过 chat-completions 接口询问真正的模型
///
/// 网络错误、非 2xx 状态码或者看不懂的响应都按弃牌处理。
pub struct ModelAgent {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    model: String,
}

impl ModelAgent {
    pub fn new(client: reqwest::Client, endpoint: &str, token: Option<String>, model: impl Into<String>) -> ModelAgent {
        ModelAgent {
            client,
            url: format!("{}/chat/completions", endpoint.trim_end_matches('/')),
            token,
            model: model.into(),
        }
    }

    /// 所有座位共用的 HTTP 客户端
    pub fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("无法创建 HTTP 客户端")
    }

    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let mut request = self.client.post(&self.url).json(&ChatRequest::single(&self.model, prompt));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response: ChatResponse = request
            .send()
            .await
            .with_context(|| format!("请求 {} 失败", self.url))?
            .error_for_status()?
            .json()
            .await
            .context("无法解析模型响应")?;

        response.reply().map(str::to_string).context("模型响应中没有回复")
    }
}

#[async_trait]
impl PlayerAgent for ModelAgent {
    async fn respond(&mut self, prompt: &str, seat: &SeatView) -> String {
        match self.complete(prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("询问模型 {} (座位 {}) 失败，按弃牌处理: {:#}", self.model, seat.name, e);
                "fold".to_string()
            }
        }
    }
}
