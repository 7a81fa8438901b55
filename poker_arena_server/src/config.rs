use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{ensure, Context};
use clap::{Parser, ValueEnum};
use poker_arena_core::TableConfig;

/// 默认上桌的四个模型
pub const DEFAULT_PLAYERS: [&str; 4] = [
    "gpt-4o-mini",
    "Phi-3-medium-4k-instruct",
    "Meta-Llama-3.1-8B-Instruct",
    "Mistral-small",
];

pub const DEFAULT_MODEL_ENDPOINT: &str = "https://models.inference.ai.azure.com";

fn default_players() -> Vec<String> {
    DEFAULT_PLAYERS.iter().map(|p| p.to_string()).collect()
}

/// 座位背后的玩家从哪里来
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// 内置的离线玩家
    Heuristic,
    /// 通过 chat-completions 接口询问真正的模型
    Model,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "poker-arena-server", about = "AI models playing Texas Hold'em, streamed to spectators")]
pub struct Config {
    #[arg(long, env = "ARENA_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "ARENA_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Pause between two turns, in milliseconds
    #[arg(long, env = "ARENA_TURN_DELAY_MS", default_value_t = 2000)]
    pub turn_delay_ms: u64,

    #[arg(long, env = "ARENA_STARTING_CHIPS", default_value_t = 1000)]
    pub starting_chips: u32,

    #[arg(long, env = "ARENA_MIN_RAISE", default_value_t = 50)]
    pub min_raise: u32,

    /// Comma-separated player (model) names, in seat order
    #[arg(long, env = "ARENA_PLAYERS", value_delimiter = ',', default_values_t = default_players())]
    pub players: Vec<String>,

    /// Seed for shuffling and the built-in agents; random when absent
    #[arg(long, env = "ARENA_SEED")]
    pub seed: Option<u64>,

    /// Who decides for each seat
    #[arg(long, env = "ARENA_AGENT", value_enum, default_value_t = AgentKind::Heuristic)]
    pub agent: AgentKind,

    /// Base URL of the chat-completions API; `/chat/completions` is appended
    #[arg(long, env = "ARENA_MODEL_ENDPOINT", default_value = DEFAULT_MODEL_ENDPOINT)]
    pub model_endpoint: String,

    /// Bearer token for the model API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Per-request timeout for the model API, in seconds
    #[arg(long, env = "ARENA_MODEL_TIMEOUT_SECS", default_value_t = 30)]
    pub model_timeout_secs: u64,
}

impl Config {
    /// 德州扑克通常支持 2 到 10 名玩家
    pub fn validate(&self) -> anyhow::Result<()> {
        let seats = self.players.len();
        ensure!((2..=10).contains(&seats), "number of players must be between 2 and 10, got {}", seats);
        ensure!(self.players.iter().all(|p| !p.trim().is_empty()), "player names must not be empty");
        ensure!(self.starting_chips > 0, "starting chips must be positive");
        // 桌上的筹码总数在整局中守恒，必须放得进 u32
        ensure!(
            u64::from(self.starting_chips) * seats as u64 <= u64::from(u32::MAX),
            "{} seats of {} chips exceed the table limit of {} chips",
            seats,
            self.starting_chips,
            u32::MAX
        );
        if self.agent == AgentKind::Model {
            ensure!(self.api_token.is_some(), "the model agent needs an API token (--api-token or GITHUB_TOKEN)");
        }
        Ok(())
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    pub fn turn_delay(&self) -> Duration {
        Duration::from_millis(self.turn_delay_ms)
    }

    pub fn table(&self) -> TableConfig {
        TableConfig { starting_chips: self.starting_chips, min_raise: self.min_raise }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("poker-arena-server").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.players.len(), 4);
        assert_eq!(config.players[0], "gpt-4o-mini");
        assert_eq!(config.table(), TableConfig::default());
        assert_eq!(config.turn_delay(), Duration::from_secs(2));
        assert_eq!(config.agent, AgentKind::Heuristic);
        assert_eq!(config.model_endpoint, DEFAULT_MODEL_ENDPOINT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = parse(&["--port", "8080", "--host", "127.0.0.1", "--players", "a,b,c", "--seed", "9"]);
        assert_eq!(config.addr().unwrap(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.players, vec!["a", "b", "c"]);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_rejects_single_player() {
        let config = parse(&["--players", "solo"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_table_chips_beyond_u32() {
        let config = parse(&["--starting-chips", "3000000000", "--players", "a,b"]);
        assert!(config.validate().is_err());

        let config = parse(&["--starting-chips", "2000000000", "--players", "a,b"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_model_agent_selection() {
        let config = parse(&["--agent", "model", "--api-token", "secret", "--model-endpoint", "http://127.0.0.1:9/v1"]);
        assert_eq!(config.agent, AgentKind::Model);
        assert_eq!(config.model_endpoint, "http://127.0.0.1:9/v1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_model_agent_requires_token() {
        let mut config = parse(&["--agent", "model"]);
        config.api_token = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_host() {
        let config = parse(&["--host", "not an address"]);
        assert!(config.addr().is_err());
    }
}
