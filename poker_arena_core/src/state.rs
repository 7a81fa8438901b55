use crate::card::Card;
use crate::message::{PlayerView, TableView};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

pub type PlayerId = Uuid;

/// 牌桌日志最多保留的条数
pub const MAX_LOG_ENTRIES: usize = 50;

/// 开桌参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub starting_chips: u32,
    pub min_raise: u32, // 最小加注额
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig { starting_chips: 1000, min_raise: 50 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    // 服务端持有的完整牌堆，不会发给客户端。
    #[serde(skip)]
    pub deck: Vec<Card>,
    pub community_cards: Vec<Card>,
    pub pot: u32, // 总奖池金额

    pub current_player: usize, // 当前应该行动的玩家在 players 中的索引
    pub round: Round,
    pub hand_number: u32,
    pub hand_in_progress: bool,

    pub current_bet: u32,       // 当前轮下注的最高金额
    pub last_raise_amount: u32, // 上一次加注比之前最高下注多出的金额
    pub min_raise: u32,

    pub game_log: VecDeque<String>, // 最新的在最前面
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub model: String, // 背后驱动这个玩家的模型名
    pub chips: u32,    // 剩余筹码
    pub cards: Vec<Card>,
    pub round_bet: u32, // 本轮已下注额
    pub folded: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Round {
    PreFlop,
    Flop,
    Turn,
    River,
}

/// 某个座位在行动时能看到的信息，用来给模型写提示词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatView {
    pub name: String,
    pub hole_cards: Vec<Card>,
    pub community_cards: Vec<Card>,
    pub pot: u32,
    pub chips: u32,
    pub current_bet: u32,
    pub amount_to_call: u32,
    pub min_raise: u32,
    pub last_raise_amount: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, model: impl Into<String>, chips: u32) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: name.into(),
            model: model.into(),
            chips,
            cards: Vec::new(),
            round_bet: 0,
            folded: false,
        }
    }
}

// --- GameState 的实现方法 ---

impl GameState {
    pub fn new(players: Vec<Player>, config: &TableConfig) -> GameState {
        GameState {
            players,
            deck: Vec::new(),
            community_cards: Vec::new(),
            pot: 0,
            current_player: 0,
            round: Round::PreFlop,
            hand_number: 1,
            hand_in_progress: false,
            current_bet: 0,
            last_raise_amount: 0,
            min_raise: config.min_raise,
            game_log: VecDeque::new(),
        }
    }

    /// 每个名字同时作为玩家名和模型名
    pub fn with_models<S: AsRef<str>>(models: &[S], config: &TableConfig) -> GameState {
        let players = models
            .iter()
            .map(|m| Player::new(m.as_ref(), m.as_ref(), config.starting_chips))
            .collect();
        GameState::new(players, config)
    }

    pub fn add_to_log(&mut self, message: impl AsRef<str>) {
        let entry = format!("[#{}] {}", self.hand_number, message.as_ref());
        self.game_log.push_front(entry);
        self.game_log.truncate(MAX_LOG_ENTRIES);
    }

    /// 还没弃牌的玩家索引
    pub fn players_in_hand(&self) -> Vec<usize> {
        self.players.iter().enumerate().filter(|(_, p)| !p.folded).map(|(i, _)| i).collect()
    }

    pub fn amount_to_call(&self, idx: usize) -> u32 {
        self.players.get(idx).map_or(0, |p| self.current_bet.saturating_sub(p.round_bet))
    }

    /// 底牌在前、公共牌在后的牌面字符串，用于摊牌评估
    pub fn hand_tokens(&self, idx: usize) -> Vec<String> {
        self.players
            .get(idx)
            .map(|p| p.cards.iter().chain(&self.community_cards).map(Card::to_string).collect())
            .unwrap_or_default()
    }

    pub fn seat_view(&self, idx: usize) -> Option<SeatView> {
        let player = self.players.get(idx)?;
        Some(SeatView {
            name: player.name.clone(),
            hole_cards: player.cards.clone(),
            community_cards: self.community_cards.clone(),
            pot: self.pot,
            chips: player.chips,
            current_bet: self.current_bet,
            amount_to_call: self.amount_to_call(idx),
            min_raise: self.min_raise,
            last_raise_amount: self.last_raise_amount,
        })
    }

    /// 发给观众的牌桌快照，不包含牌堆
    pub fn public_view(&self) -> TableView {
        TableView {
            hand_number: self.hand_number,
            round: self.round,
            hand_in_progress: self.hand_in_progress,
            pot: self.pot,
            current_bet: self.current_bet,
            min_raise: self.min_raise,
            current_player: self.current_player,
            community_cards: self.community_cards.clone(),
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    id: p.id,
                    name: p.name.clone(),
                    model: p.model.clone(),
                    chips: p.chips,
                    round_bet: p.round_bet,
                    folded: p.folded,
                    cards: p.cards.clone(),
                })
                .collect(),
            game_log: self.game_log.iter().cloned().collect(),
        }
    }
}
