use crate::card::Card;
use crate::state::{PlayerId, Round};
use serde::{Deserialize, Serialize};

// --- 观众客户端 -> 服务器 的消息 ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// 请求当前牌桌的完整快照
    RequestSnapshot,
}

// --- 服务器 -> 观众客户端 的消息 ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ServerMessage {
    /// 每次行动之后广播的完整牌桌快照，新连接也会立即收到一份
    GameUpdate(TableView),

    /// 一局结束，奖池已经分配
    HandResult(ShowdownSummary),

    /// 服务器向特定客户端发送错误信息
    Error { message: String },
}

/// 牌桌快照
///
/// 观众席看到的是 AI 之间的对局，所以所有底牌都是公开的；牌堆永远不发。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub hand_number: u32,
    pub round: Round,
    pub hand_in_progress: bool,
    pub pot: u32,
    pub current_bet: u32,
    pub min_raise: u32,
    pub current_player: usize,
    pub community_cards: Vec<Card>,
    pub players: Vec<PlayerView>,
    pub game_log: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub model: String,
    pub chips: u32,
    pub round_bet: u32,
    pub folded: bool,
    pub cards: Vec<Card>,
}

/// 一局的结算结果
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShowdownSummary {
    pub hand_number: u32,
    /// 赢家名字；平局时有多个，按牌力排序的先后
    pub winners: Vec<String>,
    /// 赢家的牌型名称；其他人全部弃牌时没有摊牌，为 `None`
    pub hand_name: Option<String>,
    /// 分配出去的奖池总额
    pub pot: u32,
}
