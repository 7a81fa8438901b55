//! # 扑克竞技场核心库
//!
//! 这个 `core` crate 包含了牌面解析、牌型评估与比较这一纯计算的核心，
//! 以及牌桌状态、回合推进、模型回复解析和服务器-观众之间的消息定义。
//! 牌型评估部分不依赖任何牌桌状态，只接收明确的牌面字符串，
//! 可以被任何上层应用 (服务器、测试、离线工具) 直接复用。

mod card;
mod decision;
mod error;
mod hand;
mod logic;
mod message;
mod showdown;
mod state;

pub use card::*;

pub use decision::*;

pub use error::*;

pub use hand::*;

pub use logic::*;

pub use message::*;

pub use showdown::*;

pub use state::*;
