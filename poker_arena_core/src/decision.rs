use serde::{Deserialize, Serialize};
use std::fmt;

/// 玩家 (AI 模型) 在轮到自己时做出的决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Fold,
    Call,
    /// 加注到的总额
    Raise(u32),
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Decision::Fold => write!(f, "fold"),
            Decision::Call => write!(f, "call"),
            Decision::Raise(amount) => write!(f, "raise {}", amount),
        }
    }
}

/// 把模型的自由文本回复解析成 [`Decision`]。
///
/// 模型经常回复 "call (costs $0)"、"raise $50"、"I would raise 10" 之类的内容，
/// 所以只做宽松匹配，按以下顺序：
/// 1. 含有 `call` 就是跟注；
/// 2. 含有 `raise <数字>` 或 `raise $<数字>` 就是加注；
/// 3. 其他任何情况 (包括明确的 `fold`) 都是弃牌。
pub fn parse_decision(text: &str) -> Decision {
    let text = text.to_lowercase();

    if text.contains("call") {
        return Decision::Call;
    }

    text.match_indices("raise")
        .find_map(|(at, keyword)| raise_amount(&text[at + keyword.len()..]))
        .map_or(Decision::Fold, Decision::Raise)
}

/// 解析紧跟在 `raise` 后面的 ` 50` 或 ` $50`
///
/// 超出 `u32` 的金额取 `u32::MAX`，交给下注逻辑按付不起处理。
fn raise_amount(rest: &str) -> Option<u32> {
    let rest = rest.strip_prefix(' ')?;
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    let digits_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    match &rest[..digits_len] {
        "" => None,
        digits => Some(digits.parse().unwrap_or(u32::MAX)),
    }
}
