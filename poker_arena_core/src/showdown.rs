use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::card::Card;
use crate::error::HandError;
use crate::hand::{parse_hand, Category, HandFacts, Score};

/// 已评估的一手牌：原始牌面字符串、解析后的牌和得分。
///
/// 创建后只读，摊牌期间由调用方持有。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatedHand {
    tokens: Vec<String>,
    cards: Vec<Card>,
    score: Score,
}

impl EvaluatedHand {
    pub fn new<I>(tokens: I) -> Result<EvaluatedHand, HandError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(|t| t.as_ref().to_string()).collect();
        let cards = parse_hand(&tokens)?;
        let score = HandFacts::from_cards(&cards).score();
        Ok(EvaluatedHand { tokens, cards, score })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn category(&self) -> Category {
        self.score.category
    }

    /// 牌型名称，例如 "Full House"
    pub fn name(&self) -> &'static str {
        self.score.category.name()
    }

    pub fn strength_cmp(&self, other: &EvaluatedHand) -> Ordering {
        self.score.strength_cmp(&other.score)
    }

    /// 在牌力上与 `other` 打平 (平分奖池的依据)
    pub fn ties_with(&self, other: &EvaluatedHand) -> bool {
        self.strength_cmp(other) == Ordering::Equal
    }
}

/// 按牌力从强到弱排序。
///
/// 排序是稳定的：牌力完全相同的手牌保持输入顺序。
pub fn rank_hands(mut hands: Vec<EvaluatedHand>) -> Vec<EvaluatedHand> {
    hands.sort_by(|a, b| b.strength_cmp(a));
    hands
}

/// 评估每一手牌并按牌力从强到弱返回，第一个就是赢家。
///
/// 任意一手牌解析或校验失败，整个调用失败。
pub fn compare_hands<I, H>(hands: I) -> Result<Vec<EvaluatedHand>, HandError>
where
    I: IntoIterator<Item = H>,
    H: IntoIterator,
    H::Item: AsRef<str>,
{
    let evaluated = hands
        .into_iter()
        .map(EvaluatedHand::new)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rank_hands(evaluated))
}

/// 排好序的手牌中与第一名打平的那一段
pub fn winners(ranked: &[EvaluatedHand]) -> &[EvaluatedHand] {
    let Some(best) = ranked.first() else {
        return ranked;
    };
    let count = ranked.iter().take_while(|hand| hand.ties_with(best)).count();
    &ranked[..count]
}

// --- 单元测试 ---
