use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::card::{parse_card, Card};
use crate::error::{HandError, ValidationError};

/// 一手牌至少需要的张数
pub const MIN_HAND_SIZE: usize = 5;

/// 牌型等级 (Category)
///
/// 判别值就是对外的等级数字，1 (高牌) 到 10 (皇家同花顺)，
/// 变体顺序从小到大，可以直接利用 `Ord` 进行比较。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Category {
    HighCard = 1,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::HighCard,
        Category::OnePair,
        Category::TwoPair,
        Category::ThreeOfAKind,
        Category::Straight,
        Category::Flush,
        Category::FullHouse,
        Category::FourOfAKind,
        Category::StraightFlush,
        Category::RoyalFlush,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.value() == value)
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::RoyalFlush => "Royal Flush",
            Category::StraightFlush => "Straight Flush",
            Category::FourOfAKind => "Four of a Kind",
            Category::FullHouse => "Full House",
            Category::Flush => "Flush",
            Category::Straight => "Straight",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::TwoPair => "Two Pair",
            Category::OnePair => "One Pair",
            Category::HighCard => "High Card",
        }
    }
}

/// 等级数字对应的牌型名称，超出 1..=10 时返回 `None`
pub fn category_name(value: u8) -> Option<&'static str> {
    Category::from_value(value).map(Category::name)
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一手牌的得分：牌型等级加上用于同级比较的踢脚序列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub category: Category,
    pub tie_break: Vec<u8>,
}

impl Score {
    pub fn new(category: Category, tie_break: Vec<u8>) -> Score {
        Score { category, tie_break }
    }

    /// 牌力比较，`Greater` 表示 `self` 更强。
    ///
    /// 先比牌型等级，再逐位比较 `tie_break` 的公共前缀。
    /// 一方是另一方的前缀时视为相等，不会再用更长的一方决胜。
    pub fn strength_cmp(&self, other: &Score) -> Ordering {
        self.category.cmp(&other.category).then_with(|| {
            self.tie_break
                .iter()
                .zip(&other.tie_break)
                .map(|(a, b)| a.cmp(b))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

/// 从一手牌推导出的、分类时需要的全部事实
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandFacts {
    /// 所有点数，从大到小，保留重复
    pub sorted_ranks: Vec<u8>,
    /// 每张牌花色都和第一张相同 (整手判断，不是 7 选 5)
    pub is_flush: bool,
    /// 所有不同点数连成一条，A-2-3-4-5 中 A 当作 1
    pub is_straight: bool,
    /// 点数 -> 张数，按点数从小到大遍历
    pub rank_counts: BTreeMap<u8, usize>,
    /// `rank_counts` 的值，从大到小
    pub counts: Vec<usize>,
}

impl HandFacts {
    pub fn from_cards(cards: &[Card]) -> HandFacts {
        let mut sorted_ranks: Vec<u8> = cards.iter().map(|c| c.rank.value()).collect();
        sorted_ranks.sort_unstable_by(|a, b| b.cmp(a));

        let is_flush = cards.first().is_some_and(|first| cards.iter().all(|c| c.suit == first.suit));
        let is_straight = is_straight(&sorted_ranks);

        let mut rank_counts = BTreeMap::new();
        for &rank in &sorted_ranks {
            *rank_counts.entry(rank).or_insert(0) += 1;
        }
        let mut counts: Vec<usize> = rank_counts.values().copied().collect();
        counts.sort_unstable_by(|a, b| b.cmp(a));

        HandFacts { sorted_ranks, is_flush, is_straight, rank_counts, counts }
    }

    /// 恰好出现 `count` 次的点数中最小的那个。
    ///
    /// 有多个点数满足条件时 (例如 7 张牌里有两组三条)，总是取最小的点数。
    pub fn lowest_rank_with_count(&self, count: usize) -> Option<u8> {
        self.rank_counts.iter().find(|&(_, &c)| c == count).map(|(&rank, _)| rank)
    }

    /// 恰好出现 `count` 次的所有点数，从大到小
    fn ranks_with_count(&self, count: usize) -> Vec<u8> {
        self.rank_counts.iter().rev().filter(|&(_, &c)| c == count).map(|(&rank, _)| rank).collect()
    }

    /// `sorted_ranks` 中不属于 `excluded` 的点数，保持原有顺序
    fn ranks_except<'a>(&'a self, excluded: &'a [u8]) -> impl Iterator<Item = u8> + 'a {
        self.sorted_ranks.iter().copied().filter(move |rank| !excluded.contains(rank))
    }

    /// 按牌型阶梯从上往下匹配，第一个命中的就是结果，高牌兜底。
    pub fn score(&self) -> Score {
        let top = self.counts.first().copied().unwrap_or(0);
        let second = self.counts.get(1).copied().unwrap_or(0);

        if self.is_flush && self.is_straight {
            // 只看第 1 和第 5 大的点数，多于 5 张时也照此判断
            let category = if self.sorted_ranks.first() == Some(&14) && self.sorted_ranks.get(4) == Some(&10) {
                Category::RoyalFlush
            } else {
                Category::StraightFlush
            };
            return Score::new(category, self.sorted_ranks.clone());
        }

        if top == 4 {
            if let Some(quad) = self.lowest_rank_with_count(4) {
                let tie_break = std::iter::once(quad).chain(self.ranks_except(&[quad]).take(1)).collect();
                return Score::new(Category::FourOfAKind, tie_break);
            }
        }

        if top == 3 && second == 2 {
            if let (Some(trip), Some(pair)) = (self.lowest_rank_with_count(3), self.lowest_rank_with_count(2)) {
                return Score::new(Category::FullHouse, vec![trip, pair]);
            }
        }

        if self.is_flush {
            return Score::new(Category::Flush, self.sorted_ranks.clone());
        }

        if self.is_straight {
            return Score::new(Category::Straight, self.sorted_ranks.clone());
        }

        if top == 3 {
            if let Some(trip) = self.lowest_rank_with_count(3) {
                let tie_break = std::iter::once(trip).chain(self.ranks_except(&[trip])).collect();
                return Score::new(Category::ThreeOfAKind, tie_break);
            }
        }

        if top == 2 && second == 2 {
            // 7 张牌可能有三个对子，全部计入
            let mut tie_break = self.ranks_with_count(2);
            let kicker = self.ranks_except(&tie_break).next();
            tie_break.extend(kicker);
            return Score::new(Category::TwoPair, tie_break);
        }

        if top == 2 {
            if let Some(pair) = self.lowest_rank_with_count(2) {
                let tie_break = std::iter::once(pair).chain(self.ranks_except(&[pair])).collect();
                return Score::new(Category::OnePair, tie_break);
            }
        }

        Score::new(Category::HighCard, self.sorted_ranks.clone())
    }
}

/// `sorted_ranks` 必须是从大到小排好的
fn is_straight(sorted_ranks: &[u8]) -> bool {
    let mut distinct = sorted_ranks.to_vec();
    distinct.dedup();

    // A-2-3-4-5: A 当作 1 放到最后
    if distinct.first() == Some(&14) && distinct.get(1) == Some(&5) {
        distinct.remove(0);
        distinct.push(1);
    }

    distinct.windows(2).all(|w| w[0] == w[1] + 1)
}

/// 解析并校验一手牌：每张牌都要能解析，至少 5 张，且没有重复的牌
pub fn parse_hand<I>(tokens: I) -> Result<Vec<Card>, HandError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let cards = tokens
        .into_iter()
        .map(|token| parse_card(token.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    if cards.len() < MIN_HAND_SIZE {
        return Err(ValidationError::TooFewCards { got: cards.len() }.into());
    }

    let mut seen = HashSet::with_capacity(cards.len());
    if let Some(duplicate) = cards.iter().find(|card| !seen.insert(**card)) {
        return Err(ValidationError::DuplicateCard(duplicate.to_string()).into());
    }

    Ok(cards)
}

/// 对一手牌 (任意 N >= 5 张) 分类并计算得分
pub fn classify<I>(tokens: I) -> Result<Score, HandError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let cards = parse_hand(tokens)?;
    Ok(HandFacts::from_cards(&cards).score())
}

// --- 单元测试 ---
