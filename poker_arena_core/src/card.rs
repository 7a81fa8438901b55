use rand::Rng;
use rand::prelude::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

// --- 核心数据结构定义 ---

/// 花色 (Suit)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Spade,   // 黑桃 ♠
    Club,    // 梅花 ♣
    Heart,   // 红心 ♥
    Diamond, // 方块 ♦
}

/// 点数 (Rank)
/// 判别值就是牌面点数，Ace 默认是最大的 14。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

/// 单张扑克牌 (Card)
///
/// 在线上以牌面字符串的形式传输，例如 `"10♠"`、`"A♦"`。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

pub const SUITS: [Suit; 4] = [Suit::Spade, Suit::Club, Suit::Heart, Suit::Diamond];

pub const RANKS: [Rank; 13] = [
    Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven, Rank::Eight,
    Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
];

impl Suit {
    pub fn glyph(self) -> char {
        match self {
            Suit::Spade => '♠',
            Suit::Club => '♣',
            Suit::Heart => '♥',
            Suit::Diamond => '♦',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Suit> {
        SUITS.into_iter().find(|suit| suit.glyph() == glyph)
    }
}

impl Rank {
    /// 点数值，2 到 14
    pub fn value(self) -> u8 {
        self as u8
    }

    /// 牌面上的点数标记，只有 `"10"` 是两个字符
    pub fn marker(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Rank> {
        RANKS.into_iter().find(|rank| rank.marker() == marker)
    }
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }
}

/// 把牌面字符串解析成一张牌
///
/// 长度按字符计算：3 个字符时前两个是点数标记 (只可能是 `10`)，
/// 否则第一个字符是点数、第二个是花色。长度不是 2 或 3、
/// 点数标记不在表中、花色符号不认识，都会返回 [`ParseError`]。
pub fn parse_card(token: &str) -> Result<Card, ParseError> {
    let len = token.chars().count();
    if len != 2 && len != 3 {
        return Err(ParseError::InvalidLength { token: token.to_string(), len });
    }

    // 最后一个字符是花色，之前的都是点数标记
    let (split, glyph) = token
        .char_indices()
        .last()
        .ok_or_else(|| ParseError::InvalidLength { token: token.to_string(), len })?;
    let marker = &token[..split];

    let rank = Rank::from_marker(marker).ok_or_else(|| ParseError::UnknownRank {
        token: token.to_string(),
        marker: marker.to_string(),
    })?;
    let suit = Suit::from_glyph(glyph).ok_or_else(|| ParseError::UnknownSuit {
        token: token.to_string(),
        glyph,
    })?;

    Ok(Card { rank, suit })
}

impl FromStr for Card {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_card(s)
    }
}

impl TryFrom<String> for Card {
    type Error = ParseError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        parse_card(&token)
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

// --- 实现辅助功能 ---

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

// --- 牌组 ---

/// 创建一副完整的 52 张扑克牌
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for &suit in &SUITS {
        for &rank in &RANKS {
            deck.push(Card { rank, suit });
        }
    }
    deck
}

/// 创建一副洗好的新牌
///
/// 随机数生成器由调用方传入，测试时可以使用固定种子。
pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = full_deck();
    deck.shuffle(rng);
    deck
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use Rank::*;
    use Suit::*;

    #[test]
    fn test_parse_single_char_rank() {
        assert_eq!(parse_card("A♠").unwrap(), Card::new(Ace, Spade));
        assert_eq!(parse_card("2♦").unwrap(), Card::new(Two, Diamond));
        assert_eq!(parse_card("J♣").unwrap(), Card::new(Jack, Club));
    }

    #[test]
    fn test_parse_ten() {
        let card: Card = "10♥".parse().unwrap();
        assert_eq!(card, Card::new(Ten, Heart));
        assert_eq!(card.rank.value(), 10);
    }

    #[test]
    fn test_rank_values() {
        let values: Vec<u8> = RANKS.iter().map(|r| r.value()).collect();
        assert_eq!(values, (2..=14).collect::<Vec<u8>>());
    }

    #[test]
    fn test_display_round_trips_token() {
        for token in ["10♠", "Q♥", "3♣", "A♦"] {
            assert_eq!(parse_card(token).unwrap().to_string(), token);
        }
    }

    #[test]
    fn test_invalid_length() {
        assert_eq!(
            parse_card("A"),
            Err(ParseError::InvalidLength { token: "A".to_string(), len: 1 })
        );
        assert!(matches!(parse_card(""), Err(ParseError::InvalidLength { len: 0, .. })));
        assert!(matches!(parse_card("10♠♠"), Err(ParseError::InvalidLength { len: 4, .. })));
    }

    #[test]
    fn test_unknown_rank() {
        assert_eq!(
            parse_card("1♠"),
            Err(ParseError::UnknownRank { token: "1♠".to_string(), marker: "1".to_string() })
        );
        // 三个字符时前两个必须是 "10"
        assert!(matches!(parse_card("11♠"), Err(ParseError::UnknownRank { .. })));
        assert!(matches!(parse_card("T♠"), Err(ParseError::UnknownRank { .. })));
    }

    #[test]
    fn test_unknown_suit() {
        assert_eq!(
            parse_card("As"),
            Err(ParseError::UnknownSuit { token: "As".to_string(), glyph: 's' })
        );
        assert!(matches!(parse_card("10x"), Err(ParseError::UnknownSuit { glyph: 'x', .. })));
    }

    #[test]
    fn test_serde_uses_token() {
        let card = Card::new(Ten, Club);
        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, "\"10♣\"");
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
        assert!(serde_json::from_str::<Card>("\"Z♣\"").is_err());
    }

    #[test]
    fn test_full_deck_is_unique() {
        let deck = full_deck();
        assert_eq!(deck.len(), 52);
        let unique: HashSet<Card> = deck.iter().copied().collect();
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn test_shuffled_deck_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = shuffled_deck(&mut rng);
        assert_eq!(deck.len(), 52);
        deck.sort();
        let mut ordered = full_deck();
        ordered.sort();
        assert_eq!(deck, ordered);
    }

    #[test]
    fn test_shuffle_is_seed_deterministic() {
        let a = shuffled_deck(&mut StdRng::seed_from_u64(42));
        let b = shuffled_deck(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
