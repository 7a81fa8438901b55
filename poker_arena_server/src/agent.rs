use async_trait::async_trait;
use poker_arena_core::{classify, Card, Category, Rank, SeatView, MIN_HAND_SIZE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 坐在牌桌上的一个玩家背后的"大脑"
///
/// 和聊天模型一样，只返回自由文本，由 `parse_decision` 负责理解。
/// 询问远程模型需要等待网络，所以是异步的。
#[async_trait]
pub trait PlayerAgent: Send {
    async fn respond(&mut self, prompt: &str, seat: &SeatView) -> String;
}

/// 内置的简单玩家：用牌型评估估计自己的牌力，再用随机数决定激进程度
pub struct HeuristicAgent {
    rng: StdRng,
}

impl HeuristicAgent {
    pub fn new(seed: u64) -> HeuristicAgent {
        HeuristicAgent { rng: StdRng::seed_from_u64(seed) }
    }
}

/// 自己能看到的所有牌的牌型等级 (1..=10)
///
/// 翻牌前只有两张底牌，对子或两张高牌算作 2，其余算作 1。
pub fn hand_strength(seat: &SeatView) -> u8 {
    let known: Vec<String> = seat.hole_cards.iter().chain(&seat.community_cards).map(Card::to_string).collect();
    if known.len() >= MIN_HAND_SIZE {
        return classify(&known).map_or(Category::HighCard.value(), |score| score.category.value());
    }

    match seat.hole_cards[..] {
        [a, b] if a.rank == b.rank => Category::OnePair.value(),
        [a, b] if a.rank >= Rank::Jack && b.rank >= Rank::Jack => Category::OnePair.value(),
        _ => Category::HighCard.value(),
    }
}

#[async_trait]
impl PlayerAgent for HeuristicAgent {
    async fn respond(&mut self, _prompt: &str, seat: &SeatView) -> String {
        let strength = hand_strength(seat);
        let raise_to = seat
            .current_bet
            .saturating_add(seat.min_raise.saturating_mul(1 + u32::from(strength) / 3));

        match strength {
            4.. => format!("I'll raise ${}", raise_to),
            2 | 3 if self.rng.random_bool(0.3) => format!("raise {}", raise_to),
            2 | 3 => format!("call (costs ${})", seat.amount_to_call),
            _ if seat.amount_to_call == 0 || self.rng.random_bool(0.25) => "I'd call".to_string(),
            _ => "fold".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poker_arena_core::{parse_decision, Decision};

    fn seat(hole: &[&str], community: &[&str], amount_to_call: u32) -> SeatView {
        SeatView {
            name: "test".to_string(),
            hole_cards: hole.iter().map(|t| t.parse().unwrap()).collect(),
            community_cards: community.iter().map(|t| t.parse().unwrap()).collect(),
            pot: 200,
            chips: 1000,
            current_bet: amount_to_call,
            amount_to_call,
            min_raise: 50,
            last_raise_amount: 0,
        }
    }

    #[test]
    fn test_hand_strength_preflop() {
        assert_eq!(hand_strength(&seat(&["7♠", "7♦"], &[], 0)), 2);
        assert_eq!(hand_strength(&seat(&["K♠", "J♦"], &[], 0)), 2);
        assert_eq!(hand_strength(&seat(&["K♠", "7♦"], &[], 0)), 1);
    }

    #[test]
    fn test_hand_strength_uses_classifier() {
        let full_house = seat(&["9♠", "9♦"], &["9♥", "4♣", "4♦"], 0);
        assert_eq!(hand_strength(&full_house), Category::FullHouse.value());
    }

    #[tokio::test]
    async fn test_strong_hand_raises() {
        let mut agent = HeuristicAgent::new(1);
        let full_house = seat(&["9♠", "9♦"], &["9♥", "4♣", "4♦"], 50);
        let reply = agent.respond("", &full_house).await;
        assert_eq!(parse_decision(&reply), Decision::Raise(50 + 50 * 3));
    }

    #[tokio::test]
    async fn test_weak_hand_never_raises() {
        let mut agent = HeuristicAgent::new(5);
        let weak = seat(&["2♠", "7♦"], &["9♥", "J♣", "K♦"], 100);
        for _ in 0..50 {
            let decision = parse_decision(&agent.respond("", &weak).await);
            assert!(matches!(decision, Decision::Call | Decision::Fold));
        }
    }

    #[tokio::test]
    async fn test_weak_hand_checks_for_free() {
        let mut agent = HeuristicAgent::new(5);
        let weak = seat(&["2♠", "7♦"], &["9♥", "J♣", "K♦"], 0);
        assert_eq!(parse_decision(&agent.respond("", &weak).await), Decision::Call);
    }

    #[tokio::test]
    async fn test_agent_is_seed_deterministic() {
        let pair = seat(&["Q♠", "Q♦"], &[], 50);
        let mut a = HeuristicAgent::new(77);
        let mut b = HeuristicAgent::new(77);
        for _ in 0..20 {
            assert_eq!(a.respond("", &pair).await, b.respond("", &pair).await);
        }
    }
}
