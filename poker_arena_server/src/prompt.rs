use poker_arena_core::{Card, SeatView};

fn join(cards: &[Card]) -> String {
    cards.iter().map(Card::to_string).collect::<Vec<_>>().join(", ")
}

/// 轮到某个模型行动时发给它的提示词
pub fn build_prompt(seat: &SeatView) -> String {
    format!(
        "You are playing Texas Hold'em Poker.
Your cards: {hole}
Community cards: {community}
Current pot: {pot}
Your chips: {chips}
Current bet: ${current_bet}
Amount to call: ${to_call}
Minimum raise: ${min_raise}
Last raise amount: ${last_raise}

What action do you take? Respond with exactly one of:
- fold
- call (costs ${to_call})
- raise {{amount}} (must be at least ${raise_floor})",
        hole = join(&seat.hole_cards),
        community = join(&seat.community_cards),
        pot = seat.pot,
        chips = seat.chips,
        current_bet = seat.current_bet,
        to_call = seat.amount_to_call,
        min_raise = seat.min_raise,
        last_raise = seat.last_raise_amount,
        raise_floor = seat.current_bet.saturating_add(seat.min_raise),
    )
}
