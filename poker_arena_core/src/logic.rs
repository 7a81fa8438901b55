use crate::card::*;
use crate::decision::Decision;
use crate::error::HandError;
use crate::message::ShowdownSummary;
use crate::showdown::{compare_hands, winners};
use crate::state::*;
use rand::Rng;

/// 一次回合开始时牌桌的情况
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextTurn {
    /// 需要询问该座位的玩家
    Act(usize),
    /// 该座位已弃牌，直接跳过
    Skip,
    /// 有筹码的玩家不足两人，无法开局
    Idle,
}

// --- 核心游戏流程函数 ---

/// 至少两名玩家还有筹码才能开始新的一局
pub fn can_start_hand(state: &GameState) -> bool {
    state.players.iter().filter(|p| p.chips > 0).count() >= 2
}

/// 开始新的一局游戏
///
/// - 洗一副新牌，重置下注、弃牌和公共牌。
/// - 筹码为 0 的玩家本局直接视为弃牌，不发底牌。
/// - 其余每个玩家发两张底牌，从 0 号座位开始行动。
pub fn start_new_hand<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    state.deck = shuffled_deck(rng);
    state.community_cards.clear();
    state.round = Round::PreFlop;
    state.current_player = 0;
    state.current_bet = 0;
    state.last_raise_amount = 0;

    let deck = &mut state.deck;
    for player in state.players.iter_mut() {
        player.round_bet = 0;
        player.folded = player.chips == 0;
        player.cards = if player.folded { Vec::new() } else { draw(deck, 2) };
    }

    state.hand_in_progress = true;
    let dealt = state.players_in_hand().len();
    state.add_to_log(format!("Hand #{} begins. Cards dealt to {} players.", state.hand_number, dealt));
}

/// 开始一个回合：必要时先开新的一局，然后告诉调用方该问谁
pub fn begin_turn<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> NextTurn {
    if !state.hand_in_progress {
        if !can_start_hand(state) {
            return NextTurn::Idle;
        }
        start_new_hand(state, rng);
    }

    match state.players.get(state.current_player) {
        Some(player) if !player.folded => NextTurn::Act(state.current_player),
        Some(_) => NextTurn::Skip,
        None => NextTurn::Idle,
    }
}

/// 结束一个回合
///
/// `decision` 为 `None` 表示该座位被跳过。处理完动作后：
/// 只剩一名玩家时直接把奖池给他并结束本局；否则轮到下一个座位，
/// 座位回到 0 号时进入下一轮发牌，河牌轮之后摊牌。
///
/// 返回值在本局结束时带有结算结果。摊牌评估失败时返回错误，
/// 本局照常结束，奖池留在桌上进入下一局。
pub fn end_turn(state: &mut GameState, decision: Option<Decision>) -> Result<Option<ShowdownSummary>, HandError> {
    if state.players.is_empty() {
        return Ok(None);
    }

    let idx = state.current_player;
    if let Some(decision) = decision {
        process_decision(state, idx, decision);
    }

    let in_hand = state.players_in_hand();
    if let [winner] = in_hand[..] {
        let summary = award_pot(state, &[winner], None);
        finish_hand(state);
        return Ok(Some(summary));
    }

    state.current_player = (idx + 1) % state.players.len();
    if state.current_player == 0 {
        return advance_round(state);
    }
    Ok(None)
}

/// 处理单个玩家的决定
///
/// - 加注：目标额至少是当前最高下注加最小加注额；付不起就降级为跟注，再付不起就弃牌。
/// - 跟注：付不起就弃牌。
pub fn process_decision(state: &mut GameState, idx: usize, decision: Decision) {
    let Some(player) = state.players.get(idx) else {
        return;
    };
    let amount_to_call = state.amount_to_call(idx);

    let effective = match decision {
        Decision::Raise(amount) => {
            let target = amount.max(state.current_bet.saturating_add(state.min_raise));
            if target - player.round_bet <= player.chips {
                Decision::Raise(target)
            } else if amount_to_call <= player.chips {
                Decision::Call
            } else {
                Decision::Fold
            }
        }
        Decision::Call if amount_to_call > player.chips => Decision::Fold,
        other => other,
    };

    let message = apply_decision(state, idx, effective);
    state.add_to_log(message);
}

// --- 辅助逻辑函数 ---

/// 执行已经确认付得起的决定，返回日志内容
fn apply_decision(state: &mut GameState, idx: usize, decision: Decision) -> String {
    let current_bet = state.current_bet;
    let player = &mut state.players[idx];

    match decision {
        Decision::Raise(target) => {
            let added = target - player.round_bet;
            player.chips -= added;
            player.round_bet = target;
            state.pot = state.pot.saturating_add(added);
            state.last_raise_amount = target - current_bet;
            state.current_bet = target;
            format!("{} raises to ${} (adding ${})", player.name, target, added)
        }
        Decision::Call => {
            let added = current_bet - player.round_bet;
            player.chips -= added;
            player.round_bet = current_bet;
            state.pot = state.pot.saturating_add(added);
            if added == 0 {
                format!("{} checks", player.name)
            } else {
                format!("{} calls ${}", player.name, added)
            }
        }
        Decision::Fold => {
            player.folded = true;
            format!("{} folds", player.name)
        }
    }
}

/// 从牌堆顶部 (末尾) 摸 `count` 张牌，按摸牌顺序返回
fn draw(deck: &mut Vec<Card>, count: usize) -> Vec<Card> {
    let at = deck.len().saturating_sub(count);
    let mut drawn = deck.split_off(at);
    drawn.reverse();
    drawn
}

/// 推进到下一轮
///
/// 发出公共牌 (Flop 3 张, Turn 1 张, River 1 张) 并重置本轮下注；
/// River 之后进入摊牌并结束本局。
fn advance_round(state: &mut GameState) -> Result<Option<ShowdownSummary>, HandError> {
    let (round, count) = match state.round {
        Round::PreFlop => (Round::Flop, 3),
        Round::Flop => (Round::Turn, 1),
        Round::Turn => (Round::River, 1),
        Round::River => {
            let result = showdown(state);
            if let Err(err) = &result {
                let message = format!("Showdown failed ({}); pot of ${} carries over", err, state.pot);
                state.add_to_log(message);
            }
            finish_hand(state);
            return result.map(Some);
        }
    };

    state.round = round;
    state.current_bet = 0;
    state.last_raise_amount = 0;
    state.players.iter_mut().for_each(|p| p.round_bet = 0);

    let dealt = draw(&mut state.deck, count);
    state.community_cards.extend(&dealt);
    let shown = dealt.iter().map(Card::to_string).collect::<Vec<_>>().join(", ");
    let message = match round {
        Round::Flop => format!("Flop dealt: {}", shown),
        Round::Turn => format!("Turn dealt: {}", shown),
        _ => format!("River dealt: {}", shown),
    };
    state.add_to_log(message);
    Ok(None)
}

/// 处理摊牌逻辑
///
/// 每个未弃牌的玩家用 底牌 + 公共牌 组成一手牌，交给 [`compare_hands`] 排序。
/// 与第一名打平的所有玩家平分奖池。
pub fn showdown(state: &mut GameState) -> Result<ShowdownSummary, HandError> {
    let contenders: Vec<(usize, Vec<String>)> = state
        .players_in_hand()
        .into_iter()
        .map(|idx| (idx, state.hand_tokens(idx)))
        .collect();

    let ranked = compare_hands(contenders.iter().map(|(_, tokens)| tokens))?;
    let best = winners(&ranked);
    let winner_indices: Vec<usize> = best
        .iter()
        .filter_map(|hand| {
            contenders
                .iter()
                .find(|(_, tokens)| tokens.as_slice() == hand.tokens())
                .map(|(idx, _)| *idx)
        })
        .collect();
    let hand_name = best.first().map(|hand| hand.name().to_string());

    Ok(award_pot(state, &winner_indices, hand_name))
}

/// 将奖池分配给赢家，除不尽的部分给第一个赢家
fn award_pot(state: &mut GameState, winners: &[usize], hand_name: Option<String>) -> ShowdownSummary {
    let pot = state.pot;
    let names: Vec<String> = winners.iter().filter_map(|&idx| state.players.get(idx)).map(|p| p.name.clone()).collect();

    if !names.is_empty() {
        let share = pot / names.len() as u32;
        let remainder = pot % names.len() as u32;
        for (i, &idx) in winners.iter().enumerate() {
            if let Some(player) = state.players.get_mut(idx) {
                player.chips = player.chips.saturating_add(share + if i == 0 { remainder } else { 0 });
            }
        }
        state.pot = 0;

        let verb = if names.len() == 1 { "wins" } else { "split" };
        let message = match &hand_name {
            Some(hand) => format!("{} {} pot of ${} with {}", names.join(" and "), verb, pot, hand),
            None => format!("{} {} pot of ${}", names.join(" and "), verb, pot),
        };
        state.add_to_log(message);
    }

    ShowdownSummary {
        hand_number: state.hand_number,
        pot: if names.is_empty() { 0 } else { pot },
        winners: names,
        hand_name,
    }
}

/// 一局结束，准备下一局。底牌保留到下一次发牌，方便观众查看。
fn finish_hand(state: &mut GameState) {
    state.hand_number += 1;
    state.round = Round::PreFlop;
    state.community_cards.clear();
    state.current_player = 0;
    state.current_bet = 0;
    state.last_raise_amount = 0;
    state.hand_in_progress = false;
    state.players.iter_mut().for_each(|p| p.round_bet = 0);
}

// --- 单元测试 ---
