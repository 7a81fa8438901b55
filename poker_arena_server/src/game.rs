use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use poker_arena_core::{
    begin_turn, end_turn, parse_decision, GameState, NextTurn, ShowdownSummary, TableView,
};

use crate::agent::{HeuristicAgent, PlayerAgent};
use crate::config::{AgentKind, Config};
use crate::model::ModelAgent;
use crate::prompt::build_prompt;

/// 一次回合推进之后需要告诉观众的内容
#[derive(Debug)]
pub enum TurnOutcome {
    /// 能继续玩的玩家不足两人，牌桌停止
    Idle,
    Played { view: TableView, result: Option<ShowdownSummary> },
}

/// 牌桌：共享的游戏状态加上每个座位背后的玩家
///
/// 状态锁只在同步代码里短暂持有，询问玩家时不持锁，`/state` 随时可读。
/// 玩家列表在等待回复期间一直被占用，所以用异步锁。
pub struct Table {
    state: Mutex<GameState>,
    agents: AsyncMutex<Vec<Box<dyn PlayerAgent>>>,
    rng: Mutex<StdRng>,
}

impl Table {
    pub fn new(state: GameState, agents: Vec<Box<dyn PlayerAgent>>, rng: StdRng) -> Table {
        Table { state: Mutex::new(state), agents: AsyncMutex::new(agents), rng: Mutex::new(rng) }
    }

    /// 按配置为每个座位选择内置玩家或远程模型
    pub fn from_config(state: GameState, config: &Config) -> anyhow::Result<Table> {
        match config.agent {
            AgentKind::Heuristic => Ok(Table::from_seed(state, config.seed)),
            AgentKind::Model => {
                let client = ModelAgent::http_client(config.model_timeout())?;
                let agents = state
                    .players
                    .iter()
                    .map(|p| {
                        let agent = ModelAgent::new(client.clone(), &config.model_endpoint, config.api_token.clone(), &p.model);
                        Box::new(agent) as Box<dyn PlayerAgent>
                    })
                    .collect();
                Ok(Table::new(state, agents, seeded_rng(config.seed)))
            }
        }
    }

    /// 每个座位一个内置玩家，种子由牌桌的随机数生成器派生
    pub fn with_heuristic_agents(state: GameState, mut rng: StdRng) -> Table {
        let agents = (0..state.players.len())
            .map(|_| Box::new(HeuristicAgent::new(rng.random())) as Box<dyn PlayerAgent>)
            .collect();
        Table::new(state, agents, rng)
    }

    pub fn from_seed(state: GameState, seed: Option<u64>) -> Table {
        Table::with_heuristic_agents(state, seeded_rng(seed))
    }

    pub fn snapshot(&self) -> TableView {
        self.state.lock().public_view()
    }

    /// 推进一个回合
    ///
    /// 开局 (如有必要)，询问当前座位的玩家，解析回复，然后结束回合。
    pub async fn play_turn(&self) -> TurnOutcome {
        let seat = {
            let mut state = self.state.lock();
            let mut rng = self.rng.lock();
            match begin_turn(&mut state, &mut *rng) {
                NextTurn::Idle => return TurnOutcome::Idle,
                NextTurn::Skip => None,
                NextTurn::Act(idx) => state.seat_view(idx).map(|seat| (idx, seat)),
            }
        };

        let decision = match seat {
            Some((idx, seat)) => {
                let prompt = build_prompt(&seat);
                let reply = match self.agents.lock().await.get_mut(idx) {
                    Some(agent) => agent.respond(&prompt, &seat).await,
                    None => String::new(),
                };
                let decision = parse_decision(&reply);
                debug!(player = %seat.name, %reply, %decision, "玩家已回复");
                Some(decision)
            }
            None => None,
        };

        let mut state = self.state.lock();
        let result = match end_turn(&mut state, decision) {
            Ok(result) => result,
            Err(e) => {
                warn!("第 {} 局摊牌评估失败: {}", state.hand_number.saturating_sub(1), e);
                None
            }
        };
        if let Some(summary) = &result {
            info!(
                "第 {} 局结束: {} 赢得 ${} ({})",
                summary.hand_number,
                summary.winners.join(", "),
                summary.pot,
                summary.hand_name.as_deref().unwrap_or("others folded"),
            );
        }
        TurnOutcome::Played { view: state.public_view(), result }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use poker_arena_core::{SeatView, TableConfig};

    /// 按顺序给出预先写好的回复，用完之后一直跟注
    struct ScriptedAgent(Vec<&'static str>);

    #[async_trait::async_trait]
    impl PlayerAgent for ScriptedAgent {
        async fn respond(&mut self, _prompt: &str, _seat: &SeatView) -> String {
            if self.0.is_empty() { "call".to_string() } else { self.0.remove(0).to_string() }
        }
    }

    fn scripted(scripts: Vec<Vec<&'static str>>) -> Table {
        let names: Vec<String> = (0..scripts.len()).map(|i| format!("Player_{}", i)).collect();
        let state = GameState::with_models(&names, &TableConfig::default());
        let agents = scripts.into_iter().map(|s| Box::new(ScriptedAgent(s)) as Box<dyn PlayerAgent>).collect();
        Table::new(state, agents, StdRng::seed_from_u64(3))
    }

    fn total_chips(view: &TableView) -> u32 {
        view.players.iter().map(|p| p.chips).sum::<u32>() + view.pot
    }

    #[tokio::test]
    async fn test_fold_out_ends_hand() {
        let table = scripted(vec![vec!["raise 100"], vec!["I fold"]]);

        let TurnOutcome::Played { view, result } = table.play_turn().await else { panic!("table should be playing") };
        assert!(result.is_none());
        assert_eq!(view.pot, 100);

        let TurnOutcome::Played { view, result } = table.play_turn().await else { panic!("table should be playing") };
        let summary = result.expect("hand should be over");
        assert_eq!(summary.winners, vec!["Player_0"]);
        assert_eq!(summary.hand_name, None);
        assert_eq!(summary.pot, 100);
        assert_eq!(view.players[0].chips, 1000);
        assert_eq!(view.hand_number, 2);
        assert!(!view.hand_in_progress);
    }

    #[tokio::test]
    async fn test_unparseable_reply_folds() {
        let table = scripted(vec![vec!["hmm, let me think"], vec![]]);
        let TurnOutcome::Played { result, .. } = table.play_turn().await else { panic!("table should be playing") };
        assert_eq!(result.unwrap().winners, vec!["Player_1"]);
    }

    #[tokio::test]
    async fn test_checked_down_hand_reaches_showdown() {
        let table = scripted(vec![vec![], vec![]]);
        // 两名玩家，四轮各两个回合
        let mut last = None;
        for _ in 0..8 {
            let TurnOutcome::Played { view, result } = table.play_turn().await else { panic!("table should be playing") };
            assert_eq!(total_chips(&view), 2000);
            last = result;
        }
        let summary = last.expect("river should end in a showdown");
        assert_eq!(summary.hand_number, 1);
        assert!(summary.hand_name.is_some());
        assert_eq!(table.snapshot().hand_number, 2);
    }

    #[tokio::test]
    async fn test_heuristic_table_conserves_chips() {
        let state = GameState::with_models(&["a", "b", "c", "d"], &TableConfig::default());
        let table = Table::from_seed(state, Some(42));
        for _ in 0..400 {
            match table.play_turn().await {
                TurnOutcome::Idle => break,
                TurnOutcome::Played { view, .. } => assert_eq!(total_chips(&view), 4000),
            }
        }
        assert!(table.snapshot().hand_number > 1);
    }

    #[test]
    fn test_model_agents_from_config() {
        let config = Config::try_parse_from(["poker-arena-server", "--agent", "model", "--api-token", "t", "--players", "a,b,c"]).unwrap();
        let state = GameState::with_models(&config.players, &config.table());
        let table = Table::from_config(state, &config).unwrap();
        assert_eq!(table.agents.try_lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_idle_without_two_funded_players() {
        let table = scripted(vec![vec![], vec![]]);
        table.state.lock().players[1].chips = 0;
        assert!(matches!(table.play_turn().await, TurnOutcome::Idle));
    }
}
