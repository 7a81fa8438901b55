use std::io::Write;

use anyhow::Context;
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use url::Url;

use poker_arena_core::{ClientMessage, ServerMessage, ShowdownSummary, TableView};

#[derive(Parser, Debug)]
#[command(name = "poker-arena-client", about = "Watch the AI poker table from a terminal")]
struct Args {
    /// WebSocket address of the arena server
    #[arg(long, env = "ARENA_URL", default_value = "ws://127.0.0.1:3000/ws")]
    url: Url,
}

/// 一行牌桌概况加每个玩家一行
fn render_table(view: &TableView) -> String {
    let board = view.community_cards.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" ");
    let mut out = format!(
        "第 {} 局 {:?} | 奖池 ${} | 当前下注 ${} | 公共牌 [{}]",
        view.hand_number, view.round, view.pot, view.current_bet, board
    );
    for (idx, p) in view.players.iter().enumerate() {
        let cards = p.cards.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" ");
        let marker = if view.hand_in_progress && idx == view.current_player { ">" } else { " " };
        let status = if p.folded { " (弃牌)" } else { "" };
        out.push_str(&format!("\n {} {:<28} ${:<6} 本轮 ${:<5} [{}]{}", marker, p.name, p.chips, p.round_bet, cards, status));
    }
    if let Some(latest) = view.game_log.first() {
        out.push_str(&format!("\n   {}", latest));
    }
    out
}

fn render_result(summary: &ShowdownSummary) -> String {
    match &summary.hand_name {
        Some(hand) => format!(
            "*** 第 {} 局: {} 以 {} 赢得 ${} ***",
            summary.hand_number,
            summary.winners.join(", "),
            hand,
            summary.pot
        ),
        None => format!("*** 第 {} 局: {} 赢得 ${} ***", summary.hand_number, summary.winners.join(", "), summary.pot),
    }
}

fn render(msg: &ServerMessage) -> String {
    match msg {
        ServerMessage::GameUpdate(view) => render_table(view),
        ServerMessage::HandResult(summary) => render_result(summary),
        ServerMessage::Error { message } => format!("服务器错误: {}", message),
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("正在连接到: {}", args.url);
    let (ws_stream, _) = connect_async(args.url.as_str())
        .await
        .with_context(|| format!("无法连接到 {}", args.url))?;
    println!("连接成功!");

    let (mut write, mut read) = ws_stream.split();

    // 启动一个任务来处理从服务器接收的消息
    tokio::spawn(async move {
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(server_msg) => {
                        println!("\n{}\n", render(&server_msg));
                        prompt();
                    }
                    Err(e) => eprintln!("解析服务器消息失败: {}", e),
                },
                Ok(Message::Close(_)) => {
                    println!("\n服务器关闭了连接");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("接收消息时出错: {}", e);
                    break;
                }
            }
        }
    });

    // 主任务处理用户输入
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    println!("--- 扑克竞技场观众端 ---");
    println!("可用命令:");
    println!("  state                     - 请求当前牌桌快照");
    println!("  exit                      - 退出");

    loop {
        prompt();

        let Some(line) = stdin.next_line().await? else {
            break;
        };
        let client_msg = match line.trim() {
            "" => continue,
            "state" => ClientMessage::RequestSnapshot,
            "exit" => {
                println!("正在断开连接...");
                break;
            }
            other => {
                println!("未知命令: {}", other);
                continue;
            }
        };

        let payload = serde_json::to_string(&client_msg)?;
        write.send(Message::Text(payload.into())).await?;
    }

    let _ = write.send(Message::Close(None)).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use poker_arena_core::{GameState, TableConfig};

    #[test]
    fn test_default_url() {
        let args = Args::try_parse_from(["poker-arena-client"]).unwrap();
        assert_eq!(args.url.as_str(), "ws://127.0.0.1:3000/ws");
        assert!(Args::try_parse_from(["poker-arena-client", "--url", "not a url"]).is_err());
    }

    #[test]
    fn test_render_table_marks_folded_players() {
        let mut state = GameState::with_models(&["gpt-4o-mini", "Mistral-small"], &TableConfig::default());
        state.players[1].folded = true;
        state.add_to_log("Mistral-small folds");

        let text = render_table(&state.public_view());
        assert!(text.starts_with("第 1 局 PreFlop | 奖池 $0"));
        assert!(text.contains("gpt-4o-mini"));
        assert!(text.contains("(弃牌)"));
        assert!(text.ends_with("[#1] Mistral-small folds"));
    }

    #[test]
    fn test_render_result() {
        let summary = ShowdownSummary {
            hand_number: 3,
            winners: vec!["a".to_string(), "b".to_string()],
            hand_name: Some("Two Pair".to_string()),
            pot: 400,
        };
        assert_eq!(render_result(&summary), "*** 第 3 局: a, b 以 Two Pair 赢得 $400 ***");

        let folded_out = ShowdownSummary { hand_name: None, ..summary };
        assert_eq!(render_result(&folded_out), "*** 第 3 局: a, b 赢得 $400 ***");
    }
}
