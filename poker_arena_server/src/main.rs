mod agent;
mod config;
mod game;
mod model;
mod prompt;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use clap::Parser;
use dashmap::DashMap;
use futures_util::{stream::StreamExt, SinkExt};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use poker_arena_core::{ClientMessage, GameState, ServerMessage, TableView};

use crate::config::Config;
use crate::game::{Table, TurnOutcome};

// 服务器全局状态
struct AppState {
    table: Table,
    // 每个观众连接对应一个发送通道
    connections: DashMap<Uuid, mpsc::Sender<ServerMessage>>,
}

type SharedState = Arc<AppState>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();
    config.validate()?;
    let addr = config.addr()?;

    let game = GameState::with_models(&config.players, &config.table());
    let state = SharedState::new(AppState {
        table: Table::from_config(game, &config)?,
        connections: DashMap::new(),
    });
    info!("牌桌已就绪 ({:?}): {}", config.agent, config.players.join(", "));

    tokio::spawn(run_game_loop(state.clone(), config.turn_delay()));

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .route("/state", get(state_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法监听 {}", addr))?;
    info!("服务器正在监听 {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// 游戏主循环：推进一个回合，广播结果，等待一段时间，如此反复
async fn run_game_loop(state: SharedState, turn_delay: Duration) {
    loop {
        match state.table.play_turn().await {
            TurnOutcome::Idle => {
                info!("有筹码的玩家不足两人，牌桌停止");
                broadcast(&state, &ServerMessage::GameUpdate(state.table.snapshot()));
                return;
            }
            TurnOutcome::Played { view, result } => {
                broadcast(&state, &ServerMessage::GameUpdate(view));
                if let Some(summary) = result {
                    broadcast(&state, &ServerMessage::HandResult(summary));
                }
            }
        }
        tokio::time::sleep(turn_delay).await;
    }
}

/// 当前牌桌快照
async fn state_handler(State(state): State<SharedState>) -> Json<TableView> {
    Json(state.table.snapshot())
}

/// 处理 WebSocket 连接请求
async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// 处理单个观众连接的生命周期
async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();

    // 创建一个 MPSC 通道，用于从游戏循环接收要发送的消息
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(32);

    // 启动一个新任务，专门负责将 MPSC 通道中的消息发送到 WebSocket
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let payload = match serde_json::to_string(&msg) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("序列化消息失败: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                // 发送失败，说明客户端已断开，退出任务
                break;
            }
        }
    });

    let conn_id = Uuid::new_v4();
    state.connections.insert(conn_id, tx.clone());
    info!("观众 {} 已连接，当前共 {} 个连接", conn_id, state.connections.len());

    // 新连接立即收到一份快照
    let _ = tx.send(ServerMessage::GameUpdate(state.table.snapshot())).await;

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::RequestSnapshot) => {
                    debug!("观众 {} 请求快照", conn_id);
                    let _ = tx.send(ServerMessage::GameUpdate(state.table.snapshot())).await;
                }
                Err(e) => {
                    warn!("解析消息失败: {}", e);
                    let _ = tx.send(ServerMessage::Error { message: format!("无法识别的消息: {}", e) }).await;
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // 客户端断开连接，执行清理工作
    state.connections.remove(&conn_id);
    info!("观众 {} 连接关闭", conn_id);
}

/// 向所有观众广播消息
///
/// 游戏循环不能等任何一个观众：通道已满的连接 (读得太慢) 和已关闭的连接
/// 直接从连接表中移除，其余观众照常收到消息。
fn broadcast(state: &AppState, message: &ServerMessage) {
    let mut dropped = Vec::new();
    for entry in state.connections.iter() {
        match entry.value().try_send(message.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("观众 {} 接收过慢，断开连接", entry.key());
                dropped.push(*entry.key());
            }
            Err(TrySendError::Closed(_)) => {
                warn!("向观众 {} 发送消息失败（已断开）", entry.key());
                dropped.push(*entry.key());
            }
        }
    }
    // 迭代期间持有分片读锁，移除放在迭代结束之后
    for conn_id in dropped {
        state.connections.remove(&conn_id);
    }
}
