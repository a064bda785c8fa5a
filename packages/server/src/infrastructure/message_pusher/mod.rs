//! メッセージ送信（通知）の実装
//!
//! ## 概要
//!
//! - `channel`: 参加者ごとの有界 mpsc チャンネルを使った `MessagePusher` 実装
//! - `stream`: チャンネルの受信側を所有し、キープアライブ付きで排出するイベントストリーム

pub mod channel;
pub mod stream;

pub use channel::ChannelMessagePusher;
pub use stream::{EventStream, KEEP_ALIVE_PAYLOAD, StreamFrame};
