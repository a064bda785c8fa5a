//! InMemory 実装
//!
//! HashMap をインメモリ DB として使用します。
//! 各テーブルは 1 つの `tokio::sync::Mutex` で保護され、ロックを保持したまま
//! `.await` することはありません。

mod room_registry;
mod room_store;
mod session_index;

pub use room_registry::InMemoryRoomRegistry;
pub use room_store::InMemoryRoomStore;
pub use session_index::InMemorySessionIndex;
