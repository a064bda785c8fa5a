//! Route handlers.

mod http;
mod sse;

pub use http::{
    create_room, get_room, health_check, join_room, leave_room, root, run_code, save_room,
    send_chat_message, update_code, update_cursor, update_typing,
};
pub use sse::sse_handler;
