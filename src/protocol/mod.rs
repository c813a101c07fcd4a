//! Wire protocol
//!
//! Frame envelope, typed request messages with chaining, and reply
//! decoding with correlation enforcement.

pub mod message;
pub mod reply;
pub mod wire;

pub use message::{
    next_request_id, CommandBody, CommandMessage, DeleteBody, DeleteMessage, InsertBody,
    InsertMessage, MessageSettings, RequestMessage, UpdateBody, UpdateMessage,
};
pub use reply::{ReplyMessage, ResponseBuffers};
pub use wire::{read_frame, split_frame, write_frame, FrameHeader, OpCode, HEADER_SIZE,
    MAX_FRAME_SIZE};
