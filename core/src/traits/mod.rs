pub mod backend;

pub use backend::{Backend, ChatMessage, ChatRequest};
