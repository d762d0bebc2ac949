pub mod ai;
pub mod ai_types;
pub mod export;
pub mod merge;
pub mod pipeline;
pub mod prefix;
pub mod session;
