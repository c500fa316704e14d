//! Session graph state: arena, scope stack, and indexes.

mod context;
mod registry;
mod stack;

pub use context::CodebaseContext;
pub use registry::FrameRegistry;
pub use stack::FrameStack;
