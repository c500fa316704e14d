//! The three-pass parsing pipeline.

mod builder;
pub mod factory;
mod multi_pass;
mod resolver;

pub use builder::GraphBuilder;
pub use factory::FrameFactory;
pub use multi_pass::{MultiPassParser, ParseStatistics};
pub use resolver::SymbolResolver;

pub(crate) use resolver::{extract_base_classes, extract_call_names, extract_field_uses, extract_imports};
