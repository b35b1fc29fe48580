//! The three-stage concurrent pipeline (§4.10): parse → decompose →
//! analyze, each a worker pool fed by one bounded FIFO queue (§5).

pub mod config;
pub mod manager;
pub mod packet;
pub mod queue;
pub mod stages;

pub use config::PipelineConfig;
pub use manager::PipelineManager;
pub use packet::{FunctionTask, Packet, ParsedAstInfo, SourceFileInfo};
pub use queue::BoundedQueue;
pub use stages::FunctionAnalysisResult;
