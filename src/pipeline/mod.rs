//! The frame loop: lock the backbuffer, let every client draw, present.

pub mod clients;
pub mod host;
pub mod lock;
pub mod metrics;

pub use clients::{ClientRegistry, RenderClient};
pub use host::{Host, HostConfig, HostState};
pub use lock::FrameLock;
pub use metrics::FrameMetrics;
