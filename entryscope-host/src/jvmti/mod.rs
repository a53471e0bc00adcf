//! JVM Tool Interface adapter

mod callbacks;
mod host;
pub mod sys;

pub use callbacks::install_event_sink;
pub use host::JvmtiHost;
