//! Reporting for the bird-or-forest pipeline: repository-root
//! resolution, metrics sinks, and confusion-matrix artifacts.

pub mod confusion;
pub mod repo_root;
pub mod sink;

pub use confusion::save_confusion_matrix;
pub use repo_root::resolve_repo_root;
pub use sink::MetricsSink;
