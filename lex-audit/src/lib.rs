pub mod integrity;
pub mod system;
pub mod trail;

pub use integrity::{IntegrityChecker, Violation};
pub use system::ShutdownSignal;
pub use trail::{clear_progress, load_progress, save_progress, ProgressRecord};
