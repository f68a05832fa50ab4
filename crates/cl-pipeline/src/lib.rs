// ─── Feature‑Module ───────────────────────────────────────────────────
#[cfg(feature = "metrics")]
mod metrics;
#[cfg(feature = "metrics")]
pub use metrics::{ALLOC_BYTES, ALLOCS, record, summary};

#[cfg(feature = "memtrace")]
mod memtracer;
#[cfg(feature = "memtrace")]
pub use memtracer::{CopyToken, Dir, count as trace_count, flush_csv, start};

// ─── Kern ────────────────────────────────────────────────────────────
pub mod buffer;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod tasks;

pub use buffer::{Access, Completion, GpuBuffer, GpuEventGuard, InFlight, Queued, Ready, State};
pub use config::{BuildOptions, KernelSource};
pub use discovery::{DeviceEntry, Inventory, PlatformEntry};
pub use error::{PipelineError, Result};
pub use pipeline::{ArgSpec, Job, Stage, run};
pub use session::ComputeSession;
