//! Platform backends.
//!
//! Each backend turns one OS-specific source of mapping data into a sequence
//! of [`Region`]s. The native backend for the build target is exported as
//! [`NativeBackend`]; the others remain available for explicit use.

use crate::{Process, Region, Result};

mod procfs;
mod unsupported;

pub use self::procfs::{ProcfsBackend, ProcfsRegions};
pub use self::unsupported::UnsupportedBackend;

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod macos;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub use self::macos::{MachBackend, MachRegions};

/// The backend used by [`MemoryParser::new`](crate::MemoryParser::new).
#[cfg(any(target_os = "linux", target_os = "android"))]
pub type NativeBackend = ProcfsBackend;

/// The backend used by [`MemoryParser::new`](crate::MemoryParser::new).
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub type NativeBackend = MachBackend;

/// The backend used by [`MemoryParser::new`](crate::MemoryParser::new).
#[cfg(not(any(
  target_os = "linux",
  target_os = "android",
  target_os = "macos",
  target_os = "ios"
)))]
pub type NativeBackend = UnsupportedBackend;

/// Whether a native backend exists for the build target.
pub const SUPPORTED: bool = cfg!(any(
  target_os = "linux",
  target_os = "android",
  target_os = "macos",
  target_os = "ios"
));

/// A source of memory regions for a process.
pub trait Backend {
  /// The regions of one process, in ascending address order.
  ///
  /// After yielding an error the iterator is exhausted.
  type Regions: Iterator<Item = Result<Region>>;

  /// A short name used in diagnostics.
  fn name(&self) -> &'static str;

  /// Starts enumerating the regions of `process`.
  ///
  /// Failure to access the mapping source at all is reported here; failures
  /// after the first region are yielded by the iterator.
  fn enumerate(&self, process: Process) -> Result<Self::Regions>;
}
