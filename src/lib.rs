//! Inspect the memory mappings of a process.
//!
//! This crate turns a platform's description of a process' address space into
//! a list of [`Region`]s, and searches that list by address, pathname or
//! permissions.
//!
//! - On Linux and Android, regions are read from `/proc/[pid]/maps`.
//! - On macOS and iOS, regions are walked with `mach_vm_region`. The kernel
//!   does not report pathnames, devices or inodes for these regions, so they
//!   are left empty (`""`, `00:00` and `0`).
//! - Elsewhere every query fails with [`ErrorCode::PlatformNotSupported`].
//!
//! Queries never modify memory, and every call reads the mappings anew.
//!
//! # Examples
//!
//! ```
//! # fn main() -> vmmap::Result<()> {
//! use vmmap::{MemoryParser, Process};
//!
//! let parser = MemoryParser::new();
//! let data = [0u8; 16];
//!
//! if MemoryParser::is_platform_supported() {
//!   let regions = parser.find_regions_containing(data.as_ptr() as usize, Process::Current)?;
//!   assert_eq!(regions.len(), 1);
//!   assert!(regions[0].is_writable());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Every error maps onto an [`ErrorCode`]:
//!
//! ```
//! use vmmap::{ErrorCode, MemoryParser, Process};
//!
//! match MemoryParser::new().parse_process(Process::Id(1)) {
//!   Ok(regions) => println!("init has {} regions", regions.len()),
//!   Err(error) => match error.code() {
//!     ErrorCode::PermissionDenied => eprintln!("not allowed: {}", error),
//!     ErrorCode::ProcessNotFound => eprintln!("no such process"),
//!     code => eprintln!("{}: {}", code, error),
//!   },
//! }
//! ```

pub use crate::error::{Error, ErrorCode, Result};
pub use crate::filter::RegionFilter;
pub use crate::os::{Backend, NativeBackend, ProcfsBackend, UnsupportedBackend};
pub use crate::parser::{MemoryParser, PathMatch};
pub use crate::permissions::Permissions;
pub use crate::process::Process;
pub use crate::region::Region;
pub use crate::report::{MapTable, Summary};

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub use crate::os::MachBackend;

mod error;
mod filter;
pub mod os;
mod parser;
mod permissions;
mod process;
mod region;
pub mod report;

/// Returns whether a native backend exists for the build target.
#[inline]
pub fn is_platform_supported() -> bool {
  os::SUPPORTED
}
