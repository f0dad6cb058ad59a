use super::Backend;
use crate::{Error, Process, Region, Result};
use std::iter;

/// A backend for targets without any mapping source.
///
/// Every enumeration fails with [`Error::PlatformNotSupported`] without
/// performing any I/O.
#[derive(Copy, Clone, Debug, Default)]
pub struct UnsupportedBackend;

impl Backend for UnsupportedBackend {
  type Regions = iter::Empty<Result<Region>>;

  fn name(&self) -> &'static str {
    "unsupported"
  }

  fn enumerate(&self, _process: Process) -> Result<Self::Regions> {
    Err(Error::PlatformNotSupported)
  }
}
