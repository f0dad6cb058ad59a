use super::Backend;
use crate::{Error, Process, Region, Result};
use log::{debug, trace};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads regions from `/proc/[pid]/maps`.
///
/// Lines that do not follow the maps grammar are skipped; only failing to
/// access the file (or a read error midway) fails the enumeration.
#[derive(Clone, Debug)]
pub struct ProcfsBackend {
  root: PathBuf,
}

impl ProcfsBackend {
  /// Creates a backend reading from `/proc`.
  pub fn new() -> Self {
    Self::with_root("/proc")
  }

  /// Creates a backend reading from an alternative procfs mount.
  pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
    ProcfsBackend { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Returns the maps file of a process (e.g `/proc/self/maps`).
  pub fn maps_path(&self, process: Process) -> PathBuf {
    self.root.join(process.to_string()).join("maps")
  }

  /// Converts an I/O error on the maps file into the matching error kind.
  fn classify(&self, process: Process, error: io::Error) -> Error {
    match error.kind() {
      io::ErrorKind::NotFound => match process {
        // The process directory vanishes with the process, whereas a missing
        // maps file within an existing directory (or a missing procfs) does not
        // say anything about the process itself.
        Process::Id(pid) if self.root.is_dir() && !self.root.join(pid.to_string()).exists() => {
          Error::ProcessNotFound(pid)
        }
        _ => Error::FileNotFound(self.maps_path(process)),
      },
      io::ErrorKind::PermissionDenied => Error::permission_denied(process, Some(error)),
      _ if is_no_such_process(&error) => {
        Error::ProcessNotFound(match process {
          Process::Current => std::process::id(),
          Process::Id(pid) => pid,
        })
      }
      _ => Error::SystemCall(error),
    }
  }
}

impl Default for ProcfsBackend {
  fn default() -> Self {
    Self::new()
  }
}

impl Backend for ProcfsBackend {
  type Regions = ProcfsRegions;

  fn name(&self) -> &'static str {
    "procfs"
  }

  fn enumerate(&self, process: Process) -> Result<ProcfsRegions> {
    let path = self.maps_path(process);
    debug!("reading {}", path.display());

    let file = File::open(&path).map_err(|error| self.classify(process, error))?;
    Ok(ProcfsRegions {
      lines: Some(BufReader::new(file).split(b'\n')),
      backend: self.clone(),
      process,
    })
  }
}

/// An iterator over the regions listed in a maps file.
pub struct ProcfsRegions {
  lines: Option<io::Split<BufReader<File>>>,
  backend: ProcfsBackend,
  process: Process,
}

impl Iterator for ProcfsRegions {
  type Item = Result<Region>;

  fn next(&mut self) -> Option<Self::Item> {
    let lines = self.lines.as_mut()?;

    while let Some(line) = lines.next() {
      match line {
        Ok(line) => {
          // Pathnames are not required to be valid UTF-8
          let line = String::from_utf8_lossy(&line);

          match Region::parse_maps_line(&line) {
            Some(region) => return Some(Ok(region)),
            None => trace!("skipping malformed maps line: {:?}", line),
          }
        }
        Err(error) => {
          self.lines.take();
          return Some(Err(self.backend.classify(self.process, error)));
        }
      }
    }

    self.lines.take();
    None
  }
}

impl std::iter::FusedIterator for ProcfsRegions {}

#[cfg(unix)]
fn is_no_such_process(error: &io::Error) -> bool {
  error.raw_os_error() == Some(libc::ESRCH)
}

#[cfg(not(unix))]
fn is_no_such_process(_error: &io::Error) -> bool {
  false
}
