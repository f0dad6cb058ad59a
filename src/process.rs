use std::fmt;

/// The process whose address space is queried.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Process {
  /// The calling process.
  Current,
  /// Another process (or the calling one), by identifier.
  Id(u32),
}

impl Default for Process {
  fn default() -> Self {
    Process::Current
  }
}

impl fmt::Display for Process {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Process::Current => f.write_str("self"),
      Process::Id(pid) => write!(f, "{}", pid),
    }
  }
}

/// Non-positive identifiers denote the calling process.
impl From<i32> for Process {
  fn from(pid: i32) -> Self {
    if pid <= 0 {
      Process::Current
    } else {
      Process::Id(pid as u32)
    }
  }
}

/// Zero denotes the calling process.
impl From<u32> for Process {
  fn from(pid: u32) -> Self {
    match pid {
      0 => Process::Current,
      pid => Process::Id(pid),
    }
  }
}

impl From<Option<u32>> for Process {
  fn from(pid: Option<u32>) -> Self {
    pid.map_or(Process::Current, Process::from)
  }
}
