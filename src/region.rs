use crate::{Error, Permissions, Result};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// A descriptor for a mapped memory region.
///
/// Regions are plain values created by a backend on every query; they are
/// never cached and hold no reference to the process they were read from.
///
/// Not every platform exposes provenance. Regions from the macOS backend have
/// an empty pathname, a `00:00` device and a zero inode, so an empty pathname
/// means "anonymous" rather than "unknown" only where the backend provides
/// pathnames at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
  start: usize,
  end: usize,
  permissions: Permissions,
  offset: u64,
  device: String,
  inode: u64,
  pathname: String,
  line: Option<String>,
}

impl Region {
  /// The device identifier reported when the platform does not expose one.
  pub const UNKNOWN_DEVICE: &'static str = "00:00";

  /// Creates a region, storing every attribute verbatim.
  ///
  /// The range is half-open; callers are responsible for `start <= end`.
  /// An inverted range is kept as given and has a length of zero.
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    start: usize,
    end: usize,
    permissions: Permissions,
    offset: u64,
    device: impl Into<String>,
    inode: u64,
    pathname: impl Into<String>,
    line: Option<String>,
  ) -> Self {
    Region {
      start,
      end,
      permissions,
      offset,
      device: device.into(),
      inode,
      pathname: pathname.into(),
      line,
    }
  }

  /// Returns the (inclusive) start address of the region.
  pub fn start(&self) -> usize {
    self.start
  }

  /// Returns the (exclusive) end address of the region.
  pub fn end(&self) -> usize {
    self.end
  }

  /// Returns a range spanning the region's address space.
  pub fn as_range(&self) -> Range<usize> {
    self.start..self.end
  }

  /// Returns the size of the region in bytes.
  pub fn len(&self) -> usize {
    self.end.saturating_sub(self.start)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns whether `address` lies within `[start, end)`.
  ///
  /// # Examples
  ///
  /// ```
  /// use vmmap::{Permissions, Region};
  ///
  /// let region = Region::new(0x1000, 0x2000, Permissions::READ, 0, "00:00", 0, "", None);
  ///
  /// assert!(region.contains(0x1000));
  /// assert!(!region.contains(0x2000));
  /// ```
  pub fn contains(&self, address: usize) -> bool {
    self.start <= address && address < self.end
  }

  pub fn permissions(&self) -> Permissions {
    self.permissions
  }

  /// Returns the offset into the backing object, in bytes.
  pub fn offset(&self) -> u64 {
    self.offset
  }

  /// Returns the device identifier, in `major:minor` notation.
  pub fn device(&self) -> &str {
    &self.device
  }

  /// Returns the inode of the backing file (zero when there is none).
  pub fn inode(&self) -> u64 {
    self.inode
  }

  /// Returns the backing pathname, or a pseudo-path such as `[heap]`.
  pub fn pathname(&self) -> &str {
    &self.pathname
  }

  /// Returns the raw line the region was parsed from, if any.
  pub fn line(&self) -> Option<&str> {
    self.line.as_deref()
  }

  pub fn is_anonymous(&self) -> bool {
    self.pathname.is_empty() || self.pathname == "[anon]"
  }

  pub fn is_stack(&self) -> bool {
    self.pathname == "[stack]"
  }

  pub fn is_heap(&self) -> bool {
    self.pathname == "[heap]"
  }

  pub fn is_vdso(&self) -> bool {
    self.pathname == "[vdso]"
  }

  pub fn is_readable(&self) -> bool {
    self.permissions.is_readable()
  }

  pub fn is_writable(&self) -> bool {
    self.permissions.is_writable()
  }

  pub fn is_executable(&self) -> bool {
    self.permissions.is_executable()
  }

  pub fn is_private(&self) -> bool {
    self.permissions.is_private()
  }

  pub fn is_shared(&self) -> bool {
    self.permissions.is_shared()
  }

  /// Parses a region from /proc/[pid]/maps (i.e a single line).
  ///
  /// Returns `None` for lines with fewer than five fields, an address token
  /// without a `-`, or any numeric field that fails to parse.
  pub(crate) fn parse_maps_line(line: &str) -> Option<Region> {
    let mut rest = line;
    let mut field = || {
      let trimmed = rest.trim_start();
      let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
      let (token, tail) = trimmed.split_at(end);
      rest = tail;
      Some(token).filter(|token| !token.is_empty())
    };

    let range = field()?;
    let permissions = field()?;
    let offset = field()?;
    let device = field()?;
    let inode = field()?;
    let pathname = rest.trim_start();

    let (start, end) = split_once(range, '-')?;
    let start = usize::from_str_radix(start, 16).ok()?;
    let end = usize::from_str_radix(end, 16).ok()?;
    let offset = u64::from_str_radix(offset, 16).ok()?;
    let inode = inode.parse::<u64>().ok()?;

    if start > end {
      return None;
    }

    Some(Region::new(
      start,
      end,
      Permissions::from_maps(permissions),
      offset,
      device,
      inode,
      pathname,
      Some(line.to_owned()),
    ))
  }
}

fn split_once(input: &str, delimiter: char) -> Option<(&str, &str)> {
  let index = input.find(delimiter)?;
  Some((&input[..index], &input[index + delimiter.len_utf8()..]))
}

impl fmt::Display for Region {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "{:#x}-{:#x} {} {:#010x} {} {} {}",
      self.start,
      self.end,
      self.permissions,
      self.offset,
      self.device,
      self.inode,
      if self.pathname.is_empty() {
        "[anonymous]"
      } else {
        self.pathname.as_str()
      },
    )
  }
}

impl FromStr for Region {
  type Err = Error;

  /// Strictly parses a single `/proc/[pid]/maps` line.
  ///
  /// Unlike a full maps read, which silently skips malformed lines, this
  /// reports them as [`Error::Parse`].
  fn from_str(line: &str) -> Result<Self> {
    Region::parse_maps_line(line).ok_or_else(|| Error::Parse(line.to_owned()))
  }
}
