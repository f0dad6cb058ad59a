use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

bitflags::bitflags! {
  /// Access rights and sharing mode of a mapped region.
  ///
  /// The canonical textual form is the four character string found in
  /// `/proc/[pid]/maps` (e.g. `r-xp`), where the last position is `p` for a
  /// private (copy-on-write) mapping and `s` for a shared one.
  ///
  /// Requested permissions are matched as a subset; a region with `r-xp` is
  /// returned when asking for [`Permissions::EXECUTE`] alone.
  ///
  /// # Examples
  ///
  /// ```
  /// use vmmap::Permissions;
  ///
  /// let combine = Permissions::READ | Permissions::EXECUTE | Permissions::PRIVATE;
  /// assert_eq!(combine.to_string(), "r-xp");
  /// assert_eq!(Permissions::from_maps("r-xp"), combine);
  /// ```
  #[derive(Default)]
  pub struct Permissions: u8 {
    /// No access allowed at all (and a shared mapping).
    const NONE = 0;
    /// Read access.
    const READ = 1 << 0;
    /// Write access.
    const WRITE = 1 << 1;
    /// Execute access.
    const EXECUTE = 1 << 2;
    /// Private (copy-on-write) mapping, as opposed to shared.
    const PRIVATE = 1 << 3;
    /// Read and execute shorthand.
    const READ_EXECUTE = Self::READ.bits | Self::EXECUTE.bits;
    /// Read and write shorthand.
    const READ_WRITE = Self::READ.bits | Self::WRITE.bits;
    /// Read, write and execute shorthand.
    const READ_WRITE_EXECUTE = Self::READ.bits | Self::WRITE.bits | Self::EXECUTE.bits;
  }
}

impl Permissions {
  /// Parses permissions from `/proc/[pid]/maps` notation (e.g `r--p`).
  ///
  /// Inputs shorter than four characters yield [`Permissions::NONE`]. Each
  /// position is read independently; anything but the expected character is
  /// treated as unset.
  pub fn from_maps(input: &str) -> Self {
    const MAPPING: [(u8, Permissions); 4] = [
      (b'r', Permissions::READ),
      (b'w', Permissions::WRITE),
      (b'x', Permissions::EXECUTE),
      (b'p', Permissions::PRIVATE),
    ];

    let bytes = input.as_bytes();
    if bytes.len() < MAPPING.len() {
      return Permissions::NONE;
    }

    MAPPING
      .iter()
      .zip(bytes)
      .filter(|((ident, _), byte)| ident == *byte)
      .fold(Permissions::NONE, |acc, ((_, flag), _)| acc | *flag)
  }

  pub fn is_readable(self) -> bool {
    self.contains(Permissions::READ)
  }

  pub fn is_writable(self) -> bool {
    self.contains(Permissions::WRITE)
  }

  pub fn is_executable(self) -> bool {
    self.contains(Permissions::EXECUTE)
  }

  /// Returns whether the mapping is private (copy-on-write).
  pub fn is_private(self) -> bool {
    self.contains(Permissions::PRIVATE)
  }

  /// Returns whether the mapping is shared with other processes.
  pub fn is_shared(self) -> bool {
    !self.is_private()
  }
}

impl fmt::Display for Permissions {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let flag = |set: bool, ident: char| if set { ident } else { '-' };

    write!(
      f,
      "{}{}{}{}",
      flag(self.is_readable(), 'r'),
      flag(self.is_writable(), 'w'),
      flag(self.is_executable(), 'x'),
      if self.is_private() { 'p' } else { 's' },
    )
  }
}

impl FromStr for Permissions {
  type Err = Infallible;

  fn from_str(input: &str) -> Result<Self, Self::Err> {
    Ok(Permissions::from_maps(input))
  }
}
