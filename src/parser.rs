use crate::os::{self, Backend, NativeBackend};
use crate::{ErrorCode, Permissions, Process, Region, RegionFilter, Result};
use log::debug;
use std::fmt;

/// How [`MemoryParser::find_regions_by_path`] compares pathnames.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PathMatch {
  /// The pathname must equal the query.
  Exact,
  /// The pathname must contain the query. Regions with an empty pathname
  /// never match, not even an empty query; pseudo-paths such as `[anon]` do.
  Contains,
}

/// Parses the memory map of a process and searches it.
///
/// Every query performs a full enumeration of the process' regions; nothing
/// is cached between calls. The only state is the optional region filter.
///
/// A parser is `Send + Sync`. Installing a filter requires exclusive access,
/// so a parser shared between threads must be synchronized externally (or
/// each thread can create its own; parsers share no state).
///
/// # Examples
///
/// ```
/// # fn main() -> vmmap::Result<()> {
/// use vmmap::{MemoryParser, Permissions, Process};
///
/// let parser = MemoryParser::new();
/// if MemoryParser::is_platform_supported() {
///   let code = parser.find_regions_by_permissions(Permissions::EXECUTE, Process::Current)?;
///   assert!(code.iter().all(|region| region.is_executable()));
/// }
/// # Ok(())
/// # }
/// ```
pub struct MemoryParser<B = NativeBackend> {
  backend: B,
  filter: Option<Box<dyn RegionFilter>>,
}

impl MemoryParser<NativeBackend> {
  /// Creates a parser using the build target's native backend.
  pub fn new() -> Self {
    Self::with_backend(NativeBackend::default())
  }

  /// Returns whether a native backend exists for the build target.
  ///
  /// This does not perform any I/O.
  pub fn is_platform_supported() -> bool {
    os::SUPPORTED
  }

  /// Returns the human-readable phrase for an error code.
  pub fn error_string(code: ErrorCode) -> &'static str {
    code.as_str()
  }
}

impl Default for MemoryParser<NativeBackend> {
  fn default() -> Self {
    Self::new()
  }
}

impl<B: Backend> MemoryParser<B> {
  /// Creates a parser reading regions from `backend`.
  pub fn with_backend(backend: B) -> Self {
    MemoryParser {
      backend,
      filter: None,
    }
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  /// Installs a filter applied to every region while it is enumerated,
  /// replacing any previous one.
  pub fn set_region_filter<F: RegionFilter + 'static>(&mut self, filter: F) {
    self.filter = Some(Box::new(filter));
  }

  /// Removes the installed filter, if any.
  pub fn clear_region_filter(&mut self) {
    self.filter = None;
  }

  pub fn has_region_filter(&self) -> bool {
    self.filter.is_some()
  }

  /// Returns the regions of a process, in ascending address order.
  ///
  /// # Errors
  ///
  /// - If the mapping source cannot be accessed, the error names the cause
  ///   (e.g. [`ErrorCode::ProcessNotFound`] or [`ErrorCode::PermissionDenied`]).
  /// - If the build target has no backend,
  ///   [`ErrorCode::PlatformNotSupported`] is returned without any I/O.
  pub fn parse_process<P: Into<Process>>(&self, process: P) -> Result<Vec<Region>> {
    self.collect(process.into(), |_| true)
  }

  /// Returns the regions of the calling process.
  pub fn parse_self(&self) -> Result<Vec<Region>> {
    self.parse_process(Process::Current)
  }

  /// Returns the regions that contain `address`.
  ///
  /// An address without any mapping yields an empty list, not an error.
  pub fn find_regions_containing<P: Into<Process>>(
    &self,
    address: usize,
    process: P,
  ) -> Result<Vec<Region>> {
    self.collect(process.into(), |region| region.contains(address))
  }

  /// Returns the regions whose pathname matches `pathname`.
  pub fn find_regions_by_path<P: Into<Process>>(
    &self,
    pathname: &str,
    process: P,
    mode: PathMatch,
  ) -> Result<Vec<Region>> {
    self.collect(process.into(), |region| match mode {
      PathMatch::Exact => region.pathname() == pathname,
      PathMatch::Contains => !region.pathname().is_empty() && region.pathname().contains(pathname),
    })
  }

  /// Returns the regions that have at least the requested permissions.
  ///
  /// Unset flags impose no constraint: asking for [`Permissions::EXECUTE`]
  /// returns both `r-xp` and `rwxs` regions.
  pub fn find_regions_by_permissions<P: Into<Process>>(
    &self,
    requested: Permissions,
    process: P,
  ) -> Result<Vec<Region>> {
    self.collect(process.into(), |region| {
      region.permissions().contains(requested)
    })
  }

  fn collect<F>(&self, process: Process, predicate: F) -> Result<Vec<Region>>
  where
    F: Fn(&Region) -> bool,
  {
    debug!(
      "enumerating regions of process {} with {}",
      process,
      self.backend.name()
    );

    let mut regions = Vec::new();
    for region in self.backend.enumerate(process)? {
      let region = region?;

      // The installed filter shapes the base list; the query narrows it
      let included = self.filter.as_ref().map_or(true, |filter| filter.include(&region));
      if included && predicate(&region) {
        regions.push(region);
      }
    }

    debug!("found {} matching regions in process {}", regions.len(), process);
    Ok(regions)
  }
}

impl<B: fmt::Debug> fmt::Debug for MemoryParser<B> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("MemoryParser")
      .field("backend", &self.backend)
      .field("filter", &self.filter.as_ref().map(|_| "..."))
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::os::{ProcfsBackend, UnsupportedBackend};
  use crate::tests::util::{fake_procfs, FAKE_MAPS, FAKE_PID};
  use tempfile::TempDir;

  fn fake_parser() -> (TempDir, MemoryParser<ProcfsBackend>) {
    let root = fake_procfs(FAKE_MAPS);
    let parser = MemoryParser::with_backend(ProcfsBackend::with_root(root.path()));
    (root, parser)
  }

  #[test]
  fn parse_process_returns_all_regions() -> Result<()> {
    let (_root, parser) = fake_parser();

    assert_eq!(parser.parse_process(FAKE_PID)?.len(), 7);
    assert_eq!(parser.parse_self()?.len(), 7);
    assert_eq!(parser.parse_process(-1)?, parser.parse_self()?);
    Ok(())
  }

  #[test]
  fn parse_errors_are_propagated_by_queries() {
    let (_root, parser) = fake_parser();
    let missing = FAKE_PID + 1;

    let codes = [
      parser.parse_process(missing).err().map(|e| e.code()),
      parser.find_regions_containing(0x400000, missing).err().map(|e| e.code()),
      parser
        .find_regions_by_path("", missing, PathMatch::Contains)
        .err()
        .map(|e| e.code()),
      parser
        .find_regions_by_permissions(Permissions::READ, missing)
        .err()
        .map(|e| e.code()),
    ];

    for code in &codes {
      assert_eq!(*code, Some(ErrorCode::ProcessNotFound));
    }
  }

  #[test]
  fn find_regions_containing_is_subset_of_parse() -> Result<()> {
    let (_root, parser) = fake_parser();
    let all = parser.parse_self()?;

    for &address in &[0x400000, 0x400fff, 0x401000, 0x1000500, 0x0, usize::max_value()] {
      let found = parser.find_regions_containing(address, Process::Current)?;

      assert!(found.iter().all(|region| region.contains(address)));
      assert!(found.iter().all(|region| all.contains(region)));
      assert_eq!(
        found.len(),
        all.iter().filter(|region| region.contains(address)).count()
      );
    }

    let found = parser.find_regions_containing(0x400800, Process::Current)?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].pathname(), "/usr/bin/true");

    // The end address is exclusive and falls into a gap
    assert!(parser.find_regions_containing(0x401000, Process::Current)?.is_empty());
    Ok(())
  }

  #[test]
  fn find_regions_by_path_matches_exactly_or_partially() -> Result<()> {
    let (_root, parser) = fake_parser();

    let exact = parser.find_regions_by_path("/usr/bin/true", FAKE_PID, PathMatch::Exact)?;
    assert_eq!(exact.len(), 2);

    let none = parser.find_regions_by_path("/usr/bin", FAKE_PID, PathMatch::Exact)?;
    assert!(none.is_empty());

    let partial = parser.find_regions_by_path("/usr/", FAKE_PID, PathMatch::Contains)?;
    assert_eq!(partial.len(), 3);

    let pseudo = parser.find_regions_by_path("[", FAKE_PID, PathMatch::Contains)?;
    assert_eq!(pseudo.len(), 3);
    Ok(())
  }

  #[test]
  fn empty_path_query_skips_anonymous_regions() -> Result<()> {
    let (_root, parser) = fake_parser();

    let named = parser.find_regions_by_path("", FAKE_PID, PathMatch::Contains)?;
    assert_eq!(named.len(), 6);
    assert!(named.iter().all(|region| !region.pathname().is_empty()));

    let anonymous = parser.find_regions_by_path("", FAKE_PID, PathMatch::Exact)?;
    assert_eq!(anonymous.len(), 1);
    assert!(anonymous[0].is_anonymous());
    Ok(())
  }

  #[test]
  fn empty_path_query_matches_pseudo_paths() -> Result<()> {
    let root = fake_procfs(
      "00400000-00401000 rw-p 00000000 00:00 0 [anon]\n\
       00401000-00402000 rw-p 00000000 00:00 0\n",
    );
    let parser = MemoryParser::with_backend(ProcfsBackend::with_root(root.path()));
    let regions = parser.find_regions_by_path("", Process::Current, PathMatch::Contains)?;

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].pathname(), "[anon]");
    Ok(())
  }

  #[test]
  fn find_regions_by_permissions_matches_requested_subset() -> Result<()> {
    let (_root, parser) = fake_parser();

    let exec = parser.find_regions_by_permissions(Permissions::EXECUTE, FAKE_PID)?;
    assert_eq!(exec.len(), 2);
    assert!(exec.iter().all(|region| region.is_executable()));
    assert!(exec.iter().all(|region| region.permissions().to_string() == "r-xp"));

    // Unrequested flags are not required to be unset
    let any = parser.find_regions_by_permissions(Permissions::NONE, FAKE_PID)?;
    assert_eq!(any.len(), 7);

    let readable = parser.find_regions_by_permissions(Permissions::READ, FAKE_PID)?;
    assert_eq!(readable.len(), 6);

    let private_rw =
      parser.find_regions_by_permissions(Permissions::READ_WRITE | Permissions::PRIVATE, FAKE_PID)?;
    assert_eq!(private_rw.len(), 3);
    Ok(())
  }

  #[test]
  fn executable_query_ignores_other_bits() -> Result<()> {
    let root = fake_procfs(
      "00400000-00401000 r-xp 00000000 08:01 1 /bin/a\n\
       00401000-00402000 rw-p 00000000 08:01 1 /bin/a\n",
    );
    let parser = MemoryParser::with_backend(ProcfsBackend::with_root(root.path()));
    let regions = parser.find_regions_by_permissions(Permissions::EXECUTE, Process::Current)?;

    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].start(), 0x400000);
    Ok(())
  }

  #[test]
  fn region_filter_composes_with_queries() -> Result<()> {
    let (_root, mut parser) = fake_parser();

    parser.set_region_filter(|region: &Region| region.len() >= 0x2000);
    assert!(parser.has_region_filter());

    let large = parser.parse_self()?;
    assert_eq!(large.len(), 4);
    assert!(large.iter().all(|region| region.len() >= 0x2000));

    // Filtered out before the query gets to see it
    assert!(parser.find_regions_containing(0x400800, Process::Current)?.is_empty());

    let writable = parser.find_regions_by_permissions(Permissions::WRITE, Process::Current)?;
    assert_eq!(writable.len(), 2);
    Ok(())
  }

  #[test]
  fn region_filter_is_replaced_and_cleared() -> Result<()> {
    let (_root, mut parser) = fake_parser();

    parser.set_region_filter(|region: &Region| region.is_heap());
    parser.set_region_filter(|region: &Region| region.is_stack());

    let regions = parser.parse_self()?;
    assert_eq!(regions.len(), 1);
    assert!(regions[0].is_stack());

    parser.clear_region_filter();
    assert!(!parser.has_region_filter());
    assert_eq!(parser.parse_self()?.len(), 7);
    Ok(())
  }

  #[test]
  fn struct_filters_are_accepted() -> Result<()> {
    struct Executable;

    impl RegionFilter for Executable {
      fn include(&self, region: &Region) -> bool {
        region.is_executable()
      }
    }

    let (_root, mut parser) = fake_parser();
    parser.set_region_filter(Executable);

    assert_eq!(parser.parse_self()?.len(), 2);
    Ok(())
  }

  #[test]
  fn unsupported_backend_reports_platform() {
    let parser = MemoryParser::with_backend(UnsupportedBackend);

    let error = parser.parse_self().unwrap_err();
    assert_eq!(error.code(), ErrorCode::PlatformNotSupported);
    assert_eq!(
      MemoryParser::error_string(error.code()),
      "Platform not supported"
    );
  }

  #[test]
  fn parser_can_be_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MemoryParser<ProcfsBackend>>();
    assert_send_sync::<MemoryParser>();
  }

  #[test]
  fn platform_support_matches_target() {
    let expected = cfg!(any(
      target_os = "linux",
      target_os = "android",
      target_os = "macos",
      target_os = "ios"
    ));
    assert_eq!(MemoryParser::is_platform_supported(), expected);
  }
}
