use crate::Region;

/// A predicate deciding which regions a backend may emit.
///
/// Installed with [`MemoryParser::set_region_filter`](crate::MemoryParser::set_region_filter),
/// it runs against every candidate region while the base region list is
/// built, before any query-specific narrowing.
///
/// Closures taking a `&Region` implement this trait.
///
/// # Examples
///
/// ```
/// use vmmap::{MemoryParser, Region};
///
/// let mut parser = MemoryParser::new();
/// parser.set_region_filter(|region: &Region| region.len() >= 4096);
/// ```
pub trait RegionFilter: Send + Sync {
  /// Returns whether the region should be included.
  fn include(&self, region: &Region) -> bool;
}

impl<F> RegionFilter for F
where
  F: Fn(&Region) -> bool + Send + Sync,
{
  fn include(&self, region: &Region) -> bool {
    self(region)
  }
}
