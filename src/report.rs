//! Human-readable views over a list of regions.

use crate::Region;
use std::fmt;

const MIB: usize = 1024 * 1024;

/// A tabular rendering of a memory map.
///
/// # Examples
///
/// ```
/// use vmmap::{MapTable, Region};
///
/// let regions: Vec<Region> = vec![
///   "00400000-00401000 r-xp 00000000 08:01 7 /usr/bin/true".parse().unwrap(),
/// ];
///
/// let table = MapTable::new(&regions).to_string();
/// assert!(table.contains("/usr/bin/true"));
/// assert!(table.ends_with("Total regions: 1\n"));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct MapTable<'a> {
  regions: &'a [Region],
  limit: Option<usize>,
}

impl<'a> MapTable<'a> {
  pub fn new(regions: &'a [Region]) -> Self {
    MapTable {
      regions,
      limit: None,
    }
  }

  /// Only renders the first `limit` rows. The total still counts every region.
  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }
}

impl<'a> fmt::Display for MapTable<'a> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(
      f,
      "{:<20}{:<8}{:<12}{:<12}{:<8}{:<12}Pathname",
      "Address Range", "Perms", "Offset", "Device", "Inode", "Size"
    )?;
    writeln!(f, "{}", "-".repeat(80))?;

    let rows = self.limit.unwrap_or(self.regions.len());
    for region in self.regions.iter().take(rows) {
      writeln!(
        f,
        "0x{:08x}-0x{:08x} {:>4} 0x{:08x} {:>8} {:>6} {:>8} {}",
        region.start(),
        region.end(),
        region.permissions(),
        region.offset(),
        region.device(),
        region.inode(),
        region.len(),
        if region.pathname().is_empty() {
          "[anonymous]"
        } else {
          region.pathname()
        },
      )?;
    }

    writeln!(f)?;
    writeln!(f, "Total regions: {}", self.regions.len())
  }
}

/// Aggregate memory usage of a list of regions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
  pub regions: usize,
  pub total_bytes: usize,
  pub executable_bytes: usize,
  pub writable_bytes: usize,
  pub anonymous_bytes: usize,
  pub heap_regions: usize,
  pub stack_regions: usize,
}

impl Summary {
  pub fn new(regions: &[Region]) -> Self {
    regions.iter().collect()
  }
}

impl<'a> std::iter::FromIterator<&'a Region> for Summary {
  fn from_iter<I: IntoIterator<Item = &'a Region>>(iter: I) -> Self {
    iter.into_iter().fold(Summary::default(), |mut summary, region| {
      let size = region.len();
      summary.regions += 1;
      summary.total_bytes += size;

      if region.is_executable() {
        summary.executable_bytes += size;
      }
      if region.is_writable() {
        summary.writable_bytes += size;
      }
      if region.is_anonymous() {
        summary.anonymous_bytes += size;
      }
      if region.is_heap() {
        summary.heap_regions += 1;
      }
      if region.is_stack() {
        summary.stack_regions += 1;
      }
      summary
    })
  }
}

impl fmt::Display for Summary {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(f, "Memory Usage Summary:")?;
    writeln!(f, "  Total regions: {}", self.regions)?;
    writeln!(f, "  Total memory: {} MB", self.total_bytes / MIB)?;
    writeln!(f, "  Executable memory: {} MB", self.executable_bytes / MIB)?;
    writeln!(f, "  Writable memory: {} MB", self.writable_bytes / MIB)?;
    writeln!(f, "  Anonymous memory: {} MB", self.anonymous_bytes / MIB)?;
    writeln!(f, "  Heap regions: {}", self.heap_regions)?;
    writeln!(f, "  Stack regions: {}", self.stack_regions)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tests::util::FAKE_MAPS;

  fn fake_regions() -> Vec<Region> {
    FAKE_MAPS.lines().filter_map(|line| line.parse().ok()).collect()
  }

  #[test]
  fn table_lists_every_region() {
    let regions = fake_regions();
    let table = MapTable::new(&regions).to_string();
    let lines: Vec<_> = table.lines().collect();

    assert!(lines[0].starts_with("Address Range"));
    assert_eq!(lines[1], "-".repeat(80));
    assert_eq!(
      lines[2],
      "0x00400000-0x00401000 r-xp 0x00000000    08:01 123456     4096 /usr/bin/true"
    );
    assert!(lines[8].ends_with("[anonymous]"));
    assert_eq!(lines.last(), Some(&"Total regions: 7"));
  }

  #[test]
  fn table_limit_keeps_total() {
    let regions = fake_regions();
    let table = MapTable::new(&regions).limit(2).to_string();

    assert_eq!(table.lines().filter(|line| line.starts_with("0x")).count(), 2);
    assert!(table.ends_with("Total regions: 7\n"));
  }

  #[test]
  fn summary_aggregates_usage() {
    let summary = Summary::new(&fake_regions());

    assert_eq!(summary.regions, 7);
    assert_eq!(summary.total_bytes, 0x1000 * 3 + 0x21000 * 2 + 0x2000 * 2);
    assert_eq!(summary.executable_bytes, 0x1000 + 0x2000);
    assert_eq!(summary.writable_bytes, 0x1000 + 0x21000 * 2);
    assert_eq!(summary.anonymous_bytes, 0x1000);
    assert_eq!(summary.heap_regions, 1);
    assert_eq!(summary.stack_regions, 1);
  }

  #[test]
  fn summary_of_nothing_is_empty() {
    let summary = Summary::new(&[]);

    assert_eq!(summary, Summary::default());
    assert!(summary.to_string().contains("Total regions: 0"));
  }
}
