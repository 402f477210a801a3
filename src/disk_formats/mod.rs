// src/disk_formats/mod.rs

pub mod floppy_3_5inch_ibm;
pub mod floppy_5_25inch_ibm;

pub use floppy_3_5inch_ibm::{IBM_1_44M, IBM_2_88M, IBM_720K, IBM_DMF};
pub use floppy_5_25inch_ibm::{IBM_160K, IBM_180K, IBM_1_2M, IBM_320K, IBM_360K};

use floppy_3_5inch_ibm::{IBM_1_44M_AS_1_4, IBM_2_88M_AS_2_8, IBM_2_88M_AS_2_9, IBM_720K_ONE_HEAD};

/// One known floppy capacity and the geometry the BIOS expects for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloppyFormat {
    pub sector_count: u64,
    /// BIOS floppy drive type (0 = 360K class .. 6 = 2.88M).
    pub type_code: u8,
    pub cylinders: u32,
    pub heads: u32,
    pub sectors_per_track: u32,
    /// Exact-size lookups only match authoritative entries; the others are
    /// alternate roundings of the same capacity.
    pub authoritative: bool,
    pub name: &'static str,
}

impl FloppyFormat {
    /// Sector count implied by the CHS triple.
    pub fn chs_sectors(&self) -> u64 {
        self.cylinders as u64 * self.heads as u64 * self.sectors_per_track as u64
    }

    /// Total size in bytes for this format.
    pub fn total_size(&self) -> u64 {
        self.chs_sectors() * 512
    }
}

/// An ordered, versioned table of floppy formats.
#[derive(Debug, Clone, Copy)]
pub struct FloppyCatalog {
    pub version: &'static str,
    pub entries: &'static [FloppyFormat],
    /// Approximate lookups accept entries strictly closer than this many sectors.
    pub tolerance: f64,
}

pub const CURRENT: FloppyCatalog = FloppyCatalog {
    version: "current",
    entries: &[
        IBM_2_88M, IBM_DMF, IBM_1_44M, IBM_1_2M, IBM_720K, IBM_360K, IBM_320K, IBM_180K,
        IBM_160K,
    ],
    tolerance: 5.0,
};

pub const LEGACY: FloppyCatalog = FloppyCatalog {
    version: "legacy",
    entries: &[
        IBM_2_88M,
        IBM_2_88M_AS_2_8,
        IBM_2_88M_AS_2_9,
        IBM_1_44M,
        IBM_1_44M_AS_1_4,
        IBM_1_2M,
        IBM_720K_ONE_HEAD,
        IBM_360K,
        IBM_320K,
        IBM_180K,
        IBM_160K,
    ],
    tolerance: 5.0,
};

impl FloppyCatalog {
    /// First authoritative entry whose sector count is exactly `sector_count`.
    pub fn lookup_by_sector_count(&self, sector_count: u64) -> Option<&'static FloppyFormat> {
        self.entries
            .iter()
            .find(|f| f.authoritative && f.sector_count == sector_count)
    }

    /// First entry, authoritative or not, within the catalog tolerance of `sectors`.
    pub fn lookup_by_approximate_size(&self, sectors: f64) -> Option<&'static FloppyFormat> {
        self.entries
            .iter()
            .find(|f| (sectors - f.sector_count as f64).abs() < self.tolerance)
    }

    /// Sectors for a capacity written the way floppies are labelled
    /// ("1.44" megabytes = 1000 KiB units).
    pub fn sectors_for_capacity_mb(mb: f64) -> f64 {
        mb * 2000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_matches_its_chs_product() {
        for catalog in [CURRENT, LEGACY] {
            for entry in catalog.entries.iter().filter(|e| e.authoritative) {
                assert_eq!(
                    entry.sector_count,
                    entry.chs_sectors(),
                    "{} in {} table",
                    entry.name,
                    catalog.version
                );
            }
        }
    }

    #[test]
    fn alternate_spellings_share_geometry_with_their_capacity() {
        for catalog in [CURRENT, LEGACY] {
            for alternate in catalog.entries.iter().filter(|e| !e.authoritative) {
                let sibling = catalog
                    .lookup_by_sector_count(alternate.chs_sectors())
                    .unwrap_or_else(|| panic!("{} has no authoritative entry", alternate.name));
                assert_ne!(alternate.sector_count, sibling.sector_count, "{}", alternate.name);
                assert_eq!(alternate.type_code, sibling.type_code, "{}", alternate.name);
                assert_eq!(
                    (alternate.cylinders, alternate.heads, alternate.sectors_per_track),
                    (sibling.cylinders, sibling.heads, sibling.sectors_per_track),
                    "{}",
                    alternate.name
                );
            }
        }
    }

    #[test]
    fn authoritative_entries_are_found_by_exact_count() {
        for catalog in [CURRENT, LEGACY] {
            for entry in catalog.entries.iter().filter(|e| e.authoritative) {
                assert_eq!(catalog.lookup_by_sector_count(entry.sector_count), Some(entry));
            }
        }
    }

    #[test]
    fn alternate_spellings_are_not_exact_matches() {
        assert!(LEGACY.lookup_by_sector_count(2800).is_none());
        assert!(LEGACY.lookup_by_sector_count(5600).is_none());
        assert!(CURRENT.lookup_by_sector_count(2881).is_none());
    }

    #[test]
    fn approximate_lookup_accepts_alternates() {
        let f = LEGACY
            .lookup_by_approximate_size(FloppyCatalog::sectors_for_capacity_mb(1.4))
            .unwrap();
        assert_eq!(f.sector_count, 2800);
        assert!(!f.authoritative);
        assert_eq!(f.chs_sectors(), 2880);

        let f = CURRENT
            .lookup_by_approximate_size(FloppyCatalog::sectors_for_capacity_mb(1.44))
            .unwrap();
        assert_eq!(*f, IBM_1_44M);
    }

    #[test]
    fn approximate_lookup_window_is_strict() {
        assert!(CURRENT.lookup_by_approximate_size(2884.9).is_some());
        assert!(CURRENT.lookup_by_approximate_size(2885.0).is_none());
        assert!(CURRENT.lookup_by_approximate_size(2875.5).is_some());
        assert!(CURRENT.lookup_by_approximate_size(100_000.0).is_none());
    }

    #[test]
    fn tables_differ_on_720k() {
        assert_eq!(CURRENT.lookup_by_sector_count(1440).unwrap().heads, 2);
        assert_eq!(LEGACY.lookup_by_sector_count(1440).unwrap().heads, 1);
        assert!(LEGACY.lookup_by_sector_count(IBM_DMF.sector_count).is_none());
    }
}
