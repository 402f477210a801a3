// src/geometry.rs
use std::fmt;
use std::str::FromStr;

use log::{info, warn};

use crate::error::{GeometryError, GeometryResult};
use crate::profile::{ChsDerivation, MismatchSeverity, OverflowPolicy, Profile};

/// Name used when a path has nothing after its last separator.
pub const FALLBACK_NAME: &str = "SerDrive";

pub const STANDARD_HEADS: u32 = 16;
pub const STANDARD_SECTORS_PER_TRACK: u32 = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Chs {
    pub cylinders: u32,
    pub heads: u32,
    pub sectors_per_track: u32,
}

impl Chs {
    pub const ZERO: Chs = Chs { cylinders: 0, heads: 0, sectors_per_track: 0 };

    pub fn new(cylinders: u32, heads: u32, sectors_per_track: u32) -> Self {
        Chs { cylinders, heads, sectors_per_track }
    }

    /// Saturates at `u64::MAX`, which is past every addressing limit.
    pub fn sectors(&self) -> u64 {
        (self.cylinders as u64 * self.heads as u64).saturating_mul(self.sectors_per_track as u64)
    }
}

impl fmt::Display for Chs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.cylinders, self.heads, self.sectors_per_track)
    }
}

impl FromStr for Chs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_geometry(s).ok_or_else(|| {
            format!("Geometry must be 'cylinders:heads:sectors' (e.g., '1024:16:63' or '1024x16x63'), got '{}'", s)
        })
    }
}

/// Parses `C:H:S` or `CxHxS` (separators may be mixed). Every value must be
/// a positive integer; ranges are not checked here.
pub fn parse_geometry(text: &str) -> Option<Chs> {
    let mut parts = text.splitn(3, |c| matches!(c, ':' | 'x' | 'X'));
    let cylinders = positive(parts.next()?)?;
    let heads = positive(parts.next()?)?;
    let sectors_per_track = positive(parts.next()?)?;
    Some(Chs { cylinders, heads, sectors_per_track })
}

fn positive(part: &str) -> Option<u32> {
    part.trim().parse::<u32>().ok().filter(|&v| v > 0)
}

/// The part of `path` after the last `/`, `\` or `:`.
pub fn short_name(path: &str) -> String {
    let short = path.rsplit(&['/', '\\', ':'][..]).next().unwrap_or_default();
    if short.is_empty() {
        warn!("Can't parse '{}' for short file name, using '{}'", path, FALLBACK_NAME);
        FALLBACK_NAME.to_string()
    } else {
        short.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct GeometryRequest<'a> {
    pub path: &'a str,
    pub total_sectors: u64,
    pub geometry: Option<Chs>,
    pub use_chs: bool,
    pub read_only: bool,
    pub drive_index: u8,
}

impl<'a> GeometryRequest<'a> {
    pub fn new(path: &'a str, total_sectors: u64) -> Self {
        GeometryRequest {
            path,
            total_sectors,
            geometry: None,
            use_chs: false,
            read_only: false,
            drive_index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    total_sectors: u64,
    chs: Chs,
    use_chs: bool,
    floppy_type: Option<u8>,
    display_name: String,
    read_only: bool,
    drive_index: u8,
}

impl GeometryRecord {
    pub fn total_sectors(&self) -> u64 {
        self.total_sectors
    }

    pub fn chs(&self) -> Chs {
        self.chs
    }

    pub fn cylinders(&self) -> u32 {
        self.chs.cylinders
    }

    pub fn heads(&self) -> u32 {
        self.chs.heads
    }

    pub fn sectors_per_track(&self) -> u32 {
        self.chs.sectors_per_track
    }

    pub fn use_chs(&self) -> bool {
        self.use_chs
    }

    pub fn is_floppy(&self) -> bool {
        self.floppy_type.is_some()
    }

    pub fn floppy_type(&self) -> Option<u8> {
        self.floppy_type
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn drive_index(&self) -> u8 {
        self.drive_index
    }

    pub fn size_bytes(&self) -> u64 {
        self.total_sectors * 512
    }

    /// Size as shown to users: MB, or KB below one megabyte.
    pub fn size_label(&self) -> String {
        let mut size = self.total_sectors as f64 / 2048.0;
        let mut unit = 'M';
        if size < 1.0 {
            size *= 1024.0;
            unit = 'K';
        }
        format!("{:.2} {}B", size, unit)
    }

    pub fn summary(&self) -> String {
        let kind = if self.is_floppy() { "Floppy Disk" } else { "Hard Disk" };
        if self.use_chs {
            format!(
                "{}: {} with CHS geometry {}, size {}",
                self.display_name,
                kind,
                self.chs,
                self.size_label()
            )
        } else {
            format!(
                "{}: {} with {} LBA sectors, size {} (CHS geometry {})",
                self.display_name,
                kind,
                self.total_sectors,
                self.size_label(),
                self.chs
            )
        }
    }
}

pub fn resolve(request: &GeometryRequest<'_>, profile: &Profile) -> GeometryResult<GeometryRecord> {
    let display_name = short_name(request.path);
    let name = request.path;
    let mut total_sectors = request.total_sectors;

    if total_sectors == 0 {
        return Err(GeometryError::ZeroSizeImage { name: name.to_string() });
    }
    if total_sectors > profile.limits.max_total_sectors {
        return Err(GeometryError::SizeExceedsAddressingLimit {
            name: name.to_string(),
            sectors: total_sectors,
            limit: profile.limits.max_total_sectors,
        });
    }

    let mut use_chs = request.use_chs;
    let mut explicit = request.geometry.filter(|g| g.cylinders != 0);
    let mut floppy_type = None;

    if let Some(floppy) = profile.catalog.lookup_by_sector_count(total_sectors) {
        debug_assert_eq!(floppy.chs_sectors(), total_sectors, "{}", floppy.name);
        floppy_type = Some(floppy.type_code);
        use_chs = true;
        explicit = Some(Chs::new(floppy.cylinders, floppy.heads, floppy.sectors_per_track));
        total_sectors = floppy.chs_sectors();
    }

    let chs = if use_chs || profile.chs_derivation == ChsDerivation::Always {
        match explicit {
            Some(geometry) => check_explicit(name, geometry, total_sectors, profile)?,
            None => derive_standard(name, total_sectors, profile)?,
        }
    } else {
        Chs::ZERO
    };

    let record = GeometryRecord {
        total_sectors,
        chs,
        use_chs,
        floppy_type,
        display_name,
        read_only: request.read_only,
        drive_index: request.drive_index,
    };
    info!("{}", record.summary());
    Ok(record)
}

fn check_explicit(name: &str, geometry: Chs, total_sectors: u64, profile: &Profile) -> GeometryResult<Chs> {
    let limits = &profile.limits;
    if !limits.contains(geometry.cylinders, geometry.heads, geometry.sectors_per_track) {
        return Err(GeometryError::GeometryOutOfRange {
            name: name.to_string(),
            chs: geometry,
            ranges: limits.to_string(),
        });
    }
    if geometry.sectors() != total_sectors {
        match profile.mismatch {
            MismatchSeverity::Fatal => {
                return Err(GeometryError::GeometrySizeMismatch {
                    name: name.to_string(),
                    chs: geometry,
                    sectors: total_sectors,
                })
            }
            MismatchSeverity::Warn => warn!(
                "'{}': file size of {} sectors does not match geometry {} ({} sectors), using it anyway",
                name,
                total_sectors,
                geometry,
                geometry.sectors()
            ),
        }
    }
    Ok(geometry)
}

// Clamping wins over divisibility; a failing profile reports the divisibility
// problem first.
fn derive_standard(name: &str, total_sectors: u64, profile: &Profile) -> GeometryResult<Chs> {
    let per_cylinder = (STANDARD_HEADS * STANDARD_SECTORS_PER_TRACK) as u64;
    let max_cylinders = profile.limits.max_cylinders;
    let overflows = total_sectors > max_cylinders as u64 * per_cylinder;

    match profile.overflow {
        OverflowPolicy::Clamp if overflows => {
            let limited = Chs::new(max_cylinders, STANDARD_HEADS, STANDARD_SECTORS_PER_TRACK);
            warn!(
                "'{}': image size is greater than derived standard CHS maximum, limiting CHS to {}, consider specifying geometry",
                name, limited
            );
            return Ok(limited);
        }
        _ if total_sectors % per_cylinder != 0 => {
            return Err(GeometryError::GeometryNotStandardDerivable {
                name: name.to_string(),
                sectors: total_sectors,
            });
        }
        OverflowPolicy::Fail if overflows => {
            return Err(GeometryError::GeometryOutOfRange {
                name: name.to_string(),
                chs: Chs::new(
                    u32::try_from(total_sectors / per_cylinder).unwrap_or(u32::MAX),
                    STANDARD_HEADS,
                    STANDARD_SECTORS_PER_TRACK,
                ),
                ranges: profile.limits.to_string(),
            });
        }
        _ => {}
    }

    // Fits in u32: bounded by max_cylinders above.
    let cylinders = (total_sectors / per_cylinder) as u32;
    Ok(Chs::new(cylinders, STANDARD_HEADS, STANDARD_SECTORS_PER_TRACK))
}
