// src/profile.rs
use std::fmt;

use crate::disk_formats::{self, FloppyCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryLimits {
    pub max_cylinders: u32,
    pub max_heads: u32,
    pub max_sectors_per_track: u32,
    pub max_total_sectors: u64,
}

impl GeometryLimits {
    /// 1-1024:1-16:1-63, LBA28.
    pub const LEGACY: GeometryLimits = GeometryLimits {
        max_cylinders: 1024,
        max_heads: 16,
        max_sectors_per_track: 63,
        max_total_sectors: 0x0FFF_FFFF,
    };

    /// 1-65536:1-16:1-255, 32-bit sector count.
    pub const CURRENT: GeometryLimits = GeometryLimits {
        max_cylinders: 65536,
        max_heads: 16,
        max_sectors_per_track: 255,
        max_total_sectors: 0xFFFF_FFFF,
    };

    pub fn contains(&self, cylinders: u32, heads: u32, sectors_per_track: u32) -> bool {
        (1..=self.max_cylinders).contains(&cylinders)
            && (1..=self.max_heads).contains(&heads)
            && (1..=self.max_sectors_per_track).contains(&sectors_per_track)
    }
}

impl fmt::Display for GeometryLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "1-{}:1-{}:1-{}",
            self.max_cylinders, self.max_heads, self.max_sectors_per_track
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifyLayout {
    Legacy,
    Current,
}

/// What to do when a derived x:16:63 geometry has too many cylinders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    Fail,
    Clamp,
}

/// How an explicit geometry that disagrees with the file size is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchSeverity {
    Fatal,
    Warn,
}

/// Whether LBA-addressed images still get a validated CHS geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChsDerivation {
    /// Validate or derive CHS for every image, even LBA ones.
    Always,
    /// Only CHS-addressed images get a geometry; LBA images publish 0:0:0.
    WhenChsAddressed,
}

#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub catalog: FloppyCatalog,
    pub limits: GeometryLimits,
    pub layout: IdentifyLayout,
    pub overflow: OverflowPolicy,
    pub mismatch: MismatchSeverity,
    pub chs_derivation: ChsDerivation,
}

impl Profile {
    pub fn current() -> Self {
        Profile {
            catalog: disk_formats::CURRENT,
            limits: GeometryLimits::CURRENT,
            layout: IdentifyLayout::Current,
            overflow: OverflowPolicy::Clamp,
            mismatch: MismatchSeverity::Fatal,
            chs_derivation: ChsDerivation::Always,
        }
    }

    pub fn legacy() -> Self {
        Profile {
            catalog: disk_formats::LEGACY,
            limits: GeometryLimits::LEGACY,
            layout: IdentifyLayout::Legacy,
            overflow: OverflowPolicy::Fail,
            mismatch: MismatchSeverity::Fatal,
            chs_derivation: ChsDerivation::WhenChsAddressed,
        }
    }

    pub fn with_mismatch(mut self, mismatch: MismatchSeverity) -> Self {
        self.mismatch = mismatch;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::current()
    }
}
