// src/disk_formats/floppy_5_25inch_ibm.rs

use super::FloppyFormat;

pub const IBM_1_2M: FloppyFormat = FloppyFormat {
    sector_count: 1_228_800 / 512,
    type_code: 2,
    cylinders: 80,
    heads: 2,
    sectors_per_track: 15,
    authoritative: true,
    name: "1.2M 5.25\" HD",
};

pub const IBM_360K: FloppyFormat = FloppyFormat {
    sector_count: 368_640 / 512,
    type_code: 1,
    cylinders: 40,
    heads: 2,
    sectors_per_track: 9,
    authoritative: true,
    name: "360K 5.25\" DD",
};

pub const IBM_320K: FloppyFormat = FloppyFormat {
    sector_count: 327_680 / 512,
    type_code: 0,
    cylinders: 40,
    heads: 2,
    sectors_per_track: 8,
    authoritative: true,
    name: "320K 5.25\" DD",
};

/// Single sided, 9 sectors per track.
pub const IBM_180K: FloppyFormat = FloppyFormat {
    sector_count: 184_320 / 512,
    type_code: 0,
    cylinders: 40,
    heads: 1,
    sectors_per_track: 9,
    authoritative: true,
    name: "180K 5.25\" SS",
};

/// Single sided, 8 sectors per track.
pub const IBM_160K: FloppyFormat = FloppyFormat {
    sector_count: 163_840 / 512,
    type_code: 0,
    cylinders: 40,
    heads: 1,
    sectors_per_track: 8,
    authoritative: true,
    name: "160K 5.25\" SS",
};
