// src/disk_formats/floppy_3_5inch_ibm.rs

use super::FloppyFormat;

/// 2.88M Extra Density 3.5-inch IBM/PC floppy.
pub const IBM_2_88M: FloppyFormat = FloppyFormat {
    sector_count: 2_949_120 / 512,
    type_code: 6,
    cylinders: 80,
    heads: 2,
    sectors_per_track: 36,
    authoritative: true,
    name: "2.88M 3.5\" ED",
};

/// 2.88M written as "2.8".
pub const IBM_2_88M_AS_2_8: FloppyFormat = FloppyFormat {
    sector_count: 2_867_200 / 512,
    authoritative: false,
    name: "2.88M 3.5\" ED (2.8)",
    ..IBM_2_88M
};

/// 2.88M written as "2.9".
pub const IBM_2_88M_AS_2_9: FloppyFormat = FloppyFormat {
    sector_count: 2_969_600 / 512,
    authoritative: false,
    name: "2.88M 3.5\" ED (2.9)",
    ..IBM_2_88M
};

/// Microsoft Distribution Media Format, 21 sectors per track on 1.44M media.
pub const IBM_DMF: FloppyFormat = FloppyFormat {
    sector_count: 1_720_320 / 512,
    type_code: 4,
    cylinders: 80,
    heads: 2,
    sectors_per_track: 21,
    authoritative: true,
    name: "1.68M 3.5\" DMF",
};

/// 1.44M High Density 3.5-inch IBM/PC floppy.
pub const IBM_1_44M: FloppyFormat = FloppyFormat {
    sector_count: 1_474_560 / 512,
    type_code: 4,
    cylinders: 80,
    heads: 2,
    sectors_per_track: 18,
    authoritative: true,
    name: "1.44M 3.5\" HD",
};

/// 1.44M written as "1.4".
pub const IBM_1_44M_AS_1_4: FloppyFormat = FloppyFormat {
    sector_count: 1_433_600 / 512,
    authoritative: false,
    name: "1.44M 3.5\" HD (1.4)",
    ..IBM_1_44M
};

/// 720K Double Density 3.5-inch IBM/PC floppy.
pub const IBM_720K: FloppyFormat = FloppyFormat {
    sector_count: 737_280 / 512,
    type_code: 3,
    cylinders: 80,
    heads: 2,
    sectors_per_track: 9,
    authoritative: true,
    name: "720K 3.5\" DD",
};

/// 720K as the first server releases described it (one head, 18 sectors).
pub const IBM_720K_ONE_HEAD: FloppyFormat = FloppyFormat {
    heads: 1,
    sectors_per_track: 18,
    ..IBM_720K
};
