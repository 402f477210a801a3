// src/error.rs
use thiserror::Error;

use crate::geometry::Chs;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("'{name}', image size zero?")]
    ZeroSizeImage { name: String },

    #[error("'{name}', image size of {sectors} sectors is larger than the addressable maximum of {limit} sectors")]
    SizeExceedsAddressingLimit { name: String, sectors: u64, limit: u64 },

    #[error("'{name}', parts of the CHS geometry ({chs}) are out of the range ({ranges})")]
    GeometryOutOfRange { name: String, chs: Chs, ranges: String },

    #[error("'{name}', file size of {sectors} sectors does not match geometry {chs}")]
    GeometrySizeMismatch { name: String, chs: Chs, sectors: u64 },

    #[error("'{name}', file size of {sectors} sectors does not match standard CHS geometry (x:16:63), please specify geometry explicitly")]
    GeometryNotStandardDerivable { name: String, sectors: u64 },

    #[error("no known floppy format near {0:.2} sectors")]
    UnknownFloppySize(f64),
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GeometryResult<T> = Result<T, GeometryError>;
