// src/lib.rs
pub mod core;
pub mod disk_formats;
pub mod error;
pub mod geometry;
pub mod identify;
pub mod image;
pub mod profile;
pub mod serial;

pub use error::{GeometryError, ImageError};
pub use geometry::{parse_geometry, resolve, Chs, GeometryRecord, GeometryRequest};
pub use identify::{respond_identify, IdentifyBuffer, IdentifyRequest, ProtocolVersion};
pub use image::{AttachOptions, DiskImage, ImageSize};
pub use profile::Profile;
