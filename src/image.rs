// src/image.rs
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::disk_formats::FloppyCatalog;
use crate::error::{GeometryError, ImageError};
use crate::geometry::{self, Chs, GeometryRecord, GeometryRequest};
use crate::identify::{self, IdentifyBuffer, IdentifyRequest};
use crate::profile::Profile;

pub const SECTOR_SIZE: u64 = 512;

/// How the image should be presented once attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachOptions {
    pub geometry: Option<Chs>,
    pub use_chs: bool,
    pub read_only: bool,
    pub drive_index: u8,
}

/// Size of an image to create.
#[derive(Debug, Clone, Copy)]
pub enum ImageSize {
    Sectors(u64),
    Chs(Chs),
    /// Labelled floppy capacity in megabytes, e.g. 1.44.
    FloppyMb(f64),
}

/// One attached backing file and its resolved geometry.
pub struct DiskImage {
    path: PathBuf,
    file: File,
    record: GeometryRecord,
}

impl DiskImage {
    pub fn attach(path: &Path, options: &AttachOptions, profile: &Profile) -> Result<Self, ImageError> {
        let file = OpenOptions::new()
            .read(true)
            .write(!options.read_only)
            .open(path)?;
        let len = file.metadata()?.len();
        if len % SECTOR_SIZE != 0 {
            warn!(
                "'{}': ignoring {} bytes past the last full sector",
                path.display(),
                len % SECTOR_SIZE
            );
        }

        let name = path.to_string_lossy();
        let request = GeometryRequest {
            path: &name,
            total_sectors: len / SECTOR_SIZE,
            geometry: options.geometry,
            use_chs: options.use_chs,
            read_only: options.read_only,
            drive_index: options.drive_index,
        };
        let record = geometry::resolve(&request, profile)?;

        Ok(DiskImage { path: path.to_path_buf(), file, record })
    }

    /// Creates a zero-filled image that must not already exist, then attaches it.
    /// The size is resolved first, so a rejected geometry leaves nothing on disk.
    pub fn create(
        path: &Path,
        size: ImageSize,
        options: &AttachOptions,
        profile: &Profile,
    ) -> Result<Self, ImageError> {
        let (sectors, options) = match size {
            ImageSize::Sectors(sectors) => (sectors, *options),
            ImageSize::Chs(chs) => (
                chs.sectors(),
                AttachOptions { geometry: Some(chs), use_chs: true, ..*options },
            ),
            ImageSize::FloppyMb(mb) => {
                let wanted = FloppyCatalog::sectors_for_capacity_mb(mb);
                let floppy = profile
                    .catalog
                    .lookup_by_approximate_size(wanted)
                    .ok_or(GeometryError::UnknownFloppySize(wanted))?;
                info!("'{}': creating {} floppy", path.display(), floppy.name);
                (floppy.chs_sectors(), *options)
            }
        };

        let name = path.to_string_lossy();
        let request = GeometryRequest {
            path: &name,
            total_sectors: sectors,
            geometry: options.geometry,
            use_chs: options.use_chs,
            read_only: options.read_only,
            drive_index: options.drive_index,
        };
        let record = geometry::resolve(&request, profile)?;

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => ImageError::AlreadyExists(path.display().to_string()),
                _ => ImageError::Io(e),
            })?;
        let sized = file.set_len(record.size_bytes());
        drop(file);

        let attached = sized
            .map_err(ImageError::from)
            .and_then(|()| Self::attach(path, &options, profile));
        if attached.is_err() {
            if let Err(e) = fs::remove_file(path) {
                warn!("'{}': could not remove partly created image: {}", path.display(), e);
            }
        }
        attached
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The open backing file, for the sector storage layer.
    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn record(&self) -> &GeometryRecord {
        &self.record
    }

    pub fn respond_identify(&self, request: &IdentifyRequest<'_>, profile: &Profile, out: &mut IdentifyBuffer) {
        identify::respond_identify(&self.record, request, profile.layout, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk_formats::IBM_1_44M;
    use crate::identify::{WORD_DRIVE_FLAGS, WORD_HEADS};
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn image_of(sectors: u64) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        file.as_file().set_len(sectors * SECTOR_SIZE).unwrap();
        file
    }

    #[test]
    fn attach_counts_sectors() {
        let file = image_of(20160);
        let options = AttachOptions { use_chs: true, drive_index: 1, ..AttachOptions::default() };
        let image = DiskImage::attach(file.path(), &options, &Profile::current()).unwrap();
        assert_eq!(image.record().total_sectors(), 20160);
        assert_eq!(image.record().chs(), Chs::new(20, 16, 63));
        assert_eq!(image.record().drive_index(), 1);
        assert_eq!(image.file().metadata().unwrap().len(), 20160 * SECTOR_SIZE);
    }

    #[test]
    fn partial_trailing_sector_is_ignored() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; 20160 * 512 + 100]).unwrap();
        let image = DiskImage::attach(file.path(), &AttachOptions::default(), &Profile::current()).unwrap();
        assert_eq!(image.record().total_sectors(), 20160);
    }

    #[test]
    fn empty_file_fails_to_attach() {
        let file = NamedTempFile::new().unwrap();
        let err = DiskImage::attach(file.path(), &AttachOptions::default(), &Profile::current())
            .err()
            .unwrap();
        assert!(matches!(err, ImageError::Geometry(GeometryError::ZeroSizeImage { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = DiskImage::attach(&dir.path().join("nope.img"), &AttachOptions::default(), &Profile::current())
            .err()
            .unwrap();
        assert!(matches!(err, ImageError::Io(_)));
    }

    #[test]
    fn read_only_attach() {
        let file = image_of(IBM_1_44M.sector_count);
        let options = AttachOptions { read_only: true, ..AttachOptions::default() };
        let image = DiskImage::attach(file.path(), &options, &Profile::current()).unwrap();
        assert!(image.record().read_only());
        assert!(image.record().is_floppy());
    }

    #[test]
    fn create_with_chs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hd.img");
        let image = DiskImage::create(
            &path,
            ImageSize::Chs(Chs::new(615, 4, 17)),
            &AttachOptions::default(),
            &Profile::current(),
        )
        .unwrap();
        assert!(image.record().use_chs());
        assert_eq!(image.record().chs(), Chs::new(615, 4, 17));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 615 * 4 * 17 * 512);
        assert_eq!(image.path(), path.as_path());
    }

    #[test]
    fn create_floppy_from_alternate_spelling() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fd.img");
        let image = DiskImage::create(&path, ImageSize::FloppyMb(1.4), &AttachOptions::default(), &Profile::legacy())
            .unwrap();
        assert!(image.record().is_floppy());
        assert_eq!(image.record().total_sectors(), 2880);

        let mut buffer = IdentifyBuffer::new();
        image.respond_identify(&IdentifyRequest::default(), &Profile::legacy(), &mut buffer);
        assert_eq!(buffer.word(WORD_HEADS), 2);
        assert_eq!(buffer.word(WORD_DRIVE_FLAGS), 0x10 | 4 << 5);
    }

    #[test]
    fn create_refuses_unknown_floppy_and_existing_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fd.img");
        let err = DiskImage::create(&path, ImageSize::FloppyMb(5.0), &AttachOptions::default(), &Profile::current())
            .err()
            .unwrap();
        assert!(matches!(err, ImageError::Geometry(GeometryError::UnknownFloppySize(_))));
        assert!(!path.exists());

        let existing = image_of(20160);
        let err = DiskImage::create(existing.path(), ImageSize::Sectors(20160), &AttachOptions::default(), &Profile::current())
            .err()
            .unwrap();
        assert!(matches!(err, ImageError::AlreadyExists(_)));
    }

    #[test]
    fn rejected_geometry_leaves_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("odd.img");
        let err = DiskImage::create(&path, ImageSize::Sectors(20161), &AttachOptions::default(), &Profile::current())
            .err()
            .unwrap();
        assert!(matches!(err, ImageError::Geometry(GeometryError::GeometryNotStandardDerivable { .. })));
        assert!(!path.exists());

        let path = dir.path().join("range.img");
        let err = DiskImage::create(
            &path,
            ImageSize::Chs(Chs::new(2000, 16, 63)),
            &AttachOptions::default(),
            &Profile::legacy(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ImageError::Geometry(GeometryError::GeometryOutOfRange { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn oversized_requests_are_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("huge.img");
        let huge = Chs::new(u32::MAX, u32::MAX, u32::MAX);
        for size in [ImageSize::Chs(huge), ImageSize::Sectors(u64::MAX)] {
            let err = DiskImage::create(&path, size, &AttachOptions::default(), &Profile::current())
                .err()
                .unwrap();
            assert!(
                matches!(err, ImageError::Geometry(GeometryError::SizeExceedsAddressingLimit { .. })),
                "{:?}",
                err
            );
            assert!(!path.exists());
        }
    }

    #[test]
    fn create_can_be_retried_after_a_rejected_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hd.img");
        assert!(DiskImage::create(&path, ImageSize::Sectors(20161), &AttachOptions::default(), &Profile::current())
            .is_err());
        let image = DiskImage::create(&path, ImageSize::Sectors(20160), &AttachOptions::default(), &Profile::current())
            .unwrap();
        assert_eq!(image.record().chs(), Chs::new(20, 16, 63));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 20160 * SECTOR_SIZE);
    }

    #[test]
    fn existing_file_is_not_removed_when_create_is_refused() {
        let existing = image_of(20160);
        assert!(DiskImage::create(existing.path(), ImageSize::Sectors(20160), &AttachOptions::default(), &Profile::current())
            .is_err());
        assert_eq!(std::fs::metadata(existing.path()).unwrap().len(), 20160 * SECTOR_SIZE);
    }
}
