// src/identify.rs
use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use crate::geometry::GeometryRecord;
use crate::profile::IdentifyLayout;
use crate::serial;

pub const IDENTIFY_WORDS: usize = 256;
pub const IDENTIFY_BYTES: usize = IDENTIFY_WORDS * 2;

pub const WORD_GENERAL_CONFIG: usize = 0;
pub const WORD_CYLINDERS: usize = 1;
pub const WORD_HEADS: usize = 3;
pub const WORD_SECTORS_PER_TRACK: usize = 6;
pub const WORD_SERIAL: usize = 10;
pub const SERIAL_LEN: usize = 20;
pub const WORD_FIRMWARE: usize = 23;
pub const FIRMWARE_LEN: usize = 8;
pub const WORD_MODEL: usize = 27;
pub const MODEL_LEN: usize = 40;
/// The BIOS copies at most this many model characters.
pub const MODEL_CHARS: usize = 30;
pub const WORD_CAPABILITIES: usize = 49;
pub const WORD_LBA_SECTORS: usize = 60;

// Vendor specific words.
pub const WORD_SERVER_VERSION: usize = 157;
pub const WORD_DRIVE_FLAGS: usize = 158;
pub const WORD_PORT_AND_BAUD: usize = 159;

pub const GENERAL_CONFIG_FIXED: u16 = 0x0040;
pub const CAPABILITIES_LBA: u16 = 0x0200;

// Drive flags are stored one bit to the right of where the driver uses them.
pub const DRIVE_FLAGS_PRESENT: u16 = 0x02;
pub const DRIVE_FLAGS_FLOPPY: u16 = 0x88;
pub const DRIVE_FLAGS_FLOPPY_TYPE_SHIFT: u16 = 4;

pub const LEGACY_FLOPPY_FLAG: u16 = 0x10;
pub const LEGACY_FLOPPY_TYPE_SHIFT: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProtocolVersion {
    pub fn packed(&self) -> u16 {
        (self.major as u16) << 8 | self.minor as u16
    }
}

pub const PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion { major: 2, minor: 0 };

#[derive(Debug, Clone)]
pub struct IdentifyRequest<'a> {
    /// The BIOS is scanning for drives: put the connection into the model name.
    pub scan: bool,
    pub port: Option<u16>,
    pub baud_display: &'a str,
    /// Returned untouched in word 159.
    pub echo_port_and_baud: u16,
    pub protocol_version: ProtocolVersion,
}

impl Default for IdentifyRequest<'_> {
    fn default() -> Self {
        IdentifyRequest {
            scan: false,
            port: None,
            baud_display: "9600",
            echo_port_and_baud: 0,
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct IdentifyBuffer([u8; IDENTIFY_BYTES]);

impl IdentifyBuffer {
    pub fn new() -> Self {
        IdentifyBuffer([0; IDENTIFY_BYTES])
    }

    pub fn encode(record: &GeometryRecord, request: &IdentifyRequest<'_>, layout: IdentifyLayout) -> Self {
        let mut buffer = IdentifyBuffer::new();
        respond_identify(record, request, layout, &mut buffer);
        buffer
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFY_BYTES] {
        &self.0
    }

    pub fn word(&self, index: usize) -> u16 {
        LittleEndian::read_u16(&self.0[index * 2..])
    }

    pub fn set_word(&mut self, index: usize, value: u16) {
        LittleEndian::write_u16(&mut self.0[index * 2..], value);
    }

    pub fn words(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.chunks_exact(2).map(LittleEndian::read_u16)
    }

    pub fn string_field(&self, word: usize, len: usize) -> String {
        let mut bytes = self.0[word * 2..word * 2 + len].to_vec();
        swap_pairs(&mut bytes);
        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn model(&self) -> String {
        self.string_field(WORD_MODEL, MODEL_LEN)
    }

    fn clear(&mut self) {
        self.0.fill(0);
    }

    /// Writes `text` (cut to `len` bytes) at `word` and byte-swaps the field.
    fn put_string(&mut self, word: usize, len: usize, text: &str) {
        let field = &mut self.0[word * 2..word * 2 + len];
        let n = text.len().min(len);
        field[..n].copy_from_slice(&text.as_bytes()[..n]);
        swap_pairs(field);
    }
}

impl Default for IdentifyBuffer {
    fn default() -> Self {
        IdentifyBuffer::new()
    }
}

impl std::fmt::Debug for IdentifyBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifyBuffer")
            .field("model", &self.model())
            .field("cylinders", &self.word(WORD_CYLINDERS))
            .field("heads", &self.word(WORD_HEADS))
            .field("sectors_per_track", &self.word(WORD_SECTORS_PER_TRACK))
            .finish()
    }
}

pub fn swap_pairs(bytes: &mut [u8]) {
    for pair in bytes.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

/// Renders `record` into `out` for one identify request.
pub fn respond_identify(
    record: &GeometryRecord,
    request: &IdentifyRequest<'_>,
    layout: IdentifyLayout,
    out: &mut IdentifyBuffer,
) {
    out.clear();

    let model = model_string(record.display_name(), request, layout);
    debug!("identify drive {}: model '{}'", record.drive_index(), model);
    out.put_string(WORD_MODEL, MODEL_LEN, &model);

    match layout {
        IdentifyLayout::Current => {
            out.put_string(WORD_SERIAL, SERIAL_LEN, "SerialDrive ");
            let firmware = format!(
                "{}.{} ",
                request.protocol_version.major, request.protocol_version.minor
            );
            out.put_string(WORD_FIRMWARE, FIRMWARE_LEN, &firmware);
        }
        IdentifyLayout::Legacy => {
            out.put_string(WORD_SERIAL, SERIAL_LEN, "serial");
            out.put_string(WORD_FIRMWARE, FIRMWARE_LEN, "firmw");
        }
    }

    out.set_word(WORD_CYLINDERS, saturate(record.cylinders() as u64));
    out.set_word(WORD_HEADS, saturate(record.heads() as u64));
    out.set_word(WORD_SECTORS_PER_TRACK, saturate(record.sectors_per_track() as u64));

    if !record.use_chs() {
        let sectors = u32::try_from(record.total_sectors()).unwrap_or(u32::MAX);
        out.set_word(WORD_CAPABILITIES, CAPABILITIES_LBA);
        out.set_word(WORD_LBA_SECTORS, sectors as u16);
        out.set_word(WORD_LBA_SECTORS + 1, (sectors >> 16) as u16);
    }

    match layout {
        IdentifyLayout::Current => {
            out.set_word(WORD_PORT_AND_BAUD, request.echo_port_and_baud);
            out.set_word(WORD_SERVER_VERSION, request.protocol_version.packed());
            let mut flags = DRIVE_FLAGS_PRESENT;
            if let Some(floppy_type) = record.floppy_type() {
                flags |= DRIVE_FLAGS_FLOPPY | (floppy_type as u16) << DRIVE_FLAGS_FLOPPY_TYPE_SHIFT;
            }
            out.set_word(WORD_DRIVE_FLAGS, flags);
        }
        IdentifyLayout::Legacy => {
            if let Some(floppy_type) = record.floppy_type() {
                out.set_word(
                    WORD_DRIVE_FLAGS,
                    LEGACY_FLOPPY_FLAG | (floppy_type as u16) << LEGACY_FLOPPY_TYPE_SHIFT,
                );
            }
        }
    }

    // Every drive looks like a fixed disk to the bulk of the BIOS.
    out.set_word(WORD_GENERAL_CONFIG, GENERAL_CONFIG_FIXED);
}

fn saturate(value: u64) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Builds the model name, with the connection appended while scanning.
pub fn model_string(display_name: &str, request: &IdentifyRequest<'_>, layout: IdentifyLayout) -> String {
    let name: String = display_name
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect();
    let com = request.port.and_then(serial::com_port_mnemonic);
    let baud = request.baud_display;

    match layout {
        IdentifyLayout::Current => {
            let suffix = match (request.scan, com) {
                (false, _) => String::new(),
                (true, Some(c)) => format!(" (COM{}/{})", c, baud),
                (true, None) => format!(" ({} baud)", baud),
            };
            let room = MODEL_CHARS.saturating_sub(suffix.len());
            format!("{}{} ", prefix(&name, room), suffix)
        }
        IdentifyLayout::Legacy => match (request.scan, com) {
            (false, _) => prefix(&name, MODEL_CHARS).to_string(),
            (true, Some(c)) => format!("{} (COM{}/{})", prefix(&name, 15), c, baud),
            (true, None) => format!("{} ({} baud)", prefix(&name, 25), baud),
        },
    }
}

// `name` is ASCII, so any byte index is a char boundary.
fn prefix(name: &str, max: usize) -> &str {
    &name[..name.len().min(max)]
}
