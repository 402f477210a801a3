// src/core.rs
use crate::geometry::GeometryRecord;
use crate::identify::{
    IdentifyBuffer, FIRMWARE_LEN, SERIAL_LEN, WORD_DRIVE_FLAGS, WORD_FIRMWARE, WORD_PORT_AND_BAUD,
    WORD_SERIAL, WORD_SERVER_VERSION,
};

/// Geometry details of an attached image, one fact per line.
pub fn display(record: &GeometryRecord) -> String {
    let mut output = Vec::new();
    output.push(record.summary());
    output.push(format!(
        "Geometry: {} cylinders, {} heads, {} sectors/track, {} total sectors ({} bytes)",
        record.cylinders(),
        record.heads(),
        record.sectors_per_track(),
        record.total_sectors(),
        record.size_bytes()
    ));
    output.push(format!(
        "Addressing: {}",
        if record.use_chs() { "CHS" } else { "LBA" }
    ));
    if let Some(floppy_type) = record.floppy_type() {
        output.push(format!("Floppy type: {}", floppy_type));
    }
    output.push(format!(
        "Drive {}{}",
        record.drive_index(),
        if record.read_only() { ", read-only" } else { "" }
    ));
    output.join("\n")
}

/// The identify block as decoded strings and vendor words, followed by a word
/// dump (eight words per row); `ascii` adds the byte-swapped text of each row.
pub fn dump_identify(buffer: &IdentifyBuffer, ascii: bool) -> String {
    let mut output = Vec::new();
    output.push(format!("Model: '{}'", buffer.model()));
    output.push(format!("Serial: '{}'", buffer.string_field(WORD_SERIAL, SERIAL_LEN)));
    output.push(format!("Firmware: '{}'", buffer.string_field(WORD_FIRMWARE, FIRMWARE_LEN)));
    output.push(format!(
        "Vendor: version {:04X}, flags {:04X}, port/baud {:04X}",
        buffer.word(WORD_SERVER_VERSION),
        buffer.word(WORD_DRIVE_FLAGS),
        buffer.word(WORD_PORT_AND_BAUD)
    ));

    let words: Vec<u16> = buffer.words().collect();
    for (row, chunk) in words.chunks(8).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|w| format!("{:04X}", w)).collect();
        let mut line = format!("{:3}: {}", row * 8, hex.join(" "));
        if ascii {
            let text: String = chunk
                .iter()
                .flat_map(|w| w.to_be_bytes())
                .map(|b| if (32..=126).contains(&b) { b as char } else { '.' })
                .collect();
            line.push_str("  ");
            line.push_str(&text);
        }
        output.push(line);
    }
    output.join("\n")
}
