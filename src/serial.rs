// src/serial.rs

/// UART base addresses the BIOS scans, with the digit shown as "COMx".
pub const COM_PORTS: &[(u16, char)] = &[
    (0x3f8, '1'),
    (0x2f8, '2'),
    (0x3e8, '3'),
    (0x2e8, '4'),
    (0x2f0, '5'),
    (0x3e0, '6'),
    (0x2e0, '7'),
    (0x260, '8'),
    (0x368, '9'),
    (0x268, 'A'),
    (0x360, 'B'),
    (0x270, 'C'),
];

/// Line speeds and the short label used in drive names.
pub const BAUD_RATES: &[(u32, &str)] = &[
    (2400, "2400"),
    (4800, "4800"),
    (9600, "9600"),
    (19200, "19.2K"),
    (28800, "28.8K"),
    (38400, "38.4K"),
    (57600, "57.6K"),
    (76800, "76.8K"),
    (115200, "115.2K"),
    (153600, "153.6K"),
    (230400, "230.4K"),
    (460800, "460.8K"),
];

pub fn com_port_mnemonic(port: u16) -> Option<char> {
    COM_PORTS.iter().find(|&&(p, _)| p == port).map(|&(_, c)| c)
}

pub fn baud_display(rate: u32) -> String {
    BAUD_RATES
        .iter()
        .find(|&&(r, _)| r == rate)
        .map(|&(_, label)| label.to_string())
        .unwrap_or_else(|| rate.to_string())
}
