//! SSD1309 command set and panel geometry.

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
/// Rows are packed eight-high into pages.
pub const PAGES: usize = HEIGHT / 8;
pub const BUFFER_SIZE: usize = WIDTH * PAGES;

pub const DISPLAY_OFF: u8 = 0xAE;
pub const DISPLAY_ON: u8 = 0xAF;
pub const SET_CONTRAST: u8 = 0x81;
pub const ENTIRE_DISPLAY_RESUME: u8 = 0xA4;
pub const NORMAL_DISPLAY: u8 = 0xA6;
pub const MEMORY_MODE: u8 = 0x20;
pub const HORIZONTAL_ADDRESSING: u8 = 0x00;
pub const COLUMN_ADDR: u8 = 0x21;
pub const PAGE_ADDR: u8 = 0x22;
pub const SEG_REMAP: u8 = 0xA1;
pub const COM_SCAN_DEC: u8 = 0xC8;
pub const SET_MULTIPLEX: u8 = 0xA8;
pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
pub const SET_START_LINE: u8 = 0x40;
pub const SET_CLOCK_DIV: u8 = 0xD5;
pub const SET_PRECHARGE: u8 = 0xD9;
pub const SET_COM_PINS: u8 = 0xDA;
pub const SET_VCOM_DESELECT: u8 = 0xDB;

/// Power-on initialization for a 128x64 panel with external VCC.
pub const INIT_SEQUENCE: &[u8] = &[
    DISPLAY_OFF,
    SET_CLOCK_DIV,
    0x80,
    SET_MULTIPLEX,
    0x3F,
    SET_DISPLAY_OFFSET,
    0x00,
    SET_START_LINE,
    MEMORY_MODE,
    HORIZONTAL_ADDRESSING,
    SEG_REMAP,
    COM_SCAN_DEC,
    SET_COM_PINS,
    0x12,
    SET_CONTRAST,
    0x6F,
    SET_PRECHARGE,
    0x22,
    SET_VCOM_DESELECT,
    0x34,
    ENTIRE_DISPLAY_RESUME,
    NORMAL_DISPLAY,
    DISPLAY_ON,
];

/// Addressing window covering the full panel, issued before each flush.
pub const FULL_WINDOW: [u8; 6] = [
    COLUMN_ADDR,
    0,
    (WIDTH - 1) as u8,
    PAGE_ADDR,
    0,
    (PAGES - 1) as u8,
];

/// Contrast command pair for runtime brightness changes.
pub const fn contrast_packet(level: u8) -> [u8; 2] {
    [SET_CONTRAST, level]
}
