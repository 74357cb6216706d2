use clap::ValueEnum;
use crossterm::style::Color;

pub struct Theme {
    /// Checkerboard backgrounds, indexed by (x + y) parity.
    pub hidden: [Color; 2],
    pub revealed: [Color; 2],
    /// Background for revealed tiles on the frontier of a hidden region.
    pub border: Color,
    pub nums: [Color; 8],
    pub flag: Color,
    pub mine: Color,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeChoice {
    Garden,
    Classic,
    HighContrast,
}

impl ThemeChoice {
    pub fn theme(self) -> Theme {
        match self {
            Self::Garden => Theme {
                hidden: [
                    Color::Rgb { r: 170, g: 214, b: 80 },
                    Color::Rgb { r: 162, g: 208, b: 72 },
                ],
                revealed: [
                    Color::Rgb { r: 228, g: 194, b: 158 },
                    Color::Rgb { r: 215, g: 185, b: 152 },
                ],
                border: Color::Rgb { r: 134, g: 174, b: 58 },
                nums: [
                    Color::Rgb { r: 25, g: 119, b: 211 },
                    Color::Rgb { r: 59, g: 142, b: 63 },
                    Color::Rgb { r: 213, g: 55, b: 52 },
                    Color::Rgb { r: 122, g: 30, b: 162 },
                    Color::Rgb { r: 255, g: 143, b: 0 },
                    Color::Rgb { r: 21, g: 154, b: 164 },
                    Color::Rgb { r: 67, g: 67, b: 67 },
                    Color::Rgb { r: 169, g: 157, b: 147 },
                ],
                flag: Color::Rgb { r: 255, g: 0, b: 0 },
                mine: Color::Rgb { r: 40, g: 40, b: 40 },
            },
            Self::Classic => Theme {
                hidden: [
                    Color::Rgb { r: 200, g: 200, b: 200 },
                    Color::Rgb { r: 192, g: 192, b: 192 },
                ],
                revealed: [
                    Color::Rgb { r: 188, g: 188, b: 188 },
                    Color::Rgb { r: 182, g: 182, b: 182 },
                ],
                border: Color::Rgb { r: 128, g: 128, b: 128 },
                nums: [
                    Color::Rgb { r: 0, g: 0, b: 255 },
                    Color::Rgb { r: 0, g: 128, b: 0 },
                    Color::Rgb { r: 255, g: 0, b: 0 },
                    Color::Rgb { r: 0, g: 0, b: 128 },
                    Color::Rgb { r: 128, g: 0, b: 0 },
                    Color::Rgb { r: 0, g: 128, b: 128 },
                    Color::Rgb { r: 0, g: 0, b: 0 },
                    Color::Rgb { r: 128, g: 128, b: 128 },
                ],
                flag: Color::Rgb { r: 255, g: 0, b: 0 },
                mine: Color::Rgb { r: 0, g: 0, b: 0 },
            },
            Self::HighContrast => Theme {
                hidden: [Color::Black, Color::Rgb { r: 30, g: 30, b: 30 }],
                revealed: [
                    Color::Rgb { r: 70, g: 70, b: 70 },
                    Color::Rgb { r: 60, g: 60, b: 60 },
                ],
                border: Color::Rgb { r: 110, g: 110, b: 110 },
                nums: [
                    Color::Rgb { r: 0, g: 128, b: 255 },
                    Color::Rgb { r: 0, g: 255, b: 0 },
                    Color::Rgb { r: 255, g: 60, b: 60 },
                    Color::Rgb { r: 180, g: 100, b: 255 },
                    Color::Rgb { r: 216, g: 164, b: 32 },
                    Color::Rgb { r: 0, g: 192, b: 192 },
                    Color::Rgb { r: 230, g: 230, b: 192 },
                    Color::Rgb { r: 216, g: 216, b: 216 },
                ],
                flag: Color::Rgb { r: 255, g: 255, b: 0 },
                mine: Color::White,
            },
        }
    }
}

pub struct IconSet {
    pub flag: char,
    pub incorrect_flag: char,
    pub mine: char,
    pub exploded: char,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum IconSetChoice {
    Ascii,
    Unicode,
}

impl IconSetChoice {
    pub fn iconset(self) -> IconSet {
        match self {
            Self::Ascii => IconSet { flag: 'P', incorrect_flag: 'X', mine: '@', exploded: '*' },
            Self::Unicode => IconSet { flag: '⚑', incorrect_flag: '✗', mine: '●', exploded: '✸' },
        }
    }
}
