use colored::Color;

pub const PRIMARY: Color = Color::BrightCyan;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const MAC_ADDR: Color = Color::Magenta;
pub const SIGNAL_STRONG: Color = Color::BrightGreen;
pub const SIGNAL_WEAK: Color = Color::Red;
