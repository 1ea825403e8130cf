use crate::domain::market_data::Symbol;

/// Value Object - pan/zoom window in **index space**, not wall-clock time.
/// Series for different symbols gap at different points, so mirroring
/// timestamps across viewports would desynchronize bar alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalRange {
    pub from: f64,
    pub to: f64,
}

impl LogicalRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn width(&self) -> f64 {
        self.to - self.from
    }

    pub fn center(&self) -> f64 {
        (self.from + self.to) / 2.0
    }

    /// Same width, recentered on `center`.
    pub fn centered_at(&self, center: f64) -> Self {
        let half = self.width() / 2.0;
        Self { from: center - half, to: center + half }
    }
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn to_hex(&self) -> u32 {
        let r = (self.r * 255.0).round() as u32;
        let g = (self.g * 255.0).round() as u32;
        let b = (self.b * 255.0).round() as u32;
        (r << 16) | (g << 8) | b
    }

    /// CSS hex string for DOM-based bindings.
    pub fn to_css(&self) -> String {
        format!("#{:06x}", self.to_hex())
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

/// Fixed palette for the symbol universe. Deterministic: the same symbol
/// always renders in the same color, in the grid and in the picker.
const PALETTE: &[(&str, u32)] = &[
    ("MOVE", 0xef4444),
    ("GOLD", 0xf59e0b),
    ("SILVER", 0x14b8a6),
    ("WTI", 0xd946ef),
    ("US10Y", 0x22c55e),
    ("VIX", 0x60a5fa),
    ("SPY", 0xf87171),
    ("QQQ", 0xeab308),
];

const FALLBACK_COLOR: u32 = 0xe5e7eb;

/// The fixed universe a picker offers, in display order.
pub fn symbol_universe() -> Vec<Symbol> {
    PALETTE.iter().map(|(name, _)| Symbol::from(*name)).collect()
}

pub fn color_for(symbol: &Symbol) -> Color {
    PALETTE
        .iter()
        .find(|(name, _)| *name == symbol.value())
        .map(|(_, hex)| Color::from_hex(*hex))
        .unwrap_or_else(|| Color::from_hex(FALLBACK_COLOR))
}

/// Value Object - line series styling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: u32,
}

impl LineStyle {
    pub fn for_symbol(symbol: &Symbol) -> Self {
        Self { color: color_for(symbol), width: 2 }
    }
}
