//! Color tokens and the two output dialects they are emitted into.
//!
//! A `${token}` directive resolves to a [`ColorSpec`]: a named slot from the
//! active [`Palette`], a literal `#rrggbb` (or bold `!#rrggbb`) hex color, or a
//! raw SGR escape such as `\e[1;32m`.

use crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor};
use log::warn;
use regex::Regex;
use std::sync::LazyLock;

/// Target presentation format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Raw ANSI escape bytes.
    #[default]
    Terminal,
    /// Inline `<span>` tags for a markup-aware GUI renderer.
    Markup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Normal,
    Bold,
}

impl Weight {
    pub fn as_str(self) -> &'static str {
        match self {
            Weight::Normal => "normal",
            Weight::Bold => "bold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ground {
    Fore,
    Back,
}

impl Ground {
    pub fn attribute(self) -> &'static str {
        match self {
            Ground::Fore => "fgcolor",
            Ground::Back => "bgcolor",
        }
    }
}

/// A base color decomposed from an SGR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SgrColor {
    pub name: &'static str,
    pub weight: Weight,
    pub ground: Ground,
}

use Ground::{Back, Fore};
use Weight::{Bold, Normal};

#[rustfmt::skip]
static SGR_TABLE: &[(u8, &str, Weight, Ground)] = &[
    (30, "black", Normal, Fore),   (90, "black", Bold, Fore),
    (31, "red", Normal, Fore),     (91, "red", Bold, Fore),
    (32, "green", Normal, Fore),   (92, "green", Bold, Fore),
    (33, "yellow", Normal, Fore),  (93, "yellow", Bold, Fore),
    (34, "blue", Normal, Fore),    (94, "blue", Bold, Fore),
    (35, "magenta", Normal, Fore), (95, "magenta", Bold, Fore),
    (36, "cyan", Normal, Fore),    (96, "cyan", Bold, Fore),
    (37, "white", Normal, Fore),   (97, "white", Bold, Fore),
    (40, "black", Normal, Back),   (100, "black", Bold, Back),
    (41, "red", Normal, Back),     (101, "red", Bold, Back),
    (42, "green", Normal, Back),   (102, "green", Bold, Back),
    (43, "yellow", Normal, Back),  (103, "yellow", Bold, Back),
    (44, "blue", Normal, Back),    (104, "blue", Bold, Back),
    (45, "magenta", Normal, Back), (105, "magenta", Bold, Back),
    (46, "cyan", Normal, Back),    (106, "cyan", Bold, Back),
    (47, "white", Normal, Back),   (107, "white", Bold, Back),
];

pub fn sgr_color(code: u8) -> Option<SgrColor> {
    SGR_TABLE
        .iter()
        .find(|(c, ..)| *c == code)
        .map(|&(_, name, weight, ground)| SgrColor { name, weight, ground })
}

/// Decomposes SGR parameters like `1;32` or `44`. A leading `1` makes the
/// color bold; the last parameter picks the table entry.
pub fn decompose_sgr(params: &str) -> Option<SgrColor> {
    let parts: Vec<&str> = params.split(';').collect();
    let code: u8 = parts.last()?.parse().ok()?;
    let mut color = sgr_color(code)?;
    if parts.len() > 1 && parts[0] == "1" {
        color.weight = Weight::Bold;
    }
    Some(color)
}

static ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\\e|\\033|\\x1b|\x1b)\[([0-9;]*)m$").expect("escape pattern is valid")
});

/// What a color token resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpec {
    Hex { color: Color, bold: bool },
    Sgr { params: String },
}

impl ColorSpec {
    /// Parses a slot value or literal token.
    pub fn parse(value: &str) -> Option<Self> {
        if let Some(hex) = value.strip_prefix('!') {
            return parse_hex_color(hex).map(|color| ColorSpec::Hex { color, bold: true });
        }
        if value.starts_with('#') {
            return parse_hex_color(value).map(|color| ColorSpec::Hex { color, bold: false });
        }
        ESCAPE_RE.captures(value).map(|caps| ColorSpec::Sgr {
            params: caps[1].to_string(),
        })
    }

    /// Control text that starts this color in `dialect`.
    pub fn open(&self, dialect: Dialect) -> Option<String> {
        match (dialect, self) {
            (Dialect::Terminal, ColorSpec::Hex { color, bold }) => {
                let fg = SetForegroundColor(*color);
                Some(if *bold {
                    format!("{}{}", SetAttribute(Attribute::Bold), fg)
                } else {
                    fg.to_string()
                })
            }
            (Dialect::Terminal, ColorSpec::Sgr { params }) => Some(format!("\x1b[{params}m")),
            (Dialect::Markup, ColorSpec::Hex { color, bold }) => {
                let Color::Rgb { r, g, b } = color else {
                    return None;
                };
                let weight = if *bold { Weight::Bold } else { Weight::Normal };
                Some(format!(
                    "<span fgcolor='#{r:02x}{g:02x}{b:02x}' weight='{}'>",
                    weight.as_str()
                ))
            }
            (Dialect::Markup, ColorSpec::Sgr { params }) => {
                let sgr = decompose_sgr(params)?;
                Some(format!(
                    "<span {}='{}' weight='{}'>",
                    sgr.ground.attribute(),
                    sgr.name,
                    sgr.weight.as_str()
                ))
            }
        }
    }
}

/// The terminal full-reset sequence.
pub fn reset_sequence() -> String {
    ResetColor.to_string()
}

pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() == 6 {
        if let Ok(rgb) = u32::from_str_radix(hex, 16) {
            let r = ((rgb >> 16) & 0xFF) as u8;
            let g = ((rgb >> 8) & 0xFF) as u8;
            let b = (rgb & 0xFF) as u8;
            return Some(Color::Rgb { r, g, b });
        }
    }
    None
}

/// The eight named color slots a config can define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSlots {
    pub black: String,
    pub red: String,
    pub green: String,
    pub yellow: String,
    pub blue: String,
    pub magenta: String,
    pub cyan: String,
    pub white: String,
}

impl ColorSlots {
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "black" => &self.black,
            "red" => &self.red,
            "green" => &self.green,
            "yellow" => &self.yellow,
            "blue" => &self.blue,
            "magenta" => &self.magenta,
            "cyan" => &self.cyan,
            "white" => &self.white,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn terminal_defaults() -> Self {
        Self {
            black: r"\e[1;90m".to_string(),
            red: r"\e[1;91m".to_string(),
            green: r"\e[1;92m".to_string(),
            yellow: r"\e[1;93m".to_string(),
            blue: r"\e[1;94m".to_string(),
            magenta: r"\e[1;95m".to_string(),
            cyan: r"\e[1;96m".to_string(),
            white: r"\e[1;97m".to_string(),
        }
    }

    pub fn markup_defaults() -> Self {
        Self {
            black: "!#000005".to_string(),
            red: "!#ff2000".to_string(),
            green: "!#00ff00".to_string(),
            yellow: "!#ffff00".to_string(),
            blue: "!#00aaff".to_string(),
            magenta: "!#f881ff".to_string(),
            cyan: "!#00ffff".to_string(),
            white: "!#ffffff".to_string(),
        }
    }
}

/// Slot tables for both dialects; lives for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub terminal: ColorSlots,
    pub markup: ColorSlots,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            terminal: ColorSlots::terminal_defaults(),
            markup: ColorSlots::markup_defaults(),
        }
    }
}

impl Palette {
    /// Resolves a non-reset token. Unknown slot names fall through to being
    /// parsed as a literal value.
    pub fn resolve(&self, token: &str, dialect: Dialect) -> Option<ColorSpec> {
        let slots = match dialect {
            Dialect::Terminal => &self.terminal,
            Dialect::Markup => &self.markup,
        };
        let value = slots.get(token).unwrap_or(token);
        let spec = ColorSpec::parse(value);
        if spec.is_none() {
            warn!("unrecognized color '{token}' (resolved to '{value}')");
        }
        spec
    }
}
