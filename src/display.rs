//! Puts the rendered logo and the rendered layout side by side.

use crate::color::{self, Dialect};
use crate::config::Config;
use crate::error::Result;
use crate::registry::Registry;
use crate::render::{Rendered, Renderer};
use log::debug;
use std::io::{self, Write};

/// A layout line containing this text is dropped before compositing. Fact
/// providers return it for values that have nothing to show.
pub const REMOVE_LINE: &str = "(glyphfetch: remove this line)";

/// Merges logo and layout lines. Each layout line starts at column
/// `widest logo line + offset`; with no logo there is no padding. Logo lines
/// past the end of the layout are appended on their own.
pub fn compose(logo: &[Rendered], layout: &[Rendered], offset: usize, dialect: Dialect) -> Vec<String> {
    let reset = match dialect {
        Dialect::Terminal => color::reset_sequence(),
        Dialect::Markup => String::new(),
    };
    let max_width = logo.iter().map(Rendered::width).max().unwrap_or(0);
    let column = if logo.is_empty() { 0 } else { max_width + offset };
    debug!("logo width {max_width}, layout column {column}");

    let mut lines = Vec::with_capacity(layout.len().max(logo.len()));
    let kept = layout.iter().filter(|line| !line.decorated.contains(REMOVE_LINE));
    for (i, info) in kept.enumerate() {
        let mut line = String::new();
        let logo_width = match logo.get(i) {
            Some(art) => {
                line.push_str(&art.decorated);
                line.push_str(&reset);
                art.width()
            }
            None => 0,
        };
        let spaces = column.saturating_sub(logo_width);
        line.push_str(&" ".repeat(spaces));
        line.push_str(&info.decorated);
        line.push_str(&reset);
        lines.push(line);
    }

    let merged = lines.len();
    for art in logo.iter().skip(merged) {
        lines.push(format!("{}{reset}", art.decorated));
    }
    lines
}

/// One full render pass: bulk includes, logo lines, layout lines, compose.
pub fn render(config: &Config, registry: &mut Registry, logo: Option<&str>) -> Result<Vec<String>> {
    for include in &config.includes {
        registry.include(include)?;
    }

    let dialect = config.dialect();
    let mut renderer = Renderer::new(registry, &config.palette, dialect);

    let logo_lines: Vec<&str> = logo.map(|text| text.lines().collect()).unwrap_or_default();
    let logo = renderer.render_lines(&logo_lines)?;
    let layout = renderer.render_lines(&config.layout)?;

    Ok(compose(&logo, &layout, config.offset, dialect))
}

pub fn print(lines: &[String]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
