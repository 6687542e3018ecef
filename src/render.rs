//! Directive evaluation: turns one template line into a [`Rendered`] pair of
//! decorated output and plain, width-measuring text.

use crate::color::{self, Dialect, Palette};
use crate::error::{FetchError, Result};
use crate::exec::shell_exec;
use crate::parse::{self, DirectiveKind, Token};
use crate::registry::{Registry, split_path};
use unicode_width::UnicodeWidthStr;

/// Substituted for a `$<module.member>` that names nothing.
pub const UNKNOWN_MODULE: &str = "<unknown/invalid module>";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    /// Text with color control sequences for the active dialect.
    pub decorated: String,
    /// The same visible text with every control sequence left out.
    pub plain: String,
}

impl Rendered {
    /// Number of terminal cells the decorated line occupies.
    pub fn width(&self) -> usize {
        self.plain.width()
    }
}

/// Appends to both buffers under one dispatch so they cannot drift.
struct LineBuilder {
    dialect: Dialect,
    decorated: String,
    plain: String,
    open_spans: usize,
}

impl LineBuilder {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            decorated: String::new(),
            plain: String::new(),
            open_spans: 0,
        }
    }

    /// Visible content.
    fn push_text(&mut self, text: &str) {
        self.plain.push_str(text);
        match self.dialect {
            Dialect::Terminal => self.decorated.push_str(text),
            Dialect::Markup => {
                for c in text.chars() {
                    match c {
                        '&' => self.decorated.push_str("&amp;"),
                        '<' => self.decorated.push_str("&lt;"),
                        '>' => self.decorated.push_str("&gt;"),
                        _ => self.decorated.push(c),
                    }
                }
            }
        }
    }

    /// Control text; never reaches the plain buffer.
    fn push_color(&mut self, open: &str) {
        self.decorated.push_str(open);
        if self.dialect == Dialect::Markup {
            self.open_spans += 1;
        }
    }

    fn reset(&mut self) {
        match self.dialect {
            Dialect::Terminal => self.decorated.push_str(&color::reset_sequence()),
            Dialect::Markup => self.close_spans(),
        }
    }

    fn close_spans(&mut self) {
        for _ in 0..self.open_spans {
            self.decorated.push_str("</span>");
        }
        self.open_spans = 0;
    }

    fn finish(mut self) -> Rendered {
        self.close_spans();
        Rendered {
            decorated: self.decorated,
            plain: self.plain,
        }
    }
}

pub struct Renderer<'a> {
    registry: &'a mut Registry,
    palette: &'a Palette,
    dialect: Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a mut Registry, palette: &'a Palette, dialect: Dialect) -> Self {
        Self {
            registry,
            palette,
            dialect,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Expands every directive in `line`, left to right. `line_no` is only
    /// used for diagnostics.
    pub fn render_line(&mut self, line: &str, line_no: usize) -> Result<Rendered> {
        let tokens = parse::tokenize(line).map_err(|unclosed| FetchError::Parse {
            line: line_no,
            offset: unclosed.offset,
            input: line.to_string(),
        })?;

        let mut out = LineBuilder::new(self.dialect);
        for token in tokens {
            match token {
                Token::Text(text) => out.push_text(&text),
                Token::Directive { kind, body, .. } => match kind {
                    DirectiveKind::Exec => out.push_text(&shell_exec(&body)),
                    DirectiveKind::Module => {
                        let value = self.lookup(&body);
                        out.push_text(&value);
                    }
                    DirectiveKind::Color if body == "0" => out.reset(),
                    DirectiveKind::Color => {
                        let open = self
                            .palette
                            .resolve(&body, self.dialect)
                            .and_then(|spec| spec.open(self.dialect));
                        if let Some(open) = open {
                            out.push_color(&open);
                        }
                    }
                },
            }
        }
        Ok(out.finish())
    }

    pub fn render_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<Vec<Rendered>> {
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| self.render_line(line.as_ref(), i + 1))
            .collect()
    }

    fn lookup(&mut self, path: &str) -> String {
        split_path(path)
            .and_then(|(module, member)| self.registry.get(module, member))
            .map_or_else(|| UNKNOWN_MODULE.to_string(), ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FactProvider, Members, ModuleId};
    use proptest::prelude::*;
    use regex::Regex;

    struct Fixed;

    impl FactProvider for Fixed {
        fn fetch(&mut self, module: &ModuleId) -> Members {
            let mut members = Members::new();
            match module {
                ModuleId::Os => {
                    members.insert("name".into(), "Arch Linux".into());
                    members.insert("uptime_hours".into(), 12u64.into());
                }
                ModuleId::Ram => {
                    members.insert("used".into(), 1024.5f64.into());
                }
                _ => {}
            }
            members
        }
    }

    fn render(line: &str, dialect: Dialect) -> Result<Rendered> {
        let mut registry = Registry::new(Fixed);
        let palette = Palette::default();
        Renderer::new(&mut registry, &palette, dialect).render_line(line, 1)
    }

    fn strip_ansi(s: &str) -> String {
        Regex::new("\x1b\\[[0-9;]*m").unwrap().replace_all(s, "").into_owned()
    }

    #[test]
    fn text_without_directives_is_identity() {
        let out = render("Hello, World!", Dialect::Terminal).unwrap();
        assert_eq!(out.decorated, "Hello, World!");
        assert_eq!(out.plain, "Hello, World!");
    }

    #[test]
    fn module_lookup_substitutes_value() {
        let out = render("OS: $<os.name> up $<os.uptime_hours>h", Dialect::Terminal).unwrap();
        assert_eq!(out.decorated, "OS: Arch Linux up 12h");
        assert_eq!(out.plain, out.decorated);
    }

    #[test]
    fn float_values_use_two_decimals() {
        let out = render("$<ram.used> MiB", Dialect::Terminal).unwrap();
        assert_eq!(out.plain, "1024.50 MiB");
    }

    #[test]
    fn unknown_member_renders_placeholder() {
        let out = render("$<os.nonexistent_key>", Dialect::Terminal).unwrap();
        assert_eq!(out.decorated, UNKNOWN_MODULE);
        assert_eq!(out.width(), UNKNOWN_MODULE.len());
    }

    #[test]
    fn unknown_module_and_missing_dot_render_placeholder() {
        assert_eq!(render("$<network.ip>", Dialect::Terminal).unwrap().plain, UNKNOWN_MODULE);
        assert_eq!(render("$<os>", Dialect::Terminal).unwrap().plain, UNKNOWN_MODULE);
    }

    #[cfg(unix)]
    #[test]
    fn exec_output_is_visible_text() {
        let out = render(r#"Hello, $(echo "World")!"#, Dialect::Terminal).unwrap();
        assert_eq!(out.decorated, "Hello, World!");
        assert_eq!(out.plain, "Hello, World!");
    }

    #[test]
    fn escaped_openers_render_literally() {
        let out = render(r#"Hello, \$(echo "World")!"#, Dialect::Terminal).unwrap();
        assert_eq!(out.plain, r#"Hello, $(echo "World")!"#);
        let out = render(r"\$<os.name> \${red}", Dialect::Terminal).unwrap();
        assert_eq!(out.decorated, "$<os.name> ${red}");
    }

    #[cfg(unix)]
    #[test]
    fn escaped_backslash_still_expands() {
        let out = render(r#"Hello, \\$(echo "World")!"#, Dialect::Terminal).unwrap();
        assert_eq!(out.plain, r"Hello, \\World!");
    }

    #[test]
    fn color_directive_is_invisible() {
        let out = render("${red}OS${0}: x", Dialect::Terminal).unwrap();
        assert_eq!(out.decorated, "\x1b[1;91mOS\x1b[0m: x");
        assert_eq!(out.plain, "OS: x");
        assert_eq!(out.width(), 5);
    }

    #[test]
    fn hex_color_applies_to_rest_of_line() {
        let out = render("${#03ff93}RAM usage", Dialect::Terminal).unwrap();
        assert_eq!(out.decorated, "\x1b[38;2;3;255;147mRAM usage");
        assert_eq!(out.plain, "RAM usage");
    }

    #[test]
    fn raw_escape_from_logo_text() {
        let out = render(r"${\e[40m}   ${\e[41m}   ", Dialect::Terminal).unwrap();
        assert_eq!(out.decorated, "\x1b[40m   \x1b[41m   ");
        assert_eq!(out.width(), 6);
    }

    #[test]
    fn unknown_color_emits_nothing() {
        let out = render("${orange}x", Dialect::Terminal).unwrap();
        assert_eq!(out.decorated, "x");
    }

    #[test]
    fn markup_spans_close_on_reset_and_eol() {
        let out = render("${red}OS${0}: ${\\e[44m}x", Dialect::Markup).unwrap();
        assert_eq!(
            out.decorated,
            "<span fgcolor='#ff2000' weight='bold'>OS</span>: \
             <span bgcolor='blue' weight='normal'>x</span>"
        );
        assert_eq!(out.plain, "OS: x");
    }

    #[test]
    fn markup_escapes_visible_text_only() {
        let out = render("<a & b>", Dialect::Markup).unwrap();
        assert_eq!(out.decorated, "&lt;a &amp; b&gt;");
        assert_eq!(out.plain, "<a & b>");
    }

    #[test]
    fn reset_without_open_color_in_markup_is_empty() {
        let out = render("a${0}b", Dialect::Markup).unwrap();
        assert_eq!(out.decorated, "ab");
    }

    #[test]
    fn unterminated_directive_is_parse_error() {
        let err = render("Hello $(echo hi", Dialect::Terminal).unwrap_err();
        match err {
            FetchError::Parse { line, offset, input } => {
                assert_eq!(line, 1);
                assert_eq!(offset, 6);
                assert_eq!(input, "Hello $(echo hi");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn width_counts_cells_not_bytes() {
        let out = render("${cyan}──│é", Dialect::Terminal).unwrap();
        assert_eq!(out.width(), 4);
    }

    #[test]
    fn render_lines_numbers_from_one() {
        let mut registry = Registry::new(Fixed);
        let palette = Palette::default();
        let mut renderer = Renderer::new(&mut registry, &palette, Dialect::Terminal);
        let err = renderer.render_lines(&["ok", "${red"]).unwrap_err();
        assert!(matches!(err, FetchError::Parse { line: 2, offset: 0, .. }));
    }

    proptest! {
        #[test]
        fn no_dollar_is_identity(line in "[^$]{0,40}") {
            let out = render(&line, Dialect::Terminal).unwrap();
            prop_assert_eq!(&out.decorated, &line);
            prop_assert_eq!(&out.plain, &line);
        }

        #[test]
        fn dialect_never_changes_plain_text(
            parts in proptest::collection::vec(
                prop_oneof![
                    "[a-zA-Z <>&]{0,8}",
                    Just("${red}".to_string()),
                    Just("${0}".to_string()),
                    Just("${#102030}".to_string()),
                    Just("${\\e[1;34m}".to_string()),
                    Just("$<os.name>".to_string()),
                    Just("$<os.bogus>".to_string()),
                ],
                0..8,
            )
        ) {
            let line = parts.concat();
            let term = render(&line, Dialect::Terminal).unwrap();
            let markup = render(&line, Dialect::Markup).unwrap();
            prop_assert_eq!(&term.plain, &markup.plain);
            prop_assert_eq!(term.width(), markup.width());
        }

        #[test]
        fn stripping_ansi_reproduces_plain(
            parts in proptest::collection::vec(
                prop_oneof![
                    "[a-z ]{0,8}",
                    Just("${green}".to_string()),
                    Just("${0}".to_string()),
                    Just("${!#abcdef}".to_string()),
                    Just("$<os.uptime_hours>".to_string()),
                ],
                0..8,
            )
        ) {
            let line = parts.concat();
            let out = render(&line, Dialect::Terminal).unwrap();
            prop_assert_eq!(strip_ansi(&out.decorated), out.plain);
        }
    }
}
