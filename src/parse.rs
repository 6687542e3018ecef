//! Scanner for the three directive forms embedded in template lines:
//! `$(command)`, `$<module.member>` and `${color}`.
//!
//! A line is scanned once into a flat list of [`Token`]s. Escapes are resolved
//! here so the evaluator never has to look at backslashes again.

/// Which kind of directive an opener introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `$( ... )`
    Exec,
    /// `$< ... >`
    Module,
    /// `${ ... }`
    Color,
}

impl DirectiveKind {
    fn from_opener(byte: u8) -> Option<Self> {
        match byte {
            b'(' => Some(Self::Exec),
            b'<' => Some(Self::Module),
            b'{' => Some(Self::Color),
            _ => None,
        }
    }

    pub fn closer(self) -> u8 {
        match self {
            Self::Exec => b')',
            Self::Module => b'>',
            Self::Color => b'}',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, escapes already applied.
    Text(String),
    Directive {
        kind: DirectiveKind,
        body: String,
        /// Byte offset of the `$` in the source line.
        offset: usize,
    },
}

/// An opener at `offset` never found its closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unclosed {
    pub offset: usize,
}

/// Splits `line` into literal runs and directives, left to right.
///
/// A `$` followed by an opener is literal when an odd number of backslashes
/// precede it; one of those backslashes is dropped. Inside a directive body a
/// backslash before the closer is dropped and the closer kept as text.
pub fn tokenize(line: &str) -> Result<Vec<Token>, Unclosed> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut run_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        let Some(kind) = bytes.get(i + 1).copied().and_then(DirectiveKind::from_opener) else {
            i += 1;
            continue;
        };

        let backslashes = bytes[..i].iter().rev().take_while(|&&b| b == b'\\').count();
        if backslashes % 2 == 1 {
            text.push_str(&line[run_start..i - 1]);
            run_start = i;
            i += 1;
            continue;
        }

        text.push_str(&line[run_start..i]);
        if !text.is_empty() {
            tokens.push(Token::Text(std::mem::take(&mut text)));
        }

        let (body, end) = scan_body(line, i + 2, kind.closer()).ok_or(Unclosed { offset: i })?;
        tokens.push(Token::Directive {
            kind,
            body,
            offset: i,
        });
        i = end + 1;
        run_start = i;
    }

    text.push_str(&line[run_start..]);
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    Ok(tokens)
}

/// Returns the unescaped body and the index of the closing byte.
fn scan_body(line: &str, start: usize, closer: u8) -> Option<(String, usize)> {
    let bytes = line.as_bytes();
    let mut body = String::new();
    let mut run_start = start;

    for j in start..bytes.len() {
        if bytes[j] != closer {
            continue;
        }
        if bytes[j - 1] == b'\\' {
            body.push_str(&line[run_start..j - 1]);
            run_start = j;
            continue;
        }
        body.push_str(&line[run_start..j]);
        return Some((body, j));
    }
    None
}
