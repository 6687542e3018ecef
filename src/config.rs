use crate::color::{ColorSlots, Dialect, Palette};
use crate::error::{FetchError, Result};
use log::{debug, info};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Written to the config path on first run.
pub const DEFAULT_CONFIG: &str = r#"[config]
# Every entry of "layout" is one line of output, printed next to the logo.
# Three kinds of tags are expanded inside a line:
#
#   $<module.member>  a fact about this machine, e.g. $<os.kernel_version>
#                     (run "glyphfetch --list-modules" for all of them)
#   $(command)        the output of a shell command, e.g. $(date +%H:%M)
#   ${color}          switches color for the rest of the line; ${0} resets.
#                     Use a slot name below, a hex code (#55ff88, !#55ff88 for
#                     bold) or an escape code like ${\e[1;32m}.
#
# Put a backslash before the "$" to print a tag literally: \$(not run).

# Modules fetched before rendering. A bad name here is an error.
# "disk(/home)" selects the filesystem holding a path; "gpu1" the second GPU.
includes = ["os", "user", "cpu", "gpu", "ram", "disk"]

layout = [
    "${red}$<user.name>${0}@${cyan}$<os.hostname>",
    "───────────────────────────",
    "${red}OS${0}: $<os.pretty_name>",
    "${cyan}Uptime${0}: $<os.uptime_hours> hours, $<os.uptime_mins> minutes",
    "${green}Kernel${0}: $<os.kernel_name> $<os.kernel_version>",
    "${yellow}Arch${0}: $<os.arch>",
    "${magenta}DE${0}: $<user.de_name>",
    "${blue}Terminal${0}: $<user.term_name>",
    "${magenta}CPU${0}: $<cpu.name>",
    "${blue}GPU${0}: $<gpu.name>",
    "${#03ff93}RAM${0}: $<ram.used> MiB / $<ram.total> MiB",
    "${#ffb347}Disk (/)${0}: $<disk.used> GiB / $<disk.total> GiB",
    "",
    '${\e[40m}   ${\e[41m}   ${\e[42m}   ${\e[43m}   ${\e[44m}   ${\e[45m}   ${\e[46m}   ${\e[47m}   ',
    '${\e[100m}   ${\e[101m}   ${\e[102m}   ${\e[103m}   ${\e[104m}   ${\e[105m}   ${\e[106m}   ${\e[107m}   ',
]

# "os" shows the logo of the running OS, "off" shows none,
# anything else is a path to a text file (~ and $VARS are expanded).
source-path = "os"

# Columns between the widest logo line and the layout.
offset = 5

# Terminal color slots. Hex codes or escape codes; use single quotes for
# escape codes so TOML keeps the backslash.
black = '\e[1;90m'
red = '\e[1;91m'
green = '\e[1;92m'
yellow = '\e[1;93m'
blue = '\e[1;94m'
magenta = '\e[1;95m'
cyan = '\e[1;96m'
white = '\e[1;97m'

[gui]
# Emit <span> markup for a GUI renderer instead of escape codes.
enable = false

# Color slots used for markup output (hex codes only).
black = "!#000005"
red = "!#ff2000"
green = "!#00ff00"
yellow = "!#ffff00"
blue = "!#00aaff"
magenta = "!#f881ff"
cyan = "!#00ffff"
white = "!#ffffff"
"#;

/// Where the logo comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    /// Embedded art for the detected OS.
    Os,
    Off,
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub includes: Vec<String>,
    pub layout: Vec<String>,
    pub source_path: String,
    pub offset: usize,
    pub gui: bool,
    pub palette: Palette,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ConfigFile {
    config: GeneralSection,
    gui: GuiSection,
}

#[derive(Deserialize, Debug)]
#[serde(default, rename_all = "kebab-case")]
struct GeneralSection {
    includes: Vec<String>,
    layout: Vec<String>,
    source_path: String,
    offset: usize,
    #[serde(flatten)]
    colors: SlotOverrides,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            includes: ["os", "user", "cpu", "gpu", "ram", "disk"]
                .map(String::from)
                .to_vec(),
            layout: default_layout(),
            source_path: "os".to_string(),
            offset: 5,
            colors: SlotOverrides::default(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct GuiSection {
    enable: bool,
    #[serde(flatten)]
    colors: SlotOverrides,
}

/// Slot values given in a section; missing ones keep the dialect default.
#[derive(Deserialize, Debug, Default)]
struct SlotOverrides {
    black: Option<String>,
    red: Option<String>,
    green: Option<String>,
    yellow: Option<String>,
    blue: Option<String>,
    magenta: Option<String>,
    cyan: Option<String>,
    white: Option<String>,
}

impl SlotOverrides {
    fn apply(self, mut base: ColorSlots) -> ColorSlots {
        let pairs = [
            (self.black, &mut base.black),
            (self.red, &mut base.red),
            (self.green, &mut base.green),
            (self.yellow, &mut base.yellow),
            (self.blue, &mut base.blue),
            (self.magenta, &mut base.magenta),
            (self.cyan, &mut base.cyan),
            (self.white, &mut base.white),
        ];
        for (value, slot) in pairs {
            if let Some(value) = value {
                *slot = value;
            }
        }
        base
    }
}

fn default_layout() -> Vec<String> {
    [
        "${red}$<user.name>${0}@${cyan}$<os.hostname>",
        "───────────────────────────",
        "${red}OS${0}: $<os.pretty_name>",
        "${cyan}Uptime${0}: $<os.uptime_hours> hours, $<os.uptime_mins> minutes",
        "${green}Kernel${0}: $<os.kernel_name> $<os.kernel_version>",
        "${yellow}Arch${0}: $<os.arch>",
        "${magenta}DE${0}: $<user.de_name>",
        "${blue}Terminal${0}: $<user.term_name>",
        "${magenta}CPU${0}: $<cpu.name>",
        "${blue}GPU${0}: $<gpu.name>",
        "${#03ff93}RAM${0}: $<ram.used> MiB / $<ram.total> MiB",
        "${#ffb347}Disk (/)${0}: $<disk.used> GiB / $<disk.total> GiB",
        "",
        r"${\e[40m}   ${\e[41m}   ${\e[42m}   ${\e[43m}   ${\e[44m}   ${\e[45m}   ${\e[46m}   ${\e[47m}   ",
        r"${\e[100m}   ${\e[101m}   ${\e[102m}   ${\e[103m}   ${\e[104m}   ${\e[105m}   ${\e[106m}   ${\e[107m}   ",
    ]
    .map(String::from)
    .to_vec()
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        Self {
            includes: file.config.includes,
            layout: file.config.layout,
            source_path: file.config.source_path,
            offset: file.config.offset,
            gui: file.gui.enable,
            palette: Palette {
                terminal: file.config.colors.apply(ColorSlots::terminal_defaults()),
                markup: file.gui.colors.apply(ColorSlots::markup_defaults()),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        ConfigFile::default().into()
    }
}

impl Config {
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str::<ConfigFile>(text)
            .map(Self::from)
            .map_err(|source| FetchError::Config {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("loading config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Loads `path`, first writing [`DEFAULT_CONFIG`] there if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("writing default config to {}", path.display());
            let io_err = |source: std::io::Error| FetchError::Io {
                path: path.to_path_buf(),
                source,
            };
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).map_err(io_err)?;
            }
            std::fs::write(path, DEFAULT_CONFIG).map_err(io_err)?;
        }
        Self::load(path)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glyphfetch")
            .join("config.toml")
    }

    pub fn dialect(&self) -> Dialect {
        if self.gui {
            Dialect::Markup
        } else {
            Dialect::Terminal
        }
    }

    pub fn logo_source(&self) -> LogoSource {
        match self.source_path.trim() {
            "os" => LogoSource::Os,
            "off" | "" => LogoSource::Off,
            path => LogoSource::Path(PathBuf::from(expand_var(path))),
        }
    }
}

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("env var pattern is valid")
});

/// Expands a leading `~` and `$VAR` / `${VAR}` references. Unset variables
/// expand to nothing.
pub fn expand_var(input: &str) -> String {
    let expanded = ENV_VAR_RE.replace_all(input, |caps: &regex::Captures| {
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        std::env::var(name).unwrap_or_default()
    });

    match expanded.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => format!("{}{rest}", home.display()),
            None => expanded.into_owned(),
        },
        _ => expanded.into_owned(),
    }
}
