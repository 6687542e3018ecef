//! Module value registry: `module -> member -> value`, fetched once per
//! module per registry and never invalidated.

use crate::error::{FetchError, Result};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

/// A single fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(u64),
    Float(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:.2}"),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

pub type Members = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolkit {
    Gtk2,
    Gtk3,
    Gtk4,
}

/// A recognized module name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleId {
    Os,
    User,
    Cpu,
    /// Device index; bare `gpu` is 0.
    Gpu(u16),
    Ram,
    Disk(PathBuf),
    Theme(Toolkit),
    System,
}

impl ModuleId {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "os" => return Some(Self::Os),
            "user" => return Some(Self::User),
            "cpu" => return Some(Self::Cpu),
            "ram" => return Some(Self::Ram),
            "system" => return Some(Self::System),
            "disk" => return Some(Self::Disk(PathBuf::from("/"))),
            "theme" | "theme-gtk3" => return Some(Self::Theme(Toolkit::Gtk3)),
            "theme-gtk2" => return Some(Self::Theme(Toolkit::Gtk2)),
            "theme-gtk4" => return Some(Self::Theme(Toolkit::Gtk4)),
            _ => {}
        }

        if let Some(index) = name.strip_prefix("gpu") {
            if index.is_empty() {
                return Some(Self::Gpu(0));
            }
            if index.bytes().all(|b| b.is_ascii_digit()) {
                return index.parse().ok().map(Self::Gpu);
            }
            return None;
        }

        let path = name.strip_prefix("disk(")?.strip_suffix(')')?;
        (!path.is_empty()).then(|| Self::Disk(PathBuf::from(path)))
    }
}

/// Splits `module.member` on the first `.` outside parentheses, so
/// `disk(/mnt/a.b).used` keeps its path intact.
pub fn split_path(path: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in path.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => return Some((&path[..i], &path[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Source of raw facts for a module. Called at most once per module name.
pub trait FactProvider {
    fn fetch(&mut self, module: &ModuleId) -> Members;
}

pub struct Registry {
    provider: Box<dyn FactProvider>,
    tables: HashMap<String, Members>,
}

impl Registry {
    pub fn new(provider: impl FactProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            tables: HashMap::new(),
        }
    }

    /// Bulk-loads a module named by an include entry (`os` or `os.name`).
    /// Names outside the known set are fatal here.
    pub fn include(&mut self, entry: &str) -> Result<()> {
        let module = split_path(entry).map_or(entry, |(module, _)| module);
        self.load(module)
            .map(|_| ())
            .ok_or_else(|| FetchError::UnknownModule(entry.to_string()))
    }

    /// Looks up one member, fetching the module on first use. `None` covers
    /// both unknown modules and unknown members.
    pub fn get(&mut self, module: &str, member: &str) -> Option<&Value> {
        self.load(module)?.get(member)
    }

    /// Every module fetched so far.
    pub fn tables(&self) -> BTreeMap<&str, &Members> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    fn load(&mut self, name: &str) -> Option<&Members> {
        if !self.tables.contains_key(name) {
            let id = ModuleId::parse(name)?;
            debug!("fetching module '{name}' ({id:?})");
            let members = self.provider.fetch(&id);
            self.tables.insert(name.to_string(), members);
        }
        self.tables.get(name)
    }
}
