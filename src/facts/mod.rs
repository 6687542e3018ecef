//! Host fact providers backing the registry.

mod gpu;
mod hardware;
mod os;
mod theme;
mod user;

use crate::pci::PciDatabase;
use crate::registry::{FactProvider, Members, ModuleId};
use std::path::Path;
use sysinfo::System;

/// Value for a member whose source could not be read.
pub const UNKNOWN: &str = "(unknown)";

/// Every module and its members, for `--list-modules`.
pub const VOCABULARY: &[(&str, &[&str])] = &[
    (
        "os",
        &[
            "name", "pretty_name", "id", "version_id", "version_codename", "kernel_name",
            "kernel_version", "hostname", "arch", "username", "uptime_secs", "uptime_mins",
            "uptime_hours", "uptime_days", "initsys_name",
        ],
    ),
    ("user", &["name", "shell_path", "shell_name", "de_name", "wm_name", "term_name"]),
    ("cpu", &["name", "nproc", "cores", "freq_cur", "freq_max", "freq_min"]),
    ("gpu[N]", &["name", "vendor", "vendor_id", "device_id"]),
    ("ram", &["total", "used", "free", "swap_total", "swap_used", "swap_free"]),
    ("disk(path)", &["total", "used", "free", "fs", "mountpoint"]),
    ("theme[-gtk2|-gtk3|-gtk4]", &["name", "icons", "font", "cursor"]),
    ("system", &["host", "host_name", "host_vendor", "host_version"]),
];

/// Facts about the running machine.
#[derive(Default)]
pub struct HostFacts {
    sys: Option<System>,
    pci: Option<PciDatabase>,
}

impl HostFacts {
    pub fn new() -> Self {
        Self::default()
    }

    fn system(&mut self) -> &mut System {
        self.sys.get_or_insert_with(System::new)
    }

    fn pci(&mut self) -> &PciDatabase {
        self.pci.get_or_insert_with(PciDatabase::load)
    }
}

impl FactProvider for HostFacts {
    fn fetch(&mut self, module: &ModuleId) -> Members {
        match module {
            ModuleId::Os => os::os_members(),
            ModuleId::System => os::host_members(Path::new(os::DMI_PATH)),
            ModuleId::User => user::user_members(),
            ModuleId::Cpu => hardware::cpu_members(self.system()),
            ModuleId::Ram => hardware::ram_members(self.system()),
            ModuleId::Disk(path) => hardware::disk_members(path),
            ModuleId::Gpu(index) => gpu::gpu_members(Path::new(gpu::DRM_PATH), *index, self.pci()),
            ModuleId::Theme(toolkit) => theme::theme_members(*toolkit),
        }
    }
}

/// First line of a small sysfs/procfs file, trimmed.
pub(crate) fn read_first_line(path: impl AsRef<Path>) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let line = text.lines().next()?.trim();
    (!line.is_empty()).then(|| line.to_string())
}

pub(crate) fn insert(members: &mut Members, key: &str, value: impl Into<crate::registry::Value>) {
    members.insert(key.to_string(), value.into());
}

pub(crate) fn insert_or_unknown(members: &mut Members, key: &str, value: Option<String>) {
    insert(members, key, value.unwrap_or_else(|| UNKNOWN.to_string()));
}
