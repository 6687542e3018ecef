use super::{UNKNOWN, insert, insert_or_unknown, read_first_line};
use crate::registry::Members;
use std::path::Path;
use sysinfo::System;

const OS_RELEASE_PATHS: [&str; 3] = [
    "/etc/os-release",
    "/usr/lib/os-release",
    "/usr/share/os-release",
];

pub(super) const DMI_PATH: &str = "/sys/devices/virtual/dmi/id";

#[derive(Debug, Default, PartialEq)]
struct OsRelease {
    pretty_name: Option<String>,
    name: Option<String>,
    id: Option<String>,
    version_id: Option<String>,
    version_codename: Option<String>,
}

fn parse_os_release(text: &str) -> OsRelease {
    let mut release = OsRelease::default();
    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = Some(value.trim().trim_matches(|c| c == '"' || c == '\'').to_string());
        match key.trim() {
            "PRETTY_NAME" => release.pretty_name = value,
            "NAME" => release.name = value,
            "ID" => release.id = value,
            "VERSION_ID" => release.version_id = value,
            "VERSION_CODENAME" => release.version_codename = value,
            _ => {}
        }
    }
    release
}

/// os-release from disk, or whatever `os_info` can tell when there is none
/// (macOS, Windows, BSDs).
fn os_release() -> OsRelease {
    if let Some(text) = OS_RELEASE_PATHS
        .iter()
        .find_map(|path| std::fs::read_to_string(path).ok())
    {
        return parse_os_release(&text);
    }

    let info = os_info::get();
    let name = info.os_type().to_string();
    let version = info.version().to_string();
    let id = if name.to_lowercase().contains("windows") {
        "windows".to_string()
    } else if name.to_lowercase().contains("mac") {
        "macos".to_string()
    } else {
        name.to_lowercase().replace(' ', "").chars().take(16).collect()
    };
    OsRelease {
        pretty_name: Some(format!("{name} {version}")),
        name: Some(name),
        id: Some(id),
        version_id: Some(version),
        version_codename: info.codename().map(str::to_string),
    }
}

/// The init process name, from `/proc/1/comm`.
fn initsys_name() -> Option<String> {
    let comm = read_first_line("/proc/1/comm")?;
    Some(comm.rsplit('/').next().unwrap_or(&comm).to_string())
}

fn kernel_name() -> String {
    read_first_line("/proc/sys/kernel/ostype").unwrap_or_else(|| {
        let os = std::env::consts::OS;
        let mut chars = os.chars();
        chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
            .unwrap_or_else(|| UNKNOWN.to_string())
    })
}

pub(super) fn os_members() -> Members {
    let release = os_release();
    let info = os_info::get();
    let uptime = System::uptime();

    let mut members = Members::new();
    insert_or_unknown(&mut members, "name", release.name);
    insert_or_unknown(&mut members, "pretty_name", release.pretty_name);
    insert_or_unknown(&mut members, "id", release.id);
    insert_or_unknown(&mut members, "version_id", release.version_id);
    insert_or_unknown(&mut members, "version_codename", release.version_codename);
    insert(&mut members, "kernel_name", kernel_name());
    insert_or_unknown(&mut members, "kernel_version", System::kernel_version());
    insert_or_unknown(&mut members, "hostname", System::host_name());
    insert(
        &mut members,
        "arch",
        info.architecture().unwrap_or(std::env::consts::ARCH),
    );
    insert(&mut members, "username", whoami::username());
    insert(&mut members, "uptime_secs", uptime % 60);
    insert(&mut members, "uptime_mins", (uptime / 60) % 60);
    insert(&mut members, "uptime_hours", uptime / 3600);
    insert(&mut members, "uptime_days", uptime / 86400);
    insert_or_unknown(&mut members, "initsys_name", initsys_name());
    members
}

/// Motherboard or product identity from DMI.
pub(super) fn host_members(dmi: &Path) -> Members {
    let read = |name: &str| read_first_line(dmi.join(name));

    let (mut vendor, mut name, mut version) = (None, None, None);
    if let Some(board) = read("board_name") {
        name = Some(board);
        version = read("board_version");
        vendor = read("board_vendor").map(|v| {
            if v == "Micro-Star International Co., Ltd." {
                "MSI".to_string()
            } else {
                v
            }
        });
    } else if let Some(product) = read("product_name") {
        if product.starts_with("Standard PC") {
            vendor = Some("KVM/QEMU".to_string());
            version = read("product_version").map(|v| format!("({v})"));
        } else {
            vendor = read("sys_vendor");
            version = read("product_version");
        }
        name = Some(product);
    }

    let host = [vendor.as_deref(), name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let mut members = Members::new();
    insert_or_unknown(&mut members, "host", (!host.is_empty()).then_some(host));
    insert_or_unknown(&mut members, "host_name", name);
    insert_or_unknown(&mut members, "host_vendor", vendor);
    insert_or_unknown(&mut members, "host_version", version);
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Value;
    use tempfile::tempdir;

    #[test]
    fn parses_os_release_quoting() {
        let text = r#"NAME="Arch Linux"
PRETTY_NAME="Arch Linux"
ID=arch
BUILD_ID=rolling
VERSION_ID='2024.01'
# comment
VERSION_CODENAME=
"#;
        let release = parse_os_release(text);
        assert_eq!(release.name.as_deref(), Some("Arch Linux"));
        assert_eq!(release.id.as_deref(), Some("arch"));
        assert_eq!(release.version_id.as_deref(), Some("2024.01"));
        assert_eq!(release.version_codename.as_deref(), Some(""));
    }

    #[test]
    fn os_module_has_full_vocabulary() {
        let members = os_members();
        for key in super::super::VOCABULARY[0].1 {
            assert!(members.contains_key(*key), "missing os.{key}");
        }
        assert!(matches!(members["uptime_hours"], Value::Int(_)));
    }

    #[test]
    fn board_identity_wins_over_product() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("board_name"), "B550 TOMAHAWK\n").unwrap();
        std::fs::write(dir.path().join("board_vendor"), "Micro-Star International Co., Ltd.\n").unwrap();
        std::fs::write(dir.path().join("board_version"), "1.0\n").unwrap();
        std::fs::write(dir.path().join("product_name"), "MS-7C91\n").unwrap();

        let members = host_members(dir.path());
        assert_eq!(members["host"], Value::from("MSI B550 TOMAHAWK"));
        assert_eq!(members["host_vendor"], Value::from("MSI"));
    }

    #[test]
    fn qemu_product_gets_vendor() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("product_name"), "Standard PC (Q35 + ICH9, 2009)\n").unwrap();
        std::fs::write(dir.path().join("product_version"), "pc-q35-8.2\n").unwrap();

        let members = host_members(dir.path());
        assert_eq!(members["host_vendor"], Value::from("KVM/QEMU"));
        assert_eq!(members["host_version"], Value::from("(pc-q35-8.2)"));
    }

    #[test]
    fn missing_dmi_is_unknown() {
        let dir = tempdir().unwrap();
        let members = host_members(&dir.path().join("absent"));
        assert_eq!(members["host"], Value::from(UNKNOWN));
        assert_eq!(members["host_name"], Value::from(UNKNOWN));
    }
}
