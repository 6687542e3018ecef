use super::{UNKNOWN, insert, read_first_line};
use crate::pci::{PciDatabase, short_vendor};
use crate::registry::Members;
use log::debug;
use std::path::Path;

pub(super) const DRM_PATH: &str = "/sys/class/drm";

/// Cards probed past the requested index before giving up.
const MAX_PROBE: u16 = 10;

fn parse_hex_id(text: &str) -> Option<u16> {
    let digits = text.trim().trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).ok()
}

/// PCI ids of the first `cardN` at or after `index` that exposes them.
fn probe(drm: &Path, index: u16) -> Option<(u16, u16)> {
    (index..index.saturating_add(MAX_PROBE)).find_map(|n| {
        let device = drm.join(format!("card{n}")).join("device");
        let vendor = parse_hex_id(&read_first_line(device.join("vendor"))?)?;
        let id = parse_hex_id(&read_first_line(device.join("device"))?)?;
        debug!("card{n}: {vendor:04x}:{id:04x}");
        Some((vendor, id))
    })
}

/// Marketing name from the bracketed part of a pci.ids entry, prefixed with
/// the short vendor: `GA102 [GeForce RTX 3090]` -> `NVIDIA GeForce RTX 3090`.
fn display_name(db: &PciDatabase, vendor: u16, device: u16) -> String {
    let vendor_name = db.vendor_name(vendor);
    let Some(device_name) = db.device_name(vendor, device) else {
        return format!("PCI {vendor:04x}:{device:04x}");
    };
    let model = match (device_name.find('['), device_name.rfind(']')) {
        (Some(open), Some(close)) if open < close => &device_name[open + 1..close],
        _ => device_name.as_str(),
    };
    match vendor_name.as_deref().map(short_vendor) {
        Some(short) => format!("{short} {model}"),
        None => model.to_string(),
    }
}

pub(super) fn gpu_members(drm: &Path, index: u16, db: &PciDatabase) -> Members {
    let mut members = Members::new();
    let Some((vendor, device)) = probe(drm, index) else {
        for key in ["name", "vendor", "vendor_id", "device_id"] {
            insert(&mut members, key, UNKNOWN);
        }
        return members;
    };

    insert(&mut members, "name", display_name(db, vendor, device));
    insert(
        &mut members,
        "vendor",
        db.vendor_name(vendor)
            .map(|name| short_vendor(&name).to_string())
            .unwrap_or_else(|| UNKNOWN.to_string()),
    );
    insert(&mut members, "vendor_id", format!("{vendor:04x}"));
    insert(&mut members, "device_id", format!("{device:04x}"));
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Value;
    use tempfile::{TempDir, tempdir};

    const IDS: &str = "\
10de  NVIDIA Corporation
\t2204  GA102 [GeForce RTX 3090]
1af4  Red Hat, Inc.
\t1050  Virtio 1.0 GPU
";

    fn fake_drm(cards: &[(u16, &str, &str)]) -> TempDir {
        let dir = tempdir().unwrap();
        for (n, vendor, device) in cards {
            let dev = dir.path().join(format!("card{n}")).join("device");
            std::fs::create_dir_all(&dev).unwrap();
            std::fs::write(dev.join("vendor"), format!("{vendor}\n")).unwrap();
            std::fs::write(dev.join("device"), format!("{device}\n")).unwrap();
        }
        dir
    }

    #[test]
    fn parses_sysfs_hex() {
        assert_eq!(parse_hex_id("0x10de\n"), Some(0x10de));
        assert_eq!(parse_hex_id("1af4"), Some(0x1af4));
        assert_eq!(parse_hex_id("zz"), None);
    }

    #[test]
    fn names_device_from_database() {
        let drm = fake_drm(&[(0, "0x10de", "0x2204")]);
        let db = PciDatabase::from_contents(IDS);
        let members = gpu_members(drm.path(), 0, &db);
        assert_eq!(members["name"], Value::from("NVIDIA GeForce RTX 3090"));
        assert_eq!(members["vendor"], Value::from("NVIDIA"));
        assert_eq!(members["vendor_id"], Value::from("10de"));
        assert_eq!(members["device_id"], Value::from("2204"));
    }

    #[test]
    fn unbracketed_device_name_is_used_whole() {
        let db = PciDatabase::from_contents(IDS);
        assert_eq!(display_name(&db, 0x1af4, 0x1050), "Red Hat, Inc. Virtio 1.0 GPU");
    }

    #[test]
    fn probes_upward_from_index() {
        let drm = fake_drm(&[(0, "0x8086", "0x3e92"), (2, "0x10de", "0x2204")]);
        let db = PciDatabase::from_contents(IDS);
        let members = gpu_members(drm.path(), 1, &db);
        assert_eq!(members["device_id"], Value::from("2204"));
    }

    #[test]
    fn unknown_device_falls_back_to_ids() {
        let drm = fake_drm(&[(0, "0x8086", "0x3e92")]);
        let members = gpu_members(drm.path(), 0, &PciDatabase::default());
        assert_eq!(members["name"], Value::from("PCI 8086:3e92"));
        assert_eq!(members["vendor"], Value::from("Intel"));
    }

    #[test]
    fn no_cards_is_unknown() {
        let drm = tempdir().unwrap();
        let members = gpu_members(drm.path(), 0, &PciDatabase::default());
        assert_eq!(members["name"], Value::from(UNKNOWN));
    }
}
