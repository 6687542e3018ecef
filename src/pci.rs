//! Vendor and device names for PCI ids, read from the system `pci.ids`.

use log::debug;

const PCI_IDS_PATHS: [&str; 3] = [
    "/usr/share/hwdata/pci.ids",
    "/usr/share/misc/pci.ids",
    "/usr/share/pci.ids",
];

/// Used when no database is installed.
static BUILTIN_VENDORS: &[(u16, &str)] = &[
    (0x1002, "Advanced Micro Devices, Inc. [AMD/ATI]"),
    (0x1022, "Advanced Micro Devices, Inc. [AMD]"),
    (0x10de, "NVIDIA Corporation"),
    (0x8086, "Intel Corporation"),
    (0x1af4, "Red Hat, Inc."),
    (0x1234, "QEMU"),
    (0x15ad, "VMware"),
    (0x80ee, "InnoTek Systemberatung GmbH"),
    (0x1414, "Microsoft Corporation"),
    (0x5143, "Qualcomm Technologies, Inc"),
    (0x106b, "Apple Inc."),
];

#[derive(Debug, Default)]
pub struct PciDatabase {
    contents: Option<String>,
}

impl PciDatabase {
    /// Reads the first database that exists. A missing database is not an
    /// error; lookups fall back to the built-in vendor table.
    pub fn load() -> Self {
        let contents = PCI_IDS_PATHS.iter().find_map(|path| {
            let text = std::fs::read_to_string(path).ok()?;
            debug!("using PCI id database {path}");
            Some(text)
        });
        Self { contents }
    }

    pub fn from_contents(text: impl Into<String>) -> Self {
        Self {
            contents: Some(text.into()),
        }
    }

    pub fn vendor_name(&self, vendor: u16) -> Option<String> {
        self.contents
            .as_deref()
            .and_then(|text| lookup(text, vendor, None))
            .or_else(|| {
                BUILTIN_VENDORS
                    .iter()
                    .find(|(id, _)| *id == vendor)
                    .map(|(_, name)| name.to_string())
            })
    }

    pub fn device_name(&self, vendor: u16, device: u16) -> Option<String> {
        lookup(self.contents.as_deref()?, vendor, Some(device))
    }
}

fn lookup(text: &str, vendor: u16, device: Option<u16>) -> Option<String> {
    let vendor_key = format!("{vendor:04x}  ");
    let mut lines = text.lines();
    let vendor_name = lines
        .by_ref()
        .find_map(|line| line.strip_prefix(vendor_key.as_str()))?;

    let Some(device) = device else {
        return Some(vendor_name.to_string());
    };

    let device_key = format!("\t{device:04x}  ");
    for line in lines {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !line.starts_with('\t') {
            break;
        }
        if let Some(name) = line.strip_prefix(device_key.as_str()) {
            return Some(name.to_string());
        }
    }
    None
}

/// `NVIDIA Corporation` -> `NVIDIA` and the like.
pub fn short_vendor(vendor: &str) -> &str {
    if vendor.starts_with("Advanced Micro Devices") {
        "AMD"
    } else if vendor.starts_with("NVIDIA") {
        "NVIDIA"
    } else if vendor.starts_with("Intel") {
        "Intel"
    } else {
        vendor
    }
}
