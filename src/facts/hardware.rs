use super::{UNKNOWN, insert, insert_or_unknown, read_first_line};
use crate::registry::{Members, Value};
use log::debug;
use std::path::{Path, PathBuf};
use sysinfo::{Disks, System};

const CPUFREQ_PATH: &str = "/sys/devices/system/cpu/cpu0/cpufreq";

const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = MIB * 1024.0;

fn mib(bytes: u64) -> f64 {
    bytes as f64 / MIB
}

fn gib(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

/// Drops trademark noise and repeated spaces from a CPU brand string.
fn clean_cpu_name(brand: &str) -> String {
    let stripped = brand
        .replace("(R)", "")
        .replace("(TM)", "")
        .replace("(tm)", "");
    stripped
        .split(" @ ")
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A `cpuinfo_*_freq` file (kHz) as GHz.
fn sysfs_freq(file: &Path) -> Option<Value> {
    let khz: u64 = read_first_line(file)?.parse().ok()?;
    Some(Value::Float(khz as f64 / 1_000_000.0))
}

pub(super) fn cpu_members(sys: &mut System) -> Members {
    sys.refresh_cpu();
    let cpus = sys.cpus();

    let mut members = Members::new();
    let name = cpus
        .first()
        .map(|cpu| clean_cpu_name(cpu.brand()))
        .filter(|name| !name.is_empty());
    insert_or_unknown(&mut members, "name", name);
    insert(&mut members, "nproc", cpus.len() as u64);
    insert(
        &mut members,
        "cores",
        sys.physical_core_count().unwrap_or(cpus.len()) as u64,
    );
    let cur = cpus.first().map(|cpu| cpu.frequency()).unwrap_or(0);
    insert(&mut members, "freq_cur", cur as f64 / 1000.0);

    let freq_dir = Path::new(CPUFREQ_PATH);
    for (key, file) in [("freq_max", "cpuinfo_max_freq"), ("freq_min", "cpuinfo_min_freq")] {
        let value = sysfs_freq(&freq_dir.join(file)).unwrap_or_else(|| UNKNOWN.into());
        members.insert(key.to_string(), value);
    }
    members
}

pub(super) fn ram_members(sys: &mut System) -> Members {
    sys.refresh_memory();
    let total = sys.total_memory();
    let free = sys.available_memory();

    let mut members = Members::new();
    insert(&mut members, "total", mib(total));
    insert(&mut members, "used", mib(total.saturating_sub(free)));
    insert(&mut members, "free", mib(free));
    insert(&mut members, "swap_total", mib(sys.total_swap()));
    insert(&mut members, "swap_used", mib(sys.used_swap()));
    insert(&mut members, "swap_free", mib(sys.free_swap()));
    members
}

/// Index of the mount point that contains `path` with the most components.
fn deepest_mount<'a>(path: &Path, mounts: impl IntoIterator<Item = &'a Path>) -> Option<usize> {
    mounts
        .into_iter()
        .enumerate()
        .filter(|(_, mount)| path.starts_with(mount))
        .max_by_key(|(_, mount)| mount.components().count())
        .map(|(i, _)| i)
}

pub(super) fn disk_members(path: &PathBuf) -> Members {
    let disks = Disks::new_with_refreshed_list();
    let list = disks.list();
    let target = path.canonicalize().unwrap_or_else(|_| path.clone());

    let mut members = Members::new();
    let Some(disk) = deepest_mount(&target, list.iter().map(|d| d.mount_point())).map(|i| &list[i]) else {
        debug!("no mount point contains {}", target.display());
        for key in ["total", "used", "free", "fs", "mountpoint"] {
            insert(&mut members, key, UNKNOWN);
        }
        return members;
    };

    let total = disk.total_space();
    let free = disk.available_space();
    insert(&mut members, "total", gib(total));
    insert(&mut members, "used", gib(total.saturating_sub(free)));
    insert(&mut members, "free", gib(free));
    insert(&mut members, "fs", disk.file_system().to_string_lossy().into_owned());
    insert(&mut members, "mountpoint", disk.mount_point().display().to_string());
    members
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_brand_strings() {
        assert_eq!(
            clean_cpu_name("Intel(R) Core(TM) i7-8700K CPU @ 3.70GHz"),
            "Intel Core i7-8700K CPU"
        );
        assert_eq!(
            clean_cpu_name("AMD Ryzen 7 5800X 8-Core Processor  "),
            "AMD Ryzen 7 5800X 8-Core Processor"
        );
    }

    #[test]
    fn picks_deepest_containing_mount() {
        let mounts = [Path::new("/"), Path::new("/home"), Path::new("/home/ada/data"), Path::new("/boot")];
        assert_eq!(deepest_mount(Path::new("/home/ada/src"), mounts), Some(1));
        assert_eq!(deepest_mount(Path::new("/home/ada/data/x"), mounts), Some(2));
        assert_eq!(deepest_mount(Path::new("/usr"), mounts), Some(0));
    }

    #[test]
    fn component_prefix_not_string_prefix() {
        let mounts = [Path::new("/"), Path::new("/home")];
        assert_eq!(deepest_mount(Path::new("/homework"), mounts), Some(0));
        assert_eq!(deepest_mount(Path::new("/x"), [Path::new("/y")]), None);
    }

    #[test]
    fn reads_sysfs_frequency_as_ghz() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cpuinfo_max_freq");
        std::fs::write(&file, "4500000\n").unwrap();
        assert_eq!(sysfs_freq(&file), Some(Value::Float(4.5)));
        assert_eq!(sysfs_freq(&dir.path().join("missing")), None);
    }

    #[test]
    fn ram_values_are_mib_floats() {
        let mut sys = System::new();
        let members = ram_members(&mut sys);
        assert!(matches!(members["total"], Value::Float(t) if t > 0.0));
        assert_eq!(members.len(), 6);
    }
}
