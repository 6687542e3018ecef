use super::{insert, insert_or_unknown};
use crate::display::REMOVE_LINE;
use crate::registry::Members;
use std::path::Path;

const WINDOW_MANAGERS: &[&str] = &[
    "bspwm", "dwm", "i3", "sway", "hyprland", "Hyprland", "awesome", "openbox", "fluxbox",
    "herbstluftwm", "xmonad", "qtile", "spectrwm", "icewm", "river", "niri", "labwc",
    "wayfire", "kwin_x11", "kwin_wayland", "mutter", "gnome-shell", "xfwm4", "marco",
    "muffin", "enlightenment", "fvwm", "jwm", "cwm", "leftwm", "dwl", "weston",
];

/// Terminals that announce themselves through an environment variable.
const TERMINAL_MARKERS: &[(&str, &str)] = &[
    ("KITTY_WINDOW_ID", "kitty"),
    ("ALACRITTY_WINDOW_ID", "alacritty"),
    ("WEZTERM_EXECUTABLE", "wezterm"),
    ("KONSOLE_VERSION", "konsole"),
    ("GNOME_TERMINAL_SCREEN", "gnome-terminal"),
    ("TILIX_ID", "tilix"),
];

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn shell_name(shell_path: &str) -> Option<String> {
    Path::new(shell_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn de_name(env: impl Fn(&str) -> Option<String>) -> Option<String> {
    env("XDG_CURRENT_DESKTOP")
        .and_then(|desktops| desktops.split(':').next().map(str::to_string))
        .filter(|de| !de.is_empty())
        .or_else(|| env("DESKTOP_SESSION"))
}

fn term_name(env: impl Fn(&str) -> Option<String>) -> Option<String> {
    if let Some(program) = env("TERM_PROGRAM") {
        return Some(program);
    }
    TERMINAL_MARKERS
        .iter()
        .find(|(var, _)| env(var).is_some())
        .map(|(_, name)| name.to_string())
        .or_else(|| env("TERM"))
}

/// First running process whose name is a known window manager.
fn wm_name(proc_root: &Path) -> Option<String> {
    let entries = std::fs::read_dir(proc_root).ok()?;
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|entry| super::read_first_line(entry.path().join("comm")))
        .find(|comm| WINDOW_MANAGERS.contains(&comm.as_str()))
}

pub(super) fn user_members() -> Members {
    let shell_path = env("SHELL");
    let detected = |value: Option<String>| value.unwrap_or_else(|| REMOVE_LINE.to_string());

    let mut members = Members::new();
    insert(&mut members, "name", whoami::username());
    insert_or_unknown(
        &mut members,
        "shell_name",
        shell_path.as_deref().and_then(shell_name),
    );
    insert_or_unknown(&mut members, "shell_path", shell_path);
    insert(&mut members, "de_name", detected(de_name(env)));
    insert(&mut members, "wm_name", detected(wm_name(Path::new("/proc"))));
    insert(&mut members, "term_name", detected(term_name(env)));
    members
}
