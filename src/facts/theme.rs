use super::insert_or_unknown;
use crate::registry::{Members, Toolkit};
use log::debug;
use std::path::PathBuf;

const KEYS: [(&str, &str); 4] = [
    ("name", "gtk-theme-name"),
    ("icons", "gtk-icon-theme-name"),
    ("font", "gtk-font-name"),
    ("cursor", "gtk-cursor-theme-name"),
];

fn settings_file(toolkit: Toolkit) -> Option<PathBuf> {
    match toolkit {
        Toolkit::Gtk2 => dirs::home_dir().map(|home| home.join(".gtkrc-2.0")),
        Toolkit::Gtk3 => dirs::config_dir().map(|dir| dir.join("gtk-3.0").join("settings.ini")),
        Toolkit::Gtk4 => dirs::config_dir().map(|dir| dir.join("gtk-4.0").join("settings.ini")),
    }
}

/// Value of `key` in a GTK settings file. Handles both the ini form
/// (`key=value`) and the gtkrc form (`key = "value"`).
fn setting(text: &str, key: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

fn members_from(text: &str) -> Members {
    let mut members = Members::new();
    for (member, key) in KEYS {
        insert_or_unknown(&mut members, member, setting(text, key));
    }
    members
}

pub(super) fn theme_members(toolkit: Toolkit) -> Members {
    let text = settings_file(toolkit)
        .and_then(|path| {
            debug!("reading {}", path.display());
            std::fs::read_to_string(path).ok()
        })
        .unwrap_or_default();
    members_from(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::UNKNOWN;
    use crate::registry::Value;

    #[test]
    fn reads_ini_settings() {
        let text = "[Settings]\ngtk-theme-name=Adwaita-dark\ngtk-icon-theme-name=Papirus\ngtk-font-name=Cantarell 11\n";
        let members = members_from(text);
        assert_eq!(members["name"], Value::from("Adwaita-dark"));
        assert_eq!(members["icons"], Value::from("Papirus"));
        assert_eq!(members["font"], Value::from("Cantarell 11"));
        assert_eq!(members["cursor"], Value::from(UNKNOWN));
    }

    #[test]
    fn reads_quoted_gtkrc_settings() {
        let text = "# written by lxappearance\ngtk-theme-name = \"Arc\"\ngtk-cursor-theme-name=\"Bibata\"\n";
        assert_eq!(setting(text, "gtk-theme-name").as_deref(), Some("Arc"));
        assert_eq!(setting(text, "gtk-cursor-theme-name").as_deref(), Some("Bibata"));
    }

    #[test]
    fn ignores_comments_and_prefix_keys() {
        let text = "# gtk-theme-name=Old\ngtk-theme-name-extra=Nope\n";
        assert_eq!(setting(text, "gtk-theme-name"), None);
    }

    #[test]
    fn empty_file_is_all_unknown() {
        let members = members_from("");
        assert_eq!(members.len(), 4);
        assert!(members.values().all(|v| *v == Value::from(UNKNOWN)));
    }
}
