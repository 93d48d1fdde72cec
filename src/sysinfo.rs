//! Read-only host reports from mounted `/proc` and emhttp files.
//!
//! Every report is plain text. Unreadable files are described in the
//! report instead of failing the command.

use crate::config::SysinfoSettings;
use clap::ValueEnum;
use std::io::ErrorKind;
use std::path::Path;

const MEMINFO_KEYS: &[&str] = &[
    "MemTotal",
    "MemFree",
    "MemAvailable",
    "SwapTotal",
    "SwapFree",
    "Cached",
    "Buffers",
];

/// Which report to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Mdstat,
    Loadavg,
    Meminfo,
    Disks,
    All,
}

/// Produce the report for `section`.
pub fn report(section: Section, settings: &SysinfoSettings) -> String {
    match section {
        Section::Mdstat => mdstat(settings),
        Section::Loadavg => loadavg(settings),
        Section::Meminfo => meminfo(settings),
        Section::Disks => disks(settings),
        Section::All => [
            mdstat(settings),
            loadavg(settings),
            meminfo(settings),
            disks(settings),
        ]
        .join("\n"),
    }
}

/// Read a report source, describing failures as text.
fn read_source(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => format!("File not found: {}", path.display()),
        ErrorKind::PermissionDenied => format!("Permission denied: {}", path.display()),
        _ => format!("Error reading {}: {}", path.display(), e),
    })
}

fn section(title: &str, body: &str) -> String {
    format!("=== {} ===\n{}\n", title, body.trim_end())
}

fn mdstat(settings: &SysinfoSettings) -> String {
    let body = read_source(&settings.host_proc.join("mdstat")).unwrap_or_else(|e| e);
    section("Array Status (mdstat)", &body)
}

fn loadavg(settings: &SysinfoSettings) -> String {
    let body = match read_source(&settings.host_proc.join("loadavg")) {
        Ok(content) => format_loadavg(&content),
        Err(e) => e,
    };
    section("Load Average", &body)
}

fn format_loadavg(content: &str) -> String {
    let parts: Vec<&str> = content.split_whitespace().collect();
    match parts.as_slice() {
        [one, five, fifteen, ..] => format!("1min: {}, 5min: {}, 15min: {}", one, five, fifteen),
        _ => content.trim().to_string(),
    }
}

fn meminfo(settings: &SysinfoSettings) -> String {
    let body = match read_source(&settings.host_proc.join("meminfo")) {
        Ok(content) => filter_meminfo(&content),
        Err(e) => e,
    };
    section("Memory Info", &body)
}

fn filter_meminfo(content: &str) -> String {
    content
        .lines()
        .filter(|line| MEMINFO_KEYS.iter().any(|key| line.contains(key)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn disks(settings: &SysinfoSettings) -> String {
    let body = match read_source(&settings.host_emhttp.join("disks.ini")) {
        Ok(content) => format_disks(&content),
        Err(e) => e,
    };
    section("Disk Status", &body)
}

/// One `[section]` of `disks.ini`.
#[derive(Debug, Default)]
struct DiskEntry {
    id: String,
    fields: Vec<(String, String)>,
}

impl DiskEntry {
    fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn summary(&self) -> String {
        let size_kib: u64 = self.get("size").and_then(|s| s.parse().ok()).unwrap_or(0);
        format!(
            "  {}: {} - {}, {}°C, {}GB",
            self.id,
            self.get("name").unwrap_or(self.id.as_str()),
            self.get("status").unwrap_or("unknown"),
            self.get("temp").unwrap_or("*"),
            size_kib / 1024 / 1024
        )
    }
}

fn parse_disks_ini(content: &str) -> Vec<DiskEntry> {
    let mut entries = Vec::new();
    let mut current: Option<DiskEntry> = None;

    for line in content.lines().map(str::trim) {
        if let Some(id) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            entries.extend(current.take());
            current = Some(DiskEntry {
                id: id.trim_matches('"').to_string(),
                ..Default::default()
            });
        } else if let Some((key, value)) = line.split_once('=')
            && let Some(entry) = current.as_mut()
        {
            entry
                .fields
                .push((key.trim().to_string(), value.trim().trim_matches('"').to_string()));
        }
    }
    entries.extend(current);

    // Sections without any fields carry nothing to report.
    entries.retain(|e| !e.fields.is_empty());
    entries
}

fn format_disks(content: &str) -> String {
    parse_disks_ini(content)
        .iter()
        .map(DiskEntry::summary)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn host() -> (TempDir, SysinfoSettings) {
        let temp_dir = TempDir::new().unwrap();
        let settings = SysinfoSettings {
            host_proc: temp_dir.path().join("proc"),
            host_emhttp: temp_dir.path().join("emhttp"),
        };
        std::fs::create_dir_all(&settings.host_proc).unwrap();
        std::fs::create_dir_all(&settings.host_emhttp).unwrap();
        (temp_dir, settings)
    }

    #[test]
    fn test_loadavg_formatting() {
        let (_dir, settings) = host();
        std::fs::write(settings.host_proc.join("loadavg"), "0.52 0.58 0.59 1/467 12345\n").unwrap();

        assert_eq!(
            report(Section::Loadavg, &settings),
            "=== Load Average ===\n1min: 0.52, 5min: 0.58, 15min: 0.59\n"
        );
    }

    #[test]
    fn test_short_loadavg_is_shown_raw() {
        assert_eq!(format_loadavg("0.52 0.58\n"), "0.52 0.58");
    }

    #[test]
    fn test_meminfo_keeps_selected_keys() {
        let content = "MemTotal:       32768000 kB\nMemFree:  100 kB\nActive:  5 kB\nSwapCached: 0 kB\nBuffers: 7 kB\n";
        assert_eq!(
            filter_meminfo(content),
            "MemTotal:       32768000 kB\nMemFree:  100 kB\nSwapCached: 0 kB\nBuffers: 7 kB"
        );
    }

    #[test]
    fn test_missing_file_reported_as_text() {
        let (_dir, settings) = host();

        let out = report(Section::Meminfo, &settings);
        assert!(out.starts_with("=== Memory Info ===\nFile not found: "));
        assert!(out.contains("meminfo"));

        // The error text must not be mistaken for load figures.
        let out = report(Section::Loadavg, &settings);
        assert!(out.contains("File not found"));
        assert!(!out.contains("1min:"));
    }

    #[test]
    fn test_disks_ini_summary() {
        let content = r#"
[empty]
["disk1"]
name="disk1"
status="DISK_OK"
temp="34"
size="3907018532"
[parity]
status="DISK_OK"
[cache]
name="cache"
size="junk"
"#;
        let out = format_disks(content);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "  disk1: disk1 - DISK_OK, 34°C, 3726GB");
        assert_eq!(lines[1], "  parity: parity - DISK_OK, *°C, 0GB");
        assert_eq!(lines[2], "  cache: cache - unknown, *°C, 0GB");
    }

    #[test]
    fn test_all_sections_in_order() {
        let (_dir, settings) = host();
        std::fs::write(settings.host_proc.join("mdstat"), "md1 : active\n").unwrap();

        let out = report(Section::All, &settings);
        let mdstat = out.find("=== Array Status (mdstat) ===").unwrap();
        let load = out.find("=== Load Average ===").unwrap();
        let mem = out.find("=== Memory Info ===").unwrap();
        let disks = out.find("=== Disk Status ===").unwrap();

        assert!(mdstat < load && load < mem && mem < disks);
        assert!(out.contains("md1 : active"));
    }
}
