//! Analysis-file link rewriting.

use crate::config::NotifySettings;

/// Rewrite a link under a recognised analysis prefix to a public URL.
///
/// `/state/analysis/report.md` becomes
/// `{base_url}/{analysis_path}/report.md` when a base URL is configured.
/// Without a base URL, or for links outside every prefix, the link is
/// returned unchanged.
pub fn rewrite_link(link: &str, settings: &NotifySettings) -> String {
    let Some(base_url) = settings.base_url.as_deref().filter(|b| !b.is_empty()) else {
        return link.to_string();
    };

    settings
        .link_prefixes
        .iter()
        .find_map(|prefix| link.strip_prefix(prefix.as_str()))
        .map(|filename| {
            format!(
                "{}/{}/{}",
                base_url.trim_end_matches('/'),
                settings.effective_analysis_path().trim_matches('/'),
                filename
            )
        })
        .unwrap_or_else(|| link.to_string())
}
