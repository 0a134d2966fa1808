//! HTML pages for the releases index.

use crate::provider::Release;

const PAGE_TITLE: &str = "OpenTofu releases";

/// Link target of the release list, used as the parent of every detail page.
pub const RELEASES_ROOT: &str = "/releases/";

/// Renders the index of all releases, one link per release in input order.
pub fn release_list_page(releases: &[Release]) -> String {
    let items: String = releases
        .iter()
        .map(|release| {
            let version = escape(release.version());
            format!(r#"<li><a href="/releases/{0}">{0}</a></li>"#, version)
        })
        .collect();
    page(&items)
}

/// Renders the asset list of a single release, preceded by a parent link.
pub fn release_detail_page(release: &Release) -> String {
    let mut items = format!(r#"<li><a href="{}">../</a></li>"#, RELEASES_ROOT);
    for asset in &release.assets {
        items.push_str(&format!(
            r#"<li><a href="{}">{}</a></li>"#,
            escape(&asset.download_url),
            escape(&asset.name)
        ));
    }
    page(&items)
}

fn page(items: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{}</title></head><body><ul>{}</ul></body></html>",
        PAGE_TITLE, items
    )
}

/// Escapes text for use in HTML content and double-quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
