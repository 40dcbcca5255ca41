//! HTTP surface.
//!
//! Browser routes render HTML; `/api/*` routes speak JSON.

mod oauth;
mod run;
mod setup;

pub use oauth::*;
pub use run::*;
pub use setup::*;

use serde::Deserialize;

/// `?user_id=` query accepted by the trigger and setup routes.
#[derive(Debug, Default, Deserialize)]
pub struct TenantQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

impl TenantQuery {
    /// The tenant id, with blank values treated as absent.
    pub fn tenant(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Relative link to `path` for one tenant, with the id percent-encoded.
///
/// The result still needs `escape_html` before going into markup.
pub fn tenant_link(path: &str, tenant: &str) -> String {
    format!("{}?user_id={}", path, urlencoding::encode(tenant))
}
