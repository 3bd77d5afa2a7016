//! Per-request context consulted by host selection.

use std::sync::LazyLock;

use regex::Regex;

/// What the host selector needs to know about the inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// The request arrived over https.
    pub ssl: bool,
    /// `User-Agent` header, if any.
    pub user_agent: Option<String>,
    /// `Accept-Encoding` header, if any.
    pub accept_encoding: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain https request with no headers.
    pub fn https() -> Self {
        Self {
            ssl: true,
            ..Self::default()
        }
    }

    /// Build from a protocol string (`"https://"`, `"http"`) and header pairs.
    ///
    /// Header names are matched case-insensitively.
    pub fn from_headers<'a>(
        protocol: &str,
        headers: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut ctx = Self {
            ssl: protocol.trim_end_matches("://").eq_ignore_ascii_case("https"),
            ..Self::default()
        };
        for (name, value) in headers {
            if name.eq_ignore_ascii_case("user-agent") {
                ctx.user_agent = Some(value.to_string());
            } else if name.eq_ignore_ascii_case("accept-encoding") {
                ctx.accept_encoding = Some(value.to_string());
            }
        }
        ctx
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_accept_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.accept_encoding = Some(encoding.into());
        self
    }

    /// Whether the client can take gzip-encoded assets.
    ///
    /// Requires `gzip` in `Accept-Encoding`. Netscape 4 (`Mozilla/4...`)
    /// mishandles compressed assets; IE sends the same prefix but also an
    /// `MSIE` token and is fine.
    pub fn accepts_gzip(&self) -> bool {
        let declared = self
            .accept_encoding
            .as_deref()
            .is_some_and(|enc| enc.to_ascii_lowercase().contains("gzip"));
        if !declared {
            return false;
        }

        let ua = self.user_agent.as_deref().unwrap_or("");
        !ua.starts_with("Mozilla/4") || has_msie_token(ua)
    }
}

/// `MSIE` as a standalone token (ASCII word boundaries).
fn has_msie_token(ua: &str) -> bool {
    static MSIE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?-u:\b)MSIE(?-u:\b)").unwrap());
    MSIE_RE.is_match(ua)
}
