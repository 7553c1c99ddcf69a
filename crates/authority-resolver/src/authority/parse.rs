//! Structural validation of authority URLs and tenant extraction.

use url::Url;

use crate::error::{AuthorityError, Result};

/// Components of a structurally valid authority URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedAuthority {
    /// `https://{host}/{tenant}`
    pub url: Url,
    /// Hostname plus explicit non-default port
    pub host: String,
    /// Hostname only
    pub hostname: String,
    /// First non-empty path segment
    pub tenant: String,
}

/// Validate `raw` and reduce it to host and tenant.
///
/// Everything after the tenant segment, user info and fragments are discarded.
pub(crate) fn parse_authority_url(raw: &str) -> Result<ParsedAuthority> {
    let url = validate_authority_url(raw)?;

    let hostname = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| AuthorityError::InvalidAuthorityUrl(format!("missing host: {raw}")))?
        .to_string();

    let host = match url.port() {
        Some(port) => format!("{hostname}:{port}"),
        None => hostname.clone(),
    };

    let tenant =
        parse_tenant(&url).ok_or_else(|| AuthorityError::TenantNotFound(raw.to_string()))?;

    let normalized = Url::parse(&format!("https://{host}/{tenant}"))
        .map_err(|e| AuthorityError::InvalidAuthorityUrl(format!("{raw}: {e}")))?;

    Ok(ParsedAuthority {
        url: normalized,
        host,
        hostname,
        tenant,
    })
}

fn validate_authority_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| AuthorityError::InvalidAuthorityUrl(format!("{raw}: {e}")))?;

    if url.scheme() != "https" {
        return Err(AuthorityError::InvalidAuthorityUrl(format!(
            "the authority url must be an https endpoint: {raw}"
        )));
    }

    // A bare `?` carries no data and is dropped by normalization
    if url.query().is_some_and(|query| !query.is_empty()) {
        return Err(AuthorityError::InvalidAuthorityUrl(format!(
            "the authority url must not have a query string: {raw}"
        )));
    }

    Ok(url)
}

fn parse_tenant(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}
