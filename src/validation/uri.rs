//! URI syntax checks for component and plugin locations
//!
//! Values starting with `http` must be absolute request URIs. Anything else is
//! parsed leniently so relative paths like `deploy/k8s.yaml` pass.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("parse \"{uri}\": {issue}")]
pub struct UriError {
    pub uri: String,
    pub issue: UriIssue,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UriIssue {
    #[error("empty url")]
    Empty,

    #[error("invalid control character in URL")]
    ControlCharacter,

    #[error("missing protocol scheme")]
    MissingScheme,

    #[error("invalid URI for request")]
    NotRequestUri,

    #[error("first path segment in URL cannot contain colon")]
    ColonInFirstSegment,

    #[error("invalid URL escape \"{0}\"")]
    InvalidEscape(String),

    #[error("invalid port \"{0}\" after host")]
    InvalidPort(String),

    #[error("missing ']' in host")]
    UnclosedIpv6Host,

    #[error("invalid character \"{0}\" in host name")]
    InvalidHostCharacter(char),
}

pub fn validate_uri(uri: &str) -> Result<(), UriError> {
    let result = if uri.starts_with("http") {
        parse(uri, true)
    } else {
        let (rest, fragment) = uri.split_once('#').unwrap_or((uri, ""));
        parse(rest, false).and_then(|()| check_escapes(fragment))
    };

    result.map_err(|issue| UriError {
        uri: uri.to_string(),
        issue,
    })
}

fn parse(raw: &str, via_request: bool) -> Result<(), UriIssue> {
    if raw.chars().any(|c| c < ' ' || c == '\x7f') {
        return Err(UriIssue::ControlCharacter);
    }
    if raw.is_empty() && via_request {
        return Err(UriIssue::Empty);
    }
    if raw == "*" {
        return Ok(());
    }

    let (scheme, rest) = split_scheme(raw)?;
    let rest = match rest.split_once('?') {
        Some((path, _query)) => path,
        None => rest,
    };

    if !rest.starts_with('/') {
        if !scheme.is_empty() {
            // opaque, e.g. "mailto:someone"
            return Ok(());
        }
        if via_request {
            return Err(UriIssue::NotRequestUri);
        }
        let first_segment = rest.split('/').next().unwrap_or_default();
        if first_segment.contains(':') {
            return Err(UriIssue::ColonInFirstSegment);
        }
    }

    let mut path = rest;
    let has_authority = !scheme.is_empty() || (!via_request && !rest.starts_with("///"));
    if has_authority && rest.starts_with("//") {
        let authority_and_path = &rest[2..];
        let end = authority_and_path.find('/').unwrap_or(authority_and_path.len());
        check_authority(&authority_and_path[..end])?;
        path = &authority_and_path[end..];
    }

    check_escapes(path)
}

fn split_scheme(raw: &str) -> Result<(&str, &str), UriIssue> {
    for (i, c) in raw.char_indices() {
        match c {
            'a'..='z' | 'A'..='Z' => {}
            '0'..='9' | '+' | '-' | '.' => {
                if i == 0 {
                    return Ok(("", raw));
                }
            }
            ':' => {
                if i == 0 {
                    return Err(UriIssue::MissingScheme);
                }
                return Ok((&raw[..i], &raw[i + 1..]));
            }
            _ => return Ok(("", raw)),
        }
    }
    Ok(("", raw))
}

fn check_authority(authority: &str) -> Result<(), UriIssue> {
    let host = match authority.rfind('@') {
        Some(at) => &authority[at + 1..],
        None => authority,
    };

    let port = if let Some(stripped) = host.strip_prefix('[') {
        let close = stripped.find(']').ok_or(UriIssue::UnclosedIpv6Host)?;
        &stripped[close + 1..]
    } else {
        match host.rfind(':') {
            Some(colon) => &host[colon..],
            None => "",
        }
    };

    if !port.is_empty() && !is_valid_port(port) {
        return Err(UriIssue::InvalidPort(port.to_string()));
    }

    if let Some(bad) = host
        .chars()
        .find(|c| matches!(c, ' ' | '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`'))
    {
        return Err(UriIssue::InvalidHostCharacter(bad));
    }

    check_escapes(host)
}

fn is_valid_port(port: &str) -> bool {
    port.strip_prefix(':')
        .is_some_and(|digits| digits.chars().all(|c| c.is_ascii_digit()))
}

fn check_escapes(s: &str) -> Result<(), UriIssue> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                let end = (i + 3).min(bytes.len());
                let escape = String::from_utf8_lossy(&bytes[i..end]).into_owned();
                return Err(UriIssue::InvalidEscape(escape));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
