/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use mediator::ResolveError;
use std::fmt::{Display, Formatter};
use url::Url;

/// The absolute http(s) address carried in the path of a `restlet:` URI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpAddress {
    pub secure: bool,
    pub host: String,
    pub port: u16,
    /// Request path, always starting with `/`.
    pub path: String,
}

impl HttpAddress {
    pub fn parse(raw: &str, sanitized_uri: &str) -> Result<Self, ResolveError> {
        let malformed = |reason: String| ResolveError::MalformedUri {
            uri: sanitized_uri.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|err| malformed(format!("invalid address: {err}")))?;
        let secure = match url.scheme() {
            "http" => false,
            "https" => true,
            other => return Err(malformed(format!("unsupported protocol '{other}'"))),
        };
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| malformed("address has no host".to_string()))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| malformed("address has no port".to_string()))?;

        Ok(Self {
            secure,
            host,
            port,
            path: url.path().to_string(),
        })
    }

    /// `host:port`, suitable for binding and connecting.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether a request path addresses this endpoint; a trailing slash is ignored.
    pub fn matches_path(&self, path: &str) -> bool {
        trim_slash(path) == trim_slash(&self.path)
    }
}

impl Display for HttpAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let protocol = if self.secure { "https" } else { "http" };
        write!(f, "{protocol}://{}:{}{}", self.host, self.port, self.path)
    }
}

fn trim_slash(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::HttpAddress;
    use mediator::ResolveError;

    #[test]
    fn parses_https_address_with_default_port() {
        let address = HttpAddress::parse("https://localhost/users/", "restlet:x").unwrap();

        assert!(address.secure);
        assert_eq!(address.port, 443);
        assert_eq!(address.authority(), "localhost:443");
        assert!(address.matches_path("/users"));
        assert!(address.matches_path("/users/"));
        assert!(!address.matches_path("/users/1"));
    }

    #[test]
    fn root_path_matches_with_or_without_slash() {
        let address = HttpAddress::parse("http://127.0.0.1:8080", "restlet:x").unwrap();

        assert_eq!(address.path, "/");
        assert!(address.matches_path("/"));
        assert_eq!(address.to_string(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn rejects_other_protocols() {
        let error = HttpAddress::parse("ftp://localhost/files", "restlet:ftp://localhost/files")
            .unwrap_err();

        assert!(matches!(error, ResolveError::MalformedUri { ref reason, .. } if reason.contains("ftp")));
    }
}
