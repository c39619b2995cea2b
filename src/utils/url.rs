//! URL checks for work list entries

use url::Url;

/// Check if the string is an absolute http(s) URL
pub fn is_http_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

/// Proxy URLs the engine understands (`http`, `https`, `socks4`, `socks4a`, `socks5`, `socks5h`)
pub fn is_proxy_url(proxy: &str) -> bool {
    match Url::parse(proxy) {
        Ok(parsed) => {
            matches!(
                parsed.scheme(),
                "http" | "https" | "socks4" | "socks4a" | "socks5" | "socks5h"
            ) && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_http_url("http://example.com/video"));
        assert!(!is_http_url("ftp://example.com/file"));
        assert!(!is_http_url("www.youtube.com/watch?v=x"));
        assert!(!is_http_url("not a url"));
    }

    #[test]
    fn test_is_proxy_url() {
        assert!(is_proxy_url("socks5://127.0.0.1:1080"));
        assert!(is_proxy_url("http://proxy:8080"));
        assert!(!is_proxy_url("127.0.0.1:1080"));
        assert!(!is_proxy_url("ftp://proxy"));
    }
}
