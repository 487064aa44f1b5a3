//! Security - Input hygiene
//!
//! 用户输入清洗与校验。全部是纯函数，不做任何 I/O（包括 DNS 解析）

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// 消息最大长度（字节）
pub const MAX_INPUT_LEN: usize = 2000;

const INPUT_STRIPPED: &[char] = &['<', '>', '{', '}', '[', ']', '(', ')', '&', '|', ';'];
const PROFANITY: &[&str] = &["badword1", "badword2", "badword3"];

/// 在不切断 UTF-8 字符的前提下截断到 `max_len` 字节以内
fn truncate_bytes(s: &mut String, max_len: usize) {
    if s.len() <= max_len {
        return;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// 去掉可能有害的字符，限制长度并去除首尾空白
pub fn sanitize_input(input: &str) -> String {
    let mut sanitized: String = input
        .chars()
        .filter(|c| !INPUT_STRIPPED.contains(c))
        .collect();
    truncate_bytes(&mut sanitized, MAX_INPUT_LEN);
    sanitized.trim().to_string()
}

/// Discord ID: 17-20 位数字
pub fn is_valid_discord_id(id: &str) -> bool {
    (17..=20).contains(&id.len()) && id.bytes().all(|b| b.is_ascii_digit())
}

/// 简单的敏感词检查（忽略大小写）
pub fn contains_profanity(text: &str) -> bool {
    let lower = text.to_lowercase();
    PROFANITY.iter().any(|word| lower.contains(word))
}

/// 校验媒体来源 URL
///
/// 只接受 http/https/ftp，拒绝 localhost 以及回环、私有、链路本地 IP 字面量。
/// 主机名不做解析，解析后的地址由下载方自行检查。
pub fn validate_url(input: &str) -> bool {
    if input.chars().any(char::is_whitespace) {
        return false;
    }
    let Ok(parsed) = Url::parse(input) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https" | "ftp") {
        return false;
    }

    match parsed.host() {
        None => false,
        Some(Host::Domain(domain)) => !domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => !is_internal_v4(&ip),
        Some(Host::Ipv6(ip)) => !is_internal_v6(&ip),
    }
}

fn is_internal_v4(ip: &Ipv4Addr) -> bool {
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_multicast()
}

fn is_internal_v6(ip: &Ipv6Addr) -> bool {
    let segments = ip.segments();
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    // fe80::/10 link-local, ff02::/16 link-local multicast
    if (segments[0] & 0xffc0) == 0xfe80 || segments[0] == 0xff02 {
        return true;
    }
    // fc00::/7 unique local
    if (segments[0] & 0xfe00) == 0xfc00 {
        return true;
    }
    match ip.to_ipv4_mapped() {
        Some(v4) => is_internal(&IpAddr::V4(v4)),
        None => false,
    }
}

fn is_internal(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_internal_v4(v4),
        IpAddr::V6(v6) => is_internal_v6(v6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_input() {
        let input = "<script>alert('xss')</script>Hello & welcome;";
        assert_eq!(sanitize_input(input), "scriptalert'xss'/scriptHello  welcome");
        assert_eq!(sanitize_input("  /play  "), "/play");
    }

    #[test]
    fn test_sanitize_input_limits_length() {
        let long = "a".repeat(2500);
        assert_eq!(sanitize_input(&long).len(), MAX_INPUT_LEN);

        // 多字节字符不会被截断成非法 UTF-8
        let wide = "é".repeat(1500);
        let sanitized = sanitize_input(&wide);
        assert!(sanitized.len() <= MAX_INPUT_LEN);
        assert!(sanitized.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_discord_id() {
        assert!(is_valid_discord_id("123456789012345678"));
        assert!(!is_valid_discord_id("1234"));
        assert!(!is_valid_discord_id("12345678901234567a"));
        assert!(!is_valid_discord_id("123456789012345678901"));
    }

    #[test]
    fn test_profanity() {
        assert!(contains_profanity("this has BadWord2 inside"));
        assert!(!contains_profanity("perfectly fine"));
    }

    #[test]
    fn test_validate_url_accepts_public_urls() {
        assert!(validate_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(validate_url("http://example.com/audio.mp3"));
        assert!(validate_url("ftp://files.example.com/a.flac"));
        assert!(validate_url("https://8.8.8.8/x"));
    }

    #[test]
    fn test_validate_url_rejects_internal_targets() {
        assert!(!validate_url("http://localhost:8080"));
        assert!(!validate_url("http://127.0.0.1/"));
        assert!(!validate_url("http://10.1.2.3/"));
        assert!(!validate_url("http://192.168.1.10/"));
        assert!(!validate_url("http://169.254.169.254/latest/meta-data"));
        assert!(!validate_url("http://[::1]/"));
        assert!(!validate_url("http://[fe80::1]/"));
        assert!(!validate_url("http://[::ffff:10.0.0.1]/"));
    }

    #[test]
    fn test_validate_url_rejects_malformed() {
        assert!(!validate_url("not a url"));
        assert!(!validate_url("javascript:alert(1)"));
        assert!(!validate_url("file:///etc/passwd"));
        assert!(!validate_url("https://"));
    }
}
