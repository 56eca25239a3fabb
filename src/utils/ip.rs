//! 请求方 IP 提取
//!
//! 优先使用 `X-Forwarded-For` 代理链，其次是连接的对端地址，
//! 都拿不到时返回 `"unknown"`，不会报错。

use actix_web::HttpRequest;

/// Sentinel recorded when no address information is available.
pub const UNKNOWN_IP: &str = "unknown";

/// Split an `X-Forwarded-For` value into its hops.
pub fn parse_forwarded_chain(header: &str) -> Vec<String> {
    header
        .split(',')
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(String::from)
        .collect()
}

/// Every address observed for this request, client first.
pub fn extract_requester_ips(req: &HttpRequest) -> Vec<String> {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .map(parse_forwarded_chain)
        .unwrap_or_default();
    if !forwarded.is_empty() {
        return forwarded;
    }

    match req.peer_addr() {
        Some(addr) => vec![addr.ip().to_string()],
        None => vec![UNKNOWN_IP.to_string()],
    }
}
