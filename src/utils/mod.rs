pub mod ip;

/// Length of generated logger ids.
pub const LOGGER_ID_LENGTH: usize = 7;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    // 随机选择字母和数字
    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    // 生成指定长度的随机字符串
    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

/// Fresh short identifier for a new logger.
pub fn generate_logger_id() -> String {
    generate_random_code(LOGGER_ID_LENGTH)
}

/// Opaque capability token, used for API keys and dashboard tokens.
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().to_string()
}
