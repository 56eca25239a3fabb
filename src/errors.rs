use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpShorterError {
    Validation(String),
    Conflict(String),
    InvalidApiKey(String),
    NotFound(String),
    DuplicateIdentifier(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Delivery(String),
    MailConfig(String),
}

impl IpShorterError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            IpShorterError::Validation(_) => "E001",
            IpShorterError::Conflict(_) => "E002",
            IpShorterError::InvalidApiKey(_) => "E003",
            IpShorterError::NotFound(_) => "E004",
            IpShorterError::DuplicateIdentifier(_) => "E005",
            IpShorterError::DatabaseConfig(_) => "E006",
            IpShorterError::DatabaseConnection(_) => "E007",
            IpShorterError::DatabaseOperation(_) => "E008",
            IpShorterError::Delivery(_) => "E009",
            IpShorterError::MailConfig(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            IpShorterError::Validation(_) => "Validation Error",
            IpShorterError::Conflict(_) => "Conflict",
            IpShorterError::InvalidApiKey(_) => "Invalid ApiKey",
            IpShorterError::NotFound(_) => "Resource Not Found",
            IpShorterError::DuplicateIdentifier(_) => "Duplicate Identifier",
            IpShorterError::DatabaseConfig(_) => "Database Configuration Error",
            IpShorterError::DatabaseConnection(_) => "Database Connection Error",
            IpShorterError::DatabaseOperation(_) => "Database Operation Error",
            IpShorterError::Delivery(_) => "Delivery Error",
            IpShorterError::MailConfig(_) => "Mail Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            IpShorterError::Validation(msg)
            | IpShorterError::Conflict(msg)
            | IpShorterError::InvalidApiKey(msg)
            | IpShorterError::NotFound(msg)
            | IpShorterError::DuplicateIdentifier(msg)
            | IpShorterError::DatabaseConfig(msg)
            | IpShorterError::DatabaseConnection(msg)
            | IpShorterError::DatabaseOperation(msg)
            | IpShorterError::Delivery(msg)
            | IpShorterError::MailConfig(msg) => msg,
        }
    }

    /// HTTP status used when the error reaches a client.
    ///
    /// Every client-visible failure is a 400; no structured error codes are exposed.
    pub fn http_status(&self) -> StatusCode {
        match self {
            IpShorterError::DatabaseConfig(_) | IpShorterError::MailConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for IpShorterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for IpShorterError {}

// 便捷的构造函数
impl IpShorterError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        IpShorterError::Validation(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        IpShorterError::Conflict(msg.into())
    }

    pub fn invalid_api_key<T: Into<String>>(msg: T) -> Self {
        IpShorterError::InvalidApiKey(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        IpShorterError::NotFound(msg.into())
    }

    pub fn duplicate_identifier<T: Into<String>>(msg: T) -> Self {
        IpShorterError::DuplicateIdentifier(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        IpShorterError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        IpShorterError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        IpShorterError::DatabaseOperation(msg.into())
    }

    pub fn delivery<T: Into<String>>(msg: T) -> Self {
        IpShorterError::Delivery(msg.into())
    }

    pub fn mail_config<T: Into<String>>(msg: T) -> Self {
        IpShorterError::MailConfig(msg.into())
    }
}

impl From<sea_orm::DbErr> for IpShorterError {
    fn from(err: sea_orm::DbErr) -> Self {
        IpShorterError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for IpShorterError {
    fn from(err: serde_json::Error) -> Self {
        IpShorterError::DatabaseOperation(format!("serialization failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, IpShorterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        let errors = [
            IpShorterError::validation("url is required"),
            IpShorterError::conflict("url already claimed"),
            IpShorterError::invalid_api_key("nope"),
            IpShorterError::not_found("missing"),
            IpShorterError::database_operation("boom"),
            IpShorterError::delivery("smtp down"),
        ];
        for err in errors {
            assert_eq!(err.http_status(), StatusCode::BAD_REQUEST, "{}", err);
        }
    }

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            IpShorterError::validation(""),
            IpShorterError::conflict(""),
            IpShorterError::invalid_api_key(""),
            IpShorterError::not_found(""),
            IpShorterError::duplicate_identifier(""),
            IpShorterError::database_config(""),
            IpShorterError::database_connection(""),
            IpShorterError::database_operation(""),
            IpShorterError::delivery(""),
            IpShorterError::mail_config(""),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = IpShorterError::not_found("logger abc not found");
        assert_eq!(err.to_string(), "Resource Not Found: logger abc not found");
        assert_eq!(err.message(), "logger abc not found");
    }
}
