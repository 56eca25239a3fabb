use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址和端口
/// - database: 数据库连接配置
/// - mail: API key 发送所用的 SMTP 配置
/// - cors: 跨域配置
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：旧版扁平 ENV (PORT, MAIL, ...) > IPS__* ENV > config.toml > 默认值
    /// ENV 前缀：IPS，分隔符：__
    /// 示例：IPS__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("IPS")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply the flat environment variables the service has always honoured.
    ///
    /// `lookup` is injected so tests don't have to mutate the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(port) = non_empty("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => eprintln!("[WARN] Ignoring invalid PORT value: {}", port),
            }
        }
        if let Some(user) = non_empty("MAIL") {
            self.mail.username = Some(user);
        }
        if let Some(password) = non_empty("MAIL_PSW") {
            self.mail.password = Some(password);
        }
        if let Some(user) = non_empty("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = non_empty("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(host) = non_empty("DB_HOST") {
            self.database.host = host;
        }
        if let Some(name) = non_empty("DB_NAME") {
            self.database.name = name;
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// 数据库连接配置
///
/// `database_url` wins when set. Otherwise a URL is assembled from
/// `backend`/`user`/`password`/`host`/`name`, and with no host at all the
/// service falls back to a local SQLite file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_database_backend")]
    pub backend: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_database_name")]
    pub name: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        if !self.database_url.is_empty() {
            return self.database_url.clone();
        }

        if self.host.is_empty() {
            return default_sqlite_url();
        }

        let credentials = match (self.user.is_empty(), self.password.is_empty()) {
            (true, _) => String::new(),
            (false, true) => format!("{}@", self.user),
            (false, false) => format!("{}:{}@", self.user, self.password),
        };

        format!(
            "{}://{}{}/{}",
            self.backend, credentials, self.host, self.name
        )
    }
}

/// SMTP 配置
///
/// 未配置 `smtp_host` 或用户名时不发送真实邮件，只记录日志。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        !self.smtp_host.is_empty() && self.username.as_ref().is_some_and(|u| !u.is_empty())
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cors_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_methods")]
    pub allowed_methods: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8081
}

fn default_sqlite_url() -> String {
    "sqlite://ipshorter.db?mode=rwc".to_string()
}

fn default_database_backend() -> String {
    "postgres".to_string()
}

fn default_database_name() -> String {
    "ipshorter".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_use_tls() -> bool {
    true
}

fn default_from_address() -> String {
    "apikey@ipshorter.dev".to_string()
}

fn default_subject() -> String {
    "ApiKey | IPShorter".to_string()
}

fn default_cors_enabled() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_cors_methods() -> Vec<String> {
    vec!["GET".to_string(), "POST".to_string(), "DELETE".to_string()]
}

fn default_cors_max_age() -> usize {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            backend: default_database_backend(),
            user: String::new(),
            password: String::new(),
            host: String::new(),
            name: default_database_name(),
            pool_size: default_database_pool_size(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            use_tls: default_use_tls(),
            from_address: default_from_address(),
            subject: default_subject(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: default_cors_origins(),
            allowed_methods: default_cors_methods(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
