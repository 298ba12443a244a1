//! 配置模块
//!
//! 从 JSON 配置文件加载服务配置，文件不存在时使用默认值。
//! 关键字段可通过环境变量覆盖（部署时不落盘密钥）。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub completion: CompletionConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 文件路径；为空时使用 ~/.toolthinker/toolthinker.db
    pub path: Option<String>,
}

/// 补全服务配置（OpenAI 兼容接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

/// 事务性邮件服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub from: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
            database: DatabaseConfig { path: None },
            completion: CompletionConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                api_key: None,
                model: "gpt-4o-mini".to_string(),
            },
            mail: MailConfig {
                enabled: false,
                endpoint: None,
                api_key: None,
                from: None,
            },
        }
    }
}

impl Config {
    /// 数据库文件路径；未配置时落到用户目录
    pub fn database_path(&self) -> PathBuf {
        match &self.database.path {
            Some(path) => PathBuf::from(path),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".toolthinker")
                .join("toolthinker.db"),
        }
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toolthinker")
        .join("config.json")
}

fn load_config_from(path: &std::path::Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(Config::default())
    }
}

fn save_config_to(
    path: &std::path::Path,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// 加载配置
///
/// 文件不存在时落盘一份默认配置便于手工编辑（不含环境变量
/// 覆盖的密钥），之后应用环境变量覆盖。
pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let path = config_path();
    let mut config = load_config_from(&path)?;
    if !path.exists() {
        save_config_to(&path, &config)?;
    }
    apply_env_overrides(&mut config);
    Ok(config)
}

/// 环境变量覆盖，密钥优先走环境变量
fn apply_env_overrides(config: &mut Config) {
    if let Ok(host) = std::env::var("TOOLTHINKER_HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("TOOLTHINKER_PORT") {
        if let Ok(port) = port.parse() {
            config.server.port = port;
        }
    }
    if let Ok(path) = std::env::var("TOOLTHINKER_DB_PATH") {
        config.database.path = Some(path);
    }
    if let Ok(base_url) = std::env::var("TOOLTHINKER_COMPLETION_BASE_URL") {
        config.completion.base_url = base_url;
    }
    if let Ok(key) = std::env::var("TOOLTHINKER_COMPLETION_API_KEY") {
        config.completion.api_key = Some(key);
    }
    if let Ok(model) = std::env::var("TOOLTHINKER_COMPLETION_MODEL") {
        config.completion.model = model;
    }
    if let Ok(key) = std::env::var("TOOLTHINKER_MAIL_API_KEY") {
        config.mail.api_key = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3001);
        assert!(config.completion.api_key.is_none());
        assert!(!config.mail.enabled);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.completion.model, config.completion.model);
    }

    #[test]
    fn test_save_then_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "toolthinker-config-test-{}.json",
            std::process::id()
        ));
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4002,
            },
            ..Config::default()
        };
        save_config_to(&path, &config).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.server.host, "0.0.0.0");
        assert_eq!(loaded.server.port, 4002);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("toolthinker-config-does-not-exist.json");
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.server.port, 3001);
    }

    #[test]
    fn test_database_path_fallback() {
        let config = Config::default();
        let path = config.database_path();
        assert!(path.to_string_lossy().contains("toolthinker"));

        let config = Config {
            database: DatabaseConfig {
                path: Some("/tmp/tt.db".to_string()),
            },
            ..Config::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("/tmp/tt.db"));
    }
}
