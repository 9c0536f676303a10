use std::time::Duration;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    // --- 查重 API 配置 ---
    pub plagiarism_api_base_url: String,
    pub plagiarism_api_token: String,
    /// 默认提交语言
    pub default_language: String,
    /// 两次轮询之间的间隔（秒）
    pub poll_interval_secs: u64,
    /// 单次查重最长等待时间（秒）
    pub max_wait_secs: u64,
    /// 单个 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 同时处理的查重任务数量
    pub max_concurrent_checks: usize,
    // --- 批处理配置 ---
    /// 待查重作业 TOML 文件存放目录
    pub submissions_folder: String,
    /// 课程目录 TOML 文件
    pub catalog_file: String,
    /// 通知输出文件（JSON Lines）
    pub notification_log_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plagiarism_api_base_url: "https://plagiarismcheck.org/api/v1".to_string(),
            plagiarism_api_token: String::new(),
            default_language: "en".to_string(),
            poll_interval_secs: 5,
            max_wait_secs: 300,
            request_timeout_secs: 30,
            max_concurrent_checks: 4,
            submissions_folder: "pending_submissions".to_string(),
            catalog_file: "lms_catalog.toml".to_string(),
            notification_log_file: "notifications.jsonl".to_string(),
            output_log_file: "plagiarism_report.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            plagiarism_api_base_url: std::env::var("PLAGIARISM_API_BASE_URL").unwrap_or(default.plagiarism_api_base_url),
            plagiarism_api_token: std::env::var("PLAGIARISM_API_TOKEN").unwrap_or(default.plagiarism_api_token),
            default_language: std::env::var("PLAGIARISM_LANGUAGE").unwrap_or(default.default_language),
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_secs),
            max_wait_secs: std::env::var("MAX_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_wait_secs),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            max_concurrent_checks: std::env::var("MAX_CONCURRENT_CHECKS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_checks),
            submissions_folder: std::env::var("SUBMISSIONS_FOLDER").unwrap_or(default.submissions_folder),
            catalog_file: std::env::var("CATALOG_FILE").unwrap_or(default.catalog_file),
            notification_log_file: std::env::var("NOTIFICATION_LOG_FILE").unwrap_or(default.notification_log_file),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 检查启动前必须满足的配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plagiarism_api_token.trim().is_empty() {
            return Err(ConfigError::Missing {
                var_name: "PLAGIARISM_API_TOKEN".to_string(),
            });
        }
        if !self.plagiarism_api_base_url.starts_with("http://")
            && !self.plagiarism_api_base_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid {
                var_name: "PLAGIARISM_API_BASE_URL".to_string(),
                value: self.plagiarism_api_base_url.clone(),
                reason: "必须以 http:// 或 https:// 开头".to_string(),
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var_name: "POLL_INTERVAL_SECS".to_string(),
                value: "0".to_string(),
                reason: "轮询间隔必须大于 0".to_string(),
            });
        }
        if self.max_concurrent_checks == 0 {
            return Err(ConfigError::Invalid {
                var_name: "MAX_CONCURRENT_CHECKS".to_string(),
                value: "0".to_string(),
                reason: "并发数必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            plagiarism_api_token: "test-token".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_matches_vendor_timings() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.max_wait(), Duration::from_secs(300));
        assert_eq!(config.default_language, "en");
    }

    #[test]
    fn test_validate_requires_token() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::Missing { .. })));
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            plagiarism_api_base_url: "ftp://example.com".to_string(),
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let config = Config {
            poll_interval_secs: 0,
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let config = Config {
            max_concurrent_checks: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }
}
