use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the sender address
pub const SENDER_EMAIL_VAR: &str = "SENDER_EMAIL";

/// Environment variable holding the sender's SMTP password/app secret
pub const EMAIL_PASSWORD_VAR: &str = "EMAIL_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Outbound mail configuration
    pub mail: MailConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host
    pub smtp_host: String,

    /// Implicit-TLS submission port
    pub smtp_port: u16,

    /// Sender address, from the environment - never written to the config
    /// file
    #[serde(skip)]
    pub sender_address: String,

    /// Sender secret, from the environment - never written to the config
    /// file
    #[serde(skip)]
    pub sender_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory under which per-run workspaces are created
    pub work_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mail: MailConfig {
                smtp_host: "smtp.gmail.com".to_string(),
                smtp_port: 465,
                sender_address: String::new(),
                sender_password: String::new(),
            },
            app: AppConfig {
                work_root: std::env::temp_dir().join("mashupgen"),
            },
        }
    }
}

impl Config {
    /// Load configuration from file (creating a default one if absent),
    /// then overlay mail credentials from the process environment.
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            serde_yaml::from_str::<Config>(&content)
                .context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save().await?;
            config
        };

        if let Ok(address) = std::env::var(SENDER_EMAIL_VAR) {
            config.mail.sender_address = address;
        }
        if let Ok(password) = std::env::var(EMAIL_PASSWORD_VAR) {
            config.mail.sender_password = password;
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file (credentials excluded)
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("mashupgen").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.mail.smtp_host.is_empty() {
            anyhow::bail!("SMTP host must be configured");
        }

        if self.mail.smtp_port == 0 {
            anyhow::bail!("SMTP port must be configured");
        }

        Ok(())
    }

    /// Display current configuration (secrets elided)
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  SMTP Host: {}", self.mail.smtp_host);
        println!("  SMTP Port: {}", self.mail.smtp_port);
        println!(
            "  Sender: {}",
            if self.mail.sender_address.is_empty() {
                "(unset - export SENDER_EMAIL)"
            } else {
                &self.mail.sender_address
            }
        );
        println!("  Work Root: {}", self.app.work_root.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_gmail_submission() {
        let config = Config::default();
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.mail.smtp_port, 465);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secrets_never_serialized() {
        let mut config = Config::default();
        config.mail.sender_address = "sender@example.com".to_string();
        config.mail.sender_password = "hunter2".to_string();

        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("sender@example.com"));
        assert!(!yaml.contains("hunter2"));
    }

    #[test]
    fn test_rejects_empty_host() {
        let mut config = Config::default();
        config.mail.smtp_host.clear();
        assert!(config.validate().is_err());
    }
}
