use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::client::DEFAULT_BASE_URL;
use crate::types::{Settings, Theme};

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the answering service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
    /// Model shown in the settings panel
    #[arg(short, long, default_value = "gpt-4")]
    pub model: String,
    /// Temperature
    #[arg(short, long, value_parser = validate_temperature, default_value = "0.7")]
    pub temperature: f32,
    /// Color theme
    #[arg(long, value_enum, default_value_t = Theme::Light)]
    pub theme: Theme,
    /// Seconds to wait for an answer, 0 waits forever
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,
    /// Directory for the log file
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            theme: self.theme,
            ai_model: self.model.clone(),
            temperature: self.temperature,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn validate_temperature(val: &str) -> Result<f32, String> {
    val.parse::<f32>()
        .map_err(|_| String::from("Value must be a number between 0.0 and 1.0"))
        .and_then(|v| {
            if (0.0..=1.0).contains(&v) {
                Ok(v)
            } else {
                Err(String::from("Value must be a number between 0.0 and 1.0"))
            }
        })
}
