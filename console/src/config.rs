use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tictactoe_engine::config::{ConfigManager, Validate};

const CONFIG_FILE_NAME: &str = "tictactoe_console_config.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum GameMode {
    Engine,
    TwoPlayers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConsoleConfig {
    pub participant_id: Option<String>,
    pub last_mode: Option<GameMode>,
}

impl Validate for ConsoleConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref id) = self.participant_id
            && id.trim().is_empty()
        {
            return Err("participant_id must not be empty".to_string());
        }
        Ok(())
    }
}

fn get_config_path() -> PathBuf {
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        return exe_dir.join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn get_config_manager() -> ConfigManager<ConsoleConfig> {
    ConfigManager::from_yaml_file(get_config_path())
}
