//! 設定ファイル管理モジュール
//!
//! エミュレータの設定を JSON 形式で永続化

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 設定ファイルのデフォルトパス
const CONFIG_FILE: &str = "jr100_config.json";

/// エミュレータ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 最後に使用した ROM のパス
    pub last_rom: Option<String>,
    /// 最後に使用した PROG ファイルのパス
    pub last_program: Option<String>,
    /// ウィンドウ拡大率
    pub scale: usize,
    /// サウンド有効
    pub sound_enabled: bool,
    /// 拡張RAM（32KB）を使用する
    pub extended_ram: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            last_rom: None,
            last_program: None,
            scale: 2,
            sound_enabled: true,
            extended_ram: false,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込む
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// 指定したパスから設定を読み込む。失敗時はデフォルト
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to parse config: {e}, using defaults");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    /// 設定ファイルを保存する
    pub fn save(&self) -> Result<(), String> {
        self.save_to(CONFIG_FILE)
    }

    /// 指定したパスに設定を保存する
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {e}"))?;
        fs::write(path, json).map_err(|e| format!("Failed to write config: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let config = Config::load_from("/nonexistent/jr100_config.json");
        assert_eq!(config.scale, 2);
        assert!(config.sound_enabled);
        assert!(!config.extended_ram);
    }

    #[test]
    fn round_trip_through_json() {
        let mut config = Config::default();
        config.scale = 3;
        config.last_rom = Some("roms/jr100.rom".to_string());
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scale, 3);
        assert_eq!(back.last_rom.as_deref(), Some("roms/jr100.rom"));
    }
}
