use std::path::{Path, PathBuf};
use std::fs;
use std::io::{self, Write};
use serde::{Deserialize, Serialize};
use crate::logging::LogLevel;

pub const DEFAULT_PREFIX: &str = "iconrole_";

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Icon role names are this prefix followed by the member id.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    pub discord_token: Option<String>,
    /// Guild to register slash commands in. Commands are registered globally when unset.
    pub discord_guild_id: Option<String>,
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            discord_token: None,
            discord_guild_id: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    const CONFIG_PATH: &'static str = "roleiconbot.conf";
    const CONFIG_PATH_ENV: &'static str = "ROLEICONBOT_CONFIG";

    pub fn path() -> PathBuf {
        std::env::var_os(Self::CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::CONFIG_PATH))
    }

    pub fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let path = Self::path();
        if path.exists() {
            let mut config = Self::load(&path)?;
            config.prompt_for_missing_fields(&path)?;
            Ok(config)
        } else {
            Self::initial_setup(&path)
        }
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn from_toml(contents: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config: Config = toml::from_str(contents)?;
        if config.prefix.is_empty() {
            return Err("prefix must not be empty".into());
        }
        Ok(config)
    }

    fn prompt_for_missing_fields(&mut self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.discord_token.is_none() {
            self.discord_token = Some(Self::prompt_input("Enter your Discord Bot Token: ")?);
            self.save(path)?;
        }
        Ok(())
    }

    fn initial_setup(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        println!("Welcome to RoleIconBot! Let's set up your configuration.");

        println!("\nFirst, let's set up your Discord bot.");
        println!("Please follow these steps:");
        println!("1. Go to https://discord.com/developers/applications");
        println!("2. Click on 'New Application' and give it a name");
        println!("3. After creating, go to the 'Bot' tab and click 'Add Bot'");
        println!("4. Click on 'Reset Token' to generate a new token, then copy it");
        println!("5. Go to the 'OAuth2' tab, then 'URL Generator'");
        println!("6. Select 'bot' and 'applications.commands' scopes");
        println!("7. Select the 'Manage Roles' bot permission");
        println!("8. Copy the generated URL and use it to invite the bot to your server");
        println!("9. Make sure the bot's role sits above the members' icon roles");
        println!("\nPress Enter when you're ready to continue...");
        let mut buffer = String::new();
        io::stdin().read_line(&mut buffer)?;

        let discord_token = Self::prompt_input("Enter your Discord Bot Token: ")?;
        let discord_guild_id = Self::prompt_input("Enter the Discord Guild ID to register commands in (leave empty for global commands): ")?;
        let prefix = Self::prompt_input(&format!("Enter the icon role name prefix (default is {}): ", DEFAULT_PREFIX))?;

        let config = Config {
            prefix: if prefix.is_empty() { default_prefix() } else { prefix },
            discord_token: Some(discord_token),
            discord_guild_id: if discord_guild_id.is_empty() { None } else { Some(discord_guild_id) },
            log_level: LogLevel::Info,
        };

        config.save(path)?;
        println!("Configuration saved successfully!");

        Ok(config)
    }

    fn prompt_input(prompt: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let toml = toml::to_string(self)?;
        fs::write(path, toml)?;
        println!("Config saved to: {:?}", path.canonicalize()?);
        Ok(())
    }

    pub fn is_discord_configured(&self) -> bool {
        self.discord_token.as_deref().is_some_and(|token| !token.is_empty())
    }
}
