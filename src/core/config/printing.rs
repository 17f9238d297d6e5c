use crate::core::config::data::{Config, ConfigKey};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        for key in [ConfigKey::Endpoint, ConfigKey::LogFile] {
            match self.get(key) {
                Some(value) => println!("  {}: {value}", key.name()),
                None => println!("  {}: (unset)", key.name()),
            }
        }
    }
}
