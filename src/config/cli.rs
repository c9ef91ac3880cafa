use crate::config::PluginInput;
use crate::utils::error::Result;
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "orphan-gallery-linker")]
#[command(about = "Link orphan scenes to galleries by folder layout")]
pub struct CliArgs {
    /// Read the plugin payload from a file instead of stdin
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliArgs {
    pub fn read_payload(&self) -> Result<PluginInput> {
        match &self.input {
            Some(path) => PluginInput::from_file(path),
            None => {
                let mut content = String::new();
                std::io::stdin().read_to_string(&mut content)?;
                PluginInput::from_json(&content)
            }
        }
    }
}
