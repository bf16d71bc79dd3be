use super::Format;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_model::BlockType;
use serde_json::json;

#[derive(Args, Debug)]
pub struct BlockTypesArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

pub fn block_types(args: BlockTypesArgs) -> Result<()> {
    match args.format {
        Format::Json => {
            let mut entries = Vec::with_capacity(BlockType::ALL.len());
            for block_type in BlockType::ALL {
                entries.push(json!({
                    "type": block_type.as_str(),
                    "label": block_type.label(),
                    "defaultData": block_type.default_data().to_value()?,
                }));
            }
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Format::Text => {
            for block_type in BlockType::ALL {
                let defaults = block_type.default_data().to_value()?;
                println!(
                    "{:<12} {:<14} {}",
                    block_type.as_str().bold(),
                    block_type.label(),
                    defaults.to_string().dimmed()
                );
            }
        }
    }

    Ok(())
}
