//! The `webpress presets` command.

use clap::Args;
use serde::Serialize;
use webpress_core::SizePreset;

/// Arguments for the `presets` command.
#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Print as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PresetRow {
    name: &'static str,
    width: u32,
    height: u32,
    label: &'static str,
}

fn rows() -> Vec<PresetRow> {
    SizePreset::ALL
        .iter()
        .map(|p| {
            let (width, height) = p.dimensions();
            PresetRow {
                name: p.name(),
                width,
                height,
                label: p.label(),
            }
        })
        .collect()
}

/// Execute the presets command.
pub fn execute(args: PresetsArgs) -> anyhow::Result<()> {
    let rows = rows();
    if args.json {
        return super::print_json(&rows, true);
    }

    println!("{:<12} {:>11}  {}", "NAME", "SIZE", "DESCRIPTION");
    for row in &rows {
        println!(
            "{:<12} {:>11}  {}",
            row.name,
            format!("{}x{}", row.width, row.height),
            row.label
        );
    }
    Ok(())
}
