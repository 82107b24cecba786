use std::path::Path;

use crate::emit::write_manifest;
use crate::errors::CliError;
use crate::println_pad;
use crate::snapshot::GraphSnapshot;
use crate::utils::load_options;
use cmo_engine::OverrideEngine;
use colored::Colorize;
use miette::Result;

#[derive(Debug)]
pub struct BuildArgs {
    pub graph: String,
    pub config: String,
    pub output_dir: String,
}

pub fn build_variants(args: BuildArgs) -> Result<()> {
    let options = load_options(Path::new(&args.config))?;
    let snapshot = GraphSnapshot::load(Path::new(&args.graph))?;
    let mut compilation = snapshot.into_compilation(options.output.clone())?;

    let engine = OverrideEngine::with_css_extract(options).map_err(CliError::from)?;

    println!(
        "{} {} {}",
        "🎨 Building style variants:".bright_blue().bold(),
        args.graph.bright_cyan().bold(),
        format!("({})", engine.mode()).dimmed()
    );

    let manifest = engine.run(&mut compilation).map_err(CliError::from)?;
    let output_dir = Path::new(&args.output_dir);
    let assets = write_manifest(&compilation, &manifest, output_dir)?;

    for asset in &assets {
        println_pad!(
            "{} {} {}",
            "•".bright_cyan(),
            asset.path.display().to_string().bright_white(),
            format!("({} bytes, {})", asset.size, asset.identifier).dimmed()
        );
    }

    println!(
        "{} {} asset(s) written to {}",
        "✅".bright_green(),
        assets.len(),
        output_dir.display().to_string().bright_cyan()
    );

    Ok(())
}
