use std::path::Path;

use crate::println_pad;
use crate::utils::load_options;
use cmo_engine::template::{has_override_placeholder, resolve_output_path_allow_empty};
use cmo_engine::OverrideEngine;
use cmo_options::OutputMode;
use colored::Colorize;
use miette::Result;

pub struct CheckArgs {
    pub config: String,
}

pub fn check_options(args: CheckArgs) -> Result<()> {
    let options = load_options(Path::new(&args.config))?;
    // Constructing the engine runs the same checks a build would.
    let engine = OverrideEngine::with_css_extract(options).map_err(crate::errors::CliError::from)?;
    let options = engine.options();

    println_pad!(
        "{} {}",
        "🎨 Override options:".bright_blue().bold(),
        args.config.bright_cyan().bold()
    );
    println_pad!(
        "{} {}",
        "⚙️  Mode:".bright_green(),
        engine.mode().to_string().bright_white().bold()
    );
    println_pad!(
        "{} {}",
        "🧩 Keep originals:".bright_yellow(),
        options.keep_originals.to_string().bright_white()
    );
    println_pad!(
        "{} {} ({} chars)",
        "#️⃣  Hash:".bright_yellow(),
        options.output.hash_function.to_string().bright_white(),
        options.output.hash_digest_length
    );

    println_pad!("\n{}", "🌗 Variants:".bright_magenta().bold());
    for variant in options.variants() {
        match variant.mode {
            OutputMode::Standalone => println_pad!(
                "   {} {} {}",
                "•".bright_cyan(),
                variant.name.bright_cyan().bold(),
                format!(
                    "-> {}",
                    resolve_output_path_allow_empty(&variant.filename_template, Some(variant.name.as_str()))
                )
                .dimmed()
            ),
            OutputMode::SingleOutput => println_pad!(
                "   {} {} {}",
                "•".bright_cyan(),
                variant.name.bright_cyan().bold(),
                format!("rewrites mapped chunks in place -> {}", variant.filename_template)
                    .dimmed()
            ),
        }
    }

    if engine.mode() == OutputMode::Standalone
        && options.overrides.len() > 1
        && options
            .standalone_overrides_output_path
            .as_deref()
            .is_some_and(|path| !has_override_placeholder(path))
    {
        println_pad!(
            "\n{}",
            "⚠️  The standalone output path has no [override] placeholder; variants will overwrite each other."
                .bright_yellow()
        );
    }

    Ok(())
}
