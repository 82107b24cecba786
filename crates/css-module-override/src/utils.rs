use crate::errors::CliError;
use cmo_options::OverrideOptions;
use std::path::Path;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// Load and validate an options file.
pub fn load_options(path: &Path) -> Result<OverrideOptions, CliError> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.to_path_buf()));
    }

    Ok(OverrideOptions::load(path)?)
}
