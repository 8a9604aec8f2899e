// src/export/fs_utils.rs

use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, warning};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Refuse to clobber an existing export unless `force` is set or the user
/// confirms on stdin.
pub(crate) fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if !path.exists() || force {
        return Ok(());
    }
    confirm_overwrite(path, &mut io::stdin().lock())
}

fn confirm_overwrite(path: &Path, input: &mut impl BufRead) -> AppResult<()> {
    warning(format!("The file '{}' already exists.", path.display()));

    print!("Overwrite? [y/N]: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => {
            info("Existing file will be overwritten.");
            Ok(())
        }
        _ => Err(AppError::Export(
            "cancelled, existing file not overwritten".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yes_confirms() {
        let p = Path::new("/tmp/whatever.csv");
        assert!(confirm_overwrite(p, &mut "yes\n".as_bytes()).is_ok());
        assert!(confirm_overwrite(p, &mut "Y\n".as_bytes()).is_ok());
        assert!(matches!(
            confirm_overwrite(p, &mut "\n".as_bytes()),
            Err(AppError::Export(_))
        ));
    }
}
