use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::debug;

use crate::error::Result;

/// Saves a reminder that could not be mailed so it can be sent by hand.
///
/// Files land at `{dir}/reminder_{owner-slug}_{date}.html`; a second run on
/// the same day overwrites the earlier copy for that owner.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub fn save_reminder(dir: &Path, owner: &str, date: NaiveDate, html: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = dir.join(format!(
        "reminder_{}_{}.html",
        owner_slug(owner),
        date.format("%Y-%m-%d")
    ));
    fs::write(&path, html)?;

    debug!("Saved reminder for {owner} to {}", path.display());
    Ok(path)
}

/// Keeps addresses readable in file names while dropping path separators.
fn owner_slug(owner: &str) -> String {
    owner
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' | '@' => c,
            _ => '-',
        })
        .collect()
}
