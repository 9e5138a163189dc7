use cadence::settings::save_settings;
use cadence::Result;

use super::Books;

pub fn run(books: &Books, persist_data_dir: bool) -> Result<()> {
    if persist_data_dir {
        save_settings(&books.settings)?;
    }
    std::fs::create_dir_all(books.settings.log_dir())?;

    println!("Initialized cadence at {}", books.settings.data_path().display());
    Ok(())
}
