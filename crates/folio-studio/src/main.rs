//! Demo host: a window showing a small book you can page through by dragging
//! a page corner, tapping near an edge, or with the arrow keys.
//!
//! `folio-studio [PAGE_DIR]` reads PNG/JPEG pages from `PAGE_DIR`; without it
//! a generated book is shown.

mod app;
mod book;

use std::path::PathBuf;

use anyhow::Result;
use folio_engine::device::GpuInit;
use folio_engine::flip::FlipConfig;
use folio_engine::logging::{LoggingConfig, init_logging};
use folio_engine::window::{Runtime, RuntimeConfig};

use app::BookApp;
use book::Book;

const GENERATED_PAGES: usize = 12;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let book = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(dir) => Book::load_dir(&dir)?,
        None => Book::procedural(GENERATED_PAGES, 600, 840)?,
    };
    log::info!("folio-studio: {} pages", book.len());

    let config = RuntimeConfig {
        title: "folio".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default(), BookApp::new(book, FlipConfig::default()))
}
