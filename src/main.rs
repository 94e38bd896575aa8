mod app;

use crate::app::App;
use anyhow::{Context, Result};
use chunkdl::{Downloader, TransferRequest};
#[cfg(feature = "progress")]
use chunkdl::Terminal;

const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[92m";
const RESET: &str = "\x1b[0m";

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::new();
    app.init_logging();

    let mut request = TransferRequest::builder();
    request.url(app.url.as_str()).concurrency(app.concurrency);
    if let Some(location) = &app.location {
        request.directory(location.clone());
    }
    if let Some(name) = &app.name {
        request.file_name(name.as_str());
    }
    let request = request.build()?;

    let dl = Downloader::new(&request)?;
    #[cfg(feature = "progress")]
    let dl = {
        let mut dl = dl;
        let terminal = Terminal::stdout();
        if !app.no_progress && terminal.is_interactive() {
            dl.progress(terminal);
        }
        dl
    };
    let path = dl
        .download()
        .await
        .with_context(|| format!("Failed to download {}", request.url()))?;

    let size = tokio::fs::metadata(&path).await?.len();
    println!("{}{}Download completed!{}", BOLD, GREEN, RESET);
    println!("{} ({})", path.display(), human_bytes(size));
    Ok(())
}

#[cfg(feature = "progress")]
fn human_bytes(size: u64) -> String {
    indicatif::HumanBytes(size).to_string()
}

#[cfg(not(feature = "progress"))]
fn human_bytes(size: u64) -> String {
    format!("{} B", size)
}
