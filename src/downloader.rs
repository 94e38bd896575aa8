use crate::assemble::assemble;
use crate::config::{Target, TransferRequest};
use crate::plan::{plan, Chunk, ChunkPlan};
use crate::probe::probe;
#[cfg(feature = "progress")]
use crate::progress::{Rows, Terminal};
use crate::worker::ChunkWorker;
use crate::Result;
use reqwest::Client;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::fs::{self, File};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

/// Steps of a transfer, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Probing,
    Planning,
    Fetching,
    Assembling,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Probing => "probing",
            Self::Planning => "planning",
            Self::Fetching => "fetching",
            Self::Assembling => "assembling",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Downloads one file in concurrent byte-range chunks
#[derive(Debug)]
pub struct Downloader {
    client: Client,
    target: Target,
    #[cfg(feature = "progress")]
    terminal: Option<Terminal>,
}

impl Downloader {
    /// Validate the request, the transfer itself starts with [`download`][Downloader::download]
    ///
    /// # Example
    ///
    /// ```no_run
    /// use chunkdl::{Downloader, TransferRequest};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), chunkdl::Error> {
    /// let request = TransferRequest::builder()
    ///     .url("https://example.com/file.iso")
    ///     .concurrency(4)
    ///     .build()?;
    /// let path = Downloader::new(&request)?.download().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(request: &TransferRequest) -> Result<Self> {
        Self::with_client(request, Client::new())
    }
    /// Same as [`new`][Downloader::new] with a preconfigured [`Client`]
    pub fn with_client(request: &TransferRequest, client: Client) -> Result<Self> {
        debug!("Stage: {}", Stage::Validating);
        let target = request.resolve()?;
        Ok(Self {
            client,
            target,
            #[cfg(feature = "progress")]
            terminal: None,
        })
    }
    pub fn target(&self) -> &Target {
        &self.target
    }
    /// Draw per-chunk progress rows on `terminal`
    #[cfg(feature = "progress")]
    pub fn progress(&mut self, terminal: Terminal) -> &mut Self {
        self.terminal = Some(terminal);
        self
    }

    /// Probe, fetch every chunk and assemble the final file, returning its path
    #[instrument(skip(self), fields(URL = %self.target.url(), workers = self.target.concurrency()))]
    pub async fn download(&self) -> Result<PathBuf> {
        debug!("Stage: {}", Stage::Probing);
        let metadata = probe(&self.client, self.target.url()).await?;
        info!(
            "Ranges: {}, length: {:?}",
            metadata.accepts_ranges(),
            metadata.content_length()
        );

        debug!("Stage: {}", Stage::Planning);
        let plan = plan(&metadata, self.target.concurrency());

        debug!("Stage: {}", Stage::Fetching);
        fs::create_dir_all(self.target.directory()).await?;
        let destination = self.target.destination();
        let mut file = File::create(&destination).await?;
        let board = self.board(plan.workers()).await?;
        let res = self.transfer(&plan, &mut file, &board).await;
        board.finish();
        res?;

        debug!("Stage: {}", Stage::Done);
        file.sync_all().await?;
        info!("Saved {}", destination.display());
        Ok(destination)
    }

    async fn transfer(&self, plan: &ChunkPlan, file: &mut File, board: &Board) -> Result<()> {
        self.fetch(plan, board).await?;

        debug!("Stage: {}", Stage::Assembling);
        board.status("combining part files...");
        let parts = plan
            .chunks()
            .iter()
            .map(|chunk| self.target.part_path(chunk.index))
            .collect::<Vec<_>>();
        let total = assemble(file, &parts).await?;
        debug!("Assembled {} bytes from {} parts", total, parts.len());
        Ok(())
    }

    /// Run one worker per chunk and wait for all of them, the first failure aborts the rest
    async fn fetch(&self, plan: &ChunkPlan, board: &Board) -> Result<()> {
        let mut workers = JoinSet::new();
        for chunk in plan.chunks() {
            let path = self.target.part_path(chunk.index);
            let part = File::create(&path).await?;
            let worker = ChunkWorker::new(
                self.client.clone(),
                self.target.url().clone(),
                *chunk,
                path,
                part,
            );
            workers.spawn(worker.run(board.sink(chunk)));
        }
        while let Some(joined) = workers.join_next().await {
            joined??;
        }
        Ok(())
    }

    /// Reading the cursor position blocks on the terminal's reply, so rows are reserved off the runtime
    async fn board(&self, chunks: usize) -> Result<Board> {
        #[cfg(feature = "progress")]
        let rows = match &self.terminal {
            Some(terminal) => {
                let terminal = terminal.clone();
                Some(tokio::task::spawn_blocking(move || Rows::reserve(terminal, chunks)).await??)
            }
            None => None,
        };
        #[cfg(not(feature = "progress"))]
        let _ = chunks;
        Ok(Board {
            #[cfg(feature = "progress")]
            rows,
        })
    }
}

/// Progress output of one transfer, silent when progress is off
struct Board {
    #[cfg(feature = "progress")]
    rows: Option<Rows>,
}

#[cfg(feature = "progress")]
impl Board {
    fn sink(&self, chunk: &Chunk) -> Box<dyn Write + Send> {
        match &self.rows {
            Some(rows) => Box::new(rows.renderer(chunk.index, chunk.expected_len())),
            None => Box::new(io::sink()),
        }
    }
    fn status(&self, line: &str) {
        if let Some(rows) = &self.rows {
            if let Err(e) = rows.status(line) {
                debug!("Failed to draw status: {}", e);
            }
        }
    }
    fn finish(&self) {
        if let Some(rows) = &self.rows {
            if let Err(e) = rows.finish() {
                debug!("Failed to reset cursor: {}", e);
            }
        }
    }
}

#[cfg(not(feature = "progress"))]
impl Board {
    fn sink(&self, _chunk: &Chunk) -> Box<dyn Write + Send> {
        Box::new(io::sink())
    }
    fn status(&self, _line: &str) {}
    fn finish(&self) {}
}
