//! Parse command - one-shot parse of a local file

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::config::{AppConfig, LogFormat};
use crate::domain::upload::EMPTY_RESULT_MESSAGE;
use crate::domain::{
    PartitionRequest, RenderedDocument, Strategy, UploadFile, organize, render_document,
};
use crate::infrastructure::logging::init_logging;

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Path to a PDF or image file
    pub path: PathBuf,

    /// Use the high-resolution strategy
    #[arg(long)]
    pub hi_res: bool,

    /// Print the chunks as JSON instead of readable text
    #[arg(long)]
    pub raw: bool,
}

/// Parse the file and print the rendered document on stdout
pub async fn run(args: ParseArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    config.logging.format = LogFormat::Compact;
    init_logging(&config.logging)?;

    let file = read_upload_file(&args.path).await?;
    config.upload.policy().validate(&file)?;

    let gateway = crate::create_gateway(&config)?;
    let strategy = Strategy::from_high_res(args.hi_res);

    info!(
        filename = %file.filename,
        size = file.size(),
        strategy = %strategy,
        "Parsing local file"
    );

    let request = PartitionRequest::new(file.content, file.filename).with_strategy(strategy);
    let chunks = organize(gateway.partition(request).await?);

    if chunks.is_empty() {
        anyhow::bail!(EMPTY_RESULT_MESSAGE);
    }

    match render_document(&chunks, args.raw)? {
        RenderedDocument::Readable(body) | RenderedDocument::RawJson(body) => println!("{body}"),
    }

    Ok(())
}

async fn read_upload_file(path: &Path) -> anyhow::Result<UploadFile> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = mime_guess::from_path(path).first_or_octet_stream().to_string();

    Ok(UploadFile::new(filename, content_type, content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_upload_file_guesses_type() {
        let path = std::env::temp_dir().join(format!("docview-{}.pdf", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"%PDF-1.7").await.unwrap();

        let file = read_upload_file(&path).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(file.content_type, "application/pdf");
        assert!(file.filename.ends_with(".pdf"));
        assert_eq!(file.size(), 8);
    }

    #[tokio::test]
    async fn test_read_missing_file_fails() {
        let result = read_upload_file(Path::new("/definitely/not/here.pdf")).await;
        assert!(result.is_err());
    }
}
