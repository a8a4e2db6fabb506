use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::extraction::TextExtractor;
use crate::models::UploadedFile;

#[derive(Parser)]
#[command(name = "psicodoc", about = "Assistant for drafting psychological documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    Serve,
    /// Print the text extracted from local files
    Extract {
        /// PDF, DOCX or image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Reads each path and tags it with the media type its extension implies.
pub async fn load_files(paths: &[PathBuf]) -> anyhow::Result<Vec<UploadedFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let media_type = mime_guess::from_path(path).first_or_octet_stream();
        files.push(UploadedFile::new(
            path.display().to_string(),
            media_type.essence_str(),
            data,
        ));
    }
    Ok(files)
}

pub async fn run_extract(extractor: &TextExtractor, paths: &[PathBuf]) -> anyhow::Result<()> {
    let files = load_files(paths).await?;
    let results = extractor.extract(&files).await;
    for (file, text) in files.iter().zip(results) {
        println!("==> {} ({})", file.name, file.media_type);
        println!("{}\n", text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{DOCX_MEDIA_TYPE, PDF_MEDIA_TYPE};

    #[test]
    fn test_parse_extract_command() {
        let cli = Cli::try_parse_from(["psicodoc", "extract", "a.pdf", "b.docx"]).unwrap();
        match cli.command {
            Some(Commands::Extract { files }) => assert_eq!(files.len(), 2),
            _ => panic!("expected extract command"),
        }
        assert!(Cli::try_parse_from(["psicodoc", "extract"]).is_err());
        assert!(Cli::try_parse_from(["psicodoc"]).unwrap().command.is_none());
    }

    #[tokio::test]
    async fn test_load_files_guesses_media_type() {
        let dir = std::env::temp_dir().join(format!("psicodoc-cli-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let pdf = dir.join("laudo.pdf");
        let docx = dir.join("relatorio.docx");
        tokio::fs::write(&pdf, b"%PDF-1.4").await.unwrap();
        tokio::fs::write(&docx, b"PK").await.unwrap();

        let files = load_files(&[pdf, docx]).await.unwrap();

        assert_eq!(files[0].media_type, PDF_MEDIA_TYPE);
        assert_eq!(files[1].media_type, DOCX_MEDIA_TYPE);
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
