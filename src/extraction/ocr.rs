//! Optical character recognition for uploaded images.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::ExtractionConfig;
use crate::types::ExtractionError;

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8], language: &str) -> Result<String, ExtractionError>;
}

/// Engine used when nothing else is injected: the in-process library with the
/// `ocr` feature, the `tesseract` executable otherwise.
pub fn default_engine(config: &ExtractionConfig) -> Arc<dyn OcrEngine> {
    #[cfg(feature = "ocr")]
    {
        Arc::new(embedded::EmbeddedTesseract::new(config.tessdata_dir.clone()))
    }
    #[cfg(not(feature = "ocr"))]
    {
        Arc::new(TesseractCli::new(config.tesseract_cmd.clone()))
    }
}

/// Pipes the image through `tesseract stdin stdout -l <lang>`.
pub struct TesseractCli {
    program: String,
}

impl TesseractCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: &[u8], language: &str) -> Result<String, ExtractionError> {
        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout", "-l", language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExtractionError::Ocr(format!("cannot start {}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExtractionError::Ocr("stdin not captured".to_string()))?;
        let input = image.to_vec();
        let writer = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        // A broken pipe here means tesseract exited early; its status says why.
        let _ = writer.await;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(feature = "ocr")]
mod embedded {
    use super::*;
    use tesseract_rs::TesseractAPI;

    pub struct EmbeddedTesseract {
        tessdata_dir: String,
    }

    impl EmbeddedTesseract {
        pub fn new(tessdata_dir: String) -> Self {
            Self { tessdata_dir }
        }
    }

    #[async_trait]
    impl OcrEngine for EmbeddedTesseract {
        async fn recognize(&self, image: &[u8], language: &str) -> Result<String, ExtractionError> {
            let decoded = image::load_from_memory(image)
                .map_err(|e| ExtractionError::Image(e.to_string()))?
                .to_rgb8();
            let tessdata_dir = self.tessdata_dir.clone();
            let language = language.to_string();

            tokio::task::spawn_blocking(move || {
                let (width, height) = decoded.dimensions();
                let api = TesseractAPI::new();
                api.init(&tessdata_dir, &language)
                    .map_err(|e| ExtractionError::Ocr(format!("init failed: {:?}", e)))?;
                api.set_image(
                    decoded.as_raw(),
                    width as i32,
                    height as i32,
                    3,
                    3 * width as i32,
                )
                .map_err(|e| ExtractionError::Ocr(format!("{:?}", e)))?;
                api.get_utf8_text()
                    .map_err(|e| ExtractionError::Ocr(format!("{:?}", e)))
            })
            .await
            .map_err(|e| ExtractionError::Ocr(e.to_string()))?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_executable_is_an_ocr_error() {
        let engine = TesseractCli::new("definitely-not-tesseract-binary");
        let result = engine.recognize(b"\x89PNG", "por").await;
        match result {
            Err(ExtractionError::Ocr(message)) => {
                assert!(message.contains("definitely-not-tesseract-binary"))
            }
            other => panic!("expected OCR error, got {:?}", other),
        }
    }
}
