//! Run configuration.

use std::io::{self, BufRead, Write};

const SOURCE_BUCKET_VAR: &str = "FACEDEX_SOURCE_BUCKET";
const COLLECTION_ID_VAR: &str = "FACEDEX_COLLECTION_ID";
const NO_FACES_BUCKET_VAR: &str = "FACEDEX_NO_FACES_BUCKET";

/// Configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Bucket to scan for images
    pub source_bucket: String,
    /// Face collection id
    pub collection_id: String,
    /// Bucket receiving images with no detected faces
    pub no_faces_bucket: String,
}

impl RunConfig {
    /// Resolve from `FACEDEX_*` environment variables, prompting on stdin
    /// for whatever is unset.
    pub fn resolve() -> io::Result<Self> {
        Ok(Self {
            source_bucket: env_or_prompt(SOURCE_BUCKET_VAR, "Enter the S3 bucket name")?,
            collection_id: env_or_prompt(COLLECTION_ID_VAR, "Enter the face collection ID")?,
            no_faces_bucket: env_or_prompt(
                NO_FACES_BUCKET_VAR,
                "Enter the bucket name for images with no faces",
            )?,
        })
    }
}

fn env_or_prompt(var: &str, prompt: &str) -> io::Result<String> {
    if let Ok(value) = std::env::var(var) {
        let value = value.trim().to_string();
        if !value.is_empty() {
            return Ok(value);
        }
    }

    let mut stdout = io::stdout();
    write!(stdout, "{}: ", prompt)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
