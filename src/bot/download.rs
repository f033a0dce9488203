use futures_util::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::error::SlipError;

/// Streams `url` into `dest`.
///
/// A non-success status fails before anything is written. A failure while
/// streaming removes the partially written file.
pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(), SlipError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SlipError::Download {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let result = write_body(response, dest).await;
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(dest).await {
            tracing::debug!("Could not remove partial download {}: {}", dest.display(), e);
        }
    }
    result
}

async fn write_body(response: reqwest::Response, dest: &Path) -> Result<(), SlipError> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await?;

    Ok(())
}
