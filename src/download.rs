//! HTTP fetch helpers for the upstream services.

use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use futures::StreamExt;
use indicatif::ProgressBar;
use zip::ZipArchive;

use crate::error::{AusrainError, Result};

/// Fetches a text payload from the specified URL.
pub async fn fetch_text(url: &str) -> Result<String> {
    let response = reqwest::get(url).await?;

    if !response.status().is_success() {
        return Err(AusrainError::Upstream(format!(
            "request failed with status {}",
            response.status()
        )));
    }

    Ok(response.text().await?)
}

/// Downloads a binary file to the specified path, updating the progress bar
/// from the response's content length as chunks arrive.
pub async fn download_file_with_progress(
    url: &str,
    file_path: PathBuf,
    progress_bar: ProgressBar,
) -> Result<()> {
    let response = reqwest::get(url).await?;

    if !response.status().is_success() {
        return Err(AusrainError::Upstream(format!(
            "failed to download file: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    if total_size > 0 {
        use indicatif::ProgressStyle;
        progress_bar.set_length(total_size);
        progress_bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {eta}",
            )
            .unwrap()
            .progress_chars("=> "),
        );
    }

    let mut file = File::create(file_path)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        progress_bar.set_position(downloaded);
    }

    Ok(())
}

/// Extracts the text of the first archive member whose name ends with
/// `suffix`. The BoM daily archive holds one data CSV plus a notes file.
pub fn extract_zip_member(archive_path: &Path, suffix: &str) -> Result<String> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let name = archive
        .file_names()
        .find(|name| name.ends_with(suffix))
        .map(str::to_string)
        .ok_or_else(|| {
            AusrainError::Upstream(format!("no `{}` member in archive", suffix))
        })?;

    let mut member = archive.by_name(&name)?;
    let mut contents = String::new();
    member.read_to_string(&mut contents)?;

    Ok(contents)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    #[test]
    fn should_extract_data_member_from_archive() {
        let tmp_dir = TempDir::new().unwrap();
        let archive_path = tmp_dir.path().join("daily.zip");

        let file = File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("IDCJAC0009_023343_1800_Note.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"notes").unwrap();
        writer
            .start_file("IDCJAC0009_023343_1800_Data.csv", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"Year,Month,Day\n2020,1,1\n").unwrap();
        writer.finish().unwrap();

        let contents = extract_zip_member(&archive_path, "_Data.csv").unwrap();
        assert!(contents.starts_with("Year,Month,Day"));
    }

    #[test]
    fn should_fail_when_member_is_absent() {
        let tmp_dir = TempDir::new().unwrap();
        let archive_path = tmp_dir.path().join("empty.zip");

        let file = File::create(&archive_path).unwrap();
        let writer = zip::ZipWriter::new(file);
        writer.finish().unwrap();

        assert!(extract_zip_member(&archive_path, "_Data.csv").is_err());
    }
}
