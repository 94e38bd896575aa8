
use crate::{init_logging, sample, start_cut_off_server, start_server, Resource};
use chunkdl::{Downloader, Error, TransferRequest};
use std::path::Path;
use std::time::Duration;

fn request(url: &str, dir: &Path, concurrency: i64) -> TransferRequest {
    TransferRequest::builder()
        .url(url)
        .directory(dir)
        .concurrency(concurrency)
        .build()
        .unwrap()
}

fn leftover_parts(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".part"))
        .collect()
}

#[tokio::test]
async fn million_bytes_in_four_ranges() -> chunkdl::Result<()> {
    init_logging();
    let data = sample(1_000_000);
    let resource = Resource::new(data.clone());
    let url = start_server(resource.clone()).await;
    let dir = tempfile::tempdir()?;

    let path = Downloader::new(&request(&url, dir.path(), 4))?
        .download()
        .await?;

    assert_eq!(dir.path().join("file.bin"), path);
    let written = std::fs::read(&path)?;
    assert_eq!(1_000_000, written.len());
    assert!(written == data);
    let mut seen = resource.seen();
    seen.sort();
    assert_eq!(
        vec![
            Some("bytes=0-249999".to_string()),
            Some("bytes=250000-499999".to_string()),
            Some("bytes=500000-749999".to_string()),
            Some("bytes=750000-999999".to_string()),
        ],
        seen
    );
    assert!(leftover_parts(dir.path()).is_empty());
    Ok(())
}

#[tokio::test]
async fn assembly_follows_index_not_completion_order() -> chunkdl::Result<()> {
    init_logging();
    let data = b"0123456789".to_vec();
    // chunks are [0,2] [3,5] [6,9], finishing in the order 2, 1, 0
    let resource = Resource::new(data.clone())
        .delay(0, Duration::from_millis(600))
        .delay(3, Duration::from_millis(300));
    let url = start_server(resource.clone()).await;
    let dir = tempfile::tempdir()?;

    let path = Downloader::new(&request(&url, dir.path(), 3))?
        .download()
        .await?;

    assert_eq!(data, std::fs::read(path)?);
    assert_eq!(3, resource.seen().len());
    assert!(leftover_parts(dir.path()).is_empty());
    Ok(())
}

#[tokio::test]
async fn no_range_support_means_one_plain_request() -> chunkdl::Result<()> {
    init_logging();
    let data = sample(5000);
    let resource = Resource::new(data.clone()).without_ranges();
    let url = start_server(resource.clone()).await;
    let dir = tempfile::tempdir()?;

    let path = Downloader::new(&request(&url, dir.path(), 8))?
        .download()
        .await?;

    assert_eq!(data, std::fs::read(path)?);
    assert_eq!(vec![None], resource.seen());
    assert!(leftover_parts(dir.path()).is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_length_means_one_plain_request() -> chunkdl::Result<()> {
    init_logging();
    let data = sample(3000);
    let resource = Resource::new(data.clone()).without_length();
    let url = start_server(resource.clone()).await;
    let dir = tempfile::tempdir()?;

    let path = Downloader::new(&request(&url, dir.path(), 4))?
        .download()
        .await?;

    assert_eq!(data, std::fs::read(path)?);
    assert_eq!(vec![None], resource.seen());
    Ok(())
}

#[tokio::test]
async fn zero_concurrency_falls_back_to_one_range() -> chunkdl::Result<()> {
    init_logging();
    let resource = Resource::new(sample(100));
    let url = start_server(resource.clone()).await;
    let dir = tempfile::tempdir()?;

    Downloader::new(&request(&url, dir.path(), 0))?
        .download()
        .await?;

    assert_eq!(vec![Some("bytes=0-99".to_string())], resource.seen());
    Ok(())
}

#[tokio::test]
async fn concurrency_is_capped_at_sixteen() -> chunkdl::Result<()> {
    init_logging();
    let data = sample(1600);
    let resource = Resource::new(data.clone());
    let url = start_server(resource.clone()).await;
    let dir = tempfile::tempdir()?;

    let path = Downloader::new(&request(&url, dir.path(), 40))?
        .download()
        .await?;

    assert_eq!(data, std::fs::read(path)?);
    assert_eq!(16, resource.seen().len());
    Ok(())
}

#[tokio::test]
async fn server_error_on_a_chunk_is_fatal() -> chunkdl::Result<()> {
    init_logging();
    let resource = Resource::new(sample(300)).fail_at(100);
    let url = start_server(resource).await;
    let dir = tempfile::tempdir()?;

    let res = Downloader::new(&request(&url, dir.path(), 3))?
        .download()
        .await;

    match res {
        Err(Error::FetchStatus { index, status }) => {
            assert_eq!(1, index);
            assert_eq!(500, status.as_u16());
        }
        other => panic!("unexpected result {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn short_chunk_is_fatal() -> chunkdl::Result<()> {
    init_logging();
    let resource = Resource::new(sample(300)).truncate_at(200);
    let url = start_server(resource).await;
    let dir = tempfile::tempdir()?;

    let res = Downloader::new(&request(&url, dir.path(), 3))?
        .download()
        .await;

    assert!(matches!(
        res,
        Err(Error::ChunkLength {
            index: 2,
            expected: 100,
            received: 99
        })
    ));
    Ok(())
}

#[tokio::test]
async fn connection_closed_mid_body_is_fatal() -> chunkdl::Result<()> {
    init_logging();
    let url = start_cut_off_server().await;
    let dir = tempfile::tempdir()?;

    let res = Downloader::new(&request(&url, dir.path(), 2))?
        .download()
        .await;

    match res {
        Err(Error::Fetch { index, .. }) => assert!(index < 2),
        other => panic!("unexpected result {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn missing_file_fails_the_head_request() -> chunkdl::Result<()> {
    init_logging();
    let url = start_server(Resource::new(sample(10))).await;
    let url = url.replace("file.bin", "missing.bin");
    let dir = tempfile::tempdir()?;

    let res = Downloader::new(&request(&url, dir.path(), 2))?
        .download()
        .await;

    assert!(matches!(res, Err(Error::ProbeStatus(s)) if s.as_u16() == 404));
    Ok(())
}

#[tokio::test]
async fn unreachable_server_fails_the_head_request() -> chunkdl::Result<()> {
    init_logging();
    let dir = tempfile::tempdir()?;
    let res = Downloader::new(&request("http://127.0.0.1:9/file.bin", dir.path(), 2))?
        .download()
        .await;
    assert!(matches!(res, Err(Error::Probe(_))));
    Ok(())
}

#[tokio::test]
async fn creates_missing_directory_and_uses_given_name() -> chunkdl::Result<()> {
    init_logging();
    let data = sample(64);
    let url = start_server(Resource::new(data.clone())).await;
    let dir = tempfile::tempdir()?;
    let nested = dir.path().join("a").join("b");
    let req = TransferRequest::builder()
        .url(url.as_str())
        .directory(nested.clone())
        .file_name("renamed.dat")
        .concurrency(2)
        .build()?;

    let path = Downloader::new(&req)?.download().await?;

    assert_eq!(nested.join("renamed.dat"), path);
    assert_eq!(data, std::fs::read(path)?);
    assert!(leftover_parts(&nested).is_empty());
    Ok(())
}
