//! Location provider fed by `lat,lng` lines from a file or stdin.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use digitask_realtime::{LocationError, LocationProvider, PresenceSample, WatchOptions};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const WATCH_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSource {
    Stdin,
    File(PathBuf),
}

impl LineSource {
    /// `-` means stdin; anything else is a path.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            LineSource::Stdin
        } else {
            LineSource::File(PathBuf::from(arg))
        }
    }
}

pub struct LineProvider {
    source: LineSource,
    /// Pause between samples read from a file. Stdin is not paced.
    interval: Duration,
}

impl LineProvider {
    pub fn new(source: LineSource, interval: Duration) -> Self {
        Self { source, interval }
    }
}

impl LocationProvider for LineProvider {
    fn watch(&self, options: WatchOptions) -> mpsc::Receiver<Result<PresenceSample, LocationError>> {
        let (tx, rx) = mpsc::channel(WATCH_BUFFER);
        let source = self.source.clone();
        let interval = self.interval;
        tokio::spawn(async move {
            match source {
                LineSource::Stdin => {
                    info!("Reading locations from stdin");
                    read_samples(BufReader::new(tokio::io::stdin()), options, Duration::ZERO, tx)
                        .await;
                }
                LineSource::File(path) => match tokio::fs::File::open(&path).await {
                    Ok(file) => {
                        info!(path = %path.display(), "Replaying locations from file");
                        read_samples(BufReader::new(file), options, interval, tx).await;
                    }
                    Err(e) => {
                        let _ = tx
                            .send(Err(LocationError::PositionUnavailable(format!(
                                "{}: {e}",
                                path.display()
                            ))))
                            .await;
                    }
                },
            }
        });
        rx
    }
}

/// Feed samples until EOF or until the watcher goes away. A line that does
/// not arrive within `options.timeout` is reported as a timeout and the
/// watch keeps reading.
pub(crate) async fn read_samples<R>(
    reader: R,
    options: WatchOptions,
    interval: Duration,
    tx: mpsc::Sender<Result<PresenceSample, LocationError>>,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut first = true;
    loop {
        let next = tokio::select! {
            _ = tx.closed() => break,
            next = tokio::time::timeout(options.timeout, lines.next_line()) => next,
        };
        let item = match next {
            Ok(Ok(Some(line))) => match parse_line(&line) {
                Some(Ok(sample)) => Ok(sample),
                Some(Err(e)) => Err(e),
                None => continue,
            },
            Ok(Ok(None)) => {
                debug!("Location source exhausted");
                break;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Location source read failed");
                break;
            }
            Err(_) => Err(LocationError::Timeout(options.timeout)),
        };

        if item.is_ok() && !first && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        first = false;
        if tx.send(item).await.is_err() {
            break;
        }
    }
}

/// Parse `lat,lng`. Blank lines and `#` comments yield `None`.
pub(crate) fn parse_line(line: &str) -> Option<Result<PresenceSample, LocationError>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let unavailable = || LocationError::PositionUnavailable(format!("bad location line {line:?}"));
    let Some((lat, lng)) = line.split_once(',') else {
        return Some(Err(unavailable()));
    };
    let (Ok(latitude), Ok(longitude)) = (lat.trim().parse::<f64>(), lng.trim().parse::<f64>())
    else {
        return Some(Err(unavailable()));
    };
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Some(Err(unavailable()));
    }
    Some(Ok(PresenceSample {
        latitude,
        longitude,
        captured_at: Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tokio::io::AsyncWriteExt;

    use super::*;

    #[test]
    fn parses_coordinates() {
        let sample = parse_line(" 40.409, 49.867 ").unwrap().unwrap();
        assert_eq!(sample.latitude, 40.409);
        assert_eq!(sample.longitude, 49.867);
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());
        assert!(parse_line("# depot").is_none());
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["40.4", "north,east", "91,10", "10,181"] {
            assert!(
                matches!(
                    parse_line(line),
                    Some(Err(LocationError::PositionUnavailable(_)))
                ),
                "{line}"
            );
        }
    }

    #[test]
    fn dash_means_stdin() {
        assert_eq!(LineSource::parse("-"), LineSource::Stdin);
        assert_eq!(
            LineSource::parse("route.txt"),
            LineSource::File(PathBuf::from("route.txt"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn silent_source_reports_timeout_and_keeps_reading() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let (tx, mut rx) = mpsc::channel(4);
        let options = WatchOptions::default();
        tokio::spawn(read_samples(BufReader::new(reader), options, Duration::ZERO, tx));

        assert_eq!(
            rx.recv().await,
            Some(Err(LocationError::Timeout(Duration::from_secs(20))))
        );

        writer.write_all(b"40.1,49.2\n").await.unwrap();
        let sample = rx.recv().await.unwrap().unwrap();
        assert_eq!((sample.latitude, sample.longitude), (40.1, 49.2));
    }

    #[tokio::test]
    async fn file_source_replays_lines_then_ends() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# route\n40.0,49.0\nbad\n40.5,49.5").unwrap();

        let provider = LineProvider::new(
            LineSource::File(file.path().to_path_buf()),
            Duration::from_millis(10),
        );
        let mut rx = provider.watch(WatchOptions::default());

        assert_eq!(rx.recv().await.unwrap().unwrap().latitude, 40.0);
        assert!(matches!(
            rx.recv().await,
            Some(Err(LocationError::PositionUnavailable(_)))
        ));
        assert_eq!(rx.recv().await.unwrap().unwrap().latitude, 40.5);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn missing_file_reports_unavailable() {
        let provider = LineProvider::new(
            LineSource::File(PathBuf::from("/nonexistent/digitask/route.txt")),
            Duration::ZERO,
        );
        let mut rx = provider.watch(WatchOptions::default());
        assert!(matches!(
            rx.recv().await,
            Some(Err(LocationError::PositionUnavailable(_)))
        ));
        assert!(rx.recv().await.is_none());
    }
}
