//! Integration tests for bar feeds

use ema_paper::feed::{BarFeed, CsvBarFeed};
use std::io::Write;

const UNSORTED: &str = "\
Datetime,Open,High,Low,Close,Volume
2025-10-13 09:25:00+05:30,25010,25020,25000,25015,1000
2025-10-13 09:15:00+05:30,25000,25010,24990,25005,1200
2025-10-13 09:20:00+05:30,25005,25012,24995,25001,900
2025-10-13 09:20:00+05:30,25005,25014,24996,25008,950
not-a-date,1,1,1,1,1
";

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_csv_feed_sorts_and_dedups() {
    let file = write_csv(UNSORTED);
    let feed = CsvBarFeed::new(file.path());

    let series = feed.fetch_window().await.unwrap();
    let closes: Vec<f64> = series.bars().iter().map(|b| b.close).collect();

    // Sorted ascending, duplicate 09:20 keeps the later row, bad timestamp dropped
    assert_eq!(closes, vec![25005.0, 25008.0, 25015.0]);
    assert!(series
        .bars()
        .windows(2)
        .all(|w| w[0].timestamp < w[1].timestamp));
}

#[tokio::test]
async fn test_csv_feed_window() {
    let file = write_csv(UNSORTED);
    let feed = CsvBarFeed::new(file.path()).with_window(2);

    let series = feed.fetch_window().await.unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.last().unwrap().close, 25015.0);
}

#[tokio::test]
async fn test_csv_feed_missing_file() {
    let feed = CsvBarFeed::new("/nonexistent/bars.csv");
    assert!(feed.fetch_window().await.is_err());
}
