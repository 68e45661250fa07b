//! Fetches a file report and prints the verdict summary.
//!
//! Run with: VIRUSTOTAL_API_KEY=... cargo run --example file_report -- <hash>

use tracing_subscriber::EnvFilter;
use vtbridge::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let hash = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "d41d8cd98f00b204e9800998ecf8427e".to_string());
    if HashKind::detect(&hash).is_none() {
        eprintln!("warning: '{}' does not look like an md5/sha1/sha256 digest", hash);
    }

    let client = VirusTotalClient::from_env()?;

    match client.file_report(&hash).await? {
        ApiResponse::Success(report) => {
            let attrs = report.attributes();
            let stats = attrs.last_analysis_stats;

            println!("sha256:   {}", attrs.sha256);
            println!("size:     {} bytes", attrs.size);
            if let Some(kind) = attrs.top_type_guess() {
                println!("type:     {} ({:.1}%)", kind.file_type, kind.probability);
            }
            if let Some(analyzed) = attrs.last_analyzed_at() {
                println!("analyzed: {}", analyzed);
            }
            println!("verdict:  {}/{} engines flagged the file", stats.detections(), stats.total());
            for (engine, result) in attrs.detections() {
                println!(
                    "  - {:<20} {:<10} {}",
                    engine,
                    result.category,
                    result.result.as_deref().unwrap_or("-")
                );
            }
            println!(
                "votes:    {} harmless / {} malicious",
                attrs.total_votes.harmless, attrs.total_votes.malicious
            );
        }
        ApiResponse::Error(err) if err.is_not_found() => {
            println!("VirusTotal has never seen {}", hash);
        }
        ApiResponse::Error(err) => {
            println!("VirusTotal error: {}", err);
        }
    }

    Ok(())
}
