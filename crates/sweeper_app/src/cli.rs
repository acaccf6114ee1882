use std::path::PathBuf;
use std::sync::LazyLock;

use clap::Parser;
use regex::Regex;
use sweeper_engine::FileId;
use url::Url;

static FILE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"files/(\d+)").expect("valid file segment pattern"));
static TRAILING_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"files/\d+/?$").expect("valid trailing file pattern"));

/// Sweep a Canvas files collection for accessible file IDs below a known one.
#[derive(Debug, Parser)]
#[command(name = "file-sweeper", version, long_about = None)]
pub struct Args {
    /// URL of a known file, e.g. https://school.instructure.com/files/123456.
    #[arg(short, long, value_parser = parse_file_url)]
    pub url: String,

    /// Number of IDs below the known one to probe.
    #[arg(short = 'n', long, default_value_t = 10_000, value_name = "INT")]
    pub num_files: u64,

    /// Concurrent probes.
    #[arg(short, long, default_value_t = 16, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub workers: u8,

    /// Value of the canvas_session cookie.
    #[arg(short = 's', long, env = "CANVAS_SESSION", hide_env_values = true)]
    pub canvas_session: String,

    /// Directory the JSON report is written to.
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Also write log output to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log debug details.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where a scan starts, derived from a single file URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    pub start_id: FileId,
    /// The collection URL, ending in `files`.
    pub base_url: String,
}

impl ScanTarget {
    pub fn from_file_url(url: &str) -> Result<Self, String> {
        let start_id = FILE_SEGMENT
            .captures(url)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| "URL must contain /files/<id>".to_string())?
            .as_str()
            .parse::<FileId>()
            .map_err(|err| format!("file id out of range: {err}"))?;
        let base_url = TRAILING_FILE
            .replace(url.trim_end_matches('/'), "files")
            .into_owned();
        Ok(Self { start_id, base_url })
    }
}

fn parse_file_url(value: &str) -> Result<String, String> {
    let parsed = Url::parse(value).map_err(|_| "Invalid URL format".to_string())?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err("Invalid URL format".to_string());
    }
    if !FILE_SEGMENT.is_match(value) {
        return Err("URL must contain /files/<id>".to_string());
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_strips_trailing_file_id() {
        let target = ScanTarget::from_file_url("https://canvas.example.edu/files/5000/").unwrap();
        assert_eq!(
            target,
            ScanTarget {
                start_id: 5000,
                base_url: "https://canvas.example.edu/files".to_string(),
            }
        );

        let nested = ScanTarget::from_file_url("https://c.example/courses/9/files/77").unwrap();
        assert_eq!(nested.start_id, 77);
        assert_eq!(nested.base_url, "https://c.example/courses/9/files");
    }

    #[test]
    fn args_parse_with_defaults() {
        let args = Args::try_parse_from([
            "file-sweeper",
            "-u",
            "https://canvas.example.edu/files/5000",
            "-s",
            "token",
        ])
        .unwrap();
        assert_eq!(args.num_files, 10_000);
        assert_eq!(args.workers, 16);
        assert_eq!(args.canvas_session, "token");
        assert_eq!(args.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn rejects_bad_urls_and_worker_counts() {
        for url in ["canvas.example.edu/files/1", "https://canvas.example.edu/courses/1"] {
            let result =
                Args::try_parse_from(["file-sweeper", "-u", url, "-s", "token"]);
            assert!(result.is_err(), "{url}");
        }

        for workers in ["0", "33"] {
            let result = Args::try_parse_from([
                "file-sweeper",
                "-u",
                "https://canvas.example.edu/files/1",
                "-s",
                "token",
                "-w",
                workers,
            ]);
            assert!(result.is_err(), "workers={workers}");
        }
    }
}
