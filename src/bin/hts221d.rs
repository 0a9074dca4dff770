//! HTS221 monitor daemon for Linux.
//!
//! Polls an HTS221 on an I²C character device and keeps the latest reading in a text file.
//!
//! ```bash
//! hts221d                                   # /dev/i2c-1 -> /tmp/ambient_data every 10 s
//! hts221d --device /dev/i2c-0 --interval 30
//! RUST_LOG=debug hts221d --output /run/ambient_data
//! ```

use std::path::PathBuf;
use std::process;

use hts221::{FileSink, Hts221, Monitor, MonitorConfig, POLL_INTERVAL_MS};
use linux_embedded_hal::{Delay, I2cdev};

const USAGE: &str = "Usage: hts221d [--device <path>] [--output <path>] [--interval <secs>]

Options:
  --device <path>    I2C bus device (default /dev/i2c-1)
  --output <path>    File rewritten with each reading (default /tmp/ambient_data)
  --interval <secs>  Seconds between readings (default 10)
  --help             Print this message";

struct Args {
    device: PathBuf,
    output: PathBuf,
    interval_ms: u32,
}

fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(None);
    }

    let value = |flag: &str| -> Result<Option<&String>, String> {
        match args.iter().position(|a| a == flag) {
            Some(idx) => args.get(idx + 1).map(Some).ok_or(format!("{} needs a value", flag)),
            None => Ok(None),
        }
    };

    let device = value("--device")?.map_or_else(|| PathBuf::from("/dev/i2c-1"), PathBuf::from);
    let output = value("--output")?.map_or_else(|| PathBuf::from("/tmp/ambient_data"), PathBuf::from);
    let interval_ms = match value("--interval")? {
        Some(secs) => secs
            .parse::<u32>()
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(|secs| secs.checked_mul(1000))
            .ok_or(format!("invalid --interval: {}", secs))?,
        None => POLL_INTERVAL_MS,
    };

    Ok(Some(Args { device, output, interval_ms }))
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{}", USAGE);
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    let i2c = match I2cdev::new(&args.device) {
        Ok(i2c) => i2c,
        Err(e) => {
            log::error!("cannot open {}: {}", args.device.display(), e);
            process::exit(1);
        }
    };

    let sink = FileSink::new(&args.output);
    let config = MonitorConfig::default().poll_interval_ms(args.interval_ms);
    let mut monitor = match Monitor::start(Hts221::new(i2c, Delay), sink, config) {
        Ok(monitor) => monitor,
        Err(e) => {
            log::error!("sensor start-up failed: {}", e);
            process::exit(1);
        }
    };

    log::info!(
        "writing readings from {} to {}",
        args.device.display(),
        monitor.sink().path().display()
    );
    monitor.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let parsed = parse_args(&[]).unwrap().unwrap();
        assert_eq!(parsed.device, PathBuf::from("/dev/i2c-1"));
        assert_eq!(parsed.output, PathBuf::from("/tmp/ambient_data"));
        assert_eq!(parsed.interval_ms, 10_000);
    }

    #[test]
    fn flags_override_defaults() {
        let parsed = parse_args(&args(&["--interval", "30", "--device", "/dev/i2c-0"])).unwrap().unwrap();
        assert_eq!(parsed.device, PathBuf::from("/dev/i2c-0"));
        assert_eq!(parsed.interval_ms, 30_000);
    }

    #[test]
    fn rejects_bad_interval() {
        assert!(parse_args(&args(&["--interval", "0"])).is_err());
        assert!(parse_args(&args(&["--interval", "soon"])).is_err());
        assert!(parse_args(&args(&["--output"])).is_err());
    }

    #[test]
    fn help() {
        assert!(parse_args(&args(&["--device", "/dev/i2c-3", "--help"])).unwrap().is_none());
    }
}
