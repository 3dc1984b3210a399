//! Scanner simulator - feeds decoded barcodes to the intake listener
//!
//! Plays the role of a scanner device for local testing: connects to the
//! station's scanner port and sends one decoded text per line, either from
//! --code arguments, from stdin, or as generated EAN-13 codes.
//!
//! Usage:
//!   cargo run --bin scan-sim -- --count 10 --interval-ms 500
//!   cargo run --bin scan-sim -- --code 5901234123457 --code 4006381333931
//!   printf '5901234123457\n' | cargo run --bin scan-sim -- --stdin

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "scan-sim")]
#[command(about = "Scanner device simulator for local testing")]
struct Args {
    /// Station host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Scanner listener port
    #[arg(long, default_value = "7711")]
    port: u16,

    /// Barcodes to send (repeatable); generated when absent
    #[arg(long = "code")]
    codes: Vec<String>,

    /// Read barcodes from stdin instead
    #[arg(long)]
    stdin: bool,

    /// Number of generated codes when none are given
    #[arg(long, default_value = "5")]
    count: usize,

    /// Delay between sends in milliseconds
    #[arg(long, default_value = "200")]
    interval_ms: u64,
}

/// Build an EAN-13 from a fixed prefix and a sequence number
fn ean13(seq: u64) -> String {
    let body = format!("590{:09}", seq % 1_000_000_000);
    let sum: u32 = body
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = (b - b'0') as u32;
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum();
    let check = (10 - (sum % 10)) % 10;
    format!("{body}{check}")
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let mut stream = TcpStream::connect((args.host.as_str(), args.port))?;
    eprintln!("connected to {}:{}", args.host, args.port);

    if args.stdin {
        for line in io::stdin().lock().lines() {
            let line = line?;
            let code = line.trim();
            if code.is_empty() {
                continue;
            }
            writeln!(stream, "{code}")?;
            eprintln!("sent {code}");
            thread::sleep(Duration::from_millis(args.interval_ms));
        }
        return Ok(());
    }

    let codes: Vec<String> = if args.codes.is_empty() {
        let seed =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        (0..args.count as u64).map(|i| ean13(seed + i)).collect()
    } else {
        args.codes.clone()
    };

    for code in &codes {
        writeln!(stream, "{code}")?;
        eprintln!("sent {code}");
        thread::sleep(Duration::from_millis(args.interval_ms));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ean13_has_valid_check_digit() {
        for seq in [0, 1, 42, 123_456_789] {
            let code = ean13(seq);
            assert_eq!(code.len(), 13);

            let digits: Vec<u32> = code.bytes().map(|b| (b - b'0') as u32).collect();
            let sum: u32 = digits[..12]
                .iter()
                .enumerate()
                .map(|(i, d)| if i % 2 == 0 { *d } else { d * 3 })
                .sum();
            assert_eq!((sum + digits[12]) % 10, 0, "check digit invalid for {code}");
        }
    }
}
