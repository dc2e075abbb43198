//! hand_servo — interactive entry point.

use hand_servo::app::{run, AppConfig};
use std::io::{self, Write};
use std::net::{Ipv4Addr, SocketAddrV4};

fn main() {
    env_logger::init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Hand Servo — Finger Tracking Glove Controller         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        let cfg = AppConfig::default();
        println!("  Quick-start: {} at 640x480, transmitting\n", cfg.endpoint);
        cfg
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    let defaults = AppConfig::default();

    println!("  Configure the servo receiver:");
    let ip: Ipv4Addr = loop {
        let line = read_line(&format!("    IPv4 address (default {}): ", defaults.endpoint.ip()));
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break *defaults.endpoint.ip();
        }
        match trimmed.parse() {
            Ok(ip) => break ip,
            Err(_) => println!("    ⚠  Not an IPv4 address."),
        }
    };
    let port: u16 = read_line(&format!("    Port (default {}): ", defaults.endpoint.port()))
        .trim()
        .parse()
        .unwrap_or(defaults.endpoint.port());

    let transmit = !read_line("  Transmit over the network? (Y/n): ")
        .trim()
        .eq_ignore_ascii_case("n");

    let (width, height) = {
        let w: u32 = read_line("  Frame width (default 640): ")
            .trim()
            .parse()
            .unwrap_or(defaults.frame_width);
        let h: u32 = read_line("  Frame height (default 480): ")
            .trim()
            .parse()
            .unwrap_or(defaults.frame_height);
        (w.clamp(320, 1920), h.clamp(240, 1080))
    };

    AppConfig {
        endpoint: SocketAddrV4::new(ip, port),
        frame_width: width,
        frame_height: height,
        transmit,
        ..defaults
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
