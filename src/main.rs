use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use watchface::{Watch, WatchConfig};

fn main() -> watchface::WatchResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse --title, --assets and --gmt from the command line
    let mut title = "Meridian".to_string();
    let mut assets_dir = PathBuf::from("assets/moon");
    let mut gmt_offset: i64 = 0;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--title" => {
                if let Some(value) = args.next() {
                    title = value;
                }
            }
            "--assets" => {
                if let Some(value) = args.next() {
                    assets_dir = PathBuf::from(value);
                }
            }
            "--gmt" => {
                if let Some(value) = args.next() {
                    if let Ok(offset) = value.parse::<i64>() {
                        gmt_offset = offset;
                    }
                }
            }
            _ => {}
        }
    }

    let config = WatchConfig::builder()
        .title(title)
        .assets_dir(assets_dir)
        .initial_gmt_offset(gmt_offset)
        .build();

    Watch::new(config).run()
}
