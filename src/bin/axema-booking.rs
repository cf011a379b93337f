use std::io::Write;

use chrono::Utc;

use axema_booking::cache::ResponseCache;
use axema_booking::client::{Client, HttpTransport};
use axema_booking::config::Config;
use axema_booking::Provider;


#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(err) = run().await {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> axema_booking::Result<()> {
    let config = Config::from_env()?;
    log::debug!("Using {:?}", config);

    let cache_dir = match &config.cache_dir {
        Some(dir) => dir.clone(),
        None => ResponseCache::default_folder()?,
    };
    let cache = ResponseCache::new(&cache_dir);

    let transport = HttpTransport::new()?;
    let client = Client::new(transport, &config.endpoint, &config.username, &config.password, cache);
    let mut provider = Provider::new(client)
        .with_cached_reservations(config.cache_reservations);

    let events = provider.run().await?;
    let ical = axema_booking::ical::build_calendar(&events, &Utc::now());

    let mut stdout = std::io::stdout();
    stdout.write_all(ical.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
