use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use routemap::{
    credentials::{CharCodeKey, CredentialSource, EnvCredentials, StaticKey},
    provider::{headless::HeadlessHost, html::HtmlHost},
    traits::{Overlay, ScriptHost},
    RenderedRoute, RouteMap, RouteMapConfig, TripSummary,
};
use std::{fs::File, io::BufReader, path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(name = "routemap-app", about = "Route map pages for EV trip summaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a standalone HTML page showing the trip
    Render {
        #[command(flatten)]
        input: Input,
        /// Output file, stdout when absent
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long, default_value = "Route map")]
        title: String,
        /// Content-security-policy nonce for both script tags
        #[arg(long)]
        nonce: Option<String>,
        /// Fetch the script URL first and fail if it does not load
        #[arg(long)]
        check: bool,
    },
    /// Draw the trip headlessly and print what was placed
    Inspect {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    /// Trip summary JSON
    #[arg(short, long)]
    data: PathBuf,
    /// Loader and view configuration JSON
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// API key; defaults to MAPS_API_KEY from the environment or .env
    #[arg(long)]
    key: Option<String>,
    /// API key as underscore-delimited character codes
    #[arg(long, conflicts_with = "key")]
    char_codes: Option<String>,
}

impl Input {
    fn load(&self) -> Result<(RouteMapConfig, TripSummary)> {
        let config = match &self.config {
            Some(path) => RouteMapConfig::from_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => RouteMapConfig::default(),
        };
        let file =
            File::open(&self.data).with_context(|| format!("opening {}", self.data.display()))?;
        let trip = TripSummary::from_reader(BufReader::new(file))
            .with_context(|| format!("reading trip {}", self.data.display()))?;
        Ok((config, trip))
    }

    fn credentials(&self) -> Box<dyn CredentialSource> {
        match (&self.key, &self.char_codes) {
            (Some(key), _) => Box::new(StaticKey::new(key.clone())),
            (None, Some(codes)) => Box::new(CharCodeKey::new(codes.clone())),
            (None, None) => Box::new(EnvCredentials::new()),
        }
    }
}

async fn draw(
    config: RouteMapConfig,
    credentials: Box<dyn CredentialSource>,
    host: Arc<dyn ScriptHost>,
    trip: &TripSummary,
) -> Result<RenderedRoute> {
    let map = RouteMap::new(config, credentials, host);
    Ok(map.render(trip).await?)
}

async fn render(input: &Input, title: &str, nonce: Option<String>, check: bool) -> Result<String> {
    let (config, trip) = input.load()?;
    let mut html = HtmlHost::new();
    if let Some(nonce) = nonce {
        html = html.with_nonce(nonce);
    }

    #[cfg(feature = "http")]
    if check {
        let host = Arc::new(routemap::loader::host::CheckedScriptHost::new(html));
        draw(config, input.credentials(), host.clone(), &trip).await?;
        return Ok(host.inner().page(title)?);
    }
    #[cfg(not(feature = "http"))]
    if check {
        log::warn!("built without http support, skipping the script check");
    }

    let host = Arc::new(html);
    draw(config, input.credentials(), host.clone(), &trip).await?;
    Ok(host.page(title)?)
}

async fn inspect(input: &Input) -> Result<()> {
    let (config, trip) = input.load()?;
    let credentials: Box<dyn CredentialSource> = match input.credentials().api_key() {
        Ok(_) => input.credentials(),
        Err(e) => {
            log::info!("no API key ({}), inspecting with a placeholder", e);
            Box::new(StaticKey::new("headless"))
        }
    };

    let host = Arc::new(HeadlessHost::new());
    let rendered = draw(config, credentials, host.clone(), &trip).await?;
    let provider = host
        .provider()
        .context("headless host has no provider after rendering")?;

    let viewport = &rendered.viewport;
    println!(
        "viewport: center ({:.5}, {:.5}) zoom {} at {}x{}",
        viewport.center.lat, viewport.center.lng, viewport.zoom, viewport.size.x, viewport.size.y
    );
    println!("route: {} points", rendered.path.len());

    let scene = provider.scene();
    for station in rendered.stations() {
        let marker = scene
            .marker(station.marker)
            .context("rendered marker missing from scene")?;
        let opened = provider.click(station.marker)?;
        println!(
            "{:<12} {:?} {:<30} ({:.5}, {:.5}) popup {}",
            marker.marker.id(),
            station.kind,
            marker.marker.title(),
            marker.marker.position().lat,
            marker.marker.position().lng,
            if opened.contains(&station.info_window) { "opens" } else { "missing" }
        );
    }
    println!("{} popups opened on click", provider.open_popup_count());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Render {
            input,
            out,
            title,
            nonce,
            check,
        } => {
            let page = render(&input, &title, nonce, check).await?;
            match out {
                Some(path) => {
                    std::fs::write(&path, page)
                        .with_context(|| format!("writing {}", path.display()))?;
                    log::info!("wrote {}", path.display());
                }
                None => println!("{}", page),
            }
        }
        Command::Inspect { input } => inspect(&input).await?,
    }
    Ok(())
}
