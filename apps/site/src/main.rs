mod config;
mod page;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use clap::{Parser, Subcommand};
use shared::{
    domain::{DonationFrequency, SlideId},
    error::ApiError,
};
use site_client::{
    calendar::embed_url, checkout::user_message, CalendarClient, CalendarView, CheckoutClient,
    CheckoutRedirector, CheckoutTarget, EventsClient, EventsView, Listing, NewsletterClient,
    RssTicker, SiteClientError, TickerView,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Settings, DEFAULT_CONFIG_FILE},
    page::{LogPresentation, Page, PageEvent, PageLayout},
};

#[derive(Parser, Debug)]
#[command(name = "site", about = "Nature center site widgets from the command line")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a newsletter signup.
    Subscribe {
        #[arg(long)]
        email: String,
        /// Page path the form sits on; decides the reported source.
        #[arg(long, default_value = "/")]
        page: String,
    },
    /// List events from the events sheet.
    Events {
        #[arg(long)]
        all: bool,
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// Upcoming events from the public calendar.
    Calendar {
        #[arg(long)]
        max: Option<u32>,
    },
    /// Aggregated nature news ticker.
    News,
    Donate {
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        monthly: bool,
        #[arg(long)]
        email: Option<String>,
    },
    Membership {
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Run the hero carousel against real timers and log each slide change.
    CarouselDemo {
        #[arg(long, default_value_t = 3)]
        slides: usize,
        #[arg(long, default_value_t = 3)]
        ticks: u32,
    },
}

/// Prints the hosted checkout target instead of opening a browser.
struct LoggingRedirector;

#[async_trait]
impl CheckoutRedirector for LoggingRedirector {
    async fn redirect(
        &self,
        publishable_key: &str,
        target: &CheckoutTarget,
    ) -> Result<(), SiteClientError> {
        info!(live = publishable_key.starts_with("pk_live_"), "handing off to checkout");
        match target {
            CheckoutTarget::Price(options) => {
                let rendered = serde_json::to_string_pretty(options)
                    .unwrap_or_else(|err| format!("<unprintable redirect options: {err}>"));
                println!("redirectToCheckout {rendered}");
            }
            CheckoutTarget::Session(session) => println!("redirectToCheckout sessionId={session}"),
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let settings = config::load_settings(&args.config)?;
    let http = site_client::http_client()?;

    match args.command {
        Command::Subscribe { email, page } => {
            let client = NewsletterClient::new(http, settings.newsletter_script_url.clone());
            let message = client.submit(&email, &page).await;
            println!("[{:?}] {}", message.kind, message.text);
        }
        Command::Events { all, category } => {
            let client = EventsClient::new(http, settings.events_api_url.clone());
            let listing = if all { Listing::All } else { Listing::Homepage };
            print_events(client.view(listing).await, &category);
        }
        Command::Calendar { max } => {
            let calendar = &settings.calendar;
            let client =
                CalendarClient::new(http, calendar.calendar_id.clone(), calendar.api_key.clone());
            let max_results = max.unwrap_or(calendar.max_results);
            print_calendar(client.view(Utc::now(), max_results).await);
            println!("embed: {}", embed_url(&calendar.calendar_id, &calendar.timezone));
        }
        Command::News => {
            let ticker = RssTicker::new(http, settings.news.clone());
            print_news(ticker.view(Utc::now()).await);
        }
        Command::Donate {
            amount,
            monthly,
            email,
        } => {
            let client = CheckoutClient::new(http, settings.checkout.clone(), LoggingRedirector);
            let frequency = if monthly {
                DonationFrequency::Monthly
            } else {
                DonationFrequency::OneTime
            };
            let cancel_url = page_url(&settings, "/support/donate.html");
            if let Err(err) = client
                .donate(amount, frequency, email.as_deref(), &cancel_url)
                .await
            {
                warn!(error = %ApiError::from(&err), "checkout failed");
                bail!(user_message(&err));
            }
        }
        Command::Membership { level, email } => {
            let client = CheckoutClient::new(http, settings.checkout.clone(), LoggingRedirector);
            let cancel_url = page_url(&settings, "/support/membership.html");
            if let Err(err) = client
                .join(level.as_deref(), email.as_deref(), &cancel_url)
                .await
            {
                warn!(error = %ApiError::from(&err), "checkout failed");
                bail!(user_message(&err));
            }
        }
        Command::CarouselDemo { slides, ticks } => run_carousel_demo(&settings, slides, ticks).await?,
    }

    Ok(())
}

fn page_url(settings: &Settings, path: &str) -> String {
    format!("{}{path}", settings.checkout.origin.trim_end_matches('/'))
}

fn print_events(view: EventsView, category: &str) {
    match view {
        EventsView::Loading => println!("Loading events..."),
        EventsView::Empty(message) | EventsView::Failed(message) => println!("{message}"),
        EventsView::Loaded(cards) => {
            for card in site_client::events::filter_by_category(&cards, category) {
                println!("{} | {} | {}", card.name, card.when(), card.price_label);
                if let Some(spots) = &card.spots_label {
                    println!("    {spots}");
                }
            }
        }
    }
}

fn print_calendar(view: CalendarView) {
    match view {
        CalendarView::Empty(message) | CalendarView::Failed(message) => println!("{message}"),
        CalendarView::Loaded(entries) => {
            for entry in entries {
                let time = entry.time_range.as_deref().unwrap_or("All day");
                println!("{} {:>2}  {}  ({time})", entry.month, entry.day, entry.title);
            }
        }
    }
}

fn print_news(view: TickerView) {
    match view {
        TickerView::Empty(message) | TickerView::Failed(message) => println!("{message}"),
        TickerView::Loaded(entries) => {
            for entry in entries {
                println!("{}: {} ({})", entry.source, entry.title, entry.time_ago);
            }
        }
    }
}

async fn run_carousel_demo(settings: &Settings, slides: usize, ticks: u32) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let layout = PageLayout {
        slides: (0..slides)
            .map(|i| SlideId::new(format!("hero-{i}")))
            .collect(),
        indicators: slides,
        nav: settings.nav.clone(),
        viewport_width: settings.viewport_width,
    };
    let mut page = Page::new(layout, LogPresentation, settings.carousel.clone(), tx.clone())
        .context("failed to build carousel page")?;

    let delay = settings.carousel.autoplay_delay();
    let run_for = delay * ticks + delay / 2;
    tokio::spawn(async move {
        tokio::time::sleep(run_for).await;
        let _ = tx.send(PageEvent::Unload);
    });

    page.run(&mut rx).await;
    println!(
        "{} transitions in {run_for:?}, ended on slide {} (mobile nav: {})",
        page.transition_count(),
        page.carousel().active_index(),
        page.nav().is_mobile()
    );
    Ok(())
}
