use clap::Subcommand;
use surfside_config::TrackerConfig;
use surfside_core::{Location, Payload, Product, Result, Segment, Source};
use surfside_tracker::Command;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every demo action in order: contexts, screen view, link click, commerce, debug
    Demo,

    /// Track a screen view
    ScreenView {
        #[arg(long, default_value = "Home")]
        name: String,
    },

    /// Track a link click
    LinkClick {
        #[arg(long, default_value = "https://example.com")]
        url: String,
    },

    /// Track a custom self-describing event
    Event {
        /// Iglu schema URI
        #[arg(long)]
        schema: String,

        /// Payload entries as key=value (repeatable)
        #[arg(long = "data", value_parser = parse_key_value)]
        data: Vec<(String, String)>,
    },

    /// Set the location context
    Location {
        #[arg(long, default_value = "40.7128", allow_hyphen_values = true)]
        latitude: String,
        #[arg(long, default_value = "-74.0060", allow_hyphen_values = true)]
        longitude: String,
        #[arg(long, default_value = "US")]
        country_code: String,
        #[arg(long, default_value = "NY")]
        state: String,
        #[arg(long, default_value = "New York")]
        city: String,
        /// Track a screen view carrying the new context
        #[arg(long, value_name = "SCREEN")]
        track: Option<String>,
    },

    /// Set the source context
    Source {
        #[arg(default_value = "updated-account-123")]
        account: String,
        #[arg(default_value = "updated-source-456")]
        source: String,
        #[arg(long, value_name = "SCREEN")]
        track: Option<String>,
    },

    /// Set the segment context
    Segment {
        #[arg(default_value = "premium-users")]
        id: String,
        #[arg(default_value = "1")]
        value: String,
        #[arg(long, value_name = "SCREEN")]
        track: Option<String>,
    },

    /// Add a product and track a `detail` commerce action
    ViewProduct {
        #[command(flatten)]
        product: ProductArgs,
    },

    /// Add a product and track a `purchase` commerce action
    Purchase {
        #[command(flatten)]
        product: ProductArgs,
    },

    /// Track a test event and force a flush
    Debug,
}

#[derive(clap::Args, Debug)]
pub struct ProductArgs {
    #[arg(long, default_value = "P12345")]
    pub id: String,
    #[arg(long, default_value = "Premium Product")]
    pub name: String,
    #[arg(long, default_value_t = 29.99)]
    pub price: f64,
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub coupon: Option<String>,
}

impl ProductArgs {
    fn build(self) -> Result<Product> {
        let mut builder = Product::builder(self.id)
            .name(self.name)
            .price(self.price)
            .quantity(self.quantity);
        if let Some(currency) = self.currency {
            builder = builder.currency(currency);
        }
        if let Some(coupon) = self.coupon {
            builder = builder.coupon(coupon);
        }
        builder.build()
    }
}

impl Commands {
    /// Tracker commands for this invocation, starting with initialization
    pub fn into_commands(self, config: TrackerConfig) -> Result<Vec<Command>> {
        let mut commands = vec![Command::Initialize(config.clone())];
        match self {
            Commands::Demo => return Command::demo_sequence(config),
            Commands::ScreenView { name } => commands.push(Command::TrackScreenView { name }),
            Commands::LinkClick { url } => {
                commands.push(Command::TrackLinkClick { target_url: url })
            }
            Commands::Event { schema, data } => commands.push(Command::TrackEvent {
                schema,
                payload: data.into_iter().collect::<Payload>(),
            }),
            Commands::Location {
                latitude,
                longitude,
                country_code,
                state,
                city,
                track,
            } => {
                let location = Location::new(latitude, longitude, country_code, state, city)?;
                commands.push(Command::SetLocation(location));
                push_screen_view(&mut commands, track);
            }
            Commands::Source {
                account,
                source,
                track,
            } => {
                commands.push(Command::SetSource(Source::new(account, source)?));
                push_screen_view(&mut commands, track);
            }
            Commands::Segment { id, value, track } => {
                commands.push(Command::SetSegment(Segment::new(id, value)?));
                push_screen_view(&mut commands, track);
            }
            Commands::ViewProduct { product } => {
                commands.push(Command::ViewProduct(product.build()?))
            }
            Commands::Purchase { product } => commands.push(Command::Purchase(product.build()?)),
            Commands::Debug => commands.push(Command::DebugFlow),
        }
        Ok(commands)
    }
}

fn push_screen_view(commands: &mut Vec<Command>, screen: Option<String>) {
    if let Some(name) = screen {
        commands.push(Command::TrackScreenView { name });
    }
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}
