mod details;
mod listing;
mod output;
mod site;
mod table;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tcgimg_core::{Filter, FilterError, Locale, PageRange, PerPage, Sort, SortDirection, SortField};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tcgimg")]
#[command(about = "Collect card image URLs from tcgcollector.com")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    listing: ListingArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every card's detail page into CSV or JSON.
    Details(DetailsArgs),
}

/// Listing mode flags. `--csv` switches to table mode.
#[derive(Debug, Args)]
struct ListingArgs {
    /// Release date order.
    #[arg(long, value_enum, conflicts_with = "sort_by")]
    order: Option<ReleaseOrder>,

    /// Rarity order.
    #[arg(long, value_enum)]
    sort_by: Option<RarityOrder>,

    /// Cards per listing page: 30, 60 or 120.
    #[arg(long, default_value = "60", value_parser = parse_per_page)]
    per_page: PerPage,

    #[arg(long)]
    search: Option<String>,

    #[arg(long, default_value_t = 1)]
    start_page: u32,

    /// Last page to fetch. Defaults to the page count the site advertises.
    #[arg(long)]
    end_page: Option<u32>,

    /// Output file. Defaults to a name built from the search term and time.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Japanese card catalog.
    #[arg(long)]
    jp: bool,

    /// Ignore the advertised page count and stop at the first empty page.
    #[arg(long)]
    force: bool,

    /// Resolve the (name, number) rows of this CSV file, read from the
    /// input directory.
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DetailsArgs {
    #[arg(long, default_value_t = 1)]
    start_page: u32,

    #[arg(long)]
    end_page: Option<u32>,

    #[arg(long)]
    jp: bool,

    #[arg(long, value_enum, default_value_t = DetailsFormat::Csv)]
    format: DetailsFormat,

    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReleaseOrder {
    #[value(alias = "oldToNew")]
    OldToNew,
    #[value(alias = "newToOld")]
    NewToOld,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RarityOrder {
    #[value(alias = "rarityDesc")]
    RarityDesc,
    #[value(alias = "rarityAsc")]
    RarityAsc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DetailsFormat {
    Csv,
    Json,
}

impl DetailsFormat {
    fn extension(self) -> &'static str {
        match self {
            DetailsFormat::Csv => "csv",
            DetailsFormat::Json => "json",
        }
    }
}

fn parse_per_page(raw: &str) -> Result<PerPage, String> {
    let n: u32 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    PerPage::try_from(n).map_err(|e| e.to_string())
}

fn locale_for(jp: bool) -> Locale {
    if jp {
        Locale::Japanese
    } else {
        Locale::Global
    }
}

impl ListingArgs {
    fn locale(&self) -> Locale {
        locale_for(self.jp)
    }

    fn sort(&self) -> Option<Sort> {
        let release = self.order.map(|order| {
            let direction = match order {
                ReleaseOrder::OldToNew => SortDirection::Ascending,
                ReleaseOrder::NewToOld => SortDirection::Descending,
            };
            Sort::new(SortField::ReleaseDate, direction)
        });
        let rarity = self.sort_by.map(|order| {
            let direction = match order {
                RarityOrder::RarityAsc => SortDirection::Ascending,
                RarityOrder::RarityDesc => SortDirection::Descending,
            };
            Sort::new(SortField::Rarity, direction)
        });
        release.or(rarity)
    }

    fn filter(&self) -> Filter {
        Filter::new(
            self.search.as_deref(),
            self.locale(),
            self.sort(),
            self.per_page,
        )
    }

    fn page_range(&self) -> Result<PageRange, FilterError> {
        PageRange::new(self.start_page, self.end_page, self.force)
    }
}

impl DetailsArgs {
    fn locale(&self) -> Locale {
        locale_for(self.jp)
    }

    /// Newest cards first, largest pages.
    fn filter(&self) -> Filter {
        Filter::new(
            None,
            self.locale(),
            Some(Sort::new(SortField::ReleaseDate, SortDirection::Descending)),
            PerPage::OneHundredTwenty,
        )
    }

    fn page_range(&self) -> Result<PageRange, FilterError> {
        PageRange::new(self.start_page, self.end_page, false)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = tcgimg_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Details(args)) => details::run_details(&config, &args).await,
        None => match &cli.listing.csv {
            Some(csv) => table::run_table(&config, &cli.listing, csv).await,
            None => listing::run_listing(&config, &cli.listing).await,
        },
    }
}
