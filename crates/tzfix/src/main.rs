use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tzfix_core::pipeline::DEFAULT_PAGE_SIZE;
use tzfix_core::{
    Catalog, DispatchMode, ImmichClient, InterpolationMethod, PolygonResolver, RunOptions,
    SearchFilter, TimeBound,
};

mod config;
mod report;

/// Fix capture timezones in an Immich library using each asset's GPS position
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Only process assets whose original file name matches
    #[arg(long)]
    filename: Option<String>,

    /// Only process assets taken at or after this date/time
    #[arg(long, visible_alias = "start")]
    taken_after: Option<String>,

    /// Only process assets taken at or before this date/time (a bare date covers the whole day)
    #[arg(long, visible_alias = "end")]
    taken_before: Option<String>,

    /// Infer missing GPS positions from neighbouring assets
    #[arg(long)]
    interpolate: bool,

    /// Interpolation policy: NN (nearest neighbour, default) or FF (forward fill)
    #[arg(long)]
    method: Option<InterpolationMethod>,

    /// Write corrections back to the catalog
    #[arg(long)]
    fix: bool,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Verify the URL and API key before doing anything else
    #[arg(long)]
    check_conn: bool,

    /// Assets requested per search page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn filter(&self) -> Result<SearchFilter> {
        let taken_after = self
            .taken_after
            .as_deref()
            .map(TimeBound::parse_start)
            .transpose()
            .context("invalid --taken-after")?;
        let taken_before = self
            .taken_before
            .as_deref()
            .map(TimeBound::parse_end)
            .transpose()
            .context("invalid --taken-before")?;

        Ok(SearchFilter {
            original_file_name: self.filename.clone(),
            taken_after,
            taken_before,
            ..SearchFilter::default()
        })
    }

    fn interpolation(&self) -> Option<InterpolationMethod> {
        self.interpolate.then(|| self.method.unwrap_or_default())
    }

    /// No filter and nothing asking for a scan: only print library totals.
    fn summary_only(&self, filter: &SearchFilter) -> bool {
        filter.is_unrestricted() && !self.fix && !self.dry_run && !self.interpolate
    }

    fn mode(&self) -> DispatchMode {
        if self.fix && !self.dry_run {
            DispatchMode::Live
        } else {
            DispatchMode::DryRun
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = config::load()?;
    let client = ImmichClient::new(&config).context("failed to configure Immich client")?;

    if cli.check_conn {
        match client.current_user().await {
            Ok(user) => {
                info!(email = user.email.as_deref().unwrap_or("unknown"), "auth success");
                println!("Auth success: {}", user.email.as_deref().unwrap_or("unknown"));
            }
            Err(err) => {
                error!(error = %err, "connection failed");
                eprintln!("Connection failed: {err}");
                std::process::exit(1);
            }
        }
    }

    let filter = cli.filter()?;

    if cli.method.is_some() && !cli.interpolate {
        warn!("--method has no effect without --interpolate");
    }

    if cli.summary_only(&filter) {
        return print_summary(&client, &filter).await;
    }

    if cli.fix && cli.dry_run {
        warn!("--dry-run given together with --fix; nothing will be written");
    }

    let options = RunOptions {
        filter,
        page_size: cli.page_size,
        interpolation: cli.interpolation(),
        mode: cli.mode(),
        ..RunOptions::default()
    };

    let resolver = PolygonResolver::new();
    resolver.warm_up();

    info!(
        mode = %options.mode,
        interpolation = options.interpolation.map(|m| m.tag()).unwrap_or("off"),
        "Immich timezone fixer starting"
    );
    let run_report = tzfix_core::run(&client, &resolver, &options).await;
    report::print(&run_report);

    Ok(())
}

async fn print_summary(client: &ImmichClient, filter: &SearchFilter) -> Result<()> {
    match client.count_assets(filter).await {
        Some(total) => println!("Total Assets: {total}"),
        None => println!("Total Assets: unknown (statistics endpoint unavailable)"),
    }
    println!("Detailed GPS distribution requires a full scan (use --dry-run).");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fix_without_dry_run_is_live() {
        let cli = Cli::parse_from(["tzfix", "--fix", "--start", "2024-01-01"]);
        assert_eq!(cli.mode(), DispatchMode::Live);

        let cli = Cli::parse_from(["tzfix", "--fix", "--dry-run"]);
        assert_eq!(cli.mode(), DispatchMode::DryRun);

        let cli = Cli::parse_from(["tzfix", "--filename", "IMG_"]);
        assert_eq!(cli.mode(), DispatchMode::DryRun);
    }

    #[test]
    fn method_defaults_to_nearest_neighbor() {
        let cli = Cli::parse_from(["tzfix", "--interpolate"]);
        assert_eq!(cli.interpolation(), Some(InterpolationMethod::NearestNeighbor));

        let cli = Cli::parse_from(["tzfix", "--interpolate", "--method", "FF"]);
        assert_eq!(cli.interpolation(), Some(InterpolationMethod::ForwardFill));

        let cli = Cli::parse_from(["tzfix", "--method", "FF"]);
        assert_eq!(cli.interpolation(), None);
    }

    #[test]
    fn interpolate_alone_scans_instead_of_summarising() {
        let cli = Cli::parse_from(["tzfix"]);
        assert!(cli.summary_only(&cli.filter().unwrap()));

        let cli = Cli::parse_from(["tzfix", "--interpolate"]);
        assert!(!cli.summary_only(&cli.filter().unwrap()));
        assert_eq!(cli.mode(), DispatchMode::DryRun);

        let cli = Cli::parse_from(["tzfix", "--filename", "IMG_"]);
        assert!(!cli.summary_only(&cli.filter().unwrap()));
    }

    #[test]
    fn end_alias_widens_bare_date() {
        let cli = Cli::parse_from(["tzfix", "--end", "2024-02-29"]);
        let filter = cli.filter().unwrap();
        assert_eq!(
            filter.taken_before.map(|b| b.to_string()).as_deref(),
            Some("2024-02-29T23:59:59.999999")
        );
        assert!(!filter.is_unrestricted());
    }
}
