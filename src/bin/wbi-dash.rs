use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use wbi_dash::dashboard::{CountryProfile, Dashboard, GAP_COLUMN, Panel};
use wbi_dash::{AlignedTable, Derived, FetcherConfig, IndicatorFetcher, Series};
use wbi_dash::{align, stats, storage};

#[derive(Parser, Debug)]
#[command(
    name = "wbi-dash",
    version,
    about = "Fetch and align World Bank financial-inclusion indicators"
)]
struct Cli {
    #[command(flatten)]
    fetch: FetchOpts,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct FetchOpts {
    /// API base URL.
    #[arg(long, global = true, default_value = wbi_dash::config::DEFAULT_BASE_URL)]
    base_url: String,
    /// Request timeout in seconds.
    #[arg(long, global = true, default_value_t = 10)]
    timeout_secs: u64,
    /// Records per page.
    #[arg(long, global = true, default_value_t = 100)]
    per_page: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one indicator series (and optionally save it and print stats).
    Series(SeriesArgs),
    /// Fetch several indicators and inner-join them on year.
    Align(AlignArgs),
    /// Build every panel of a country dashboard and print a one-line status each.
    Dashboard(DashboardArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct SeriesArgs {
    /// Two-letter country code (e.g., IN, GB)
    #[arg(short, long)]
    country: String,
    /// Indicator code (e.g., FS.AST.PRVT.GD.ZS)
    #[arg(short, long)]
    indicator: String,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Print summary statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// Two-letter country code (e.g., IN, GB)
    #[arg(short, long)]
    country: String,
    /// Indicator codes separated by comma or semicolon (at least two)
    #[arg(short, long)]
    indicators: String,
    /// Add a column NAME = first indicator - second indicator.
    #[arg(long, value_name = "NAME")]
    difference: Option<String>,
    /// Save results to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    /// Dashboard profile: india or uk
    #[arg(short, long, default_value = "india")]
    profile: String,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn out_format(path: &Path, format: Option<&OutFormat>) -> String {
    match format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = FetcherConfig {
        base_url: cli.fetch.base_url,
        timeout_secs: cli.fetch.timeout_secs,
        per_page: cli.fetch.per_page,
        ..FetcherConfig::default()
    };
    let fetcher = IndicatorFetcher::new(config)?;
    match cli.cmd {
        Command::Series(args) => cmd_series(&fetcher, args),
        Command::Align(args) => cmd_align(&fetcher, args),
        Command::Dashboard(args) => cmd_dashboard(&fetcher, args),
    }
}

fn cmd_series(fetcher: &IndicatorFetcher, args: SeriesArgs) -> Result<()> {
    let series = fetcher.fetch(&args.country, &args.indicator);
    if series.is_empty() {
        eprintln!("Data not available for {}.", series.key());
    }

    if let Some(path) = args.out.as_ref() {
        match out_format(path, args.format.as_ref()).as_str() {
            "csv" => storage::save_series_csv(&series, path)?,
            "json" => storage::save_series_json(&series, path)?,
            other => bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", series.len(), path.display());
    } else {
        print_series(&series);
    }

    if args.stats {
        let s = stats::summarize(&series);
        println!(
            "{}  count={}  min={} max={} mean={} median={}",
            s.key,
            s.count,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
        if let Some(latest) = stats::latest_change(&series) {
            println!(
                "latest {}={} delta={}",
                latest.year,
                fmt_opt(Some(latest.value)),
                fmt_opt(latest.delta)
            );
        }
    }
    Ok(())
}

fn cmd_align(fetcher: &IndicatorFetcher, args: AlignArgs) -> Result<()> {
    let indicators = parse_list(&args.indicators);
    if indicators.len() < 2 {
        bail!("--indicators needs at least two codes");
    }
    let series: Vec<Series> = indicators
        .iter()
        .map(|ind| fetcher.fetch(&args.country, ind))
        .collect();
    let refs: Vec<&Series> = series.iter().collect();

    let derived: Vec<Derived> = args
        .difference
        .into_iter()
        .map(|name| Derived::Difference {
            left: 0,
            right: 1,
            name,
        })
        .collect();
    let table = align::align_with(&refs, &derived)?;

    if let Some(path) = args.out.as_ref() {
        match out_format(path, args.format.as_ref()).as_str() {
            "csv" => storage::save_table_csv(&table, path)?,
            "json" => storage::save_table_json(&table, path)?,
            other => bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", table.len(), path.display());
    } else {
        print_table(&table);
    }
    Ok(())
}

fn cmd_dashboard(fetcher: &IndicatorFetcher, args: DashboardArgs) -> Result<()> {
    let Some(profile) = CountryProfile::lookup(&args.profile) else {
        bail!("unknown profile {:?} (expected india or uk)", args.profile);
    };
    let dash = Dashboard::new(profile, fetcher);
    println!("{} ({})", profile.title, profile.code);

    let trend = |label: &str, panel: Panel<wbi_dash::dashboard::TrendPanel>| match panel {
        Panel::Available(t) => match t.latest {
            Some(l) => println!(
                "  {label}: {} obs, latest {}={} delta={}",
                t.series.len(),
                l.year,
                fmt_opt(Some(l.value)),
                fmt_opt(l.delta)
            ),
            None => println!("  {label}: {} obs", t.series.len()),
        },
        Panel::Unavailable(msg) => println!("  {label}: {msg}"),
    };
    trend("Credit vs GDP", dash.credit_to_gdp());
    trend("Account Ownership", dash.account_ownership());
    trend("Interest Rate Spread", dash.interest_rate_spread());

    match dash.gender_gap() {
        Panel::Available(t) => {
            let last = t.column(GAP_COLUMN).and_then(|c| c.last().copied());
            println!("  Gender Gap: {} years, latest gap={}", t.len(), fmt_opt(last));
        }
        Panel::Unavailable(msg) => println!("  Gender Gap: {msg}"),
    }

    match dash.credit_vs_inclusion() {
        Panel::Available(c) => match c.fit {
            Some(fit) => println!(
                "  Trend Analysis: {} pairs, slope={} r2={}",
                c.pairs.len(),
                fmt_opt(Some(fit.slope)),
                fmt_opt(Some(fit.r_squared))
            ),
            None => println!("  Trend Analysis: {} pairs, no trendline", c.pairs.len()),
        },
        Panel::Unavailable(msg) => println!("  Trend Analysis: {msg}"),
    }
    Ok(())
}

fn print_series(series: &Series) {
    println!("year\t{}", series.indicator());
    for p in series.points() {
        println!("{}\t{}", p.year, fmt_opt(Some(p.value)));
    }
}

fn print_table(table: &AlignedTable) {
    println!("year\t{}", table.columns.join("\t"));
    for row in &table.rows {
        let vals: Vec<String> = row.values.iter().map(|v| fmt_opt(Some(*v))).collect();
        println!("{}\t{}", row.year, vals.join("\t"));
    }
}
