use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::client::{ClientOptions, DirectoryClient};
use crate::config::{self, ConfigFile};
use crate::directory::{Company, User};
use crate::output::{self, ExportDocument, OutputFormat};
use crate::pagination::Page;
use crate::player::{MediaSource, DEFAULT_MEDIA_PATH};
use crate::query::{SortDirection, SortKey, SortState};
use crate::session::{Session, DEFAULT_ITEMS_PER_PAGE};
use crate::store::{DirectoryStore, RefreshOutcome};
use crate::utils::{format_bool, truncate_cell};
use crate::view::{Tab, ViewState, Viewport};

pub const API_URL_ENV: &str = "USERDIR_API_URL";

/// Terminal columns below which the listing switches to the narrow layout.
pub const TERMINAL_BREAKPOINT: u32 = 100;

fn print_banner() {
    const BANNER: &str = r#"
                             ___
  __  __________  _________/ (_)____
 / / / / ___/ _ \/ ___/ __  / / ___/
/ /_/ (__  )  __/ /  / /_/ / / /
\__,_/____/\___/_/   \__,_/_/_/
"#;
    print!("{}", BANNER.cyan());
    println!("        v{} - user directory browser", env!("CARGO_PKG_VERSION"));
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct RunConfig {
    api_url: String,
    media: MediaSource,
    search: String,
    sort: SortState,
    tab: Tab,
    page: usize,
    per_page: usize,
    user: Option<u64>,
    export_all: Option<Option<String>>,
    export_user: Option<u64>,
    output_dir: PathBuf,
    output_format: Option<String>,
    no_color: bool,
    timeout: u64,
    proxy: Option<String>,
}

fn parse_sort(
    key: Option<&str>,
    direction: Option<&str>,
    no_sort: bool,
) -> Result<SortState, String> {
    if no_sort {
        return Ok(SortState::unsorted());
    }
    let mut sort = SortState::default();
    if let Some(raw) = key {
        sort.key = Some(
            SortKey::parse(raw)
                .ok_or_else(|| format!("invalid sort '{raw}', expected name, email, or company"))?,
        );
    }
    if let Some(raw) = direction {
        sort.direction = SortDirection::parse(raw)
            .ok_or_else(|| format!("invalid direction '{raw}', expected asc or desc"))?;
    }
    Ok(sort)
}

fn build_run_config(
    args: CliArgs,
    cfg: ConfigFile,
    env_api_url: Option<String>,
) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let api_url = args
        .api_url
        .or(env_api_url.filter(|u| !u.trim().is_empty()))
        .or(cfg.api_url)
        .unwrap_or_default();

    let media_path = cfg
        .media_path
        .unwrap_or_else(|| DEFAULT_MEDIA_PATH.to_string());
    let media = MediaSource {
        path: config::expand_tilde(&media_path),
    };

    let per_page = args
        .per_page
        .or(cfg.items_per_page)
        .unwrap_or(DEFAULT_ITEMS_PER_PAGE);
    if per_page == 0 {
        return Err("invalid items_per_page, expected positive integer".to_string());
    }
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let sort_key = args.sort.or(cfg.sort);
    let direction = args.direction.or(cfg.direction);
    let sort = parse_sort(sort_key.as_deref(), direction.as_deref(), args.no_sort)?;

    let tab = match args.tab.or(cfg.tab) {
        Some(raw) => Tab::parse(&raw)
            .ok_or_else(|| format!("invalid tab '{raw}', expected users or companies"))?,
        None => Tab::default(),
    };

    let output_format = args.output_format.or(cfg.output_format);
    if let Some(raw) = output_format.as_deref() {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text or json"))?;
    }
    let output_dir = config::expand_tilde(
        &args
            .output_dir
            .or(cfg.output_dir)
            .unwrap_or_else(|| ".".to_string()),
    );
    let export_all = args
        .export_all
        .map(|raw| Some(config::expand_tilde_string(&raw)).filter(|p| !p.is_empty()));

    Ok(RunConfig {
        api_url,
        media,
        search: args.search.unwrap_or_default(),
        sort,
        tab,
        page: args.page.unwrap_or(1),
        per_page,
        user: args.user,
        export_all,
        export_user: args.export_user,
        output_dir,
        output_format,
        no_color,
        timeout,
        proxy,
    })
}

fn terminal_width() -> u32 {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| u32::from(w))
        .unwrap_or(TERMINAL_BREAKPOINT)
}

fn sort_arrow(sort: SortState, key: SortKey) -> &'static str {
    match sort.indicator(key) {
        Some(SortDirection::Asc) => " ▲",
        Some(SortDirection::Desc) => " ▼",
        None => "",
    }
}

fn render_nav(active: Tab) -> String {
    [Tab::Users, Tab::Companies]
        .iter()
        .map(|tab| {
            if *tab == active {
                format!("[{}]", tab.noun()).bold().to_string()
            } else {
                format!(" {} ", tab.noun()).dimmed().to_string()
            }
        })
        .join(" ")
}

fn render_users_table(page: &Page<Arc<User>>, sort: SortState, viewport: Viewport) -> String {
    let mut out = String::new();
    match viewport {
        Viewport::Wide => {
            let header = format!(
                "{:<5} {:<24} {:<30} {:<24}",
                "ID",
                format!("Name{}", sort_arrow(sort, SortKey::Name)),
                format!("Email{}", sort_arrow(sort, SortKey::Email)),
                format!("Company{}", sort_arrow(sort, SortKey::CompanyName)),
            );
            out.push_str(&header.bold().to_string());
            out.push('\n');
            for user in &page.items {
                out.push_str(&format!(
                    "{:<5} {:<24} {:<30} {:<24}\n",
                    user.id,
                    truncate_cell(&user.name, 24),
                    truncate_cell(&user.email, 30),
                    truncate_cell(&user.company_name, 24),
                ));
            }
        }
        Viewport::Narrow => {
            let header = format!(
                "{:<20} {:<24}",
                format!("Name{}", sort_arrow(sort, SortKey::Name)),
                format!("Email{}", sort_arrow(sort, SortKey::Email)),
            );
            out.push_str(&header.bold().to_string());
            out.push('\n');
            for user in &page.items {
                out.push_str(&format!(
                    "{:<20} {:<24}\n",
                    truncate_cell(&user.name, 20),
                    truncate_cell(&user.email, 24),
                ));
            }
        }
    }
    out
}

fn render_companies_table(page: &Page<Company>) -> String {
    let mut out = format!("{:<30} {:>6}", "Company ▲", "Users")
        .bold()
        .to_string();
    out.push('\n');
    for company in &page.items {
        let members = company.users.iter().map(|u| u.name.as_str()).join(", ");
        out.push_str(&format!(
            "{:<30} {:>6}  {}\n",
            truncate_cell(&company.name, 30),
            company.user_count,
            members.dimmed()
        ));
    }
    out
}

fn render_page_controls<T>(page: &Page<T>) -> Option<String> {
    if !page.has_controls() {
        return None;
    }
    let prev = if page.has_previous() {
        "« Prev".normal()
    } else {
        "« Prev".dimmed()
    };
    let next = if page.has_next() {
        "Next »".normal()
    } else {
        "Next »".dimmed()
    };
    let numbers = page
        .page_numbers()
        .map(|n| {
            if n == page.current_page {
                format!("[{n}]").bold().to_string()
            } else {
                n.to_string()
            }
        })
        .join(" ");
    Some(format!("{prev}  {numbers}  {next}"))
}

fn render_user_detail(user: &User) -> String {
    let rows = [
        ("ID", user.id.to_string()),
        ("Name", user.name.clone()),
        ("Email", user.email.clone()),
        ("Company", user.company_name.clone()),
        ("Phone", user.phone.clone()),
        ("Website", user.website.clone()),
        ("Address", user.address.clone()),
    ];
    let mut out = "User Details".bold().to_string();
    out.push('\n');
    for (label, value) in rows {
        out.push_str(&format!(":: {:<10}: {}\n", label, value));
    }
    out
}

fn print_directory(session: &mut Session) {
    let tab = session.view().active_tab();
    let viewport = session.view().viewport();
    let sort = session.sort();

    if session.view().sidebar_open() {
        println!("{}", render_nav(tab));
        println!();
    }
    println!("{}", tab.title().bold().underline());

    let found = match tab {
        Tab::Users => session.query().users_found_label(),
        Tab::Companies => session.query().companies_found_label(),
    };
    println!("{}", found.dimmed());
    println!();

    let (table, range, controls) = match tab {
        Tab::Users => {
            let page = session.users_page();
            (
                render_users_table(&page, sort, viewport),
                page.range_label(tab.noun()),
                render_page_controls(&page),
            )
        }
        Tab::Companies => {
            let page = session.companies_page();
            (
                render_companies_table(&page),
                page.range_label(tab.noun()),
                render_page_controls(&page),
            )
        }
    };
    print!("{table}");
    println!();
    println!("{}", range.dimmed());
    if let Some(controls) = controls {
        println!("{controls}");
    }
}

async fn save_export(dir: &Path, doc: &ExportDocument) -> Result<(), String> {
    let path = output::save_document(dir, doc)
        .await
        .map_err(|e| e.to_string())?;
    println!(":: {:<10}: {}", "Saved", path.display().to_string().green());
    Ok(())
}

/// Splits an explicit export file path into the directory and file name to save under.
fn split_export_path(path: &str) -> (PathBuf, Option<String>) {
    let path = Path::new(path);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path.file_name().map(|n| n.to_string_lossy().to_string());
    (dir, name)
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    let client = DirectoryClient::new(ClientOptions {
        api_url: run.api_url.clone(),
        timeout_seconds: run.timeout,
        proxy: run.proxy.clone(),
    })
    .map_err(|e| format!("{e} (use --api-url, {API_URL_ENV}, or api_url in the config file)"))?;

    format_kv_line("Source", client.url());
    format_kv_line("Tab", run.tab.noun());
    if !run.search.is_empty() {
        format_kv_line("Search", &run.search);
    }
    let sort_label = match run.sort.key {
        Some(key) => format!(
            "{} {}",
            key.label(),
            match run.sort.direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            }
        ),
        None => "none".to_string(),
    };
    format_kv_line("Sort", &sort_label);
    format_kv_line("Per page", &run.per_page.to_string());
    format_kv_line(
        "Media",
        &format!(
            "{} (present: {})",
            run.media.path.display(),
            format_bool(run.media.path.exists())
        ),
    );
    println!();

    let store = DirectoryStore::new();
    let spinner = ProgressBar::new_spinner();
    spinner.set_draw_target(ProgressDrawTarget::stderr());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_style(
        ProgressStyle::with_template(":: {spinner} {msg} [{elapsed_precise}]")
            .map_err(|e| format!("failed to build progress bar style: {e}"))?,
    );
    spinner.set_message("Loading users...");
    let outcome = store.refresh(&client).await;
    spinner.finish_and_clear();

    match outcome.map_err(|e| format!("failed to load users: {e}"))? {
        RefreshOutcome::Refreshed { users, companies } => {
            info!(users, companies, "directory loaded");
        }
        RefreshOutcome::Skipped => debug!("refresh skipped"),
    }

    let view = ViewState::new(terminal_width(), TERMINAL_BREAKPOINT);
    let mut session = Session::new(run.per_page, view).map_err(|e| e.to_string())?;
    session.set_snapshot(store.snapshot());
    session.set_search_term(run.search.clone());
    session.set_sort(run.sort);
    session.select_tab(run.tab);
    session.go_to_page(run.page);
    if session.current_page() != run.page {
        println!(
            "{}",
            format!(
                ":: page {} is out of range, showing page {}",
                run.page,
                session.current_page()
            )
            .yellow()
        );
    }

    print_directory(&mut session);

    if let Some(id) = run.user {
        let user = session
            .select_user(id)
            .ok_or_else(|| format!("no user with id {id} in the current results"))?;
        println!();
        print!("{}", render_user_detail(&user));
    }

    if let Some(id) = run.export_user {
        session
            .select_user(id)
            .ok_or_else(|| format!("no user with id {id} in the current results to export"))?;
        let format = output::resolve_format(run.output_format.as_deref(), None);
        if let Some(doc) = session.export_selected(format).map_err(|e| e.to_string())? {
            println!();
            save_export(&run.output_dir, &doc).await?;
        }
    }

    if let Some(target) = run.export_all.as_ref() {
        let format = output::resolve_format(run.output_format.as_deref(), target.as_deref());
        let mut doc = session.export_all(format).map_err(|e| e.to_string())?;
        let dir = match target.as_deref() {
            Some(path) => {
                let (dir, name) = split_export_path(path);
                if let Some(name) = name {
                    doc.filename = name;
                }
                dir
            }
            None => run.output_dir.clone(),
        };
        println!();
        save_export(&dir, &doc).await?;
    }

    Ok(())
}

fn init_config_file(path: Option<&str>) -> Result<(), String> {
    let path = match path {
        Some(p) => config::expand_tilde(p),
        None => config::default_config_path()
            .ok_or_else(|| "could not determine home directory".to_string())?,
    };
    config::ensure_default_config_file(&path)?;
    println!(":: {:<10}: {}", "Config", path.display());
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_logging(args.verbose);

    if args.init_config {
        return init_config_file(args.config.as_deref());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let env_api_url = std::env::var(API_URL_ENV).ok();
    let run = build_run_config(args, cfg, env_api_url)?;
    debug!(?run, "resolved run config");

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
