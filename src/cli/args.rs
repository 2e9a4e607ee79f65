use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "userdir",
    version,
    about = "user and company directory browser",
    long_about = "userdir fetches a user list from a JSON API, rolls it up by company, and lets you search, sort, page through and export it.\n\nExamples:\n  userdir --api-url https://jsonplaceholder.typicode.com/users\n  userdir --search clem --sort email --direction desc\n  userdir --tab companies --page 2\n  userdir --user 3 --export-user 3 --output-dir ./exports\n\nTip: set USERDIR_API_URL or api_url in ~/.userdir/config.yml to keep invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'u',
        long = "api-url",
        visible_alias = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "User list endpoint (overrides USERDIR_API_URL and the config file)."
    )]
    pub api_url: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        visible_alias = "cfg",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.userdir/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file if none exists."
    )]
    pub init_config: bool,

    #[arg(
        short = 's',
        long = "search",
        value_name = "TERM",
        help_heading = "Query",
        help = "Case-insensitive filter on name or email (companies: name)."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'k',
        long = "sort",
        value_name = "KEY",
        help_heading = "Query",
        help = "User sort column (name, email or company)."
    )]
    pub sort: Option<String>,

    #[arg(
        short = 'd',
        long = "direction",
        visible_alias = "dir",
        value_name = "DIR",
        help_heading = "Query",
        help = "Sort direction (asc or desc)."
    )]
    pub direction: Option<String>,

    #[arg(
        long = "no-sort",
        conflicts_with = "sort",
        help_heading = "Query",
        help = "Keep users in source order."
    )]
    pub no_sort: bool,

    #[arg(
        short = 't',
        long = "tab",
        value_name = "TAB",
        help_heading = "Query",
        help = "Directory to show (users or companies)."
    )]
    pub tab: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Query",
        help = "Page to show, starting at 1."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'n',
        long = "per-page",
        visible_alias = "items-per-page",
        value_name = "N",
        help_heading = "Query",
        help = "Rows per page."
    )]
    pub per_page: Option<usize>,

    #[arg(
        short = 'i',
        long = "user",
        value_name = "ID",
        help_heading = "Detail",
        help = "Show the full record of one user."
    )]
    pub user: Option<u64>,

    #[arg(
        short = 'E',
        long = "export-all",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "",
        help_heading = "Output",
        help = "Export the filtered and sorted users (all pages), optionally to FILE."
    )]
    pub export_all: Option<String>,

    #[arg(
        short = 'e',
        long = "export-user",
        value_name = "ID",
        help_heading = "Output",
        help = "Export one user's details."
    )]
    pub export_user: Option<u64>,

    #[arg(
        short = 'o',
        long = "output-dir",
        visible_alias = "out",
        value_name = "DIR",
        help_heading = "Output",
        help = "Directory exports are written to."
    )]
    pub output_dir: Option<String>,

    #[arg(
        short = 'A',
        long = "output-format",
        visible_alias = "of",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Export format (text or json)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "no-color",
        visible_alias = "nc",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'T',
        long = "timeout",
        visible_alias = "to",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'x',
        long = "proxy",
        visible_alias = "px",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,
}
