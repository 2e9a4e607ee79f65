use crate::cli::args::CliArgs;
use crate::output::OutputFormat;
use crate::query::{SortDirection, SortKey};
use crate::view::Tab;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.page == Some(0) {
        return Err("invalid page, expected positive integer".to_string());
    }
    if args.per_page == Some(0) {
        return Err("invalid per-page, expected positive integer".to_string());
    }
    if let Some(raw) = args.sort.as_deref() {
        SortKey::parse(raw).ok_or_else(|| {
            format!("invalid --sort '{raw}', expected name, email, or company")
        })?;
    }
    if let Some(raw) = args.direction.as_deref() {
        SortDirection::parse(raw)
            .ok_or_else(|| format!("invalid --direction '{raw}', expected asc or desc"))?;
    }
    if let Some(raw) = args.tab.as_deref() {
        Tab::parse(raw)
            .ok_or_else(|| format!("invalid --tab '{raw}', expected users or companies"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --output-format '{raw}', expected text or json"))?;
    }
    if args.timeout == Some(0) {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    Ok(())
}
