//! Show command implementation.

use crate::cli::ShowArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use plct_domain::traits::RecordReader;
use plct_domain::{CompanyId, Sector, SnapshotFilter};
use plct_store::SqliteStore;

/// Execute the show command.
pub fn execute_show(args: ShowArgs, mut config: AppConfig, formatter: &Formatter) -> Result<()> {
    if let Some(db) = &args.db {
        config.store.path = db.clone();
    }
    let store = SqliteStore::open(&config.store)?;

    if let Some(id) = args.company_id {
        let id = CompanyId::from_value(id);
        let summary = store
            .company(id)?
            .ok_or_else(|| CliError::InvalidInput(format!("No company with id {}", id)))?;
        let initiatives = store.initiatives_for(id)?;
        println!("{}", formatter.format_initiatives(&summary, &initiatives)?);
        return Ok(());
    }

    let snapshot = store.snapshot(&build_filter(&args)?)?;
    println!("{}", formatter.format_snapshot(&snapshot)?);
    Ok(())
}

fn build_filter(args: &ShowArgs) -> Result<SnapshotFilter> {
    let sector = match &args.sector {
        Some(label) => Some(
            Sector::parse(label)
                .filter(|sector| !sector.is_unclassified())
                .ok_or_else(|| CliError::InvalidInput(format!("Unknown sector: {}", label)))?,
        ),
        None => None,
    };

    Ok(SnapshotFilter {
        sector,
        report_year: args.year,
        include_flagged: args.all,
        limit: args.limit,
    })
}
