use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fee_ledger::export::{self, ExportFormat};
use fee_ledger::{
    DuePolicy, LedgerConfig, LedgerError, Library, Member, Money, SafeTimeProvider, SqliteStore, TimeSource,
    UnknownMemberPolicy,
};

/// member fees and dues for a library or coaching center
#[derive(Debug, Parser)]
#[command(name = "fee-ledger", version)]
struct Cli {
    /// sqlite database file
    #[arg(long, global = true, default_value = "library.db")]
    db: PathBuf,

    /// json ledger configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// fail due lookups for unknown codes instead of reporting zero
    #[arg(long, global = true)]
    strict: bool,

    /// calculation date instead of today (YYYY-MM-DD)
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// register a new member
    AddMember {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        guardian: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        contact: String,
        /// defaults to today
        #[arg(long)]
        admission_date: Option<NaiveDate>,
        #[arg(long)]
        fee: Money,
    },
    /// record a payment
    Pay {
        #[arg(long)]
        code: String,
        #[arg(long)]
        amount: Money,
        /// defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// member details, current due and payment history
    Show {
        #[arg(long)]
        code: String,
    },
    /// dues for every member
    Report {
        /// only members with a positive due
        #[arg(long)]
        pending: bool,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// write to a file instead of stdout; xlsx defaults to report.xlsx
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
    Xlsx,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => ExportFormat::Csv,
            Format::Json => ExportFormat::Json,
            Format::Xlsx => ExportFormat::Xlsx,
        }
    }
}

fn init_logger(verbose: bool) {
    let default_filter = if verbose { "fee_ledger=debug,info" } else { "fee_ledger=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr)
                .compact(),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<LedgerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            LedgerConfig::from_json(&json)?
        }
        None => LedgerConfig::default(),
    };
    if cli.strict {
        let pre_admission = config.due_policy.pre_admission;
        config = config.with_due_policy(DuePolicy {
            unknown_member: UnknownMemberPolicy::Strict,
            pre_admission,
        });
    }
    Ok(config)
}

/// binary formats never go to a terminal
fn report_destination(format: ExportFormat, output: Option<PathBuf>) -> Option<PathBuf> {
    match (output, format) {
        (Some(path), _) => Some(path),
        (None, ExportFormat::Xlsx) => Some(PathBuf::from(format.file_name("report"))),
        (None, _) => None,
    }
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        // bad operator input exits 2, anything else 1
        let input_error = err
            .downcast_ref::<LedgerError>()
            .map(LedgerError::is_input_error)
            .unwrap_or(false);
        std::process::exit(if input_error { 2 } else { 1 });
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("failed to open database {}", cli.db.display()))?;
    let mut library = Library::new(store, config)?;

    let time = SafeTimeProvider::new(TimeSource::System);
    let today = cli.as_of.unwrap_or_else(|| Utc::now().date_naive());

    match cli.command {
        Command::AddMember {
            code,
            name,
            guardian,
            address,
            contact,
            admission_date,
            fee,
        } => {
            let member = Member::builder()
                .code(code)
                .name(name)
                .guardian_name(guardian)
                .address(address)
                .contact(contact)
                .monthly_fee(fee);
            let member = match admission_date {
                Some(date) => member.admission_date(date).build()?,
                None => member.build_on(today)?,
            };
            let member = library.add_member(member, &time)?;
            println!("member {} added", member.code);
        }
        Command::Pay { code, amount, date } => {
            let record = library.record_payment_on(&code, amount, date.unwrap_or(today), &time)?;
            println!(
                "payment #{} of {} recorded for {} on {}",
                record.id, record.amount, record.code, record.date
            );
        }
        Command::Show { code } => {
            let statement = library.member_statement(&code, today)?;
            let member = &statement.member;
            println!("Name:           {}", member.name);
            println!("Guardian:       {}", member.guardian_name);
            println!("Address:        {}", member.address);
            println!("Contact:        {}", member.contact);
            println!("Admission date: {}", member.admission_date);
            println!("Monthly fee:    {}", member.monthly_fee);
            println!(
                "Current due:    {} ({} months billed, {} paid)",
                statement.due.outstanding, statement.due.billed_months, statement.due.total_paid
            );
            if statement.payments.is_empty() {
                println!("No payments yet.");
            } else {
                println!("\n{:<6} {:<12} {:>12}", "#", "Date", "Amount");
                for payment in &statement.payments {
                    println!("{:<6} {:<12} {:>12}", payment.id, payment.date.to_string(), payment.amount.to_string());
                }
            }
        }
        Command::Report {
            pending,
            format,
            output,
        } => {
            let mut report = library.build_report_on(today)?;
            if pending {
                report = report.pending_dues();
            }
            let format = ExportFormat::from(format);
            match report_destination(format, output) {
                Some(path) => {
                    export::export_to_path(&report, format, &path)?;
                    eprintln!("{} rows written to {}", report.len(), path.display());
                }
                None => export::write_report(&report, format, io::stdout().lock())?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fee_ledger::PreAdmissionPolicy;

    #[test]
    fn test_cli_parses_payment() {
        let cli = Cli::try_parse_from([
            "fee-ledger", "--db", "x.db", "pay", "--code", "A1", "--amount", "500", "--date", "2024-02-01",
        ])
        .unwrap();
        match cli.command {
            Command::Pay { code, amount, date } => {
                assert_eq!(code, "A1");
                assert_eq!(amount, Money::from_major(500));
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 1));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_strict_flag_overrides_config() {
        let cli = Cli::try_parse_from(["fee-ledger", "--strict", "report", "--pending"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert!(config.is_strict());
        assert_eq!(config.due_policy.pre_admission, PreAdmissionPolicy::ClampToOneMonth);
    }

    #[test]
    fn test_strict_flag_keeps_configured_pre_admission() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let config = LedgerConfig::default().with_due_policy(DuePolicy {
            unknown_member: UnknownMemberPolicy::ZeroDue,
            pre_admission: PreAdmissionPolicy::Propagate,
        });
        std::fs::write(&path, config.to_json_pretty().unwrap()).unwrap();

        let cli = Cli::try_parse_from([
            "fee-ledger",
            "--config",
            path.to_str().unwrap(),
            "--strict",
            "report",
        ])
        .unwrap();
        let loaded = load_config(&cli).unwrap();
        assert!(loaded.is_strict());
        assert_eq!(loaded.due_policy.pre_admission, PreAdmissionPolicy::Propagate);
    }

    #[test]
    fn test_xlsx_report_defaults_to_file() {
        let cli = Cli::try_parse_from(["fee-ledger", "report", "--format", "xlsx"]).unwrap();
        match cli.command {
            Command::Report { format, output, .. } => {
                let format = ExportFormat::from(format);
                assert_eq!(format, ExportFormat::Xlsx);
                assert_eq!(report_destination(format, output), Some(PathBuf::from("report.xlsx")));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(report_destination(ExportFormat::Csv, None), None);
        assert_eq!(
            report_destination(ExportFormat::Xlsx, Some(PathBuf::from("dues.xlsx"))),
            Some(PathBuf::from("dues.xlsx"))
        );
    }
}
