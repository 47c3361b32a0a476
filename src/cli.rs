//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::{self, CsvMarketData};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_adapter::SqliteTransactionStore;
use crate::domain::config_validation::{
    log_level, validate_config, validate_database, validate_logging,
};
use crate::domain::error::StockfolioError;
use crate::domain::investment_detail::InvestmentDetailService;
use crate::domain::ledger;
use crate::domain::transaction::{ListQuery, NewTransaction, TransactionUpdate};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::transaction_port::TransactionStore;

#[derive(Parser, Debug)]
#[command(name = "stockfolio", about = "Stock transaction ledger and investment performance")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true, default_value = "stockfolio.ini")]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a transaction
    Add(AddArgs),
    /// Record every transaction in a CSV file (all or nothing)
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Show one transaction
    Show { id: i64 },
    /// List transactions page by page
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        per_page: u32,
        #[arg(long, default_value = "transaction_date")]
        sort_by: String,
        #[arg(long, default_value = "asc")]
        order: String,
    },
    /// Change fields of a transaction
    Update(UpdateArgs),
    /// Delete a transaction
    Delete { id: i64 },
    /// Investment performance for one transaction or a whole symbol
    Detail {
        #[arg(long, conflicts_with = "symbol", required_unless_present = "symbol")]
        id: Option<i64>,
        #[arg(long)]
        symbol: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub ticker: String,
    /// Market suffix appended to the ticker, e.g. ".SA"
    #[arg(long, default_value = "")]
    pub suffix: String,
    #[arg(long = "type")]
    pub transaction_type: String,
    #[arg(long)]
    pub quantity: i64,
    #[arg(long)]
    pub price: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date: String,
}

impl AddArgs {
    fn to_request(&self) -> NewTransaction {
        NewTransaction {
            ticker_symbol: self.ticker.clone(),
            ticker_suffix: self.suffix.clone(),
            transaction_type: self.transaction_type.clone(),
            quantity: self.quantity,
            price_per_unit: self.price.clone(),
            transaction_date: self.date.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: i64,
    #[arg(long)]
    pub ticker: Option<String>,
    #[arg(long, requires = "ticker")]
    pub suffix: Option<String>,
    #[arg(long = "type")]
    pub transaction_type: Option<String>,
    #[arg(long)]
    pub quantity: Option<i64>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
}

impl UpdateArgs {
    fn to_update(&self) -> Result<TransactionUpdate, StockfolioError> {
        TransactionUpdate::parse(
            self.ticker.as_deref(),
            self.suffix.as_deref(),
            self.transaction_type.as_deref(),
            self.quantity,
            self.price.as_deref(),
            self.date.as_deref(),
        )
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(&cli.config) {
        Ok(c) => c,
        Err(code) => return code,
    };
    init_tracing(&log_level(&config));

    match run_command(&cli.command, &config) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Install the stderr subscriber; `RUST_LOG` overrides the configured level.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_command(command: &Command, config: &dyn ConfigPort) -> Result<String, StockfolioError> {
    match command {
        Command::Detail { .. } => validate_config(config)?,
        _ => {
            validate_database(config)?;
            validate_logging(config)?;
        }
    }

    let store = open_store(config)?;
    let market = match command {
        Command::Detail { .. } => Some(open_market_data(config)?),
        _ => None,
    };
    execute(
        command,
        &store,
        market.as_ref().map(|m| m as &dyn MarketDataPort),
    )
}

fn open_store(config: &dyn ConfigPort) -> Result<SqliteTransactionStore, StockfolioError> {
    let store = SqliteTransactionStore::from_config(config)?;
    store.initialize_schema()?;
    Ok(store)
}

pub fn open_market_data(config: &dyn ConfigPort) -> Result<CsvMarketData, StockfolioError> {
    let path = config
        .get_path("market_data", "path")
        .ok_or_else(|| StockfolioError::ConfigMissing {
            section: "market_data".into(),
            key: "path".into(),
        })?;
    if !path.is_dir() {
        return Err(StockfolioError::ConfigInvalid {
            section: "market_data".into(),
            key: "path".into(),
            reason: format!("{} is not a directory", path.display()),
        });
    }
    Ok(CsvMarketData::new(path))
}

pub fn build_list_query(
    page: u32,
    per_page: u32,
    sort_by: &str,
    order: &str,
) -> Result<ListQuery, StockfolioError> {
    ListQuery::new(page, per_page, sort_by.parse()?, order.parse()?)
}

/// Run one subcommand against already-built collaborators and return its
/// JSON output. `market` is only consulted by `detail`.
pub fn execute(
    command: &Command,
    store: &dyn TransactionStore,
    market: Option<&dyn MarketDataPort>,
) -> Result<String, StockfolioError> {
    match command {
        Command::Add(args) => to_json(&ledger::record_transactions(store, &[args.to_request()])?),
        Command::Import { file } => {
            let requests = csv_adapter::read_transaction_requests(file)?;
            to_json(&ledger::record_transactions(store, &requests)?)
        }
        Command::Show { id } => to_json(&ledger::get_transaction(store, *id)?),
        Command::List {
            page,
            per_page,
            sort_by,
            order,
        } => {
            let query = build_list_query(*page, *per_page, sort_by, order)?;
            to_json(&ledger::list_transactions(store, &query)?)
        }
        Command::Update(args) => {
            to_json(&ledger::update_transaction(store, args.id, &args.to_update()?)?)
        }
        Command::Delete { id } => {
            ledger::delete_transaction(store, *id)?;
            to_json(&serde_json::json!({
                "message": format!("stock transaction {id} deleted")
            }))
        }
        Command::Detail { id, symbol } => {
            let market = market.ok_or_else(|| StockfolioError::MarketData {
                reason: "no market data source configured".into(),
            })?;
            let service = InvestmentDetailService::new(store, market);
            let report = match (id, symbol) {
                (Some(id), _) => service.by_transaction_id(*id)?,
                (None, Some(symbol)) => service.by_symbol(symbol)?,
                (None, None) => {
                    return Err(StockfolioError::validation(
                        "detail needs either --id or --symbol",
                    ));
                }
            };
            to_json(&report)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, StockfolioError> {
    serde_json::to_string_pretty(value).map_err(|e| StockfolioError::Io(e.into()))
}
