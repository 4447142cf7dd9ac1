//! # Command Line Front End
//!
//! Maps `construflow <subcommand>` onto the command layer and prints the
//! responses, as text or as JSON with `--json`.
//!
//! ## Usage
//! ```bash
//! # First run
//! construflow setup --name "Admin System" --login admin --password s3cret!
//!
//! # Catalog and stock
//! construflow products --search cimento
//! construflow products --low-stock
//! construflow stock-set 3 12,5
//!
//! # A sale: two bags of cement and 3m × 4m of floor tiles, on credit
//! construflow sell --client c2 --payment fiado --item 1:2 --area 2:3x4
//!
//! # Walk-in sale of 2,5 m³ of sand, typed directly
//! construflow sell --area 3:=2,5
//!
//! # Finance
//! construflow finance add --description "Rent" --amount 1500,00 --type expense
//! construflow finance settle FIN-0190...
//! ```
//!
//! Every subcommand except `setup` and `login` needs a stored session.
//! The cart lives only for one `sell` invocation.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use construflow_core::finance::{FinanceSummary, ManualEntry};
use construflow_core::inventory::{NewClient, NewProduct, StockFilter};
use construflow_core::{
    ClientSegment, LedgerRecord, LedgerStatus, Money, PaymentMethod, Quantity, SessionUser,
    TransactionType, UnitOfMeasure,
};

use crate::commands::auth::{self, StartupRoute};
use crate::commands::{cart, catalog, config, dashboard, finance, inventory, sale};
use crate::error::{ApiError, ApiResult};
use crate::state::{CartState, ConfigState, DbState};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "construflow", version, about = "ConstruFlow back office")]
pub struct Cli {
    /// Database file path (default: platform data directory)
    #[arg(long, env = "CONSTRUFLOW_DB_PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Print responses as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the first administrator account (only when no users exist)
    Setup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        login: String,
        #[arg(long, env = "CONSTRUFLOW_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in
    Login {
        login: String,
        #[arg(long, env = "CONSTRUFLOW_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log out
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List or search products
    Products {
        /// Name or code fragment
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only products at or below their minimum stock
        #[arg(long, conflicts_with_all = ["search", "sellable"])]
        low_stock: bool,

        /// Only products offered at the point of sale
        #[arg(long)]
        sellable: bool,
    },

    /// Register a product
    ProductAdd(ProductArgs),

    /// List or search clients
    Clients {
        /// Name or tax id fragment
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Register a client
    ClientAdd(ClientArgs),

    /// List suppliers
    Suppliers,

    /// Set a product's stock to a counted value
    StockSet {
        product_id: String,
        #[arg(value_parser = parse_quantity, allow_hyphen_values = true)]
        quantity: Quantity,
    },

    /// Ring up and settle a sale
    Sell(SellArgs),

    /// List recorded sales
    Sales,

    /// Finance ledger
    #[command(subcommand)]
    Finance(FinanceCommand),

    /// Today's headline metrics
    Dashboard,

    /// Show the active configuration
    Config,
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub code: String,
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub category: String,
    /// unit, kg, bag, meter or m2
    #[arg(long, default_value = "unit")]
    pub unit: UnitOfMeasure,
    #[arg(long, value_parser = parse_money)]
    pub cost: Money,
    #[arg(long, value_parser = parse_money)]
    pub price: Money,
    #[arg(long)]
    pub fractionable: bool,
    #[arg(long, value_parser = parse_quantity, default_value = "0")]
    pub stock: Quantity,
    #[arg(long, value_parser = parse_quantity, default_value = "0")]
    pub minimum: Quantity,
    #[arg(long, default_value = "")]
    pub supplier: String,
}

#[derive(Debug, Args)]
pub struct ClientArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub tax_id: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub address: String,
    /// retail or wholesale
    #[arg(long, default_value = "retail")]
    pub segment: ClientSegment,
    #[arg(long, value_parser = parse_money, default_value = "0")]
    pub credit_limit: Money,
}

#[derive(Debug, Args)]
pub struct SellArgs {
    /// Client id (default: the first registered client)
    #[arg(long)]
    pub client: Option<String>,

    /// cash, pix, debit, credit, boleto or fiado
    #[arg(long, default_value = "cash")]
    pub payment: PaymentMethod,

    /// General discount
    #[arg(long, value_parser = parse_money)]
    pub discount: Option<Money>,

    /// Product as ID or ID:QTY (repeatable)
    #[arg(long = "item")]
    pub items: Vec<ItemArg>,

    /// Measured product as ID:LENGTHxWIDTH or ID:=QUANTITY (repeatable)
    #[arg(long = "area")]
    pub areas: Vec<AreaArg>,
}

#[derive(Debug, Subcommand)]
pub enum FinanceCommand {
    /// Ledger records, newest first
    List,

    /// Paid in, paid out, pending net and balance
    Summary,

    /// Add a manual entry
    Add {
        #[arg(long)]
        description: String,
        /// Amount as typed, e.g. 1500,00
        #[arg(long)]
        amount: String,
        /// income or expense
        #[arg(long = "type", default_value = "expense")]
        kind: TransactionType,
        #[arg(long, default_value = "")]
        category: String,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// paid or pending
        #[arg(long, default_value = "paid")]
        status: LedgerStatus,
    },

    /// Mark a pending record as paid
    Settle { record_id: String },
}

/// `--item ID` or `--item ID:QTY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemArg {
    pub product_id: String,
    pub quantity: Option<Quantity>,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None => Ok(ItemArg {
                product_id: s.trim().to_string(),
                quantity: None,
            }),
            Some((id, qty)) => Ok(ItemArg {
                product_id: id.trim().to_string(),
                quantity: Some(parse_quantity(qty)?),
            }),
        }
    }
}

/// `--area ID:LENGTHxWIDTH`, or `--area ID:=QUANTITY` for a typed total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaArg {
    pub product_id: String,
    pub length: Quantity,
    pub width: Quantity,
    pub manual: Quantity,
}

impl FromStr for AreaArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, dims) = s
            .split_once(':')
            .ok_or_else(|| format!("expected ID:LENGTHxWIDTH or ID:=QUANTITY, got '{}'", s))?;
        let product_id = id.trim().to_string();

        if let Some(manual) = dims.strip_prefix('=') {
            return Ok(AreaArg {
                product_id,
                length: Quantity::zero(),
                width: Quantity::zero(),
                manual: parse_quantity(manual)?,
            });
        }

        let (length, width) = dims
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| format!("expected LENGTHxWIDTH or =QUANTITY, got '{}'", dims))?;

        Ok(AreaArg {
            product_id,
            length: parse_quantity(length)?,
            width: parse_quantity(width)?,
            manual: Quantity::zero(),
        })
    }
}

fn parse_money(s: &str) -> Result<Money, String> {
    Money::parse(s).map_err(|e| e.to_string())
}

fn parse_quantity(s: &str) -> Result<Quantity, String> {
    Quantity::parse(s).map_err(|e| e.to_string())
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one subcommand against the given state.
pub async fn execute(
    command: Command,
    db: &DbState,
    cart_state: &CartState,
    config_state: &ConfigState,
    json: bool,
) -> ApiResult<()> {
    let out = Output {
        json,
        config: config_state,
    };

    match command {
        Command::Setup {
            name,
            login,
            password,
        } => {
            let user = auth::setup_admin(db, &name, &login, &password).await?;
            out.session(&user, "Administrator created and logged in")
        }
        Command::Login { login, password } => {
            let user = auth::login(db, &login, &password).await?;
            out.session(&user, "Logged in")
        }
        guarded => {
            let user = authenticated(db).await?;
            execute_guarded(guarded, &user, db, cart_state, config_state, &out).await
        }
    }
}

async fn authenticated(db: &DbState) -> ApiResult<SessionUser> {
    match auth::startup_route(db).await? {
        StartupRoute::Setup => Err(ApiError::setup_required()),
        StartupRoute::Login => Err(ApiError::not_authenticated()),
        StartupRoute::Home(user) => Ok(user),
    }
}

async fn execute_guarded(
    command: Command,
    user: &SessionUser,
    db: &DbState,
    cart_state: &CartState,
    config_state: &ConfigState,
    out: &Output<'_>,
) -> ApiResult<()> {
    match command {
        Command::Setup { .. } | Command::Login { .. } => Ok(()),
        Command::Logout => {
            auth::logout(db).await?;
            out.message("Logged out")
        }
        Command::Whoami => out.session(user, "Logged in"),
        Command::Products {
            search,
            low_stock,
            sellable,
        } => {
            let products = if low_stock {
                inventory::list_inventory(db, StockFilter::Low).await?
            } else if sellable {
                catalog::search_sellable(db, &search).await?
            } else {
                catalog::search_products(db, &search).await?
            };
            out.products(&products)
        }
        Command::ProductAdd(args) => {
            let form = NewProduct {
                code: args.code,
                name: args.name,
                category: args.category,
                unit: args.unit,
                cost_price: args.cost,
                sale_price: args.price,
                fractionable: args.fractionable,
                current_stock: args.stock,
                minimum_stock: args.minimum,
                supplier_id: args.supplier,
            };
            let product = catalog::create_product(db, form).await?;
            out.products(std::slice::from_ref(&product))
        }
        Command::Clients { search } => {
            let clients = catalog::search_clients(db, &search).await?;
            out.render(&clients, |c| {
                c.iter()
                    .map(|c| format!("{:<14} {:<32} {:<20} {:?}", c.id, c.name, c.tax_id, c.segment))
                    .collect()
            })
        }
        Command::ClientAdd(args) => {
            let form = NewClient {
                name: args.name,
                tax_id: args.tax_id,
                phone: args.phone,
                address: args.address,
                segment: args.segment,
                credit_limit: args.credit_limit,
            };
            let client = catalog::create_client(db, form).await?;
            out.render(&client, |c| vec![format!("Client registered: {} ({})", c.name, c.id)])
        }
        Command::Suppliers => {
            let suppliers = catalog::list_suppliers(db).await?;
            out.render(&suppliers, |s| {
                s.iter()
                    .map(|s| format!("{:<14} {:<32} {}", s.id, s.name, s.tax_id))
                    .collect()
            })
        }
        Command::StockSet {
            product_id,
            quantity,
        } => {
            let adjustment = inventory::set_stock(db, &product_id, quantity).await?;
            out.render(&adjustment, |a| {
                vec![format!("Stock of {}: {} → {}", product_id, a.previous, a.current)]
            })
        }
        Command::Sell(args) => sell(db, cart_state, args, out).await,
        Command::Sales => {
            let sales = sale::list_sales(db).await?;
            out.render(&sales, |s| {
                s.iter()
                    .map(|s| {
                        format!(
                            "{} {} {:<28} {:>14} {}",
                            s.id,
                            s.date.format("%Y-%m-%d %H:%M"),
                            s.client_name,
                            out.money(s.total),
                            s.payment_method
                        )
                    })
                    .collect()
            })
        }
        Command::Finance(sub) => finance_command(db, sub, out).await,
        Command::Dashboard => {
            let summary = dashboard::get_dashboard(db, config_state).await?;
            out.render(&summary, |d| {
                let mut lines = vec![
                    format!("Sold today:    {} ({} sales)", out.money(d.sold_today), d.sales_today),
                    format!("Revenue:       {}", out.money(d.total_revenue)),
                    format!("Low stock:     {} products", d.low_stock_count),
                ];
                lines.extend(d.low_stock.iter().map(|p| {
                    format!(
                        "  {:<6} {:<32} {} / min {}",
                        p.code, p.name, p.current_stock, p.minimum_stock
                    )
                }));
                lines
            })
        }
        Command::Config => {
            let config = config::get_config(config_state);
            out.render(&config, |c| {
                vec![
                    format!("Store:           {}", c.store_name),
                    format!("Currency symbol: {}", c.currency_symbol),
                    format!("Low-stock preview: {}", c.low_stock_preview),
                ]
            })
        }
    }
}

/// Builds a cart from the arguments and settles it.
async fn sell(db: &DbState, cart_state: &CartState, args: SellArgs, out: &Output<'_>) -> ApiResult<()> {
    for item in &args.items {
        cart::add_to_cart(db, cart_state, &item.product_id, item.quantity).await?;
    }
    for area in &args.areas {
        cart::add_measured(db, cart_state, &area.product_id, area.length, area.width, area.manual)
            .await?;
    }
    if let Some(discount) = args.discount {
        cart::set_discount(cart_state, discount)?;
    }
    match &args.client {
        Some(client_id) => cart::select_client(db, cart_state, client_id).await?,
        None => cart::preselect_default_client(db, cart_state).await?,
    };
    cart::set_payment_method(cart_state, args.payment);

    match sale::finish_sale(db, cart_state).await? {
        None => out.message("Nothing to settle: empty cart or no client"),
        Some(receipt) => out.render(&receipt, |r| {
            let mut lines: Vec<String> = r
                .sale
                .items
                .iter()
                .map(|l| {
                    format!(
                        "{:<32} {:>10} × {:>12} = {:>14}",
                        l.name,
                        l.quantity,
                        out.money(l.unit_price),
                        out.money(l.line_total)
                    )
                })
                .collect();
            lines.push(format!("Subtotal: {}", out.money(r.sale.subtotal)));
            lines.push(format!("Discount: {}", out.money(r.sale.general_discount)));
            lines.push(format!("Total:    {}", out.money(r.sale.total)));
            lines.push(format!(
                "Sale {} for {} via {}, ledger {} ({:?})",
                r.sale.id, r.sale.client_name, r.sale.payment_method, r.ledger_record_id, r.ledger_status
            ));
            lines
        }),
    }
}

async fn finance_command(db: &DbState, command: FinanceCommand, out: &Output<'_>) -> ApiResult<()> {
    match command {
        FinanceCommand::List => {
            let records = finance::list_ledger(db).await?;
            out.render(&records, |r| r.iter().map(|r| out.ledger_line(r)).collect())
        }
        FinanceCommand::Summary => {
            let summary = finance::finance_summary(db).await?;
            out.render(&summary, |s: &FinanceSummary| {
                vec![
                    format!("Paid in:     {}", out.money(s.total_in)),
                    format!("Paid out:    {}", out.money(s.total_out)),
                    format!("Balance:     {}", out.money(s.balance)),
                    format!("Pending net: {}", out.money(s.pending_net)),
                ]
            })
        }
        FinanceCommand::Add {
            description,
            amount,
            kind,
            category,
            date,
            status,
        } => {
            let entry = ManualEntry {
                description,
                amount,
                kind,
                category,
                date: date.unwrap_or_else(|| Utc::now().date_naive()),
                status,
            };
            let record = finance::add_manual_entry(db, entry).await?;
            out.render(&record, |r| vec![out.ledger_line(r)])
        }
        FinanceCommand::Settle { record_id } => {
            let record = finance::mark_paid(db, &record_id).await?;
            out.render(&record, |r| vec![out.ledger_line(r)])
        }
    }
}

// =============================================================================
// Output
// =============================================================================

struct Output<'a> {
    json: bool,
    config: &'a ConfigState,
}

impl Output<'_> {
    /// Prints `value` as JSON, or the lines built by `text`.
    fn render<T, F>(&self, value: &T, text: F) -> ApiResult<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> Vec<String>,
    {
        if self.json {
            let rendered = serde_json::to_string_pretty(value)
                .map_err(|e| ApiError::internal(format!("Could not render response: {}", e)))?;
            println!("{}", rendered);
        } else {
            for line in text(value) {
                println!("{}", line);
            }
        }
        Ok(())
    }

    fn message(&self, message: &str) -> ApiResult<()> {
        self.render(&serde_json::json!({ "message": message }), |_| vec![message.to_string()])
    }

    fn session(&self, user: &SessionUser, message: &str) -> ApiResult<()> {
        self.render(user, |u| {
            vec![format!("{}: {} ({}, {:?})", message, u.name, u.login, u.profile)]
        })
    }

    fn products(&self, products: &[catalog::ProductDto]) -> ApiResult<()> {
        self.render(products, |p| {
            p.iter()
                .map(|dto| {
                    let p = &dto.product;
                    format!(
                        "{:<14} {:<6} {:<32} {:>4} {:>12} stock {:>10}{}{}",
                        p.id,
                        p.code,
                        p.name,
                        p.unit.symbol(),
                        self.money(p.sale_price),
                        p.current_stock,
                        dto.margin_percent
                            .map(|m| format!(" margin {:.1}%", m))
                            .unwrap_or_default(),
                        if dto.low_stock { " LOW" } else { "" },
                    )
                })
                .collect()
        })
    }

    fn ledger_line(&self, r: &LedgerRecord) -> String {
        format!(
            "{:<44} {} {:<8} {:<12} {:>14} {:<8} {}",
            r.id,
            r.date.format("%Y-%m-%d"),
            format!("{:?}", r.kind),
            r.category,
            self.money(r.signed_amount()),
            format!("{:?}", r.status),
            r.description
        )
    }

    fn money(&self, amount: Money) -> String {
        self.config.format_currency(amount)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use construflow_db::Database;

    use crate::error::ErrorCode;

    fn state() -> (DbState, CartState, ConfigState) {
        (
            DbState::new(Database::in_memory()),
            CartState::new(),
            ConfigState::default(),
        )
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("construflow").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_item_and_area_args() {
        assert_eq!(
            "1:2,5".parse::<ItemArg>().unwrap(),
            ItemArg {
                product_id: "1".to_string(),
                quantity: Some(Quantity::from_milli(2_500)),
            }
        );
        assert_eq!("3".parse::<ItemArg>().unwrap().quantity, None);

        let area = "2:3x4".parse::<AreaArg>().unwrap();
        assert_eq!(area.length, Quantity::from_whole(3));
        assert_eq!(area.width, Quantity::from_whole(4));
        assert_eq!(area.manual, Quantity::zero());
        assert!("2:34".parse::<AreaArg>().is_err());

        let typed = "3:=2,5".parse::<AreaArg>().unwrap();
        assert_eq!(typed.manual, Quantity::from_milli(2_500));
        assert_eq!(typed.length, Quantity::zero());
        assert!("3:=".parse::<AreaArg>().is_err());
    }

    #[test]
    fn test_parse_sell_command() {
        let cli = parse(&[
            "sell", "--client", "c2", "--payment", "fiado", "--item", "1:2", "--area", "2:3x4",
        ]);
        match cli.command {
            Command::Sell(args) => {
                assert_eq!(args.payment, PaymentMethod::Fiado);
                assert_eq!(args.items.len(), 1);
                assert_eq!(args.areas.len(), 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_commands_require_a_session() {
        let (db, cart, config) = state();

        let err = execute(Command::Dashboard, &db, &cart, &config, false)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SetupRequired);

        execute(
            Command::Setup {
                name: "Admin".to_string(),
                login: "admin".to_string(),
                password: "secret1".to_string(),
            },
            &db,
            &cart,
            &config,
            true,
        )
        .await
        .unwrap();
        execute(Command::Logout, &db, &cart, &config, true).await.unwrap();

        let err = execute(Command::Whoami, &db, &cart, &config, false)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_sell_settles_in_one_invocation() {
        let (db, cart, config) = state();
        auth::setup_admin(&db, "Admin", "admin", "secret1").await.unwrap();

        let cli = parse(&["sell", "--client", "c2", "--item", "1:2", "--area", "2:3x4"]);
        execute(cli.command, &db, &cart, &config, true).await.unwrap();

        let sales = sale::list_sales(&db).await.unwrap();
        assert_eq!(sales.len(), 1);
        // 2 × 35,00 + 12 × 29,90
        assert_eq!(sales[0].total, Money::from_cents(42_880));
        assert!(cart.snapshot().cart.is_empty());
    }

    #[tokio::test]
    async fn test_walk_in_sale_with_typed_quantity() {
        let (db, cart, config) = state();
        auth::setup_admin(&db, "Admin", "admin", "secret1").await.unwrap();

        let cli = parse(&["sell", "--area", "3:=2,5"]);
        execute(cli.command, &db, &cart, &config, true).await.unwrap();

        let sales = sale::list_sales(&db).await.unwrap();
        assert_eq!(sales[0].client_id, "c1");
        assert_eq!(sales[0].items[0].quantity, Quantity::from_milli(2_500));
        // 2,5 × 120,00
        assert_eq!(sales[0].total, Money::from_cents(30_000));
    }
}
