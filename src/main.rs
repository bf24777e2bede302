use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Method;
use serde_json::Value;
use tracing::error;

use ptcmss_client::api::accounting::DashboardQuery;
use ptcmss_client::api::auth::Credentials;
use ptcmss_client::api::bookings::BookingPageQuery;
use ptcmss_client::api::debts::DebtFilter;
use ptcmss_client::api::expenses::ExpenseRequestInput;
use ptcmss_client::api::exports::{
    ExpenseExportQuery, ExportFormat, InvoiceListExportQuery, RevenueExportQuery,
};
use ptcmss_client::api::invoices::InvoiceFilter;
use ptcmss_client::api::notifications::DriverNotificationsQuery;
use ptcmss_client::observability::init_logging;
use ptcmss_client::{ApiClient, ApiConfig, ApiResult, RequestOptions};

#[derive(Parser)]
#[command(name = "ptcmss")]
#[command(version, about = "Command-line client for the PTCMSS backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Overrides API_BASE_URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Per-request timeout in seconds, overrides API_TIMEOUT_SECS
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "PTCMSS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Refresh,
    /// Prints the stored session profile
    Whoami,
    ForgotPassword {
        email: String,
    },
    /// Sends an arbitrary request and prints the normalized payload
    Fetch {
        path: String,
        #[arg(short = 'X', long, value_enum, ignore_case = true, default_value = "get")]
        method: HttpMethod,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
        #[arg(long)]
        no_auth: bool,
    },
    /// Branch of a user (session user by default); prints null when there is none
    Branch {
        #[arg(long)]
        user_id: Option<String>,
    },
    Bookings {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        branch_id: Option<i64>,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// Trips waiting for a driver; all branches when no branch is given
    PendingTrips {
        #[arg(long)]
        branch_id: Option<i64>,
    },
    #[command(subcommand)]
    Invoices(InvoiceCommands),
    #[command(subcommand)]
    Debts(DebtCommands),
    #[command(subcommand)]
    Notifications(NotificationCommands),
    Dashboard {
        #[arg(long)]
        branch_id: Option<i64>,
        #[arg(long)]
        period: Option<String>,
    },
    Settings,
    #[command(subcommand)]
    Export(ExportCommands),
    /// Submits an expense request with receipt files
    Expense {
        #[arg(long = "type")]
        expense_type: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        branch_id: i64,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        vehicle_id: Option<i64>,
        #[arg(long)]
        requester_user_id: Option<i64>,
        #[arg(long = "receipt")]
        receipts: Vec<PathBuf>,
    },
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    branch_id: Option<i64>,
    #[arg(long)]
    customer_id: Option<i64>,
    #[arg(long)]
    keyword: Option<String>,
    #[arg(long)]
    overdue_only: bool,
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value_t = 20)]
    size: u32,
}

#[derive(Subcommand)]
enum InvoiceCommands {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        payment_status: Option<String>,
    },
    Get {
        id: i64,
    },
    Payments {
        id: i64,
    },
}

#[derive(Subcommand)]
enum DebtCommands {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        label: Option<String>,
    },
    Aging {
        #[arg(long)]
        branch_id: Option<i64>,
    },
}

#[derive(Subcommand)]
enum NotificationCommands {
    /// Driver inbox; an unavailable endpoint prints an empty feed
    Driver {
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    Alerts {
        #[arg(long)]
        branch_id: Option<i64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Excel,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Excel => ExportFormat::Excel,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

#[derive(Subcommand)]
enum ExportCommands {
    Revenue {
        #[arg(long, value_enum, default_value = "excel")]
        format: FormatArg,
        #[arg(long)]
        branch_id: Option<i64>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },
    Expense {
        #[arg(long, value_enum, default_value = "excel")]
        format: FormatArg,
        #[arg(long)]
        branch_id: Option<i64>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },
    Invoices {
        #[arg(long)]
        branch_id: Option<i64>,
        #[arg(long)]
        payment_status: Option<String>,
    },
    InvoicePdf {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let mut config = ApiConfig::from_env();
    if let Some(url) = cli.url {
        config = config.with_base_url(url);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Some(Duration::from_secs(secs)).filter(|d| !d.is_zero()));
    }

    let client = match ApiClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli.command).await {
        Ok(output) => {
            print_json(&output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, status = ?e.status(), "Command failed");
            eprintln!("{}", e.user_message());
            if let Some(data) = e.data() {
                print_json(data);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &ApiClient, command: Commands) -> ApiResult<Value> {
    match command {
        Commands::Login { username, password } => {
            client
                .auth()
                .login(&Credentials { username, password })
                .await
        }
        Commands::Logout => client.auth().logout().await,
        Commands::Refresh => client.auth().refresh().await,
        Commands::Whoami => {
            let profile = client.tokens().profile();
            Ok(serde_json::json!({
                "userId": profile.user_id,
                "username": profile.username,
                "roleName": profile.role_name,
                "authenticated": !client.tokens().access_token().is_empty(),
            }))
        }
        Commands::ForgotPassword { email } => client.auth().forgot_password(&email).await,
        Commands::Fetch {
            path,
            method,
            data,
            no_auth,
        } => {
            let mut options = RequestOptions::new(method.into());
            if let Some(data) = data {
                options = match serde_json::from_str::<Value>(&data) {
                    Ok(json) => options.json_value(json),
                    Err(_) => options.text(data),
                };
            }
            if no_auth {
                options = options.without_auth();
            }
            client.fetch(&path, options).await
        }
        Commands::Branch { user_id } => Ok(client
            .branches()
            .branch_for_user_or_none(user_id.as_deref())
            .await?
            .unwrap_or(Value::Null)),
        Commands::Bookings {
            status,
            branch_id,
            keyword,
            page,
            size,
        } => {
            client
                .bookings()
                .page_bookings(&BookingPageQuery {
                    status,
                    branch_id,
                    keyword,
                    page: Some(page),
                    size: Some(size),
                    ..BookingPageQuery::default()
                })
                .await
        }
        Commands::PendingTrips { branch_id } => match branch_id {
            Some(branch_id) => client.dispatch().pending_trips(branch_id).await,
            None => client.dispatch().all_pending_trips().await,
        },
        Commands::Invoices(command) => run_invoices(client, command).await,
        Commands::Debts(command) => run_debts(client, command).await,
        Commands::Notifications(command) => run_notifications(client, command).await,
        Commands::Dashboard { branch_id, period } => {
            client
                .accounting()
                .dashboard(&DashboardQuery {
                    branch_id,
                    period,
                    ..DashboardQuery::default()
                })
                .await
        }
        Commands::Settings => client.settings().list_settings().await,
        Commands::Export(command) => run_export(client, command).await,
        Commands::Expense {
            expense_type,
            amount,
            branch_id,
            note,
            vehicle_id,
            requester_user_id,
            receipts,
        } => {
            client
                .expenses()
                .create_expense_request(&ExpenseRequestInput {
                    expense_type,
                    amount,
                    note,
                    branch_id,
                    requester_user_id,
                    vehicle_id,
                    receipts,
                })
                .await
        }
    }
}

async fn run_invoices(client: &ApiClient, command: InvoiceCommands) -> ApiResult<Value> {
    let invoices = client.invoices();
    match command {
        InvoiceCommands::List {
            list,
            payment_status,
        } => {
            invoices
                .list_invoices(&InvoiceFilter {
                    branch_id: list.branch_id,
                    customer_id: list.customer_id,
                    keyword: list.keyword,
                    overdue_only: list.overdue_only,
                    payment_status,
                    page: Some(list.page),
                    size: Some(list.size),
                    ..InvoiceFilter::default()
                })
                .await
        }
        InvoiceCommands::Get { id } => invoices.get_invoice(id).await,
        InvoiceCommands::Payments { id } => invoices.payment_history(id).await,
    }
}

async fn run_debts(client: &ApiClient, command: DebtCommands) -> ApiResult<Value> {
    let debts = client.debts();
    match command {
        DebtCommands::List { list, label } => {
            debts
                .list_debts(&DebtFilter {
                    branch_id: list.branch_id,
                    customer_id: list.customer_id,
                    keyword: list.keyword,
                    overdue_only: list.overdue_only,
                    debt_label: label,
                    page: Some(list.page),
                    size: Some(list.size),
                    ..DebtFilter::default()
                })
                .await
        }
        DebtCommands::Aging { branch_id } => debts.aging_buckets(branch_id, None).await,
    }
}

async fn run_notifications(client: &ApiClient, command: NotificationCommands) -> ApiResult<Value> {
    let notifications = client.notifications();
    match command {
        NotificationCommands::Driver {
            user_id,
            page,
            limit,
        } => {
            notifications
                .driver_notifications_or_empty(&DriverNotificationsQuery {
                    user_id,
                    page,
                    limit,
                })
                .await
        }
        NotificationCommands::Alerts { branch_id } => notifications.alerts(branch_id).await,
    }
}

async fn run_export(client: &ApiClient, command: ExportCommands) -> ApiResult<Value> {
    let exports = client.exports();
    let saved = match command {
        ExportCommands::Revenue {
            format,
            branch_id,
            start_date,
            end_date,
        } => {
            exports
                .revenue_report(
                    format.into(),
                    &RevenueExportQuery {
                        branch_id,
                        start_date,
                        end_date,
                        ..RevenueExportQuery::default()
                    },
                )
                .await?
        }
        ExportCommands::Expense {
            format,
            branch_id,
            start_date,
            end_date,
        } => {
            exports
                .expense_report(
                    format.into(),
                    &ExpenseExportQuery {
                        branch_id,
                        start_date,
                        end_date,
                        ..ExpenseExportQuery::default()
                    },
                )
                .await?
        }
        ExportCommands::Invoices {
            branch_id,
            payment_status,
        } => {
            exports
                .invoice_list(&InvoiceListExportQuery {
                    branch_id,
                    payment_status,
                    ..InvoiceListExportQuery::default()
                })
                .await?
        }
        ExportCommands::InvoicePdf { id } => exports.invoice_pdf(id).await?,
    };
    Ok(serde_json::json!({ "saved": saved.display().to_string() }))
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}
