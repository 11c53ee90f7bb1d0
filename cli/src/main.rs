//! Command-line client mirroring the exchange service's HTTP surface:
//! every write goes through a form-encoded `payload` field carrying JSON,
//! read-only endpoints take a plain query string.

use clap::{Parser, Subcommand};
use orderbook::Side;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "xchain-cli")]
#[command(about = "Cross-chain exchange CLI - command line client for the exchange service")]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    server: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Admit a same-chain order via POST /api/register_order.
    RegisterOrder(OrderArgs),
    /// Admit a cross-chain order via POST /api/register_order_cross.
    RegisterOrderCross(OrderArgs),
    /// Cancel a resting order via POST /api/cancel_order.
    CancelOrder {
        #[arg(long)]
        order_id: u64,
        #[arg(long, value_parser = parse_side)]
        side: Side,
        #[arg(long)]
        base_asset: String,
        #[arg(long)]
        quote_asset: String,
        #[arg(long)]
        cross_chain: bool,
    },
    /// Snapshot the same-chain book via POST /api/orderbook.
    Orderbook { symbol: String },
    /// Snapshot the cross-chain book via POST /api/orderbook_cross.
    OrderbookCross { symbol: String },
    /// Look up an order by id via POST /api/order.
    Order {
        #[arg(long)]
        order_id: u64,
        #[arg(long)]
        base_asset: String,
        #[arg(long)]
        quote_asset: String,
        #[arg(long)]
        cross_chain: bool,
    },
    /// Top of book via POST /api/get_best_order.
    BestOrder {
        #[arg(long)]
        base_asset: String,
        #[arg(long)]
        quote_asset: String,
        #[arg(long, value_parser = parse_side)]
        side: Side,
        #[arg(long)]
        cross_chain: bool,
    },
    /// Escrow read via POST /api/check_available_funds.
    CheckFunds {
        #[arg(long)]
        account: String,
        #[arg(long)]
        asset: String,
        #[arg(long)]
        network: u64,
    },
    /// Trade tape via GET /api/order_history[_cross].
    OrderHistory {
        symbol: String,
        #[arg(long)]
        cross_chain: bool,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Configured settlement contract address via GET /api/get_settlement_address.
    SettlementAddress { network: u64 },
    /// Liveness probe via GET /api/settlement_health.
    Health,
}

#[derive(clap::Args)]
struct OrderArgs {
    #[arg(long)]
    account: String,
    #[arg(long)]
    base_asset: String,
    #[arg(long)]
    quote_asset: String,
    #[arg(long, value_parser = parse_side)]
    side: Side,
    #[arg(long, default_value = "limit")]
    order_type: String,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    quantity: String,
    #[arg(long)]
    from_network: u64,
    #[arg(long)]
    to_network: u64,
    #[arg(long)]
    receive_wallet: String,
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s.to_lowercase().as_str() {
        "bid" | "buy" => Ok(Side::Bid),
        "ask" | "sell" => Ok(Side::Ask),
        _ => Err(format!("invalid side: {s}, use 'bid' or 'ask'")),
    }
}

fn order_payload(args: &OrderArgs) -> Value {
    json!({
        "account": args.account,
        "baseAsset": args.base_asset,
        "quoteAsset": args.quote_asset,
        "side": args.side,
        "type": args.order_type,
        "price": args.price,
        "quantity": args.quantity,
        "fromNetwork": args.from_network,
        "toNetwork": args.to_network,
        "receiveWallet": args.receive_wallet,
    })
}

async fn post_payload(
    client: &reqwest::Client,
    server: &str,
    path: &str,
    payload: &Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = client
        .post(format!("{server}{path}"))
        .form(&[("payload", payload.to_string())])
        .send()
        .await?;
    print_response(response).await
}

async fn get_query(
    client: &reqwest::Client,
    server: &str,
    path: &str,
    query: &[(&str, String)],
) -> Result<(), Box<dyn std::error::Error>> {
    let response = client.get(format!("{server}{path}")).query(query).send().await?;
    print_response(response).await
}

async fn print_response(response: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if status.is_success() {
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        eprintln!("error ({status}): {}", serde_json::to_string_pretty(&body)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::RegisterOrder(args) => {
            post_payload(&client, &cli.server, "/api/register_order", &order_payload(&args)).await?
        }
        Commands::RegisterOrderCross(args) => {
            post_payload(
                &client,
                &cli.server,
                "/api/register_order_cross",
                &order_payload(&args),
            )
            .await?
        }
        Commands::CancelOrder {
            order_id,
            side,
            base_asset,
            quote_asset,
            cross_chain,
        } => {
            let payload = json!({
                "orderId": order_id,
                "side": side,
                "baseAsset": base_asset,
                "quoteAsset": quote_asset,
                "crossChain": cross_chain,
            });
            post_payload(&client, &cli.server, "/api/cancel_order", &payload).await?
        }
        Commands::Orderbook { symbol } => {
            post_payload(&client, &cli.server, "/api/orderbook", &json!({ "symbol": symbol })).await?
        }
        Commands::OrderbookCross { symbol } => {
            post_payload(
                &client,
                &cli.server,
                "/api/orderbook_cross",
                &json!({ "symbol": symbol }),
            )
            .await?
        }
        Commands::Order {
            order_id,
            base_asset,
            quote_asset,
            cross_chain,
        } => {
            let payload = json!({
                "orderId": order_id,
                "baseAsset": base_asset,
                "quoteAsset": quote_asset,
                "crossChain": cross_chain,
            });
            post_payload(&client, &cli.server, "/api/order", &payload).await?
        }
        Commands::BestOrder {
            base_asset,
            quote_asset,
            side,
            cross_chain,
        } => {
            let payload = json!({
                "baseAsset": base_asset,
                "quoteAsset": quote_asset,
                "side": side,
                "crossChain": cross_chain,
            });
            post_payload(&client, &cli.server, "/api/get_best_order", &payload).await?
        }
        Commands::CheckFunds { account, asset, network } => {
            let payload = json!({ "account": account, "asset": asset, "network": network });
            post_payload(&client, &cli.server, "/api/check_available_funds", &payload).await?
        }
        Commands::OrderHistory {
            symbol,
            cross_chain,
            limit,
        } => {
            let path = if cross_chain {
                "/api/order_history_cross"
            } else {
                "/api/order_history"
            };
            get_query(
                &client,
                &cli.server,
                path,
                &[("symbol", symbol), ("limit", limit.to_string())],
            )
            .await?
        }
        Commands::SettlementAddress { network } => {
            get_query(
                &client,
                &cli.server,
                "/api/get_settlement_address",
                &[("network", network.to_string())],
            )
            .await?
        }
        Commands::Health => get_query(&client, &cli.server, "/api/settlement_health", &[]).await?,
    }

    Ok(())
}
