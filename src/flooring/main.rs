use chrono::NaiveDate;
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use flooring::api::{FlooringApi, OrderChanges};
use flooring::config::{FlooringConfig, CONFIG_KEYS};
use flooring::error::{FlooringError, Result};
use flooring::model::Order;
use flooring::store::fs_backend::FsBackend;
use flooring::store::order_store::OrderStore;
use flooring::store::FileStore;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: FlooringApi<FileStore>,
    json: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let home = resolve_home(cli.home.clone())?;
    debug!(home = %home.display(), "resolved flooring home");

    if let Commands::Config { key, value } = &cli.command {
        return handle_config(&home, key.as_deref(), value.as_deref());
    }

    let mut ctx = init_context(&home, cli.json)?;
    match cli.command {
        Commands::List { date } => handle_list(&ctx, date),
        Commands::Show { date, number } => handle_show(&ctx, date, number),
        Commands::Add {
            date,
            name,
            state,
            product,
            area,
            dry_run,
        } => handle_add(&mut ctx, date, &name, &state, &product, area, dry_run),
        Commands::Edit {
            date,
            number,
            name,
            state,
            product,
            area,
        } => {
            let changes = OrderChanges {
                customer_name: name,
                state,
                product,
                area,
            };
            handle_edit(&mut ctx, date, number, changes)
        }
        Commands::Remove { date, number } => handle_remove(&mut ctx, date, number),
        Commands::Products => handle_products(&ctx),
        Commands::States => handle_states(&ctx),
        Commands::NextNumber => handle_next_number(&ctx),
        Commands::Config { .. } => Ok(()),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_home(home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = home {
        return Ok(home);
    }
    ProjectDirs::from("com", "flooring", "flooring")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            FlooringError::InvalidInput(
                "Could not determine a data directory; pass --home or set FLOORING_HOME".into(),
            )
        })
}

fn init_context(home: &Path, json: bool) -> Result<AppContext> {
    let config = FlooringConfig::load(home)?;
    let orders_dir = config.orders_path(home);
    fs::create_dir_all(&orders_dir).map_err(|e| {
        FlooringError::persistence(format!("Could not create {}", orders_dir.display()), e)
    })?;

    let backend = FsBackend::new(orders_dir, config.data_path(home));
    debug!(
        orders = %backend.orders_dir().display(),
        data = %backend.data_dir().display(),
        "opening order store"
    );
    let mut api = FlooringApi::new(OrderStore::with_backend(backend), config.minimum_area);
    api.load_all()?;

    Ok(AppContext { api, json })
}

fn handle_list(ctx: &AppContext, date: NaiveDate) -> Result<()> {
    let orders = ctx.api.get_orders_on_date(date)?;
    if ctx.json {
        return print_json(&orders);
    }
    println!("{}", format!("Orders for {}", date.format("%m/%d/%Y")).bold());
    for order in orders {
        print_order_row(order);
    }
    Ok(())
}

fn handle_show(ctx: &AppContext, date: NaiveDate, number: u32) -> Result<()> {
    let order = ctx.api.get_order(number, date)?;
    if ctx.json {
        return print_json(order);
    }
    print_order(order);
    Ok(())
}

fn handle_add(
    ctx: &mut AppContext,
    date: NaiveDate,
    name: &str,
    state: &str,
    product: &str,
    area: Decimal,
    dry_run: bool,
) -> Result<()> {
    let order = ctx.api.create_order(date, name, state, product, area)?;
    if dry_run {
        if ctx.json {
            return print_json(&order);
        }
        print_order(&order);
        println!("{}", "Dry run: order not saved.".dimmed());
        return Ok(());
    }

    ctx.api.add_order(order.clone());
    ctx.api.save_order(date)?;
    if ctx.json {
        return print_json(&order);
    }
    print_order(&order);
    println!(
        "{}",
        format!(
            "Added order #{} to {}",
            order.order_number,
            ctx.api.orders_path(date).display()
        )
        .green()
    );
    Ok(())
}

fn handle_edit(
    ctx: &mut AppContext,
    date: NaiveDate,
    number: u32,
    changes: OrderChanges,
) -> Result<()> {
    match ctx.api.update_order(number, date, changes)? {
        Some(order) => {
            ctx.api.save_order(date)?;
            if ctx.json {
                return print_json(&order);
            }
            print_order(&order);
            println!("{}", format!("Updated order #{}", number).green());
        }
        None => {
            if ctx.json {
                return print_json(ctx.api.get_order(number, date)?);
            }
            println!("{}", "No changes.".dimmed());
        }
    }
    Ok(())
}

fn handle_remove(ctx: &mut AppContext, date: NaiveDate, number: u32) -> Result<()> {
    let order = ctx.api.remove_order(number, date)?;
    ctx.api.save_order(date)?;
    if ctx.json {
        return print_json(&order);
    }
    println!(
        "{}",
        format!("Removed order #{} ({})", number, order.customer_name).green()
    );
    Ok(())
}

fn handle_products(ctx: &AppContext) -> Result<()> {
    let products = ctx.api.products();
    if ctx.json {
        return print_json(&products);
    }
    for product in products {
        println!(
            "{:<12} material ${:>8}/sq ft   labor ${:>8}/sq ft",
            product.product_type.bold(),
            product.cost_per_square_foot,
            product.labor_cost_per_square_foot
        );
    }
    Ok(())
}

fn handle_states(ctx: &AppContext) -> Result<()> {
    let taxes = ctx.api.state_taxes();
    if ctx.json {
        return print_json(&taxes);
    }
    for tax in taxes {
        println!(
            "{}  {:<16} {:>6}%",
            tax.state_abbreviation.bold(),
            tax.state_name,
            tax.tax_rate
        );
    }
    Ok(())
}

fn handle_next_number(ctx: &AppContext) -> Result<()> {
    let next = ctx.api.next_order_number()?;
    if ctx.json {
        return print_json(&next);
    }
    println!("{}", next);
    Ok(())
}

fn handle_config(home: &Path, key: Option<&str>, value: Option<&str>) -> Result<()> {
    let mut config = FlooringConfig::load(home)?;
    match (key, value) {
        (None, _) => {
            for key in CONFIG_KEYS {
                println!("{} = {}", key, config.get(key)?);
            }
        }
        (Some(key), None) => println!("{} = {}", key, config.get(key)?),
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save(home)?;
            println!("{}", format!("{} = {}", key, config.get(key)?).green());
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_order_row(order: &Order) {
    println!(
        "{:>5}  {:<24} {:<3} {:<10} {:>9} sq ft  {:>12}",
        format!("#{}", order.order_number).yellow(),
        order.customer_name,
        order.state_tax.state_abbreviation,
        order.product.product_type,
        order.area,
        format!("${}", order.total).bold()
    );
}

fn print_order(order: &Order) {
    println!(
        "{} {}",
        format!("#{}", order.order_number).yellow(),
        order.customer_name.bold()
    );
    println!("--------------------------------");
    println!("Date:          {}", order.fulfillment_date.format("%m/%d/%Y"));
    println!(
        "State:         {} ({}%)",
        order.state_tax.state_abbreviation, order.state_tax.tax_rate
    );
    println!(
        "Product:       {} (${} + ${} labor per sq ft)",
        order.product.product_type,
        order.product.cost_per_square_foot,
        order.product.labor_cost_per_square_foot
    );
    println!("Area:          {} sq ft", order.area);
    println!("Material:      ${}", order.material_cost);
    println!("Labor:         ${}", order.labor_cost);
    println!("Tax:           ${}", order.tax);
    println!("{}", format!("Total:         ${}", order.total).bold());
}
