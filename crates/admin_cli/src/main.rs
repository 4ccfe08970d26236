use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    Currency, Engine, FreightMode, RateType, ShippingMethodNew, UserRole, WarehouseKind,
    WarehouseNew,
};
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "goldsail_admin")]
#[command(about = "Admin utilities for Golden Sail (bootstrap staff and catalog)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./goldsail.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Load the shipping methods and warehouses into an empty catalog.
    Seed,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    phone: Option<String>,
    /// `customer`, `staff` or `admin`.
    #[arg(long, default_value = "staff", value_parser = parse_role)]
    role: UserRole,
}

fn parse_role(raw: &str) -> Result<UserRole, String> {
    raw.parse().map_err(|err: engine::EngineError| err.to_string())
}

fn method(
    name: &str,
    mode: FreightMode,
    origin: &str,
    rate_type: RateType,
    base_rate: Decimal,
    currency: &str,
    transit_days: (i32, i32),
    schedule: &str,
    restrictions: &str,
) -> Result<ShippingMethodNew, Box<dyn Error + Send + Sync>> {
    Ok(ShippingMethodNew {
        name: name.to_string(),
        mode,
        origin: Some(origin.to_string()),
        rate_type,
        base_rate,
        currency: currency.parse::<Currency>()?,
        transit_days_min: Some(transit_days.0),
        transit_days_max: Some(transit_days.1),
        schedule: Some(schedule.to_string()),
        restrictions: Some(restrictions.to_string()),
    })
}

fn shipping_methods() -> Result<Vec<ShippingMethodNew>, Box<dyn Error + Send + Sync>> {
    Ok(vec![
        method(
            "Direct Air (Guangzhou)",
            FreightMode::Air,
            "Guangzhou",
            RateType::PerKg,
            Decimal::new(1250, 2),
            "USD",
            (3, 5),
            "Daily departures",
            "All items accepted",
        )?,
        method(
            "Hong Kong Air",
            FreightMode::Air,
            "Hong Kong",
            RateType::PerKg,
            Decimal::new(1400, 2),
            "USD",
            (10, 15),
            "Weekly departures",
            "Including batteries, liquids, powders, food",
        )?,
        method(
            "Guangzhou Sea Freight",
            FreightMode::Sea,
            "Guangzhou",
            RateType::PerCbm,
            Decimal::new(60000, 0),
            "KSH",
            (30, 35),
            "Weekly departures",
            "All items accepted",
        )?,
        method(
            "Yiwu Sea Freight",
            FreightMode::Sea,
            "Yiwu",
            RateType::PerCbm,
            Decimal::new(55000, 0),
            "KSH",
            (30, 35),
            "Weekly departures",
            "All items accepted",
        )?,
    ])
}

const CHINA_PHONE: &str = "17382634669";
const KENYA_PHONE: &str = "+254702103111";
const KENYA_EMAIL: &str = "info.goldensaillogistics@gmail.com";

fn china_warehouse(name: &str, address_en: &str, address_cn: &str, mode: FreightMode) -> WarehouseNew {
    WarehouseNew {
        name: name.to_string(),
        kind: WarehouseKind::Warehouse,
        country: Some("China".to_string()),
        address_en: Some(address_en.to_string()),
        address_cn: Some(address_cn.to_string()),
        phone_1: Some(CHINA_PHONE.to_string()),
        shipping_modes: vec![mode],
        ..Default::default()
    }
}

fn kenya_location(name: &str, kind: WarehouseKind, address_en: &str) -> WarehouseNew {
    WarehouseNew {
        name: name.to_string(),
        kind,
        country: Some("Kenya".to_string()),
        address_en: Some(address_en.to_string()),
        phone_1: Some(KENYA_PHONE.to_string()),
        email: Some(KENYA_EMAIL.to_string()),
        shipping_modes: vec![FreightMode::Air, FreightMode::Sea],
        ..Default::default()
    }
}

fn warehouses() -> Vec<WarehouseNew> {
    vec![
        WarehouseNew {
            phone_2: Some("13726888283".to_string()),
            ..china_warehouse(
                "Direct Air (Guangzhou)",
                "GUANGZHOU AIR WAREHOUSE, NO. 20-3, XIATANG WEST ROAD, YUEXIU DISTRICT, GUANGZHOU, CHINA",
                "广州空运仓库, 中国广州市越秀区下塘西路20-3号",
                FreightMode::Air,
            )
        },
        china_warehouse(
            "Hong Kong Air",
            "HONG KONG AIR WAREHOUSE, KWAI CHUNG, NEW TERRITORIES, HONG KONG",
            "香港空运仓库, 香港新界葵涌",
            FreightMode::Air,
        ),
        china_warehouse(
            "Guangzhou Sea Freight",
            "GUANGZHOU SEA WAREHOUSE, HUANGPU PORT, GUANGZHOU, CHINA",
            "广州海运仓库, 中国广州黄埔港",
            FreightMode::Sea,
        ),
        china_warehouse(
            "Yiwu Sea Freight",
            "YIWU SEA WAREHOUSE, YIWU INTERNATIONAL TRADE CITY, ZHEJIANG, CHINA",
            "义乌海运仓库, 中国浙江义乌国际商贸城",
            FreightMode::Sea,
        ),
        kenya_location(
            "Main Warehouse",
            WarehouseKind::Warehouse,
            "GOLDEN SAIL MAIN WAREHOUSE, INDUSTRIAL AREA, NAIROBI, KENYA",
        ),
        kenya_location(
            "Eastleigh Office",
            WarehouseKind::Office,
            "GOLDEN SAIL EASTLEIGH OFFICE, 1ST AVENUE, EASTLEIGH, NAIROBI, KENYA",
        ),
        kenya_location(
            "CBD Pick-up Point",
            WarehouseKind::PickupPoint,
            "GOLDEN SAIL CBD OFFICE, KIMATHI STREET, NAIROBI CBD, KENYA",
        ),
    ]
}

async fn seed(engine: &Engine) -> Result<(), Box<dyn Error + Send + Sync>> {
    if engine.shipping_methods(false).await?.is_empty() {
        for new in shipping_methods()? {
            let created = engine.new_shipping_method(new).await?;
            println!("created shipping method: {} ({})", created.name, created.id);
        }
    } else {
        println!("shipping methods already present, skipping");
    }

    if engine.warehouses(None, None).await?.is_empty() {
        for new in warehouses() {
            let created = engine.new_warehouse(new).await?;
            println!("created warehouse: {} ({})", created.name, created.id);
        }
    } else {
        println!("warehouses already present, skipping");
    }

    Ok(())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            let user = match engine
                .create_user_with_role(
                    &args.email,
                    &password,
                    &args.full_name,
                    args.phone.as_deref(),
                    args.role,
                )
                .await
            {
                Ok(user) => user,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            };

            println!("created {} user: {} ({})", user.role, user.email, user.id);
        }
        Command::Seed => seed(&engine).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seed_loads_catalog_once() {
        let db = connect_db("sqlite::memory:").await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();

        seed(&engine).await.unwrap();
        seed(&engine).await.unwrap();

        let methods = engine.shipping_methods(true).await.unwrap();
        assert_eq!(methods.len(), 4);
        assert_eq!(engine.warehouses(None, None).await.unwrap().len(), 7);
        assert_eq!(
            engine
                .warehouses(Some("Kenya"), Some(FreightMode::Sea))
                .await
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn role_argument_parses() {
        assert_eq!(parse_role("admin"), Ok(UserRole::Admin));
        assert!(parse_role("root").is_err());
    }
}
