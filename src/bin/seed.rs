use tintuc::{
    config::Config,
    storage::{Fixture, SCHEMA_FILE, SqlxStore, migrate, new_db_pool},
};

fn print_usage_and_exit() -> ! {
    eprintln!("Usage: seed <fixture.json> [--reset]");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    tintuc::init_tracing();

    let mut args = std::env::args().skip(1); // 跳过程序名

    let path = args.next().unwrap_or_else(|| {
        eprintln!("Missing <fixture.json>");
        print_usage_and_exit();
    });

    let reset = match args.next().as_deref() {
        None => false,
        Some("--reset") => true,
        Some(other) => {
            eprintln!("Unknown argument: {other}");
            print_usage_and_exit();
        }
    };

    if args.next().is_some() {
        eprintln!("Too many arguments provided.");
        print_usage_and_exit();
    }

    match seed(&path, reset).await {
        Ok(()) => println!("✅ Fixture loaded: {path}"),
        Err(e) => {
            eprintln!("❌ Failed to load fixture: {e}");
            std::process::exit(1);
        }
    }
}

async fn seed(path: &str, reset: bool) -> tintuc::error::Result<()> {
    let config = Config::from_env()?;
    let pool = new_db_pool(&config.database_url).await?;

    migrate(&pool, SCHEMA_FILE).await?;

    let fixture = Fixture::from_json(&std::fs::read_to_string(path)?)?;
    fixture.load(SqlxStore::new(pool), reset).await
}
