use chrono::Local;

use pocket_organizer::config::Config;
use pocket_organizer::diagnostics;
use pocket_organizer::Organizer;

const USAGE: &str = "Usage: organizer-inspect [check|keys|self-test|summary|tasks|clear]";

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Invalid configuration: {}. Using the default one", err);
            Config::default()
        }
    };
    let organizer = Organizer::from_config(&config);
    let storage = organizer.storage();

    let command = std::env::args().nth(1).unwrap_or_else(|| "check".to_string());
    let success = match command.as_str() {
        "check" => {
            let report = diagnostics::check_collections(storage).await;
            pocket_organizer::utils::print_report(&report);
            true
        },
        "keys" => {
            for key in diagnostics::list_app_keys(storage).await {
                println!("{}", key);
            }
            true
        },
        "self-test" => diagnostics::self_test(storage).await,
        "summary" => {
            organizer.load_all().await;
            let summary = organizer.summary(Local::now().date_naive()).await;
            pocket_organizer::utils::print_summary(&summary);
            true
        },
        "tasks" => {
            let mut tasks = organizer.tasks().lock().await;
            pocket_organizer::utils::print_tasks(tasks.load().await);
            true
        },
        "clear" => diagnostics::clear_all(storage).await,
        _ => {
            eprintln!("{}", USAGE);
            false
        },
    };

    if success == false {
        std::process::exit(1);
    }
}
