//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `worrybin_core` linkage.
//! - Report how many worries a database holds, for quick local checks.

use worrybin_core::db::open_db;
use worrybin_core::{init_logging_with_config, CoreConfig, NoopHooks, WorryListController};

const LOG_DIR_NAME: &str = "worrybin_cli_logs";

fn main() {
    println!("worrybin_core ping={}", worrybin_core::ping());
    println!("worrybin_core version={}", worrybin_core::core_version());

    // Usage: worrybin_cli [db_path]
    let Some(db_path) = std::env::args().nth(1) else {
        return;
    };

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("worrybin_cli config error: {err}");
            std::process::exit(2);
        }
    };
    let log_dir = std::env::temp_dir().join(LOG_DIR_NAME);
    if let Err(err) = init_logging_with_config(&config, "", &log_dir.display().to_string()) {
        eprintln!("worrybin_cli logging disabled: {err}");
    }

    let list = open_db(&db_path)
        .map_err(|err| err.to_string())
        .and_then(|conn| {
            WorryListController::open(conn, NoopHooks, &config).map_err(|err| err.to_string())
        });

    match list {
        Ok(list) => {
            let realized = list.worries().iter().filter(|worry| worry.realized).count();
            println!(
                "worrybin_core slot={} worries={} realized={}",
                config.slot_key,
                list.worries().len(),
                realized
            );
        }
        Err(err) => {
            eprintln!("worrybin_cli failed to open `{db_path}`: {err}");
            std::process::exit(1);
        }
    }
}
