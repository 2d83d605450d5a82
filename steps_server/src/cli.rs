use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Secrets (STEPS_API_KEY, STEPS_BOT_TOKEN) are never printed
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "STEPS_HOST",
        "STEPS_PORT",
        "STEPS_DATABASE_URL",
        "STEPS_DB_MAX_CONNECTIONS",
        "STEPS_TELEGRAM_API_URL",
        "STEPS_WEATHER_URL",
        "STEPS_WEATHER_TIMEOUT_MS",
        "STEPS_DAILY_STEP_CAP",
        "STEPS_MAX_SPEED_KMH",
        "STEPS_TEMP_REFRESH_SECS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
