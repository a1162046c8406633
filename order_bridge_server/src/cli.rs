use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
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
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 13] = [
        "RUST_LOG",
        "OBG_HOST",
        "OBG_PORT",
        "OBG_INTAKE_SHOPIFY_SHOP",
        "OBG_INTAKE_SHOPIFY_API_VERSION",
        "OBG_CONFIRM_SHOPIFY_SHOP",
        "OBG_CONFIRM_SHOPIFY_API_VERSION",
        "OBG_SHOPIFY_HMAC_CHECKS",
        "OBG_ORDER_QUEUE_URL",
        "OBG_NOTIFY_URL",
        "OBG_OPERATING_UNIT",
        "OBG_RECENT_ORDER_WINDOW",
        "OBG_CONFIRMATION_BUFFER",
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
