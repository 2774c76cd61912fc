use anglicize::settings::Settings;
use anglicize::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

const CONFIG_PATH_VAR: &str = "ANGLICIZE_CONFIG";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config_path = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
    let settings = match Settings::load(config_path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let text = match read_input().await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            eprintln!("Usage: anglicize <text>, or pipe the text to stdin");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("Could not read input: {e}");
            return ExitCode::FAILURE;
        }
    };

    let res = translate(text.trim(), &settings).await;
    println!("english: {}", res.is_english);
    println!("{}", res.text);

    ExitCode::SUCCESS
}

async fn read_input() -> std::io::Result<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if !args.is_empty() {
        return Ok(args.join(" "));
    }
    let mut text = String::new();
    tokio::io::stdin().read_to_string(&mut text).await?;
    Ok(text)
}
