use log::error;
use page_scriber::{fetch_static, fetch_with_browser, load_config, server, ExtractionResult};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let args: Vec<String> = env::args().collect();

    let result = match args.get(1).map(String::as_str) {
        None => return Ok(server::serve(config).await?),
        Some("--browser") => {
            let url = args.get(2).ok_or("Please provide a URL after --browser")?;
            fetch_with_browser(url, &config.browser).await
        }
        Some(url) => fetch_static(url, &config.fetch).await,
    };

    match result {
        Ok(result) => print_result(&result),
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}

fn print_result(result: &ExtractionResult) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}
