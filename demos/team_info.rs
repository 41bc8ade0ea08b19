//! Fetch the current team's info through the `team` facet.
//!
//! Run:
//! `SLACK_TOKEN=<token> cargo run --example team_info`

use slack_web_client::WebClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let token = match std::env::var("SLACK_TOKEN") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Set SLACK_TOKEN before running this example.");
            std::process::exit(2);
        }
    };

    let client = WebClient::with_token(token)?;
    let info = client.team().info()?.await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
