use crate::config::Config;
use crate::state::AppState;

pub async fn cmd_lookup(config: Config, query: &str) -> anyhow::Result<()> {
    let state = AppState::new(config).await?;

    let location = state.lookup.location(query).await?;

    println!("{}", serde_json::to_string_pretty(&location)?);
    Ok(())
}
