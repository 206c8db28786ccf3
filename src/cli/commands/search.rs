use anyhow::Context;

use crate::api::{SearchResponse, query_bag};
use crate::config::Config;
use crate::state::SharedState;

/// Splits `key=value` arguments into query pairs.
pub fn parse_pairs(params: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    params
        .iter()
        .map(|param| {
            param
                .split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .with_context(|| format!("Expected key=value, got '{param}'"))
        })
        .collect()
}

pub async fn cmd_search(config: Config, params: &[String]) -> anyhow::Result<()> {
    let raw = query_bag(parse_pairs(params)?);

    let state = SharedState::new(config).await?;
    let outcome = state.search_service.search(&raw).await?;
    let lookup = state.genre_service.lookup_for(&outcome.items).await?;

    let response = SearchResponse::from_outcome(outcome, &lookup);
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_pairs(&[
            "media_type=movie".to_string(),
            "start_date=2020-01-01".to_string(),
            "sort_by=".to_string(),
        ])
        .unwrap();

        assert_eq!(pairs[0], ("media_type".to_string(), "movie".to_string()));
        assert_eq!(pairs[1], ("start_date".to_string(), "2020-01-01".to_string()));
        assert_eq!(pairs[2], ("sort_by".to_string(), String::new()));
    }

    #[test]
    fn test_parse_pairs_rejects_bare_words() {
        assert!(parse_pairs(&["movie".to_string()]).is_err());
    }
}
