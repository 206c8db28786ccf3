use crate::config::Config;
use crate::domain::MediaKind;
use crate::state::SharedState;

pub async fn cmd_sync_genres(config: Config, media_type: Option<&str>) -> anyhow::Result<()> {
    let kinds = match media_type {
        Some(value) => vec![value.parse::<MediaKind>().map_err(anyhow::Error::msg)?],
        None => MediaKind::ALL.to_vec(),
    };

    let state = SharedState::new(config).await?;

    for kind in kinds {
        let count = state.genre_service.sync(kind).await?;
        println!("Synced {count} {kind} genres");
    }

    Ok(())
}
