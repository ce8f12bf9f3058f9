use std::path::Path;

use crate::{
    data_structures::model::{TextureData, TextureSource},
    scene::Level,
};

/**
 * This module contains all logic for loading textures and shader text from
 * the assets directory.
 */
pub mod texture;

pub async fn load_string(assets: &Path, file_name: &Path) -> anyhow::Result<String> {
    let path = assets.join(file_name);
    // TODO: switch to tokio::fs once loading happens off the render thread
    let txt = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("could not read {}: {}", path.display(), e))?;
    Ok(txt)
}

pub async fn load_binary(assets: &Path, file_name: &Path) -> anyhow::Result<Vec<u8>> {
    let path = assets.join(file_name);
    let data = std::fs::read(&path)
        .map_err(|e| anyhow::anyhow!("could not read {}: {}", path.display(), e))?;
    Ok(data)
}

/// Replace every file-backed texture of `level` with the file's contents.
///
/// Level loading itself never touches the file system, so this has to run
/// before the level is handed to the engine.
pub async fn prefetch_textures(assets: &Path, level: &mut Level) -> anyhow::Result<()> {
    let reads = level
        .textures
        .iter()
        .enumerate()
        .filter_map(|(idx, texture)| match &texture.data {
            TextureData::File(path) => Some((idx, path.clone())),
            _ => None,
        })
        .map(|(idx, path)| async move {
            let bytes = load_binary(assets, &path).await?;
            anyhow::Ok((idx, bytes))
        });
    let loaded = futures::future::try_join_all(reads).await?;
    for (idx, bytes) in loaded {
        let TextureSource { name, .. } = &level.textures[idx];
        log::debug!("prefetched texture `{}` ({} bytes)", name, bytes.len());
        level.textures[idx].data = TextureData::Encoded(bytes);
    }
    Ok(())
}
