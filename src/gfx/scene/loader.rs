// src/gfx/scene/loader.rs
//! Asynchronous model loading
//!
//! The diorama model is parsed off the event loop on a worker thread. The
//! result comes back through a one-shot channel that the render loop polls
//! once per frame; the channel resolves exactly once, which is what drives
//! the awaiting-assets to active transition.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::thread;

use futures::channel::oneshot;

use crate::error::SceneError;

/// One named object parsed out of the model file, still in flat-array form.
pub struct LoadedModel {
    pub name: String,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

fn convert_models(models: Vec<tobj::Model>) -> Vec<LoadedModel> {
    models
        .into_iter()
        .map(|model| LoadedModel {
            name: model.name,
            positions: model.mesh.positions,
            normals: model.mesh.normals,
            indices: model.mesh.indices,
        })
        .collect()
}

/// Parses the model file into named objects.
///
/// Material definitions in a sidecar MTL file are ignored: the scene assigns
/// its own palette by node role.
pub fn load_models(path: &Path) -> Result<Vec<LoadedModel>, SceneError> {
    let (models, _materials) =
        tobj::load_obj(path, &load_options()).map_err(|source| SceneError::AssetLoad {
            path: path.display().to_string(),
            source,
        })?;

    log::info!(
        "loaded model '{}' with {} objects",
        path.display(),
        models.len()
    );

    Ok(convert_models(models))
}

/// Parses model data from an in-memory reader. Used by tests and embedders.
pub fn load_models_from_reader<R: BufRead>(reader: &mut R) -> Result<Vec<LoadedModel>, SceneError> {
    let (models, _materials) =
        tobj::load_obj_buf(reader, &load_options(), |_| {
            Ok((Vec::new(), std::collections::HashMap::new()))
        })
        .map_err(|source| SceneError::AssetLoad {
            path: "<buffer>".to_string(),
            source,
        })?;

    Ok(convert_models(models))
}

/// Handle to an in-flight model load.
pub struct ModelLoadTask {
    receiver: oneshot::Receiver<Result<Vec<LoadedModel>, SceneError>>,
}

impl ModelLoadTask {
    /// Starts loading the model on a worker thread.
    pub fn spawn(path: PathBuf) -> Self {
        let (sender, receiver) = oneshot::channel();

        thread::spawn(move || {
            let result = load_models(&path);
            // The receiver may have been dropped on teardown; nothing to do.
            let _ = sender.send(result);
        });

        Self { receiver }
    }

    /// Non-blocking poll. Returns `None` while the load is still running and
    /// the outcome exactly once when it resolves.
    pub fn poll(&mut self) -> Option<Result<Vec<LoadedModel>, SceneError>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(SceneError::LoadInterrupted)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_BOX_OBJ: &str = "\
o Sun
v -1 -1 0
v 1 -1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
o Moon
v -1 -1 2
v 1 -1 2
v 0 1 2
vn 0 0 1
f 4//1 5//1 6//1
";

    #[test]
    fn test_named_objects_survive_parsing() {
        let mut reader = Cursor::new(TWO_BOX_OBJ);
        let models = load_models_from_reader(&mut reader).unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "Sun");
        assert_eq!(models[1].name, "Moon");
        assert_eq!(models[0].positions.len(), 9);
        assert_eq!(models[0].indices.len(), 3);
    }

    #[test]
    fn test_missing_file_is_asset_load_error() {
        let err = load_models(Path::new("no/such/model.obj")).unwrap_err();
        match err {
            SceneError::AssetLoad { path, .. } => assert!(path.contains("model.obj")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_spawned_load_resolves_once() {
        let mut task = ModelLoadTask::spawn(PathBuf::from("no/such/model.obj"));

        // Worker threads are fast but not instantaneous; poll until resolved.
        let outcome = loop {
            if let Some(outcome) = task.poll() {
                break outcome;
            }
            thread::yield_now();
        };
        assert!(outcome.is_err());
    }
}
