use bevy::gltf::Gltf;
use bevy::prelude::*;

use crate::engine::model::bounds::ModelBounds;
use crate::engine::model::format::ModelFormat;

/// Where a viewer command originated, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSource {
    Keyboard,
    Rpc,
    Startup,
}

/// Request to load a model and attach it, superseding whatever is in flight.
#[derive(Event, Debug, Clone)]
pub struct LoadModelEvent {
    pub url: String,
    pub source: RequestSource,
}

/// Request to re-centre the attached model and re-frame the camera on it.
#[derive(Event, Debug, Clone, Copy)]
pub struct CenterModelEvent;

/// Fired once a freshly spawned subtree has been measured, centred and
/// recorded as the attached model.
#[derive(Event, Debug, Clone)]
pub struct ModelAttachedEvent {
    pub root: Entity,
    pub url: String,
}

/// Coarse milestones of an asynchronous load, reported as a monotone
/// progress fraction. The asset server does not expose byte-level progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadStage {
    Requested,
    DocumentParsed,
    DependenciesReady,
}

impl LoadStage {
    pub fn progress(self) -> f32 {
        match self {
            LoadStage::Requested => 0.0,
            LoadStage::DocumentParsed => 1.0 / 3.0,
            LoadStage::DependenciesReady => 2.0 / 3.0,
        }
    }
}

/// A load that has been issued but not yet attached.
pub struct PendingLoad {
    pub generation: u64,
    pub url: String,
    pub format: ModelFormat,
    pub gltf: Handle<Gltf>,
    pub stage: LoadStage,
    /// Root entity of the scene instance once it has been spawned, while
    /// waiting for the hierarchy to be ready for measurement.
    pub spawned_root: Option<Entity>,
}

/// The model currently in the scene. The glTF handle is held so the source
/// asset stays resident for as long as the model is attached.
pub struct AttachedModel {
    pub generation: u64,
    pub url: String,
    pub root: Entity,
    pub bounds: ModelBounds,
    pub gltf: Handle<Gltf>,
}

/// Owner of the single-model lifecycle: at most one attached model, at most
/// one pending load. Each load request takes the next generation number and
/// a completion may attach only while its generation is still the latest,
/// so a superseded load can finish late without clobbering its successor.
#[derive(Resource, Default)]
pub struct ModelSlot {
    generation: u64,
    pub pending: Option<PendingLoad>,
    pub attached: Option<AttachedModel>,
}

impl ModelSlot {
    /// Issue the next generation and record the pending load.
    pub fn begin_load(&mut self, url: String, format: ModelFormat, gltf: Handle<Gltf>) -> u64 {
        self.generation += 1;
        self.pending = Some(PendingLoad {
            generation: self.generation,
            url,
            format,
            gltf,
            stage: LoadStage::Requested,
            spawned_root: None,
        });
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Drop the pending load, handing back a root that was already spawned
    /// for it so the caller can despawn it.
    pub fn clear_pending(&mut self) -> Option<Entity> {
        self.pending.take().and_then(|pending| pending.spawned_root)
    }

    /// Detach the current model, if any. Safe to call repeatedly: later
    /// calls see an empty slot and return `None`.
    pub fn detach(&mut self) -> Option<AttachedModel> {
        self.attached.take()
    }

    pub fn attach(&mut self, attached: AttachedModel) -> Option<AttachedModel> {
        self.attached.replace(attached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_with_pending(url: &str) -> (ModelSlot, u64) {
        let mut slot = ModelSlot::default();
        let generation = slot.begin_load(url.to_owned(), ModelFormat::Glb, Handle::default());
        (slot, generation)
    }

    #[test]
    fn a_newer_request_supersedes_an_older_one() {
        let (mut slot, first) = slot_with_pending("a.glb");
        let second = slot.begin_load("b.glb".to_owned(), ModelFormat::Glb, Handle::default());

        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));
        let pending = slot.pending.as_ref().unwrap();
        assert_eq!(pending.url, "b.glb");
        assert_eq!(pending.generation, second);
    }

    #[test]
    fn generations_increase_monotonically() {
        let (mut slot, first) = slot_with_pending("a.glb");
        let second = slot.begin_load("b.glb".to_owned(), ModelFormat::Gltf, Handle::default());
        let third = slot.begin_load("c.glb".to_owned(), ModelFormat::Glb, Handle::default());
        assert!(first < second && second < third);
    }

    #[test]
    fn detach_is_idempotent() {
        let mut world = World::new();
        let root = world.spawn_empty().id();

        let mut slot = ModelSlot::default();
        slot.attach(AttachedModel {
            generation: 1,
            url: "duck.glb".to_owned(),
            root,
            bounds: ModelBounds::at_point(Vec3::ZERO),
            gltf: Handle::default(),
        });

        assert!(slot.detach().is_some());
        assert!(slot.detach().is_none());
        assert!(slot.detach().is_none());
    }

    #[test]
    fn clear_pending_hands_back_a_spawned_root_once() {
        let mut world = World::new();
        let root = world.spawn_empty().id();

        let (mut slot, _) = slot_with_pending("a.glb");
        slot.pending.as_mut().unwrap().spawned_root = Some(root);

        assert_eq!(slot.clear_pending(), Some(root));
        assert_eq!(slot.clear_pending(), None);
    }

    #[test]
    fn load_stages_report_increasing_progress() {
        let stages = [
            LoadStage::Requested,
            LoadStage::DocumentParsed,
            LoadStage::DependenciesReady,
        ];
        for pair in stages.windows(2) {
            assert!(pair[0].progress() < pair[1].progress());
        }
        assert!(LoadStage::DependenciesReady.progress() < 1.0);
    }
}
