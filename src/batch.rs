//! Per-frame grouping of actors by the model they are drawn with.
//!
//! Actors can switch models between frames, so the grouping is rebuilt from
//! scratch every frame in a single pass over the actors. Only the bucket
//! allocations are reused.

use crate::{data_structures::model::ModelId, error::EngineError, scene::Actor};

/// Actor indices bucketed by model, in model-collection order.
#[derive(Debug, Default, Clone)]
pub struct InstanceBatches {
    buckets: Vec<Vec<usize>>,
}

impl InstanceBatches {
    /// Non-empty groups in model order. Inside a group actors keep the order
    /// they have in the level.
    pub fn groups(&self) -> impl Iterator<Item = (ModelId, &[usize])> {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(_, actors)| !actors.is_empty())
            .map(|(idx, actors)| (ModelId(idx), actors.as_slice()))
    }

    /// Actors drawn with `model`, `None` when there are none.
    pub fn group(&self, model: ModelId) -> Option<&[usize]> {
        self.buckets
            .get(model.0)
            .filter(|actors| !actors.is_empty())
            .map(Vec::as_slice)
    }

    /// Number of non-empty groups, i.e. instanced draw calls for actors.
    pub fn len(&self) -> usize {
        self.groups().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn instance_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Default)]
pub struct InstanceBatcher {
    batches: InstanceBatches,
}

impl InstanceBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group `actors` by model. `model_count` is the size of the level's model collection.
    pub fn rebuild(
        &mut self,
        actors: &[Box<dyn Actor>],
        model_count: usize,
    ) -> Result<&InstanceBatches, EngineError> {
        let buckets = &mut self.batches.buckets;
        buckets.iter_mut().for_each(Vec::clear);
        buckets.resize_with(model_count, Vec::new);

        for (idx, actor) in actors.iter().enumerate() {
            let model = actor.model();
            match buckets.get_mut(model.0) {
                Some(bucket) => bucket.push(idx),
                None => {
                    buckets.iter_mut().for_each(Vec::clear);
                    return Err(EngineError::UnknownModel { actor: idx, model });
                }
            }
        }
        Ok(&self.batches)
    }

    /// The grouping produced by the last `rebuild`, empty if it failed.
    pub fn batches(&self) -> &InstanceBatches {
        &self.batches
    }
}
