//! Flower growth fed by completed tasks.
//!
//! Every completion waters the flower once; every three waterings it grows a
//! stage, up to stage 5. A fully grown flower can be planted into the garden
//! bed, which starts a new flower from stage 1.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CommandError;
use crate::events::Event;

pub const WATERS_PER_STAGE: u32 = 3;
pub const MAX_STAGE: u8 = 5;

/// `clamp(1 + water_count / 3, 1, 5)`.
pub fn stage_for(water_count: u32) -> u8 {
    let stage = 1 + water_count / WATERS_PER_STAGE;
    stage.clamp(1, u32::from(MAX_STAGE)) as u8
}

/// A flower moved into the garden bed by `plant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flower {
    pub id: String,
    pub planted_at: DateTime<Utc>,
    pub task_id: Option<String>,
}

/// Read-only garden view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenState {
    pub water_count: u32,
    pub stage: u8,
    pub ready: bool,
    pub planted: bool,
    pub flowers: Vec<Flower>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GardenEngine {
    water_count: u32,
    planted: bool,
    flowers: Vec<Flower>,
}

impl GardenEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn water_count(&self) -> u32 {
        self.water_count
    }

    pub fn stage(&self) -> u8 {
        stage_for(self.water_count)
    }

    pub fn is_ready(&self) -> bool {
        self.stage() >= MAX_STAGE
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    /// Water once per newly completed task. `n` may batch several completions.
    pub fn on_task_completed(&mut self, n: u32, now: DateTime<Utc>) -> Option<Event> {
        if n == 0 {
            return None;
        }
        self.water_count = self.water_count.saturating_add(n);
        Some(Event::GardenWatered {
            added: n,
            water_count: self.water_count,
            stage: self.stage(),
            at: now,
        })
    }

    /// Move the grown flower into the bed and start over from stage 1.
    ///
    /// The whole transition happens inside this call, so no reader ever sees
    /// `planted == true` or a half-reset counter.
    pub fn plant(
        &mut self,
        task_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Event, CommandError> {
        if !self.is_ready() {
            return Err(CommandError::NotReady {
                stage: self.stage(),
            });
        }
        self.planted = true;
        let flower = Flower {
            id: Uuid::new_v4().to_string(),
            planted_at: now,
            task_id,
        };
        let event = Event::FlowerPlanted {
            flower_id: flower.id.clone(),
            task_id: flower.task_id.clone(),
            at: now,
        };
        self.flowers.push(flower);
        self.water_count = 0;
        self.planted = false;
        Ok(event)
    }

    pub fn state(&self) -> GardenState {
        GardenState {
            water_count: self.water_count,
            stage: self.stage(),
            ready: self.is_ready(),
            planted: self.planted,
            flowers: self.flowers.clone(),
        }
    }
}
