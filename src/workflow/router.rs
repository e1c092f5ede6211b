//! Stage identifiers and step routing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Step 1: business diagnosis
    Diagnosis,

    /// Step 2: brand name candidates
    Naming,

    /// Step 3: concept candidates
    Concept,

    /// Step 4: brand story candidates
    Story,

    /// Step 5: logo candidates
    Logo,
}

/// Step-number routing table.
const ROUTES: [(i64, Stage); 5] = [
    (1, Stage::Diagnosis),
    (2, Stage::Naming),
    (3, Stage::Concept),
    (4, Stage::Story),
    (5, Stage::Logo),
];

/// Select the stage for a declared step number.
///
/// Unknown steps, including anything below 1 or above 5, route to
/// [`Stage::Diagnosis`].
pub fn route(current_step: i64) -> Stage {
    let stage = ROUTES
        .iter()
        .find(|(step, _)| *step == current_step)
        .map_or(Stage::Diagnosis, |(_, stage)| *stage);
    tracing::debug!(current_step, stage = %stage, "Routed step");
    stage
}

impl Stage {
    /// All stages in workflow order.
    pub const ALL: [Self; 5] = [Self::Diagnosis, Self::Naming, Self::Concept, Self::Story, Self::Logo];

    /// The 1-based step number of this stage.
    pub fn step(self) -> u8 {
        match self {
            Self::Diagnosis => 1,
            Self::Naming => 2,
            Self::Concept => 3,
            Self::Story => 4,
            Self::Logo => 5,
        }
    }

    /// The step the caller should invoke next.
    pub fn next_step(self) -> u8 {
        self.step() + 1
    }

    /// Lower-case stage name used for storage and context keys.
    pub fn name(self) -> &'static str {
        match self {
            Self::Diagnosis => "diagnosis",
            Self::Naming => "naming",
            Self::Concept => "concept",
            Self::Story => "story",
            Self::Logo => "logo",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
