use serde::Serialize;

/// Progress of one `generate` run. Stages are entered strictly in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    TextLoaded,
    AudioReady,
    SegmentsRendered,
    Merged,
    Muxed,
    CleanedUp,
    Done,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Init,
        Stage::TextLoaded,
        Stage::AudioReady,
        Stage::SegmentsRendered,
        Stage::Merged,
        Stage::Muxed,
        Stage::CleanedUp,
        Stage::Done,
    ];

    pub fn next(self) -> Option<Stage> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }
}

/// Records the stages a run has passed through.
#[derive(Debug)]
pub(crate) struct Progress {
    history: Vec<Stage>,
}

impl Progress {
    pub(crate) fn new() -> Self {
        tracing::debug!(stage = ?Stage::Init, "entered stage");
        Self {
            history: vec![Stage::Init],
        }
    }

    pub(crate) fn current(&self) -> Stage {
        self.history.last().copied().unwrap_or(Stage::Init)
    }

    pub(crate) fn enter(&mut self, stage: Stage) {
        debug_assert_eq!(
            self.current().next(),
            Some(stage),
            "stages must be entered in order"
        );
        tracing::debug!(stage = ?stage, "entered stage");
        self.history.push(stage);
    }

    pub(crate) fn into_history(self) -> Vec<Stage> {
        self.history
    }
}
