#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProgressPhase {
    Discovering,
    Exporting,
}

#[derive(Clone, Debug)]
pub enum ProgressMessage {
    Started {
        phase: ProgressPhase,
        total: usize,
    },
    Progress {
        phase: ProgressPhase,
        current: usize,
        unit: Option<String>,
    },
    Finished {
        phase: ProgressPhase,
    },
    UnitFailed(String),
}
