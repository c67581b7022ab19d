use fftw::types::Flag;

/// Planning rigor handed to FFTW when the directional plans are created.
///
/// Planning happens once at solver setup while the transforms run on
/// every solve, so the default times candidate schedules. Short-lived
/// solvers and tests are better served by `Estimate`: measuring dozens of
/// schedules for a transform that runs a handful of times costs more than
/// it saves.
#[derive(Copy, Clone, Debug, Default)]
pub enum PlanFlag {
    /// Heuristic plan, no timing runs.
    Estimate,
    /// Time a set of candidate schedules and keep the fastest.
    #[default]
    Measure,
    /// Widen the candidate search beyond `Measure`.
    Patient,
    /// Only accept a plan already covered by loaded wisdom.
    WisdomOnly,
}

impl From<PlanFlag> for Flag {
    fn from(flag: PlanFlag) -> Flag {
        match flag {
            PlanFlag::Estimate => Flag::ESTIMATE,
            PlanFlag::Measure => Flag::MEASURE,
            PlanFlag::Patient => Flag::PATIENT,
            PlanFlag::WisdomOnly => Flag::WISDOWMONLY,
        }
    }
}
