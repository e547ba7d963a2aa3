use clap::ValueEnum;
use division::CycleMode;

// Args decouple CLI arg handling from the internal data structures

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum CycleModeArg {
    /// Render the repeating group in parentheses
    Describe,
    /// Reject expansions that do not terminate
    Fail,
}

impl CycleModeArg {
    pub fn to_cycle_mode(self) -> CycleMode {
        match self {
            CycleModeArg::Describe => CycleMode::Describe,
            CycleModeArg::Fail => CycleMode::Fail,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum CacheArg {
    /// Keep every result
    Plain,
    /// Keep results until cleared or invalidated
    Manual,
    /// Keep results for a limited time
    Ttl,
    /// Keep a limited number of results
    Lru,
}
