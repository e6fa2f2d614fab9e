use crate::chart::{Chart, compose_chart};
use crate::date::{Clock, Date, SystemClock};
use crate::diamond::DiamondChart;
use crate::error::Result;
use crate::family::{FamilyReport, Member, analyze};

/// The numerology computations consumed by the store, CLI and servers.
pub trait NumerologyEngine {
    /// The date every age and personal-year computation is taken on.
    fn today(&self) -> Date;

    fn chart(&self, birth: Date, latin_name: &str) -> Result<Chart>;

    fn diamond(&self, birth: Date) -> DiamondChart;

    fn family(&self, members: &[Member]) -> Result<FamilyReport>;
}

/// Production engine. "Today" comes from the injected clock.
#[derive(Clone, Debug, Default)]
pub struct PdsEngine<C = SystemClock> {
    clock: C,
    keep_master: bool,
}

impl<C: Clock> PdsEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            keep_master: false,
        }
    }

    /// Keep 11/22/33 unreduced in the diamond chart. Off by default.
    pub fn keep_master(mut self, keep: bool) -> Self {
        self.keep_master = keep;
        self
    }
}

impl<C: Clock> NumerologyEngine for PdsEngine<C> {
    fn today(&self) -> Date {
        self.clock.today()
    }

    fn chart(&self, birth: Date, latin_name: &str) -> Result<Chart> {
        compose_chart(birth, latin_name, self.today())
    }

    fn diamond(&self, birth: Date) -> DiamondChart {
        DiamondChart::compute(birth, self.keep_master)
    }

    fn family(&self, members: &[Member]) -> Result<FamilyReport> {
        analyze(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::FixedClock;

    #[test]
    fn test_fixed_clock_drives_personal_year() {
        let birth = Date::parse("1990-01-01").unwrap();
        let a = PdsEngine::with_clock(FixedClock(Date::parse("2026-10-14").unwrap()));
        let b = PdsEngine::with_clock(FixedClock(Date::parse("2027-10-14").unwrap()));
        assert_eq!(a.today(), Date::parse("2026-10-14").unwrap());
        assert_eq!(a.chart(birth, "").unwrap().personal_year, 3);
        assert_eq!(b.chart(birth, "").unwrap().personal_year, 4);
    }

    #[test]
    fn test_keep_master_defaults_off() {
        let birth = Date::parse("1975-11-22").unwrap();
        let clock = FixedClock(Date::parse("2026-10-14").unwrap());
        let default = PdsEngine::with_clock(clock).diamond(birth);
        assert_eq!(default, DiamondChart::compute(birth, false));
        let master = PdsEngine::with_clock(clock).keep_master(true).diamond(birth);
        assert_eq!(master, DiamondChart::compute(birth, true));
    }

    #[test]
    fn test_engine_is_object_safe() {
        let engine: Box<dyn NumerologyEngine> = Box::new(PdsEngine::<SystemClock>::default());
        let birth = Date::parse("1990-01-01").unwrap();
        assert_eq!(engine.diamond(birth).life_path, 3);
    }
}
