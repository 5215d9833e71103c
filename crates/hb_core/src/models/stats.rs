//! Per-play statistics and the collaborator-facing sink interface.
//!
//! The engine fills a [`StatSheet`] while the play runs and hands it over
//! inside the `PlayRecord`. Long-term bookkeeping (career totals, league
//! leaderboards) belongs to external collaborators implementing
//! [`PlaySink`].

use serde::{Deserialize, Serialize};

use super::outcome::PlayRecord;
use super::player::FieldPosition;

/// One fielder's line for a single play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FielderStatLine {
    pub putouts: u8,
    pub assists: u8,
    pub errors: u8,
    /// Confidence shift from this play; positive after clean plays,
    /// negative after errors.
    pub composure_delta: f32,
}

/// The batter's line for a single play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BatterStatLine {
    pub hit: bool,
    pub out: bool,
    pub runs_batted_in: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatSheet {
    /// Indexed by `FieldPosition::index()`.
    pub fielders: [FielderStatLine; 9],
    pub batter: BatterStatLine,
}

impl StatSheet {
    pub fn fielder(&self, pos: FieldPosition) -> &FielderStatLine {
        &self.fielders[pos.index()]
    }

    pub fn fielder_mut(&mut self, pos: FieldPosition) -> &mut FielderStatLine {
        &mut self.fielders[pos.index()]
    }

    pub fn credit_putout(&mut self, pos: FieldPosition) {
        self.fielder_mut(pos).putouts += 1;
    }

    pub fn credit_assist(&mut self, pos: FieldPosition) {
        self.fielder_mut(pos).assists += 1;
    }

    pub fn charge_error(&mut self, pos: FieldPosition, composure_loss: f32) {
        let line = self.fielder_mut(pos);
        line.errors += 1;
        line.composure_delta -= composure_loss;
    }
}

/// Append-only interface a statistics recorder implements. The engine
/// never reads back through this; it is strictly a sink.
pub trait PlaySink {
    fn record(&mut self, record: &PlayRecord);
}

/// Trivial in-memory sink, enough for tests and the demo binary.
#[derive(Default)]
pub struct MemorySink {
    pub records: Vec<PlayRecord>,
}

impl PlaySink for MemorySink {
    fn record(&mut self, record: &PlayRecord) {
        self.records.push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_sheet_credits() {
        let mut sheet = StatSheet::default();
        sheet.credit_putout(FieldPosition::FirstBase);
        sheet.credit_assist(FieldPosition::Shortstop);
        sheet.charge_error(FieldPosition::LeftField, 1.5);

        assert_eq!(sheet.fielder(FieldPosition::FirstBase).putouts, 1);
        assert_eq!(sheet.fielder(FieldPosition::Shortstop).assists, 1);
        assert_eq!(sheet.fielder(FieldPosition::LeftField).errors, 1);
        assert!(sheet.fielder(FieldPosition::LeftField).composure_delta < 0.0);
    }
}
