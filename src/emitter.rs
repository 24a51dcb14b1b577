use crate::config::Config;
use crate::link::HostLink;
use crate::panel::{DualPanels, TouchController};
use crate::report::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Nothing new since the last emit.
    Skipped,
    /// Both channels were attempted; `false` marks a dropped frame or line.
    Sent { frame: bool, line: bool },
}

pub struct Emitter {
    config: Config,
}

impl Emitter {
    pub const fn new(config: Config) -> Self {
        Emitter { config }
    }

    /// Sends the current state on both channels if anything was touched since
    /// the last emit, then consumes the dirty flag. Drops are not retried.
    pub fn emit<C, L>(&self, panels: &mut DualPanels<C>, link: &mut L) -> Emission
    where
        C: TouchController,
        L: HostLink,
    {
        if !panels.is_dirty() {
            return Emission::Skipped;
        }

        let report = Report::capture(panels);

        let frame = match link.send_frame(&report.to_frame(), self.config.send_timeout) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("frame dropped: {err:?}");
                false
            }
        };
        let line = match link.send_line(&report.to_line(self.config.report_pressure)) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("line dropped: {err:?}");
                false
            }
        };

        panels.clear_dirty();
        Emission::Sent { frame, line }
    }
}
