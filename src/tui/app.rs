//! The sample/render refresh loop.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::error;

use super::screen::Screen;
use crate::collector::{PoolSources, Transport};
use crate::metrics::{AssembleError, assemble};
use crate::view::{Cell, ColumnSpec, column_width, project};

/// Fatal refresh-loop errors.
///
/// Formatting and projection problems never land here (they degrade to
/// warnings and error markers); only a provider violating its schema
/// contract or a broken screen ends the loop.
#[derive(Debug)]
pub enum RunError {
    Schema(AssembleError),
    Screen(io::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Schema(e) => write!(f, "{}", e),
            RunError::Screen(e) => write!(f, "screen error: {}", e),
        }
    }
}

impl std::error::Error for RunError {}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        RunError::Screen(e)
    }
}

/// Pads cells into one header line and one value line, left-justified.
fn render_rows(cells: &[Cell]) -> (String, String) {
    let mut header = String::new();
    let mut values = String::new();
    for cell in cells {
        let width = column_width(&cell.header, &cell.text);
        header.push_str(&format!("{:<width$}", cell.header));
        values.push_str(&format!("{:<width$}", cell.text));
    }
    (
        header.trim_end().to_string(),
        values.trim_end().to_string(),
    )
}

/// The refresh loop: sample the pool, render two aligned rows, sleep,
/// repeat until cancelled.
pub struct App<T: Transport, S: Screen> {
    sources: PoolSources,
    transport: T,
    screen: S,
    columns: Vec<ColumnSpec>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl<T: Transport, S: Screen> App<T, S> {
    pub fn new(
        sources: PoolSources,
        transport: T,
        screen: S,
        columns: Vec<ColumnSpec>,
        interval: Duration,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            sources,
            transport,
            screen,
            columns,
            interval,
            running,
        }
    }

    /// Loops until the cancellation flag clears. Cancellation is a normal
    /// exit: the screen is released by drop and the result is `Ok`.
    pub fn run(mut self) -> Result<(), RunError> {
        while self.running.load(Ordering::SeqCst) {
            self.cycle()?;
            self.sleep();
        }
        Ok(())
    }

    /// One sample/render cycle.
    ///
    /// A transport failure skips the cycle (the previous rows stay on
    /// screen); a schema mismatch is fatal and nothing is rendered, so a
    /// desynchronized snapshot can never reach the table.
    fn cycle(&mut self) -> Result<(), RunError> {
        let sections = match self.sources.collect(&mut self.transport) {
            Ok(sections) => sections,
            Err(e) => {
                error!("collection failed: {}", e);
                return Ok(());
            }
        };

        let snapshot = assemble(&sections).map_err(RunError::Schema)?;
        let cells = project(&snapshot, &self.columns);
        let (header, values) = render_rows(&cells);

        self.screen.put_row(0, &header)?;
        self.screen.put_row(1, &values)?;
        self.screen.refresh()?;
        Ok(())
    }

    /// Sleeps the configured interval in slices so cancellation aborts the
    /// wait promptly instead of running out the remaining time.
    fn sleep(&self) {
        let slice = Duration::from_millis(100);
        let mut remaining = self.interval;
        while remaining > Duration::ZERO && self.running.load(Ordering::SeqCst) {
            let step = remaining.min(slice);
            std::thread::sleep(step);
            remaining = remaining.saturating_sub(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockTransport;
    use crate::tui::CaptureScreen;

    fn app_with(transport: MockTransport) -> App<MockTransport, CaptureScreen> {
        let columns = ColumnSpec::parse_list("Name,CapLogicUsed,VirtCapUsedPerc,StateHealth");
        App::new(
            PoolSources::new("amalgm", 1.0),
            transport,
            CaptureScreen::new(),
            columns,
            Duration::from_millis(1),
            Arc::new(AtomicBool::new(true)),
        )
    }

    #[test]
    fn render_rows_pads_to_column_width() {
        let cells = vec![
            Cell {
                header: "Name".to_string(),
                text: "amalgm".to_string(),
            },
            Cell {
                header: "StateHealth".to_string(),
                text: "ONLINE".to_string(),
            },
        ];
        let (header, values) = render_rows(&cells);
        // "Name" padded to 8 (6 + 2), then the next header.
        assert_eq!(header, "Name    StateHealth");
        assert_eq!(values, "amalgm  ONLINE");
    }

    #[test]
    fn cycle_renders_header_and_value_rows() {
        let mut app = app_with(MockTransport::typical_pool());
        app.cycle().unwrap();

        assert_eq!(app.screen.refreshes(), 1);
        let header = app.screen.row(0).to_string();
        let values = app.screen.row(1).to_string();
        assert!(header.starts_with("Name"));
        assert!(values.starts_with("amalgm"));
        // 54866186481664 / (54866186481664 + 12908397449216) = 0.8095...
        assert!(values.contains("81%"));
        assert!(values.contains("ONLINE"));
        // Header and value cells line up column by column.
        assert_eq!(header.find("VirtCapUsedPerc"), values.find("81%"));
    }

    #[test]
    fn forced_unit_column_round_trips() {
        let mut app = app_with(MockTransport::typical_pool());
        app.columns = ColumnSpec::parse_list("CapLogicUsed:G");
        app.cycle().unwrap();

        let text = app.screen.row(1).trim().to_string();
        let gib: f64 = text.strip_suffix('G').unwrap().parse().unwrap();
        let recovered = gib * 1024f64.powi(3);
        assert!((recovered - 51567724367872.0).abs() <= 1024f64.powi(3));
    }

    #[test]
    fn schema_mismatch_is_fatal_and_renders_nothing() {
        let mut transport = MockTransport::typical_pool();
        transport.respond("zpool list", "ONLINE"); // frag field missing
        let mut app = app_with(transport);

        let err = app.cycle().unwrap_err();
        assert!(matches!(err, RunError::Schema(_)));
        assert_eq!(app.screen.refreshes(), 0);
        assert_eq!(app.screen.row(0), "");
    }

    #[test]
    fn transport_failure_skips_the_cycle() {
        let mut app = app_with(MockTransport::new());
        app.cycle().unwrap();
        assert_eq!(app.screen.refreshes(), 0);
    }

    #[test]
    fn cancelled_loop_exits_cleanly() {
        let mut app = app_with(MockTransport::typical_pool());
        app.running.store(false, Ordering::SeqCst);
        let screen_refreshes = app.screen.refreshes();
        assert_eq!(screen_refreshes, 0);
        assert!(app.run().is_ok());
    }
}
