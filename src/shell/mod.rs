pub mod command;

use std::io::{BufRead, Write};

use colored::Colorize;

use crate::domain::garage::config::GarageConfig;
use crate::domain::garage::coordinator::ParkingCoordinator;
use crate::domain::garage::outcome::{ArrivalOutcome, DepartureOutcome, VehicleLocation};
use crate::domain::simulator::simulator::SharedSimulator;
use crate::domain::traffic::{self, EventOutcome, GarageEvent};
use crate::error::Result;
use crate::run_events;
use crate::shell::command::{Command, HELP};

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end around a [`ParkingCoordinator`].
pub struct Shell {
    coordinator: ParkingCoordinator,
    initial_config: GarageConfig,
    clock: SharedSimulator,
}

impl Shell {
    /// `clock` stamps arrivals and departures typed without a time.
    pub fn new(config: GarageConfig, clock: SharedSimulator) -> Self {
        Shell { coordinator: ParkingCoordinator::new(config.clone()), initial_config: config, clock }
    }

    pub fn coordinator(&self) -> &ParkingCoordinator {
        &self.coordinator
    }

    /// Reads commands until `quit` or end of input. Bad commands are reported and skipped.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "{}", "Parking garage shell. Type 'help' for commands.".bold())?;

        for line in input.lines() {
            let line = line?;
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(out, "{}", e.to_string().red())?;
                    continue;
                }
            };

            log::debug!("Shell command: {:?}", command);
            match self.execute(command, out) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    log::error!("Command failed: {}", e);
                    writeln!(out, "{}", e.to_string().red())?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        match command {
            Command::Arrive { plate, category, time } => {
                let event = GarageEvent::arrival(&plate, category, time.unwrap_or_else(|| self.clock.get_current_time_in_s()));
                let outcome = event.apply(&mut self.coordinator);
                writeln!(out, "{}", render_outcome(&event, &outcome))?;
            }
            Command::Depart { plate, time } => {
                let event = GarageEvent::departure(&plate, time.unwrap_or_else(|| self.clock.get_current_time_in_s()));
                let outcome = event.apply(&mut self.coordinator);
                writeln!(out, "{}", render_outcome(&event, &outcome))?;
            }
            Command::Status => writeln!(out, "{}", self.coordinator.status())?,
            Command::Garage => {
                let rows = self.coordinator.garage_rows();
                if rows.is_empty() {
                    writeln!(out, "Garage is empty.")?;
                }
                for row in rows {
                    writeln!(out, "{}", row)?;
                }
            }
            Command::Lane => {
                let rows = self.coordinator.waiting_rows();
                if rows.is_empty() {
                    writeln!(out, "Waiting lane is empty.")?;
                }
                for row in rows {
                    writeln!(out, "{}", row)?;
                }
            }
            Command::Find { plate } => {
                let text = match self.coordinator.find(&plate) {
                    VehicleLocation::Garage(position) => format!("{} is parked at position {} from the gate.", plate, position),
                    VehicleLocation::WaitingLane(position) => format!("{} is waiting at position {}.", plate, position),
                    VehicleLocation::NotTracked => format!("{} is not here.", plate),
                };
                writeln!(out, "{}", text)?;
            }
            Command::Slots { small, medium, large } => {
                self.coordinator.set_slot_totals(small, medium, large)?;
                writeln!(out, "Slot totals set to {}/{}/{}.", small, medium, large)?;
            }
            Command::Save { path } => {
                self.coordinator.save_to_file(&path)?;
                writeln!(out, "Saved to {}.", path)?;
            }
            Command::Load { path } => {
                self.coordinator.load_from_file(&path)?;
                writeln!(out, "Loaded {}: {} parked, {} waiting.", path, self.coordinator.occupied(), self.coordinator.waiting_lane_length())?;
            }
            Command::Reset => {
                self.coordinator.reset(self.initial_config.clone());
                writeln!(out, "Garage reset.")?;
            }
            Command::Demo => run_demo(&mut self.coordinator, out)?,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }
}

/// Resets `coordinator` to the course configuration and plays the course data set.
pub fn run_demo<W: Write>(coordinator: &mut ParkingCoordinator, out: &mut W) -> Result<()> {
    coordinator.reset(traffic::course_config());
    writeln!(out, "{}", "Course data set, n = 2, rate 5.00/h".bold())?;

    let events = traffic::course_events();
    let results = run_events(coordinator, &events, None)?;
    for (index, (event, outcome)) in events.iter().zip(results.iter()).enumerate() {
        writeln!(out, "[{}/{}] {}", index + 1, events.len(), render_outcome(event, outcome))?;
    }

    write!(out, "{}", coordinator.report())?;
    Ok(())
}

/// One colored line describing what happened to `event`.
pub fn render_outcome(event: &GarageEvent, outcome: &EventOutcome) -> String {
    let text = format!("{}: {}", event, outcome);
    match outcome {
        EventOutcome::Arrival(ArrivalOutcome::Parked { .. }) => text.green().to_string(),
        EventOutcome::Arrival(ArrivalOutcome::Diverted { .. }) => text.yellow().to_string(),
        EventOutcome::Arrival(ArrivalOutcome::Failure(_)) => text.red().to_string(),
        EventOutcome::Departure(DepartureOutcome::Departed(_)) => text.green().to_string(),
        EventOutcome::Departure(DepartureOutcome::LeftWaitingLane { .. }) => text.yellow().to_string(),
        EventOutcome::Departure(DepartureOutcome::NotFound) => text.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::simulator::simulator_mock::MockSimulator;
    use std::sync::Arc;

    fn shell(config: GarageConfig, now: i64) -> Shell {
        Shell::new(config, SharedSimulator(Arc::new(MockSimulator::new(now))))
    }

    fn run_script(shell: &mut Shell, script: &str) -> String {
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_missing_time_uses_clock() {
        let mut shell = shell(GarageConfig::new(3, 5.0).with_slots(3, 0, 0), 1_000);
        run_script(&mut shell, "arrive A small\n");

        let row = &shell.coordinator().garage_rows()[0];
        assert_eq!(row.plate, "A");
        assert_eq!(row.entry_time, 1_000);
    }

    #[test]
    fn test_bad_lines_do_not_stop_the_shell() {
        let mut shell = shell(GarageConfig::new(3, 5.0).with_slots(3, 0, 0), 0);
        let output = run_script(&mut shell, "arrive A\nbogus\narrive B small 10\nquit\narrive C small 20\n");

        assert!(output.contains("usage: arrive"));
        assert!(output.contains("unknown command 'bogus'"));
        assert_eq!(shell.coordinator().occupied(), 1, "Only B parks, C comes after quit");
    }

    #[test]
    fn test_slots_refused_while_occupied() {
        let mut shell = shell(GarageConfig::new(3, 5.0).with_slots(3, 0, 0), 0);
        let output = run_script(&mut shell, "arrive A small 0\nslots 1 1 1\n");

        assert!(output.contains("Invalid garage configuration"));
        assert_eq!(shell.coordinator().ledger().small.total, 3);
    }

    #[test]
    fn test_demo_diverts_all_small_cars() {
        let mut coordinator = ParkingCoordinator::default();
        let mut out = Vec::new();
        run_demo(&mut coordinator, &mut out).unwrap();

        assert_eq!(coordinator.total_capacity(), 2);
        assert_eq!(coordinator.occupied(), 0);
        // 1 and 2 leave the lane, 3 and 5 keep waiting, 4 leaves
        let waiting: Vec<String> = coordinator.waiting_rows().into_iter().map(|row| row.plate.to_string()).collect();
        assert_eq!(waiting, vec!["3", "5"]);
    }
}
