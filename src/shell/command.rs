use chrono::{Local, NaiveDateTime, TimeZone};

use crate::domain::garage::status::TIME_FORMAT;
use crate::domain::garage::vehicle::VehicleCategory;
use crate::error::{Error, Result};

/// One line of shell input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `arrive <plate> <category> [time]`
    Arrive { plate: String, category: VehicleCategory, time: Option<i64> },

    /// `depart <plate> [time]`
    Depart { plate: String, time: Option<i64> },

    Status,
    Garage,
    Lane,
    Find { plate: String },

    /// `slots <small> <medium> <large>`
    Slots { small: usize, medium: usize, large: usize },

    Save { path: String },
    Load { path: String },
    Reset,
    Demo,
    Help,
    Quit,
}

impl Command {
    /// Parses a shell line. Blank lines and lines starting with `#` yield `None`.
    ///
    /// Times are either epoch seconds or a local `YYYY-MM-DD HH:MM:SS` timestamp.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (keyword, args) = (tokens[0].to_ascii_lowercase(), &tokens[1..]);

        let command = match keyword.as_str() {
            "arrive" | "a" => {
                let [plate, category, rest @ ..] = args else {
                    return Err(usage("arrive <plate> <small|medium|large> [time]"));
                };
                Command::Arrive { plate: plate.to_string(), category: category.parse()?, time: parse_time(rest)? }
            }
            "depart" | "d" => {
                let [plate, rest @ ..] = args else {
                    return Err(usage("depart <plate> [time]"));
                };
                Command::Depart { plate: plate.to_string(), time: parse_time(rest)? }
            }
            "status" | "s" => no_args(args, Command::Status, "status")?,
            "garage" | "g" => no_args(args, Command::Garage, "garage")?,
            "lane" | "l" => no_args(args, Command::Lane, "lane")?,
            "find" | "f" => match args {
                [plate] => Command::Find { plate: plate.to_string() },
                _ => return Err(usage("find <plate>")),
            },
            "slots" => match args {
                [small, medium, large] => Command::Slots { small: parse_count(small)?, medium: parse_count(medium)?, large: parse_count(large)? },
                _ => return Err(usage("slots <small> <medium> <large>")),
            },
            "save" => match args {
                [path] => Command::Save { path: path.to_string() },
                _ => return Err(usage("save <file>")),
            },
            "load" => match args {
                [path] => Command::Load { path: path.to_string() },
                _ => return Err(usage("load <file>")),
            },
            "reset" => no_args(args, Command::Reset, "reset")?,
            "demo" => no_args(args, Command::Demo, "demo")?,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(Error::CommandParse(format!("unknown command '{}', type 'help' for a list", other))),
        };

        Ok(Some(command))
    }
}

pub const HELP: &str = "\
Commands:
  arrive <plate> <small|medium|large> [time]   vehicle arrives at the gate
  depart <plate> [time]                        vehicle leaves (garage or waiting lane)
  status                                       capacity and slot usage
  garage                                       parked vehicles, gate side first
  lane                                         waiting vehicles, front first
  find <plate>                                 where a vehicle is
  slots <small> <medium> <large>               change slot totals (empty garage only)
  save <file> | load <file>                    persist or restore the garage
  reset                                        drop all vehicles
  demo                                         run the course data set
  help | quit
Times are epoch seconds or 'YYYY-MM-DD HH:MM:SS'. Without a time the shell clock is used.";

fn usage(form: &str) -> Error {
    Error::CommandParse(format!("usage: {}", form))
}

fn no_args(args: &[&str], command: Command, form: &str) -> Result<Command> {
    if args.is_empty() { Ok(command) } else { Err(usage(form)) }
}

fn parse_count(raw: &str) -> Result<usize> {
    raw.parse().map_err(|_| Error::CommandParse(format!("'{}' is not a slot count", raw)))
}

fn parse_time(tokens: &[&str]) -> Result<Option<i64>> {
    match tokens {
        [] => Ok(None),
        [seconds] => seconds.parse::<i64>().map(Some).map_err(|_| Error::CommandParse(format!("'{}' is not a time", seconds))),
        [date, time] => {
            let raw = format!("{} {}", date, time);
            let naive = NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(|e| Error::CommandParse(format!("'{}' is not a time: {}", raw, e)))?;
            Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| Some(local.timestamp()))
                .ok_or_else(|| Error::CommandParse(format!("'{}' does not exist in the local time zone", raw)))
        }
        _ => Err(Error::CommandParse(format!("unexpected arguments '{}'", tokens.join(" ")))),
    }
}
