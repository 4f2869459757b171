//! Console commands standing in for the map's clicks, sliders and checkboxes.

use std::str::FromStr;
use std::time::Instant;

use thiserror::Error;

use crate::kernel::{Action, AppState};
use crate::models::{Slider, VillageTarget};

pub const HELP: &str = "\
commands:
  county <name>              click a county
  village <name> <district>  click a village in the current county
  zoom <level>               zoom the map
  income <0-100>             move the income weight slider
  density <0-100>            move the density weight slider
  specialty <name> on|off    tick or untick a clinic specialty
  close                      close the detail panel
  back                       return to the county view
  status                     show the current view
  logs                       show recent log lines
  help                       show this help
  quit                       exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    County(String),
    Village { name: String, district: String },
    Zoom(u8),
    Weight { slider: Slider, percent: u8 },
    Specialty { name: String, selected: bool },
    Close,
    Back,
    Status,
    Logs,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

fn percent(arg: Option<&str>, usage: &'static str) -> Result<u8, CommandError> {
    arg.and_then(|s| s.parse::<u8>().ok())
        .filter(|p| *p <= 100)
        .ok_or(CommandError::Usage(usage))
}

fn rest(words: &[&str], usage: &'static str) -> Result<String, CommandError> {
    if words.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    Ok(words.join(" "))
}

impl FromStr for ConsoleCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = words.split_first() else {
            return Err(CommandError::Empty);
        };

        match head.to_ascii_lowercase().as_str() {
            "county" | "c" => Ok(Self::County(rest(args, "county <name>")?)),
            "village" | "v" => match args {
                [name, district] => Ok(Self::Village {
                    name: (*name).to_string(),
                    district: (*district).to_string(),
                }),
                _ => Err(CommandError::Usage("village <name> <district>")),
            },
            "zoom" | "z" => args
                .first()
                .and_then(|s| s.parse::<u8>().ok())
                .map(Self::Zoom)
                .ok_or(CommandError::Usage("zoom <level>")),
            "income" => Ok(Self::Weight {
                slider: Slider::Income,
                percent: percent(args.first().copied(), "income <0-100>")?,
            }),
            "density" => Ok(Self::Weight {
                slider: Slider::Density,
                percent: percent(args.first().copied(), "density <0-100>")?,
            }),
            "specialty" | "sp" => {
                const USAGE: &str = "specialty <name> on|off";
                let Some((&switch, name)) = args.split_last() else {
                    return Err(CommandError::Usage(USAGE));
                };
                let selected = match switch.to_ascii_lowercase().as_str() {
                    "on" => true,
                    "off" => false,
                    _ => return Err(CommandError::Usage(USAGE)),
                };
                Ok(Self::Specialty {
                    name: rest(name, USAGE)?,
                    selected,
                })
            }
            "close" => Ok(Self::Close),
            "back" | "b" => Ok(Self::Back),
            "status" | "s" => Ok(Self::Status),
            "logs" => Ok(Self::Logs),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(head.to_string())),
        }
    }
}

impl ConsoleCommand {
    /// The map interaction this command performs. `None` for commands the
    /// console answers itself.
    pub fn into_action(self, state: &AppState, now: Instant) -> Option<Action> {
        match self {
            Self::County(county) => Some(Action::CountyClicked { county }),
            Self::Village { name, district } => {
                // Outside village mode there is no county to address; the
                // store rejects the incomplete target.
                let county = state.current_county().unwrap_or_default();
                Some(Action::VillageClicked(VillageTarget::new(
                    county, district, name,
                )))
            }
            Self::Zoom(zoom) => Some(Action::ZoomChanged {
                zoom: state.config.clamp_zoom(zoom),
            }),
            Self::Weight { slider, percent } => Some(Action::SetWeight {
                slider,
                percent,
                now,
            }),
            Self::Specialty { name, selected } => Some(Action::ToggleSpecialty { name, selected }),
            Self::Close => Some(Action::ClosePanel),
            Self::Back => Some(Action::BackToCounties),
            Self::Status | Self::Logs | Self::Help | Self::Quit => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/command.rs"]
mod tests;
