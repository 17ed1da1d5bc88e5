use std::time::Duration;

use anyhow::anyhow;
use nom::character::complete::char;
use nom::combinator::{map_res, opt};
use nom::multi::separated_list1;
use nom::sequence::{pair, terminated};

use crate::common::parser::{NomResult, consume_all, p_u32};

/// Time limit accepted by `sbatch --time`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlurmDuration {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl SlurmDuration {
    fn from_fields(days: Option<u32>, fields: &[u32]) -> anyhow::Result<Self> {
        let duration = match (days, fields) {
            (None, &[minutes]) => Self {
                minutes,
                ..Default::default()
            },
            (None, &[minutes, seconds]) => Self {
                minutes,
                seconds,
                ..Default::default()
            },
            (_, &[hours, minutes, seconds]) => Self {
                days: days.unwrap_or(0),
                hours,
                minutes,
                seconds,
            },
            (Some(days), &[hours]) => Self {
                days,
                hours,
                ..Default::default()
            },
            (Some(days), &[hours, minutes]) => Self {
                days,
                hours,
                minutes,
                ..Default::default()
            },
            _ => {
                return Err(anyhow!(
                    "expected MM, MM:SS, HH:MM:SS, D-HH, D-HH:MM or D-HH:MM:SS"
                ));
            }
        };
        Ok(duration)
    }

    pub fn as_secs(&self) -> u64 {
        u64::from(self.days) * 86400
            + u64::from(self.hours) * 3600
            + u64::from(self.minutes) * 60
            + u64::from(self.seconds)
    }

    pub fn is_zero(&self) -> bool {
        self.as_secs() == 0
    }
}

fn p_slurm_duration(input: &str) -> NomResult<'_, SlurmDuration> {
    map_res(
        pair(
            opt(terminated(p_u32, char('-'))),
            separated_list1(char(':'), p_u32),
        ),
        |(days, fields)| SlurmDuration::from_fields(days, &fields),
    )(input)
}

/// Parses the time formats understood by Slurm: `MM`, `MM:SS`, `HH:MM:SS`,
/// `D-HH`, `D-HH:MM` and `D-HH:MM:SS`.
pub fn parse_slurm_duration(input: &str) -> anyhow::Result<SlurmDuration> {
    consume_all(p_slurm_duration, input)
}

// Slurm time strings are passed through unchanged, humantime (2h 30m) is converted
crate::arg_wrapper!(TimeLimitArg, String, parse_time_limit);

fn parse_time_limit(text: &str) -> anyhow::Result<String> {
    match parse_slurm_duration(text) {
        Ok(_) => Ok(text.to_string()),
        Err(slurm_error) => humantime::parse_duration(text)
            .map(|duration| format_slurm_duration(&duration))
            .map_err(|_| {
                anyhow!(
                    "Could not parse time limit: {slurm_error}. Use Slurm format (D-HH:MM:SS) or humantime format (2h 30m)"
                )
            }),
    }
}

/// Format a duration as a Slurm time string, e.g. 01:05:02 or 2-01:05:02
pub fn format_slurm_duration(duration: &Duration) -> String {
    let mut seconds = duration.as_secs();
    let days = seconds / 86400;
    seconds %= 86400;
    let hours = seconds / 3600;
    seconds %= 3600;
    let minutes = seconds / 60;
    seconds %= 60;
    if days > 0 {
        format!("{days}-{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Builds a `DD-HH:MM:SS` walltime from its individual components.
pub fn compose_slurm_walltime(days: u32, hours: u32, minutes: u32, seconds: u32) -> String {
    format!("{days:02}-{hours:02}:{minutes:02}:{seconds:02}")
}
