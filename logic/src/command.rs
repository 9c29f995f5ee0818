//! Line based command language of the acceptance rig console.
//!
//! A line holds commands separated by `/`, for example `r/4/X/8/X/-4`. Each command is one
//! letter, optionally followed by `:` and an argument. A bare (optionally negative) number
//! makes that many Gray-code transitions, with contact bounce when suffixed with `b`.
use crate::{ConfigWord, Direction};
use core::{fmt, str::FromStr};

/// Predefined command lines, selected with `s:<n>`.
const SCRIPTS: [(&str, &str); 2] = [("1", "r/4/X/8/X/-4"), ("2", "r/M:59/g:True/G:72")];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    UnknownCommand,
    MissingArgument,
    InvalidBool,
    InvalidInteger,
    OutOfRange,
    FieldCount,
    UnknownLine,
    UnknownScript,
}

#[mutants::skip]
impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            CommandError::UnknownCommand => "unknown command",
            CommandError::MissingArgument => "missing argument",
            CommandError::InvalidBool => "invalid bool",
            CommandError::InvalidInteger => "invalid integer",
            CommandError::OutOfRange => "value out of range",
            CommandError::FieldCount => "invalid number of parameters",
            CommandError::UnknownLine => "unknown line",
            CommandError::UnknownScript => "unknown script",
        };
        f.write_str(kind)
    }
}

impl core::error::Error for CommandError {}

/// A single field of the configuration word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Param {
    Gearbox(bool),
    Wrap(bool),
    ForceX2(bool),
    Debounce(bool),
    GearboxTimerCycles(u8),
    InitValue(u8),
    MaxValue(u8),
}

impl Param {
    pub fn apply(self, word: &mut ConfigWord) {
        match self {
            Param::Gearbox(v) => word.gearbox = v,
            Param::Wrap(v) => word.wrap = v,
            Param::ForceX2(v) => word.force_x2 = v,
            Param::Debounce(v) => word.debounce = v,
            Param::GearboxTimerCycles(v) => word.gearbox_timer_cycles = v,
            Param::InitValue(v) => word.init_value = v,
            Param::MaxValue(v) => word.max_value = v,
        }
    }
}

/// Serial configuration port line.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    Cs,
    Sck,
    Sdi,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Bring the rig outputs to a known state. Everything else is refused before this.
    Enable,
    Reset,
    /// Latch a new slow clock divider into the chip.
    ClockDivider(u8),
    ToggleForceX2,
    ToggleLine(Line),
    /// One full `sck` pulse.
    TickSck,
    Turn {
        transitions: u32,
        direction: Direction,
        bounce: bool,
    },
    /// Change one field of the current configuration and send it.
    Set(Param),
    /// Restore and send the default configuration.
    SendDefault,
    /// Replace and send the whole configuration.
    SendConfig(ConfigWord),
    /// Send a raw word, leaving the current configuration as it was.
    SendRaw(u32),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        match text {
            "e" => return Ok(Command::Enable),
            "r" => return Ok(Command::Reset),
            "X" => return Ok(Command::ToggleForceX2),
            "d" => return Ok(Command::SendDefault),
            _ => {}
        }
        let Some(letter) = text.chars().next() else {
            return Err(CommandError::UnknownCommand);
        };
        if letter == '-' || letter.is_ascii_digit() {
            return parse_turn(text);
        }
        let argument = || {
            text[letter.len_utf8()..]
                .strip_prefix(':')
                .ok_or(CommandError::MissingArgument)
        };
        let command = match letter {
            'k' => Command::ClockDivider(parse_u8(argument()?)?),
            'f' => match argument()? {
                "c" => Command::ToggleLine(Line::Cs),
                "s" => Command::ToggleLine(Line::Sck),
                "d" => Command::ToggleLine(Line::Sdi),
                "t" => Command::TickSck,
                _ => return Err(CommandError::UnknownLine),
            },
            'g' => Command::Set(Param::Gearbox(parse_bool(argument()?)?)),
            'w' => Command::Set(Param::Wrap(parse_bool(argument()?)?)),
            'x' => Command::Set(Param::ForceX2(parse_bool(argument()?)?)),
            'b' => Command::Set(Param::Debounce(parse_bool(argument()?)?)),
            'G' => Command::Set(Param::GearboxTimerCycles(parse_u8(argument()?)?)),
            'i' => Command::Set(Param::InitValue(parse_u8(argument()?)?)),
            'M' => Command::Set(Param::MaxValue(parse_u8(argument()?)?)),
            'c' => Command::SendConfig(parse_fields(argument()?)?),
            'C' => Command::SendRaw(parse_int(argument()?)?),
            _ => return Err(CommandError::UnknownCommand),
        };
        Ok(command)
    }
}

/// `[-]<n>[b]`
fn parse_turn(text: &str) -> Result<Command, CommandError> {
    let (count, bounce) = match text.strip_suffix('b') {
        Some(count) => (count, true),
        None => (text, false),
    };
    let count: i32 = count.parse().map_err(|_| CommandError::InvalidInteger)?;
    Ok(Command::Turn {
        transitions: count.unsigned_abs(),
        direction: Direction::from_bit(count >= 0),
        bounce,
    })
}

/// `init,max,debounce,wrap,x1,x2,gearbox,timer`
fn parse_fields(text: &str) -> Result<ConfigWord, CommandError> {
    let mut fields = text.split(',').map(str::trim);
    let mut next = || fields.next().ok_or(CommandError::FieldCount);
    let init_value = parse_u8(next()?)?;
    let max_value = parse_u8(next()?)?;
    let debounce = parse_bool(next()?)?;
    let wrap = parse_bool(next()?)?;
    let x1_value = parse_u8(next()?)?;
    let force_x2 = parse_bool(next()?)?;
    let gearbox = parse_bool(next()?)?;
    let gearbox_timer_cycles = parse_u8(next()?)?;
    if next().is_ok() {
        return Err(CommandError::FieldCount);
    }
    if x1_value > 0b11 {
        return Err(CommandError::OutOfRange);
    }
    Ok(ConfigWord {
        gearbox,
        wrap,
        debounce,
        x1_value,
        force_x2,
        gearbox_timer_cycles,
        init_value,
        max_value,
    })
}

pub fn parse_bool(text: &str) -> Result<bool, CommandError> {
    match text {
        "True" | "true" | "1" => Ok(true),
        "False" | "false" | "0" => Ok(false),
        _ => Err(CommandError::InvalidBool),
    }
}

/// Unsigned integer in decimal, or with a `0x`, `0b` or `0o` prefix.
pub fn parse_int(text: &str) -> Result<u32, CommandError> {
    let (digits, radix) = [("0x", "0X", 16), ("0b", "0B", 2), ("0o", "0O", 8)]
        .into_iter()
        .find_map(|(lower, upper, radix)| {
            text.strip_prefix(lower)
                .or_else(|| text.strip_prefix(upper))
                .map(|digits| (digits, radix))
        })
        .unwrap_or((text, 10));
    u32::from_str_radix(digits, radix).map_err(|_| CommandError::InvalidInteger)
}

fn parse_u8(text: &str) -> Result<u8, CommandError> {
    u8::try_from(parse_int(text)?).map_err(|_| CommandError::OutOfRange)
}

/// Replace a `s:<n>` line with the script it names.
///
/// ```rust
/// use encoder_chip_logic::command::expand_script;
/// assert_eq!(expand_script("s:1"), Ok("r/4/X/8/X/-4"));
/// assert_eq!(expand_script("r/4"), Ok("r/4"));
/// ```
pub fn expand_script(line: &str) -> Result<&str, CommandError> {
    let line = line.trim();
    let Some(name) = line.strip_prefix("s:") else {
        return Ok(line);
    };
    SCRIPTS
        .iter()
        .find(|(script, _)| *script == name)
        .map(|(_, commands)| *commands)
        .ok_or(CommandError::UnknownScript)
}

/// Every command of a line along with its text, empty entries skipped.
pub fn parse_line(line: &str) -> impl Iterator<Item = (&str, Result<Command, CommandError>)> {
    line.split('/')
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| (text, text.parse()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Command, CommandError> {
        text.parse()
    }

    #[test]
    fn single_letters() {
        assert_eq!(parse("e"), Ok(Command::Enable));
        assert_eq!(parse("r"), Ok(Command::Reset));
        assert_eq!(parse(" X "), Ok(Command::ToggleForceX2));
        assert_eq!(parse("d"), Ok(Command::SendDefault));
        assert_eq!(parse("q"), Err(CommandError::UnknownCommand));
        assert_eq!(parse("k"), Err(CommandError::MissingArgument));
    }

    #[test]
    fn turns() {
        assert_eq!(
            parse("8"),
            Ok(Command::Turn {
                transitions: 8,
                direction: Direction::Clockwise,
                bounce: false
            })
        );
        assert_eq!(
            parse("-4b"),
            Ok(Command::Turn {
                transitions: 4,
                direction: Direction::CounterClockwise,
                bounce: true
            })
        );
        assert_eq!(parse("4x"), Err(CommandError::InvalidInteger));
        assert_eq!(parse("-"), Err(CommandError::InvalidInteger));
    }

    #[test]
    fn setters() {
        assert_eq!(parse("g:True"), Ok(Command::Set(Param::Gearbox(true))));
        assert_eq!(parse("w:0"), Ok(Command::Set(Param::Wrap(false))));
        assert_eq!(parse("x:true"), Ok(Command::Set(Param::ForceX2(true))));
        assert_eq!(parse("b:False"), Ok(Command::Set(Param::Debounce(false))));
        assert_eq!(parse("G:72"), Ok(Command::Set(Param::GearboxTimerCycles(72))));
        assert_eq!(parse("i:0x11"), Ok(Command::Set(Param::InitValue(17))));
        assert_eq!(parse("M:59"), Ok(Command::Set(Param::MaxValue(59))));
        assert_eq!(parse("M:256"), Err(CommandError::OutOfRange));
        assert_eq!(parse("g:yes"), Err(CommandError::InvalidBool));
        assert_eq!(parse("g"), Err(CommandError::MissingArgument));
    }

    #[test]
    fn lines_and_clock() {
        assert_eq!(parse("f:c"), Ok(Command::ToggleLine(Line::Cs)));
        assert_eq!(parse("f:s"), Ok(Command::ToggleLine(Line::Sck)));
        assert_eq!(parse("f:d"), Ok(Command::ToggleLine(Line::Sdi)));
        assert_eq!(parse("f:t"), Ok(Command::TickSck));
        assert_eq!(parse("f:z"), Err(CommandError::UnknownLine));
        assert_eq!(parse("k:3"), Ok(Command::ClockDivider(3)));
    }

    #[test]
    fn whole_config() {
        let expected = ConfigWord {
            gearbox: true,
            wrap: false,
            debounce: true,
            x1_value: 2,
            force_x2: false,
            gearbox_timer_cycles: 137,
            init_value: 17,
            max_value: 110,
        };
        assert_eq!(
            parse("c:17,110,True,False,2,False,True,137"),
            Ok(Command::SendConfig(expected))
        );
        // The listing printed by the rig parses back.
        assert_eq!(
            parse(&format!("c:{expected}")),
            Ok(Command::SendConfig(expected))
        );
        assert_eq!(
            parse("c:17,110,True,False,2,False,True"),
            Err(CommandError::FieldCount)
        );
        assert_eq!(
            parse("c:17,110,True,False,2,False,True,137,1"),
            Err(CommandError::FieldCount)
        );
        assert_eq!(
            parse("c:17,110,True,False,4,False,True,137"),
            Err(CommandError::OutOfRange)
        );
    }

    #[test]
    fn raw_word() {
        assert_eq!(parse("C:0x6E118905"), Ok(Command::SendRaw(0x6E11_8905)));
        assert_eq!(parse("C:0b101"), Ok(Command::SendRaw(5)));
        assert_eq!(parse("C:0o17"), Ok(Command::SendRaw(15)));
        assert_eq!(parse("C:42"), Ok(Command::SendRaw(42)));
        assert_eq!(parse("C:0x1_0000_0000"), Err(CommandError::InvalidInteger));
    }

    #[test]
    fn params_update_word() {
        let mut word = ConfigWord::default();
        Param::MaxValue(59).apply(&mut word);
        Param::Gearbox(true).apply(&mut word);
        Param::GearboxTimerCycles(72).apply(&mut word);
        assert_eq!(word.max_value, 59);
        assert!(word.gearbox);
        assert_eq!(word.gearbox_timer_cycles, 72);
        assert_eq!(word.init_value, ConfigWord::default().init_value);
    }

    #[test]
    fn scripts() {
        assert_eq!(expand_script("s:2"), Ok("r/M:59/g:True/G:72"));
        assert_eq!(expand_script("s:9"), Err(CommandError::UnknownScript));

        let commands: Vec<_> = parse_line(expand_script("s:2").unwrap()).collect();
        assert_eq!(
            commands,
            [
                ("r", Ok(Command::Reset)),
                ("M:59", Ok(Command::Set(Param::MaxValue(59)))),
                ("g:True", Ok(Command::Set(Param::Gearbox(true)))),
                ("G:72", Ok(Command::Set(Param::GearboxTimerCycles(72)))),
            ]
        );
    }

    #[test]
    fn empty_entries_are_skipped() {
        let commands: Vec<_> = parse_line("e//r/ /q").collect();
        assert_eq!(
            commands,
            [
                ("e", Ok(Command::Enable)),
                ("r", Ok(Command::Reset)),
                ("q", Err(CommandError::UnknownCommand)),
            ]
        );
    }
}
