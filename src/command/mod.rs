//! Console command protocol
//!
//! One command per line. The first character selects the command and must
//! be an uppercase letter; each command parses its own remainder with fixed
//! field widths. Parsing is purely syntactic: range checks that depend on
//! the live configuration happen in the [`Dispatcher`].

mod dispatch;
mod line;

use core::fmt;

pub use dispatch::{CommandEffects, CommandStats, Dispatcher, Retime, SystemRequest};
pub(crate) use dispatch::warn_corrections;
pub use line::{BACKSPACE, BELL, CTRL_C, DELETE, ESCAPE, LineBuffer, LineEvent};

use crate::config::{ConfigError, ConfigUpdate};
use crate::pattern::PatternId;

/// Widest decimal group id
const GROUP_DIGITS: usize = 3;
/// Widest decimal percentage
const PERCENT_DIGITS: usize = 3;
/// Widest decimal configuration value
const VALUE_DIGITS: usize = 5;
/// Widest decimal pattern id
const PATTERN_DIGITS: usize = 2;
/// Widest decimal pin number
const PIN_DIGITS: usize = 2;
/// Color field width, `RRGGBB`
const COLOR_DIGITS: usize = 6;

/// A parsed console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `T<id>:<s>` and `P<id>:<s>:<pct>`
    SetGroup { group: u32, state: u8, percent: u32 },
    /// `A:<s>`
    SetAll(u8),
    /// `M:<digits>`
    SetMany(&'a str),
    /// `X`
    AllOff,
    /// `Q`
    Summary,
    /// `G`
    Listing,
    /// `C<item>:<value>`
    Configure(ConfigUpdate<'a>),
    /// `Cd`
    Defaults,
    /// `V`
    Version,
    /// `H` or `?`
    Help,
    /// `D`
    Dump,
    /// `I`
    Info,
    /// `S`
    Save,
    /// `Se`
    Export,
    /// `L`
    Load,
    /// `Li:CONFIG:<hex>`, carrying the tagged text
    Import(&'a str),
    /// `R`
    Reboot,
}

/// Reasons a command line is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The line does not start with an uppercase letter
    Syntax(char),
    /// Uppercase letter that names no command
    Unknown(char),
    /// Fields missing, extra or of the wrong width
    Usage {
        command: &'static str,
        usage: &'static str,
    },
    /// A field parsed but lies outside its range
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    Config(ConfigError),
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(found) => {
                write!(f, "syntax: expected command letter A-Z, got {found:?}")
            }
            Self::Unknown(letter) => write!(f, "unknown command '{letter}', H for help"),
            Self::Usage { command, usage } => write!(f, "{command}: usage {usage}"),
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} {value} out of range {min}..{max}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl<'a> Command<'a> {
    /// Parse one trimmed, non-empty line
    pub fn parse(line: &'a str) -> Result<Self, CommandError> {
        let mut chars = line.chars();
        let letter = chars.next().ok_or(CommandError::Syntax(' '))?;
        let rest = chars.as_str();
        if letter == '?' {
            return bare(rest, Self::Help, "H", "H or ?");
        }
        if !letter.is_ascii_uppercase() {
            return Err(CommandError::Syntax(letter));
        }

        match letter {
            'T' => parse_set_group(rest, false),
            'P' => parse_set_group(rest, true),
            'A' => {
                let err = usage("A", "A:<state>");
                let state = single_digit(strip_colon(rest)).ok_or(err)?;
                Ok(Self::SetAll(state))
            }
            'M' => {
                let digits = strip_colon(rest);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(usage("M", "M:<state digits>"));
                }
                Ok(Self::SetMany(digits))
            }
            'X' => bare(rest, Self::AllOff, "X", "X"),
            'Q' => bare(rest, Self::Summary, "Q", "Q"),
            'G' => bare(rest, Self::Listing, "G", "G"),
            'C' => parse_configure(rest),
            'V' => bare(rest, Self::Version, "V", "V"),
            'H' => bare(rest, Self::Help, "H", "H or ?"),
            'D' => bare(rest, Self::Dump, "D", "D"),
            'I' => bare(rest, Self::Info, "I", "I"),
            'S' => match rest {
                "" => Ok(Self::Save),
                "e" => Ok(Self::Export),
                _ => Err(usage("S", "S or Se")),
            },
            'L' => match rest {
                "" => Ok(Self::Load),
                _ => rest
                    .strip_prefix("i:")
                    .map(Self::Import)
                    .ok_or(usage("L", "L or Li:CONFIG:<hex>")),
            },
            'R' => bare(rest, Self::Reboot, "R", "R"),
            other => Err(CommandError::Unknown(other)),
        }
    }
}

const fn usage(command: &'static str, usage: &'static str) -> CommandError {
    CommandError::Usage { command, usage }
}

fn bare<'a>(
    rest: &str,
    command: Command<'a>,
    name: &'static str,
    form: &'static str,
) -> Result<Command<'a>, CommandError> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(usage(name, form))
    }
}

/// Drop the optional `:` between the command letter and its first field
fn strip_colon(rest: &str) -> &str {
    rest.strip_prefix(':').unwrap_or(rest)
}

/// Decimal field of 1 to `width` digits
fn number(field: &str, width: usize) -> Option<u32> {
    if field.is_empty() || field.len() > width || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn single_digit(field: &str) -> Option<u8> {
    match field.as_bytes() {
        [digit @ b'0'..=b'9'] => Some(digit - b'0'),
        _ => None,
    }
}

fn hex_color(field: &str) -> Option<u32> {
    if field.len() != COLOR_DIGITS || !field.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(field, 16).ok()
}

/// Pattern id as digits, or a pattern name
fn pattern_field(field: &str) -> Option<u32> {
    number(field, PATTERN_DIGITS).or_else(|| {
        PatternId::parse_from_str(field).map(|pattern| u32::from(pattern.as_u8()))
    })
}

fn parse_set_group(rest: &str, with_percent: bool) -> Result<Command<'_>, CommandError> {
    let err = if with_percent {
        usage("P", "P<id>:<state>:<percent>")
    } else {
        usage("T", "T<id>:<state>")
    };
    let mut fields = strip_colon(rest).split(':');
    let group = fields.next().and_then(|f| number(f, GROUP_DIGITS)).ok_or(err)?;
    let state = fields.next().and_then(single_digit).ok_or(err)?;
    let percent = if with_percent {
        fields
            .next()
            .and_then(|f| number(f, PERCENT_DIGITS))
            .ok_or(err)?
    } else {
        100
    };
    if fields.next().is_some() {
        return Err(err);
    }
    Ok(Command::SetGroup {
        group,
        state,
        percent,
    })
}

fn parse_configure(rest: &str) -> Result<Command<'_>, CommandError> {
    let mut chars = rest.chars();
    let Some(item) = chars.next() else {
        return Err(usage("C", "C<item>:<value>, H for items"));
    };
    let tail = chars.as_str();
    if item == 'd' {
        return bare(tail, Command::Defaults, "Cd", "Cd");
    }
    let value = tail
        .strip_prefix(':')
        .ok_or(usage("C", "C<item>:<value>, H for items"))?;

    let numeric = |code: &'static str, form: &'static str| {
        number(value, VALUE_DIGITS).ok_or(usage(code, form))
    };
    let flag = |code: &'static str, form: &'static str| {
        single_digit(value).map(u32::from).ok_or(usage(code, form))
    };

    let update = match item {
        'i' => ConfigUpdate::Identity(value),
        'l' => ConfigUpdate::PixelsPerChannel(numeric("Cl", "Cl:<pixels>")?),
        'c' => ConfigUpdate::Channels(numeric("Cc", "Cc:<channels>")?),
        'g' => ConfigUpdate::GroupsPerChannel(numeric("Cg", "Cg:<groups>")?),
        'w' => ConfigUpdate::Spacer(numeric("Cw", "Cw:<pixels>")?),
        'o' => ConfigUpdate::StartOffset(numeric("Co", "Co:<pixels>")?),
        'u' => ConfigUpdate::UpdateInterval(numeric("Cu", "Cu:<ms>")?),
        'b' => ConfigUpdate::BlinkInterval(numeric("Cb", "Cb:<ms>")?),
        'a' => ConfigUpdate::AnimateInterval(numeric("Ca", "Ca:<ms>")?),
        'r' => ConfigUpdate::Brightness(numeric("Cr", "Cr:<0-255>")?),
        'f' => ConfigUpdate::AnimationFade(numeric("Cf", "Cf:<0-255>")?),
        'k' => ConfigUpdate::BlinkFade(numeric("Ck", "Ck:<0-255>")?),
        's' => parse_state_entry(value)?,
        'm' => ConfigUpdate::ChannelOrder(value),
        'p' => {
            let err = usage("Cp", "Cp:<channel>:<pin>");
            let (channel, pin) = value.split_once(':').ok_or(err)?;
            ConfigUpdate::Pin {
                channel: single_digit(channel).map(u32::from).ok_or(err)?,
                pin: number(pin, PIN_DIGITS).ok_or(err)?,
            }
        }
        't' => ConfigUpdate::StartupAnimation(flag("Ct", "Ct:<0|1>")?),
        'e' => ConfigUpdate::Echo(flag("Ce", "Ce:<0|1>")?),
        'x' => ConfigUpdate::PixelFormat(flag("Cx", "Cx:<0|1>")?),
        _ => return Err(usage("C", "C<item>:<value>, H for items")),
    };
    Ok(Command::Configure(update))
}

fn parse_state_entry(value: &str) -> Result<ConfigUpdate<'_>, CommandError> {
    let err = usage("Cs", "Cs:<state>:<RRGGBB>:<pattern>");
    let mut fields = value.split(':');
    let state = fields.next().and_then(single_digit).ok_or(err)?;
    let color = fields.next().and_then(hex_color).ok_or(err)?;
    let pattern = fields.next().and_then(pattern_field).ok_or(err)?;
    if fields.next().is_some() {
        return Err(err);
    }
    Ok(ConfigUpdate::State {
        state: u32::from(state),
        color,
        pattern,
    })
}
