//! The `/move` command handler.
//!
//! Translates one request's `channel` and `target` parameters into at most one
//! servo write and a plain-text reply. This is framework-agnostic: the axum
//! router and the ESP-IDF HTTP server both wrap [`CommandHandler`] with their
//! own request/response types.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::actuator::{ActuatorDriver, DriverError, ServoBank, MAX_POSITION, SERVO_COUNT};
use crate::query::query_param;

/// Content type of every `/move` reply.
pub const CONTENT_TYPE: &str = "text/plain";

/// Body sent when a parameter is absent.
pub const MISSING_PARAMETERS: &str = "Missing parameters";

/// Body sent when a parameter is malformed or out of range.
pub const INVALID_PARAMETERS: &str = "Invalid servo index or position";

/// Body sent when the driver refuses the write.
pub const ACTUATOR_FAILED: &str = "Actuator write failed";

/// Canonical and legacy names of the channel parameter.
const CHANNEL_PARAMS: [&str; 2] = ["channel", "servo"];

/// Canonical and legacy names of the target parameter.
const TARGET_PARAMS: [&str; 2] = ["target", "place"];

/// Reasons a move request is not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A required parameter is absent.
    #[error("missing parameter `{0}`")]
    MissingParameter(&'static str),

    /// A parameter is present but not an integer.
    #[error("parameter `{name}` is not an integer: {value:?}")]
    MalformedInteger { name: &'static str, value: String },

    /// Channel outside the bank or target outside 0..=180.
    #[error("servo {channel} position {target} is out of range")]
    OutOfRange { channel: i64, target: i64 },

    /// The actuator driver refused the write.
    #[error(transparent)]
    Actuator(#[from] DriverError),
}

impl CommandError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> u16 {
        match self {
            CommandError::Actuator(_) => 500,
            _ => 400,
        }
    }

    /// Plain-text body reported to the caller.
    pub fn body(&self) -> &'static str {
        match self {
            CommandError::MissingParameter(_) => MISSING_PARAMETERS,
            CommandError::MalformedInteger { .. } | CommandError::OutOfRange { .. } => {
                INVALID_PARAMETERS
            }
            CommandError::Actuator(_) => ACTUATOR_FAILED,
        }
    }
}

/// A validated move: channel index and target position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCommand {
    pub channel: usize,
    pub target: u8,
}

impl MoveCommand {
    /// Validate raw parameter text against a bank of `channels` servos.
    ///
    /// Checks presence of both parameters first, then integer syntax, then
    /// range.
    pub fn parse(
        channel: Option<&str>,
        target: Option<&str>,
        channels: usize,
    ) -> Result<Self, CommandError> {
        let (channel, target) = match (channel, target) {
            (Some(channel), Some(target)) => (channel, target),
            (None, _) => return Err(CommandError::MissingParameter(CHANNEL_PARAMS[0])),
            (_, None) => return Err(CommandError::MissingParameter(TARGET_PARAMS[0])),
        };

        let channel = parse_int(CHANNEL_PARAMS[0], channel)?;
        let target = parse_int(TARGET_PARAMS[0], target)?;

        let channel_index = usize::try_from(channel).ok().filter(|&c| c < channels);
        let degrees = u8::try_from(target).ok().filter(|&t| t <= MAX_POSITION);

        match (channel_index, degrees) {
            (Some(channel), Some(target)) => Ok(Self { channel, target }),
            _ => Err(CommandError::OutOfRange { channel, target }),
        }
    }
}

/// Parse a decimal integer, rejecting anything `i64` does not accept.
pub fn parse_int(name: &'static str, text: &str) -> Result<i64, CommandError> {
    text.parse().map_err(|_| CommandError::MalformedInteger {
        name,
        value: text.to_string(),
    })
}

/// Status and plain-text body of a `/move` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResponse {
    pub status: u16,
    pub body: String,
}

impl MoveResponse {
    fn moved(command: MoveCommand) -> Self {
        Self {
            status: 200,
            body: format!(
                "Moved servo {} to position {}",
                command.channel, command.target
            ),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

impl From<CommandError> for MoveResponse {
    fn from(err: CommandError) -> Self {
        Self {
            status: err.status(),
            body: err.body().to_string(),
        }
    }
}

/// Validates move requests and applies them to a shared servo bank.
pub struct CommandHandler<D, const N: usize = SERVO_COUNT> {
    bank: Arc<ServoBank<D, N>>,
}

impl<D, const N: usize> Clone for CommandHandler<D, N> {
    fn clone(&self) -> Self {
        Self {
            bank: self.bank.clone(),
        }
    }
}

impl<D: ActuatorDriver, const N: usize> CommandHandler<D, N> {
    pub fn new(bank: Arc<ServoBank<D, N>>) -> Self {
        Self { bank }
    }

    /// The bank this handler writes to.
    pub fn bank(&self) -> &Arc<ServoBank<D, N>> {
        &self.bank
    }

    /// Validate and apply one move, returning the command that was applied.
    pub fn execute(
        &self,
        channel: Option<&str>,
        target: Option<&str>,
    ) -> Result<MoveCommand, CommandError> {
        let command = MoveCommand::parse(channel, target, N)?;
        self.bank.move_to(command.channel, command.target)?;
        Ok(command)
    }

    /// Handle one request given its raw parameter values.
    pub fn handle(&self, channel: Option<&str>, target: Option<&str>) -> MoveResponse {
        match self.execute(channel, target) {
            Ok(command) => {
                info!("Moved servo {} to position {}", command.channel, command.target);
                MoveResponse::moved(command)
            }
            Err(CommandError::Actuator(err)) => {
                error!("Servo write failed: {}", err);
                CommandError::Actuator(err).into()
            }
            Err(err) => {
                debug!("Rejected move request: {}", err);
                err.into()
            }
        }
    }

    /// Handle one request given its query string (or full URI).
    pub fn handle_query(&self, query: &str) -> MoveResponse {
        let channel = lookup(query, &CHANNEL_PARAMS);
        let target = lookup(query, &TARGET_PARAMS);
        self.handle(channel.as_deref(), target.as_deref())
    }
}

/// First parameter found among `names`, in order of preference.
fn lookup(query: &str, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| query_param(query, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::SimulatedServo;
    use pretty_assertions::assert_eq;

    /// Driver that rejects every write.
    struct FaultyServo;

    impl ActuatorDriver for FaultyServo {
        fn write(&mut self, _degrees: u8) -> Result<(), DriverError> {
            Err(DriverError::Rejected("timer not configured".to_string()))
        }
    }

    fn handler() -> CommandHandler<SimulatedServo> {
        let bank = ServoBank::new([
            SimulatedServo::new("servo0"),
            SimulatedServo::new("servo1"),
            SimulatedServo::new("servo2"),
        ]);
        CommandHandler::new(Arc::new(bank))
    }

    fn response(status: u16, body: &str) -> MoveResponse {
        MoveResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_move_channel_zero() {
        let handler = handler();
        let resp = handler.handle_query("channel=0&target=90");

        assert_eq!(resp, response(200, "Moved servo 0 to position 90"));
        assert_eq!(handler.bank().positions(), [Some(90), None, None]);
    }

    #[test]
    fn test_move_channel_two_to_zero() {
        let handler = handler();
        let resp = handler.handle_query("/move?channel=2&target=0");

        assert_eq!(resp, response(200, "Moved servo 2 to position 0"));
        assert_eq!(handler.bank().position(2), Some(0));
    }

    #[test]
    fn test_channel_out_of_range() {
        let handler = handler();
        let resp = handler.handle_query("channel=5&target=90");

        assert_eq!(resp, response(400, INVALID_PARAMETERS));
        assert_eq!(handler.bank().positions(), [None, None, None]);
    }

    #[test]
    fn test_target_out_of_range() {
        let handler = handler();
        let resp = handler.handle_query("channel=1&target=200");

        assert_eq!(resp, response(400, INVALID_PARAMETERS));
        assert_eq!(handler.bank().position(1), None);
    }

    #[test]
    fn test_negative_values_are_out_of_range() {
        let handler = handler();
        assert_eq!(handler.handle_query("channel=-1&target=90").status, 400);
        assert_eq!(handler.handle_query("channel=0&target=-1").status, 400);
        assert_eq!(handler.bank().positions(), [None, None, None]);
    }

    #[test]
    fn test_range_boundaries() {
        let handler = handler();
        assert!(handler.handle_query("channel=0&target=0").is_success());
        assert!(handler.handle_query("channel=2&target=180").is_success());
        assert!(!handler.handle_query("channel=3&target=180").is_success());
        assert!(!handler.handle_query("channel=2&target=181").is_success());
        assert_eq!(handler.bank().positions(), [Some(0), None, Some(180)]);
    }

    #[test]
    fn test_missing_parameters() {
        let handler = handler();
        for query in ["target=90", "channel=1", "", "speed=3"] {
            assert_eq!(handler.handle_query(query), response(400, MISSING_PARAMETERS));
        }
        assert_eq!(handler.bank().positions(), [None, None, None]);
    }

    #[test]
    fn test_missing_takes_precedence_over_malformed() {
        let err = MoveCommand::parse(Some("abc"), None, SERVO_COUNT).unwrap_err();
        assert_eq!(err, CommandError::MissingParameter("target"));
    }

    #[test]
    fn test_malformed_integers_are_rejected() {
        let handler = handler();
        for query in [
            "channel=abc&target=90",
            "channel=1&target=ninety",
            "channel=&target=90",
            "channel=1&target=9.5",
            "channel=1&target=%2090",
            "channel=1&target=99999999999999999999",
        ] {
            assert_eq!(
                handler.handle_query(query),
                response(400, INVALID_PARAMETERS),
                "query: {}",
                query
            );
        }
        assert_eq!(handler.bank().positions(), [None, None, None]);
    }

    #[test]
    fn test_malformed_error_names_parameter() {
        let err = MoveCommand::parse(Some("1"), Some("x"), SERVO_COUNT).unwrap_err();
        assert_eq!(
            err,
            CommandError::MalformedInteger {
                name: "target",
                value: "x".to_string()
            }
        );
    }

    #[test]
    fn test_huge_integer_is_out_of_range() {
        let err = MoveCommand::parse(Some("1"), Some("4294967296"), SERVO_COUNT).unwrap_err();
        assert_eq!(
            err,
            CommandError::OutOfRange {
                channel: 1,
                target: 4_294_967_296
            }
        );
    }

    #[test]
    fn test_legacy_parameter_names() {
        let handler = handler();
        let resp = handler.handle_query("servo=1&place=45");

        assert_eq!(resp, response(200, "Moved servo 1 to position 45"));
        assert_eq!(handler.bank().position(1), Some(45));
    }

    #[test]
    fn test_canonical_name_wins_over_legacy() {
        let handler = handler();
        let resp = handler.handle_query("servo=0&channel=2&target=10");

        assert_eq!(resp, response(200, "Moved servo 2 to position 10"));
        assert_eq!(handler.bank().positions(), [None, None, Some(10)]);
    }

    #[test]
    fn test_repeated_move_is_stable() {
        let handler = handler();
        for _ in 0..2 {
            assert!(handler.handle_query("channel=1&target=120").is_success());
            assert_eq!(handler.bank().position(1), Some(120));
        }
    }

    #[test]
    fn test_channel_isolation() {
        let handler = handler();
        handler.handle_query("channel=0&target=10");
        handler.handle_query("channel=2&target=170");

        for target in [0, 45, 90, 135, 180] {
            handler.handle(Some("1"), Some(&target.to_string()));
            assert_eq!(
                handler.bank().positions(),
                [Some(10), Some(target), Some(170)]
            );
        }
    }

    #[test]
    fn test_driver_failure_is_500() {
        let handler = CommandHandler::new(Arc::new(ServoBank::new([FaultyServo])));
        let resp = handler.handle(Some("0"), Some("90"));

        assert_eq!(resp, response(500, ACTUATOR_FAILED));
        assert_eq!(handler.bank().position(0), None);
    }

    #[test]
    fn test_handler_respects_bank_size() {
        let handler = CommandHandler::new(Arc::new(ServoBank::new([SimulatedServo::new("solo")])));
        assert!(handler.handle(Some("0"), Some("90")).is_success());
        assert_eq!(handler.handle(Some("1"), Some("90")).status, 400);
    }

    #[test]
    fn test_cloned_handlers_share_bank() {
        let first = handler();
        let second = first.clone();

        second.handle(Some("1"), Some("33"));
        assert_eq!(first.bank().position(1), Some(33));
    }
}
