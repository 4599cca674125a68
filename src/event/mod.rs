//! Definition of [`Event`], the record every producer hands to the scheduler.

mod payload;
mod value;


pub use payload::{
    Deferred, HttpResponse, Materialize, ModemPayload, UrlCheck, WifiNetwork, WifiScan,
    WifiSecurity,
};
pub use value::Value;

/// Side reported for disk insert and eject events.
pub const DISK_SIDE: &str = "right";

/// Side reported for speaker events.
pub const SPEAKER_SIDE: &str = "left";

/// Side reported for modem events.
pub const MODEM_SIDE: &str = "back";

/// Tag of an [`Event`], with the kind-name the guest filters on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    #[allow(missing_docs)]
    None,
    #[allow(missing_docs)]
    Key,
    #[allow(missing_docs)]
    KeyUp,
    #[allow(missing_docs)]
    Char,
    #[allow(missing_docs)]
    Timer,
    #[allow(missing_docs)]
    Alarm,
    #[allow(missing_docs)]
    Disk,
    #[allow(missing_docs)]
    DiskEject,
    #[allow(missing_docs)]
    HttpCheck,
    #[allow(missing_docs)]
    HttpSuccess,
    #[allow(missing_docs)]
    HttpFailure,
    #[allow(missing_docs)]
    ModemMessage,
    #[allow(missing_docs)]
    Paste,
    #[allow(missing_docs)]
    Redstone,
    #[allow(missing_docs)]
    SpeakerAudioEmpty,
    #[allow(missing_docs)]
    Terminate,
    #[allow(missing_docs)]
    WebsocketClosed,
    #[allow(missing_docs)]
    WebsocketFailure,
    #[allow(missing_docs)]
    WebsocketMessage,
    #[allow(missing_docs)]
    WebsocketSuccess,
    #[allow(missing_docs)]
    WifiConnected,
    #[allow(missing_docs)]
    WifiDisconnected,
    #[allow(missing_docs)]
    WifiScan,
    /// Event queued by the guest itself; its name is chosen by the guest.
    Custom,
}

impl EventKind {
    /// All kinds with a fixed name.
    pub const BUILTIN: [EventKind; 23] = [
        EventKind::None,
        EventKind::Key,
        EventKind::KeyUp,
        EventKind::Char,
        EventKind::Timer,
        EventKind::Alarm,
        EventKind::Disk,
        EventKind::DiskEject,
        EventKind::HttpCheck,
        EventKind::HttpSuccess,
        EventKind::HttpFailure,
        EventKind::ModemMessage,
        EventKind::Paste,
        EventKind::Redstone,
        EventKind::SpeakerAudioEmpty,
        EventKind::Terminate,
        EventKind::WebsocketClosed,
        EventKind::WebsocketFailure,
        EventKind::WebsocketMessage,
        EventKind::WebsocketSuccess,
        EventKind::WifiConnected,
        EventKind::WifiDisconnected,
        EventKind::WifiScan,
    ];

    /// Name delivered as the first resume argument and matched against filters.
    /// Custom events carry their own name, see [`Event::name`].
    pub fn name(self) -> &'static str {
        match self {
            EventKind::None => "",
            EventKind::Key => "key",
            EventKind::KeyUp => "key_up",
            EventKind::Char => "char",
            EventKind::Timer => "timer",
            EventKind::Alarm => "alarm",
            EventKind::Disk => "disk",
            EventKind::DiskEject => "disk_eject",
            EventKind::HttpCheck => "http_check",
            EventKind::HttpSuccess => "http_success",
            EventKind::HttpFailure => "http_failure",
            EventKind::ModemMessage => "modem_message",
            EventKind::Paste => "paste",
            EventKind::Redstone => "redstone",
            EventKind::SpeakerAudioEmpty => "speaker_audio_empty",
            EventKind::Terminate => "terminate",
            EventKind::WebsocketClosed => "websocket_closed",
            EventKind::WebsocketFailure => "websocket_failure",
            EventKind::WebsocketMessage => "websocket_message",
            EventKind::WebsocketSuccess => "websocket_success",
            EventKind::WifiConnected => "wifi_connected",
            EventKind::WifiDisconnected => "wifi_disconnected",
            EventKind::WifiScan => "wifi_scan",
            EventKind::Custom => "",
        }
    }

    /// Looks up a built-in kind by name. Case-sensitive.
    pub fn from_name(name: &str) -> Option<EventKind> {
        Self::BUILTIN.into_iter().find(|kind| kind.name() == name)
    }
}

/// Outcome of an HTTP operation, shared by the three HTTP event kinds.
#[derive(Debug)]
pub struct HttpResult {
    /// Requested URL.
    pub url: String,
    /// Error description, for failures.
    pub error: Option<String>,
    /// Response handle or check result, materialized on delivery.
    pub payload: Option<Deferred>,
}

/// Specifies events delivered to the guest.
///
/// Scalar kinds carry their fields inline. Kinds with variable-size data hold it
/// out of line in a [`Deferred`], so every record has the same size in the queue.
#[derive(Debug)]
pub enum Event {
    /// Empty event.
    None,
    /// Key pressed, or auto-repeated while held.
    Key {
        /// Key code.
        code: u8,
        /// Whether this is a repeat of a held key.
        repeat: bool,
    },
    /// Key released.
    KeyUp {
        /// Key code.
        code: u8,
    },
    /// Character typed.
    Char(char),
    /// Timer started with `start_timer` fired.
    Timer {
        /// Timer id.
        id: u32,
    },
    /// Alarm set with `set_alarm` fired.
    Alarm {
        /// Alarm id.
        id: u32,
    },
    /// Disk mounted.
    Disk,
    /// Disk removed.
    DiskEject,
    /// URL check finished.
    HttpCheck(HttpResult),
    /// HTTP request finished.
    HttpSuccess(HttpResult),
    /// HTTP request failed.
    HttpFailure(HttpResult),
    /// Modem received a message on an open channel.
    ModemMessage {
        /// Channel the message was sent on.
        channel: u16,
        /// Channel the sender listens for replies on.
        reply_channel: u16,
        /// Estimated distance to the sender.
        distance: f64,
        /// Message contents.
        payload: Deferred,
    },
    /// Text pasted from the clipboard.
    Paste(String),
    /// Redstone input changed.
    Redstone,
    /// Speaker buffer drained.
    SpeakerAudioEmpty,
    /// Termination requested. Satisfies every filter.
    Terminate,
    /// Websocket closed.
    WebsocketClosed {
        /// Websocket URL.
        url: String,
    },
    /// Websocket could not be opened.
    WebsocketFailure {
        /// Websocket URL.
        url: String,
        /// Error description.
        error: String,
    },
    /// Websocket message received.
    WebsocketMessage {
        /// Websocket URL.
        url: String,
        /// Message contents.
        payload: Deferred,
    },
    /// Websocket opened.
    WebsocketSuccess {
        /// Websocket URL.
        url: String,
        /// Websocket handle.
        payload: Option<Deferred>,
    },
    /// Wireless network connected.
    WifiConnected,
    /// Wireless network disconnected.
    WifiDisconnected,
    /// Wireless scan finished. No payload means the scan failed.
    WifiScan {
        /// Scan result.
        payload: Option<Deferred>,
    },
    /// Event queued by the guest.
    Custom {
        /// Event name.
        name: String,
        /// Event arguments.
        args: Vec<Value>,
    },
}

impl Event {
    /// Returns the tag of the event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::None => EventKind::None,
            Event::Key { .. } => EventKind::Key,
            Event::KeyUp { .. } => EventKind::KeyUp,
            Event::Char(_) => EventKind::Char,
            Event::Timer { .. } => EventKind::Timer,
            Event::Alarm { .. } => EventKind::Alarm,
            Event::Disk => EventKind::Disk,
            Event::DiskEject => EventKind::DiskEject,
            Event::HttpCheck(_) => EventKind::HttpCheck,
            Event::HttpSuccess(_) => EventKind::HttpSuccess,
            Event::HttpFailure(_) => EventKind::HttpFailure,
            Event::ModemMessage { .. } => EventKind::ModemMessage,
            Event::Paste(_) => EventKind::Paste,
            Event::Redstone => EventKind::Redstone,
            Event::SpeakerAudioEmpty => EventKind::SpeakerAudioEmpty,
            Event::Terminate => EventKind::Terminate,
            Event::WebsocketClosed { .. } => EventKind::WebsocketClosed,
            Event::WebsocketFailure { .. } => EventKind::WebsocketFailure,
            Event::WebsocketMessage { .. } => EventKind::WebsocketMessage,
            Event::WebsocketSuccess { .. } => EventKind::WebsocketSuccess,
            Event::WifiConnected => EventKind::WifiConnected,
            Event::WifiDisconnected => EventKind::WifiDisconnected,
            Event::WifiScan { .. } => EventKind::WifiScan,
            Event::Custom { .. } => EventKind::Custom,
        }
    }

    /// Returns the kind-name of the event.
    pub fn name(&self) -> &str {
        match self {
            Event::Custom { name, .. } => name,
            other => other.kind().name(),
        }
    }

    /// Checks if the event satisfies `filter`.
    ///
    /// No filter, or an empty one, accepts everything. Terminate is accepted by every filter.
    pub fn matches(&self, filter: Option<&str>) -> bool {
        match filter {
            None | Some("") => true,
            Some(filter) => {
                // By name, so a guest-queued `terminate` interrupts filtered waits too.
                self.name() == EventKind::Terminate.name() || self.name() == filter
            }
        }
    }

    /// Consumes the event, producing the resume arguments: the kind-name followed by
    /// the payload. Deferred payloads are materialized here, and only here.
    pub fn into_args(self) -> Vec<Value> {
        let mut args = vec![Value::from(self.name())];

        match self {
            Event::Key { code, repeat } => {
                args.push(code.into());
                args.push(repeat.into());
            }
            Event::KeyUp { code } => args.push(code.into()),
            Event::Char(c) => args.push(c.into()),
            Event::Timer { id } | Event::Alarm { id } => args.push(id.into()),
            Event::Disk | Event::DiskEject => args.push(DISK_SIDE.into()),
            Event::SpeakerAudioEmpty => args.push(SPEAKER_SIDE.into()),
            Event::HttpCheck(result) | Event::HttpSuccess(result) | Event::HttpFailure(result) => {
                args.push(result.url.into());
                if let Some(error) = result.error {
                    args.push(error.into());
                }
                if let Some(payload) = result.payload {
                    payload.materialize(&mut args);
                }
            }
            Event::ModemMessage {
                channel,
                reply_channel,
                distance,
                payload,
            } => {
                args.push(MODEM_SIDE.into());
                args.push(channel.into());
                args.push(reply_channel.into());
                payload.materialize(&mut args);
                args.push(distance.into());
            }
            Event::Paste(text) => args.push(text.into()),
            Event::WebsocketClosed { url } => args.push(url.into()),
            Event::WebsocketFailure { url, error } => {
                args.push(url.into());
                args.push(error.into());
            }
            Event::WebsocketMessage { url, payload } => {
                args.push(url.into());
                payload.materialize(&mut args);
            }
            Event::WebsocketSuccess { url, payload } => {
                args.push(url.into());
                if let Some(payload) = payload {
                    payload.materialize(&mut args);
                }
            }
            Event::WifiScan { payload } => match payload {
                Some(payload) => payload.materialize(&mut args),
                None => args.push(Value::Nil),
            },
            Event::Custom { args: values, .. } => args.extend(values),
            Event::None
            | Event::Redstone
            | Event::Terminate
            | Event::WifiConnected
            | Event::WifiDisconnected => {}
        }

        args
    }
}
