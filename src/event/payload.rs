//! Out-of-line event payloads which are turned into guest values only when delivered.
//!
//! A producer hands ownership of its buffer to the queue inside a [`Deferred`].
//! The scheduler consumes it exactly once with [`Deferred::materialize`]; dropping it
//! undelivered (queue full, reset, teardown) releases the buffer without materializing.

use std::{collections::BTreeMap, fmt};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::value::Value;

/// Converts a producer-owned payload into guest-visible values.
///
/// Takes `self` boxed and by value, so an implementation can run at most once.
pub trait Materialize: Send + 'static {
    /// Appends the guest values for this payload to `args` and releases the payload.
    fn materialize(self: Box<Self>, args: &mut Vec<Value>);
}

impl<F> Materialize for F
where
    F: FnOnce(&mut Vec<Value>) + Send + 'static,
{
    fn materialize(self: Box<Self>, args: &mut Vec<Value>) {
        (*self)(args)
    }
}

/// Move-only handle to a payload awaiting materialization.
pub struct Deferred {
    inner: Box<dyn Materialize>,
}

impl Deferred {
    /// Wraps a payload. Any `FnOnce(&mut Vec<Value>) + Send` closure is accepted too.
    pub fn new(payload: impl Materialize) -> Self {
        Self {
            inner: Box::new(payload),
        }
    }

    /// Consumes the handle, appending the payload values to `args`.
    pub fn materialize(self, args: &mut Vec<Value>) {
        self.inner.materialize(args)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Response of a finished HTTP request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Bytes,
}

impl Materialize for HttpResponse {
    fn materialize(self: Box<Self>, args: &mut Vec<Value>) {
        let HttpResponse {
            status,
            headers,
            body,
        } = *self;

        let headers = headers
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect::<BTreeMap<_, _>>();

        let mut response = BTreeMap::new();
        response.insert("code".to_owned(), Value::from(status));
        response.insert("headers".to_owned(), Value::Table(headers));
        response.insert("body".to_owned(), Value::Bytes(body));

        args.push(Value::Table(response));
    }
}

/// Result of checking whether a URL may be requested.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UrlCheck {
    /// Whether the URL is allowed.
    pub allowed: bool,
}

impl Materialize for UrlCheck {
    fn materialize(self: Box<Self>, args: &mut Vec<Value>) {
        args.push(Value::Boolean(self.allowed));
    }
}

/// Security mode of a scanned wireless network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WifiSecurity {
    #[allow(missing_docs)]
    Open,
    #[allow(missing_docs)]
    Wep,
    #[allow(missing_docs)]
    WpaPersonal,
    #[allow(missing_docs)]
    Wpa2Personal,
    #[allow(missing_docs)]
    WpaWpa2Personal,
    #[allow(missing_docs)]
    WpaWpa2Enterprise,
    #[allow(missing_docs)]
    Wpa3Personal,
    #[allow(missing_docs)]
    Wpa2Wpa3Personal,
}

impl WifiSecurity {
    /// Human readable name shown to the guest.
    pub fn name(self) -> &'static str {
        match self {
            WifiSecurity::Open => "Open",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::WpaPersonal => "WPA (Personal)",
            WifiSecurity::Wpa2Personal => "WPA2 (Personal)",
            WifiSecurity::WpaWpa2Personal => "WPA/WPA2 (Personal)",
            WifiSecurity::WpaWpa2Enterprise => "WPA/WPA2 (Enterprise)",
            WifiSecurity::Wpa3Personal => "WPA3 (Personal)",
            WifiSecurity::Wpa2Wpa3Personal => "WPA2/WPA3 (Personal)",
        }
    }
}

/// One network found by a scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WifiNetwork {
    /// Network name.
    pub ssid: String,
    /// Signal strength, 0 to 4.
    pub bars: u8,
    /// Security mode.
    pub security: WifiSecurity,
}

/// Networks found by a scan, strongest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WifiScan {
    /// Scanned networks.
    pub networks: Vec<WifiNetwork>,
}

impl Materialize for WifiScan {
    fn materialize(self: Box<Self>, args: &mut Vec<Value>) {
        let mut table = BTreeMap::new();

        // Access points sharing a name are reported once; the list is sorted by strength.
        for network in self.networks {
            table.entry(network.ssid).or_insert_with(|| {
                let mut entry = BTreeMap::new();
                entry.insert(
                    "security".to_owned(),
                    Value::from(network.security.name()),
                );
                entry.insert("bars".to_owned(), Value::from(network.bars));
                Value::Table(entry)
            });
        }

        args.push(Value::Table(table));
    }
}

/// Reassembled wireless modem message.
#[derive(Clone, Debug, PartialEq)]
pub struct ModemPayload {
    /// Message contents.
    pub data: Bytes,
}

impl Materialize for ModemPayload {
    fn materialize(self: Box<Self>, args: &mut Vec<Value>) {
        args.push(Value::Bytes(self.data));
    }
}
