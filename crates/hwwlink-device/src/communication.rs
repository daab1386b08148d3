use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use hwwlink_channel::DeviceChannel;
use hwwlink_envelope::{decrypt_base64, encrypt_base64, Secret};
use hwwlink_frame::{FrameReader, FrameWriter};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::config::CommunicationConfig;
use crate::error::{CommError, FatalError, Result};
use crate::redact::{log_redacted, Direction};
use crate::reply::{check_device_error, Reply};

/// A session with one hardware wallet.
///
/// Owns the device channel behind a lock that is held for a whole
/// request/response round trip. Share it between threads with `Arc`.
pub struct Communication<C> {
    channel: Mutex<Option<C>>,
    config: CommunicationConfig,
}

impl<C: DeviceChannel> Communication<C> {
    /// Start a session with default 64-byte reports.
    pub fn new(channel: C) -> Self {
        Self {
            channel: Mutex::new(Some(channel)),
            config: CommunicationConfig::default(),
        }
    }

    /// Start a session with explicit report sizes and bootloader lengths.
    pub fn with_config(channel: C, config: CommunicationConfig) -> Result<Self> {
        config.reports.validate()?;
        Ok(Self {
            channel: Mutex::new(Some(channel)),
            config,
        })
    }

    /// Session configuration.
    pub fn config(&self) -> &CommunicationConfig {
        &self.config
    }

    /// Whether [`close`](Self::close) has taken the channel.
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// Send an unencrypted JSON command and decode the reply object.
    ///
    /// A reply of the form `{"error": {"code", "message"}}` is returned as
    /// [`CommError::Device`].
    pub fn send_plain(&self, msg: &str) -> Result<Map<String, Value>> {
        log_redacted(Direction::Sending, msg.as_bytes());

        let raw = {
            let mut guard = self.lock();
            let channel = guard.as_mut().ok_or(CommError::ChannelClosed)?;
            self.round_trip(channel, msg.as_bytes())?
        };

        let reply = trim_reply(&raw);
        log_redacted(Direction::Receiving, reply);
        let object: Map<String, Value> = serde_json::from_slice(reply)?;
        check_device_error(&object)?;
        Ok(object)
    }

    /// Send a JSON command sealed under `password` and decode the reply.
    ///
    /// Replies carrying a `ciphertext` field are opened with the same secret;
    /// other replies are used as they are.
    pub fn send_encrypted(&self, msg: &str, password: &str) -> Result<Map<String, Value>> {
        log_redacted(Direction::Sending, msg.as_bytes());

        let secret = Secret::derive(password);
        let sealed = encrypt_base64(msg.as_bytes(), &secret)?;
        let reply = self.send_plain(&sealed)?;

        let plaintext = match Reply::classify(&reply)? {
            Reply::Ciphertext(text) => Some(decrypt_base64(text, &secret)?),
            Reply::Error(err) => return Err(err.into()),
            Reply::Data(_) => None,
        };

        let object = match plaintext {
            Some(plaintext) => {
                log_redacted(Direction::Receiving, &plaintext);
                serde_json::from_slice(&plaintext)?
            }
            None => {
                debug!("reply was not encrypted");
                reply
            }
        };
        check_device_error(&object)?;
        Ok(object)
    }

    /// Release the device.
    ///
    /// Later calls fail with [`CommError::ChannelClosed`]. A failed close is
    /// [`FatalError::CloseFailed`]: the device state is undefined and the
    /// session must be abandoned.
    pub fn close(&self) -> Result<()> {
        let mut channel = self.lock().take().ok_or(CommError::ChannelClosed)?;
        channel.close().map_err(|err| {
            error!(error = %err, "failed to close device channel");
            CommError::from(FatalError::CloseFailed(err))
        })?;
        debug!("device channel closed");
        Ok(())
    }

    fn round_trip(&self, channel: &mut C, payload: &[u8]) -> Result<Bytes> {
        FrameWriter::with_config(&mut *channel, self.config.reports).send(payload)?;
        let reply = FrameReader::with_config(&mut *channel, self.config.reports).read_message()?;
        Ok(reply)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Option<C>> {
        // A panicking caller cannot corrupt the handle itself.
        self.channel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> std::fmt::Debug for Communication<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communication")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Strip trailing whitespace (Unicode included) and NUL padding.
fn trim_reply(raw: &[u8]) -> &[u8] {
    let is_padding = |c: char| c.is_whitespace() || c == '\0';
    // Padding can only follow the last invalid UTF-8 sequence.
    let mut tail_start = 0;
    loop {
        match std::str::from_utf8(&raw[tail_start..]) {
            Ok(text) => return &raw[..tail_start + text.trim_end_matches(is_padding).len()],
            Err(err) => match err.error_len() {
                Some(len) => tail_start += err.valid_up_to() + len,
                None => return raw,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use hwwlink_envelope::{encrypt_base64, CryptoError, DecryptFailure};
    use hwwlink_frame::{encode_message, FrameError, ReportConfig, HWW_CID, HWW_CMD};
    use serde_json::json;

    use super::*;
    use crate::testing::SimulatedDevice;

    fn reply_with(reply: &'static [u8]) -> SimulatedDevice {
        SimulatedDevice::framed(move |_| reply.to_vec())
    }

    #[test]
    fn plain_roundtrip() {
        let device = SimulatedDevice::framed(|req| {
            assert_eq!(req, br#"{"ping":""}"#);
            br#"{"ping":"password"}"#.to_vec()
        });
        let comm = Communication::new(device.clone());

        let reply = comm.send_plain(r#"{"ping":""}"#).unwrap();
        assert_eq!(Value::Object(reply), json!({"ping": "password"}));
    }

    #[test]
    fn request_reports_are_padded_and_sequenced() {
        let device = reply_with(b"{}");
        let comm = Communication::new(device.clone());
        let msg = format!(r#"{{"blob":"{}"}}"#, "z".repeat(180));

        comm.send_plain(&msg).unwrap();

        let state = device.state.lock().unwrap();
        assert_eq!(state.requests, vec![msg.into_bytes()]);
        assert_eq!(state.writes.len(), 4);
        assert!(state.writes.iter().all(|r| r.len() == 64));
        assert_eq!(state.writes[0][4], HWW_CMD);
        assert_eq!(state.writes[1][4], 0);
        assert_eq!(state.writes[3][4], 2);
        assert_eq!(*state.writes[3].last().unwrap(), 0xEE);
    }

    #[test]
    fn custom_report_sizes() {
        let device = reply_with(br#"{"ok":true}"#);
        let config = CommunicationConfig {
            reports: ReportConfig::new(32, 64).unwrap(),
            ..CommunicationConfig::default()
        };
        let comm = Communication::with_config(device.clone(), config).unwrap();

        comm.send_plain(r#"{"led":"blink"}"#).unwrap();
        assert!(device.state.lock().unwrap().writes.iter().all(|r| r.len() == 32));
        assert_eq!(comm.config().reports.write_report_size, 32);
    }

    #[test]
    fn invalid_report_size_rejected() {
        let config = CommunicationConfig {
            reports: ReportConfig {
                write_report_size: 4,
                read_report_size: 64,
            },
            ..CommunicationConfig::default()
        };
        let err = Communication::with_config(reply_with(b"{}"), config).unwrap_err();
        assert!(matches!(err, CommError::Frame(FrameError::ReportTooSmall { .. })));
    }

    #[test]
    fn trailing_padding_is_trimmed() {
        let comm = Communication::new(reply_with(b"{\"a\":1}\0\0\r\n \t"));
        let reply = comm.send_plain("{}").unwrap();
        assert_eq!(reply.get("a"), Some(&json!(1)));
    }

    #[test]
    fn device_error_is_mapped() {
        let comm = Communication::new(reply_with(br#"{"error":{"code":101,"message":"x"}}"#));
        let err = comm.send_plain(r#"{"led":"blink"}"#).unwrap_err();
        assert_eq!(
            err.device_error(),
            Some(&crate::DeviceError {
                code: 101,
                message: "x".into()
            })
        );
    }

    #[test]
    fn incomplete_error_is_unexpected_reply() {
        let comm = Communication::new(reply_with(br#"{"error":{"message":"x"}}"#));
        let err = comm.send_plain("{}").unwrap_err();
        assert!(
            matches!(err, CommError::UnexpectedReply { ref reply } if *reply == json!({"message": "x"}))
        );
    }

    #[test]
    fn malformed_reply() {
        let comm = Communication::new(reply_with(b"not json"));
        assert!(matches!(
            comm.send_plain("{}").unwrap_err(),
            CommError::MalformedResponse(_)
        ));

        let comm = Communication::new(reply_with(b"[1,2,3]"));
        assert!(matches!(
            comm.send_plain("{}").unwrap_err(),
            CommError::MalformedResponse(_)
        ));
    }

    #[test]
    fn framing_errors_surface() {
        let mut report = encode_message(b"{}", HWW_CID, HWW_CMD, 64).unwrap()[0].to_vec();
        report[0] = 0x00;
        let comm = Communication::new(SimulatedDevice::raw([report]));
        assert!(matches!(
            comm.send_plain("{}").unwrap_err(),
            CommError::Frame(FrameError::ChannelMismatch { .. })
        ));

        let report = encode_message(b"{}", HWW_CID, 0x81, 64).unwrap()[0].to_vec();
        let comm = Communication::new(SimulatedDevice::raw([report]));
        assert!(matches!(
            comm.send_plain("{}").unwrap_err(),
            CommError::Frame(FrameError::CommandMismatch { observed: 0x81, .. })
        ));

        let comm = Communication::new(SimulatedDevice::raw(Vec::new()));
        assert!(matches!(
            comm.send_plain("{}").unwrap_err(),
            CommError::Frame(FrameError::ShortRead { got: 0, .. })
        ));
    }

    #[test]
    fn write_failure_is_io_error() {
        let device = reply_with(b"{}").with_state(|s| s.fail_writes = true);
        let comm = Communication::new(device);
        assert!(matches!(
            comm.send_plain("{}").unwrap_err(),
            CommError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe
        ));
    }

    #[test]
    fn close_is_terminal() {
        let device = reply_with(b"{}");
        let comm = Communication::new(device.clone());
        assert!(!comm.is_closed());

        comm.close().unwrap();

        assert!(comm.is_closed());
        assert!(device.state.lock().unwrap().closed);
        assert!(matches!(comm.send_plain("{}"), Err(CommError::ChannelClosed)));
        assert!(matches!(
            comm.send_encrypted("{}", "pw"),
            Err(CommError::ChannelClosed)
        ));
        assert!(matches!(comm.close(), Err(CommError::ChannelClosed)));
    }

    #[test]
    fn close_failure_is_fatal() {
        let device = reply_with(b"{}").with_state(|s| s.fail_close = true);
        let comm = Communication::new(device);
        let err = comm.close().unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, CommError::Fatal(FatalError::CloseFailed(_))));
    }

    /// Device side of the envelope: open the request, answer sealed.
    fn encrypted_device(password: &'static str, answer: &'static str) -> SimulatedDevice {
        SimulatedDevice::framed(move |req| {
            let secret = Secret::derive(password);
            let text = std::str::from_utf8(req).unwrap();
            let command = decrypt_base64(text, &secret).unwrap();
            assert_eq!(command, br#"{"random":"pseudo"}"#);
            let sealed = encrypt_base64(answer.as_bytes(), &secret).unwrap();
            serde_json::to_vec(&json!({ "ciphertext": sealed })).unwrap()
        })
    }

    #[test]
    fn encrypted_roundtrip() {
        let comm = Communication::new(encrypted_device("0000", r#"{"random":"c0ffee"}"#));
        let reply = comm.send_encrypted(r#"{"random":"pseudo"}"#, "0000").unwrap();
        assert_eq!(Value::Object(reply), json!({"random": "c0ffee"}));
    }

    #[test]
    fn encrypted_device_error_is_mapped() {
        let comm = Communication::new(encrypted_device(
            "0000",
            r#"{"error":{"code":109,"message":"Incorrect serialization"}}"#,
        ));
        let err = comm.send_encrypted(r#"{"random":"pseudo"}"#, "0000").unwrap_err();
        assert_eq!(err.device_error().map(|e| e.code), Some(109));
    }

    #[test]
    fn plain_error_reply_to_encrypted_command() {
        let comm = Communication::new(reply_with(
            br#"{"error":{"code":102,"message":"Too many failed access attempts"}}"#,
        ));
        let err = comm.send_encrypted("{}", "0000").unwrap_err();
        assert_eq!(err.device_error().map(|e| e.code), Some(102));
    }

    #[test]
    fn unencrypted_reply_is_used_as_is() {
        let comm = Communication::new(reply_with(br#"{"device":"ready"}"#));
        let reply = comm.send_encrypted("{}", "0000").unwrap();
        assert_eq!(reply.get("device"), Some(&json!("ready")));
    }

    #[test]
    fn reply_sealed_under_other_password_fails_to_decrypt() {
        let comm = Communication::new(SimulatedDevice::framed(|_| {
            let sealed = encrypt_base64(b"{}", &Secret::derive("device")).unwrap();
            serde_json::to_vec(&json!({ "ciphertext": sealed })).unwrap()
        }));
        let err = comm.send_encrypted("{}", "client").unwrap_err();
        assert!(matches!(
            err,
            CommError::Crypto(CryptoError::DecryptFailed(DecryptFailure::MacMismatch))
        ));
    }

    #[test]
    fn garbage_ciphertext_fails_to_decrypt() {
        let comm = Communication::new(reply_with(br#"{"ciphertext":"%%%"}"#));
        let err = comm.send_encrypted("{}", "pw").unwrap_err();
        assert!(matches!(
            err,
            CommError::Crypto(CryptoError::DecryptFailed(DecryptFailure::InvalidBase64))
        ));
    }

    #[test]
    fn decrypted_non_json_is_malformed() {
        let comm = Communication::new(SimulatedDevice::framed(|_| {
            let sealed = encrypt_base64(b"not json", &Secret::derive("pw")).unwrap();
            serde_json::to_vec(&json!({ "ciphertext": sealed })).unwrap()
        }));
        assert!(matches!(
            comm.send_encrypted("{}", "pw").unwrap_err(),
            CommError::MalformedResponse(_)
        ));
    }

    #[test]
    fn concurrent_sends_never_interleave() {
        let device = SimulatedDevice::framed(|req| {
            let request: Value = serde_json::from_slice(req).unwrap();
            serde_json::to_vec(&json!({ "id": request["id"] })).unwrap()
        });
        let comm = Arc::new(Communication::new(device.clone()));

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let comm = Arc::clone(&comm);
                thread::spawn(move || {
                    for round in 0..10 {
                        let id = format!("w{worker}-r{round}");
                        // Several reports per request so interleaving would show.
                        let msg = json!({ "id": id, "pad": "p".repeat(200 + worker * 10) });
                        let reply = comm.send_plain(&msg.to_string()).unwrap();
                        assert_eq!(reply.get("id"), Some(&json!(id)));
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        let state = device.state.lock().unwrap();
        assert!(!state.interleaved);
        assert_eq!(state.requests.len(), 80);
    }

    #[test]
    fn trim_reply_edges() {
        assert_eq!(trim_reply(b""), b"");
        assert_eq!(trim_reply(b"\0\0 \n"), b"");
        assert_eq!(trim_reply(b"{}\x0b\x0c"), b"{}");
        assert_eq!(trim_reply(b" {} "), b" {}");
    }

    #[test]
    fn trim_reply_strips_unicode_spaces() {
        assert_eq!(trim_reply("{}\u{a0}\u{85}\0".as_bytes()), b"{}");
        assert_eq!(trim_reply("{}\u{3000}".as_bytes()), b"{}");
    }

    #[test]
    fn trim_reply_stops_at_invalid_utf8() {
        assert_eq!(trim_reply(b"{}\xff \n"), b"{}\xff");
        assert_eq!(trim_reply(b"\xff\x00{} \0"), b"\xff\x00{}");
        // A truncated sequence at the very end is not padding.
        assert_eq!(trim_reply(b"{} \xe2\x80"), b"{} \xe2\x80");
    }

    #[test]
    fn send_plain_accepts_non_breaking_space_padding() {
        let device = reply_with("{\"a\":1}\u{a0}".as_bytes());
        let comm = Communication::new(device);

        let reply = comm.send_plain(r#"{"b":2}"#).unwrap();
        assert_eq!(reply.get("a"), Some(&json!(1)));
    }
}
