//! Wire protocol decoding and encoding.
//!
//! Frames are `"<token>|<payload...>"`. The token is either a device ID made
//! of ASCII digits or one of the command names below; anything after the
//! first `|` belongs to the command. There is no escaping and no framing
//! beyond the websocket message itself.

use crate::device::DeviceId;

/// Field delimiter inside a frame.
pub const DELIMITER: char = '|';

pub const BROADCAST: &str = "Broadcast";
pub const GET_FILE_LIST: &str = "GetFileList";
pub const GET_FILE: &str = "GetFile";
pub const PUT_FILE: &str = "PutFile";

/// Reply marker for a directory listing.
pub const FILE_LIST_REPLY: &str = "FileList";
/// Reply marker for file contents.
pub const FILE_REPLY: &str = "File";

/// Frames shorter than this are dropped without a report.
const MIN_FRAME_CHARS: usize = 3;

/// A decoded session frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write `payload` to one device. `id` is `None` when the digits do not
    /// fit a device index at all.
    Device {
        token: String,
        id: Option<DeviceId>,
        payload: String,
    },
    /// Write `payload` to every device.
    Broadcast { payload: String },
    GetFileList { path: String },
    GetFile { path: String },
    /// Write `contents` (which may itself contain `|`) to `path`.
    PutFile { path: String, contents: String },
    /// Token matched nothing.
    Unknown { token: String },
}

/// Decode one session frame.
///
/// Returns `None` for frames that are too short or have no delimiter; those
/// are ignored without any report.
pub fn decode(text: &str) -> Option<Command> {
    if text.chars().count() < MIN_FRAME_CHARS {
        return None;
    }
    let (token, rest) = text.split_once(DELIMITER)?;

    let command = if is_device_token(token) {
        Command::Device {
            token: token.to_string(),
            id: token.parse().ok(),
            payload: rest.to_string(),
        }
    } else {
        match token {
            BROADCAST => Command::Broadcast {
                payload: rest.to_string(),
            },
            GET_FILE_LIST => Command::GetFileList {
                path: first_field(rest).to_string(),
            },
            GET_FILE => Command::GetFile {
                path: first_field(rest).to_string(),
            },
            PUT_FILE => {
                let (path, contents) = rest.split_once(DELIMITER).unwrap_or((rest, ""));
                Command::PutFile {
                    path: path.to_string(),
                    contents: contents.to_string(),
                }
            }
            _ => Command::Unknown {
                token: token.to_string(),
            },
        }
    };

    Some(command)
}

fn is_device_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn first_field(rest: &str) -> &str {
    rest.split(DELIMITER).next().unwrap_or_default()
}

/// Bytes written to a device for `payload`.
pub fn device_line(payload: &str) -> Vec<u8> {
    let mut line = Vec::with_capacity(payload.len() + 1);
    line.extend_from_slice(payload.as_bytes());
    line.push(b'\n');
    line
}

/// `"<id>|<line>"`, a firmware line forwarded to the UI.
pub fn device_frame(id: DeviceId, line: &str) -> String {
    format!("{}{}{}", id, DELIMITER, line)
}

/// `"FileList|a|b|c"`; an empty listing is just `"FileList|"`.
pub fn file_list_frame<S: AsRef<str>>(entries: &[S]) -> String {
    let mut frame = String::from(FILE_LIST_REPLY);
    frame.push(DELIMITER);
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            frame.push(DELIMITER);
        }
        frame.push_str(entry.as_ref());
    }
    frame
}

/// `"File|<contents>"`.
pub fn file_frame(contents: &str) -> String {
    format!("{}{}{}", FILE_REPLY, DELIMITER, contents)
}
