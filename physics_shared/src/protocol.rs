//! Wire protocol helpers.
//!
//! Every message — inbound or outbound — is newline-delimited text:
//!
//! ```text
//! <CommandToken>
//! <payload line 0>
//! <payload line 1>
//! ...
//! MessageEnd
//! ```
//!
//! The command token on the first line selects a handler; the literal
//! `MessageEnd` marks the end of a logical message on the wire. Some clients
//! append the terminator directly to the last payload line instead of putting
//! it on its own line, so completeness checks are substring searches, not
//! strict line matches.
//!
//! All transformations here are pure functions over string slices; nothing
//! mutates caller-owned buffers.

/// Literal marking the end of a logical message.
pub const MESSAGE_END: &str = "MessageEnd";

/// Field separator inside a payload line.
pub const FIELD_SEPARATOR: char = ';';

/// Extracts the command token: the text before the first newline.
///
/// A message without any newline is degenerate — the whole message is
/// treated as the token, which will miss the handler registry and surface
/// as an unknown-command response.
pub fn command_token(message: &str) -> &str {
    match message.find('\n') {
        Some(pos) => &message[..pos],
        None => message,
    }
}

/// Returns true once `buffer` holds a complete logical message.
pub fn is_complete(buffer: &str) -> bool {
    buffer.contains(MESSAGE_END)
}

/// Strips the framing lines a handler does not need: the leading command
/// token line and the trailing terminator.
///
/// Either line may be absent (a token-only message has no payload at all);
/// the remainder is returned best-effort, never a panic.
pub fn strip_frame(message: &str) -> &str {
    let payload = match message.find('\n') {
        Some(pos) => &message[pos + 1..],
        None => "",
    };

    let payload = match payload.find(MESSAGE_END) {
        Some(pos) => &payload[..pos],
        None => payload,
    };

    payload.trim_end_matches(['\n', '\r'])
}

/// Splits one payload line into its `;`-delimited fields.
pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(FIELD_SEPARATOR).map(str::trim).collect()
}

/// Ensures an outbound response carries the terminator, appending it on its
/// own line when missing.
pub fn seal_response(mut response: String) -> String {
    if !response.contains(MESSAGE_END) {
        if !response.is_empty() && !response.ends_with('\n') {
            response.push('\n');
        }
        response.push_str(MESSAGE_END);
        response.push('\n');
    }
    response
}
