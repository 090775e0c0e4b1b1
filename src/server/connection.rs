//! Per-connection line protocol.
//!
//! A client first answers the name prompt; every following line is sent
//! to the room as a chat message. Delivered messages are written back as
//! `[<initials>:<color>] <message>` lines.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::chat::{initials_of, AvatarColor, ChatRoom, ConnectionId, Message};
use crate::{ChatError, Result};

/// Prompt written until the client supplies a non-blank name.
pub const NAME_PROMPT: &str = "Enter your name:\r\n";

/// Reply to a blank name.
pub const BLANK_NAME_REPLY: &str = "Name cannot be blank!\r\n";

/// Outcome of reading one input line.
#[derive(Debug, PartialEq, Eq)]
enum LineRead {
    /// A complete line, without its terminator.
    Line(String),
    /// The peer closed the connection.
    Eof,
    /// The line exceeded the length limit.
    TooLong,
}

/// Read one line of at most `max_len` bytes (terminator excluded).
///
/// Never buffers more than `max_len` plus the `\r\n` terminator, so a
/// peer that withholds the newline cannot grow memory without bound.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>, max_len: usize) -> Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = max_len as u64 + 2;
    let read = reader.take(limit).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(LineRead::Eof);
    }
    // Cap reached before the newline
    if buf.last() != Some(&b'\n') && read as u64 == limit {
        return Ok(LineRead::TooLong);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    if buf.len() > max_len {
        return Ok(LineRead::TooLong);
    }
    Ok(LineRead::Line(String::from_utf8_lossy(buf).into_owned()))
}

/// Render a delivered message as one output line.
pub fn render_line(message: &Message) -> String {
    let initials = initials_of(message.author()).unwrap_or_else(|_| "?".to_string());
    format!(
        "[{}:{}] {}\r\n",
        initials,
        AvatarColor::for_name(message.author()),
        message.format()
    )
}

/// Serve one client until it disconnects, then release its session.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    room: Arc<ChatRoom>,
    queue_capacity: usize,
    max_line_len: usize,
) {
    let connection_id = ConnectionId::generate();
    info!(connection = %connection_id, %addr, "client connected");

    match serve(&connection_id, stream, &room, queue_capacity, max_line_len).await {
        Ok(()) => {}
        Err(e @ ChatError::LineTooLong(_)) => {
            warn!(connection = %connection_id, %addr, "dropping client: {}", e);
        }
        Err(e) => {
            debug!(connection = %connection_id, "connection ended with error: {}", e);
        }
    }

    room.disconnect(&connection_id);
    info!(connection = %connection_id, %addr, "client disconnected");
}

async fn serve(
    connection_id: &ConnectionId,
    stream: TcpStream,
    room: &ChatRoom,
    queue_capacity: usize,
    max_line_len: usize,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    // Name prompt until a non-blank name is given
    loop {
        writer.write_all(NAME_PROMPT.as_bytes()).await?;
        let line = match read_line(&mut reader, &mut buf, max_line_len).await? {
            LineRead::Line(line) => line,
            LineRead::Eof => return Ok(()),
            LineRead::TooLong => return Err(ChatError::LineTooLong(max_line_len)),
        };
        match room.join(connection_id, line.trim()) {
            Ok(()) => break,
            Err(ChatError::BlankName) => writer.write_all(BLANK_NAME_REPLY.as_bytes()).await?,
            Err(e) => return Err(e),
        }
    }

    // Subscribe before announcing so the client sees its own join
    let mut inbox = room.subscribe_channel(connection_id, queue_capacity)?;
    room.announce_join(connection_id)?;

    // Forward delivered messages; ends once the room drops the subscription
    tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            if writer.write_all(render_line(&message).as_bytes()).await.is_err() {
                break;
            }
        }
    });

    // Send every input line to the room
    loop {
        let line = match read_line(&mut reader, &mut buf, max_line_len).await? {
            LineRead::Line(line) => line,
            LineRead::Eof => return Ok(()),
            LineRead::TooLong => return Err(ChatError::LineTooLong(max_line_len)),
        };
        match room.send(connection_id, &line) {
            // Blank lines are dropped silently
            Ok(()) | Err(ChatError::EmptyText) => {}
            Err(e) => return Err(e),
        }
    }
}
