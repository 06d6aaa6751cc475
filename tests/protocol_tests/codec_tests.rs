//! Codec Tests
//!
//! Tests for request line and status encoding/decoding.

use std::io::Cursor;
use filedrop::protocol::{
    Command, CommandType, InvalidCommand, Status,
    encode_command, decode_command,
    encode_status, decode_status, decode_listing,
    read_request, write_command, write_status, read_reply,
    NO_FILES,
};

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

fn all_commands() -> Vec<Command> {
    vec![
        Command::List,
        Command::Delete { name: "old.log".to_string() },
        Command::Rename { from: "a.txt".to_string(), to: "b.txt".to_string() },
        Command::Upload { name: "report.txt".to_string() },
        Command::Download { name: "photo 01.png".to_string() },
        Command::Quit,
    ]
}

#[test]
fn test_encode_decode_every_variant() {
    for cmd in all_commands() {
        let decoded = decode_command(&encode_command(&cmd)).unwrap();
        assert_eq!(decoded, cmd);
    }
}

#[test]
fn test_encode_decode_unicode_names() {
    let cmd = Command::Rename {
        from: "résumé.pdf".to_string(),
        to: "履歴書.pdf".to_string(),
    };
    assert_eq!(decode_command(&encode_command(&cmd)).unwrap(), cmd);
}

#[test]
fn test_decode_ignores_trailing_newline() {
    assert_eq!(
        decode_command(b"delete%notes.txt\r\n").unwrap(),
        Command::Delete { name: "notes.txt".to_string() }
    );
    assert_eq!(decode_command(b"list\n").unwrap(), Command::List);
}

#[test]
fn test_decode_ignores_extra_arguments() {
    assert_eq!(
        decode_command(b"download%a.txt%b.txt").unwrap(),
        Command::Download { name: "a.txt".to_string() }
    );
}

#[test]
fn test_decode_is_case_sensitive() {
    let result = decode_command(b"LIST");
    assert_eq!(result, Err(InvalidCommand::Unknown("LIST".to_string())));
}

#[test]
fn test_decode_unknown_command_keeps_raw_text() {
    match decode_command(b"copy%a%b") {
        Err(InvalidCommand::Unknown(raw)) => assert_eq!(raw, "copy%a%b"),
        other => panic!("Expected unknown command, got {:?}", other),
    }
}

#[test]
fn test_decode_empty_line() {
    assert!(matches!(decode_command(b""), Err(InvalidCommand::Unknown(_))));
}

#[test]
fn test_decode_missing_arguments() {
    let cases = [
        ("delete", CommandType::Delete),
        ("delete%", CommandType::Delete),
        ("upload", CommandType::Upload),
        ("download", CommandType::Download),
        ("rename%a.txt", CommandType::Rename),
        ("rename%%b.txt", CommandType::Rename),
    ];

    for (line, kind) in cases {
        assert_eq!(
            decode_command(line.as_bytes()),
            Err(InvalidCommand::MissingArgument(kind)),
            "{}",
            line
        );
    }
}

#[test]
fn test_command_type_names() {
    for kind in CommandType::ALL {
        assert_eq!(CommandType::from_name(kind.name()), Some(kind));
    }
    assert_eq!(CommandType::from_name("upload "), None);
    assert_eq!(CommandType::Rename.arity(), 2);
}

// =============================================================================
// Wire Format Verification Tests
// =============================================================================

#[test]
fn test_wire_format_commands() {
    assert_eq!(encode_command(&Command::List), b"list");
    assert_eq!(
        encode_command(&Command::Rename { from: "a.txt".into(), to: "b.txt".into() }),
        b"rename%a.txt%b.txt"
    );
    assert_eq!(
        encode_command(&Command::Upload { name: "report.txt".into() }),
        b"upload%report.txt"
    );
}

#[test]
fn test_wire_format_statuses() {
    assert_eq!(encode_status(&Status::Ready), b"READY");
    assert_eq!(encode_status(&Status::Success(None)), b"SUCCESS");
    assert_eq!(
        encode_status(&Status::success("Upload complete.")),
        b"SUCCESS: Upload complete."
    );
    assert_eq!(encode_status(&Status::error("File not found.")), b"ERROR: File not found.");
    assert_eq!(encode_status(&Status::Listing(vec![])), NO_FILES.as_bytes());
    assert_eq!(
        encode_status(&Status::Listing(vec!["a.txt".into(), "b.txt".into()])),
        b"a.txt\nb.txt"
    );
}

// =============================================================================
// Status Decoding Tests
// =============================================================================

#[test]
fn test_decode_status_classification() {
    assert_eq!(decode_status(b"READY"), Status::Ready);
    assert_eq!(decode_status(b"SUCCESS"), Status::Success(None));
    assert_eq!(
        decode_status(b"SUCCESS: File renamed."),
        Status::Success(Some("File renamed.".to_string()))
    );
    assert_eq!(
        decode_status(b"ERROR: Unknown command"),
        Status::Error("Unknown command".to_string())
    );
}

#[test]
fn test_decode_status_unknown() {
    assert_eq!(decode_status(b"OK"), Status::Unknown("OK".to_string()));
    assert_eq!(decode_status(b"READY?"), Status::Unknown("READY?".to_string()));
    assert_eq!(decode_status(b""), Status::Unknown(String::new()));
}

#[test]
fn test_decode_status_round_trip() {
    for status in [
        Status::Ready,
        Status::Success(None),
        Status::success("File deleted."),
        Status::error("Missing filename for delete."),
    ] {
        assert_eq!(decode_status(&encode_status(&status)), status);
    }
}

#[test]
fn test_decode_listing() {
    assert!(decode_listing(NO_FILES.as_bytes()).is_empty());
    assert!(decode_listing(b"").is_empty());
    assert_eq!(decode_listing(b"a.txt\nb.txt"), vec!["a.txt", "b.txt"]);
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_write_read_request() {
    let cmd = Command::Rename { from: "x".into(), to: "y".into() };

    let mut buffer = Vec::new();
    write_command(&mut buffer, &cmd).unwrap();

    let mut cursor = Cursor::new(buffer);
    let decoded = read_request(&mut cursor).unwrap().unwrap();
    assert_eq!(decoded, Ok(cmd));
}

#[test]
fn test_read_request_on_closed_stream() {
    let mut cursor = Cursor::new(Vec::new());
    assert!(read_request(&mut cursor).unwrap().is_none());
}

#[test]
fn test_read_request_is_a_single_bounded_read() {
    // Only the first 1024 bytes are considered
    let mut line = b"delete%".to_vec();
    line.extend(std::iter::repeat(b'a').take(2000));

    let mut cursor = Cursor::new(line);
    let request = read_request(&mut cursor).unwrap().unwrap();
    match request {
        Ok(Command::Delete { name }) => assert_eq!(name.len(), 1024 - "delete%".len()),
        other => panic!("Expected DELETE command, got {:?}", other),
    }
}

#[test]
fn test_stream_write_read_status() {
    let mut buffer = Vec::new();
    write_status(&mut buffer, &Status::success("File deleted.")).unwrap();

    let mut cursor = Cursor::new(buffer);
    let reply = read_reply(&mut cursor).unwrap();
    assert_eq!(decode_status(&reply), Status::success("File deleted."));
}
