// clipline-core/tests/framing_tests.rs
//
// The framer must produce the same ordered line sequence for every byte
// chunking of the same logical stream, including splits mid-line and
// mid-UTF-8-codepoint.

use clipline_core::worker::LineFramer;

fn frame_with_chunk_size(stream: &[u8], chunk_size: usize) -> Vec<String> {
    let mut framer = LineFramer::new();
    let mut lines = Vec::new();
    for chunk in stream.chunks(chunk_size) {
        lines.extend(framer.feed(chunk));
    }
    lines.extend(framer.finish());
    lines
}

#[test]
fn test_all_chunkings_agree() {
    let stream = "{\"type\":\"progress\",\"step\":\"scan\",\"progress\":3}\n\
                  naïve diagnostic with multibyte çhars ß\n\
                  {\"type\":\"complete\",\"clips\":[]}\n"
        .as_bytes();

    let reference = frame_with_chunk_size(stream, stream.len());
    assert_eq!(reference.len(), 3);

    for chunk_size in [1, 2, 3, 5, 7, 13, 64] {
        assert_eq!(
            frame_with_chunk_size(stream, chunk_size),
            reference,
            "chunk size {chunk_size} produced a different line sequence"
        );
    }
}

#[test]
fn test_unterminated_final_line_survives_all_chunkings() {
    let stream = "first\nsecond without newline".as_bytes();
    let reference = vec!["first".to_string(), "second without newline".to_string()];
    for chunk_size in [1, 4, 9, stream.len()] {
        assert_eq!(frame_with_chunk_size(stream, chunk_size), reference);
    }
}

#[test]
fn test_no_bytes_dropped_or_duplicated() {
    // Rejoining the framed lines with newlines reproduces the input text.
    let text = "alpha\nβγδ\n\nlast";
    let lines = frame_with_chunk_size(text.as_bytes(), 3);
    assert_eq!(lines.join("\n"), text);
}
