/// Removes every newline so that block markers split across lines in the
/// page source line up again.
pub fn strip_newlines(markup: &str) -> String {
    markup.replace('\n', "")
}

fn opening_marker(name: &str) -> String {
    format!("{{{{{}|", name)
}

/// Returns the payload of every `{{name|...}}` block, left to right.
///
/// A payload runs up to the next `}}`; nested templates are not balanced,
/// so `{{name|a {{b}} c}}` yields `"a {{b"`. Use [`scan_nested_blocks`]
/// when nesting matters. Scanning stops at the first unterminated block.
pub fn scan_blocks(markup: &str, name: &str) -> Vec<String> {
    let flat = strip_newlines(markup);
    let open = opening_marker(name);
    let mut payloads = Vec::new();
    let mut rest = flat.as_str();

    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        let Some(end) = after.find("}}") else {
            break;
        };
        payloads.push(after[..end].to_string());
        rest = &after[end + 2..];
    }

    payloads
}

/// Depth-aware variant of [`scan_blocks`]: every `{{` inside the payload must
/// be closed before the block itself ends. Scanning stops at the first
/// unterminated block.
pub fn scan_nested_blocks(markup: &str, name: &str) -> Vec<String> {
    let flat = strip_newlines(markup);
    let open = opening_marker(name);
    let bytes = flat.as_bytes();
    let mut payloads = Vec::new();
    let mut cursor = 0;

    while let Some(found) = flat[cursor..].find(&open) {
        let start = cursor + found + open.len();
        let mut depth = 1usize;
        let mut i = start;
        let mut end = None;

        while i + 1 < bytes.len() {
            match (bytes[i], bytes[i + 1]) {
                (b'{', b'{') => {
                    depth += 1;
                    i += 2;
                }
                (b'}', b'}') => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                    i += 2;
                }
                _ => i += 1,
            }
        }

        let Some(end) = end else {
            break;
        };
        payloads.push(flat[start..end].to_string());
        cursor = end + 2;
    }

    payloads
}
