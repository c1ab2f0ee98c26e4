use std::io::{self, BufRead};

/// One server-sent event.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// Value of the `event:` field.
    pub event: Option<String>,
    /// Value of the `data:` field(s), joined with newlines.
    pub data: String,
}

/// Splits a byte stream into server-sent events.
pub struct SseReader<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> SseReader<R> {

    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        SseReader {
            reader,
            line: String::new(),
        }
    }

    /// Read the next event, `None` at end of stream.
    pub fn next_event(&mut self) -> io::Result<Option<SseEvent>> {
        let mut event: Option<String> = None;
        let mut data: Option<String> = None;

        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(data.map(|data| SseEvent { event, data }));
            }

            let line = self.line.trim_end_matches(['\r', '\n']);

            if line.is_empty() {
                if let Some(data) = data.take() {
                    return Ok(Some(SseEvent { event, data }));
                }
                event = None;
                continue;
            }

            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "event" => event = Some(value.to_owned()),
                "data" => match data.as_mut() {
                    Some(d) => {
                        d.push('\n');
                        d.push_str(value);
                    },
                    None => data = Some(value.to_owned()),
                },
                _ => {},
            }
        }
    }
}
