use serde_json::{json, Value};

/// Number of user turns that carry a cache breakpoint.
const USER_BREAKPOINTS: usize = 3;

/// Move prompt-cache breakpoints onto the most recent user turns.
///
/// The last content block of each of the three latest user turns gets an
/// ephemeral `cache_control`. The breakpoint left on the turn before them
/// is removed. Older turns are not touched.
pub fn inject_prompt_caching(history: &mut [Value]) {
    let mut breakpoints_remaining = USER_BREAKPOINTS;

    for message in history.iter_mut().rev() {
        if message["role"] != "user" {
            continue;
        }

        let Some(block) = message["content"]
            .as_array_mut()
            .and_then(|content| content.last_mut())
            .and_then(Value::as_object_mut) else {
            continue;
        };

        if breakpoints_remaining > 0 {
            breakpoints_remaining -= 1;
            block.insert("cache_control".into(), json!({"type": "ephemeral"}));
        } else {
            block.remove("cache_control");
            break;
        }
    }
}
