use std::process::Command;
use crate::AppError;

/// Command running `line` through the platform shell.
pub fn shell_command(line: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(line);
        command
    } else {
        let mut command = Command::new("sh");
        command.arg("-c").arg(line);
        command
    }
}

/// Parse foreground and background colors from string, e.g. `fg(255,0,123);bg(0,123,255)`.
pub fn parse_colors(s: &str) -> Result<(Option<[u8;3]>, Option<[u8;3]>), AppError> {
    let mut fg = None;
    let mut bg = None;
    let s = s.trim().trim_matches(['\'', '"']);

    for part in s.split(';') {
        let part = part.trim();

        if let Some(rgb) = part.strip_prefix("fg") {
            fg = Some(parse_color(rgb.trim())?);
        } else if let Some(rgb) = part.strip_prefix("bg") {
            bg = Some(parse_color(rgb.trim())?);
        } else {
            return Err(AppError::ColorParseError);
        }
    }

    Ok((fg, bg))
}

fn parse_color(s: &str) -> Result<[u8;3], AppError> {
    let inner = s
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or(AppError::ColorParseError)?;

    let parts = inner
        .split(',')
        .map(|c| c.trim().parse::<u8>().map_err(|_| AppError::ColorParseError))
        .collect::<Result<Vec<u8>, AppError>>()?;

    <[u8;3]>::try_from(parts).map_err(|_| AppError::ColorParseError)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("( 10, 20, 30 )").unwrap(), [10,20,30]);
        assert_eq!(parse_color("(0,0,255)").unwrap(), [0,0,255]);
        assert!(matches!(parse_color("(300,0,0)").unwrap_err(), AppError::ColorParseError));
        assert!(matches!(parse_color("(1,2,3,4)").unwrap_err(), AppError::ColorParseError));
        assert!(matches!(parse_color("(1,2)").unwrap_err(), AppError::ColorParseError));
        assert!(matches!(parse_color("1,2,3").unwrap_err(), AppError::ColorParseError));
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!(parse_colors("bg(1,2,3)").unwrap(), (None, Some([1,2,3])));
        assert_eq!(parse_colors(" fg ( 4, 5, 6 ) ").unwrap(), (Some([4,5,6]), None));
        assert_eq!(parse_colors("'fg(1,1,1);bg(2,2,2)'").unwrap(), (Some([1,1,1]), Some([2,2,2])));
        assert_eq!(parse_colors("bg(2,2,2) ; fg(1,1,1)").unwrap(), (Some([1,1,1]), Some([2,2,2])));
        assert!(matches!(parse_colors("fg(1,1,1);xx(2,2,2)").unwrap_err(), AppError::ColorParseError));
        assert!(matches!(parse_colors("fg(1,1,1)bg(2,2,2)").unwrap_err(), AppError::ColorParseError));
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_command() {
        let output = shell_command("echo hello").output().expect("run sh");
        assert_eq!(String::from_utf8_lossy(&output.stdout), "hello\n");
    }
}
