use kanal::AsyncSender;
use ordbok_types::AppEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

pub const USAGE: &str = "Type a Swedish word, or :lang <language>, :sense <n>, :save, :recent, :quit";

/// Turn one input line into an app event. Blank lines yield nothing.
pub fn parse_command(line: &str) -> Result<Option<AppEvent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(command) = line.strip_prefix(':') else {
        return Ok(Some(AppEvent::Lookup(line.to_string())));
    };

    let (name, argument) = match command.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command, ""),
    };

    let event = match name.to_lowercase().as_str() {
        "lang" | "language" if !argument.is_empty() => AppEvent::SetLanguage(argument.to_string()),
        "sense" => match argument.parse::<usize>() {
            Ok(n) if n > 0 => AppEvent::SelectSense(n - 1),
            _ => return Err(format!("Not a sense number: '{argument}'")),
        },
        "save" => AppEvent::ToggleSaved,
        "recent" => AppEvent::ShowRecent,
        "quit" | "q" => AppEvent::Quit,
        _ => return Err(USAGE.to_string()),
    };

    Ok(Some(event))
}

/// Read commands line by line until input ends or the session is cancelled
pub async fn input_loop<R>(
    reader: R,
    app_tx: AsyncSender<AppEvent>,
    ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = cancel.cancelled() => break,
        };

        let Some(line) = line else {
            tracing::debug!("Input closed");
            app_tx.send(AppEvent::Quit).await?;
            break;
        };

        match parse_command(&line) {
            Ok(Some(event)) => {
                let quit = matches!(event, AppEvent::Quit);
                app_tx.send(event).await?;
                if quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(hint) => ui_tx.send(AppEvent::StatusUpdate(hint)).await?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_become_lookups() {
        assert!(matches!(parse_command("  springa "), Ok(Some(AppEvent::Lookup(w))) if w == "springa"));
        assert!(matches!(parse_command("   "), Ok(None)));
    }

    #[test]
    fn commands_are_parsed() {
        assert!(matches!(parse_command(":lang Spanish"), Ok(Some(AppEvent::SetLanguage(l))) if l == "Spanish"));
        assert!(matches!(parse_command(":sense 2"), Ok(Some(AppEvent::SelectSense(1)))));
        assert!(matches!(parse_command(":SAVE"), Ok(Some(AppEvent::ToggleSaved))));
        assert!(matches!(parse_command(":recent"), Ok(Some(AppEvent::ShowRecent))));
        assert!(matches!(parse_command(":q"), Ok(Some(AppEvent::Quit))));
    }

    #[test]
    fn bad_commands_give_hints() {
        assert!(parse_command(":sense 0").is_err());
        assert!(parse_command(":sense two").is_err());
        assert!(parse_command(":lang").is_err());
        assert!(parse_command(":fly").is_err());
    }
}
