use anyhow::Result;
use inquire::{InquireError, Text};
use skyglance_core::{Action, Session, state::RecentSearches};

use crate::render::render;

const HELP: &str = "\
Type a city name to look it up, or:
  :here        weather for your location
  :unit        switch °C / °F
  :theme       switch dark / light
  :recent <n>  repeat the n-th recent search
  :help        show this help
  :quit        leave";

/// One line of prompt input, decoded.
#[derive(Debug)]
enum Input {
    Nothing,
    Quit,
    Help,
    Invalid(String),
    Action(Action),
}

fn parse_input(line: &str, recent: &RecentSearches) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Nothing;
    }

    let Some(command) = line.strip_prefix(':') else {
        return Input::Action(Action::SubmitSearch(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("q" | "quit"), None) => Input::Quit,
        (Some("help"), None) => Input::Help,
        (Some("here"), None) => Input::Action(Action::RequestLocation),
        (Some("unit"), None) => Input::Action(Action::ToggleUnit),
        (Some("theme"), None) => Input::Action(Action::ToggleTheme),
        (Some("recent"), Some(n)) => match n.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
            Some(index) => match recent.get(index) {
                Some(city) => Input::Action(Action::SelectRecent(city.to_string())),
                None => Input::Invalid(format!("No recent search #{n}")),
            },
            None => Input::Invalid(format!("Not a valid position: {n}")),
        },
        _ => Input::Invalid(format!("Unknown command ':{command}'. Type :help.")),
    }
}

async fn dispatch_and_show(session: &mut Session, action: Action) {
    session.dispatch(action);
    if session.state().is_loading() {
        print!("{}", render(session.state()));
    }
    let state = session.settle().await;
    println!("{}", render(state));
}

/// Prompt loop. Starts by showing `start_city`.
pub async fn run(mut session: Session, start_city: &str) -> Result<()> {
    dispatch_and_show(&mut session, Action::SubmitSearch(start_city.to_string())).await;

    loop {
        // inquire blocks; nothing is in flight while we wait on the user.
        let prompt = tokio::task::spawn_blocking(|| {
            Text::new("city>")
                .with_help_message(":help for commands")
                .prompt()
        })
        .await?;

        let line = match prompt {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match parse_input(&line, session.state().recent()) {
            Input::Nothing => {}
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Invalid(message) => println!("{message}"),
            Input::Action(action) => dispatch_and_show(&mut session, action).await,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recent(cities: &[&str]) -> RecentSearches {
        let mut recent = RecentSearches::default();
        for city in cities.iter().rev() {
            recent.record(city);
        }
        recent
    }

    #[test]
    fn plain_text_is_a_search() {
        let input = parse_input("  New York ", &RecentSearches::default());
        assert!(matches!(input, Input::Action(Action::SubmitSearch(ref c)) if c == "New York"));
    }

    #[test]
    fn blank_line_does_nothing() {
        assert!(matches!(
            parse_input("   ", &RecentSearches::default()),
            Input::Nothing
        ));
    }

    #[test]
    fn commands_map_to_actions() {
        let none = RecentSearches::default();
        assert!(matches!(parse_input(":quit", &none), Input::Quit));
        assert!(matches!(parse_input(":q", &none), Input::Quit));
        assert!(matches!(parse_input(":help", &none), Input::Help));
        assert!(matches!(
            parse_input(":here", &none),
            Input::Action(Action::RequestLocation)
        ));
        assert!(matches!(
            parse_input(":unit", &none),
            Input::Action(Action::ToggleUnit)
        ));
        assert!(matches!(
            parse_input(":theme", &none),
            Input::Action(Action::ToggleTheme)
        ));
        assert!(matches!(parse_input(":bogus", &none), Input::Invalid(_)));
    }

    #[test]
    fn recent_is_one_based() {
        let recent = recent(&["Paris", "Berlin"]);

        assert!(matches!(
            parse_input(":recent 2", &recent),
            Input::Action(Action::SelectRecent(ref c)) if c == "Berlin"
        ));
        assert!(matches!(parse_input(":recent 0", &recent), Input::Invalid(_)));
        assert!(matches!(parse_input(":recent 3", &recent), Input::Invalid(_)));
        assert!(matches!(parse_input(":recent x", &recent), Input::Invalid(_)));
    }
}
