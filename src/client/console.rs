use async_trait::async_trait;
use std::io::Write;
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::client::session_loop::{ClientView, PlayerConsole};
use crate::config::Ruleset;
use crate::game::choice::ChosenSet;
use crate::game::PlayerId;
use crate::{AppError, AppResult};

/// Terminal front end for one player.
pub struct TerminalConsole {
    lines: Lines<BufReader<Stdin>>,
    identity: Option<PlayerId>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
            identity: None,
        }
    }

    async fn prompt(&mut self, text: &str) -> AppResult<String> {
        print!("{}", text);
        let _ = std::io::stdout().flush();
        match self.lines.next_line().await {
            Ok(Some(line)) => Ok(line.trim().to_string()),
            Ok(None) => Err(AppError::Internal {
                message: "standard input closed".to_string(),
            }),
            Err(e) => Err(AppError::Internal {
                message: format!("failed to read standard input: {}", e),
            }),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

/// Adds every acceptable number on `line` to `picked`, returning complaints
/// about the rest.
pub fn collect_numbers(line: &str, picked: &mut Vec<u32>, rules: &Ruleset) -> Vec<String> {
    let max = rules.max_number();
    let mut complaints = Vec::new();

    for token in line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        if picked.len() == rules.picks {
            complaints.push(format!("Already have {} numbers, ignoring {}", rules.picks, token));
            continue;
        }
        match token.parse::<u32>() {
            Ok(n) if (1..=max).contains(&n) => {
                if picked.contains(&n) {
                    complaints.push(format!("{} was already chosen", n));
                } else {
                    picked.push(n);
                }
            }
            Ok(n) => complaints.push(format!("{} is not between 1 and {}", n, max)),
            Err(_) => complaints.push(format!("'{}' is not a number", token)),
        }
    }
    complaints
}

#[async_trait]
impl PlayerConsole for TerminalConsole {
    async fn choose_player_count(&mut self, rules: &Ruleset) -> AppResult<u32> {
        loop {
            let line = self
                .prompt(&format!(
                    "How many players will play ({}-{})? ",
                    rules.min_players, rules.max_players
                ))
                .await?;
            match line.parse::<u32>() {
                Ok(count) => return Ok(count),
                Err(_) => println!("'{}' is not a number", line),
            }
        }
    }

    async fn choose_numbers(&mut self, rules: &Ruleset) -> AppResult<ChosenSet> {
        println!(
            "Pick {} different numbers between 1 and {}.",
            rules.picks,
            rules.max_number()
        );
        let mut picked = Vec::with_capacity(rules.picks);
        while picked.len() < rules.picks {
            let line = self
                .prompt(&format!("Number {} of {}: ", picked.len() + 1, rules.picks))
                .await?;
            for complaint in collect_numbers(&line, &mut picked, rules) {
                println!("{}", complaint);
            }
        }
        ChosenSet::new(picked, rules)
    }

    async fn acknowledge(&mut self) -> AppResult<()> {
        self.prompt("Press Enter to end your turn...").await?;
        Ok(())
    }

    fn show_welcome(&mut self, identity: PlayerId, players_allowed: u32) {
        self.identity = Some(identity);
        println!("Welcome, you are player #{}", identity);
        if players_allowed > 0 && identity > players_allowed {
            println!(
                "Warning: this game was set up for {} players, you may not get a turn",
                players_allowed
            );
        }
    }

    fn show_active(&mut self, view: &ClientView) {
        if !view.last_chosen.is_empty() {
            println!("Previous player chose {}", view.last_chosen);
        }
        println!("It's your turn (turn {})", view.turn_counter + 1);
    }

    fn show_choice(&mut self, chosen: &ChosenSet) {
        println!("You chose {}", chosen);
    }

    fn show_game_over(&mut self, view: &ClientView) {
        println!("Game over!");
        if let Some(card) = &view.card {
            println!("{}", card);
        }
        if view.results.is_empty() {
            println!("Nobody submitted numbers");
        }
        for result in &view.results {
            let who = if Some(result.identity) == self.identity {
                "You".to_string()
            } else {
                format!("Player #{}", result.identity)
            };
            match result.pattern {
                Some(pattern) => println!("{} ({}): Bingo! {}", who, result.chosen, pattern),
                None => println!("{} ({}): No bingo", who, result.chosen),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_numbers_accepts_mixed_separators() {
        let rules = Ruleset::default();
        let mut picked = Vec::new();
        let complaints = collect_numbers("4, 17 25", &mut picked, &rules);

        assert!(complaints.is_empty());
        assert_eq!(picked, vec![4, 17, 25]);
    }

    #[test]
    fn test_collect_numbers_rejects_bad_input() {
        let rules = Ruleset::default();
        let mut picked = vec![4];
        let complaints = collect_numbers("4 0 26 x 9", &mut picked, &rules);

        assert_eq!(picked, vec![4, 9]);
        assert_eq!(complaints.len(), 4);
        assert_eq!(complaints[0], "4 was already chosen");
        assert_eq!(complaints[1], "0 is not between 1 and 25");
        assert_eq!(complaints[3], "'x' is not a number");
    }

    #[test]
    fn test_collect_numbers_stops_at_picks() {
        let rules = Ruleset {
            picks: 2,
            ..Ruleset::default()
        };
        let mut picked = Vec::new();
        let complaints = collect_numbers("1 2 3", &mut picked, &rules);

        assert_eq!(picked, vec![1, 2]);
        assert_eq!(complaints.len(), 1);
    }
}
