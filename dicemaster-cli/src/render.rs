use std::fmt::{self, Write};

use dicemaster::prelude::*;
use serde::Serialize;

/// One result entry, shaped like an inline-query article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: String,
    pub description: String,
    pub text: String,
}

pub fn answer_cards(answer: &Answer, limits: &Limits) -> Result<Vec<Card>, fmt::Error> {
    Ok(vec![check_card(answer)?, number_card(answer)?, help_card(limits)])
}

pub fn error_cards(err: &RollError, query: &str, limits: &Limits) -> Vec<Card> {
    let card = match err {
        RollError::LimitExceeded { .. } => limit_card(limits),
        other => Card {
            title: "Something went wrong while rolling".to_string(),
            description: "Open to see the error".to_string(),
            text: format!("User input: {}\n{}", query, other),
        },
    };
    vec![card, help_card(limits)]
}

pub fn check_card(answer: &Answer) -> Result<Card, fmt::Error> {
    let spec = &answer.spec;
    let outcome = &answer.outcome;

    let mut heading = String::new();
    match spec.advantage {
        Advantage::Normal => {}
        Advantage::Advantage => heading.push_str("(Advantage) "),
        Advantage::Disadvantage => heading.push_str("(Disadvantage) "),
    }
    heading.push_str("Ability");
    if let Some(name) = &spec.check_name {
        write!(heading, " [{}]", name)?;
    }
    heading.push_str(" check");

    let title = if answer.query.defaulted {
        format!("[Ability check] roll {}", answer.query.notation)
    } else {
        format!("{} roll {}", heading, answer.query.notation)
    };

    let threshold = spec.check_threshold.unwrap_or(DEFAULT_CHECK_THRESHOLD);
    let verdict = match outcome.verdict(threshold) {
        Verdict::CriticalSuccess => "Critical Success".to_string(),
        Verdict::CriticalFailure => "Critical Failure".to_string(),
        Verdict::Success => format!("Success {}>={}", outcome.final_value, threshold),
        Verdict::Failure => format!("Failure {}<{}", outcome.final_value, threshold),
    };

    Ok(Card {
        title,
        description: "Example: Intelligence A 1d20+1-2>15".to_string(),
        text: format!("{} {}\n----\n{}", heading, verdict, breakdown(answer)?),
    })
}

pub fn number_card(answer: &Answer) -> Result<Card, fmt::Error> {
    Ok(Card {
        title: format!("[Number only] roll {}", answer.query.notation),
        description: "Example: A 1d20+1-2".to_string(),
        text: breakdown(answer)?,
    })
}

pub fn limit_card(limits: &Limits) -> Card {
    let text = format!(
        "At most {} dice with at most {} faces each",
        limits.max_dice_count, limits.max_dice_faces
    );
    Card {
        title: "Dice limit".to_string(),
        description: text.clone(),
        text,
    }
}

pub fn help_card(limits: &Limits) -> Card {
    let text = format!(
        "DnD DM - The Dice Master\n\
         1d20          one 20-sided die (1~20)\n\
         4d8           four 8-sided dice (4~32)\n\
         1d20+5        one d20 plus 5 (6~25)\n\
         1d20>15       d20 check, succeeds on 15 or more\n\
         A 1d20>15     with advantage (roll two, keep the higher)\n\
         D 1d20>15     with disadvantage (roll two, keep the lower)\n\
         A 1d20+2>15   advantage with a modifier\n\
         Name D 1d20>15  named check\n\
         Checks on a d20 have a critical success (20) and critical failure (1).\n\
         Limits: at most {} dice, at most {} faces.",
        limits.max_dice_count, limits.max_dice_faces
    );
    Card {
        title: "Help & About".to_string(),
        description: "Usage and bug reports".to_string(),
        text,
    }
}

fn breakdown(answer: &Answer) -> Result<String, fmt::Error> {
    let spec = &answer.spec;
    let outcome = &answer.outcome;

    let mut text = format!(
        "🎲 {}d{} ",
        outcome.individual_results.len(),
        spec.dice_faces
    );
    outcome.pretty_print(&mut text)?;
    if !spec.modifier_text.is_empty() {
        write!(text, "\nModifier: {} = {}", spec.modifier_text, spec.modifier)?;
    }
    write!(text, "\nFinal: {}", outcome.final_value)?;
    write!(text, "\nSeed: {}", outcome.seed)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(query: &str, draws: Vec<u32>) -> Answer {
        let query = Query::parse(query);
        let spec = query.spec(&Limits::default()).unwrap();
        let outcome = RollOutcome::from_draws(&spec, spec.advantage, draws, 99);
        Answer {
            query,
            spec,
            outcome,
        }
    }

    #[test]
    fn test_check_card_success() -> anyhow::Result<()> {
        let card = check_card(&answer("Stealth A 1d20+2>15", vec![7, 15]))?;
        assert_eq!(card.title, "(Advantage) Ability [Stealth] check roll 1d20+2");
        assert!(card.text.starts_with("(Advantage) Ability [Stealth] check Success 17>=15"));
        assert!(card.text.contains("🎲 2d20 [7 15] = 15"));
        assert!(card.text.contains("Modifier: +2 = 2"));
        assert!(card.text.contains("Final: 17"));
        assert!(card.text.contains("Seed: 99"));
        Ok(())
    }

    #[test]
    fn test_check_card_critical_overrides() -> anyhow::Result<()> {
        let card = check_card(&answer("D 1d20+30>5", vec![1, 12]))?;
        assert!(card.text.contains("Critical Failure"));
        assert!(!card.text.contains("Success"));
        Ok(())
    }

    #[test]
    fn test_default_query_title() -> anyhow::Result<()> {
        let card = check_card(&answer("", vec![9]))?;
        assert_eq!(card.title, "[Ability check] roll 1d20");
        assert!(card.text.contains("Failure 9<10"));
        Ok(())
    }

    #[test]
    fn test_unreadable_threshold_checks_against_zero() -> anyhow::Result<()> {
        let card = check_card(&answer("1d20+1>", vec![2]))?;
        assert!(card.text.contains("Success 3>=0"));
        let card = check_card(&answer("1d20>abc", vec![1]))?;
        assert!(card.text.contains("Critical Failure"));
        Ok(())
    }

    #[test]
    fn test_number_card_without_modifier() -> anyhow::Result<()> {
        let card = number_card(&answer("3d6", vec![1, 2, 3]))?;
        assert_eq!(card.title, "[Number only] roll 3d6");
        assert!(!card.text.contains("Modifier"));
        assert!(card.text.contains("Final: 6"));
        Ok(())
    }

    #[test]
    fn test_answer_cards() -> anyhow::Result<()> {
        let cards = answer_cards(&answer("Stealth 2d6-1", vec![4, 5]), &Limits::default())?;
        assert_eq!(cards.len(), 3);
        assert!(cards[1].text.starts_with("🎲 2d6 [4 5] = 9\nModifier: -1 = -1\nFinal: 8"));
        assert_eq!(cards[2].title, "Help & About");
        Ok(())
    }

    #[test]
    fn test_limit_error_cards() {
        let limits = Limits::default();
        let err = Query::parse("1001d6").spec(&limits).unwrap_err();
        let cards = error_cards(&err, "1001d6", &limits);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Dice limit");
        assert_eq!(cards[1].title, "Help & About");
    }
}
