//! Line-oriented terminal front end: input parsing and plain-text rendering.

use quiz_core::model::{QuizReport, SubmissionCheck, Theme};
use services::quiz::{format_remaining, is_warning};
use services::{QuizCommand, QuizView};

pub const HELP: &str = "\
commands:
  <number>     answer with option <number>
  n / next     next question
  p / prev     previous question
  g <number>   jump to question <number>
  b            toggle bookmark on this question
  o            show overview
  s            submit
  theme        toggle light/dark theme
  h / help     show this help";

/// What a line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Quiz(QuizCommand),
    ToggleTheme,
    Overview,
    Help,
    Invalid(String),
}

/// Parse one input line. `pending_confirm` is set after a submit prompt.
#[must_use]
pub fn parse_input(line: &str, view: Option<&QuizView>, pending_confirm: bool) -> Input {
    let line = line.trim();
    if pending_confirm && matches!(line, "y" | "yes") {
        return Input::Quiz(QuizCommand::Submit { confirmed: true });
    }

    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or_default();
    match head {
        "n" | "next" => Input::Quiz(QuizCommand::Next),
        "p" | "prev" => Input::Quiz(QuizCommand::Previous),
        "b" | "bookmark" => Input::Quiz(QuizCommand::ToggleBookmark),
        "s" | "submit" => Input::Quiz(QuizCommand::Submit { confirmed: false }),
        "o" | "overview" => Input::Overview,
        "theme" => Input::ToggleTheme,
        "h" | "help" | "?" => Input::Help,
        "g" | "go" => match parts.next().and_then(|raw| raw.parse::<usize>().ok()) {
            Some(number) if number > 0 => Input::Quiz(QuizCommand::JumpTo(number - 1)),
            _ => Input::Invalid("usage: g <question number>".into()),
        },
        raw => match raw.parse::<usize>() {
            Ok(number) => option_at(view, number),
            Err(_) => Input::Invalid(format!("unknown command: {raw}")),
        },
    }
}

fn option_at(view: Option<&QuizView>, number: usize) -> Input {
    let option = view.and_then(|v| number.checked_sub(1).and_then(|i| v.options.get(i)));
    match option {
        Some(option) => Input::Quiz(QuizCommand::Answer(option.clone())),
        None => Input::Invalid(format!("no option {number}")),
    }
}

#[must_use]
pub fn render_view(view: &QuizView, theme: Theme) -> String {
    let mut out = String::new();
    let marker = if view.bookmarked { " [bookmarked]" } else { "" };
    out.push_str(&format!(
        "\n({theme}) Question {}/{} | answered {}/{}{marker}\n",
        view.index + 1,
        view.total,
        view.progress.answered,
        view.progress.total,
    ));
    out.push_str(&format!("{} ({})\n", view.category, view.difficulty));
    out.push_str(&format!("{}\n", view.question));
    for (i, option) in view.options.iter().enumerate() {
        let selected = if view.selected.as_deref() == Some(option.as_str()) {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!("  {selected} {}. {option}\n", i + 1));
    }
    out
}

#[must_use]
pub fn render_overview(view: &QuizView) -> String {
    view.statuses
        .iter()
        .map(|status| {
            let mut cell = format!("{}", status.index + 1);
            if status.answered {
                cell.push('✓');
            }
            if status.bookmarked {
                cell.push('🔖');
            }
            if status.current {
                cell = format!("[{cell}]");
            }
            cell
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[must_use]
pub fn render_tick(remaining_secs: u64) -> Option<String> {
    // only surface the clock every minute, and every 10s once it is low
    let announce = remaining_secs % 60 == 0 || (is_warning(remaining_secs) && remaining_secs % 10 == 0);
    announce.then(|| {
        let warning = if is_warning(remaining_secs) { " (hurry up!)" } else { "" };
        format!("Time left: {}{warning}", format_remaining(remaining_secs))
    })
}

#[must_use]
pub fn render_confirm(check: SubmissionCheck) -> String {
    let prompt = check.prompt().unwrap_or_default();
    format!("{prompt} [y/N]")
}

#[must_use]
pub fn format_total(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

fn format_secs(value: Option<u64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |secs| format!("{secs}s"))
}

#[must_use]
pub fn render_report(report: &QuizReport, email: &str) -> String {
    let mut out = String::new();
    if report.is_high_achievement() {
        out.push_str("\n*** Outstanding! ***\n");
    }
    out.push_str(&format!("\nQuiz report for {email}\n"));
    out.push_str(&format!(
        "Score: {}/{} ({}%)\n",
        report.score(),
        report.total(),
        report.percentage_label()
    ));
    out.push_str(&format!("Total time: {}\n", format_total(report.total_elapsed_secs())));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let average = report.average_secs().floor() as u64;
    out.push_str(&format!("Average per question: {average}s\n"));
    out.push_str(&format!("Fastest answer: {}\n", format_secs(report.fastest_secs())));
    out.push_str(&format!("Slowest answer: {}\n", format_secs(report.slowest_secs())));

    out.push_str("\nDetailed review\n");
    for review in report.reviews() {
        let verdict = if review.is_correct { "correct" } else { "incorrect" };
        let time = review
            .time_secs
            .map(|secs| format!(" ({secs}s)"))
            .unwrap_or_default();
        out.push_str(&format!(
            "{}. {}{time} - {verdict}\n",
            review.index + 1,
            review.question
        ));
        out.push_str(&format!(
            "   your answer: {}\n",
            review.your_answer.as_deref().unwrap_or("Not Answered")
        ));
        if !review.is_correct {
            out.push_str(&format!("   correct answer: {}\n", review.correct_answer));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuizProgress;

    fn view() -> QuizView {
        QuizView {
            index: 0,
            total: 2,
            category: "Geography".into(),
            difficulty: "easy".into(),
            question: "What is the largest ocean on Earth?".into(),
            options: vec!["Atlantic Ocean".into(), "Pacific Ocean".into()],
            selected: Some("Pacific Ocean".into()),
            bookmarked: true,
            progress: QuizProgress {
                total: 2,
                answered: 1,
                bookmarked: 1,
                current: 0,
            },
            statuses: Vec::new(),
        }
    }

    #[test]
    fn numbers_map_to_options_of_current_view() {
        let view = view();
        assert_eq!(
            parse_input("2", Some(&view), false),
            Input::Quiz(QuizCommand::Answer("Pacific Ocean".into()))
        );
        assert!(matches!(parse_input("3", Some(&view), false), Input::Invalid(_)));
        assert!(matches!(parse_input("0", Some(&view), false), Input::Invalid(_)));
        assert!(matches!(parse_input("1", None, false), Input::Invalid(_)));
    }

    #[test]
    fn jump_is_one_based() {
        assert_eq!(
            parse_input("g 3", None, false),
            Input::Quiz(QuizCommand::JumpTo(2))
        );
        assert!(matches!(parse_input("g 0", None, false), Input::Invalid(_)));
    }

    #[test]
    fn yes_confirms_only_when_pending() {
        assert_eq!(
            parse_input("y", None, true),
            Input::Quiz(QuizCommand::Submit { confirmed: true })
        );
        assert!(matches!(parse_input("y", None, false), Input::Invalid(_)));
    }

    #[test]
    fn view_marks_selected_option() {
        let rendered = render_view(&view(), Theme::Dark);
        assert!(rendered.contains("Question 1/2"));
        assert!(rendered.contains("* 2. Pacific Ocean"));
        assert!(rendered.contains("[bookmarked]"));
    }

    #[test]
    fn ticks_are_throttled() {
        assert_eq!(render_tick(1_740).as_deref(), Some("Time left: 29:00"));
        assert_eq!(render_tick(1_739), None);
        assert_eq!(
            render_tick(290).as_deref(),
            Some("Time left: 04:50 (hurry up!)")
        );
    }

    #[test]
    fn totals_render_as_minutes_and_seconds() {
        assert_eq!(format_total(125), "2m 5s");
        assert_eq!(format_secs(None), "N/A");
    }
}
