use quiz_core::model::{Difficulty, QuestionKind, QuestionRecord};

struct BackupEntry {
    category: &'static str,
    difficulty: Difficulty,
    question: &'static str,
    correct: &'static str,
    incorrect: [&'static str; 3],
}

fn entry(
    category: &'static str,
    difficulty: Difficulty,
    question: &'static str,
    correct: &'static str,
    incorrect: [&'static str; 3],
) -> BackupEntry {
    BackupEntry {
        category,
        difficulty,
        question,
        correct,
        incorrect,
    }
}

/// Fixed question list used when the remote source is unavailable.
///
/// Always the same 15 questions in the same order.
#[must_use]
pub fn backup_questions() -> Vec<QuestionRecord> {
    let entries = [
        entry(
            "General Knowledge",
            Difficulty::Easy,
            "What is the capital of France?",
            "Paris",
            ["London", "Berlin", "Madrid"],
        ),
        entry(
            "Science: Computers",
            Difficulty::Medium,
            "What does CPU stand for?",
            "Central Processing Unit",
            ["Central Process Unit", "Computer Personal Unit", "Central Processor Unit"],
        ),
        entry(
            "Geography",
            Difficulty::Easy,
            "What is the largest ocean on Earth?",
            "Pacific Ocean",
            ["Atlantic Ocean", "Indian Ocean", "Arctic Ocean"],
        ),
        entry(
            "History",
            Difficulty::Medium,
            "In which year did World War II end?",
            "1945",
            ["1944", "1946", "1943"],
        ),
        entry(
            "Entertainment: Film",
            Difficulty::Easy,
            "Who directed the movie 'Jurassic Park'?",
            "Steven Spielberg",
            ["James Cameron", "George Lucas", "Ridley Scott"],
        ),
        entry(
            "Science: Nature",
            Difficulty::Easy,
            "What is the fastest land animal?",
            "Cheetah",
            ["Lion", "Leopard", "Tiger"],
        ),
        entry(
            "Sports",
            Difficulty::Medium,
            "How many players are on a basketball team on the court?",
            "5",
            ["6", "7", "4"],
        ),
        entry(
            "Mathematics",
            Difficulty::Easy,
            "What is 7 multiplied by 8?",
            "56",
            ["54", "63", "48"],
        ),
        entry(
            "Art",
            Difficulty::Medium,
            "Who painted the Mona Lisa?",
            "Leonardo da Vinci",
            ["Michelangelo", "Raphael", "Donatello"],
        ),
        entry(
            "Science: Chemistry",
            Difficulty::Easy,
            "What is the chemical symbol for gold?",
            "Au",
            ["Go", "Gd", "Ag"],
        ),
        entry(
            "Entertainment: Music",
            Difficulty::Medium,
            "Which band released the album 'Abbey Road'?",
            "The Beatles",
            ["The Rolling Stones", "Led Zeppelin", "Pink Floyd"],
        ),
        entry(
            "Mythology",
            Difficulty::Medium,
            "Who is the Greek god of the sea?",
            "Poseidon",
            ["Zeus", "Hades", "Apollo"],
        ),
        entry(
            "Animals",
            Difficulty::Easy,
            "How many legs does a spider have?",
            "8",
            ["6", "10", "12"],
        ),
        entry(
            "Politics",
            Difficulty::Medium,
            "How many states are in the United States?",
            "50",
            ["48", "52", "51"],
        ),
        entry(
            "Literature",
            Difficulty::Medium,
            "Who wrote 'Romeo and Juliet'?",
            "William Shakespeare",
            ["Charles Dickens", "Jane Austen", "Mark Twain"],
        ),
    ];

    entries
        .into_iter()
        .map(|e| QuestionRecord {
            category: e.category.to_owned(),
            kind: QuestionKind::Multiple,
            difficulty: e.difficulty,
            question: e.question.to_owned(),
            correct_answer: e.correct.to_owned(),
            incorrect_answers: e.incorrect.iter().map(|s| (*s).to_owned()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_has_fifteen_valid_records() {
        let records = backup_questions();
        assert_eq!(records.len(), 15);
        for record in &records {
            record.validate().unwrap();
            assert_eq!(record.incorrect_answers.len(), 3);
        }
    }

    #[test]
    fn backup_is_deterministic() {
        assert_eq!(backup_questions(), backup_questions());
        assert_eq!(backup_questions()[0].correct_answer, "Paris");
    }
}
