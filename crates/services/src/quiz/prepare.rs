use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{Question, QuestionError, QuestionRecord};

/// Fix the option order of every record with a uniform shuffle.
///
/// This runs once, between retrieval and session start. The resulting order
/// never changes afterwards.
///
/// # Errors
///
/// Returns `QuestionError` if any record is invalid.
pub fn prepare_questions<R: Rng + ?Sized>(
    records: Vec<QuestionRecord>,
    rng: &mut R,
) -> Result<Vec<Question>, QuestionError> {
    records
        .into_iter()
        .map(|record| {
            let mut options: Vec<String> = record.answers().map(str::to_owned).collect();
            options.as_mut_slice().shuffle(rng);
            Question::with_options(record, options)
        })
        .collect()
}
