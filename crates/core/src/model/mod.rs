mod ids;
mod instructor;
mod leaderboard;
mod names;
mod question;
mod score;
mod session;

pub use ids::{ChatId, ParseIdError, UserId};
pub use names::{DisplayName, NameError, QuizName};

pub use instructor::{InstructorProfile, NOT_SPECIFIED};
pub use leaderboard::{LeaderboardEntry, LeaderboardTally, ranking_order};
pub use question::{OPTION_COUNT, Question, QuestionError, QuestionSet};
pub use score::{ScoreRecord, ScoreText, ScoreTextError, UpsertOutcome};
pub use session::{AnswerRejected, AnswerStep, QuizState, Session};
