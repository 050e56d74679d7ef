//! Mentorship domain records: accounts, mentor/mentee profiles, questions, answers.
//!
//! These are plain records with small, local invariants. Persistence lives in
//! `mentorhub-infra`; HTTP shaping lives in `mentorhub-api`.

pub mod account;
pub mod answer;
pub mod mentee;
pub mod mentor;
pub mod question;

pub use account::{Account, NewAccount, ProfileId};
pub use answer::{Answer, AnswerSort, Vote};
pub use mentee::{Mentee, MenteeRecord};
pub use mentor::{Mentor, MentorProfileUpdate, MentorRecord};
pub use question::{Question, QuestionUpdate};
