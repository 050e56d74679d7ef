use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use mentorhub_core::{AccountId, AnswerId, MenteeId, MentorId, QuestionId};
use mentorhub_mentorship::{
    Account, Answer, Mentee, MenteeRecord, Mentor, MentorRecord, ProfileId, Question, Vote,
};

use super::{
    AccountStore, AnswerFilter, AnswerStore, Paged, Pagination, QuestionStore, StoreError,
};

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    mentors: HashMap<MentorId, Mentor>,
    mentees: HashMap<MenteeId, Mentee>,
    questions: HashMap<QuestionId, Question>,
    answers: HashMap<AnswerId, Answer>,
}

impl Tables {
    fn email_taken(&self, email: &str) -> bool {
        self.accounts
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(email))
    }

    fn mentor_record(&self, account: &Account) -> Option<MentorRecord> {
        let mentor = self.mentors.get(&account.mentor_id()?)?;
        Some(MentorRecord {
            account: account.clone(),
            mentor: mentor.clone(),
        })
    }
}

/// In-memory store for tests/dev.
///
/// All tables sit behind one lock, so a duplicate-email check and the insert
/// that follows it are a single atomic step.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.read()?.accounts.get(&id).cloned())
    }

    async fn create_mentor(&self, account: Account, mentor: Mentor) -> Result<MentorRecord, StoreError> {
        let mut tables = self.write()?;
        if tables.email_taken(&account.email) {
            return Err(StoreError::DuplicateEmail(account.email));
        }
        tables.mentors.insert(mentor.id, mentor.clone());
        tables.accounts.insert(account.id, account.clone());
        Ok(MentorRecord { account, mentor })
    }

    async fn create_mentee(&self, account: Account, mentee: Mentee) -> Result<MenteeRecord, StoreError> {
        let mut tables = self.write()?;
        if tables.email_taken(&account.email) {
            return Err(StoreError::DuplicateEmail(account.email));
        }
        tables.mentees.insert(mentee.id, mentee.clone());
        tables.accounts.insert(account.id, account.clone());
        Ok(MenteeRecord { account, mentee })
    }

    async fn update_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let slot = tables
            .accounts
            .get_mut(&account.id)
            .ok_or(StoreError::NotFound("Account"))?;
        *slot = account.clone();
        Ok(())
    }

    async fn get_mentor(&self, id: MentorId) -> Result<Option<MentorRecord>, StoreError> {
        let tables = self.read()?;
        let owner = ProfileId::Mentor(id);
        Ok(tables
            .accounts
            .values()
            .find(|a| a.owner == owner)
            .and_then(|a| tables.mentor_record(a)))
    }

    async fn get_mentee(&self, id: MenteeId) -> Result<Option<MenteeRecord>, StoreError> {
        let tables = self.read()?;
        let owner = ProfileId::Mentee(id);
        let Some(account) = tables.accounts.values().find(|a| a.owner == owner) else {
            return Ok(None);
        };
        Ok(tables.mentees.get(&id).map(|mentee| MenteeRecord {
            account: account.clone(),
            mentee: mentee.clone(),
        }))
    }

    async fn update_mentor(&self, record: &MentorRecord) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if !tables.mentors.contains_key(&record.mentor.id) {
            return Err(StoreError::NotFound("Mentor"));
        }
        if !tables.accounts.contains_key(&record.account.id) {
            return Err(StoreError::NotFound("Account"));
        }
        tables.mentors.insert(record.mentor.id, record.mentor.clone());
        tables.accounts.insert(record.account.id, record.account.clone());
        Ok(())
    }

    async fn list_mentors(&self, page: Pagination) -> Result<Paged<MentorRecord>, StoreError> {
        let tables = self.read()?;
        let mut records: Vec<MentorRecord> = tables
            .accounts
            .values()
            .filter_map(|a| tables.mentor_record(a))
            .collect();
        records.sort_by(|a, b| {
            a.account
                .created_at
                .cmp(&b.account.created_at)
                .then(a.account.id.cmp(&b.account.id))
        });
        Ok(page.slice(records))
    }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    async fn insert_question(&self, question: &Question) -> Result<(), StoreError> {
        self.write()?.questions.insert(question.id, question.clone());
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StoreError> {
        Ok(self.read()?.questions.get(&id).cloned())
    }

    async fn update_question(&self, question: &Question) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let slot = tables
            .questions
            .get_mut(&question.id)
            .ok_or(StoreError::NotFound("Question"))?;
        *slot = question.clone();
        Ok(())
    }

    async fn list_questions(&self, page: Pagination) -> Result<Paged<Question>, StoreError> {
        let mut questions: Vec<Question> = self.read()?.questions.values().cloned().collect();
        questions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page.slice(questions))
    }
}

#[async_trait]
impl AnswerStore for InMemoryStore {
    async fn insert_answer(&self, answer: &Answer) -> Result<(), StoreError> {
        self.write()?.answers.insert(answer.id, answer.clone());
        Ok(())
    }

    async fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, StoreError> {
        Ok(self.read()?.answers.get(&id).cloned())
    }

    async fn update_answer(&self, answer: &Answer) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let slot = tables
            .answers
            .get_mut(&answer.id)
            .ok_or(StoreError::NotFound("Answer"))?;
        *slot = answer.clone();
        Ok(())
    }

    async fn list_answers(&self, filter: AnswerFilter, page: Pagination) -> Result<Paged<Answer>, StoreError> {
        let mut answers: Vec<Answer> = self
            .read()?
            .answers
            .values()
            .filter(|a| filter.question.is_none_or(|q| a.question == q))
            .cloned()
            .collect();
        filter.sort.apply(&mut answers);
        Ok(page.slice(answers))
    }

    async fn vote(&self, id: AnswerId, vote: Vote) -> Result<Option<Answer>, StoreError> {
        let mut tables = self.write()?;
        Ok(tables.answers.get_mut(&id).map(|answer| {
            answer.cast(vote);
            answer.clone()
        }))
    }
}
